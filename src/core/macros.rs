//! 核心宏定义
//!
//! 提供统一的宏来减少配置结构体的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use kinetic_core::impl_default;
///
/// struct SpawnBand {
///     min: f32,
///     max: f32,
/// }
///
/// impl_default!(SpawnBand {
///     min: 15.0,
///     max: 25.0,
/// });
///
/// let band = SpawnBand::default();
/// assert_eq!(band.max, 25.0);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    struct Band {
        min: f32,
        max: f32,
        label: String,
    }

    impl_default!(Band {
        min: -1.0,
        max: 1.0,
        label: String::from("band"),
    });

    #[test]
    fn test_impl_default() {
        let band = Band::default();
        assert_eq!(band.min, -1.0);
        assert_eq!(band.max, 1.0);
        assert_eq!(band.label, "band");
    }
}
