use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 渲染配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// 雨滴四边形半宽（极细）
    pub quad_half_width: f32,

    /// 雨滴四边形半高（极长，形成线条感）
    pub quad_half_height: f32,

    /// 加法混合，让雨滴发亮
    pub additive_blend: bool,

    /// 是否写入深度
    pub depth_write: bool,

    /// 清屏颜色
    pub clear_color: [f32; 4],
}

impl_default!(RenderConfig {
    quad_half_width: 0.015,
    quad_half_height: 0.3,
    additive_blend: true,
    depth_write: false,
    clear_color: [0.1, 0.1, 0.1, 1.0],
});

impl RenderConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.quad_half_width > 0.0 && self.quad_half_height > 0.0) {
            return Err(ConfigError::ValidationError(
                "Invalid quad size".to_string(),
            ));
        }
        Ok(())
    }

    /// 四边形尺寸 (半宽, 半高)
    pub fn quad_size(&self) -> [f32; 2] {
        [self.quad_half_width, self.quad_half_height]
    }
}
