//! # PID 配置
//!
//! 控制器参数的可序列化表示，支持 TOML 文件读写。
//!
//! ```toml
//! kp = 2.0
//! ki = 0.5
//! kd = 0.05
//! min_output = -100.0
//! max_output = 100.0
//! deadband = 0.1      # 可选，默认 0
//! anti_windup = true  # 可选，默认 false
//! ```
//!
//! 加载时**不做校验**：`min_output > max_output`、负增益等退化配置原样接受，
//! 行为由控制器公式决定。[`PidConfig::is_degenerate`] 供调用方自行判断。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// PID 增益
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    /// 比例增益 (Kp)
    pub kp: f64,

    /// 积分增益 (Ki)
    pub ki: f64,

    /// 微分增益 (Kd)
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// PID 控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// 比例增益 (Kp)
    pub kp: f64,

    /// 积分增益 (Ki)
    pub ki: f64,

    /// 微分增益 (Kd)
    pub kd: f64,

    /// 输出下限
    pub min_output: f64,

    /// 输出上限
    pub max_output: f64,

    /// 死区：|误差| 小于此值时不做任何动作
    #[serde(default)]
    pub deadband: f64,

    /// 积分抗饱和
    #[serde(default)]
    pub anti_windup: bool,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            min_output: -100.0,
            max_output: 100.0,
            deadband: 0.0,
            anti_windup: false,
        }
    }
}

impl PidConfig {
    /// 增益部分
    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    /// 是否为退化配置
    ///
    /// 下限大于上限、任一增益或死区为负、或含非有限值。
    /// 仅用于提示，控制器仍然接受这些配置。
    pub fn is_degenerate(&self) -> bool {
        let values = [
            self.kp,
            self.ki,
            self.kd,
            self.min_output,
            self.max_output,
            self.deadband,
        ];

        self.min_output > self.max_output
            || self.kp < 0.0
            || self.ki < 0.0
            || self.kd < 0.0
            || self.deadband < 0.0
            || values.iter().any(|v| !v.is_finite())
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PidConfig = toml::from_str(content)?;

        if config.is_degenerate() {
            tracing::warn!(?config, "Loaded degenerate PID config, accepting as-is");
        }

        Ok(config)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        tracing::debug!("Loaded PID config from {}", path.display());
        Ok(config)
    }

    /// 序列化为 TOML 字符串
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
