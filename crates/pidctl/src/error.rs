//! 配置加载错误类型定义
//!
//! 控制器本身没有错误路径（`update` / `reset` 都是全函数），
//! 只有配置文件的读写会失败。

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读写错误
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析错误
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化错误
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::ConfigError;

    #[test]
    fn test_config_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ConfigError::from(io);
        let msg = format!("{}", err);
        assert!(msg.contains("IO error"), "Io error message: {}", msg);
        assert!(msg.contains("missing"), "Io error message: {}", msg);

        let parse = toml::from_str::<toml::Table>("kp = ").unwrap_err();
        let err = ConfigError::from(parse);
        let msg = format!("{}", err);
        assert!(msg.contains("parse error"), "Parse error message: {}", msg);
    }
}
