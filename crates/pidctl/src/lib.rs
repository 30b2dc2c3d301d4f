//! # pidctl - 离散时间 PID 控制器
//!
//! 单回路 PID 反馈控制：输入目标值和测量值，输出钳位后的控制量。
//!
//! ## 包含模块
//!
//! - `pid` - [`PidController`]：死区、饱和检测、积分抗饱和、变步长
//! - `controller` - [`Controller`] trait：控制器通用接口
//! - `clock` - [`Clock`] 时间源抽象（[`MonotonicClock`] / [`ManualClock`]）
//! - `config` - [`PidConfig`]：可序列化的参数，支持 TOML 文件
//! - `error` - [`ConfigError`]：配置读写错误
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use pidctl::PidController;
//!
//! let mut pid = PidController::new(2.0, 0.5, 0.05, -100.0, 100.0)
//!     .with_deadband(0.1)
//!     .with_anti_windup(true);
//!
//! # fn read_sensor() -> f64 { 0.0 }
//! # fn apply(_: f64) {}
//! loop {
//!     let output = pid.update(25.0, read_sensor());
//!     apply(output);
//! #   break;
//! }
//! ```
//!
//! ## 线程模型
//!
//! 控制器内部没有任何同步，每个控制回路持有一个独立实例。
//! `update` / `reset` 需要 `&mut self`，跨线程共享时请在外部加锁。

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod pid;

// 重新导出常用类型
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{PidConfig, PidGains};
pub use controller::Controller;
pub use error::ConfigError;
pub use pid::PidController;
