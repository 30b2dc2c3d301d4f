//! Controller trait - 控制器通用接口
//!
//! 定义了所有单回路控制器必须实现的接口。
//!
//! # 设计理念
//!
//! - **调用方驱动**: 调用方负责采样和执行，控制器只负责计算
//! - **时间自治**: 控制器自己读取时间源计算 `dt`，调用方只传两个数
//! - **无错误路径**: `update` 是全函数，非有限输入按浮点规则传播
//!
//! # 示例
//!
//! ```rust
//! use pidctl::Controller;
//!
//! /// 纯比例控制器，不关心时间
//! struct Proportional {
//!     kp: f64,
//! }
//!
//! impl Controller for Proportional {
//!     fn update(&mut self, setpoint: f64, measured: f64) -> f64 {
//!         self.kp * (setpoint - measured)
//!     }
//!
//!     fn reset(&mut self) {}
//! }
//!
//! let mut p = Proportional { kp: 2.0 };
//! assert_eq!(p.update(3.0, 1.0), 4.0);
//! ```

/// 控制器通用接口
///
/// # 线程安全
///
/// `update` / `reset` 需要 `&mut self`，同一实例不能被并发调用。
/// 如果需要在多线程中使用，请将其包装在 `Mutex` 中。
pub trait Controller {
    /// 计算一步控制输出
    ///
    /// # 参数
    ///
    /// - `setpoint`: 目标值
    /// - `measured`: 当前测量值
    fn update(&mut self, setpoint: f64, measured: f64) -> f64;

    /// 清除累积状态
    fn reset(&mut self);
}

impl<T: Controller + ?Sized> Controller for &mut T {
    fn update(&mut self, setpoint: f64, measured: f64) -> f64 {
        (**self).update(setpoint, measured)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<T: Controller + ?Sized> Controller for Box<T> {
    fn update(&mut self, setpoint: f64, measured: f64) -> f64 {
        (**self).update(setpoint, measured)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
