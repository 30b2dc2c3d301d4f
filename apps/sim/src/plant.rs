//! 一阶惯性被控对象
//!
//! ```text
//! dy/dt = (K * u - y) / τ + d
//! ```
//!
//! 使用显式欧拉法积分，`dt` 需要明显小于 `τ`（`dt > 2τ` 时发散）。

/// 一阶惯性环节
#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    /// 时间常数 τ（秒），`<= 0` 表示无惯性
    time_constant: f64,

    /// 稳态增益 K
    gain: f64,

    /// 恒定扰动 d（单位/秒）
    disturbance: f64,

    value: f64,
}

impl FirstOrderPlant {
    pub fn new(initial: f64, time_constant: f64, gain: f64, disturbance: f64) -> Self {
        Self {
            time_constant,
            gain,
            disturbance,
            value: initial,
        }
    }

    /// 当前输出
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 在输入 `input` 下推进 `dt` 秒
    pub fn step(&mut self, input: f64, dt: f64) -> f64 {
        if self.time_constant <= 0.0 {
            self.value = self.gain * input + self.disturbance * dt;
        } else {
            let rate = (self.gain * input - self.value) / self.time_constant + self.disturbance;
            self.value += rate * dt;
        }
        self.value
    }
}
