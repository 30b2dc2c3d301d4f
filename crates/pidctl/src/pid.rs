//! PID Controller - 比例-积分-微分控制器
//!
//! 离散时间 PID 控制器，带死区、输出饱和检测和积分抗饱和。
//!
//! # 算法
//!
//! ```text
//! e      = setpoint - measured
//! P      = Kp * e
//! D      = Kd * (e - e_prev) / dt
//! I      = Ki * ∫e dt            (使用上一次调用结束时的积分)
//! output = clamp(P + I + D, min_output, max_output)
//! ```
//!
//! 积分使用梯形法累积：`∫ += 0.5 * dt * (e + e_prev)`。
//! 新的积分值只在**下一次**调用时才参与输出，本次输出用的是旧值。
//! 这一步滞后是控制器暂态响应的一部分，不要改成立即生效。
//!
//! # 特性
//!
//! - **死区**: `|e| < deadband` 时直接返回上一次输出，不修改任何状态
//! - **饱和标志**: 输出被钳位且钳位方向与误差方向一致时置位
//! - **积分抗饱和**: 开启后，饱和期间冻结积分
//! - **时间源注入**: 通过 [`Clock`] 计算 `dt`，测试可使用 [`ManualClock`]
//!
//! # 时间处理
//!
//! - 构造后的第一次 `update()` 只建立时间基准，`dt = 0`，返回上一次输出（初始为 0）
//! - `dt <= 0`（时钟未前进或倒退）时返回上一次输出，不修改状态
//! - `reset()` 以当前时刻作为新的时间基准
//!
//! # 示例
//!
//! ```rust
//! use pidctl::{ManualClock, PidController};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut pid = PidController::new_with_clock(1.0, 0.0, 0.0, -100.0, 100.0, clock.clone());
//!
//! // 第一次调用建立时间基准
//! assert_eq!(pid.update(10.0, 5.0), 0.0);
//!
//! clock.advance(Duration::from_millis(10));
//! assert_eq!(pid.update(10.0, 5.0), 5.0);
//! ```
//!
//! [`ManualClock`]: crate::clock::ManualClock

use crate::clock::{Clock, MonotonicClock};
use crate::config::{PidConfig, PidGains};
use crate::controller::Controller;
use std::time::Instant;

/// PID 控制器
///
/// 类型参数 `C` 为时间源，默认使用系统单调时钟。
#[derive(Debug, Clone)]
pub struct PidController<C = MonotonicClock> {
    /// 比例增益 (Kp)
    kp: f64,

    /// 积分增益 (Ki)
    ki: f64,

    /// 微分增益 (Kd)
    kd: f64,

    /// 输出下限
    min_output: f64,

    /// 输出上限
    max_output: f64,

    /// 死区阈值
    deadband: f64,

    /// 积分抗饱和开关
    anti_windup: bool,

    /// 最近一次输出是否在误差方向上饱和
    saturated: bool,

    /// 上一次的误差（用于计算微分和梯形积分）
    prev_error: f64,

    /// 积分项累积值
    integral: f64,

    /// 上一次更新时刻，`None` 表示尚未建立时间基准
    last_update: Option<Instant>,

    /// 上一次输出
    last_output: f64,

    clock: C,
}

impl PidController<MonotonicClock> {
    /// 创建新的 PID 控制器（系统时钟）
    ///
    /// 死区默认为 0，积分抗饱和默认关闭。
    ///
    /// `min_output <= max_output` 由调用方保证，这里不做校验。
    pub fn new(kp: f64, ki: f64, kd: f64, min_output: f64, max_output: f64) -> Self {
        Self::new_with_clock(kp, ki, kd, min_output, max_output, MonotonicClock)
    }

    /// 从配置创建（系统时钟）
    pub fn from_config(config: &PidConfig) -> Self {
        Self::from_config_with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> PidController<C> {
    /// 使用指定时间源创建
    pub fn new_with_clock(
        kp: f64,
        ki: f64,
        kd: f64,
        min_output: f64,
        max_output: f64,
        clock: C,
    ) -> Self {
        PidController {
            kp,
            ki,
            kd,
            min_output,
            max_output,
            deadband: 0.0,
            anti_windup: false,
            saturated: false,
            prev_error: 0.0,
            integral: 0.0,
            last_update: None,
            last_output: 0.0,
            clock,
        }
    }

    /// 从配置创建，使用指定时间源
    pub fn from_config_with_clock(config: &PidConfig, clock: C) -> Self {
        Self::new_with_clock(
            config.kp,
            config.ki,
            config.kd,
            config.min_output,
            config.max_output,
            clock,
        )
        .with_deadband(config.deadband)
        .with_anti_windup(config.anti_windup)
    }

    /// 设置死区
    pub fn with_deadband(mut self, deadband: f64) -> Self {
        self.deadband = deadband;
        self
    }

    /// 设置积分抗饱和
    pub fn with_anti_windup(mut self, enabled: bool) -> Self {
        self.anti_windup = enabled;
        self
    }

    /// 更换时间源
    ///
    /// 保留全部参数，内部状态回到刚构造时的样子。
    pub fn with_clock<D: Clock>(self, clock: D) -> PidController<D> {
        PidController::new_with_clock(
            self.kp,
            self.ki,
            self.kd,
            self.min_output,
            self.max_output,
            clock,
        )
        .with_deadband(self.deadband)
        .with_anti_windup(self.anti_windup)
    }

    /// 计算一步控制输出
    ///
    /// # 返回
    ///
    /// 钳位到 `[min_output, max_output]` 的输出。以下情况直接返回上一次输出，
    /// 不修改任何状态：
    ///
    /// - 自上一次更新以来时间没有前进（包括第一次调用）
    /// - `|setpoint - measured| < deadband`
    ///
    /// 注意：第一次调用返回初始值 0，即使 0 不在 `[min_output, max_output]` 内。
    pub fn update(&mut self, setpoint: f64, measured: f64) -> f64 {
        let now = self.clock.now();
        let last = *self.last_update.get_or_insert(now);

        let dt = match now.checked_duration_since(last) {
            Some(elapsed) if !elapsed.is_zero() => elapsed.as_secs_f64(),
            _ => {
                tracing::trace!("PID update with no elapsed time, holding last output");
                return self.last_output;
            },
        };

        // 1. 计算误差
        let error = setpoint - measured;

        // 2. 死区
        if error.abs() < self.deadband {
            tracing::trace!(error, deadband = self.deadband, "PID error inside deadband");
            return self.last_output;
        }

        // 3. 比例项（P）
        let p_term = self.kp * error;

        // 4. 微分项（D），Kd 为 0 时跳过
        let d_term = if self.kd != 0.0 {
            self.kd * (error - self.prev_error) / dt
        } else {
            0.0
        };

        // 5. 梯形积分（下一次调用才生效）
        let integral = self.integral + 0.5 * dt * (error + self.prev_error);

        // 6. 积分项（I）使用旧的积分值
        let i_term = self.ki * self.integral;

        // 7. 钳位输出，饱和方向由误差符号决定
        let raw = p_term + i_term + d_term;
        let (output, saturated) = if raw > self.max_output {
            (self.max_output, error > 0.0)
        } else if raw < self.min_output {
            (self.min_output, error < 0.0)
        } else {
            (raw, false)
        };

        if saturated != self.saturated {
            tracing::debug!(saturated, raw, output, "PID saturation changed");
        }

        // 8. 更新状态
        self.prev_error = error;
        self.last_update = Some(now);
        self.last_output = output;
        self.saturated = saturated;
        if !(self.anti_windup && saturated) {
            self.integral = integral;
        }

        output
    }

    /// 重置控制器
    ///
    /// 清零误差和积分，并以当前时刻作为新的时间基准。
    ///
    /// ⚠️ 饱和标志和上一次输出**不会**被清除，需要的话由调用方自行处理。
    pub fn reset(&mut self) {
        self.prev_error = 0.0;
        self.integral = 0.0;
        self.last_update = Some(self.clock.now());

        tracing::debug!(
            last_output = self.last_output,
            saturated = self.saturated,
            "PID controller reset"
        );
    }

    /// 最近一次输出是否饱和
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// 上一次输出
    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    /// 当前积分累积值
    ///
    /// 用于调试和监控。
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// 上一次的误差
    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    /// 上一次更新时刻
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    /// 修改增益，不影响累积状态
    pub fn set_gains(&mut self, gains: PidGains) {
        self.kp = gains.kp;
        self.ki = gains.ki;
        self.kd = gains.kd;
    }

    /// 输出限制 `(min, max)`
    pub fn output_limits(&self) -> (f64, f64) {
        (self.min_output, self.max_output)
    }

    /// 修改输出限制，不影响累积状态
    pub fn set_output_limits(&mut self, min_output: f64, max_output: f64) {
        self.min_output = min_output;
        self.max_output = max_output;
    }

    pub fn deadband(&self) -> f64 {
        self.deadband
    }

    pub fn set_deadband(&mut self, deadband: f64) {
        self.deadband = deadband;
    }

    pub fn anti_windup(&self) -> bool {
        self.anti_windup
    }

    pub fn set_anti_windup(&mut self, enabled: bool) {
        self.anti_windup = enabled;
    }

    /// 当前参数快照
    pub fn config(&self) -> PidConfig {
        PidConfig {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            min_output: self.min_output,
            max_output: self.max_output,
            deadband: self.deadband,
            anti_windup: self.anti_windup,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> Controller for PidController<C> {
    fn update(&mut self, setpoint: f64, measured: f64) -> f64 {
        PidController::update(self, setpoint, measured)
    }

    fn reset(&mut self) {
        PidController::reset(self)
    }
}
