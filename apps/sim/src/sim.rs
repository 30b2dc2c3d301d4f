//! 闭环仿真
//!
//! 每一步：读取对象输出 → `pid.update()` → 记录 → 推进时间 → 对象积分。
//!
//! 时间推进由调用方提供的 `tick` 决定：
//! - 仿真模式：推进 `ManualClock` 并返回名义 `dt`
//! - 实时模式：`spin_sleep` 休眠一个周期并返回实际 `dt`

use crate::plant::FirstOrderPlant;
use pidctl::{Clock, PidController};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// 仿真运行参数
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub setpoint: f64,
    pub steps: usize,
    /// 在第几步调用 `reset()`
    pub reset_at: Option<usize>,
}

/// 单步记录
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub step: usize,
    /// 仿真时间（秒）
    pub t: f64,
    pub setpoint: f64,
    pub measured: f64,
    pub output: f64,
    pub saturated: bool,
    pub integral: f64,
}

/// 仿真结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub steps: usize,
    pub final_value: f64,
    pub steady_state_error: f64,
    pub saturated_steps: usize,
}

/// 运行闭环仿真
///
/// `running` 被置为 `false` 时提前结束（Ctrl+C）。
pub fn simulate<C, T, S>(
    pid: &mut PidController<C>,
    plant: &mut FirstOrderPlant,
    settings: &RunSettings,
    running: &AtomicBool,
    mut tick: T,
    mut sink: S,
) -> anyhow::Result<Summary>
where
    C: Clock,
    T: FnMut() -> f64,
    S: FnMut(&Sample) -> anyhow::Result<()>,
{
    let mut t = 0.0;
    let mut saturated_steps = 0;
    let mut steps = 0;

    for step in 0..settings.steps {
        if !running.load(Ordering::Acquire) {
            tracing::info!("Simulation interrupted at step {}", step);
            break;
        }

        if settings.reset_at == Some(step) {
            tracing::info!("Resetting controller at step {}", step);
            pid.reset();
        }

        let measured = plant.value();
        let output = pid.update(settings.setpoint, measured);
        if pid.saturated() {
            saturated_steps += 1;
        }

        let sample = Sample {
            step,
            t,
            setpoint: settings.setpoint,
            measured,
            output,
            saturated: pid.saturated(),
            integral: pid.integral(),
        };
        tracing::debug!(step, measured, output, saturated = sample.saturated, "sim step");
        sink(&sample)?;
        steps += 1;

        let dt = tick();
        plant.step(output, dt);
        t += dt;
    }

    let final_value = plant.value();
    Ok(Summary {
        steps,
        final_value,
        steady_state_error: settings.setpoint - final_value,
        saturated_steps,
    })
}
