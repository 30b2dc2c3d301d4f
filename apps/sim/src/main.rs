//! # pidctl-sim
//!
//! PID 控制器闭环仿真工具：驱动 `PidController` 控制一阶惯性对象。
//!
//! ## 仿真模式（默认）
//!
//! 使用手动时钟，每步精确推进 `--dt-ms`，结果可复现：
//!
//! ```bash
//! pidctl-sim --kp 2 --ki 1 --setpoint 1 --steps 1000
//! pidctl-sim --config pid.toml --format json > trace.jsonl
//! ```
//!
//! ## 实时模式
//!
//! 使用系统时钟，`spin_sleep` 按周期休眠，Ctrl+C 结束：
//!
//! ```bash
//! pidctl-sim --config pid.toml --realtime --dt-ms 20
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use pidctl::{ManualClock, PidConfig, PidController};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

mod plant;
mod sim;

use plant::FirstOrderPlant;
use sim::{RunSettings, Sample, Summary, simulate};

/// pidctl-sim - PID 闭环仿真
#[derive(Parser, Debug)]
#[command(name = "pidctl-sim")]
#[command(about = "Closed-loop PID simulation against a first-order plant", long_about = None)]
#[command(version)]
struct Cli {
    /// PID 参数文件（TOML），命令行参数优先
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    pid: PidArgs,

    #[command(flatten)]
    plant: PlantArgs,

    #[command(flatten)]
    run: RunArgs,
}

/// PID 参数覆盖
#[derive(Args, Debug)]
struct PidArgs {
    /// 比例增益
    #[arg(long, allow_negative_numbers = true)]
    kp: Option<f64>,

    /// 积分增益
    #[arg(long, allow_negative_numbers = true)]
    ki: Option<f64>,

    /// 微分增益
    #[arg(long, allow_negative_numbers = true)]
    kd: Option<f64>,

    /// 输出下限
    #[arg(long, allow_negative_numbers = true)]
    min: Option<f64>,

    /// 输出上限
    #[arg(long, allow_negative_numbers = true)]
    max: Option<f64>,

    /// 死区
    #[arg(long)]
    deadband: Option<f64>,

    /// 开启积分抗饱和
    #[arg(long)]
    anti_windup: bool,
}

impl PidArgs {
    fn apply(&self, mut config: PidConfig) -> PidConfig {
        if let Some(kp) = self.kp {
            config.kp = kp;
        }
        if let Some(ki) = self.ki {
            config.ki = ki;
        }
        if let Some(kd) = self.kd {
            config.kd = kd;
        }
        if let Some(min) = self.min {
            config.min_output = min;
        }
        if let Some(max) = self.max {
            config.max_output = max;
        }
        if let Some(deadband) = self.deadband {
            config.deadband = deadband;
        }
        if self.anti_windup {
            config.anti_windup = true;
        }
        config
    }
}

/// 被控对象参数
#[derive(Args, Debug)]
struct PlantArgs {
    /// 初始输出
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    initial: f64,

    /// 时间常数（秒）
    #[arg(long, default_value_t = 1.0)]
    time_constant: f64,

    /// 稳态增益
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    plant_gain: f64,

    /// 恒定扰动（单位/秒）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    disturbance: f64,
}

/// 运行参数
#[derive(Args, Debug)]
struct RunArgs {
    /// 目标值
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    setpoint: f64,

    /// 仿真步数
    #[arg(long, default_value_t = 500)]
    steps: usize,

    /// 步长（毫秒）
    #[arg(long, default_value_t = 10)]
    dt_ms: u64,

    /// 在第几步重置控制器
    #[arg(long)]
    reset_at: Option<usize>,

    /// 使用系统时钟实时运行
    #[arg(long)]
    realtime: bool,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// 对齐表格
    Table,
    /// 每行一个 JSON 对象
    Json,
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 留给数据）
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pidctl_sim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => PidConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PidConfig::default(),
    };
    let config = cli.pid.apply(base);
    if config.is_degenerate() {
        tracing::warn!(?config, "Running with degenerate PID config");
    }
    anyhow::ensure!(cli.run.dt_ms > 0, "--dt-ms must be > 0");

    tracing::info!(
        kp = config.kp,
        ki = config.ki,
        kd = config.kd,
        min_output = config.min_output,
        max_output = config.max_output,
        deadband = config.deadband,
        anti_windup = config.anti_windup,
        "Starting simulation"
    );

    let mut plant = FirstOrderPlant::new(
        cli.plant.initial,
        cli.plant.time_constant,
        cli.plant.plant_gain,
        cli.plant.disturbance,
    );
    let settings = RunSettings {
        setpoint: cli.run.setpoint,
        steps: cli.run.steps,
        reset_at: cli.run.reset_at,
    };
    let period = Duration::from_millis(cli.run.dt_ms);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if cli.run.format == OutputFormat::Table {
        writeln!(
            out,
            "{:>6} {:>10} {:>10} {:>12} {:>12} {:>5} {:>12}",
            "step", "t", "setpoint", "measured", "output", "sat", "integral"
        )?;
    }
    let format = cli.run.format;
    let sink = |sample: &Sample| write_sample(&mut out, format, sample);

    let running = Arc::new(AtomicBool::new(true));

    let summary = if cli.run.realtime {
        let flag = running.clone();
        ctrlc::set_handler(move || flag.store(false, Ordering::Release))
            .context("failed to install Ctrl+C handler")?;

        let mut pid = PidController::from_config(&config);
        let mut last = Instant::now();
        let tick = || {
            spin_sleep::sleep(period);
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;
            dt
        };
        simulate(&mut pid, &mut plant, &settings, &running, tick, sink)?
    } else {
        let clock = ManualClock::new();
        let mut pid = PidController::from_config_with_clock(&config, clock.clone());
        let tick = || {
            clock.advance(period);
            period.as_secs_f64()
        };
        simulate(&mut pid, &mut plant, &settings, &running, tick, sink)?
    };

    out.flush()?;
    report(&summary);
    Ok(())
}

fn write_sample<W: Write>(out: &mut W, format: OutputFormat, sample: &Sample) -> Result<()> {
    match format {
        OutputFormat::Table => writeln!(
            out,
            "{:>6} {:>10.3} {:>10.4} {:>12.6} {:>12.6} {:>5} {:>12.6}",
            sample.step,
            sample.t,
            sample.setpoint,
            sample.measured,
            sample.output,
            if sample.saturated { "yes" } else { "no" },
            sample.integral
        )?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, sample)?;
            writeln!(out)?;
        },
    }
    Ok(())
}

fn report(summary: &Summary) {
    tracing::info!(
        steps = summary.steps,
        final_value = summary.final_value,
        steady_state_error = summary.steady_state_error,
        saturated_steps = summary.saturated_steps,
        "Simulation finished"
    );
}
