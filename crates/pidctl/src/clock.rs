//! # 时间源
//!
//! 控制器每次 `update()` 只读取一次时间，用于计算 `dt`。
//! 时间源通过 [`Clock`] trait 注入：
//!
//! | 实现 | 用途 |
//! |------|------|
//! | [`MonotonicClock`] | 生产环境，`Instant::now()` |
//! | [`ManualClock`] | 单元测试 / 仿真，手动推进时间 |
//!
//! `ManualClock` 的克隆共享同一个时间偏移量，测试可以保留一个句柄，
//! 同时把另一个句柄交给控制器：
//!
//! ```rust
//! use pidctl::{Clock, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let handle = clock.clone();
//!
//! let t0 = clock.now();
//! handle.advance(Duration::from_millis(10));
//! assert_eq!(clock.now() - t0, Duration::from_millis(10));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 时间源接口
pub trait Clock {
    /// 当前时刻
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// 系统单调时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动时钟
///
/// 以创建时的 `Instant` 为基准，加上一个原子存储的纳秒偏移量。
/// 只有调用 [`advance`](Self::advance) / [`set_elapsed`](Self::set_elapsed)
/// 时才会变化，因此 `dt` 完全由测试控制。
///
/// 偏移量允许回退（`set_elapsed` 传入更小的值），用于模拟时钟倒退。
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    /// 创建手动时钟，偏移量为 0
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 向前推进 `dt`
    ///
    /// 偏移量在 `u64::MAX` 纳秒处饱和，不会回绕。
    pub fn advance(&self, dt: Duration) {
        let ns = duration_to_ns(dt);
        // 闭包总是返回 Some，fetch_update 不会失败
        let _ = self
            .offset_ns
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(ns))
            });
    }

    /// 向前推进 `secs` 秒
    ///
    /// 负数、NaN 或溢出的值会被忽略。
    pub fn advance_secs(&self, secs: f64) {
        if let Ok(dt) = Duration::try_from_secs_f64(secs) {
            self.advance(dt);
        }
    }

    /// 直接设置自基准以来经过的时间（可以小于当前值）
    pub fn set_elapsed(&self, elapsed: Duration) {
        self.offset_ns.store(duration_to_ns(elapsed), Ordering::Release);
    }

    /// 自基准以来经过的时间
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::Acquire))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }
}

fn duration_to_ns(dt: Duration) -> u64 {
    u64::try_from(dt.as_nanos()).unwrap_or(u64::MAX)
}
