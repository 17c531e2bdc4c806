//! 通用轮询工具
//!
//! 固定间隔轮询直到条件满足或超时，不做指数退避也不加抖动。
//! 就绪轮询、凭据读取和 NMS 可用性检查共用这一实现。

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// 轮询参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollPolicy {
    /// 最长等待时间
    pub timeout: Duration,
    /// 两次检查之间的固定间隔
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_secs(timeout_secs: u64, interval_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(timeout_secs),
            Duration::from_secs(interval_secs),
        )
    }
}

/// 单次检查的结果
#[derive(Debug)]
pub enum Check<T> {
    /// 条件满足
    Ready(T),
    /// 尚未满足，附带当前观测到的状态（用于超时诊断）
    NotReady(Option<String>),
}

/// 轮询直到 `check` 返回 `Ready`
///
/// 第一次检查立即执行；超过 `timeout` 后不再检查，返回 `Timeout`，
/// 其中携带最后一次观测到的状态。因此返回超时的时刻位于 `[timeout, timeout + interval]`。
pub async fn poll_until<T, F, Fut>(what: &str, policy: &PollPolicy, mut check: F) -> HarnessResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Check<T>>,
{
    let start = Instant::now();
    let mut last_observed = None;

    loop {
        match check().await {
            Check::Ready(value) => return Ok(value),
            Check::NotReady(observed) => {
                if observed.is_some() {
                    last_observed = observed;
                }
            }
        }

        let waited = start.elapsed();
        if waited >= policy.timeout {
            return Err(HarnessError::Timeout {
                what: what.to_string(),
                waited,
                last_observed,
            });
        }

        debug!(what = %what, waited_secs = waited.as_secs(), "Not ready yet, sleeping {:?}", policy.interval);
        sleep(policy.interval).await;
    }
}

/// 轮询布尔条件
pub async fn wait_until<F, Fut>(what: &str, policy: &PollPolicy, mut predicate: F) -> HarnessResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    poll_until(what, policy, || {
        let ready = predicate();
        async move {
            if ready.await {
                Check::Ready(())
            } else {
                Check::NotReady(None)
            }
        }
    })
    .await
}
