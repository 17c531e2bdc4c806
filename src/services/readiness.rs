//! 部署就绪轮询
//!
//! 反复获取 model 状态，直到所有（未排除的）unit 都是 active/idle

use std::time::Duration;
use tracing::{info, warn};

use crate::domain::status::StatusSnapshot;
use crate::error::HarnessResult;
use crate::infra::juju::Juju;
use crate::services::wait::{poll_until, Check, PollPolicy};

/// 就绪等待参数
#[derive(Clone, Debug)]
pub struct ReadinessOptions {
    pub policy: PollPolicy,
    /// 收敛后额外等待的时间，吸收刚收敛时的状态抖动
    pub settle: Duration,
    /// 不参与判断的应用
    pub excluded: Vec<String>,
}

impl ReadinessOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            policy: PollPolicy::new(timeout, poll_interval),
            settle: Duration::ZERO,
            excluded: Vec::new(),
        }
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn exclude(mut self, application: impl Into<String>) -> Self {
        self.excluded.push(application.into());
        self
    }
}

/// 等待 model 中所有 unit 变为 active/idle
///
/// 状态命令失败视为未就绪；超时时返回的错误中携带最后一次快照里未就绪的 unit
pub async fn wait_for_active_idle(
    juju: &dyn Juju,
    model: &str,
    options: &ReadinessOptions,
) -> HarnessResult<StatusSnapshot> {
    let what = format!("model {} to be active/idle", model);

    let snapshot = poll_until(&what, &options.policy, move || async move {
        match juju.status(model).await {
            Ok(snapshot) => {
                let pending = snapshot.not_ready(&options.excluded);
                if pending.is_empty() {
                    return Check::Ready(snapshot);
                }
                for unit in &pending {
                    info!(
                        model = %model,
                        unit = %unit.unit,
                        workload = %unit.workload,
                        agent = %unit.agent,
                        "Waiting for unit"
                    );
                }
                Check::NotReady(Some(snapshot.describe_not_ready(&options.excluded)))
            }
            Err(e) => {
                warn!(model = %model, error = %e, "Failed to fetch status");
                Check::NotReady(Some(format!("status unavailable: {}", e)))
            }
        }
    })
    .await?;

    if !options.settle.is_zero() {
        info!(model = %model, settle = ?options.settle, "Model converged, letting it settle");
        tokio::time::sleep(options.settle).await;
    }
    info!(model = %model, "Deployment is ready");
    Ok(snapshot)
}
