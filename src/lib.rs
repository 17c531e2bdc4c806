//! SD-Core 端到端部署测试工具
//!
//! 在 Juju 管理的 Kubernetes 上部署 SD-Core 与 COS，等待收敛，
//! 通过 NMS 写入订阅数据并用 gnbsim 验证会话建立。

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

use tracing::info;

use crate::config::{DeployMode, EnvConfig};
use crate::error::HarnessResult;
use crate::services::{Scenario, Step};

/// 命令行覆盖项
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// 要执行的步骤
    pub step: Step,
    /// 覆盖 `SDCORE_E2E_DEPLOY_MODE`
    pub deploy_mode: Option<DeployMode>,
    /// 覆盖 `SDCORE_E2E_CHANNEL`
    pub channel: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            step: Step::All,
            deploy_mode: None,
            channel: None,
        }
    }
}

/// 加载配置并执行场景
pub async fn run_with_config(runtime: RuntimeConfig) -> HarnessResult<()> {
    let mut config = EnvConfig::from_env();
    if let Some(mode) = runtime.deploy_mode {
        config.deploy_mode = mode;
    }
    if let Some(channel) = runtime.channel {
        config.channel = channel;
    }

    info!(
        version = %crate::config::env::constants::VERSION,
        step = ?runtime.step,
        sdcore_model = %config.sdcore_model,
        cos_model = %config.cos_model,
        channel = %config.channel,
        mode = %config.deploy_mode.as_str(),
        "sdcore-e2e starting"
    );

    Scenario::from_config(config).run_step(runtime.step).await
}
