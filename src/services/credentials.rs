//! 凭据读取
//!
//! 部署完成后，NMS 会把登录凭据写入带 label 的 Juju secret。
//! secret 不存在或字段缺失都视为"尚未就绪"，而不是错误。

use tracing::{info, warn};

use crate::domain::secret::{self, Credentials};
use crate::error::HarnessResult;
use crate::infra::juju::Juju;
use crate::services::wait::{poll_until, Check, PollPolicy};

/// 读取一次凭据
///
/// 任何失败（命令失败、secret 不存在、字段缺失）都返回 `None`。不记录密码。
pub async fn read_credentials(juju: &dyn Juju, model: &str, label: &str) -> Option<Credentials> {
    let secrets = match juju.secrets(model).await {
        Ok(secrets) => secrets,
        Err(e) => {
            warn!(model = %model, error = %e, "Failed to list secrets");
            return None;
        }
    };

    let Some(secret_id) = secret::find_secret_id(&secrets, label) else {
        warn!(model = %model, label = %label, "Could not find secret with label");
        return None;
    };

    let data = match juju.reveal_secret(model, secret_id).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            info!(model = %model, label = %label, "Secret has no content yet");
            return None;
        }
        Err(e) => {
            warn!(model = %model, label = %label, error = %e, "Failed to reveal secret");
            return None;
        }
    };

    let credentials = Credentials::from_data(&data);
    if credentials.is_none() {
        info!(model = %model, label = %label, "Secret is missing username or password");
    }
    credentials
}

/// 等待凭据出现
///
/// 超时只返回 `Timeout` 错误
pub async fn wait_for_credentials(
    juju: &dyn Juju,
    model: &str,
    label: &str,
    policy: &PollPolicy,
) -> HarnessResult<Credentials> {
    let what = format!("credentials in secret {} of model {}", label, model);
    let credentials = poll_until(&what, policy, move || async move {
        match read_credentials(juju, model, label).await {
            Some(credentials) => Check::Ready(credentials),
            None => Check::NotReady(None),
        }
    })
    .await?;

    info!(model = %model, label = %label, username = %credentials.username, "Credentials available");
    Ok(credentials)
}
