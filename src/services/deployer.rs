//! 部署驱动
//!
//! 部署 bundle/charm、发布 offer、跨 model 消费 offer 并建立关联。
//! 任何命令非零退出都会把 stderr 原样带回给调用方。

use tracing::info;

use crate::error::HarnessResult;
use crate::infra::juju::{DeploySpec, Juju};
use crate::infra::terraform::TerraformClient;
use crate::services::template::{TemplateRenderer, TfVars};

/// 跨 model 关联
///
/// 先在本地 model 消费 `<provider_model>.<offer>`，再把两个 `app:endpoint` 关联起来
#[derive(Clone, Debug)]
pub struct CrossModelRelation {
    /// 提供 offer 的 model
    pub provider_model: String,
    /// offer 名称
    pub offer: String,
    /// 消费后的 offer 端点，如 `prometheus:receive-remote-write`
    pub remote_endpoint: String,
    /// 本地端点，如 `grafana-agent-k8s:send-remote-write`
    pub local_endpoint: String,
}

impl CrossModelRelation {
    pub fn new(
        provider_model: impl Into<String>,
        offer: impl Into<String>,
        remote_endpoint: impl Into<String>,
        local_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider_model: provider_model.into(),
            offer: offer.into(),
            remote_endpoint: remote_endpoint.into(),
            local_endpoint: local_endpoint.into(),
        }
    }

    /// `<provider_model>.<offer>`
    pub fn offer_url(&self) -> String {
        format!("{}.{}", self.provider_model, self.offer)
    }
}

/// 部署 charm 或 bundle
pub async fn deploy(juju: &dyn Juju, model: &str, spec: &DeploySpec) -> HarnessResult<()> {
    juju.deploy(model, spec).await?;
    info!(model = %model, application = %spec.application_name(), "Deployed");
    Ok(())
}

/// 发布 offer
pub async fn publish_offer(
    juju: &dyn Juju,
    model: &str,
    endpoint: &str,
    offer_name: &str,
) -> HarnessResult<()> {
    juju.offer(model, endpoint, offer_name).await?;
    info!(model = %model, endpoint = %endpoint, offer = %offer_name, "Offer published");
    Ok(())
}

/// 消费 offer 并建立关联
pub async fn relate_across(
    juju: &dyn Juju,
    model: &str,
    relation: &CrossModelRelation,
) -> HarnessResult<()> {
    juju.consume(model, &relation.offer_url()).await?;
    juju.integrate(model, &relation.remote_endpoint, &relation.local_endpoint)
        .await?;
    info!(
        model = %model,
        offer = %relation.offer_url(),
        remote = %relation.remote_endpoint,
        local = %relation.local_endpoint,
        "Related across models"
    );
    Ok(())
}

/// 通过 Terraform 部署
///
/// 渲染变量文件后执行 `init` 与 `apply -auto-approve`
pub async fn deploy_with_terraform(
    terraform: &TerraformClient,
    renderer: &TemplateRenderer,
    vars: &TfVars,
) -> HarnessResult<()> {
    let contents = renderer.render_tfvars(vars)?;
    terraform.write_vars(&contents).await?;
    terraform.init().await?;
    terraform.apply(true).await?;
    info!(model = %vars.model, work_dir = %terraform.work_dir().display(), "Terraform apply finished");
    Ok(())
}
