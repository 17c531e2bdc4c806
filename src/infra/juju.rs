//! Juju CLI 适配器
//!
//! 所有命令都通过 `-m <model>` 指定目标 model，不修改全局的当前 model。
//! 支持 JSON 输出的命令一律使用 `--format=json`。

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

use crate::domain::action::{self, ActionResult};
use crate::domain::secret::{self, SecretMeta};
use crate::domain::status::StatusSnapshot;
use crate::error::{HarnessError, HarnessResult};
use crate::infra::command::CommandRunner;

/// 部署一个 charm 或 bundle 所需的参数
#[derive(Clone, Debug, Default)]
pub struct DeploySpec {
    /// charm/bundle 名称或 URL
    pub entity: String,
    /// 应用名（默认与 charm 同名）
    pub application: Option<String>,
    /// 发布渠道，如 `1.5/edge`
    pub channel: Option<String>,
    /// 是否授予集群权限
    pub trust: bool,
    /// 部署时的应用配置
    pub config: BTreeMap<String, String>,
}

impl DeploySpec {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Default::default()
        }
    }

    pub fn application(mut self, name: impl Into<String>) -> Self {
        self.application = Some(name.into());
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn trust(mut self) -> Self {
        self.trust = true;
        self
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// 部署后的应用名
    pub fn application_name(&self) -> &str {
        self.application.as_deref().unwrap_or(&self.entity)
    }

    /// 生成 `juju deploy` 参数
    pub fn to_args(&self, model: &str) -> Vec<String> {
        let mut args = vec![
            "deploy".to_string(),
            "-m".to_string(),
            model.to_string(),
            self.entity.clone(),
        ];
        if let Some(ref app) = self.application {
            args.push(app.clone());
        }
        if let Some(ref channel) = self.channel {
            args.push(format!("--channel={}", channel));
        }
        if self.trust {
            args.push("--trust".to_string());
        }
        for (key, value) in &self.config {
            args.push("--config".to_string());
            args.push(format!("{}={}", key, value));
        }
        args
    }
}

/// 部署平台 CLI 接口
///
/// 生产实现为 [`JujuCli`]，测试中可替换为内存实现
#[async_trait]
pub trait Juju: Send + Sync {
    /// 创建 model
    async fn add_model(&self, model: &str) -> HarnessResult<()>;

    /// 部署 charm 或 bundle
    async fn deploy(&self, model: &str, spec: &DeploySpec) -> HarnessResult<()>;

    /// 关联两个 `app:endpoint`
    async fn integrate(&self, model: &str, first: &str, second: &str) -> HarnessResult<()>;

    /// 发布跨 model 的 offer
    async fn offer(&self, model: &str, endpoint: &str, offer_name: &str) -> HarnessResult<()>;

    /// 在当前 model 中消费其他 model 的 offer
    async fn consume(&self, model: &str, offer_url: &str) -> HarnessResult<()>;

    /// 获取 model 状态
    async fn status(&self, model: &str) -> HarnessResult<StatusSnapshot>;

    /// 列出 model 中的 secret
    async fn secrets(&self, model: &str) -> HarnessResult<BTreeMap<String, SecretMeta>>;

    /// 读取 secret 内容，尚无内容时返回 `None`
    async fn reveal_secret(
        &self,
        model: &str,
        secret_id: &str,
    ) -> HarnessResult<Option<BTreeMap<String, String>>>;

    /// 在 unit 上执行 action 并等待结果
    async fn run_action(
        &self,
        model: &str,
        unit: &str,
        action: &str,
        params: &BTreeMap<String, String>,
        wait: Duration,
    ) -> HarnessResult<ActionResult>;

    /// 设置 model 配置
    async fn set_model_config(
        &self,
        model: &str,
        config: &BTreeMap<String, String>,
    ) -> HarnessResult<()>;

    /// 设置应用配置
    async fn set_config(
        &self,
        model: &str,
        application: &str,
        config: &BTreeMap<String, String>,
    ) -> HarnessResult<()>;
}

/// 基于 `juju` 可执行文件的实现
#[derive(Clone, Debug)]
pub struct JujuCli {
    binary: String,
    command_timeout: Duration,
}

impl JujuCli {
    pub fn new(binary: impl Into<String>, command_timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            command_timeout,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[String]) -> HarnessResult<String> {
        self.run_with_timeout(args, self.command_timeout).await
    }

    async fn run_with_timeout(&self, args: &[String], timeout: Duration) -> HarnessResult<String> {
        CommandRunner::run_checked(&self.binary, args, None, timeout).await
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn key_values(config: &BTreeMap<String, String>) -> impl Iterator<Item = String> + '_ {
    config.iter().map(|(k, v)| format!("{}={}", k, v))
}

#[async_trait]
impl Juju for JujuCli {
    async fn add_model(&self, model: &str) -> HarnessResult<()> {
        info!(model = %model, "Creating model");
        self.run(&args(["add-model", model])).await.map(|_| ())
    }

    async fn deploy(&self, model: &str, spec: &DeploySpec) -> HarnessResult<()> {
        info!(
            model = %model,
            entity = %spec.entity,
            application = %spec.application_name(),
            channel = ?spec.channel,
            "Deploying"
        );
        self.run(&spec.to_args(model)).await.map(|_| ())
    }

    async fn integrate(&self, model: &str, first: &str, second: &str) -> HarnessResult<()> {
        info!(model = %model, first = %first, second = %second, "Integrating");
        self.run(&args(["integrate", "-m", model, first, second]))
            .await
            .map(|_| ())
    }

    async fn offer(&self, model: &str, endpoint: &str, offer_name: &str) -> HarnessResult<()> {
        info!(model = %model, endpoint = %endpoint, offer = %offer_name, "Creating offer");
        self.run(&args(["offer", "-m", model, endpoint, offer_name]))
            .await
            .map(|_| ())
    }

    async fn consume(&self, model: &str, offer_url: &str) -> HarnessResult<()> {
        info!(model = %model, offer = %offer_url, "Consuming offer");
        self.run(&args(["consume", "-m", model, offer_url]))
            .await
            .map(|_| ())
    }

    async fn status(&self, model: &str) -> HarnessResult<StatusSnapshot> {
        let out = self
            .run(&args(["status", "-m", model, "--format=json"]))
            .await?;
        StatusSnapshot::from_json(&out)
            .map_err(|e| HarnessError::decode(format!("status of model {}", model), e))
    }

    async fn secrets(&self, model: &str) -> HarnessResult<BTreeMap<String, SecretMeta>> {
        let out = self
            .run(&args(["secrets", "-m", model, "--format=json"]))
            .await?;
        if out.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&out)
            .map_err(|e| HarnessError::decode(format!("secrets of model {}", model), e))
    }

    async fn reveal_secret(
        &self,
        model: &str,
        secret_id: &str,
    ) -> HarnessResult<Option<BTreeMap<String, String>>> {
        let out = self
            .run(&args([
                "show-secret",
                "-m",
                model,
                "--reveal",
                "--format=json",
                secret_id,
            ]))
            .await?;
        secret::parse_revealed(&out, secret_id)
            .map_err(|e| HarnessError::decode(format!("secret {}", secret_id), e))
    }

    async fn run_action(
        &self,
        model: &str,
        unit: &str,
        action_name: &str,
        params: &BTreeMap<String, String>,
        wait: Duration,
    ) -> HarnessResult<ActionResult> {
        info!(model = %model, unit = %unit, action = %action_name, "Running action");
        let mut cmd = args(["run", "-m", model, unit, action_name]);
        cmd.extend(key_values(params));
        cmd.push(format!("--wait={}s", wait.as_secs()));
        cmd.push("--format=json".to_string());

        // 命令自身的超时要比 --wait 宽松
        let out = self
            .run_with_timeout(&cmd, wait + self.command_timeout)
            .await?;
        match action::parse_action_output(&out, unit)
            .map_err(|e| HarnessError::decode(format!("{} action output", action_name), e))?
        {
            Some((result, status)) => {
                info!(unit = %unit, action = %action_name, status = ?status, "Action finished");
                Ok(result)
            }
            None => Err(HarnessError::lookup(format!(
                "no results for action {} on {}",
                action_name, unit
            ))),
        }
    }

    async fn set_model_config(
        &self,
        model: &str,
        config: &BTreeMap<String, String>,
    ) -> HarnessResult<()> {
        let mut cmd = args(["model-config", "-m", model]);
        cmd.extend(key_values(config));
        self.run(&cmd).await.map(|_| ())
    }

    async fn set_config(
        &self,
        model: &str,
        application: &str,
        config: &BTreeMap<String, String>,
    ) -> HarnessResult<()> {
        let mut cmd = args(["config", "-m", model, application]);
        cmd.extend(key_values(config));
        self.run(&cmd).await.map(|_| ())
    }
}
