//! 端到端场景
//!
//! 部署 COS 与 SD-Core、等待收敛、通过 NMS 写入订阅数据、在 gnbsim 上跑一次模拟，
//! 最后确认 Grafana 中存在 SD-Core 仪表盘。
//!
//! 每一步都可以单独调用；步骤之间不共享内存状态，需要的数据都重新从远端读取。

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

use crate::config::env::constants;
use crate::config::{DeployMode, EnvConfig};
use crate::domain::secret::Credentials;
use crate::domain::status::StatusSnapshot;
use crate::domain::Reply;
use crate::error::{HarnessError, HarnessResult};
use crate::infra::grafana::GrafanaClient;
use crate::infra::juju::{DeploySpec, Juju, JujuCli};
use crate::infra::k8s::KubeClient;
use crate::infra::nms::NmsClient;
use crate::infra::terraform::TerraformClient;
use crate::services::actions::{self, run_action};
use crate::services::credentials::wait_for_credentials;
use crate::services::deployer::{self, CrossModelRelation};
use crate::services::readiness::{wait_for_active_idle, ReadinessOptions};
use crate::services::template::{TemplateRenderer, TfVars};
use crate::services::wait::{wait_until, PollPolicy};

const GNBSIM_UNIT: &str = "gnbsim/0";
const GRAFANA_UNIT: &str = "grafana/0";
const START_SIMULATION: &str = "start-simulation";
const GET_ADMIN_PASSWORD: &str = "get-admin-password";
const TRAEFIK_SERVICE: &str = "traefik";

/// 可单独执行的步骤
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// 创建 model 并部署所有组件
    Deploy,
    /// 等待 SD-Core model 收敛
    Wait,
    /// 登录 NMS 并写入订阅数据
    Configure,
    /// 在 gnbsim 上执行模拟
    Simulate,
    /// 导入并检查 Grafana 仪表盘
    Dashboard,
    /// 全部
    All,
}

impl Step {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deploy" => Some(Self::Deploy),
            "wait" => Some(Self::Wait),
            "configure" => Some(Self::Configure),
            "simulate" => Some(Self::Simulate),
            "dashboard" => Some(Self::Dashboard),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// 场景驱动
pub struct Scenario {
    config: EnvConfig,
    juju: Arc<dyn Juju>,
    renderer: TemplateRenderer,
}

impl Scenario {
    pub fn new(config: EnvConfig, juju: Arc<dyn Juju>) -> Self {
        Self {
            config,
            juju,
            renderer: TemplateRenderer::new(),
        }
    }

    /// 使用 `juju` 可执行文件
    pub fn from_config(config: EnvConfig) -> Self {
        let juju = JujuCli::new(config.juju_binary.clone(), config.timeouts.command);
        Self::new(config, Arc::new(juju))
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn juju(&self) -> &dyn Juju {
        self.juju.as_ref()
    }

    fn readiness(&self) -> ReadinessOptions {
        let timeouts = &self.config.timeouts;
        constants::READINESS_EXCLUDED.iter().fold(
            ReadinessOptions::new(timeouts.deploy, timeouts.poll_interval).settle(timeouts.settle),
            |options, app| options.exclude(*app),
        )
    }

    /// 执行指定步骤
    pub async fn run_step(&self, step: Step) -> HarnessResult<()> {
        match step {
            Step::Deploy => self.deploy_all().await,
            Step::Wait => self.wait_ready().await.map(|_| ()),
            Step::Configure => {
                let snapshot = self.juju().status(&self.config.sdcore_model).await?;
                self.configure_sdcore(&snapshot).await
            }
            Step::Simulate => self.run_simulation().await,
            Step::Dashboard => {
                let grafana = self.grafana_client().await?;
                self.verify_dashboard(&grafana).await
            }
            Step::All => self.run().await,
        }
    }

    /// 完整流程
    pub async fn run(&self) -> HarnessResult<()> {
        info!(
            sdcore_model = %self.config.sdcore_model,
            cos_model = %self.config.cos_model,
            mode = %self.config.deploy_mode.as_str(),
            "Starting SD-Core end-to-end scenario"
        );
        self.deploy_all().await?;
        let snapshot = self.wait_ready().await?;
        self.configure_sdcore(&snapshot).await?;
        self.run_simulation().await?;
        let grafana = self.grafana_client().await?;
        self.verify_dashboard(&grafana).await?;
        info!("SD-Core end-to-end scenario passed");
        Ok(())
    }

    /// 创建 model 并部署全部组件
    pub async fn deploy_all(&self) -> HarnessResult<()> {
        self.add_models().await?;
        self.deploy_cos().await?;
        self.deploy_sdcore().await?;
        self.relate_observability().await?;
        self.deploy_router_and_gnbsim().await
    }

    /// 创建 model；SD-Core model 缩短 update-status 间隔以便更快观察到收敛
    pub async fn add_models(&self) -> HarnessResult<()> {
        self.juju().add_model(&self.config.cos_model).await?;
        self.juju().add_model(&self.config.sdcore_model).await?;
        let mut model_config = BTreeMap::new();
        model_config.insert(
            "update-status-hook-interval".to_string(),
            constants::UPDATE_STATUS_INTERVAL.to_string(),
        );
        self.juju()
            .set_model_config(&self.config.sdcore_model, &model_config)
            .await
    }

    /// 部署 cos-lite，等待收敛后发布 prometheus offer，并加载 SD-Core 仪表盘配置
    pub async fn deploy_cos(&self) -> HarnessResult<()> {
        let model = &self.config.cos_model;
        deployer::deploy(self.juju(), model, &DeploySpec::new("cos-lite").trust()).await?;
        wait_for_active_idle(self.juju(), model, &self.readiness()).await?;
        deployer::publish_offer(
            self.juju(),
            model,
            "prometheus:receive-remote-write",
            "prometheus",
        )
        .await?;

        let cos_configuration = DeploySpec::new("cos-configuration-k8s")
            .config("git_repo", "https://github.com/canonical/sdcore-cos-configuration")
            .config("git_branch", "main")
            .config("git_depth", "1")
            .config("grafana_dashboards_path", "grafana_dashboards/sdcore/");
        deployer::deploy(self.juju(), model, &cos_configuration).await?;
        self.juju()
            .integrate(model, "cos-configuration-k8s", "grafana")
            .await
    }

    /// 部署 SD-Core（bundle 或 Terraform）
    pub async fn deploy_sdcore(&self) -> HarnessResult<()> {
        match self.config.deploy_mode {
            DeployMode::Juju => {
                let spec = DeploySpec::new("sdcore")
                    .channel(self.config.channel.clone())
                    .trust();
                deployer::deploy(self.juju(), &self.config.sdcore_model, &spec).await
            }
            DeployMode::Terraform => {
                let work_dir = self.config.terraform.work_dir.clone().ok_or_else(|| {
                    HarnessError::lookup("SDCORE_E2E_TERRAFORM_DIR is required in terraform mode")
                })?;
                let terraform = TerraformClient::new(
                    self.config.terraform.binary.clone(),
                    work_dir,
                    self.config.timeouts.deploy,
                )?;
                let vars = TfVars::new(&self.config.sdcore_model, &self.config.channel);
                deployer::deploy_with_terraform(&terraform, &self.renderer, &vars).await
            }
        }
    }

    /// 把 SD-Core 的指标写入 COS 中的 prometheus
    pub async fn relate_observability(&self) -> HarnessResult<()> {
        let relation = CrossModelRelation::new(
            self.config.cos_model.clone(),
            "prometheus",
            "prometheus:receive-remote-write",
            "grafana-agent-k8s:send-remote-write",
        );
        deployer::relate_across(self.juju(), &self.config.sdcore_model, &relation).await
    }

    pub async fn deploy_router_and_gnbsim(&self) -> HarnessResult<()> {
        let model = &self.config.sdcore_model;
        let router = DeploySpec::new("sdcore-router-k8s")
            .application("router")
            .channel(self.config.channel.clone())
            .trust();
        deployer::deploy(self.juju(), model, &router).await?;

        let gnbsim = DeploySpec::new("sdcore-gnbsim-k8s")
            .application("gnbsim")
            .channel(self.config.channel.clone())
            .trust();
        deployer::deploy(self.juju(), model, &gnbsim).await?;
        self.juju()
            .integrate(model, "gnbsim:fiveg-n2", "amf:fiveg-n2")
            .await
    }

    /// 等待 SD-Core model 收敛
    pub async fn wait_ready(&self) -> HarnessResult<StatusSnapshot> {
        wait_for_active_idle(self.juju(), &self.config.sdcore_model, &self.readiness()).await
    }

    /// 等待 NMS 凭据
    pub async fn wait_credentials(&self) -> HarnessResult<Credentials> {
        let policy = PollPolicy::new(
            self.config.timeouts.credentials,
            self.config.timeouts.poll_interval,
        );
        wait_for_credentials(
            self.juju(),
            &self.config.sdcore_model,
            &self.config.nms.secret_label,
            &policy,
        )
        .await
    }

    /// 根据状态快照中的 unit 地址创建 NMS 客户端
    pub fn nms_client(&self, snapshot: &StatusSnapshot) -> HarnessResult<NmsClient> {
        let app = &self.config.nms.application;
        let address = snapshot.unit_address(app, 0).ok_or_else(|| {
            HarnessError::lookup(format!("no address for {}/0 in model {}", app, self.config.sdcore_model))
        })?;
        NmsClient::new(
            &format!("http://{}:{}", address, self.config.nms.port),
            self.config.timeouts.http,
        )
    }

    /// 等待 NMS 可达并完成初始化
    pub async fn wait_for_nms(&self, nms: &NmsClient) -> HarnessResult<()> {
        let timeout = self.config.timeouts.nms;
        let interval = self.config.timeouts.poll_interval;
        let start = Instant::now();
        wait_until(
            "NMS API to be available",
            &PollPolicy::new(timeout, interval),
            || nms.is_api_available(),
        )
        .await?;

        // 两个阶段共用同一个截止时间
        let remaining = timeout.saturating_sub(start.elapsed());
        wait_until(
            "NMS to be initialized",
            &PollPolicy::new(remaining, interval),
            || nms.is_initialized(),
        )
        .await?;
        info!(url = %nms.url(), "NMS is ready");
        Ok(())
    }

    /// 登录并返回 token
    pub async fn login(&self, nms: &NmsClient, credentials: &Credentials) -> HarnessResult<String> {
        let response = require(
            nms.login(&credentials.username, &credentials.password).await,
            "NMS login",
        )?;
        info!(username = %credentials.username, "Logged in to NMS");
        Ok(response.token)
    }

    /// 创建订阅者、设备组和网络切片
    pub async fn provision(&self, nms: &NmsClient, token: &str) -> HarnessResult<()> {
        let data = &self.config.scenario;
        require(
            nms.create_subscriber(&data.imsi, Some(token)).await,
            "create subscriber",
        )?;
        require(
            nms.create_device_group(&data.device_group, &[data.imsi.clone()], Some(token))
                .await,
            "create device group",
        )?;
        require(
            nms.create_network_slice(
                &data.network_slice,
                &[data.device_group.clone()],
                Some(token),
            )
            .await,
            "create network slice",
        )?;
        info!(
            imsi = %data.imsi,
            device_group = %data.device_group,
            network_slice = %data.network_slice,
            "SD-Core configured"
        );
        Ok(())
    }

    /// 凭据 → NMS 就绪 → 登录 → 写入数据
    pub async fn configure_sdcore(&self, snapshot: &StatusSnapshot) -> HarnessResult<()> {
        let credentials = self.wait_credentials().await?;
        let nms = self.nms_client(snapshot)?;
        self.wait_for_nms(&nms).await?;
        let token = self.login(&nms, &credentials).await?;
        self.provision(&nms, &token).await
    }

    /// 在 gnbsim 上执行模拟并要求成功
    pub async fn run_simulation(&self) -> HarnessResult<()> {
        let result = run_action(
            self.juju(),
            &self.config.sdcore_model,
            GNBSIM_UNIT,
            START_SIMULATION,
            self.config.timeouts.action,
        )
        .await?;
        actions::assert_success(START_SIMULATION, &result)?;
        info!(info = ?result.get_str("info"), "Simulation succeeded");
        Ok(())
    }

    /// 通过 traefik 的外部 IP 访问 COS 中的 Grafana
    pub async fn grafana_client(&self) -> HarnessResult<GrafanaClient> {
        let cos_model = &self.config.cos_model;
        let result = run_action(
            self.juju(),
            cos_model,
            GRAFANA_UNIT,
            GET_ADMIN_PASSWORD,
            self.config.timeouts.action,
        )
        .await?;
        let password = actions::require_str(GET_ADMIN_PASSWORD, &result, "admin-password")?;

        let k8s =
            KubeClient::connect(self.config.kubeconfig.as_deref(), self.config.timeouts.http).await?;
        let ip = k8s.load_balancer_ip(cos_model, TRAEFIK_SERVICE).await?;

        GrafanaClient::new(
            &format!("https://{}/{}-grafana", ip, cos_model),
            constants::GRAFANA_USER,
            password,
            self.config.timeouts.http,
        )
    }

    /// 导入 SD-Core 仪表盘并确认其存在
    pub async fn verify_dashboard(&self, grafana: &GrafanaClient) -> HarnessResult<()> {
        let datasource = grafana.datasource_uid("prometheus").await?;
        let dashboard = self.renderer.render_dashboard(&datasource)?;
        grafana.import_dashboard(&dashboard).await?;

        if !grafana.dashboard_exists(constants::DASHBOARD_TITLE).await? {
            return Err(HarnessError::assertion(format!(
                "dashboard {:?} not found in Grafana at {}",
                constants::DASHBOARD_TITLE,
                grafana.base_url()
            )));
        }
        info!(title = %constants::DASHBOARD_TITLE, "Dashboard present in Grafana");
        Ok(())
    }
}

/// 设置类调用没有结果时视为断言失败
fn require<T>(reply: Reply<T>, what: &str) -> HarnessResult<T> {
    reply
        .into_option()
        .ok_or_else(|| HarnessError::assertion(format!("{} returned no result", what)))
}
