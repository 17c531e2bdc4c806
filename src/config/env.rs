//! 环境变量配置加载

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// SD-Core 的部署方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployMode {
    /// `juju deploy sdcore`
    Juju,
    /// Terraform root module
    Terraform,
}

impl DeployMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "juju" | "bundle" => Some(Self::Juju),
            "terraform" | "tf" => Some(Self::Terraform),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Juju => "juju",
            Self::Terraform => "terraform",
        }
    }
}

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// juju 可执行文件
    pub juju_binary: String,
    /// kubeconfig 路径（未设置时按 kube 默认规则推断）
    pub kubeconfig: Option<String>,
    /// SD-Core 所在 model
    pub sdcore_model: String,
    /// COS 所在 model
    pub cos_model: String,
    /// charm 发布渠道
    pub channel: String,
    /// SD-Core 部署方式
    pub deploy_mode: DeployMode,
    /// Terraform 配置
    pub terraform: TerraformConfig,
    /// 超时与轮询间隔
    pub timeouts: TimeoutConfig,
    /// NMS 配置
    pub nms: NmsConfig,
    /// 场景数据
    pub scenario: ScenarioData,
}

/// Terraform 配置
#[derive(Clone, Debug)]
pub struct TerraformConfig {
    pub binary: String,
    /// root module 目录
    pub work_dir: Option<PathBuf>,
}

/// 超时与轮询间隔
#[derive(Clone, Debug)]
pub struct TimeoutConfig {
    /// 等待 model 变为 active/idle
    pub deploy: Duration,
    /// 就绪轮询间隔
    pub poll_interval: Duration,
    /// 收敛后的额外等待
    pub settle: Duration,
    /// 等待凭据 secret
    pub credentials: Duration,
    /// 等待 NMS 可用并初始化
    pub nms: Duration,
    /// 单条外部命令
    pub command: Duration,
    /// 单次 HTTP 请求
    pub http: Duration,
    /// action 的 `--wait`
    pub action: Duration,
}

/// NMS 配置
#[derive(Clone, Debug)]
pub struct NmsConfig {
    /// NMS 应用名
    pub application: String,
    /// API 端口
    pub port: u16,
    /// 凭据 secret 的 label
    pub secret_label: String,
}

/// 场景中创建的数据
#[derive(Clone, Debug)]
pub struct ScenarioData {
    pub imsi: String,
    pub device_group: String,
    pub network_slice: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let juju_binary = var_or("SDCORE_E2E_JUJU", "juju");
        let kubeconfig = load_with_fallback("SDCORE_E2E_KUBECONFIG", "KUBECONFIG");

        let sdcore_model = var_or("SDCORE_E2E_MODEL", constants::SDCORE_MODEL);
        let cos_model = var_or("SDCORE_E2E_COS_MODEL", constants::COS_MODEL);
        let channel = var_or("SDCORE_E2E_CHANNEL", constants::CHANNEL);

        let deploy_mode = match env::var("SDCORE_E2E_DEPLOY_MODE") {
            Ok(v) => DeployMode::from_str(&v).unwrap_or_else(|| {
                warn!(value = %v, "Unknown SDCORE_E2E_DEPLOY_MODE, falling back to juju");
                DeployMode::Juju
            }),
            Err(_) => DeployMode::Juju,
        };

        Self {
            juju_binary,
            kubeconfig,
            sdcore_model,
            cos_model,
            channel,
            deploy_mode,
            terraform: TerraformConfig::from_env(),
            timeouts: TimeoutConfig::from_env(),
            nms: NmsConfig::from_env(),
            scenario: ScenarioData::from_env(),
        }
    }
}

impl TerraformConfig {
    pub fn from_env() -> Self {
        Self {
            binary: var_or("SDCORE_E2E_TERRAFORM", "terraform"),
            work_dir: env::var("SDCORE_E2E_TERRAFORM_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl TimeoutConfig {
    pub fn from_env() -> Self {
        Self {
            deploy: secs("SDCORE_E2E_DEPLOY_TIMEOUT_SECS", constants::DEPLOY_TIMEOUT_SECS),
            poll_interval: secs("SDCORE_E2E_POLL_INTERVAL_SECS", constants::POLL_INTERVAL_SECS),
            settle: secs("SDCORE_E2E_SETTLE_SECS", constants::SETTLE_SECS),
            credentials: secs(
                "SDCORE_E2E_CREDENTIALS_TIMEOUT_SECS",
                constants::CREDENTIALS_TIMEOUT_SECS,
            ),
            nms: secs("SDCORE_E2E_NMS_TIMEOUT_SECS", constants::NMS_TIMEOUT_SECS),
            command: secs("SDCORE_E2E_COMMAND_TIMEOUT_SECS", constants::COMMAND_TIMEOUT_SECS),
            http: secs("SDCORE_E2E_HTTP_TIMEOUT_SECS", constants::HTTP_TIMEOUT_SECS),
            action: secs("SDCORE_E2E_ACTION_TIMEOUT_SECS", constants::ACTION_TIMEOUT_SECS),
        }
    }
}

impl NmsConfig {
    pub fn from_env() -> Self {
        let port = env::var("SDCORE_E2E_NMS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::NMS_PORT);

        Self {
            application: var_or("SDCORE_E2E_NMS_APP", "nms"),
            port,
            secret_label: var_or("SDCORE_E2E_NMS_SECRET_LABEL", constants::NMS_SECRET_LABEL),
        }
    }
}

impl ScenarioData {
    pub fn from_env() -> Self {
        Self {
            imsi: var_or("SDCORE_E2E_IMSI", constants::TEST_IMSI),
            device_group: var_or("SDCORE_E2E_DEVICE_GROUP", constants::TEST_DEVICE_GROUP),
            network_slice: var_or("SDCORE_E2E_NETWORK_SLICE", constants::TEST_NETWORK_SLICE),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn secs(key: &str, default: u64) -> Duration {
    let value = match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %v, "Invalid number of seconds, using default {}", default);
            default
        }),
        Err(_) => default,
    };
    Duration::from_secs(value)
}

/// 加载环境变量，支持 fallback
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary).ok().or_else(|| env::var(fallback).ok())
}

/// 常量
pub mod constants {
    /// SD-Core model 名
    pub const SDCORE_MODEL: &str = "sdcore";

    /// COS model 名
    pub const COS_MODEL: &str = "cos-lite";

    /// 默认发布渠道
    pub const CHANNEL: &str = "1.5/edge";

    /// 等待部署收敛（秒）
    pub const DEPLOY_TIMEOUT_SECS: u64 = 1200; // 20 分钟

    /// 就绪轮询间隔（秒）
    pub const POLL_INTERVAL_SECS: u64 = 10;

    /// 收敛后的额外等待（秒）
    pub const SETTLE_SECS: u64 = 10;

    /// SD-Core model 的 update-status 间隔
    pub const UPDATE_STATUS_INTERVAL: &str = "1m";

    pub const CREDENTIALS_TIMEOUT_SECS: u64 = 300;

    pub const NMS_TIMEOUT_SECS: u64 = 300;

    pub const COMMAND_TIMEOUT_SECS: u64 = 600;

    pub const HTTP_TIMEOUT_SECS: u64 = 30;

    /// gnbsim 模拟一次大约需要几分钟
    pub const ACTION_TIMEOUT_SECS: u64 = 300;

    /// NMS API 端口
    pub const NMS_PORT: u16 = 5000;

    /// NMS 写入凭据的 secret label
    pub const NMS_SECRET_LABEL: &str = "NMS_LOGIN";

    pub const TEST_IMSI: &str = "208930100007487";

    pub const TEST_DEVICE_GROUP: &str = "integration_tests";

    pub const TEST_NETWORK_SLICE: &str = "e2e";

    /// 不参与就绪判断的应用
    pub const READINESS_EXCLUDED: &[&str] = &["traefik"];

    /// Grafana 管理员账号
    pub const GRAFANA_USER: &str = "admin";

    /// 导入的仪表盘标题
    pub const DASHBOARD_TITLE: &str = "Charmed SD-Core Overview";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
