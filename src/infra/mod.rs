//! 基础设施模块
//!
//! 封装外部依赖（Juju/Terraform 命令、Kubernetes API、NMS 与 Grafana HTTP client）

pub mod command;
pub mod grafana;
pub mod juju;
pub mod k8s;
pub mod nms;
pub mod terraform;

pub use command::CommandRunner;
pub use grafana::GrafanaClient;
pub use juju::{DeploySpec, Juju, JujuCli};
pub use k8s::KubeClient;
pub use nms::NmsClient;
pub use terraform::TerraformClient;
