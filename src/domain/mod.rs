//! 领域模型模块
//!
//! 纯数据结构，描述远端状态的瞬时快照，不依赖 tokio/reqwest

pub mod action;
pub mod grafana;
pub mod nms;
pub mod reply;
pub mod secret;
pub mod status;

// Re-exports for convenience
pub use action::ActionResult;
pub use grafana::{DashboardImport, DashboardSummary, Datasource};
pub use nms::{
    DeviceGroupConfig, LoginResponse, NetworkSliceConfig, StatusResponse, SubscriberConfig,
};
pub use reply::Reply;
pub use secret::{Credentials, SecretMeta};
pub use status::{ApplicationStatus, NotReadyUnit, StatusSnapshot, UnitStatus};
