//! 服务层模块
//!
//! 轮询、部署、action 与端到端场景

pub mod actions;
pub mod credentials;
pub mod deployer;
pub mod readiness;
pub mod scenario;
pub mod template;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use readiness::{wait_for_active_idle, ReadinessOptions};
pub use scenario::{Scenario, Step};
pub use wait::{poll_until, wait_until, Check, PollPolicy};
