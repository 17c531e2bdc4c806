//! 部署状态领域模型
//!
//! 对应 `juju status --format=json` 的输出，每次轮询重新获取，不做缓存

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// 就绪时的 workload 状态
pub const WORKLOAD_ACTIVE: &str = "active";
/// 就绪时的 agent 状态
pub const AGENT_IDLE: &str = "idle";

/// 状态字段（只关心 current）
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct StatusField {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// 单个 unit 的状态
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UnitStatus {
    #[serde(rename = "workload-status", default)]
    pub workload: StatusField,
    #[serde(rename = "juju-status", default)]
    pub agent: StatusField,
    #[serde(default)]
    pub address: Option<String>,
}

impl UnitStatus {
    /// workload 为 active 且 agent 为 idle
    pub fn is_active_idle(&self) -> bool {
        self.workload.current == WORKLOAD_ACTIVE && self.agent.current == AGENT_IDLE
    }
}

/// 单个应用的状态
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub units: BTreeMap<String, UnitStatus>,
}

/// 未就绪的 unit
#[derive(Clone, Debug, PartialEq)]
pub struct NotReadyUnit {
    pub unit: String,
    pub workload: String,
    pub agent: String,
}

impl fmt::Display for NotReadyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=({}, {})", self.unit, self.workload, self.agent)
    }
}

/// 一次状态查询的快照
#[derive(Clone, Debug)]
pub struct StatusSnapshot {
    pub applications: BTreeMap<String, ApplicationStatus>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawStatus {
    #[serde(default)]
    applications: BTreeMap<String, ApplicationStatus>,
}

impl StatusSnapshot {
    /// 从 `juju status --format=json` 输出解析
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: RawStatus = serde_json::from_str(raw)?;
        Ok(Self::new(parsed.applications))
    }

    pub fn new(applications: BTreeMap<String, ApplicationStatus>) -> Self {
        Self {
            applications,
            fetched_at: Utc::now(),
        }
    }

    /// 列出未就绪的 unit，跳过被排除的应用
    pub fn not_ready(&self, excluded: &[String]) -> Vec<NotReadyUnit> {
        self.applications
            .iter()
            .filter(|(app, _)| !excluded.iter().any(|e| e == *app))
            .flat_map(|(_, app)| app.units.iter())
            .filter(|(_, unit)| !unit.is_active_idle())
            .map(|(name, unit)| NotReadyUnit {
                unit: name.clone(),
                workload: unit.workload.current.clone(),
                agent: unit.agent.current.clone(),
            })
            .collect()
    }

    /// 所有未排除的 unit 都是 active/idle
    pub fn is_active_idle(&self, excluded: &[String]) -> bool {
        self.not_ready(excluded).is_empty()
    }

    /// 获取 `<app>/<n>` 的地址
    pub fn unit_address(&self, application: &str, unit_number: u32) -> Option<&str> {
        let unit_name = format!("{}/{}", application, unit_number);
        self.applications
            .get(application)?
            .units
            .get(&unit_name)?
            .address
            .as_deref()
    }

    /// 未就绪 unit 的简短描述，用于超时诊断
    pub fn describe_not_ready(&self, excluded: &[String]) -> String {
        let pending = self.not_ready(excluded);
        if pending.is_empty() {
            return "all units active/idle".to_string();
        }
        pending
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
