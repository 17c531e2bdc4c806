//! Action 结果领域模型
//!
//! 远端 action 的结果类型不固定，这里原样透传，不做类型转换

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Action 结果（key → 原始 JSON 值）
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ActionResult(pub BTreeMap<String, Value>);

impl ActionResult {
    /// 获取原始值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 获取字符串值，非字符串返回 `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// 字段是否为指定字符串
    ///
    /// 布尔 `true` 与字符串 `"true"` 不相等
    pub fn field_is(&self, key: &str, expected: &str) -> bool {
        self.get_str(key) == Some(expected)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
struct UnitActionOutput {
    #[serde(default)]
    results: Option<ActionResult>,
    #[serde(default)]
    status: Option<String>,
}

/// 解析 `juju run <unit> <action> --format=json` 的输出
///
/// ```json
/// {"gnbsim/0": {"id": "4", "results": {"success": "true"}, "status": "completed"}}
/// ```
///
/// 返回 `Ok(None)` 表示缺少 unit 或 results
pub fn parse_action_output(
    raw: &str,
    unit: &str,
) -> Result<Option<(ActionResult, Option<String>)>, serde_json::Error> {
    let mut parsed: BTreeMap<String, UnitActionOutput> = serde_json::from_str(raw)?;
    Ok(parsed
        .remove(unit)
        .and_then(|out| out.results.map(|results| (results, out.status))))
}
