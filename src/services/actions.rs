//! 场景 action
//!
//! 在 unit 上执行 charm action，例如在 gnbsim 上触发 `start-simulation`，
//! 或在 grafana 上读取管理员密码

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::action::ActionResult;
use crate::error::{HarnessError, HarnessResult};
use crate::infra::juju::Juju;

/// 结果中表示执行成功的字段
pub const SUCCESS_FIELD: &str = "success";

/// 执行 action 并返回结果
///
/// 结果原样返回，不做类型转换；缺少 unit 或 `results` 时返回 `Lookup` 错误
pub async fn run_action(
    juju: &dyn Juju,
    model: &str,
    unit: &str,
    action: &str,
    wait: Duration,
) -> HarnessResult<ActionResult> {
    run_action_with_params(juju, model, unit, action, &BTreeMap::new(), wait).await
}

/// 带参数执行 action
pub async fn run_action_with_params(
    juju: &dyn Juju,
    model: &str,
    unit: &str,
    action: &str,
    params: &BTreeMap<String, String>,
    wait: Duration,
) -> HarnessResult<ActionResult> {
    let result = juju.run_action(model, unit, action, params, wait).await?;
    info!(model = %model, unit = %unit, action = %action, fields = result.0.len(), "Action returned");
    Ok(result)
}

/// 要求 `success` 字段为字符串 `"true"`
///
/// 布尔值 `true` 不算成功
pub fn assert_success(action: &str, result: &ActionResult) -> HarnessResult<()> {
    if result.field_is(SUCCESS_FIELD, "true") {
        return Ok(());
    }
    let info = result
        .get_str("info")
        .map(|s| s.to_string())
        .unwrap_or_default();
    warn!(action = %action, info = %info, "Action did not report success");
    Err(HarnessError::assertion(format!(
        "action {} did not succeed: success={}{}",
        action,
        result
            .get(SUCCESS_FIELD)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<missing>".to_string()),
        if info.is_empty() {
            String::new()
        } else {
            format!(", info={}", info)
        }
    )))
}

/// 读取字符串结果字段，不存在时返回 `Lookup` 错误
pub fn require_str<'a>(action: &str, result: &'a ActionResult, key: &str) -> HarnessResult<&'a str> {
    result
        .get_str(key)
        .ok_or_else(|| HarnessError::lookup(format!("action {} returned no {}", action, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeJuju;
    use serde_json::{json, Value};

    fn result(pairs: &[(&str, Value)]) -> ActionResult {
        ActionResult(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_string_true_is_success() {
        let r = result(&[("success", json!("true")), ("info", json!("run juju debug-log"))]);
        assert!(assert_success("start-simulation", &r).is_ok());
    }

    #[test]
    fn test_boolean_true_is_not_success() {
        let r = result(&[("success", json!(true))]);
        let err = assert_success("start-simulation", &r).unwrap_err();
        assert!(matches!(err, HarnessError::Assertion(_)));
    }

    #[test]
    fn test_failure_message_carries_info() {
        let r = result(&[("success", json!("false")), ("info", json!("5/6 profiles failed"))]);
        let err = assert_success("start-simulation", &r).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("start-simulation"));
        assert!(message.contains("5/6 profiles failed"));
    }

    #[test]
    fn test_missing_success_field() {
        let err = assert_success("start-simulation", &ActionResult::default()).unwrap_err();
        assert!(err.to_string().contains("<missing>"));
    }

    #[test]
    fn test_require_str() {
        let r = result(&[("admin-password", json!("hunter2"))]);
        assert_eq!(require_str("get-admin-password", &r, "admin-password").unwrap(), "hunter2");
        assert!(matches!(
            require_str("get-admin-password", &r, "url"),
            Err(HarnessError::Lookup(_))
        ));
    }

    #[tokio::test]
    async fn test_run_action_goes_through_juju() {
        let juju = FakeJuju::default().with_action(|unit, action| {
            assert_eq!(unit, "gnbsim/0");
            assert_eq!(action, "start-simulation");
            Ok(ActionResult(
                [("success".to_string(), json!("true"))].into_iter().collect(),
            ))
        });

        let r = run_action(&juju, "sdcore", "gnbsim/0", "start-simulation", Duration::from_secs(300))
            .await
            .unwrap();
        assert!(assert_success("start-simulation", &r).is_ok());
        assert_eq!(juju.calls(), vec!["run sdcore gnbsim/0 start-simulation"]);
    }

    #[tokio::test]
    async fn test_missing_results_propagate() {
        let juju = FakeJuju::default();
        let err = run_action(&juju, "sdcore", "gnbsim/0", "start-simulation", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Lookup(_)));
    }
}
