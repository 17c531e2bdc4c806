//! 统一错误处理
//!
//! `HarnessError` 覆盖外部命令、轮询超时、远端对象缺失等情况。
//! 状态检查类调用不返回错误，而是返回 [`Reply`](crate::domain::Reply)。

use std::time::Duration;
use thiserror::Error;

/// Harness 错误类型
#[derive(Debug, Error)]
pub enum HarnessError {
    /// 外部命令启动失败
    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 外部命令非零退出，stderr 原样保留
    #[error("Command `{command}` exited with code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// 外部命令自身超时
    #[error("Command `{command}` timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    /// 轮询在限定时间内未收敛
    #[error("Timed out after {waited:?} waiting for {what}{}", last_observed_suffix(.last_observed))]
    Timeout {
        what: String,
        waited: Duration,
        last_observed: Option<String>,
    },

    /// 预期存在的远端对象不存在
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// JSON 解析失败
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// 本地文件读写失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP 错误（仅用于断言侧调用和客户端构建）
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Kubernetes API 错误
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// kubeconfig 读取或推断失败
    #[error("Kubeconfig error: {0}")]
    KubeConfig(String),

    /// 模板渲染失败
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// 场景断言失败
    #[error("Assertion failed: {0}")]
    Assertion(String),
}

impl HarnessError {
    /// 创建查找失败错误
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    /// 创建断言失败错误
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// 创建解析错误
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// 是否为轮询超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Timeout { .. })
    }
}

fn last_observed_suffix(last_observed: &Option<String>) -> String {
    match last_observed {
        Some(snapshot) => format!(" (last observed: {})", snapshot),
        None => String::new(),
    }
}

/// 便捷类型别名
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_includes_snapshot() {
        let err = HarnessError::Timeout {
            what: "model sdcore to be active/idle".to_string(),
            waited: Duration::from_secs(300),
            last_observed: Some("amf/0=(waiting, executing)".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("300s"));
        assert!(msg.contains("amf/0=(waiting, executing)"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_timeout_display_without_snapshot() {
        let err = HarnessError::Timeout {
            what: "secret NMS_LOGIN".to_string(),
            waited: Duration::from_secs(5),
            last_observed: None,
        };
        assert!(!err.to_string().contains("last observed"));
    }

    #[test]
    fn test_command_failed_keeps_stderr_verbatim() {
        let err = HarnessError::CommandFailed {
            command: "juju consume cos-lite.prometheus".to_string(),
            code: Some(1),
            stderr: "ERROR offer \"prometheus\" not found\n".to_string(),
        };
        assert!(err.to_string().contains("ERROR offer \"prometheus\" not found\n"));
        assert!(!err.is_timeout());
    }
}
