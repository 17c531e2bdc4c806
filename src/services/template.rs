//! 模板渲染
//!
//! 内置模板在编译期嵌入，占位符缺失时渲染失败（严格模式）

use minijinja::{context, AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{HarnessError, HarnessResult};

/// Grafana 仪表盘模板名
pub const DASHBOARD_TEMPLATE: &str = "grafana-dashboard.json.j2";

const DASHBOARD_SOURCE: &str = include_str!("../../resources/grafana-dashboard.json.j2");
const TFVARS_SOURCE: &str = include_str!("../../resources/terraform.tfvars.j2");

/// Terraform 变量
#[derive(Clone, Debug, Default, Serialize)]
pub struct TfVars {
    pub model: String,
    pub channel: String,
    /// 额外变量，按 key 排序输出
    pub extra: BTreeMap<String, String>,
}

impl TfVars {
    pub fn new(model: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            channel: channel.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// 模板渲染器
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // 输出是 JSON/HCL，占位符自己带引号
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    /// 渲染任意模板字符串
    pub fn render_str<S: Serialize>(&self, source: &str, ctx: S) -> HarnessResult<String> {
        Ok(self.env.render_str(source, ctx)?)
    }

    /// 渲染 SD-Core 仪表盘，返回可直接提交给 Grafana 的 JSON
    pub fn render_dashboard(&self, prometheus_datasource_id: &str) -> HarnessResult<Value> {
        let rendered = self.render_str(
            DASHBOARD_SOURCE,
            context! { prometheus_datasource_id => prometheus_datasource_id },
        )?;
        serde_json::from_str(&rendered)
            .map_err(|e| HarnessError::decode(format!("rendered {}", DASHBOARD_TEMPLATE), e))
    }

    /// 渲染 `terraform.tfvars`
    pub fn render_tfvars(&self, vars: &TfVars) -> HarnessResult<String> {
        let mut rendered = self.render_str(TFVARS_SOURCE, vars)?;
        rendered.push('\n');
        Ok(rendered)
    }
}
