//! Grafana HTTP Client
//!
//! 使用 Basic Auth 访问 Grafana，用于断言仪表盘是否存在。
//! 与 NMS 客户端不同，这里的错误会直接返回给调用方。

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use crate::domain::grafana::{self, DashboardImport, DashboardSummary, Datasource};
use crate::error::{HarnessError, HarnessResult};

/// Grafana 客户端
#[derive(Clone)]
pub struct GrafanaClient {
    client: Client,
    base_url: String,
    user: String,
    password: String,
}

impl GrafanaClient {
    pub fn new(
        base_url: &str,
        user: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> HarnessResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.into(),
            password: password.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.user, Some(&self.password))
    }

    /// 列出数据源
    pub async fn datasources(&self) -> HarnessResult<Vec<Datasource>> {
        let datasources = self
            .get("/api/datasources")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(datasources)
    }

    /// 按类型获取数据源 UID
    pub async fn datasource_uid(&self, kind: &str) -> HarnessResult<String> {
        let datasources = self.datasources().await?;
        grafana::datasource_uid(&datasources, kind)
            .map(str::to_string)
            .ok_or_else(|| HarnessError::lookup(format!("no {} datasource in Grafana", kind)))
    }

    /// 导入仪表盘（`POST /api/dashboards/db`）
    pub async fn import_dashboard(&self, dashboard: &Value) -> HarnessResult<DashboardImport> {
        let response = self
            .client
            .post(format!("{}/api/dashboards/db", self.base_url))
            .basic_auth(&self.user, Some(&self.password))
            .json(dashboard)
            .send()
            .await?
            .error_for_status()?;
        let imported: DashboardImport = response.json().await?;
        info!(uid = ?imported.uid, url = ?imported.url, "Imported dashboard");
        Ok(imported)
    }

    /// 搜索仪表盘
    pub async fn search_dashboards(&self, query: &str) -> HarnessResult<Vec<DashboardSummary>> {
        let results = self
            .get("/api/search")
            .query(&[("query", query), ("type", "dash-db")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(results)
    }

    /// 是否存在指定标题的仪表盘
    pub async fn dashboard_exists(&self, title: &str) -> HarnessResult<bool> {
        let results = self.search_dashboards(title).await?;
        Ok(results.iter().any(|d| d.title == title))
    }
}
