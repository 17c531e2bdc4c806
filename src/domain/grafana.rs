//! Grafana 相关领域模型

use serde::Deserialize;

/// 数据源
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Datasource {
    #[serde(default)]
    pub id: Option<u64>,
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// 按类型查找数据源 UID
pub fn datasource_uid<'a>(datasources: &'a [Datasource], kind: &str) -> Option<&'a str> {
    datasources
        .iter()
        .find(|ds| ds.kind == kind)
        .map(|ds| ds.uid.as_str())
}

/// `/api/search` 返回的仪表盘摘要
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DashboardSummary {
    #[serde(default)]
    pub uid: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `/api/dashboards/db` 导入结果
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DashboardImport {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasource_uid_by_type() {
        let raw = r#"[
            {"id": 1, "uid": "loki-uid", "name": "Loki", "type": "loki"},
            {"id": 2, "uid": "prom-uid", "name": "Prometheus", "type": "prometheus"}
        ]"#;
        let datasources: Vec<Datasource> = serde_json::from_str(raw).unwrap();
        assert_eq!(datasource_uid(&datasources, "prometheus"), Some("prom-uid"));
        assert_eq!(datasource_uid(&datasources, "tempo"), None);
    }
}
