//! Juju secret 领域模型

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// `juju secrets --format=json` 中的单条记录
///
/// ```json
/// {"csuci57mp25c7993rgeg": {"revision": 1, "owner": "nms", "label": "NMS_LOGIN"}}
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SecretMeta {
    #[serde(default)]
    pub revision: Option<u64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// 从 secret 列表中按 label 查找 ID
pub fn find_secret_id<'a>(
    secrets: &'a BTreeMap<String, SecretMeta>,
    label: &str,
) -> Option<&'a str> {
    secrets
        .iter()
        .find(|(_, meta)| meta.label.as_deref() == Some(label))
        .map(|(id, _)| id.as_str())
}

#[derive(Deserialize)]
struct RevealedSecret {
    #[serde(default)]
    content: Option<RevealedContent>,
}

#[derive(Deserialize)]
struct RevealedContent {
    #[serde(rename = "Data", default)]
    data: Option<BTreeMap<String, String>>,
}

/// 解析 `juju show-secret --reveal --format=json <id>` 的输出
///
/// secret 尚未写入内容时返回 `None`
pub fn parse_revealed(
    raw: &str,
    secret_id: &str,
) -> Result<Option<BTreeMap<String, String>>, serde_json::Error> {
    let mut parsed: BTreeMap<String, RevealedSecret> = serde_json::from_str(raw)?;
    Ok(parsed
        .remove(secret_id)
        .and_then(|s| s.content)
        .and_then(|c| c.data))
}

/// 登录凭据
///
/// `Debug` 不输出密码
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// 从 secret 内容中提取 username/password，任一缺失返回 `None`
    pub fn from_data(data: &BTreeMap<String, String>) -> Option<Self> {
        let username = data.get("username").filter(|v| !v.is_empty())?;
        let password = data.get("password").filter(|v| !v.is_empty())?;
        Some(Self {
            username: username.clone(),
            password: password.clone(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_secret_id_by_label() {
        let raw = r#"{
            "csuci57mp25c7993rgeg": {"revision": 1, "owner": "nms", "label": "NMS_LOGIN"},
            "csuci57mp25c7993rgeh": {"revision": 2, "owner": "model"}
        }"#;
        let secrets: BTreeMap<String, SecretMeta> = serde_json::from_str(raw).unwrap();
        assert_eq!(find_secret_id(&secrets, "NMS_LOGIN"), Some("csuci57mp25c7993rgeg"));
        assert_eq!(find_secret_id(&secrets, "OTHER"), None);
    }

    #[test]
    fn test_parse_revealed_secret() {
        let raw = r#"{
            "csuci57mp25c7993rgeg": {
                "revision": 1,
                "label": "NMS_LOGIN",
                "content": {"Data": {"username": "charm-admin", "password": "pw", "token": "t"}}
            }
        }"#;
        let data = parse_revealed(raw, "csuci57mp25c7993rgeg").unwrap().unwrap();
        let creds = Credentials::from_data(&data).unwrap();
        assert_eq!(creds.username, "charm-admin");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn test_parse_revealed_without_content() {
        let raw = r#"{"abc": {"revision": 1}}"#;
        assert_eq!(parse_revealed(raw, "abc").unwrap(), None);
        assert_eq!(parse_revealed(raw, "other").unwrap(), None);
    }

    #[test]
    fn test_missing_field_is_not_ready() {
        let mut data = BTreeMap::new();
        data.insert("username".to_string(), "admin".to_string());
        assert!(Credentials::from_data(&data).is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "admin".to_string(),
            password: "super-secret".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("super-secret"));
    }
}
