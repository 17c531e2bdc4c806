//! NMS 管理 API HTTP Client
//!
//! 封装与 NMS（SD-Core 管理界面）的所有 HTTP 交互。
//! 所有调用都返回 [`Reply`]：网络错误、非 2xx、非 JSON 响应一律视为 `Unavailable`，
//! 不向上抛出错误。

use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::domain::nms::{
    DeviceGroupConfig, LoginRequest, LoginResponse, NetworkSliceConfig, StatusResponse,
    SubscriberConfig,
};
use crate::domain::Reply;
use crate::error::HarnessResult;

const ACCOUNTS_URL: &str = "config/v1/account";

/// NMS 客户端
#[derive(Clone)]
pub struct NmsClient {
    client: Client,
    url: String,
}

impl NmsClient {
    /// 创建新的 NMS 客户端
    ///
    /// # Arguments
    /// * `url` - NMS 地址，末尾的 `/` 会被去掉
    /// * `timeout` - 单次请求超时
    pub fn new(url: &str, timeout: Duration) -> HarnessResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            url: url.strip_suffix('/').unwrap_or(url).to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 发送请求并处理通用错误
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Reply<Value> {
        let url = format!("{}{}", self.url, endpoint);

        // 每次调用单独构造 header
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(method = %method, url = %url, error = %e, "HTTP request failed");
                return Reply::Unavailable;
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(method = %method, url = %url, code = status.as_u16(), "Request failed");
            return Reply::Unavailable;
        }

        match response.json::<Value>().await {
            Ok(json) => Reply::Ok(json),
            Err(e) => {
                error!(method = %method, url = %url, error = %e, "Response is not valid JSON");
                Reply::Unavailable
            }
        }
    }

    async fn request_as<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Reply<T> {
        match self.request(method, endpoint, token, body).await {
            Reply::Ok(json) => match serde_json::from_value(json) {
                Ok(value) => Reply::Ok(value),
                Err(e) => {
                    error!(endpoint = %endpoint, error = %e, "Unexpected response shape");
                    Reply::Unavailable
                }
            },
            Reply::Unavailable => Reply::Unavailable,
        }
    }

    /// `GET /status`
    pub async fn get_status(&self) -> Reply<StatusResponse> {
        self.request_as::<StatusResponse, ()>(Method::GET, "/status", None, None)
            .await
    }

    /// NMS 是否可达
    pub async fn is_api_available(&self) -> bool {
        self.get_status().await.is_ok()
    }

    /// NMS 是否已初始化
    pub async fn is_initialized(&self) -> bool {
        match self.get_status().await {
            Reply::Ok(status) => status.initialized,
            Reply::Unavailable => false,
        }
    }

    /// 登录并获取 token
    pub async fn login(&self, username: &str, password: &str) -> Reply<LoginResponse> {
        let body = LoginRequest { username, password };
        self.request_as(Method::POST, "/login", None, Some(&body))
            .await
    }

    /// 通过访问账户接口判断 token 是否仍然有效
    pub async fn token_is_valid(&self, token: &str) -> bool {
        self.request::<()>(Method::GET, &format!("/{}/me", ACCOUNTS_URL), Some(token), None)
            .await
            .is_ok()
    }

    /// 创建订阅者
    pub async fn create_subscriber(&self, imsi: &str, token: Option<&str>) -> Reply<Value> {
        let endpoint = format!("/api/subscriber/imsi-{}", imsi);
        let data = SubscriberConfig::for_imsi(imsi);
        let reply = self
            .request(Method::POST, &endpoint, token, Some(&data))
            .await;
        if reply.is_ok() {
            info!(imsi = %imsi, "Created subscriber");
        }
        reply
    }

    /// 创建设备组
    pub async fn create_device_group(
        &self,
        name: &str,
        imsis: &[String],
        token: Option<&str>,
    ) -> Reply<Value> {
        let endpoint = format!("/config/v1/device-group/{}", name);
        let data = DeviceGroupConfig::with_imsis(imsis);
        let reply = self
            .request(Method::POST, &endpoint, token, Some(&data))
            .await;
        if reply.is_ok() {
            info!(device_group = %name, imsis = imsis.len(), "Created device group");
        }
        reply
    }

    /// 创建网络切片
    pub async fn create_network_slice(
        &self,
        name: &str,
        device_groups: &[String],
        token: Option<&str>,
    ) -> Reply<Value> {
        let endpoint = format!("/config/v1/network-slice/{}", name);
        let data = NetworkSliceConfig::with_device_groups(device_groups);
        let reply = self
            .request(Method::POST, &endpoint, token, Some(&data))
            .await;
        if reply.is_ok() {
            info!(network_slice = %name, "Created network slice");
        }
        reply
    }
}
