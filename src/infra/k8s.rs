//! Kubernetes 客户端
//!
//! 只用于查询 LoadBalancer 服务的外部地址

use k8s_openapi::api::core::v1::Service;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::time::Duration;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// 取 Service 的第一个 LoadBalancer ingress IP
pub fn ingress_ip(service: &Service) -> Option<String> {
    service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first())
        .and_then(|first| first.ip.clone())
}

/// Kubernetes API 客户端
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// 从 kubeconfig 创建客户端
    ///
    /// 未指定路径时按 kube 的默认规则推断（`KUBECONFIG`、`~/.kube/config`、集群内配置）
    pub async fn connect(kubeconfig: Option<&str>, read_timeout: Duration) -> HarnessResult<Self> {
        let mut config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    HarnessError::KubeConfig(format!("failed to read kubeconfig {}: {}", path, e))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| {
                        HarnessError::KubeConfig(format!("failed to load kubeconfig {}: {}", path, e))
                    })?
            }
            None => Config::infer()
                .await
                .map_err(|e| HarnessError::KubeConfig(format!("failed to infer config: {}", e)))?,
        };
        config.read_timeout = Some(read_timeout);
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> HarnessResult<Self> {
        Ok(Self {
            client: Client::try_from(config)?,
        })
    }

    /// 获取 LoadBalancer 服务的外部 IP
    pub async fn load_balancer_ip(&self, namespace: &str, service: &str) -> HarnessResult<String> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let svc = match api.get(service).await {
            Ok(s) => s,
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                return Err(HarnessError::lookup(format!(
                    "service {}/{} not found",
                    namespace, service
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let ip = ingress_ip(&svc).ok_or_else(|| {
            HarnessError::lookup(format!(
                "service {}/{} has no load balancer ingress IP",
                namespace, service
            ))
        })?;
        debug!(namespace = %namespace, service = %service, ip = %ip, "Found load balancer IP");
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    fn service(status: Value) -> Service {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "traefik", "namespace": "cos-lite"},
            "status": status,
        }))
        .unwrap()
    }

    /// 模拟 API server：`traefik` 有 IP，`pending` 没有 ingress，其余返回 404
    async fn spawn_api_server() -> KubeClient {
        let router = Router::new().route(
            "/api/v1/namespaces/:namespace/services/:name",
            get(|Path((namespace, name)): Path<(String, String)>| async move {
                let status = match name.as_str() {
                    "traefik" => json!({"loadBalancer": {"ingress": [{"ip": "10.0.0.5"}]}}),
                    "pending" => json!({"loadBalancer": {}}),
                    _ => {
                        return (
                            StatusCode::NOT_FOUND,
                            Json(json!({
                                "kind": "Status",
                                "apiVersion": "v1",
                                "metadata": {},
                                "status": "Failure",
                                "message": format!("services \"{}\" not found", name),
                                "reason": "NotFound",
                                "code": 404
                            })),
                        );
                    }
                };
                (
                    StatusCode::OK,
                    Json(json!({
                        "apiVersion": "v1",
                        "kind": "Service",
                        "metadata": {"name": name, "namespace": namespace},
                        "status": status,
                    })),
                )
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = Config::new(format!("http://{}", addr).parse().unwrap());
        KubeClient::from_config(config).unwrap()
    }

    #[test]
    fn test_ingress_ip() {
        let svc = service(json!({"loadBalancer": {"ingress": [{"ip": "10.0.0.5"}, {"ip": "10.0.0.6"}]}}));
        assert_eq!(ingress_ip(&svc).as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_ingress_ip_missing() {
        assert_eq!(ingress_ip(&service(json!({"loadBalancer": {}}))), None);
        assert_eq!(ingress_ip(&service(json!({}))), None);
        // 只有 hostname 时不算 IP
        let svc = service(json!({"loadBalancer": {"ingress": [{"hostname": "lb.example"}]}}));
        assert_eq!(ingress_ip(&svc), None);
    }

    #[tokio::test]
    async fn test_load_balancer_ip_from_api() {
        let client = spawn_api_server().await;
        let ip = client.load_balancer_ip("cos-lite", "traefik").await.unwrap();
        assert_eq!(ip, "10.0.0.5");
    }

    #[tokio::test]
    async fn test_pending_ingress_is_lookup_failure() {
        let client = spawn_api_server().await;
        let err = client.load_balancer_ip("cos-lite", "pending").await.unwrap_err();
        assert!(matches!(err, HarnessError::Lookup(ref m) if m.contains("no load balancer")));
    }

    #[tokio::test]
    async fn test_missing_service_is_lookup_failure() {
        let client = spawn_api_server().await;
        let err = client.load_balancer_ip("cos-lite", "absent").await.unwrap_err();
        assert!(matches!(err, HarnessError::Lookup(ref m) if m.contains("not found")));
    }

    #[tokio::test]
    async fn test_unreadable_kubeconfig() {
        let Err(err) = KubeClient::connect(Some("/nonexistent/kubeconfig"), Duration::from_secs(1)).await
        else {
            panic!("expected kubeconfig error");
        };
        assert!(matches!(err, HarnessError::KubeConfig(_)));
    }
}
