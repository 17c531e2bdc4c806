//! NMS 配置记录
//!
//! 每次调用都重新构造一份记录，模板字段为常量，只嵌入调用方提供的标识

use serde::{Deserialize, Serialize};

/// 订阅者记录
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SubscriberConfig {
    #[serde(rename = "UeId")]
    pub ue_id: String,
    #[serde(rename = "plmnId")]
    pub plmn_id: String,
    pub opc: String,
    pub key: String,
    #[serde(rename = "sequenceNumber")]
    pub sequence_number: String,
}

impl SubscriberConfig {
    pub fn for_imsi(imsi: &str) -> Self {
        Self {
            ue_id: imsi.to_string(),
            plmn_id: "00101".to_string(),
            opc: "981d464c7c52eb6e5036234984ad0bcf".to_string(),
            key: "5122250214c33e723a5dd523fc145fc0".to_string(),
            sequence_number: "16f3b3f70fc2".to_string(),
        }
    }
}

/// 流量等级
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrafficClass {
    pub name: String,
    pub arp: u32,
    pub pdb: u32,
    pub pelr: u32,
    pub qci: u32,
}

/// DNN QoS
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UeDnnQos {
    #[serde(rename = "dnn-mbr-uplink")]
    pub dnn_mbr_uplink: u64,
    #[serde(rename = "dnn-mbr-downlink")]
    pub dnn_mbr_downlink: u64,
    #[serde(rename = "bitrate-unit")]
    pub bitrate_unit: String,
    #[serde(rename = "traffic-class")]
    pub traffic_class: TrafficClass,
}

/// IP 域
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IpDomainExpanded {
    pub dnn: String,
    #[serde(rename = "ue-ip-pool")]
    pub ue_ip_pool: String,
    #[serde(rename = "dns-primary")]
    pub dns_primary: String,
    pub mtu: u32,
    #[serde(rename = "ue-dnn-qos")]
    pub ue_dnn_qos: UeDnnQos,
}

/// 设备组记录
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeviceGroupConfig {
    pub imsis: Vec<String>,
    #[serde(rename = "site-info")]
    pub site_info: String,
    #[serde(rename = "ip-domain-name")]
    pub ip_domain_name: String,
    #[serde(rename = "ip-domain-expanded")]
    pub ip_domain_expanded: IpDomainExpanded,
}

impl DeviceGroupConfig {
    pub fn with_imsis(imsis: &[String]) -> Self {
        Self {
            imsis: imsis.to_vec(),
            site_info: "demo".to_string(),
            ip_domain_name: "pool1".to_string(),
            ip_domain_expanded: IpDomainExpanded {
                dnn: "internet".to_string(),
                ue_ip_pool: "172.250.1.0/16".to_string(),
                dns_primary: "8.8.8.8".to_string(),
                mtu: 1460,
                ue_dnn_qos: UeDnnQos {
                    dnn_mbr_uplink: 200_000_000,
                    dnn_mbr_downlink: 200_000_000,
                    bitrate_unit: "bps".to_string(),
                    traffic_class: TrafficClass {
                        name: "platinum".to_string(),
                        arp: 6,
                        pdb: 300,
                        pelr: 6,
                        qci: 8,
                    },
                },
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SliceId {
    pub sst: String,
    pub sd: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Plmn {
    pub mcc: String,
    pub mnc: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GNodeB {
    pub name: String,
    pub tac: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Upf {
    #[serde(rename = "upf-name")]
    pub upf_name: String,
    #[serde(rename = "upf-port")]
    pub upf_port: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SiteInfo {
    #[serde(rename = "site-name")]
    pub site_name: String,
    pub plmn: Plmn,
    #[serde(rename = "gNodeBs")]
    pub gnodebs: Vec<GNodeB>,
    pub upf: Upf,
}

/// 网络切片记录
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NetworkSliceConfig {
    #[serde(rename = "slice-id")]
    pub slice_id: SliceId,
    #[serde(rename = "site-device-group")]
    pub site_device_group: Vec<String>,
    #[serde(rename = "site-info")]
    pub site_info: SiteInfo,
}

impl NetworkSliceConfig {
    pub fn with_device_groups(device_groups: &[String]) -> Self {
        Self {
            slice_id: SliceId {
                sst: "1".to_string(),
                sd: "102030".to_string(),
            },
            site_device_group: device_groups.to_vec(),
            site_info: SiteInfo {
                site_name: "demo".to_string(),
                plmn: Plmn {
                    mcc: "001".to_string(),
                    mnc: "01".to_string(),
                },
                gnodebs: vec![GNodeB {
                    name: "demo-gnb1".to_string(),
                    tac: 1,
                }],
                upf: Upf {
                    upf_name: "upf-external".to_string(),
                    upf_port: "8805".to_string(),
                },
            },
        }
    }
}

/// `GET /status` 响应
///
/// `initialized` 缺失时解析失败，调用方据此判定 NMS 不可达
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub initialized: bool,
}

/// `POST /login` 请求体
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /login` 响应
#[derive(Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscriber_payload_shape() {
        let value = serde_json::to_value(SubscriberConfig::for_imsi("208930100007487")).unwrap();
        assert_eq!(
            value,
            json!({
                "UeId": "208930100007487",
                "plmnId": "00101",
                "opc": "981d464c7c52eb6e5036234984ad0bcf",
                "key": "5122250214c33e723a5dd523fc145fc0",
                "sequenceNumber": "16f3b3f70fc2"
            })
        );
    }

    #[test]
    fn test_device_group_payload_shape() {
        let value =
            serde_json::to_value(DeviceGroupConfig::with_imsis(&["001010100007487".to_string()]))
                .unwrap();
        assert_eq!(value["imsis"], json!(["001010100007487"]));
        assert_eq!(value["site-info"], "demo");
        assert_eq!(value["ip-domain-expanded"]["mtu"], 1460);
        assert_eq!(
            value["ip-domain-expanded"]["ue-dnn-qos"]["traffic-class"]["name"],
            "platinum"
        );
        assert_eq!(value["ip-domain-expanded"]["ue-dnn-qos"]["bitrate-unit"], "bps");
    }

    #[test]
    fn test_network_slice_payload_shape() {
        let value =
            serde_json::to_value(NetworkSliceConfig::with_device_groups(&["default".to_string()]))
                .unwrap();
        assert_eq!(value["slice-id"], json!({"sst": "1", "sd": "102030"}));
        assert_eq!(value["site-device-group"], json!(["default"]));
        assert_eq!(value["site-info"]["gNodeBs"], json!([{"name": "demo-gnb1", "tac": 1}]));
        assert_eq!(value["site-info"]["upf"]["upf-name"], "upf-external");
    }

    #[test]
    fn test_records_are_independent_per_call() {
        let first = DeviceGroupConfig::with_imsis(&["1".to_string(), "2".to_string()]);
        let second = DeviceGroupConfig::with_imsis(&[]);
        assert_eq!(first.imsis.len(), 2);
        assert!(second.imsis.is_empty());
    }

    #[test]
    fn test_status_response_requires_initialized() {
        let status: StatusResponse = serde_json::from_str(r#"{"initialized": false}"#).unwrap();
        assert!(!status.initialized);

        for raw in [r#"{}"#, r#"{"unrelated": 1}"#, r#"{"initialized": null}"#] {
            assert!(serde_json::from_str::<StatusResponse>(raw).is_err(), "{}", raw);
        }
    }
}
