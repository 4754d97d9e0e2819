use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::Error;
use crate::connect_endpoint;
use crate::connect::session::{ConnectSession, RequestType};

impl ConnectSession {
    pub async fn list_devices(
        &self,
        platforms: &[DevicePlatform],
        status: DeviceStatus,
        limit: u32,
    ) -> Result<DevicesResponse, Error> {
        let platform_filter = platforms
            .iter()
            .map(|p| p.as_param())
            .collect::<Vec<_>>()
            .join(",");

        let endpoint = connect_endpoint!(
            "/v1/devices?filter[platform]={}&filter[status]={}&limit={}",
            platform_filter,
            status.as_param(),
            limit
        );

        let response = self.v1_send_request(&endpoint, None, Some(RequestType::Get)).await?;
        let response_data: DevicesResponse = serde_json::from_value(response)?;

        Ok(response_data)
    }

    pub async fn register_device(
        &self,
        name: &str,
        platform: DevicePlatform,
        udid: &str,
    ) -> Result<DeviceResponse, Error> {
        let endpoint = connect_endpoint!("/v1/devices");

        let body = json!({
            "data": {
                "type": "devices",
                "attributes": {
                    "name": name,
                    "platform": platform,
                    "udid": udid
                }
            }
        });

        let response = self
            .v1_send_request(&endpoint, Some(body), Some(RequestType::Post))
            .await?;
        let response_data: DeviceResponse = serde_json::from_value(response)?;

        Ok(response_data)
    }
}

#[derive(Deserialize, Debug)]
pub struct DevicesResponse {
    pub data: Vec<Device>,
}

#[derive(Deserialize, Debug)]
pub struct DeviceResponse {
    pub data: Device,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Device {
    pub id: String,
    pub attributes: Option<DeviceAttributes>,
}

impl Device {
    pub fn platform(&self) -> Option<DevicePlatform> {
        self.attributes.as_ref().and_then(|a| a.platform)
    }

    pub fn status(&self) -> Option<DeviceStatus> {
        self.attributes.as_ref().and_then(|a| a.status)
    }
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    pub name: Option<String>,
    pub udid: Option<String>,
    pub platform: Option<DevicePlatform>,
    pub status: Option<DeviceStatus>,
    pub device_class: Option<String>,
    pub model: Option<String>,
    pub added_date: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DevicePlatform {
    Ios,
    MacOs,
}

impl DevicePlatform {
    pub fn as_param(&self) -> &'static str {
        match self {
            DevicePlatform::Ios => "IOS",
            DevicePlatform::MacOs => "MAC_OS",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Enabled,
    Disabled,
}

impl DeviceStatus {
    pub fn as_param(&self) -> &'static str {
        match self {
            DeviceStatus::Enabled => "ENABLED",
            DeviceStatus::Disabled => "DISABLED",
        }
    }
}
