use serde::Deserialize;

use crate::Error;
use crate::connect_endpoint;
use crate::connect::session::{ConnectSession, RequestType};

impl ConnectSession {
    pub async fn list_certificates(&self, limit: u32) -> Result<CertificatesResponse, Error> {
        let endpoint = connect_endpoint!("/v1/certificates?limit={}", limit);

        let response = self.v1_send_request(&endpoint, None, Some(RequestType::Get)).await?;
        let response_data: CertificatesResponse = serde_json::from_value(response)?;

        Ok(response_data)
    }
}

#[derive(Deserialize, Debug)]
pub struct CertificatesResponse {
    pub data: Vec<Certificate>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Certificate {
    pub id: String,
    pub attributes: Option<CertificateAttributes>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAttributes {
    pub display_name: Option<String>,
    pub name: Option<String>,
    pub certificate_type: Option<String>,
    pub serial_number: Option<String>,
    pub platform: Option<String>,
    pub expiration_date: Option<String>,
}
