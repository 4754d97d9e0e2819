use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;

use crate::Error;
use crate::connect::v1::V1ErrorResponse;

/// Tokens are short-lived by policy; Apple rejects anything beyond 20 minutes.
const TOKEN_LIFETIME_SECS: u64 = 20 * 60;
const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";

/// A JWT-based App Store Connect API key: issuer id, key id and the
/// ES256 private key downloaded from Apple (`AuthKey_XXXXXXXXXX.p8`).
pub struct ApiCredentials {
    issuer_id: String,
    key_id: String,
    encoding_key: EncodingKey,
}

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    iat: u64,
    exp: u64,
    aud: &'a str,
}

impl ApiCredentials {
    /// Reads and parses the private key file. Fails here, before any
    /// network traffic, if the key is missing or not an EC PEM key.
    pub fn load<P: AsRef<Path>>(
        issuer_id: &str,
        key_id: &str,
        private_key_path: P,
    ) -> Result<Self, Error> {
        let pem = fs::read(private_key_path)?;
        Self::from_pem(issuer_id, key_id, &pem)
    }

    pub fn from_pem(issuer_id: &str, key_id: &str, pem: &[u8]) -> Result<Self, Error> {
        let encoding_key = EncodingKey::from_ec_pem(pem)?;

        Ok(Self {
            issuer_id: issuer_id.to_string(),
            key_id: key_id.to_string(),
            encoding_key,
        })
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Mints a fresh signed token. The tool is a short-lived sequential
    /// process, so there is no caching across requests.
    fn bearer_token(&self) -> Result<String, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let claims = TokenClaims {
            iss: &self.issuer_id,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
            aud: TOKEN_AUDIENCE,
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }
}

pub struct ConnectSession {
    client: Client,
    credentials: ApiCredentials,
}

impl ConnectSession {
    pub fn new(credentials: ApiCredentials) -> Result<Self, Error> {
        let client = crate::client()?;

        Ok(Self {
            client,
            credentials,
        })
    }

    pub async fn v1_send_request(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
        request_type: Option<RequestType>,
    ) -> Result<serde_json::Value, Error> {
        let token = self.credentials.bearer_token()?;

        let mut request_builder = match request_type {
            Some(RequestType::Delete) => self.client.delete(url),
            Some(RequestType::Post) => self.client.post(url),
            _ => self.client.get(url),
        };

        request_builder = request_builder
            .bearer_auth(token)
            .header("Accept", "application/json");

        log::debug!("V1 Request to {}: {:?}", url, &body);

        if let Some(body) = body {
            request_builder = request_builder.json(&body);
        }

        let response = request_builder.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        log::debug!("V1 Response from {} ({}): {}", url, status, response_text);

        // DELETE and some POSTs answer 204 with an empty body.
        if response_text.is_empty() {
            if status.is_success() {
                return Ok(serde_json::Value::Null);
            }
            return Err(Error::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let response_json: serde_json::Value = serde_json::from_str(&response_text)?;

        if let Ok(errors) = serde_json::from_value::<V1ErrorResponse>(response_json.clone()) {
            if let Some(error) = errors.errors.first() {
                return Err(error.to_error(url.to_string()));
            }
        }

        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response_json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Get,
    Post,
    Delete,
}
