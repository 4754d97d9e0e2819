pub mod connect;

pub use connect::session::{ApiCredentials, ConnectSession};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("App Store Connect API error {code} (HTTP {status:?}): {message} [URL: {url}]")]
    Api {
        url: String,
        code: String,
        status: Option<u16>,
        message: String,
    },
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub fn client() -> Result<reqwest::Client, Error> {
    let client = reqwest::ClientBuilder::new()
        .user_agent(concat!("asconnect/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}
