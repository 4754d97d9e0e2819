pub mod session;
pub mod v1;

pub use session::{ApiCredentials, ConnectSession};

pub const API_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

#[macro_export]
macro_rules! connect_endpoint {
    ($($arg:tt)*) => {
        format!("{}{}", $crate::connect::API_BASE_URL, format!($($arg)*))
    };
}
