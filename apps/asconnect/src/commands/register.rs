use clap::Args;
use anyhow::Result;

use asc_core::connect::v1::devices::DevicePlatform;

use super::AuthArgs;

#[derive(Debug, Args)]
#[command(arg_required_else_help = true)]
#[command(group(clap::ArgGroup::new("platform").required(true).args(["macos", "ios"])))]
pub struct RegisterArgs {
    /// Register a macOS device
    #[arg(long = "macos")]
    pub macos: bool,
    /// Register an iOS device
    #[arg(long = "ios")]
    pub ios: bool,
    /// Device name
    #[arg(long = "name", value_name = "NAME")]
    pub name: String,
    /// Device identifier (UDID)
    #[arg(long = "device-id", value_name = "UDID")]
    pub device_id: String,
    #[command(flatten)]
    pub auth: AuthArgs,
}

impl RegisterArgs {
    pub fn platform(&self) -> DevicePlatform {
        if self.macos {
            DevicePlatform::MacOs
        } else {
            DevicePlatform::Ios
        }
    }
}

pub async fn execute(args: RegisterArgs) -> Result<()> {
    let session = args.auth.session()?;

    session
        .register_device(&args.name, args.platform(), &args.device_id)
        .await?;

    println!(
        "Device {} [{}] registered successfully.",
        args.name, args.device_id
    );

    Ok(())
}
