use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use base64::{Engine, engine::general_purpose};
use clap::Args;

use asc_core::connect::v1::devices::{Device, DevicePlatform, DeviceStatus};
use asc_core::connect::v1::profiles::{Profile, ProfileType};

use super::AuthArgs;

const PAGE_LIMIT: u32 = 200;
const PROFILE_EXTENSIONS: [&str; 2] = ["mobileprovision", "provisionprofile"];

#[derive(Debug, Args)]
#[command(arg_required_else_help = true)]
#[command(group(clap::ArgGroup::new("profile_type").args(["development", "production"])))]
pub struct RegenerateArgs {
    /// Directory where to save the generated profiles
    #[arg(long = "out-dir", value_name = "DIR")]
    pub output_directory: PathBuf,
    /// Prefix of the profiles to regenerate
    #[arg(long = "profile-prefix", value_name = "PREFIX")]
    pub profile_prefix: String,
    /// Regenerate development profiles (the default)
    #[arg(long = "development")]
    pub development: bool,
    /// Regenerate distribution profiles
    #[arg(long = "production")]
    pub production: bool,
    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTypeFilter {
    Development,
    Production,
}

impl RegenerateArgs {
    pub fn filter(&self) -> ProfileTypeFilter {
        if self.production {
            ProfileTypeFilter::Production
        } else {
            ProfileTypeFilter::Development
        }
    }
}

pub async fn execute(args: RegenerateArgs) -> Result<()> {
    let session = args.auth.session()?;
    let filter = args.filter();

    // Distribution profiles carry no device list, so the lookup is only
    // needed for the development flavor.
    let all_devices: Vec<Device> = match filter {
        ProfileTypeFilter::Development => session
            .list_devices(
                &[DevicePlatform::MacOs, DevicePlatform::Ios],
                DeviceStatus::Enabled,
                PAGE_LIMIT,
            )
            .await?
            .data
            .into_iter()
            .filter(|device| device.status() == Some(DeviceStatus::Enabled))
            .collect(),
        ProfileTypeFilter::Production => Vec::new(),
    };

    // The recreate path reuses each profile's own certificate ids; this
    // listing doubles as an early credential check.
    session.list_certificates(PAGE_LIMIT).await?;

    let profiles = session.list_profiles(PAGE_LIMIT).await?.data;

    clear_stale_profiles(&args.output_directory)?;

    let mut untouched = 0usize;

    for profile in &profiles {
        let Some(plan) = plan_for_profile(profile, filter, &args.profile_prefix, &all_devices)
        else {
            untouched += 1;
            continue;
        };

        println!("Deleting {}...", plan.name);
        session.delete_profile(&profile.id).await?;

        let new_profile = session
            .create_profile(
                &plan.name,
                plan.new_profile_type,
                &plan.bundle_id,
                &plan.device_ids,
                &plan.certificate_id,
            )
            .await?
            .data;

        let Some(content) = new_profile.profile_content() else {
            log::debug!("{} came back without profile content, no file written", plan.name);
            continue;
        };
        let Ok(decoded) = general_purpose::STANDARD.decode(content) else {
            log::debug!("{} profile content is not valid base64, no file written", plan.name);
            continue;
        };

        let path = args
            .output_directory
            .join(format!("{}.{}", plan.name, plan.file_extension));
        fs::write(&path, decoded)?;
    }

    if untouched > 0 {
        log::debug!("{untouched} profiles left untouched");
    }

    Ok(())
}

/// Which of the enabled devices a recreated profile gets linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceSelection {
    AllEnabled,
    MacOnly,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RegenerationTarget {
    new_profile_type: ProfileType,
    devices: DeviceSelection,
    file_extension: &'static str,
}

/// The (requested filter, current type) pairs this tool acts on. Anything
/// outside this table is left untouched. Adding a platform means adding
/// one arm here.
fn regeneration_target(
    filter: ProfileTypeFilter,
    current: ProfileType,
) -> Option<RegenerationTarget> {
    use DeviceSelection::{AllEnabled, MacOnly};
    use ProfileTypeFilter::{Development, Production};

    match (filter, current) {
        (Development, ProfileType::IosAppDevelopment) => Some(RegenerationTarget {
            new_profile_type: ProfileType::IosAppDevelopment,
            devices: AllEnabled,
            file_extension: "mobileprovision",
        }),
        (Development, ProfileType::MacCatalystAppDevelopment) => Some(RegenerationTarget {
            new_profile_type: ProfileType::MacCatalystAppDevelopment,
            devices: MacOnly,
            file_extension: "provisionprofile",
        }),
        (Production, ProfileType::IosAppStore) => Some(RegenerationTarget {
            new_profile_type: ProfileType::IosAppStore,
            devices: DeviceSelection::None,
            file_extension: "mobileprovision",
        }),
        (Production, ProfileType::MacCatalystAppStore) => Some(RegenerationTarget {
            new_profile_type: ProfileType::MacCatalystAppStore,
            devices: DeviceSelection::None,
            file_extension: "provisionprofile",
        }),
        (Production, ProfileType::MacCatalystAppDirect) => Some(RegenerationTarget {
            new_profile_type: ProfileType::MacCatalystAppDirect,
            devices: DeviceSelection::None,
            file_extension: "provisionprofile",
        }),
        _ => None,
    }
}

fn select_device_ids(selection: DeviceSelection, devices: &[Device]) -> Vec<String> {
    match selection {
        DeviceSelection::AllEnabled => devices.iter().map(|d| d.id.clone()).collect(),
        DeviceSelection::MacOnly => devices
            .iter()
            .filter(|d| d.platform() == Some(DevicePlatform::MacOs))
            .map(|d| d.id.clone())
            .collect(),
        DeviceSelection::None => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProfilePlan {
    name: String,
    bundle_id: String,
    certificate_id: String,
    new_profile_type: ProfileType,
    device_ids: Vec<String>,
    file_extension: &'static str,
}

/// Decides what to do with one fetched profile. `None` means the profile
/// is left untouched: name outside the prefix, incomplete data, or a
/// (filter, type) pair outside the table.
fn plan_for_profile(
    profile: &Profile,
    filter: ProfileTypeFilter,
    prefix: &str,
    devices: &[Device],
) -> Option<ProfilePlan> {
    let name = profile.name()?;
    if !name.starts_with(prefix) {
        return None;
    }
    let bundle_id = profile.bundle_id()?;
    let certificate_id = profile.first_certificate_id()?;
    let current_type = profile.profile_type()?;

    let target = regeneration_target(filter, current_type)?;

    Some(ProfilePlan {
        name: name.to_string(),
        bundle_id: bundle_id.to_string(),
        certificate_id: certificate_id.to_string(),
        new_profile_type: target.new_profile_type,
        device_ids: select_device_ids(target.devices, devices),
        file_extension: target.file_extension,
    })
}

/// Removes leftover profile files from a previous run. Top-level entries
/// only; hidden files and anything with another extension stay.
fn clear_stale_profiles(directory: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };

        if PROFILE_EXTENSIONS.contains(&extension) {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PROFILE_TYPES: [ProfileType; 14] = [
        ProfileType::IosAppDevelopment,
        ProfileType::IosAppStore,
        ProfileType::IosAppAdhoc,
        ProfileType::IosAppInhouse,
        ProfileType::MacAppDevelopment,
        ProfileType::MacAppStore,
        ProfileType::MacAppDirect,
        ProfileType::TvosAppDevelopment,
        ProfileType::TvosAppStore,
        ProfileType::TvosAppAdhoc,
        ProfileType::TvosAppInhouse,
        ProfileType::MacCatalystAppDevelopment,
        ProfileType::MacCatalystAppStore,
        ProfileType::MacCatalystAppDirect,
    ];

    fn device(id: &str, platform: &str) -> Device {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "attributes": {
                "name": id,
                "udid": format!("udid-{id}"),
                "platform": platform,
                "status": "ENABLED"
            }
        }))
        .unwrap()
    }

    fn profile(value: serde_json::Value) -> Profile {
        serde_json::from_value(value).unwrap()
    }

    fn complete_profile(name: &str, profile_type: &str) -> Profile {
        profile(serde_json::json!({
            "id": "P1",
            "attributes": {"name": name, "profileType": profile_type},
            "relationships": {
                "bundleId": {"data": {"type": "bundleIds", "id": "B1"}},
                "certificates": {"data": [{"type": "certificates", "id": "C1"}]}
            }
        }))
    }

    #[test]
    fn table_matches_exactly_five_pairs() {
        let mut matched = 0;
        for filter in [ProfileTypeFilter::Development, ProfileTypeFilter::Production] {
            for profile_type in ALL_PROFILE_TYPES {
                if let Some(target) = regeneration_target(filter, profile_type) {
                    matched += 1;
                    // Regeneration keeps the type; only devices and
                    // certificates change.
                    assert_eq!(target.new_profile_type, profile_type);
                }
            }
        }
        assert_eq!(matched, 5);
    }

    #[test]
    fn development_pairs_link_devices_production_pairs_do_not() {
        let ios_dev = regeneration_target(
            ProfileTypeFilter::Development,
            ProfileType::IosAppDevelopment,
        )
        .unwrap();
        assert_eq!(ios_dev.devices, DeviceSelection::AllEnabled);

        let catalyst_dev = regeneration_target(
            ProfileTypeFilter::Development,
            ProfileType::MacCatalystAppDevelopment,
        )
        .unwrap();
        assert_eq!(catalyst_dev.devices, DeviceSelection::MacOnly);

        for profile_type in [
            ProfileType::IosAppStore,
            ProfileType::MacCatalystAppStore,
            ProfileType::MacCatalystAppDirect,
        ] {
            let target =
                regeneration_target(ProfileTypeFilter::Production, profile_type).unwrap();
            assert_eq!(target.devices, DeviceSelection::None);
        }
    }

    #[test]
    fn file_extension_follows_target_type() {
        let cases = [
            (
                ProfileTypeFilter::Development,
                ProfileType::IosAppDevelopment,
                "mobileprovision",
            ),
            (
                ProfileTypeFilter::Development,
                ProfileType::MacCatalystAppDevelopment,
                "provisionprofile",
            ),
            (
                ProfileTypeFilter::Production,
                ProfileType::IosAppStore,
                "mobileprovision",
            ),
            (
                ProfileTypeFilter::Production,
                ProfileType::MacCatalystAppStore,
                "provisionprofile",
            ),
            (
                ProfileTypeFilter::Production,
                ProfileType::MacCatalystAppDirect,
                "provisionprofile",
            ),
        ];

        for (filter, profile_type, extension) in cases {
            let target = regeneration_target(filter, profile_type).unwrap();
            assert_eq!(target.file_extension, extension);
        }
    }

    #[test]
    fn mac_only_selection_filters_platform() {
        let devices = vec![device("D-mac", "MAC_OS"), device("D-ios", "IOS")];

        assert_eq!(
            select_device_ids(DeviceSelection::AllEnabled, &devices),
            vec!["D-mac", "D-ios"]
        );
        assert_eq!(
            select_device_ids(DeviceSelection::MacOnly, &devices),
            vec!["D-mac"]
        );
        assert!(select_device_ids(DeviceSelection::None, &devices).is_empty());
    }

    #[test]
    fn development_scenario_links_both_devices() {
        let devices = vec![device("D-mac", "MAC_OS"), device("D-ios", "IOS")];
        let profile = complete_profile("MyApp-Dev-iOS", "IOS_APP_DEVELOPMENT");

        let plan = plan_for_profile(
            &profile,
            ProfileTypeFilter::Development,
            "MyApp-Dev",
            &devices,
        )
        .unwrap();

        assert_eq!(plan.name, "MyApp-Dev-iOS");
        assert_eq!(plan.bundle_id, "B1");
        assert_eq!(plan.certificate_id, "C1");
        assert_eq!(plan.new_profile_type, ProfileType::IosAppDevelopment);
        assert_eq!(plan.device_ids, vec!["D-mac", "D-ios"]);
        assert_eq!(plan.file_extension, "mobileprovision");
    }

    #[test]
    fn production_scenario_links_no_devices() {
        let devices = vec![device("D-mac", "MAC_OS"), device("D-ios", "IOS")];
        let profile = complete_profile("MyApp-Dev-Store", "IOS_APP_STORE");

        let plan = plan_for_profile(
            &profile,
            ProfileTypeFilter::Production,
            "MyApp-Dev",
            &devices,
        )
        .unwrap();

        assert!(plan.device_ids.is_empty());
        assert_eq!(plan.file_extension, "mobileprovision");
    }

    #[test]
    fn prefix_mismatch_leaves_profile_untouched() {
        let profile = complete_profile("OtherApp-iOS", "IOS_APP_DEVELOPMENT");
        let plan = plan_for_profile(&profile, ProfileTypeFilter::Development, "MyApp-Dev", &[]);
        assert_eq!(plan, None);
    }

    #[test]
    fn unmatched_type_pair_leaves_profile_untouched() {
        // Ad-hoc never appears in the table, for either filter.
        let profile = complete_profile("MyApp-Dev-AdHoc", "IOS_APP_ADHOC");
        assert_eq!(
            plan_for_profile(&profile, ProfileTypeFilter::Development, "MyApp-Dev", &[]),
            None
        );
        assert_eq!(
            plan_for_profile(&profile, ProfileTypeFilter::Production, "MyApp-Dev", &[]),
            None
        );

        // A development type under the production filter stays as well.
        let profile = complete_profile("MyApp-Dev-iOS", "IOS_APP_DEVELOPMENT");
        assert_eq!(
            plan_for_profile(&profile, ProfileTypeFilter::Production, "MyApp-Dev", &[]),
            None
        );
    }

    #[test]
    fn incomplete_profiles_are_skipped() {
        let missing_bundle = profile(serde_json::json!({
            "id": "P1",
            "attributes": {"name": "MyApp-Dev-iOS", "profileType": "IOS_APP_DEVELOPMENT"},
            "relationships": {
                "certificates": {"data": [{"type": "certificates", "id": "C1"}]}
            }
        }));
        let missing_certificate = profile(serde_json::json!({
            "id": "P2",
            "attributes": {"name": "MyApp-Dev-iOS", "profileType": "IOS_APP_DEVELOPMENT"},
            "relationships": {
                "bundleId": {"data": {"type": "bundleIds", "id": "B1"}},
                "certificates": {"data": []}
            }
        }));
        let missing_type = profile(serde_json::json!({
            "id": "P3",
            "attributes": {"name": "MyApp-Dev-iOS"},
            "relationships": {
                "bundleId": {"data": {"type": "bundleIds", "id": "B1"}},
                "certificates": {"data": [{"type": "certificates", "id": "C1"}]}
            }
        }));
        let missing_name = profile(serde_json::json!({
            "id": "P4",
            "attributes": {"profileType": "IOS_APP_DEVELOPMENT"}
        }));

        for profile in [missing_bundle, missing_certificate, missing_type, missing_name] {
            assert_eq!(
                plan_for_profile(&profile, ProfileTypeFilter::Development, "MyApp-Dev", &[]),
                None
            );
        }
    }

    #[test]
    fn cleanup_removes_only_profile_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("Old.mobileprovision"), b"a").unwrap();
        fs::write(root.join("Old.provisionprofile"), b"b").unwrap();
        fs::write(root.join("notes.txt"), b"c").unwrap();
        fs::write(root.join(".hidden.mobileprovision"), b"d").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested/Keep.mobileprovision"), b"e").unwrap();

        clear_stale_profiles(root).unwrap();

        assert!(!root.join("Old.mobileprovision").exists());
        assert!(!root.join("Old.provisionprofile").exists());
        assert!(root.join("notes.txt").exists());
        assert!(root.join(".hidden.mobileprovision").exists());
        assert!(root.join("nested/Keep.mobileprovision").exists());

        // A second pass over the now-clean directory is a no-op.
        clear_stale_profiles(root).unwrap();
    }

    #[test]
    fn filter_defaults_to_development() {
        use clap::Parser;

        use crate::commands::{Cli, Commands};

        let parse = |extra: &[&str]| {
            let mut raw = vec![
                "asconnect",
                "regenerate",
                "--out-dir",
                "/tmp/profiles",
                "--profile-prefix",
                "MyApp-Dev",
                "--issuer-id",
                "I",
                "--key-id",
                "K",
                "--auth-key",
                "/tmp/AuthKey.p8",
            ];
            raw.extend_from_slice(extra);
            match Cli::try_parse_from(raw).unwrap().command {
                Commands::Regenerate(args) => args,
                other => panic!("unexpected command: {other:?}"),
            }
        };

        assert_eq!(parse(&[]).filter(), ProfileTypeFilter::Development);
        assert_eq!(
            parse(&["--development"]).filter(),
            ProfileTypeFilter::Development
        );
        assert_eq!(
            parse(&["--production"]).filter(),
            ProfileTypeFilter::Production
        );

        let both = Cli::try_parse_from([
            "asconnect",
            "regenerate",
            "--development",
            "--production",
            "--out-dir",
            "/tmp/profiles",
            "--profile-prefix",
            "MyApp-Dev",
            "--issuer-id",
            "I",
            "--key-id",
            "K",
            "--auth-key",
            "/tmp/AuthKey.p8",
        ]);
        assert!(both.is_err());
    }
}
