use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::Error;
use crate::connect_endpoint;
use crate::connect::session::{ConnectSession, RequestType};
use crate::connect::v1::ResourceRef;

impl ConnectSession {
    /// Lists profiles with their certificate and bundle id relationships
    /// included, so the regeneration flow can rebuild each one without
    /// further lookups.
    pub async fn list_profiles(&self, limit: u32) -> Result<ProfilesResponse, Error> {
        let endpoint = connect_endpoint!(
            "/v1/profiles?limit={}&include=certificates,bundleId",
            limit
        );

        let response = self.v1_send_request(&endpoint, None, Some(RequestType::Get)).await?;
        let response_data: ProfilesResponse = serde_json::from_value(response)?;

        Ok(response_data)
    }

    pub async fn delete_profile(&self, profile_id: &str) -> Result<(), Error> {
        let endpoint = connect_endpoint!("/v1/profiles/{}", profile_id);

        let _ = self
            .v1_send_request(&endpoint, None, Some(RequestType::Delete))
            .await?;

        Ok(())
    }

    pub async fn create_profile(
        &self,
        name: &str,
        profile_type: ProfileType,
        bundle_id: &str,
        device_ids: &[String],
        certificate_id: &str,
    ) -> Result<ProfileResponse, Error> {
        let endpoint = connect_endpoint!("/v1/profiles");

        let body = json!({
            "data": {
                "type": "profiles",
                "attributes": {
                    "name": name,
                    "profileType": profile_type
                },
                "relationships": {
                    "bundleId": {
                        "data": ResourceRef::new("bundleIds", bundle_id)
                    },
                    "devices": {
                        "data": device_ids
                            .iter()
                            .map(|id| ResourceRef::new("devices", id))
                            .collect::<Vec<_>>()
                    },
                    "certificates": {
                        "data": [ResourceRef::new("certificates", certificate_id)]
                    }
                }
            }
        });

        let response = self
            .v1_send_request(&endpoint, Some(body), Some(RequestType::Post))
            .await?;
        let response_data: ProfileResponse = serde_json::from_value(response)?;

        Ok(response_data)
    }
}

#[derive(Deserialize, Debug)]
pub struct ProfilesResponse {
    pub data: Vec<Profile>,
}

#[derive(Deserialize, Debug)]
pub struct ProfileResponse {
    pub data: Profile,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Profile {
    pub id: String,
    pub attributes: Option<ProfileAttributes>,
    pub relationships: Option<ProfileRelationships>,
}

impl Profile {
    pub fn name(&self) -> Option<&str> {
        self.attributes.as_ref()?.name.as_deref()
    }

    pub fn profile_type(&self) -> Option<ProfileType> {
        self.attributes.as_ref()?.profile_type
    }

    pub fn profile_content(&self) -> Option<&str> {
        self.attributes.as_ref()?.profile_content.as_deref()
    }

    pub fn bundle_id(&self) -> Option<&str> {
        let data = self.relationships.as_ref()?.bundle_id.as_ref()?.data.as_ref()?;
        Some(data.id.as_str())
    }

    pub fn first_certificate_id(&self) -> Option<&str> {
        let data = self
            .relationships
            .as_ref()?
            .certificates
            .as_ref()?
            .data
            .as_ref()?;
        Some(data.first()?.id.as_str())
    }
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    pub name: Option<String>,
    pub profile_type: Option<ProfileType>,
    pub profile_state: Option<String>,
    pub profile_content: Option<String>,
    pub uuid: Option<String>,
    pub platform: Option<String>,
    pub created_date: Option<String>,
    pub expiration_date: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRelationships {
    pub bundle_id: Option<Relationship>,
    pub certificates: Option<RelationshipList>,
    pub devices: Option<RelationshipList>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Relationship {
    pub data: Option<ResourceRef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RelationshipList {
    pub data: Option<Vec<ResourceRef>>,
}

/// Apple's fixed profile-type taxonomy.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileType {
    IosAppDevelopment,
    IosAppStore,
    IosAppAdhoc,
    IosAppInhouse,
    MacAppDevelopment,
    MacAppStore,
    MacAppDirect,
    TvosAppDevelopment,
    TvosAppStore,
    TvosAppAdhoc,
    TvosAppInhouse,
    MacCatalystAppDevelopment,
    MacCatalystAppStore,
    MacCatalystAppDirect,
}
