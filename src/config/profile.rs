//! Tracker profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::Credentials;

/// A Tracker profile configuration.
///
/// Profiles store the organization a set of requests is scoped to. Tokens are
/// stored separately in the OS keychain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// Yandex 360 organization ID, sent as `X-Org-Id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// Yandex Cloud organization ID, sent as `X-Cloud-Org-ID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_org_id: Option<String>,
}

impl Profile {
    /// Create a new profile.
    pub fn new(name: String, org_id: Option<String>, cloud_org_id: Option<String>) -> Self {
        Self {
            name,
            org_id,
            cloud_org_id,
        }
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The name is non-empty and has no whitespace
    /// - Exactly one of `org_id` / `cloud_org_id` is set and non-empty
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        let has_org = self.org_id.as_deref().is_some_and(|s| !s.is_empty());
        let has_cloud = self.cloud_org_id.as_deref().is_some_and(|s| !s.is_empty());
        match (has_org, has_cloud) {
            (true, true) => Err(ConfigError::ValidationError(format!(
                "profile '{}': set either org_id or cloud_org_id, not both",
                self.name
            ))),
            (false, false) => Err(ConfigError::ValidationError(format!(
                "profile '{}': an org_id or cloud_org_id is required",
                self.name
            ))),
            _ => Ok(()),
        }
    }

    /// Build request credentials for this profile.
    pub fn credentials(&self, token: &str) -> Credentials {
        Credentials::new(
            token,
            self.org_id.as_deref().unwrap_or_default(),
            self.cloud_org_id.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Organization;

    #[test]
    fn test_profile_creation() {
        let profile = Profile::new("work".to_string(), Some("123".to_string()), None);

        assert_eq!(profile.name, "work");
        assert_eq!(profile.org_id.as_deref(), Some("123"));
        assert!(profile.cloud_org_id.is_none());
    }

    #[test]
    fn test_valid_profiles() {
        assert!(Profile::new("work".to_string(), Some("123".to_string()), None)
            .validate()
            .is_ok());
        assert!(Profile::new("cloud".to_string(), None, Some("bpf3".to_string()))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let profile = Profile::new("".to_string(), Some("123".to_string()), None);

        let result = profile.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let profile = Profile::new("my work".to_string(), Some("123".to_string()), None);

        let result = profile.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot contain whitespace"));
    }

    #[test]
    fn test_both_organizations_rejected() {
        let profile = Profile::new(
            "work".to_string(),
            Some("123".to_string()),
            Some("456".to_string()),
        );

        let result = profile.validate();
        assert!(result.unwrap_err().to_string().contains("not both"));
    }

    #[test]
    fn test_no_organization_rejected() {
        let profile = Profile::new("work".to_string(), Some("".to_string()), None);

        let result = profile.validate();
        assert!(result.unwrap_err().to_string().contains("is required"));
    }

    #[test]
    fn test_credentials_use_configured_organization() {
        let org = Profile::new("work".to_string(), Some("123".to_string()), None);
        assert_eq!(
            org.credentials("OAuth t").organization(),
            &Organization::Org("123".to_string())
        );

        let cloud = Profile::new("cloud".to_string(), None, Some("456".to_string()));
        assert_eq!(
            cloud.credentials("OAuth t").organization(),
            &Organization::Cloud("456".to_string())
        );
    }

    #[test]
    fn test_profile_serialization() {
        let profile = Profile::new("work".to_string(), Some("123".to_string()), None);

        let toml_str = toml::to_string(&profile).unwrap();
        assert!(!toml_str.contains("cloud_org_id"));
        let parsed: Profile = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, profile);
    }
}
