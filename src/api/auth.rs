//! Authentication handling for the Tracker API.
//!
//! This module builds the outbound credential headers and stores OAuth/IAM
//! tokens in the OS keyring.

use std::fmt;

use super::transport::Headers;

/// The keyring service name for ytrack tokens.
const KEYRING_SERVICE: &str = "ytrack";

/// Header carrying a Yandex 360 organization ID.
pub const ORG_ID_HEADER: &str = "X-Org-Id";

/// Header carrying a Yandex Cloud organization ID.
pub const CLOUD_ORG_ID_HEADER: &str = "X-Cloud-Org-ID";

/// The organization a request is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Organization {
    /// A Yandex 360 organization, sent as `X-Org-Id`.
    Org(String),
    /// A Yandex Cloud organization, sent as `X-Cloud-Org-ID`.
    Cloud(String),
}

impl Organization {
    /// Pick the organization from the two identifiers.
    ///
    /// A non-empty cloud ID wins; otherwise the org ID is used even if empty.
    pub fn resolve(org_id: &str, cloud_org_id: &str) -> Self {
        if cloud_org_id.is_empty() {
            Organization::Org(org_id.to_string())
        } else {
            Organization::Cloud(cloud_org_id.to_string())
        }
    }

    /// The header name for this organization kind.
    pub fn header_name(&self) -> &'static str {
        match self {
            Organization::Org(_) => ORG_ID_HEADER,
            Organization::Cloud(_) => CLOUD_ORG_ID_HEADER,
        }
    }

    /// The identifier value.
    pub fn id(&self) -> &str {
        match self {
            Organization::Org(id) | Organization::Cloud(id) => id,
        }
    }
}

/// Credentials attached to every request.
///
/// Neither the token nor the organization ID is validated. The token is sent
/// verbatim as the `Authorization` value, so it must carry its own scheme
/// (e.g. "OAuth <token>" or "Bearer <iam-token>").
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    organization: Organization,
}

impl Credentials {
    /// Create credentials from a token and the two organization identifiers.
    pub fn new(token: &str, org_id: &str, cloud_org_id: &str) -> Self {
        Self {
            token: token.to_string(),
            organization: Organization::resolve(org_id, cloud_org_id),
        }
    }

    /// The organization requests are scoped to.
    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    /// Build the fixed outbound header set.
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Authorization".to_string(), self.token.clone());
        headers.insert(
            self.organization.header_name().to_string(),
            self.organization.id().to_string(),
        );
        headers
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

/// Keyring access failure.
#[derive(Debug, thiserror::Error)]
#[error("Keyring error: {0}")]
pub struct KeyringError(String);

/// Store an API token in the OS keyring.
///
/// # Arguments
///
/// * `profile_name` - The profile name to use as the keyring username
/// * `token` - The token to store, including its scheme
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), KeyringError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| KeyringError(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| KeyringError(format!("failed to store token: {}", e)))
}

/// Retrieve an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be retrieved from the keyring.
pub fn get_token(profile_name: &str) -> Result<String, KeyringError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| KeyringError(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| KeyringError(format!("failed to retrieve token: {}", e)))
}

/// Delete an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be deleted from the keyring.
pub fn delete_token(profile_name: &str) -> Result<(), KeyringError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| KeyringError(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| KeyringError(format!("failed to delete token: {}", e)))
}

/// Check if a token exists in the OS keyring for a profile.
pub fn has_token(profile_name: &str) -> bool {
    get_token(profile_name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_id_header_when_no_cloud_id() {
        let headers = Credentials::new("OAuth abc123", "123", "").headers();

        assert_eq!(headers["X-Org-Id"], "123");
        assert!(!headers.contains_key("X-Cloud-Org-ID"));
    }

    #[test]
    fn test_cloud_id_takes_precedence() {
        let headers = Credentials::new("OAuth abc123", "123", "456").headers();

        assert_eq!(headers["X-Cloud-Org-ID"], "456");
        assert!(!headers.contains_key("X-Org-Id"));
    }

    #[test]
    fn test_fixed_headers_present() {
        let headers = Credentials::new("OAuth abc123", "123", "").headers();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Authorization"], "OAuth abc123");
    }

    #[test]
    fn test_token_sent_verbatim() {
        let headers = Credentials::new("y0_raw-token", "1", "").headers();
        assert_eq!(headers["Authorization"], "y0_raw-token");
    }

    #[test]
    fn test_empty_identifiers_accepted() {
        let creds = Credentials::new("", "", "");
        let headers = creds.headers();

        assert_eq!(creds.organization(), &Organization::Org(String::new()));
        assert_eq!(headers["X-Org-Id"], "");
        assert_eq!(headers["Authorization"], "");
    }

    #[test]
    fn test_credentials_do_not_expose_token() {
        let creds = Credentials::new("OAuth secret_token", "123", "");
        let debug_output = format!("{:?}", creds);

        assert!(!debug_output.contains("secret_token"));
        assert!(debug_output.contains("123"));
    }
}
