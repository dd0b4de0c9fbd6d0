//! Tracker API request and response types.
//!
//! These types model the Tracker REST API v2 payloads. Structured records keep
//! any field they do not name in an `extra` map so nothing the server sends is
//! dropped.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A remote issue record as a loosely-typed JSON object.
///
/// Returned by `GET /v2/issues/{key}` and `PATCH /v2/issues/{key}`. The client
/// does not validate its shape; use the accessors for the common fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(Map<String, Value>);

impl Ticket {
    /// Get a raw field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get a field value if it is a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// The ticket key (e.g., "QUEUE-42").
    pub fn key(&self) -> Option<&str> {
        self.get_str("key")
    }

    /// The ticket summary.
    pub fn summary(&self) -> Option<&str> {
        self.get_str("summary")
    }

    /// The `key` of the ticket's status reference.
    pub fn status_key(&self) -> Option<&str> {
        self.get("status")
            .and_then(|s| s.get("key"))
            .and_then(Value::as_str)
    }

    /// All fields of the ticket.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the ticket, returning the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Ticket {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Comments on a ticket, in the order the server returned them.
pub type TicketComments = Vec<Comment>;

/// A comment on a ticket.
///
/// Returned as elements of `GET /v2/issues/{key}/comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// API URL of the comment.
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// Numeric comment ID.
    pub id: Value,
    /// Long (string) comment ID.
    #[serde(default)]
    pub long_id: Option<String>,
    /// Comment text in Yandex Flavored Markdown.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_by: Option<Reference>,
    #[serde(default)]
    pub updated_by: Option<Reference>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    /// Comment type, e.g. "standard" or "incoming".
    #[serde(rename = "type", default)]
    pub comment_type: Option<String>,
    /// How the comment was added, e.g. "internal" or "email".
    #[serde(default)]
    pub transport: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    /// Get the author display name, if known.
    pub fn author(&self) -> Option<&str> {
        self.created_by.as_ref().and_then(|r| r.display.as_deref())
    }
}

/// A reference to another Tracker entity (user, queue, status, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Fields not modelled above (e.g. `passportUid` on user references).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self
            .display
            .as_deref()
            .or(self.key.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("");
        write!(f, "{}", label)
    }
}

/// A Tracker issue.
///
/// Returned by `GET /v2/issues/{key}`, `POST /v2/issues/` and as elements of
/// `POST /v2/issues/_search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// API URL of the issue.
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// The issue ID.
    pub id: String,
    /// The issue key (e.g., "QUEUE-42").
    pub key: String,
    #[serde(default)]
    pub version: Option<u64>,
    /// The issue summary/title.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The issue type (bug, task, ...).
    #[serde(rename = "type", default)]
    pub issue_type: Option<Reference>,
    #[serde(default)]
    pub priority: Option<Reference>,
    #[serde(default)]
    pub status: Option<Reference>,
    #[serde(default)]
    pub queue: Option<Reference>,
    #[serde(default)]
    pub assignee: Option<Reference>,
    #[serde(default)]
    pub created_by: Option<Reference>,
    #[serde(default)]
    pub updated_by: Option<Reference>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub followers: Vec<Reference>,
    #[serde(default)]
    pub parent: Option<Reference>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub votes: Option<u64>,
    #[serde(default)]
    pub favorite: Option<bool>,
    /// Fields not modelled above (queue-local fields included).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    /// Get the issue status key, if set.
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.key.as_deref())
    }

    /// Get the queue key, if set.
    pub fn queue_key(&self) -> Option<&str> {
        self.queue.as_ref().and_then(|q| q.key.as_deref())
    }

    /// Get the assignee display name, or "Unassigned" if not set.
    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .and_then(|a| a.display.as_deref())
            .unwrap_or("Unassigned")
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.summary)
    }
}

/// The current authenticated user.
///
/// Returned by `GET /v2/myself`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// The user's ID.
    pub uid: u64,
    /// The user's login.
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub tracker_uid: Option<u64>,
    #[serde(default)]
    pub passport_uid: Option<u64>,
    #[serde(default)]
    pub cloud_uid: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// The user's display name.
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub has_license: bool,
    #[serde(default)]
    pub dismissed: bool,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display, self.login)
    }
}

/// Body of `POST /v2/issues/`.
///
/// Unset fields are omitted. The client passes the value through as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueOptions {
    /// Queue key the issue is created in.
    pub queue: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sprint: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub followers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Idempotency key enforced by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachment_ids: Vec<String>,
}

/// Body of `POST /v2/issues/_search`.
///
/// The server honours one of `filter`, `query`, `keys` or `queue`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindIssuesOptions {
    /// Field filter, e.g. `{"queue": "TREK", "assignee": "empty()"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Map<String, Value>>,
    /// Query language expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    /// Sort order for `filter` searches, e.g. "+status".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// Pagination passed through as query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// Sent as `perPage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Sent as `page` (1-based on the server).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl ListOptions {
    /// Render as a query string (without the leading `?`), empty if unset.
    pub fn to_query(&self) -> String {
        let mut params = Vec::new();
        if let Some(per_page) = self.per_page {
            params.push(format!("perPage={}", per_page));
        }
        if let Some(page) = self.page {
            params.push(format!("page={}", page));
        }
        params.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticket_accessors() {
        let ticket: Ticket = serde_json::from_value(json!({
            "key": "TEST-1",
            "summary": "Broken build",
            "status": {"key": "open", "display": "Open"},
            "customField": 42
        }))
        .unwrap();

        assert_eq!(ticket.key(), Some("TEST-1"));
        assert_eq!(ticket.summary(), Some("Broken build"));
        assert_eq!(ticket.status_key(), Some("open"));
        assert_eq!(ticket.get("customField"), Some(&json!(42)));
        assert!(ticket.get_str("customField").is_none());
        assert!(ticket.get("missing").is_none());
    }

    #[test]
    fn test_ticket_rejects_non_object() {
        assert!(serde_json::from_str::<Ticket>("[1, 2]").is_err());
    }

    #[test]
    fn test_ticket_serializes_transparently() {
        let mut map = Map::new();
        map.insert("key".to_string(), json!("TEST-1"));
        let ticket = Ticket::from(map);
        assert_eq!(serde_json::to_string(&ticket).unwrap(), r#"{"key":"TEST-1"}"#);
    }

    #[test]
    fn test_parse_comment() {
        let json = r#"{
            "self": "https://api.tracker.yandex.net/v2/issues/TEST-1/comments/626",
            "id": 626,
            "longId": "5fa15a24ac894475dd14ff07",
            "text": "Looks good",
            "createdBy": {"id": "1134669289", "display": "Ivan Ivanov"},
            "createdAt": "2020-11-03T13:24:52.575+0000",
            "version": 1,
            "type": "standard",
            "transport": "internal",
            "reactionsCount": {"like": 2}
        }"#;

        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.id, json!(626));
        assert_eq!(comment.text.as_deref(), Some("Looks good"));
        assert_eq!(comment.author(), Some("Ivan Ivanov"));
        assert_eq!(comment.comment_type.as_deref(), Some("standard"));
        assert_eq!(comment.extra.get("reactionsCount"), Some(&json!({"like": 2})));
    }

    #[test]
    fn test_parse_minimal_issue() {
        let json = r#"{"id": "5f9c2a22", "key": "TEST-1"}"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.key, "TEST-1");
        assert_eq!(issue.summary, "");
        assert!(issue.status().is_none());
        assert_eq!(issue.assignee_name(), "Unassigned");
        assert!(issue.followers.is_empty());
    }

    #[test]
    fn test_parse_full_issue() {
        let json = r#"{
            "self": "https://api.tracker.yandex.net/v2/issues/TEST-1",
            "id": "5f9c2a22",
            "key": "TEST-1",
            "version": 5,
            "summary": "Test issue",
            "description": "Details",
            "type": {"id": "2", "key": "task", "display": "Task"},
            "priority": {"id": "3", "key": "normal", "display": "Normal"},
            "status": {"id": "1", "key": "open", "display": "Open"},
            "queue": {"id": "1", "key": "TEST", "display": "Test queue"},
            "assignee": {"id": "1134669289", "display": "Ivan Ivanov"},
            "followers": [{"id": "1134669290", "display": "Petr Petrov"}],
            "aliases": ["ALIAS-1"],
            "votes": 0,
            "favorite": false,
            "storyPoints": 3
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.status(), Some("open"));
        assert_eq!(issue.queue_key(), Some("TEST"));
        assert_eq!(issue.assignee_name(), "Ivan Ivanov");
        assert_eq!(issue.issue_type.as_ref().unwrap().to_string(), "Task");
        assert_eq!(issue.followers.len(), 1);
        assert_eq!(issue.aliases, vec!["ALIAS-1"]);
        assert_eq!(issue.extra.get("storyPoints"), Some(&json!(3)));
        assert_eq!(issue.to_string(), "TEST-1: Test issue");
    }

    #[test]
    fn test_parse_user() {
        let json = r#"{
            "self": "https://api.tracker.yandex.net/v2/users/1234567890",
            "uid": 1234567890,
            "login": "user_login",
            "trackerUid": 1234567890,
            "passportUid": 1234567890,
            "cloudUid": "ajeabcdefghijk",
            "firstName": "Ivan",
            "lastName": "Ivanov",
            "display": "Ivan Ivanov",
            "email": "user_login@example.com",
            "external": false,
            "hasLicense": true,
            "dismissed": false,
            "useNewFilters": true
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.uid, 1234567890);
        assert_eq!(user.cloud_uid.as_deref(), Some("ajeabcdefghijk"));
        assert!(user.has_license);
        assert_eq!(user.extra.get("useNewFilters"), Some(&json!(true)));
        assert_eq!(user.to_string(), "Ivan Ivanov (user_login)");
    }

    #[test]
    fn test_create_options_omit_unset_fields() {
        let opts = CreateIssueOptions {
            queue: "TEST".to_string(),
            summary: "New".to_string(),
            issue_type: Some("bug".to_string()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&opts).unwrap(),
            json!({"queue": "TEST", "summary": "New", "type": "bug"})
        );
    }

    #[test]
    fn test_find_options_serialization() {
        let opts = FindIssuesOptions {
            query: Some("Queue: TEST".to_string()),
            keys: vec!["TEST-1".to_string()],
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&opts).unwrap(),
            json!({"query": "Queue: TEST", "keys": ["TEST-1"]})
        );
        assert_eq!(
            serde_json::to_value(FindIssuesOptions::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_list_options_query() {
        assert_eq!(ListOptions::default().to_query(), "");
        assert_eq!(
            ListOptions {
                per_page: Some(50),
                page: None
            }
            .to_query(),
            "perPage=50"
        );
        assert_eq!(
            ListOptions {
                per_page: Some(50),
                page: Some(2)
            }
            .to_query(),
            "perPage=50&page=2"
        );
    }

    #[test]
    fn test_reference_display_fallbacks() {
        let by_key = Reference {
            key: Some("open".to_string()),
            ..Default::default()
        };
        assert_eq!(by_key.to_string(), "open");
        assert_eq!(Reference::default().to_string(), "");
    }

    #[test]
    fn test_reference_keeps_unmodelled_fields() {
        let value = json!({
            "self": "https://api.tracker.yandex.net/v2/users/1120000000016876",
            "id": "1120000000016876",
            "display": "Ivan Ivanov",
            "passportUid": 1120000000016876u64,
            "cloudUid": "ajeppa7dgp7hcm5s4d9p"
        });

        let reference: Reference = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(reference.display.as_deref(), Some("Ivan Ivanov"));
        assert_eq!(reference.extra["passportUid"], json!(1120000000016876u64));
        assert_eq!(reference.extra["cloudUid"], "ajeppa7dgp7hcm5s4d9p");
        assert!(!reference.extra.contains_key("display"));

        assert_eq!(serde_json::to_value(&reference).unwrap(), value);
    }
}
