//! Domain records for the Rebrandly API.
//!
//! # Design
//! Every field is optional unless the API requires it on input, and absence
//! never collapses into a zero value: a missing `clicks` stays `None`, not
//! `0`. On the way out, only set fields are emitted, so `Some(false)` reaches
//! the server as `"favourite": false` while `None` leaves the key out. Partial
//! updates depend on that difference.
//!
//! Result records (`Account`, `Link`, `Tag`) are parsed with [`parse_record`];
//! commands and result records are encoded with [`to_payload`]. Filters encode
//! to flat query pairs instead of a JSON body.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{RebrandlyError, Result};

/// Account details returned by `GET /account`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription: Option<Map<String, Value>>,
    #[serde(default)]
    pub limits: Option<Map<String, Value>>,
    #[serde(default)]
    pub usage: Option<Map<String, Value>>,
}

/// A short link.
///
/// Serializing a `Link` yields its writable payload; the fields the server
/// owns (`id`, `shortUrl`, timestamps, `clicks`) are never emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slashtag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Full domain name, e.g. `rebrand.ly`. The API sends either a string or
    /// a domain object; both normalize to the name.
    #[serde(
        default,
        deserialize_with = "deserialize_domain",
        skip_serializing_if = "Option::is_none"
    )]
    pub domain: Option<String>,
    #[serde(default, skip_serializing)]
    pub short_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub clicks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favourite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A tag. Serializes to its writable payload (`name`, `color`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub links_count: Option<u64>,
}

/// Request payload for `POST /links`.
///
/// An empty `destination` is sent as-is; the server rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateLink {
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slashtag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favourite: Option<bool>,
}

impl CreateLink {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }
}

/// Partial update for `PUT /links/{id}`. Only set fields are sent; omitted
/// fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slashtag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favourite: Option<bool>,
}

/// Request payload for `POST /tags`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CreateTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }
}

/// Partial update for `PUT /tags/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Query parameters for `GET /links` and `GET /tags/{id}/links`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkFilters {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub domain: Option<String>,
    pub favourite: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub slashtag: Option<String>,
    pub title: Option<String>,
    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub modified_before: Option<DateTime<Utc>>,
    pub modified_after: Option<DateTime<Utc>>,
}

impl LinkFilters {
    /// Flat query pairs for the set filters, in a fixed order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push(&mut query, "limit", &self.limit);
        push(&mut query, "offset", &self.offset);
        push(&mut query, "orderBy", &self.order_by);
        push(&mut query, "orderDir", &self.order_dir);
        push(&mut query, "domain", &self.domain);
        push(&mut query, "favourite", &self.favourite);
        push(&mut query, "tags", &self.tags.as_ref().map(|tags| tags.join(",")));
        push(&mut query, "slashtag", &self.slashtag);
        push(&mut query, "title", &self.title);
        push(&mut query, "createdBefore", &self.created_before.map(format_timestamp));
        push(&mut query, "createdAfter", &self.created_after.map(format_timestamp));
        push(&mut query, "modifiedBefore", &self.modified_before.map(format_timestamp));
        push(&mut query, "modifiedAfter", &self.modified_after.map(format_timestamp));
        query
    }
}

/// Query parameters for `GET /tags`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFilters {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
}

impl TagFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push(&mut query, "limit", &self.limit);
        push(&mut query, "offset", &self.offset);
        push(&mut query, "orderBy", &self.order_by);
        push(&mut query, "orderDir", &self.order_dir);
        query
    }
}

/// Second precision, always UTC, e.g. `2023-01-01T12:30:45Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a decoded response body into a record. `kind` names the record in
/// the error message.
pub fn parse_record<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| RebrandlyError::InvalidResponse(format!("Malformed {kind} payload: {e}")))
}

/// Parse a decoded list response. Each element is parsed independently and
/// order is preserved. An empty object (what an empty body decodes to) is
/// an empty list.
pub fn parse_records<T: DeserializeOwned>(kind: &str, value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| parse_record(kind, item))
            .collect(),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        other => Err(RebrandlyError::InvalidResponse(format!(
            "Expected a JSON array of {kind} records, got {}",
            json_kind(&other)
        ))),
    }
}

/// Encode a command or record as a JSON object holding only its set fields.
pub fn to_payload<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| RebrandlyError::Serialization(e.to_string()))
}

fn push<T: ToString>(query: &mut Vec<(String, String)>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        query.push((key.to_string(), value.to_string()));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DomainRepr {
    Name(String),
    Object {
        #[serde(default, rename = "fullName")]
        full_name: Option<String>,
    },
}

fn deserialize_domain<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<DomainRepr>::deserialize(deserializer)?;
    Ok(repr.and_then(|repr| match repr {
        DomainRepr::Name(name) => Some(name),
        DomainRepr::Object { full_name } => full_name,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn link(value: Value) -> Result<Link> {
        parse_record("link", value)
    }

    #[test]
    fn link_parses_full_payload() {
        let parsed = link(json!({
            "id": "abc123def456",
            "title": "Test Link",
            "slashtag": "test",
            "destination": "https://example.com",
            "domain": {"id": "domain123", "fullName": "rebrand.ly"},
            "shortUrl": "https://rebrand.ly/test",
            "tags": ["tag1", "tag2"],
            "createdAt": "2023-01-01T12:00:00Z",
            "updatedAt": "2023-01-02T11:00:00.000Z",
            "clicks": 42,
            "favourite": false,
            "description": "Test link description"
        }))
        .unwrap();

        assert_eq!(parsed.id.as_deref(), Some("abc123def456"));
        assert_eq!(parsed.domain.as_deref(), Some("rebrand.ly"));
        assert_eq!(parsed.short_url.as_deref(), Some("https://rebrand.ly/test"));
        assert_eq!(parsed.tags, Some(vec!["tag1".to_string(), "tag2".to_string()]));
        assert_eq!(parsed.created_at, Some(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()));
        assert_eq!(parsed.updated_at, Some(Utc.with_ymd_and_hms(2023, 1, 2, 11, 0, 0).unwrap()));
        assert_eq!(parsed.clicks, Some(42));
        assert_eq!(parsed.favourite, Some(false));
    }

    #[test]
    fn domain_string_and_object_normalize_alike() {
        let plain = link(json!({"domain": "rebrand.ly"})).unwrap();
        let object = link(json!({"domain": {"fullName": "rebrand.ly"}})).unwrap();
        assert_eq!(plain.domain.as_deref(), Some("rebrand.ly"));
        assert_eq!(object.domain, plain.domain);

        let nameless = link(json!({"domain": {"id": "d1"}})).unwrap();
        assert_eq!(nameless.domain, None);
        let null = link(json!({"domain": null})).unwrap();
        assert_eq!(null.domain, None);
    }

    #[test]
    fn absent_fields_stay_unset() {
        let parsed = link(json!({})).unwrap();
        assert_eq!(parsed, Link::default());

        let tag: Tag = parse_record("tag", json!({"name": "Marketing"})).unwrap();
        assert_eq!(tag.links_count, None);
        assert_eq!(tag.created_at, None);
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        let err = link(json!({"createdAt": "yesterday"})).unwrap_err();
        assert!(matches!(err, RebrandlyError::InvalidResponse(_)));
        assert!(err.to_string().contains("link"));

        assert!(link(json!({"createdAt": null})).unwrap().created_at.is_none());
    }

    #[test]
    fn account_keeps_opaque_maps() {
        let account: Account = parse_record(
            "account",
            json!({
                "id": "user123abc",
                "fullName": "Test User",
                "avatarUrl": "https://secure.gravatar.com/avatar/abc123",
                "createdAt": "2023-01-01T10:00:00Z",
                "subscription": {"plan": "free", "limits": {"links": 1000}},
                "usage": {"links": 150}
            }),
        )
        .unwrap();
        assert_eq!(account.full_name.as_deref(), Some("Test User"));
        assert_eq!(account.subscription.as_ref().unwrap()["plan"], "free");
        assert_eq!(account.usage.as_ref().unwrap()["links"], 150);
        assert!(account.limits.is_none());
        assert!(account.email.is_none());
    }

    #[test]
    fn false_is_present_absent_is_omitted() {
        let set = to_payload(&UpdateLink {
            favourite: Some(false),
            title: Some(String::new()),
            ..UpdateLink::default()
        })
        .unwrap();
        assert_eq!(set, json!({"favourite": false, "title": ""}));

        let unset = to_payload(&UpdateLink::default()).unwrap();
        assert_eq!(unset, json!({}));
    }

    #[test]
    fn create_link_always_sends_destination() {
        let body = to_payload(&CreateLink::new("")).unwrap();
        assert_eq!(body, json!({"destination": ""}));

        let body = to_payload(&CreateLink {
            slashtag: Some("test".to_string()),
            tags: Some(vec!["a".to_string()]),
            favourite: Some(true),
            ..CreateLink::new("https://example.com")
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"destination": "https://example.com", "slashtag": "test", "tags": ["a"], "favourite": true})
        );
    }

    #[test]
    fn link_payload_round_trips_writable_fields() {
        let original = link(json!({
            "id": "abc",
            "title": "T",
            "slashtag": "s",
            "destination": "https://d.example",
            "domain": {"fullName": "rebrand.ly"},
            "clicks": 9,
            "tags": ["x"],
            "favourite": false
        }))
        .unwrap();

        let payload = to_payload(&original).unwrap();
        assert!(payload.get("id").is_none());
        assert!(payload.get("clicks").is_none());

        let back = link(payload).unwrap();
        assert_eq!(back.title, original.title);
        assert_eq!(back.slashtag, original.slashtag);
        assert_eq!(back.destination, original.destination);
        assert_eq!(back.domain, original.domain);
        assert_eq!(back.tags, original.tags);
        assert_eq!(back.favourite, original.favourite);
        assert_eq!(back.id, None);
    }

    #[test]
    fn tag_payload_holds_name_and_color() {
        let tag: Tag = parse_record(
            "tag",
            json!({"id": "t1", "name": "Marketing", "color": "#ff6b35", "linksCount": 25}),
        )
        .unwrap();
        assert_eq!(to_payload(&tag).unwrap(), json!({"name": "Marketing", "color": "#ff6b35"}));
        assert_eq!(to_payload(&CreateTag::new("New")).unwrap(), json!({"name": "New"}));
        assert_eq!(
            to_payload(&UpdateTag { color: Some("#000000".to_string()), ..UpdateTag::default() }).unwrap(),
            json!({"color": "#000000"})
        );
    }

    #[test]
    fn link_filters_encode_flat_query() {
        assert!(LinkFilters::default().to_query().is_empty());

        let filters = LinkFilters {
            limit: Some(10),
            favourite: Some(false),
            tags: Some(vec!["marketing".to_string(), "campaign".to_string()]),
            created_after: Some(Utc.with_ymd_and_hms(2023, 1, 1, 12, 30, 45).unwrap()),
            modified_before: Some(
                Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
                    + chrono::Duration::milliseconds(500),
            ),
            ..LinkFilters::default()
        };
        let query = filters.to_query();
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("limit", "10"),
                ("favourite", "false"),
                ("tags", "marketing,campaign"),
                ("createdAfter", "2023-01-01T12:30:45Z"),
                ("modifiedBefore", "2023-12-31T23:59:59Z"),
            ]
        );
    }

    #[test]
    fn tag_filters_encode_flat_query() {
        let filters = TagFilters {
            limit: Some(5),
            order_by: Some("name".to_string()),
            order_dir: Some("asc".to_string()),
            ..TagFilters::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("limit".to_string(), "5".to_string()),
                ("orderBy".to_string(), "name".to_string()),
                ("orderDir".to_string(), "asc".to_string()),
            ]
        );
    }

    #[test]
    fn list_parsing_accepts_arrays_and_empty_bodies() {
        let links: Vec<Link> =
            parse_records("link", json!([{"id": "a"}, {"id": "b"}])).unwrap();
        let ids: Vec<_> = links.iter().map(|l| l.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(parse_records::<Link>("link", json!([])).unwrap().is_empty());
        assert!(parse_records::<Link>("link", json!({})).unwrap().is_empty());

        let err = parse_records::<Link>("link", json!({"id": "a"})).unwrap_err();
        assert!(matches!(err, RebrandlyError::InvalidResponse(_)));
    }
}
