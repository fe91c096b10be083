//! Resource services: one method per remote capability.
//!
//! Each method encodes its command, calls the matching `RebrandlyClient`
//! verb and parses the decoded body into records. A 404 from the client is
//! rewritten with the identifier the method was called with; every other
//! error passes through unchanged.

mod account;
mod links;
mod tags;

pub use account::AccountService;
pub use links::LinkService;
pub use tags::TagService;

use std::sync::Arc;

use serde_json::Value;

use crate::client::RebrandlyClient;
use crate::config::RebrandlyConfig;
use crate::error::{Missing, RebrandlyError, Result};
use crate::http::Transport;
use crate::types::{parse_records, Link, LinkFilters, Tag};

/// One client and one instance of each service, built once and shared for
/// the life of the process.
#[derive(Debug, Clone)]
pub struct Rebrandly {
    pub links: LinkService,
    pub tags: TagService,
    pub account: AccountService,
}

impl Rebrandly {
    pub fn new(config: &RebrandlyConfig) -> Result<Self> {
        Ok(Self::from_client(RebrandlyClient::new(config)?))
    }

    pub fn with_transport(config: &RebrandlyConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self::from_client(RebrandlyClient::with_transport(config, transport)?))
    }

    pub fn from_client(client: RebrandlyClient) -> Self {
        Self {
            links: LinkService::new(client.clone()),
            tags: TagService::new(client.clone()),
            account: AccountService::new(client),
        }
    }
}

/// Replace any 404-coded error with a `NotFound` naming `missing`.
fn or_missing<T>(result: Result<T>, missing: impl FnOnce() -> Missing) -> Result<T> {
    result.map_err(|err| match err.status() {
        Some(404) => RebrandlyError::NotFound(missing()),
        _ => err,
    })
}

/// Creation responses must carry the new resource's `id`.
fn require_id(response: &Value, message: &str) -> Result<()> {
    match response.get("id") {
        Some(id) if !id.is_null() => Ok(()),
        _ => Err(RebrandlyError::InvalidResponse(message.to_string())),
    }
}

fn attach_tag(client: &RebrandlyClient, link_id: &str, tag_id: &str) -> Result<()> {
    let result = client.post(&["links", link_id, "tags", tag_id], None);
    or_missing(result, || Missing::LinkOrTag).map(|_| ())
}

fn detach_tag(client: &RebrandlyClient, link_id: &str, tag_id: &str) -> Result<()> {
    let result = client.delete(&["links", link_id, "tags", tag_id]);
    or_missing(result, || Missing::LinkOrTag).map(|_| ())
}

fn link_tags(client: &RebrandlyClient, link_id: &str) -> Result<Vec<Tag>> {
    let result = client.get(&["links", link_id, "tags"], &[]);
    let response = or_missing(result, || Missing::Link(link_id.to_string()))?;
    parse_records("tag", response)
}

fn tag_links(client: &RebrandlyClient, tag_id: &str, filters: &LinkFilters) -> Result<Vec<Link>> {
    let result = client.get(&["tags", tag_id, "links"], &filters.to_query());
    let response = or_missing(result, || Missing::Tag(tag_id.to_string()))?;
    parse_records("link", response)
}
