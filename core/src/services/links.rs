use tracing::debug;

use super::{attach_tag, detach_tag, link_tags, or_missing, require_id};
use crate::client::RebrandlyClient;
use crate::error::{Missing, Result};
use crate::types::{parse_record, parse_records, to_payload, CreateLink, Link, LinkFilters, Tag, UpdateLink};

/// Operations on `/links` and the link side of link/tag relations.
#[derive(Debug, Clone)]
pub struct LinkService {
    client: RebrandlyClient,
}

impl LinkService {
    pub fn new(client: RebrandlyClient) -> Self {
        Self { client }
    }

    /// Create a short link. When the command names no domain, the client's
    /// default domain (if configured) is used.
    ///
    /// A network failure is retried like any other call. If the server
    /// created the link but the reply was lost, the retry may create a
    /// second link; no idempotency key is sent.
    pub fn create_link(&self, input: &CreateLink) -> Result<Link> {
        let mut command = input.clone();
        if command.domain.is_none() {
            command.domain = self.client.default_domain().map(str::to_string);
        }

        let response = self.client.post(&["links"], Some(&to_payload(&command)?))?;
        require_id(&response, "Link creation response missing ID")?;
        let link: Link = parse_record("link", response)?;
        debug!(link_id = ?link.id, short_url = ?link.short_url, "link created");
        Ok(link)
    }

    pub fn get_link(&self, link_id: &str) -> Result<Link> {
        let result = self.client.get(&["links", link_id], &[]);
        let response = or_missing(result, || Missing::Link(link_id.to_string()))?;
        parse_record("link", response)
    }

    pub fn update_link(&self, link_id: &str, input: &UpdateLink) -> Result<Link> {
        let result = self.client.put(&["links", link_id], &to_payload(input)?);
        let response = or_missing(result, || Missing::Link(link_id.to_string()))?;
        parse_record("link", response)
    }

    pub fn delete_link(&self, link_id: &str) -> Result<()> {
        let result = self.client.delete(&["links", link_id]);
        or_missing(result, || Missing::Link(link_id.to_string()))?;
        Ok(())
    }

    pub fn list_links(&self, filters: &LinkFilters) -> Result<Vec<Link>> {
        let response = self.client.get(&["links"], &filters.to_query())?;
        parse_records("link", response)
    }

    pub fn attach_tag(&self, link_id: &str, tag_id: &str) -> Result<()> {
        attach_tag(&self.client, link_id, tag_id)
    }

    pub fn detach_tag(&self, link_id: &str, tag_id: &str) -> Result<()> {
        detach_tag(&self.client, link_id, tag_id)
    }

    /// Tags attached to a link.
    pub fn link_tags(&self, link_id: &str) -> Result<Vec<Tag>> {
        link_tags(&self.client, link_id)
    }
}
