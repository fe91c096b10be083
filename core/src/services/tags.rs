use tracing::debug;

use super::{attach_tag, detach_tag, link_tags, or_missing, require_id, tag_links};
use crate::client::RebrandlyClient;
use crate::error::{Missing, Result};
use crate::types::{parse_record, parse_records, to_payload, CreateTag, Link, LinkFilters, Tag, TagFilters, UpdateTag};

/// Operations on `/tags` and the tag side of link/tag relations.
#[derive(Debug, Clone)]
pub struct TagService {
    client: RebrandlyClient,
}

impl TagService {
    pub fn new(client: RebrandlyClient) -> Self {
        Self { client }
    }

    /// Create a tag. Retried on network failure like `create_link`, with the
    /// same risk of a duplicate if the first reply was lost.
    pub fn create_tag(&self, input: &CreateTag) -> Result<Tag> {
        let response = self.client.post(&["tags"], Some(&to_payload(input)?))?;
        require_id(&response, "Tag creation response missing ID")?;
        let tag: Tag = parse_record("tag", response)?;
        debug!(tag_id = ?tag.id, "tag created");
        Ok(tag)
    }

    pub fn get_tag(&self, tag_id: &str) -> Result<Tag> {
        let result = self.client.get(&["tags", tag_id], &[]);
        let response = or_missing(result, || Missing::Tag(tag_id.to_string()))?;
        parse_record("tag", response)
    }

    pub fn update_tag(&self, tag_id: &str, input: &UpdateTag) -> Result<Tag> {
        let result = self.client.put(&["tags", tag_id], &to_payload(input)?);
        let response = or_missing(result, || Missing::Tag(tag_id.to_string()))?;
        parse_record("tag", response)
    }

    pub fn delete_tag(&self, tag_id: &str) -> Result<()> {
        let result = self.client.delete(&["tags", tag_id]);
        or_missing(result, || Missing::Tag(tag_id.to_string()))?;
        Ok(())
    }

    pub fn list_tags(&self, filters: &TagFilters) -> Result<Vec<Tag>> {
        let response = self.client.get(&["tags"], &filters.to_query())?;
        parse_records("tag", response)
    }

    /// Links carrying a tag.
    pub fn tag_links(&self, tag_id: &str, filters: &LinkFilters) -> Result<Vec<Link>> {
        tag_links(&self.client, tag_id, filters)
    }

    pub fn attach_to_link(&self, link_id: &str, tag_id: &str) -> Result<()> {
        attach_tag(&self.client, link_id, tag_id)
    }

    pub fn detach_from_link(&self, link_id: &str, tag_id: &str) -> Result<()> {
        detach_tag(&self.client, link_id, tag_id)
    }

    pub fn link_tags(&self, link_id: &str) -> Result<Vec<Tag>> {
        link_tags(&self.client, link_id)
    }
}
