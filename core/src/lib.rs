//! Typed blocking client for the Rebrandly URL-shortening API.
//!
//! # Overview
//! Typed commands go out as JSON requests and responses come back as typed
//! records. Every failure is one of the [`RebrandlyError`] variants.
//!
//! ```no_run
//! use rebrandly_core::{CreateLink, Rebrandly, RebrandlyConfig};
//!
//! # fn main() -> rebrandly_core::Result<()> {
//! let api = Rebrandly::new(&RebrandlyConfig::from_env()?)?;
//! let link = api.links.create_link(&CreateLink {
//!     slashtag: Some("launch".to_string()),
//!     ..CreateLink::new("https://example.com")
//! })?;
//! println!("{:?}", link.short_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `RebrandlyClient` owns the endpoint, API key and retry policy, and is the
//!   only thing that performs I/O (through the [`Transport`] trait).
//! - Services translate between records and client calls and turn the
//!   client's generic 404 into entity-specific errors.
//! - Construct one [`Rebrandly`] (or one client plus services) at startup and
//!   share it; nothing is global.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod services;
pub mod types;

pub use client::RebrandlyClient;
pub use config::RebrandlyConfig;
pub use error::{Missing, RebrandlyError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use services::{AccountService, LinkService, Rebrandly, TagService};
pub use types::{
    Account, CreateLink, CreateTag, Link, LinkFilters, Tag, TagFilters, UpdateLink, UpdateTag,
};
