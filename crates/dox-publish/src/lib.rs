//! Publishing of dox sources to Confluence.
//!
//! A run goes through four phases:
//!
//! | Phase | Work |
//! |-------|------|
//! | Discover | find and parse sources, resolve the root document |
//! | Stub | create placeholder pages so every document has an identity |
//! | Sync | render, mirror images, rewrite links, update changed pages |
//! | Done | return a [`PublishReport`] |
//!
//! # Example
//!
//! ```ignore
//! use dox_config::{Credentials, PublishConfig};
//! use dox_confluence::ConfluenceClient;
//! use dox_publish::{PublishOptions, Publisher, find_repo_root};
//!
//! let repo_root = find_repo_root(&std::env::current_dir()?)?;
//! let config = PublishConfig::load(None, &repo_root)?;
//! let client = ConfluenceClient::new(&config.uri, &Credentials::from_env()?);
//!
//! let report = Publisher::new(&client, &config, PublishOptions::default())
//!     .publish_repo(&repo_root)?;
//! println!("{} pages updated", report.updated());
//! ```

mod attachments;
mod discover;
mod documents;
mod error;
mod links;
mod markup;
mod publisher;
mod report;

pub use attachments::sha256_hex;
pub use discover::{find_repo_root, find_sources};
pub use documents::{DefaultRootSettings, DocumentSet};
pub use error::PublishError;
pub use links::browse_url;
pub use markup::{Reference, image_sources, is_absolute, link_targets};
pub use publisher::{PublishOptions, Publisher, STUB_BODY};
pub use report::{AttachmentCounts, DocumentReport, PublishReport, StubOutcome, SyncOutcome};
