//! Confluence integration for dox.
//!
//! This crate provides the remote side of publishing:
//! - [`ContentStore`]: the synchronous operations the publisher relies on
//! - [`ConfluenceClient`]: REST API implementation with HTTP Basic authentication
//! - [`MockStore`]: in-memory implementation (feature `mock`)
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dox_config::Credentials;
//! use dox_confluence::{ConfluenceClient, ContentStore};
//!
//! let client = ConfluenceClient::new("https://wiki.example.com", &Credentials::from_env()?);
//! let page = client.get_page("123", &["body.storage", "version"])?;
//! println!("{} is at version {}", page.title, page.version.number);
//! # Ok(())
//! # }
//! ```

mod auth;

// API client
mod client;
pub use client::ConfluenceClient;

// Remote operations
mod store;
pub use store::ContentStore;

// URLs
mod urls;
pub use urls::{attachment_download_url, view_page_url};

// Types
mod types;
pub use types::{
    Ancestor, Attachment, Body, Links, NewPage, Page, PagesResponse, SpaceRef, Storage, Version,
};

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{CallCounts, MockStore};

// Errors
pub mod error;
pub use error::ConfluenceError;
