//! Confluence API types.

mod attachment;
mod page;

pub use attachment::{Attachment, AttachmentsResponse};
pub use page::{Ancestor, Body, Links, NewPage, Page, PagesResponse, SpaceRef, Storage, Version};
