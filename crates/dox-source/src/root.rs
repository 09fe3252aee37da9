//! Synthesized root document for trees without a `ROOT.md`.

use crate::error::SourceError;

/// Root page standing in for a missing `ROOT.md`.
///
/// It has no backing file, so an assigned identity lives only for the
/// current run; `root_id` in `dox.toml` makes it stick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRoot {
    title: String,
    identity: Option<String>,
}

impl DefaultRoot {
    pub fn new(title: impl Into<String>, identity: Option<String>) -> Self {
        Self {
            title: title.into(),
            identity,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Assign the identity returned by the stub phase.
    pub fn set_identity(&mut self, identity: &str) -> Result<(), SourceError> {
        if let Some(existing) = &self.identity {
            return Err(SourceError::IdentityAlreadySet {
                path: format!("<default root: {}>", self.title).into(),
                identity: existing.clone(),
            });
        }
        self.identity = Some(identity.to_owned());
        Ok(())
    }
}
