//! `dox list` command implementation.

use std::path::PathBuf;

use clap::Args;
use dox_config::PublishConfig;
use dox_publish::{DefaultRootSettings, DocumentSet, find_sources};
use dox_source::{ParseOptions, Source};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Path to configuration file (default: auto-discover dox.toml).
    #[arg(short, long, env = "DOX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory inside the repository to list (default: current directory).
    #[arg(long)]
    repo: Option<PathBuf>,
}

impl ListArgs {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or parsing of any source fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let repo_root = super::resolve_repo_root(self.repo.as_deref())?;
        let config = PublishConfig::load(self.config.as_deref(), &repo_root)?;
        let paths = find_sources(&repo_root)?;
        let documents = DocumentSet::load(
            &repo_root,
            &paths,
            ParseOptions::default(),
            &DefaultRootSettings::from_config(&config, &repo_root),
        )?;

        output.heading(&format!("Sources in {}:", documents.repo_root().display()));
        for source in documents.sources() {
            output.row(source.identity().unwrap_or("-"), &describe(source));
        }
        Ok(())
    }
}

fn describe(source: &Source) -> String {
    let mut flags = Vec::new();
    if source.is_root() {
        flags.push("root");
    }
    if source.is_ignored() {
        flags.push("ignored");
    }
    if source.omit_notice() && source.path().is_some() {
        flags.push("omit-notice");
    }

    let mut line = format!("{}  {}", source.display_name(), source.title());
    if !flags.is_empty() {
        line.push_str(&format!("  [{}]", flags.join(", ")));
    }
    line
}
