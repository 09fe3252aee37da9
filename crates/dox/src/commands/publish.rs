//! `dox publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use dox_config::{Credentials, PublishConfig};
use dox_confluence::ConfluenceClient;
use dox_publish::{DocumentReport, PublishOptions, PublishReport, Publisher, StubOutcome};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Show what would change without creating, updating, or rewriting anything.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Path to configuration file (default: auto-discover dox.toml).
    #[arg(short, long, env = "DOX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory inside the repository to publish (default: current directory).
    #[arg(long)]
    repo: Option<PathBuf>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error on missing configuration or credentials, or on the
    /// first parse, remote, or file error of the run.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let repo_root = super::resolve_repo_root(self.repo.as_deref())?;
        let config = PublishConfig::load(self.config.as_deref(), &repo_root)?;
        let credentials = Credentials::from_env()?;
        let client = ConfluenceClient::new(&config.uri, &credentials);

        output.info(&format!(
            "Publishing {} to space {}...",
            repo_root.display(),
            config.space
        ));

        let options = PublishOptions {
            dry_run: self.dry_run,
            ..PublishOptions::default()
        };
        let report = Publisher::new(&client, &config, options).publish_repo(&repo_root)?;

        print_report(&output, &report);
        Ok(())
    }
}

fn print_report(output: &Output, report: &PublishReport) {
    if report.dry_run {
        output.heading("\n[DRY RUN] No changes made.");
    }

    for doc in &report.documents {
        output.row(doc.identity.as_deref().unwrap_or("new"), &describe(doc));
    }
    for name in &report.ignored {
        output.row("-", &format!("{name}: ignored"));
    }

    let attachments = report.attachments;
    if attachments.created + attachments.updated + attachments.unchanged > 0 {
        output.info(&format!(
            "\nAttachments: {} created, {} updated, {} unchanged",
            attachments.created, attachments.updated, attachments.unchanged
        ));
    }

    if !report.warnings.is_empty() {
        output.warning(&format!("\nWarnings ({}):", report.warnings.len()));
        for warning in &report.warnings {
            output.warning(&format!("  - {warning}"));
        }
    }

    if !report.dry_run {
        output.success(&format!(
            "\nPublished {} document(s): {} created, {} updated, {} unchanged",
            report.documents.len(),
            report.created(),
            report.updated(),
            report.unchanged()
        ));
    }
}

fn describe(doc: &DocumentReport) -> String {
    let stub = match doc.stub {
        StubOutcome::Existing => "",
        StubOutcome::Created => "created, ",
        StubOutcome::Adopted => "found by title, ",
        StubOutcome::WouldCreate => "would create, ",
    };
    format!("{} \"{}\": {stub}{}", doc.name, doc.title, doc.sync)
}
