//! Rewriting of relative links between documents.

use std::collections::HashSet;
use std::path::{Component, Path};

use dox_confluence::view_page_url;
use dox_source::{ParseOptions, Source};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::documents::DocumentSet;
use crate::error::PublishError;
use crate::markup::{self, Reference};
use crate::report::PublishReport;

/// Placeholder in `browse_url_base` replaced by the repository-relative path.
pub const PATH_PLACEHOLDER: &str = "%s";

/// Characters escaped in a browse URL path.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// URL browsing `path` in version control.
///
/// `browse_url_base` either contains `%s`, which is replaced by the path
/// relative to `repo_root`, or the path is appended after a `/`.
pub fn browse_url(browse_url_base: &str, repo_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(repo_root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => {
                Some(utf8_percent_encode(&s.to_string_lossy(), PATH_ENCODE_SET).to_string())
            }
            _ => None,
        })
        .collect();
    let relative = segments.join("/");

    if browse_url_base.contains(PATH_PLACEHOLDER) {
        browse_url_base.replacen(PATH_PLACEHOLDER, &relative, 1)
    } else if browse_url_base.ends_with('/') {
        format!("{browse_url_base}{relative}")
    } else {
        format!("{browse_url_base}/{relative}")
    }
}

/// Inputs shared by every link rewrite in one run.
pub(crate) struct LinkContext<'a> {
    pub documents: &'a DocumentSet,
    pub browse_url_base: &'a str,
    pub base_url: &'a str,
    pub parse_options: ParseOptions,
}

/// Where a resolved link should point.
enum LinkTarget {
    Page(String),
    Browse,
    Unassigned,
}

/// Rewrite local `href`s in `markup` rendered from `source_path`.
///
/// Managed documents become view-page URLs; anything else that exists
/// locally (ignored documents, non-document files, directories) becomes a
/// browse URL. Missing targets are reported and left alone.
pub(crate) fn rewrite_links(
    markup: &str,
    source_path: &Path,
    ctx: &LinkContext<'_>,
    report: &mut PublishReport,
) -> Result<String, PublishError> {
    let references = markup::link_targets(markup).map_err(|source| PublishError::Markup {
        path: source_path.to_path_buf(),
        source,
    })?;
    let source_dir = source_path.parent().unwrap_or(Path::new(""));

    let mut seen = HashSet::new();
    let mut out = markup.to_owned();
    for reference in references {
        if markup::is_absolute(&reference.value) || !seen.insert(reference.raw.clone()) {
            continue;
        }

        let target = source_dir.join(reference.path_part());
        let Ok(canonical) = target.canonicalize() else {
            report.warn(format!(
                "{}: link target not found: {}",
                source_path.display(),
                target.display()
            ));
            continue;
        };

        let replacement = match resolve(&canonical, ctx) {
            LinkTarget::Page(identity) => view_page_url(ctx.base_url, &identity),
            LinkTarget::Browse => {
                browse_url(ctx.browse_url_base, ctx.documents.repo_root(), &canonical)
            }
            LinkTarget::Unassigned => {
                report.warn(format!(
                    "{}: link target {} has no page yet; left unchanged",
                    source_path.display(),
                    canonical.display()
                ));
                continue;
            }
        };
        out = replace_href(&out, &reference, &replacement);
    }
    Ok(out)
}

fn replace_href(markup: &str, reference: &Reference, replacement: &str) -> String {
    markup::replace_attribute(markup, "href", &reference.raw, replacement)
}

/// Documents loaded this run first, then the file itself.
fn resolve(canonical: &Path, ctx: &LinkContext<'_>) -> LinkTarget {
    if let Some(source) = ctx.documents.by_canonical_path(canonical) {
        return classify(source);
    }

    match Source::open(canonical, ctx.parse_options) {
        Ok(source) => classify(&source),
        Err(e) => {
            tracing::debug!(
                path = %canonical.display(),
                error = %e,
                "Link target is not a source document"
            );
            LinkTarget::Browse
        }
    }
}

fn classify(source: &Source) -> LinkTarget {
    if source.is_ignored() {
        return LinkTarget::Browse;
    }
    match source.identity() {
        Some(identity) => LinkTarget::Page(identity.to_owned()),
        None => LinkTarget::Unassigned,
    }
}
