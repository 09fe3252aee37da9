//! The set of documents taking part in one publish run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dox_config::PublishConfig;
use dox_source::{ParseOptions, Source};

use crate::error::PublishError;

/// Title used for the synthesized root when nothing better is known.
const FALLBACK_ROOT_TITLE: &str = "Documentation";

/// How to synthesize the root page when the tree has no `ROOT.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRootSettings {
    pub title: String,
    /// Existing page to use as the root.
    pub identity: Option<String>,
}

impl DefaultRootSettings {
    /// `root_title` / `root_id` from config; the title defaults to the
    /// repository directory name.
    pub fn from_config(config: &PublishConfig, repo_root: &Path) -> Self {
        let title = config.root_title.clone().unwrap_or_else(|| {
            repo_root
                .file_name()
                .map_or_else(|| FALLBACK_ROOT_TITLE.to_owned(), |n| n.to_string_lossy().into_owned())
        });
        Self {
            title,
            identity: config.root_id.clone(),
        }
    }
}

/// Parsed documents plus the resolved root.
///
/// Ignored documents stay in the set so links to them can be recognized,
/// but [`publish_order`](Self::publish_order) never yields them.
#[derive(Debug)]
pub struct DocumentSet {
    repo_root: PathBuf,
    sources: Vec<Source>,
    by_path: HashMap<PathBuf, usize>,
    root: usize,
}

impl DocumentSet {
    /// Parse every path and resolve the root document.
    ///
    /// # Errors
    ///
    /// Any parse error aborts loading. More than one non-ignored `ROOT.md`
    /// is [`PublishError::MultipleRoots`].
    pub fn load(
        repo_root: &Path,
        paths: &[PathBuf],
        options: ParseOptions,
        default_root: &DefaultRootSettings,
    ) -> Result<Self, PublishError> {
        let repo_root = repo_root
            .canonicalize()
            .map_err(|e| PublishError::io(repo_root, e))?;

        let mut sources = Vec::with_capacity(paths.len() + 1);
        let mut by_path = HashMap::with_capacity(paths.len());
        for path in paths {
            let source = Source::open(path, options)?;
            let canonical = path.canonicalize().map_err(|e| PublishError::io(path, e))?;
            by_path.insert(canonical, sources.len());
            sources.push(source);
        }

        let roots: Vec<usize> = sources
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_root() && !s.is_ignored())
            .map(|(i, _)| i)
            .collect();

        let root = match roots.as_slice() {
            [] => {
                tracing::info!(title = %default_root.title, "No root document found, using default root");
                sources.push(Source::default_root(
                    default_root.title.clone(),
                    default_root.identity.clone(),
                ));
                sources.len() - 1
            }
            [single] => *single,
            many => {
                let paths = many
                    .iter()
                    .filter_map(|&i| sources[i].path().map(Path::to_path_buf))
                    .collect();
                return Err(PublishError::MultipleRoots(paths));
            }
        };

        Ok(Self {
            repo_root,
            sources,
            by_path,
            root,
        })
    }

    /// Canonical repository root.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> &Source {
        &self.sources[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Source {
        &mut self.sources[index]
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    pub fn root(&self) -> &Source {
        &self.sources[self.root]
    }

    /// Document loaded from `canonical`, if any.
    pub fn by_canonical_path(&self, canonical: &Path) -> Option<&Source> {
        self.by_path.get(canonical).map(|&i| &self.sources[i])
    }

    /// Indices of publishable documents: the root, then the rest by path.
    pub fn publish_order(&self) -> Vec<usize> {
        let mut order = vec![self.root];
        order.extend(
            (0..self.sources.len()).filter(|&i| i != self.root && !self.sources[i].is_ignored()),
        );
        order
    }

    /// Ignored documents.
    pub fn ignored(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(|s| s.is_ignored())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn settings() -> DefaultRootSettings {
        DefaultRootSettings {
            title: "Handbook".to_owned(),
            identity: None,
        }
    }

    fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_uses_root_file() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write(dir.path(), "ROOT.md", "# Home\n"),
            write(dir.path(), "guide.md", "# Guide\n"),
        ];

        let docs = DocumentSet::load(dir.path(), &paths, ParseOptions::default(), &settings()).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs.root().title(), "Home");
        assert_eq!(docs.publish_order(), vec![0, 1]);
    }

    #[test]
    fn test_load_synthesizes_default_root() {
        let dir = TempDir::new().unwrap();
        let paths = vec![write(dir.path(), "guide.md", "# Guide\n")];
        let settings = DefaultRootSettings {
            title: "Handbook".to_owned(),
            identity: Some("500".to_owned()),
        };

        let docs = DocumentSet::load(dir.path(), &paths, ParseOptions::default(), &settings).unwrap();

        assert_eq!(docs.len(), 2);
        assert!(matches!(docs.root(), Source::DefaultRoot(_)));
        assert_eq!(docs.root().identity(), Some("500"));
        assert_eq!(docs.publish_order(), vec![1, 0]);
    }

    #[test]
    fn test_load_rejects_multiple_roots() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write(dir.path(), "ROOT.md", "# Home\n"),
            write(dir.path(), "team/ROOT.md", "# Team home\n"),
        ];

        let err = DocumentSet::load(dir.path(), &paths, ParseOptions::default(), &settings())
            .unwrap_err();

        let PublishError::MultipleRoots(roots) = &err else {
            panic!("expected MultipleRoots, got {err:?}");
        };
        assert_eq!(roots, &paths);
        assert!(err.to_string().contains("team/ROOT.md"));
    }

    #[test]
    fn test_ignored_root_file_does_not_count() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write(dir.path(), "ROOT.md", "# Home\n"),
            write(dir.path(), "old/ROOT.md", "<!-- dox: ignore -->\n# Old home\n"),
        ];

        let docs = DocumentSet::load(dir.path(), &paths, ParseOptions::default(), &settings()).unwrap();

        assert_eq!(docs.root().title(), "Home");
        assert_eq!(docs.publish_order(), vec![0]);
        assert_eq!(docs.ignored().count(), 1);
    }

    #[test]
    fn test_lookup_by_canonical_path() {
        let dir = TempDir::new().unwrap();
        let guide = write(dir.path(), "docs/guide.md", "<!-- dox: 9 -->\n# Guide\n");

        let docs = DocumentSet::load(
            dir.path(),
            std::slice::from_ref(&guide),
            ParseOptions::default(),
            &settings(),
        )
        .unwrap();

        let via_dots = dir.path().join("docs/../docs/guide.md").canonicalize().unwrap();
        assert_eq!(docs.by_canonical_path(&via_dots).unwrap().identity(), Some("9"));
    }

    #[test]
    fn test_default_root_settings_from_config() {
        let config = PublishConfig::from_toml(
            "uri = \"https://wiki.example.com\"\nspace = \"ENG\"\nbrowse_url_base = \"https://git.example.com/%s\"\n",
        )
        .unwrap();

        let settings = DefaultRootSettings::from_config(&config, Path::new("/src/platform-docs"));

        assert_eq!(settings.title, "platform-docs");
        assert_eq!(settings.identity, None);
    }
}
