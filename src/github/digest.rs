//! Repository digest: a bounded text summary of a repository for a prompt.
//!
//! Pipeline (strictly sequential except for step 4):
//! 1. parse the reference (no network on failure)
//! 2. fetch metadata, fatal on failure
//! 3. fetch the recursive tree of the default branch, fatal on failure
//! 4. fetch up to `MAX_KEY_FILES` allow-listed files concurrently, failures dropped
//! 5. render header, depth-limited listing, key file contents
//!
//! All caps are fixed so the same repository state always renders the same digest.

use std::collections::HashSet;
use std::fmt;

use futures::future::join_all;

use crate::error::Result;
use crate::github::client::{EntryKind, FileTreeEntry, RepositoryHost, RepositoryMetadata};
use crate::github::reference::RepositoryReference;

/// Base filenames that reveal a project's architecture or stack. Case-sensitive.
pub const KEY_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "vite.config.ts",
    "vite.config.js",
    "next.config.js",
    "next.config.ts",
    "next.config.mjs",
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "Pipfile",
    "Cargo.toml",
    "go.mod",
    "build.gradle",
    "pom.xml",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "Makefile",
    ".env.example",
    "README.md",
];

pub const MAX_KEY_FILES: usize = 10;
pub const MAX_FILE_BYTES: usize = 4000;
/// Paths with at most this many `/` separators are listed verbatim.
pub const MAX_LISTING_DEPTH: usize = 3;
pub const MAX_LISTING_ENTRIES: usize = 200;

const COLLAPSED_MARKER: &str = "/...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFileContent {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct RepositoryDigest {
    pub reference: RepositoryReference,
    pub metadata: RepositoryMetadata,
    pub listing: Vec<String>,
    pub key_files: Vec<KeyFileContent>,
}

/// Builds the digest for `input`, a repository URL or `owner/name` pair.
pub async fn summarize<H: RepositoryHost>(host: &H, input: &str) -> Result<RepositoryDigest> {
    let reference = RepositoryReference::parse(input)?;

    let metadata = host.metadata(&reference).await?;
    let tree = host.tree(&reference, &metadata.default_branch).await?;
    tracing::info!("Fetched tree for {}: {} entries", reference, tree.len());

    let selected = select_key_files(&tree);
    let branch = metadata.default_branch.as_str();
    let fetches = selected.iter().map(|path| {
        let reference = &reference;
        async move { (*path, host.file_content(reference, branch, path).await) }
    });

    let mut key_files = Vec::with_capacity(selected.len());
    for (path, fetched) in join_all(fetches).await {
        match fetched {
            Ok(bytes) => key_files.push(KeyFileContent {
                path: path.to_string(),
                content: truncate_to_budget(&String::from_utf8_lossy(&bytes), MAX_FILE_BYTES)
                    .to_string(),
            }),
            Err(e) => tracing::warn!("Skipping key file {} in {}: {}", path, reference, e),
        }
    }

    let listing = directory_listing(tree.iter().map(|entry| entry.path.as_str()));

    Ok(RepositoryDigest {
        reference,
        metadata,
        listing,
        key_files,
    })
}

/// First `MAX_KEY_FILES` blobs, in tree order, whose base filename is allow-listed.
pub fn select_key_files(tree: &[FileTreeEntry]) -> Vec<&str> {
    tree.iter()
        .filter(|entry| entry.kind == EntryKind::Blob && KEY_FILES.contains(&entry.file_name()))
        .map(|entry| entry.path.as_str())
        .take(MAX_KEY_FILES)
        .collect()
}

/// Sorted, depth-limited listing of `paths`.
///
/// Deeper paths collapse to their first three segments plus `/...`; each
/// collapsed ancestor appears once, at its first sorted position.
pub fn directory_listing<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut sorted: Vec<&str> = paths.into_iter().collect();
    sorted.sort_unstable();

    let mut collapsed_seen = HashSet::new();
    let mut listing = Vec::new();

    for path in sorted {
        if listing.len() == MAX_LISTING_ENTRIES {
            break;
        }
        if path.matches('/').count() <= MAX_LISTING_DEPTH {
            listing.push(path.to_string());
            continue;
        }

        let ancestor = path
            .split('/')
            .take(MAX_LISTING_DEPTH)
            .collect::<Vec<_>>()
            .join("/");
        if collapsed_seen.insert(ancestor.clone()) {
            listing.push(ancestor + COLLAPSED_MARKER);
        }
    }

    listing
}

/// Longest prefix of `text` that fits in `budget` bytes without splitting a character.
pub fn truncate_to_budget(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl fmt::Display for RepositoryDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = if self.metadata.topics.is_empty() {
            "None".to_string()
        } else {
            self.metadata.topics.join(", ")
        };

        writeln!(f, "# GitHub Repository: {}", self.reference)?;
        writeln!(f, "Description: {}", self.metadata.description)?;
        writeln!(f, "Primary Language: {}", self.metadata.language)?;
        writeln!(f, "Topics: {}", topics)?;
        writeln!(f, "Default Branch: {}", self.metadata.default_branch)?;
        writeln!(f)?;
        writeln!(f, "## Directory Structure")?;
        writeln!(f, "```")?;
        for line in &self.listing {
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "```")?;

        if !self.key_files.is_empty() {
            writeln!(f)?;
            write!(f, "## Key Configuration Files")?;
            for file in &self.key_files {
                write!(f, "\n\n### {}\n```\n{}\n```", file.path, file.content)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory repository host with per-path failure injection.
    #[derive(Default)]
    struct FakeHost {
        metadata_status: Option<u16>,
        tree_status: Option<u16>,
        tree: Vec<FileTreeEntry>,
        files: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
        content_calls: AtomicUsize,
    }

    impl FakeHost {
        fn with_tree(paths: &[(&str, EntryKind)]) -> Self {
            Self {
                tree: paths
                    .iter()
                    .map(|(path, kind)| FileTreeEntry {
                        path: path.to_string(),
                        kind: *kind,
                    })
                    .collect(),
                ..Default::default()
            }
        }

        fn file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
            self.files.insert(path.to_string(), content.into());
            self
        }
    }

    impl RepositoryHost for FakeHost {
        async fn metadata(&self, _repo: &RepositoryReference) -> Result<RepositoryMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.metadata_status {
                return Err(AppError::UpstreamUnavailable(format!("status {}", status)));
            }
            Ok(RepositoryMetadata {
                description: "Widgets as a service".to_string(),
                default_branch: "main".to_string(),
                language: "TypeScript".to_string(),
                topics: vec!["widgets".to_string(), "api".to_string()],
            })
        }

        async fn tree(&self, _repo: &RepositoryReference, branch: &str) -> Result<Vec<FileTreeEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(branch, "main");
            if let Some(status) = self.tree_status {
                return Err(AppError::UpstreamUnavailable(format!("status {}", status)));
            }
            Ok(self.tree.clone())
        }

        async fn file_content(
            &self,
            _repo: &RepositoryReference,
            _branch: &str,
            path: &str,
        ) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.content_calls.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| AppError::UpstreamUnavailable(format!("{} returned 404", path)))
        }
    }

    fn blob(path: &str) -> FileTreeEntry {
        FileTreeEntry {
            path: path.to_string(),
            kind: EntryKind::Blob,
        }
    }

    #[tokio::test]
    async fn end_to_end_digest_for_small_repository() {
        let host = FakeHost::with_tree(&[
            ("package.json", EntryKind::Blob),
            ("src/index.ts", EntryKind::Blob),
            ("docs/a/b/c/d.md", EntryKind::Blob),
        ])
        .file("package.json", r#"{"name":"widgets"}"#);

        let digest = summarize(&host, "https://github.com/acme/widgets")
            .await
            .expect("digest");

        assert_eq!(
            digest.listing,
            vec!["docs/a/b/...".to_string(), "package.json".into(), "src/index.ts".into()]
        );
        assert_eq!(digest.key_files.len(), 1);
        assert_eq!(digest.key_files[0].path, "package.json");

        let rendered = digest.to_string();
        assert!(rendered.starts_with("# GitHub Repository: acme/widgets\n"));
        assert!(rendered.contains("Topics: widgets, api\n"));
        assert!(rendered.contains("### package.json\n```\n{\"name\":\"widgets\"}\n```"));
    }

    #[tokio::test]
    async fn deep_paths_collapse_to_single_ancestor() {
        let host = FakeHost::with_tree(&[
            ("package.json", EntryKind::Blob),
            ("src/index.ts", EntryKind::Blob),
            ("docs/a/b/c/d.md", EntryKind::Blob),
            ("docs/a/b/c/e/f.md", EntryKind::Blob),
        ])
        .file("package.json", "{}");

        let digest = summarize(&host, "acme/widgets").await.expect("digest");
        let collapsed: Vec<&String> = digest
            .listing
            .iter()
            .filter(|line| line.starts_with("docs/a/b"))
            .collect();
        assert_eq!(collapsed, vec!["docs/a/b/..."]);
        assert_eq!(digest.to_string().matches("docs/a/b/...").count(), 1);
    }

    #[tokio::test]
    async fn failed_key_file_fetches_are_omitted() {
        let paths: Vec<String> = (0..10).map(|i| format!("svc{}/package.json", i)).collect();
        let mut host = FakeHost::with_tree(&[]);
        host.tree = paths.iter().map(|p| blob(p)).collect();
        for (i, path) in paths.iter().enumerate() {
            // svc0, svc4 and svc8 are left unreachable
            if i % 4 != 0 {
                host = host.file(path, "x".repeat(MAX_FILE_BYTES * 2));
            }
        }

        let digest = summarize(&host, "acme/widgets").await.expect("digest");

        assert_eq!(digest.key_files.len(), 7);
        assert!(digest.key_files.iter().all(|f| f.content.len() == MAX_FILE_BYTES));
        assert!(!digest.key_files.iter().any(|f| f.path == "svc4/package.json"));
    }

    #[tokio::test]
    async fn metadata_failure_is_terminal() {
        let host = FakeHost {
            metadata_status: Some(404),
            ..FakeHost::with_tree(&[("package.json", EntryKind::Blob)])
        };

        let err = summarize(&host, "acme/widgets").await.expect_err("should fail");
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tree_failure_is_terminal() {
        let host = FakeHost {
            tree_status: Some(409),
            ..FakeHost::with_tree(&[("package.json", EntryKind::Blob)])
        }
        .file("package.json", "{}");

        let err = summarize(&host, "acme/widgets").await.expect_err("should fail");
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(host.calls.load(Ordering::SeqCst), 2);
        assert_eq!(host.content_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_reference_makes_no_host_calls() {
        let host = FakeHost::default();
        let err = summarize(&host, "not a url").await.expect_err("should fail");
        assert!(matches!(err, AppError::InvalidReference(_)));
        assert_eq!(host.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn selection_is_case_sensitive_at_any_depth() {
        let tree = vec![
            blob("README.md"),
            blob("packages/core/docs/README.md"),
            blob("readme.md"),
            blob("docs/Readme.md"),
            FileTreeEntry {
                path: "Dockerfile".to_string(),
                kind: EntryKind::Tree,
            },
            blob("src/main.rs"),
        ];
        assert_eq!(
            select_key_files(&tree),
            vec!["README.md", "packages/core/docs/README.md"]
        );
    }

    #[test]
    fn selection_is_capped_in_tree_order() {
        let tree: Vec<FileTreeEntry> = (0..15).map(|i| blob(&format!("p{:02}/Cargo.toml", i))).collect();
        let selected = select_key_files(&tree);
        assert_eq!(selected.len(), MAX_KEY_FILES);
        assert_eq!(selected[0], "p00/Cargo.toml");
        assert_eq!(selected[9], "p09/Cargo.toml");
    }

    #[test]
    fn listing_caps_huge_deep_trees() {
        let paths: Vec<String> = (0..10_000)
            .map(|i| format!("a{}/b{}/c{}/d/e.rs", i % 50, i % 7, i))
            .collect();
        let listing = directory_listing(paths.iter().map(String::as_str));

        assert_eq!(listing.len(), MAX_LISTING_ENTRIES);
        let unique: HashSet<&String> = listing.iter().collect();
        assert_eq!(unique.len(), listing.len());
        assert!(listing.iter().all(|line| line.ends_with("/...") && line.matches('/').count() == 3));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_to_budget("héllo", 2), "h");
        assert_eq!(truncate_to_budget("héllo", 3), "hé");
        assert_eq!(truncate_to_budget("short", 4000), "short");
    }

    proptest! {
        #[test]
        fn listing_never_exceeds_cap(paths in prop::collection::vec("[a-c]{1,2}(/[a-c]{1,2}){0,6}", 0..600)) {
            let listing = directory_listing(paths.iter().map(String::as_str));
            prop_assert!(listing.len() <= MAX_LISTING_ENTRIES);
            let collapsed: Vec<&String> = listing.iter().filter(|l| l.ends_with(COLLAPSED_MARKER)).collect();
            let unique: HashSet<&&String> = collapsed.iter().collect();
            prop_assert_eq!(unique.len(), collapsed.len());
        }
    }
}
