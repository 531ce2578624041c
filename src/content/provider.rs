//! File providers
//!
//! Maps a request subpath to a file on disk. A `PhysicalDirectory` serves one
//! root; a `ProviderChain` asks its members in order and the first hit wins.

use crate::logger;
use hyper::body::Bytes;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// A file matched by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub physical_path: PathBuf,
    pub length: u64,
    pub last_modified: SystemTime,
}

impl FileInfo {
    /// File name as it appears on disk
    pub fn name(&self) -> &str {
        self.physical_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Read the whole file
    pub async fn read(&self) -> std::io::Result<Bytes> {
        tokio::fs::read(&self.physical_path).await.map(Bytes::from)
    }
}

/// Resolves relative request paths to files
pub trait FileProvider: Send + Sync + fmt::Debug {
    /// Look up `subpath`; `None` means the provider has no such file
    fn file_info(&self, subpath: &str) -> Option<FileInfo>;

    /// Members of a composite provider, used to splice instead of nest
    fn as_chain(&self) -> Option<&ProviderChain> {
        None
    }
}

/// Files under a single directory
#[derive(Debug, Clone)]
pub struct PhysicalDirectory {
    root: PathBuf,
}

impl PhysicalDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileProvider for PhysicalDirectory {
    fn file_info(&self, subpath: &str) -> Option<FileInfo> {
        let relative = sanitize_subpath(subpath)?;
        if relative.as_os_str().is_empty() {
            return None;
        }

        // Missing roots are common (a bundle that was never built), stay quiet
        let root = self.root.canonicalize().ok()?;
        let candidate = root.join(&relative).canonicalize().ok()?;

        // Security: a symlink may still point outside the root
        if !candidate.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {subpath} -> {}",
                candidate.display()
            ));
            return None;
        }

        let metadata = std::fs::metadata(&candidate).ok()?;
        if !metadata.is_file() {
            return None;
        }

        Some(FileInfo {
            length: metadata.len(),
            last_modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            physical_path: candidate,
        })
    }
}

/// Strip leading slashes and refuse anything that could climb out of a root
fn sanitize_subpath(subpath: &str) -> Option<PathBuf> {
    let trimmed = subpath.trim_start_matches('/');
    let mut clean = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                logger::log_warning(&format!("Path traversal attempt blocked: {subpath}"));
                return None;
            }
        }
    }
    Some(clean)
}

/// Ordered list of providers; earlier members win on name collision
///
/// The list is always flat: pushing a chain splices its members in place.
#[derive(Debug, Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn FileProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider, flattening it if it is itself a chain
    pub fn push(&mut self, provider: Arc<dyn FileProvider>) {
        if let Some(chain) = provider.as_chain() {
            self.providers.extend(chain.providers.iter().cloned());
            return;
        }
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Arc<dyn FileProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FromIterator<Arc<dyn FileProvider>> for ProviderChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn FileProvider>>>(iter: I) -> Self {
        let mut chain = Self::new();
        for provider in iter {
            chain.push(provider);
        }
        chain
    }
}

impl FileProvider for ProviderChain {
    fn file_info(&self, subpath: &str) -> Option<FileInfo> {
        self.providers.iter().find_map(|p| p.file_info(subpath))
    }

    fn as_chain(&self) -> Option<&ProviderChain> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, body).unwrap();
        }
        dir
    }

    fn leaf(dir: &TempDir) -> Arc<dyn FileProvider> {
        Arc::new(PhysicalDirectory::new(dir.path()))
    }

    fn source_of(chain: &ProviderChain, subpath: &str) -> Option<PathBuf> {
        chain.file_info(subpath).map(|f| f.physical_path)
    }

    #[test]
    fn test_directory_lookup() {
        let dir = dir_with(&[("app.js", "js"), ("css/site.css", "body{}")]);
        let provider = PhysicalDirectory::new(dir.path());

        let info = provider.file_info("/app.js").unwrap();
        assert_eq!(info.length, 2);
        assert_eq!(info.name(), "app.js");
        assert!(provider.file_info("css/site.css").is_some());
        assert!(provider.file_info("./css/./site.css").is_some());
        assert!(provider.file_info("missing.js").is_none());
    }

    #[test]
    fn test_directories_and_empty_paths_do_not_match() {
        let dir = dir_with(&[("css/site.css", "")]);
        let provider = PhysicalDirectory::new(dir.path());
        assert!(provider.file_info("css").is_none());
        assert!(provider.file_info("/").is_none());
        assert!(provider.file_info("").is_none());
    }

    #[test]
    fn test_missing_root() {
        let provider = PhysicalDirectory::new("/definitely/not/a/real/root");
        assert!(provider.file_info("index.html").is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let outer = dir_with(&[("secret.txt", "secret"), ("public/app.js", "")]);
        let provider = PhysicalDirectory::new(outer.path().join("public"));

        assert!(provider.file_info("../secret.txt").is_none());
        assert!(provider.file_info("/../secret.txt").is_none());
        assert!(provider.file_info("a/../../secret.txt").is_none());
        assert!(provider.file_info("app.js").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outer = dir_with(&[("secret.txt", "secret"), ("public/app.js", "")]);
        std::os::unix::fs::symlink(
            outer.path().join("secret.txt"),
            outer.path().join("public/link.txt"),
        )
        .unwrap();
        let provider = PhysicalDirectory::new(outer.path().join("public"));
        assert!(provider.file_info("link.txt").is_none());
    }

    #[test]
    fn test_chain_first_match_wins() {
        let first = dir_with(&[("app.js", "first")]);
        let second = dir_with(&[("app.js", "second"), ("only-second.js", "")]);
        let chain: ProviderChain = [leaf(&first), leaf(&second)].into_iter().collect();

        let winner = source_of(&chain, "app.js").unwrap();
        assert!(winner.starts_with(first.path().canonicalize().unwrap()));
        let fallthrough = source_of(&chain, "only-second.js").unwrap();
        assert!(fallthrough.starts_with(second.path().canonicalize().unwrap()));
        assert!(chain.file_info("nowhere.js").is_none());

        // Same chain, same answer
        assert_eq!(source_of(&chain, "app.js"), Some(winner));
    }

    #[test]
    fn test_traversal_not_bypassed_by_chain() {
        let outer = dir_with(&[("secret.txt", ""), ("a/x", ""), ("b/y", "")]);
        let chain: ProviderChain = [
            Arc::new(PhysicalDirectory::new(outer.path().join("a"))) as Arc<dyn FileProvider>,
            Arc::new(PhysicalDirectory::new(outer.path().join("b"))),
        ]
        .into_iter()
        .collect();
        assert!(chain.file_info("../secret.txt").is_none());
    }

    #[test]
    fn test_nested_chain_is_flattened() {
        let a = dir_with(&[("shared.js", "a")]);
        let b = dir_with(&[("shared.js", "b"), ("b.js", "")]);
        let c = dir_with(&[("shared.js", "c"), ("c.js", "")]);

        let inner: ProviderChain = [leaf(&b), leaf(&c)].into_iter().collect();
        let mut nested = ProviderChain::new();
        nested.push(leaf(&a));
        nested.push(Arc::new(inner));

        let inlined: ProviderChain = [leaf(&a), leaf(&b), leaf(&c)].into_iter().collect();

        assert_eq!(nested.len(), 3);
        assert!(nested.providers().iter().all(|p| p.as_chain().is_none()));
        for path in ["shared.js", "b.js", "c.js", "none.js"] {
            assert_eq!(source_of(&nested, path), source_of(&inlined, path));
        }
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = dir_with(&[("hello.txt", "hello world")]);
        let info = PhysicalDirectory::new(dir.path())
            .file_info("hello.txt")
            .unwrap();
        assert_eq!(info.read().await.unwrap(), Bytes::from("hello world"));
    }
}
