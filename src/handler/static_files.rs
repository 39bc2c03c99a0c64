//! Static file serving module
//!
//! Fallback for requests no route matched: files are looked up under a root
//! directory, with index file support for directories.

use crate::http::Response;
use crate::logger;
use crate::routing::{BoxFuture, StaticFileServer};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files served from a directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index_files: Vec<String>,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
        }
    }

    #[must_use]
    pub fn with_index_files(mut self, index_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` to a file under the root
    ///
    /// Directories resolve to their first existing index file. Anything that
    /// escapes the root once canonicalized is refused.
    pub async fn locate(&self, path: &str) -> Option<PathBuf> {
        let relative = path.trim_start_matches('/');

        let root_canonical = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Static directory not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return None;
            }
        };

        let mut file_path = self.root.join(relative);
        if relative.is_empty() || relative.ends_with('/') || is_dir(&file_path).await {
            for index_file in &self.index_files {
                let index_path = file_path.join(index_file);
                if is_file(&index_path).await {
                    file_path = index_path;
                    break;
                }
            }
        }

        // Missing files are the common case, no need to log
        let file_canonical = fs::canonicalize(&file_path).await.ok()?;
        if !file_canonical.starts_with(&root_canonical) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                file_canonical.display()
            ));
            return None;
        }

        is_file(&file_canonical).await.then_some(file_canonical)
    }
}

impl StaticFileServer for StaticFiles {
    fn try_serve<'a>(&'a self, path: &'a str, response: &'a mut Response) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let Some(file) = self.locate(path).await else {
                return false;
            };
            let served = response.send_file(&file).await;
            if !served {
                logger::log_error(&format!("Failed to read file '{}'", file.display()));
            }
            served
        })
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public/docs")).unwrap();
        std::fs::write(dir.path().join("public/index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("public/script.js"), "console.log(1)").unwrap();
        std::fs::write(dir.path().join("public/docs/index.htm"), "docs").unwrap();
        std::fs::write(dir.path().join("secret.txt"), "nope").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_serves_file_with_content_type() {
        let dir = site();
        let files = StaticFiles::new(dir.path().join("public"));
        let mut res = Response::new();

        assert!(files.try_serve("/script.js", &mut res).await);
        assert_eq!(res.text(), Some("console.log(1)"));
        assert_eq!(res.header("content-type"), Some("text/javascript; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_directory_uses_index_files() {
        let dir = site();
        let files = StaticFiles::new(dir.path().join("public"));

        let mut root = Response::new();
        assert!(files.try_serve("/", &mut root).await);
        assert_eq!(root.text(), Some("<h1>home</h1>"));

        let mut docs = Response::new();
        assert!(files.try_serve("/docs", &mut docs).await);
        assert_eq!(docs.text(), Some("docs"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = site();
        let files = StaticFiles::new(dir.path().join("public"));
        let mut res = Response::new();

        assert!(!files.try_serve("/missing.css", &mut res).await);
        assert!(!res.is_sent());
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let dir = site();
        let files = StaticFiles::new(dir.path().join("public"));
        let mut res = Response::new();

        assert!(!files.try_serve("/../secret.txt", &mut res).await);
        assert!(!res.is_sent());
    }

    #[tokio::test]
    async fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let files = StaticFiles::new(dir.path().join("absent"));
        assert!(files.locate("/index.html").await.is_none());
    }
}
