use std::path::{Path, PathBuf};

use crate::errors::AwdError;

const IP_LIST_FILE: &str = "ip.txt";
const LOG_FILE: &str = "log.txt";

/// Resolves per-subject resource bundles under a root directory.
///
/// Each subject owns `<root>/<name>/` holding its target list and an
/// append-only attack log. The bundle is read-only to the engine apart from
/// the log file.
#[derive(Debug, Clone)]
pub struct SubjectStore {
    root: PathBuf,
}

impl SubjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn log_path(&self, name: &str) -> PathBuf {
        self.dir(name).join(LOG_FILE)
    }

    /// Target IPs for `name`, one per line, blank lines ignored. A missing
    /// list means no work, not an error.
    pub async fn read_ip_list(&self, name: &str) -> Result<Vec<String>, AwdError> {
        let path = self.dir(name).join(IP_LIST_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Full contents of the subject's attack log, empty if none was
    /// written yet.
    pub async fn read_log(&self, name: &str) -> Result<String, AwdError> {
        let path = self.log_path(name);
        if !path.exists() {
            return Ok(String::new());
        }
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_ip_list_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let subjects = SubjectStore::new(dir.path());
        let ips = subjects.read_ip_list("web").await.unwrap();
        assert!(ips.is_empty());
    }

    #[tokio::test]
    async fn test_read_ip_list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let subject_dir = dir.path().join("web");
        std::fs::create_dir_all(&subject_dir).unwrap();
        std::fs::write(subject_dir.join("ip.txt"), "10.0.0.1\n\n  10.0.0.2  \n\n").unwrap();

        let subjects = SubjectStore::new(dir.path());
        let ips = subjects.read_ip_list("web").await.unwrap();
        assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn test_read_log_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let subjects = SubjectStore::new(dir.path());
        assert_eq!(subjects.read_log("web").await.unwrap(), "");
    }
}
