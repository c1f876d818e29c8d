use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// Destination for files the user downloads (exports, table dumps).
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes downloads into a directory, creating it on first use.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

// Table names become file names; keep them inside the download directory
fn safe_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.trim_start_matches('.') {
        "" => "download".to_string(),
        name => name.to_string(),
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(safe_file_name(file_name));
        tokio::fs::write(&path, bytes).await?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_into_nested_directory() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path().join("out"));

        let path = sink.save("users.csv", b"id\n1\n").await.unwrap();

        assert_eq!(path, root.path().join("out").join("users.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "id\n1\n");
    }

    #[test]
    fn file_names_cannot_escape_the_directory() {
        assert_eq!(safe_file_name("../etc/passwd.csv"), "_etc_passwd.csv");
        assert_eq!(safe_file_name(".."), "download");
        assert_eq!(safe_file_name("sales 2024.csv"), "sales 2024.csv");
    }
}
