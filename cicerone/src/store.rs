use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// Durable per-persona storage for the recommendation session token, so a
/// conversation can continue across process restarts.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self, persona_id: &str) -> Result<Option<String>>;
    async fn save(&self, persona_id: &str, token: &str) -> Result<()>;
    async fn delete(&self, persona_id: &str) -> Result<()>;
}

/// Filesystem store: one `chat_id_<persona>.txt` file per persona under a
/// state directory.
#[derive(Debug, Clone)]
pub struct FsTokenStore {
    dir: PathBuf,
}

impl FsTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self, persona_id: &str) -> PathBuf {
        self.dir.join(format!("chat_id_{persona_id}.txt"))
    }
}

#[async_trait]
impl TokenStore for FsTokenStore {
    async fn load(&self, persona_id: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.token_path(persona_id)).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, persona_id: &str, token: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.token_path(persona_id), token).await?;
        Ok(())
    }

    async fn delete(&self, persona_id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.token_path(persona_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTokenStore::new(dir.path());

        assert_eq!(store.load("ava").await.unwrap(), None);

        store.save("ava", "chat-token-1").await.unwrap();
        assert_eq!(
            store.load("ava").await.unwrap(),
            Some("chat-token-1".to_string())
        );

        // Tokens are keyed by persona
        assert_eq!(store.load("pete").await.unwrap(), None);

        store.delete("ava").await.unwrap();
        assert_eq!(store.load("ava").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTokenStore::new(dir.path());
        store.delete("nobody").await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTokenStore::new(dir.path());
        store.save("ava", "  \n").await.unwrap();
        assert_eq!(store.load("ava").await.unwrap(), None);
    }
}
