use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::cli::{StoreListArgs, StoreShowArgs};
use crate::formats::StoredDocument;
use crate::output::emit;
use crate::render;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, document: &StoredDocument) -> anyhow::Result<()>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<StoredDocument>>;
    async fn list(&self) -> anyhow::Result<Vec<StoredDocument>>;
}

/// One JSON file per document under `<base_dir>/documents/`.
#[derive(Debug, Clone)]
pub struct LocalFsDocumentStore {
    base_dir: PathBuf,
}

impl LocalFsDocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn documents_dir(&self) -> PathBuf {
        self.base_dir.join("documents")
    }

    fn document_path(&self, id: Uuid) -> PathBuf {
        self.documents_dir().join(format!("{id}.json"))
    }
}

#[async_trait]
impl DocumentStore for LocalFsDocumentStore {
    async fn put(&self, document: &StoredDocument) -> anyhow::Result<()> {
        let path = self.document_path(document.id);
        write_json_atomic(&path, document)
            .await
            .with_context(|| format!("write document: {}", path.display()))
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<StoredDocument>> {
        let path = self.document_path(id);
        read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))
    }

    async fn list(&self) -> anyhow::Result<Vec<StoredDocument>> {
        let dir = self.documents_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("read documents dir: {}", dir.display()));
            }
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("read documents dir: {}", dir.display()))?
        {
            let path = entry.path();
            let is_document = path.extension().and_then(|e| e.to_str()) == Some("json")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| Uuid::parse_str(s).is_ok());
            if !is_document {
                continue;
            }

            if let Some(document) = read_json::<StoredDocument>(&path)
                .await
                .with_context(|| format!("read: {}", path.display()))?
            {
                documents.push(document);
            }
        }

        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(documents)
    }
}

pub async fn list(args: StoreListArgs) -> anyhow::Result<()> {
    let store = LocalFsDocumentStore::new(&args.dir);
    let documents = store.list().await.context("list documents")?;
    tracing::debug!(dir = %args.dir, count = documents.len(), "listed documents");

    let mut out = String::new();
    for stored in &documents {
        out.push_str(&list_line(stored));
        out.push('\n');
    }
    emit(None, &out, false)
}

pub async fn show(args: StoreShowArgs) -> anyhow::Result<()> {
    let id = Uuid::parse_str(args.id.trim())
        .with_context(|| format!("parse document id: {}", args.id))?;
    let store = LocalFsDocumentStore::new(&args.dir);
    let Some(stored) = store.get(id).await? else {
        anyhow::bail!("document not found: {id}");
    };

    let json = render::to_json(&stored.document)?;
    emit(None, &json, false)
}

fn list_line(stored: &StoredDocument) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        stored.id,
        stored.created_at.to_rfc3339(),
        stored.document.metadata.content_type,
        stored.document.title
    )
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::formats::GenerationRequest;
    use crate::structure::structure;

    fn stored(content: &str, offset_secs: i64) -> StoredDocument {
        StoredDocument {
            id: Uuid::new_v4(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            request: GenerationRequest {
                url: "https://example.com/".to_owned(),
                content_type: "technical".to_owned(),
                tone: "neutral".to_owned(),
                engine: "noop".to_owned(),
            },
            document: structure(content, "technical"),
        }
    }

    #[tokio::test]
    async fn put_get_and_list_in_creation_order() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let store = LocalFsDocumentStore::new(temp.path());

        let later = stored("# Later\n\nBody text.", 10);
        let earlier = stored("# Earlier\n\nBody text.", 0);
        store.put(&later).await?;
        store.put(&earlier).await?;
        std::fs::write(temp.path().join("documents").join("notes.txt"), "ignored")?;

        let fetched = store
            .get(later.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("document not found"))?;
        assert_eq!(fetched.document, later.document);

        let listed = store.list().await?;
        let titles = listed
            .iter()
            .map(|d| d.document.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Earlier", "Later"]);
        Ok(())
    }

    #[test]
    fn list_line_is_tab_separated() {
        let document = stored("# Report\n\nBody text.", 0);
        let line = list_line(&document);
        let fields = line.split('\t').collect::<Vec<_>>();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], document.id.to_string());
        assert_eq!(fields[2], "technical");
        assert_eq!(fields[3], "Report");
    }

    #[tokio::test]
    async fn missing_store_is_empty() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let store = LocalFsDocumentStore::new(temp.path().join("nowhere"));
        assert!(store.list().await?.is_empty());
        assert!(store.get(Uuid::new_v4()).await?.is_none());
        Ok(())
    }
}
