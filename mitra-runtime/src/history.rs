use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use mitra_core::record::{InteractionRecord, RecordKind};
use mitra_engine::traits::RecordSink;

/// Local interaction log, newest last, capped at `max_entries`.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            max_entries: 200,
        }
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        self
    }

    pub fn load(&self) -> anyhow::Result<Vec<InteractionRecord>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read history: {}", self.path.display()))?;
        let entries: Vec<InteractionRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse history: {}", self.path.display()))?;
        Ok(entries)
    }

    pub fn load_kind(&self, kind: RecordKind) -> anyhow::Result<Vec<InteractionRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.kind == kind)
            .collect())
    }

    pub fn append(&self, entry: InteractionRecord) -> anyhow::Result<()> {
        let mut entries = self.load()?;
        entries.push(entry);
        if entries.len() > self.max_entries {
            let start = entries.len() - self.max_entries;
            entries = entries.split_off(start);
        }

        let json = serde_json::to_string_pretty(&entries)?;
        crate::fs_util::write_replacing(&self.path, json.as_bytes())
            .with_context(|| format!("failed to replace history: {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove history: {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RecordSink for HistoryStore {
    async fn append(&self, record: &InteractionRecord) -> anyhow::Result<()> {
        let store = self.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || HistoryStore::append(&store, record))
            .await
            .context("history writer task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_core::language::Language;

    fn record(kind: RecordKind, ts: i64, input: &str) -> InteractionRecord {
        InteractionRecord::new(kind, ts, Language::English, input)
    }

    #[test]
    fn appends_and_limits_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at_path(dir.path().join("history.json")).with_max_entries(2);

        store.append(record(RecordKind::VoiceInteraction, 1, "a")).unwrap();
        store.append(record(RecordKind::VoiceInteraction, 2, "b")).unwrap();
        store.append(record(RecordKind::MarketQuery, 3, "c")).unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].input, "b");
        assert_eq!(entries[1].input, "c");
        assert_eq!(store.load_kind(RecordKind::MarketQuery).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn works_as_record_sink() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at_path(dir.path().join("history.json"));
        let sink: &dyn RecordSink = &store;

        sink.append(&record(RecordKind::Diagnosis, 5, "leaf.jpg").with_error("File too large"))
            .await
            .unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].error.as_deref(), Some("File too large"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
