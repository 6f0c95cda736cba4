use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use issueboard_common::{FilterPatchBody, RawIssueFilters, ScopeKind};

use super::LocalFilterShim;

/// Local filter storage backed by a single JSON document.
///
/// Every scope lives under a `"{store}:{workspace}:{project}:{view}"` key.
/// `set` merges one section into the stored record and rewrites the file;
/// the other sections are left as they were.
pub struct JsonFileFilterShim {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

type LocalDocument = BTreeMap<String, RawIssueFilters>;

impl JsonFileFilterShim {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage_key(
        store: ScopeKind,
        workspace: &str,
        project: Option<&str>,
        view: &str,
    ) -> String {
        format!(
            "{}:{}:{}:{}",
            store.as_str(),
            workspace,
            project.unwrap_or(""),
            view
        )
    }

    fn read_document(&self) -> Result<LocalDocument> {
        if !self.path.exists() {
            return Ok(LocalDocument::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read local filters: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(LocalDocument::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse local filters: {}", self.path.display()))
    }

    fn write_document(&self, document: &LocalDocument) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create local filters directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(document)
            .context("Failed to serialize local filters")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write local filters: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace local filters: {}", self.path.display()))?;
        Ok(())
    }
}

impl LocalFilterShim for JsonFileFilterShim {
    fn get(
        &self,
        store: ScopeKind,
        workspace: &str,
        project: Option<&str>,
        view: &str,
    ) -> Result<RawIssueFilters> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| anyhow::anyhow!("Local filter lock poisoned: {}", e))?;
        let mut document = self.read_document()?;
        let key = Self::storage_key(store, workspace, project, view);
        Ok(document.remove(&key).unwrap_or_default())
    }

    fn set(
        &self,
        store: ScopeKind,
        workspace: &str,
        project: Option<&str>,
        view: &str,
        body: &FilterPatchBody,
    ) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| anyhow::anyhow!("Local filter lock poisoned: {}", e))?;
        let mut document = self.read_document()?;
        let entry = document
            .entry(Self::storage_key(store, workspace, project, view))
            .or_default();
        match body {
            FilterPatchBody::Filters(filters) => {
                entry.filters =
                    Some(serde_json::to_value(filters).context("Failed to encode filters")?);
            }
            FilterPatchBody::DisplayFilters(display) => {
                entry.display_filters = Some(
                    serde_json::to_value(display).context("Failed to encode display filters")?,
                );
            }
            FilterPatchBody::DisplayProperties(properties) => {
                entry.display_properties = Some(
                    serde_json::to_value(properties)
                        .context("Failed to encode display properties")?,
                );
            }
        }
        self.write_document(&document)
    }
}
