//! Case file and configuration loading.
//!
//! The case file is a JSON array of cases. A missing file reads as empty so
//! that `open` can start a new one.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use caseflow_desk::CaseDesk;
use caseflow_sla::{Case, SlaConfig};
use caseflow_store::MemoryStore;

/// Read every case from `path`.
pub fn load_cases(path: &Path) -> anyhow::Result<Vec<Case>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Case file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse cases in {}", path.display()))
}

/// Write `cases` to `path`, replacing the file in one rename.
pub fn save_cases(path: &Path, cases: &[Case]) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(cases).context("failed to serialize cases")?;
    json.push('\n');

    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).with_context(|| format!("failed to write {}", staging.display()))?;
    fs::rename(&staging, path).with_context(|| format!("failed to replace {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = cases.len(), "Saved cases");
    Ok(())
}

/// Load the SLA configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SlaConfig> {
    let Some(path) = path else {
        return Ok(SlaConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    SlaConfig::from_json(&text).with_context(|| format!("invalid config in {}", path.display()))
}

/// Load the case file into a desk backed by an in-memory store.
pub fn open_desk(path: &Path, config: SlaConfig) -> anyhow::Result<CaseDesk<MemoryStore>> {
    let store = MemoryStore::from_cases(load_cases(path)?);
    Ok(CaseDesk::new(Arc::new(store), config)?)
}

/// Write the desk's cases back to `path`.
pub fn save_desk(path: &Path, desk: &CaseDesk<MemoryStore>) -> anyhow::Result<()> {
    save_cases(path, &desk.store().snapshot())
}
