//! Session document: connection settings plus the datapoint list
//!
//! Loading never fails: a missing file starts an empty session and a corrupt
//! one is logged and replaced by defaults. Saving writes a sibling temp file
//! and renames it over the target.

use errors::RegscopeResult;
use regscope_link::ConnectionConfig;
use regscope_model::Datapoint;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub modbus: ConnectionConfig,
    pub datapoints: Vec<Datapoint>,
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match directories::BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

pub fn load(path: &Path) -> Document {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No document at {}, starting empty", path.display());
            return Document::default();
        },
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return Document::default();
        },
    };

    match serde_json::from_str::<Document>(&content) {
        Ok(doc) => {
            info!(
                "Loaded {} datapoints from {}",
                doc.datapoints.len(),
                path.display()
            );
            doc
        },
        Err(e) => {
            warn!("Ignoring unparsable document {}: {}", path.display(), e);
            Document::default()
        },
    }
}

pub fn save(path: &Path, doc: &Document) -> RegscopeResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let content = serde_json::to_string_pretty(doc)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(
        "Saved {} datapoints to {}",
        doc.datapoints.len(),
        path.display()
    );
    Ok(())
}
