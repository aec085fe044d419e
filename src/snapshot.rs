//! Archive of the last raw API response.

use exn::ResultExt;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;
use tokio::fs;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

const INDENT: &[u8] = b"    ";

/// Write `payload` to `path` as indented JSON, creating parent directories
/// and replacing any previous snapshot.
#[instrument(skip(payload), fields(path = %path.display()))]
pub async fn save(path: &Path, payload: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Snapshot)?;
    }
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    payload.serialize(&mut serializer).or_raise(|| ErrorKind::Snapshot)?;
    fs::write(path, &buffer).await.or_raise(|| ErrorKind::Snapshot)?;
    tracing::info!(bytes = buffer.len(), "Raw data saved");
    Ok(())
}
