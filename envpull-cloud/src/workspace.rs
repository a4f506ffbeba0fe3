//! Workspace marker file.

use crate::error::{PullError, PullResult};
use std::path::Path;

/// Reads the workspace id from the local marker file.
///
/// Surrounding whitespace is ignored. The id ends up in a URL path, so only
/// ASCII letters, digits, `-` and `_` are accepted.
pub fn read_workspace_id(path: &Path) -> PullResult<String> {
    let raw = std::fs::read_to_string(path).map_err(|e| PullError::Workspace {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let id = raw.trim();
    if id.is_empty() {
        return Err(PullError::Workspace {
            path: path.to_path_buf(),
            reason: "marker is empty".into(),
        });
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PullError::Workspace {
            path: path.to_path_buf(),
            reason: format!("invalid workspace id {id:?}"),
        });
    }

    Ok(id.to_string())
}
