//! Attribution of log files to cluster nodes.
//!
//! Diagnostic bundles lay logs out as `.../nodes/<node>/logs/.../system.log`,
//! so the component after the marker names the node. Files outside that
//! layout are attributed to their own path.

use std::path::{Path, MAIN_SEPARATOR};

/// Derive the node identifier for `path`.
///
/// Returns the component following the first `marker` component, or the whole
/// path (lossily converted to UTF-8) when no such component exists.
pub fn node_id(path: &Path, marker: &str) -> String {
    let full = path.to_string_lossy();
    let mut components = full.split(MAIN_SEPARATOR);
    while let Some(component) = components.next() {
        if component == marker {
            if let Some(next) = components.next() {
                return next.to_string();
            }
        }
    }
    full.into_owned()
}
