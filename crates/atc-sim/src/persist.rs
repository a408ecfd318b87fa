//! Snapshot files on disk.

use anyhow::{Context, Result};
use atc_airspace::FleetSnapshot;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write a snapshot as pretty JSON, creating parent directories as needed.
pub fn save_snapshot(path: &Path, snapshot: &FleetSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = snapshot.to_json().context("Failed to encode snapshot")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        "Saved {} flights to {}",
        snapshot.flight_count(),
        path.display()
    );
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<FleetSnapshot> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot = FleetSnapshot::from_json(&json)
        .with_context(|| format!("Invalid snapshot in {}", path.display()))?;
    info!(
        "Loaded {} flights from {}",
        snapshot.flight_count(),
        path.display()
    );
    Ok(snapshot)
}
