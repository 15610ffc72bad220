//! Subcommands, one module each

pub mod convert;
pub mod day;
pub mod export;
pub mod sample;
pub mod stats;

use std::path::Path;

use anyhow::Context;
use history::FamilyTree;
use tracing::debug;

/// Resident memory in bytes, 0 when the platform does not report it
pub fn physical_mem() -> u64 {
    memory_stats::memory_stats()
        .map(|stats| stats.physical_mem as u64)
        .unwrap_or(0)
}

/// Load a database or snapshot and log the memory it took
pub fn load(database: &Path) -> anyhow::Result<FamilyTree> {
    let tree = history::load_tree(database)
        .with_context(|| format!("failed to load {}", database.display()))?;
    debug!(
        "Tree loaded: {} people, {} MiB resident",
        tree.person_count(),
        physical_mem() / (1024 * 1024)
    );
    Ok(tree)
}
