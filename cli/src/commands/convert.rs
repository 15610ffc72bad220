use std::path::Path;

use anyhow::Context;

use crate::state::SaveResult;

pub fn run(database: &Path, snapshot: &Path) -> anyhow::Result<()> {
    let tree = super::load(database)?;
    let stats = history::save_snapshot(&tree, snapshot)
        .with_context(|| format!("failed to write {}", snapshot.display()))?;

    let result = SaveResult {
        people: stats.people,
        file_bytes: stats.file_bytes,
    };
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
