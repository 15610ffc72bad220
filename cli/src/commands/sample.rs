use std::path::Path;

use anyhow::Context;
use history::sample::{self, SampleOptions};

use crate::state::SaveResult;

pub fn run(snapshot: &Path, people: usize, seed: u64, deceased_ratio: f64) -> anyhow::Result<()> {
    let tree = sample::generate(&SampleOptions {
        people,
        seed,
        deceased_ratio,
    })?;
    let stats = history::save_snapshot(&tree, snapshot)
        .with_context(|| format!("failed to write {}", snapshot.display()))?;

    let result = SaveResult {
        people: stats.people,
        file_bytes: stats.file_bytes,
    };
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
