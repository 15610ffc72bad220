use std::path::Path;

use anyhow::Context;
use history::{Config, ExportOptions, ThisDayGenerator};

pub fn run(database: &Path, out_dir: &Path, clean: bool, config: &Config) -> anyhow::Result<()> {
    let tree = super::load(database)?;
    let mut generator = ThisDayGenerator::new(tree, config);
    let summary = generator
        .run(out_dir, &ExportOptions { clean })
        .with_context(|| format!("export to {} failed", out_dir.display()))?;

    println!(
        "Wrote {} events into {} files in {}",
        summary.events,
        summary.files,
        out_dir.display()
    );
    Ok(())
}
