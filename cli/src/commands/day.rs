use std::path::Path;

use history::{Config, DayKey, ThisDayGenerator};

use crate::state::DayReport;

pub fn run(database: &Path, day: &str, json: bool, config: &Config) -> anyhow::Result<()> {
    let key: DayKey = day.parse()?;
    let tree = super::load(database)?;
    let mut generator = ThisDayGenerator::new(tree, config);
    let report = DayReport {
        day: key.to_string(),
        events: generator.day(key),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.events.is_empty() {
        println!("Nothing recorded on {}.", report.day);
    }
    for entry in &report.events {
        println!("{}", entry.description);
    }
    Ok(())
}
