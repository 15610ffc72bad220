use std::path::Path;

use history::{Config, ThisDayGenerator};

use crate::state::{BusyDay, TreeStats};

const BUSIEST_DAYS: usize = 5;

pub fn run(database: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let tree = super::load(database)?;
    let mut generator = ThisDayGenerator::new(tree, config);
    let buckets = generator.collect();
    let days_with_events = buckets.day_count();
    let reportable_events = buckets.total();
    let busiest_days = buckets
        .busiest(BUSIEST_DAYS)
        .into_iter()
        .map(|(day, events)| BusyDay {
            day: day.to_string(),
            events,
        })
        .collect();

    let tree = &generator.tree;
    let stats = TreeStats {
        people: tree.person_count(),
        families: tree.family_count(),
        events: tree.event_count(),
        places: tree.place_count(),
        deceased: tree.deceased_count(),
        days_with_events,
        reportable_events,
        busiest_days,
        physical_mem: super::physical_mem(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("People:    {} ({} deceased)", stats.people, stats.deceased);
    println!("Families:  {}", stats.families);
    println!("Events:    {}", stats.events);
    println!("Places:    {}", stats.places);
    println!(
        "Exportable: {} events on {} days",
        stats.reportable_events, stats.days_with_events
    );
    for busy in &stats.busiest_days {
        println!("  {}  {}", busy.day, busy.events);
    }
    Ok(())
}
