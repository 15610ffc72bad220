//! This-day generator - runs the export pipeline over one tree

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::export::{export_daily_events, render_day, ExportEntry, ExportOptions, ExportSummary};
use crate::messages::MessageCatalog;
use crate::systems::{self, DayBuckets, DayKey, EventFilter};
use crate::tree::FamilyTree;

pub struct ThisDayGenerator {
    pub tree: FamilyTree,
    filter: EventFilter,
    catalog: MessageCatalog,
    buckets: Option<DayBuckets>,
}

impl ThisDayGenerator {
    pub fn new(tree: FamilyTree, config: &Config) -> Self {
        Self {
            tree,
            filter: EventFilter::new(&config.events),
            catalog: MessageCatalog::from_config(config),
            buckets: None,
        }
    }

    /// Buckets (built on first use) alongside the catalog
    fn collected(&mut self) -> (&DayBuckets, &MessageCatalog) {
        let Self {
            tree,
            filter,
            catalog,
            buckets,
        } = self;
        let catalog: &MessageCatalog = catalog;

        let buckets = buckets.get_or_insert_with(|| {
            info!("Identifying deceased individuals...");
            let deceased = systems::mark_deceased(tree);
            info!("Found {} deceased individuals.", deceased);
            systems::collect_events(tree, filter, catalog.labels())
        });
        (&*buckets, catalog)
    }

    /// Mark the deceased and bucket their events; done once per generator
    pub fn collect(&mut self) -> &DayBuckets {
        self.collected().0
    }

    /// Entries for a single day
    pub fn day(&mut self, key: DayKey) -> Vec<ExportEntry> {
        let (buckets, catalog) = self.collected();
        render_day(buckets, catalog, key)
    }

    /// Full pipeline: mark, collect, write one file per day
    pub fn run(&mut self, out_dir: &Path, options: &ExportOptions) -> Result<ExportSummary> {
        let (buckets, catalog) = self.collected();
        let summary = export_daily_events(buckets, catalog, out_dir, options)?;
        info!(
            "Export complete. {} files, {} events.",
            summary.files, summary.events
        );
        Ok(summary)
    }
}
