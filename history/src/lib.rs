//! On This Day - family history engine
//!
//! Loads a genealogical database into an ECS world, finds the deceased,
//! and exports what happened to them (and to couples where both partners
//! are deceased) as one JSON file per calendar day.

pub mod calendar;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod gramps_xml;
pub mod messages;
pub mod names;
pub mod persistence;
pub mod sample;
pub mod systems;
pub mod tree;

pub use calendar::{Calendar, DateValue};
pub use components::*;
pub use config::Config;
pub use error::{HistoryError, Result};
pub use export::{ExportEntry, ExportOptions, ExportSummary};
pub use generator::ThisDayGenerator;
pub use messages::MessageCatalog;
pub use persistence::{load_tree, save_snapshot, ImportResult, SaveStats, TreeSnapshot};
pub use sample::SampleOptions;
pub use systems::{DayBuckets, DayKey, EventRecord};
pub use tree::FamilyTree;
