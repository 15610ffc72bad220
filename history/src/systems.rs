//! Systems - passes over the loaded tree
//!
//! Run in order: mark deceased people, then collect their events by day.

pub mod deceased;
pub mod collect;

pub use deceased::mark_deceased;
pub use collect::{collect_events, DayBuckets, DayKey, EventFilter, EventRecord, RecordKind};
