use serde::Serialize;

// -- Serializable types printed by commands --

#[derive(Serialize, Clone)]
pub struct DayReport {
    pub day: String,
    pub events: Vec<history::ExportEntry>,
}

#[derive(Serialize, Clone)]
pub struct BusyDay {
    pub day: String,
    pub events: usize,
}

#[derive(Serialize, Clone)]
pub struct TreeStats {
    pub people: usize,
    pub families: usize,
    pub events: usize,
    pub places: usize,
    pub deceased: usize,
    pub days_with_events: usize,
    pub reportable_events: usize,
    pub busiest_days: Vec<BusyDay>,
    pub physical_mem: u64,
}

#[derive(Serialize, Clone)]
pub struct SaveResult {
    pub people: usize,
    pub file_bytes: u64,
}
