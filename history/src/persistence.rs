//! Persistence module for tree snapshots
//!
//! A parsed tree can be saved as a versioned snapshot (JSON or bincode) and
//! loaded back without going through the Gramps XML reader again.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::components::*;
use crate::error::{HistoryError, Result};
use crate::gramps_xml;
use crate::tree::FamilyTree;

pub const SNAPSHOT_VERSION: u8 = 1;

// ============================================================================
// Snapshot Data Structures
// ============================================================================

/// Complete tree state for persistence.
///
/// Plain field layout only: bincode cannot decode flattened or skipped fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub version: u8, // Schema version for forward compatibility
    pub people: Vec<ExportedPerson>,
    pub families: Vec<ExportedFamily>,
    pub events: Vec<Event>,
    pub places: Vec<Place>,
}

/// Single person with their event references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedPerson {
    pub person: Person,
    pub events: Vec<Handle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedFamily {
    pub family: Family,
    pub events: Vec<Handle>,
}

/// Result of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportResult {
    pub people: usize,
    pub families: usize,
    pub events: usize,
    pub places: usize,
}

/// Result of writing a snapshot to disk
#[derive(Debug, Clone, Copy)]
pub struct SaveStats {
    pub people: usize,
    pub file_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Bincode,
}

impl SnapshotFormat {
    /// `.bin` is bincode, everything else JSON
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => SnapshotFormat::Bincode,
            _ => SnapshotFormat::Json,
        }
    }
}

// ============================================================================
// Export / Import
// ============================================================================

impl FamilyTree {
    /// Capture the whole tree, people and families in document order
    pub fn export_snapshot(&self) -> TreeSnapshot {
        let people = self
            .people()
            .iter()
            .filter_map(|&entity| {
                let person = self.world.get::<&Person>(entity).ok()?;
                let refs = self.world.get::<&EventRefs>(entity).ok()?;
                Some(ExportedPerson {
                    person: (*person).clone(),
                    events: refs.0.clone(),
                })
            })
            .collect();

        let families = self
            .families()
            .iter()
            .filter_map(|&entity| {
                let family = self.world.get::<&Family>(entity).ok()?;
                let refs = self.world.get::<&EventRefs>(entity).ok()?;
                Some(ExportedFamily {
                    family: (*family).clone(),
                    events: refs.0.clone(),
                })
            })
            .collect();

        let mut events: Vec<Event> = self
            .world
            .query::<&Event>()
            .iter()
            .map(|(_, event)| event.clone())
            .collect();
        events.sort_by(|a, b| a.handle.cmp(&b.handle));

        let mut places: Vec<Place> = self
            .world
            .query::<&Place>()
            .iter()
            .map(|(_, place)| place.clone())
            .collect();
        places.sort_by(|a, b| a.handle.cmp(&b.handle));

        TreeSnapshot {
            version: SNAPSHOT_VERSION,
            people,
            families,
            events,
            places,
        }
    }

    /// Build a tree from a snapshot
    pub fn import_snapshot(data: TreeSnapshot) -> Result<(FamilyTree, ImportResult)> {
        if data.version != SNAPSHOT_VERSION {
            return Err(HistoryError::UnsupportedVersion(data.version));
        }

        let result = ImportResult {
            people: data.people.len(),
            families: data.families.len(),
            events: data.events.len(),
            places: data.places.len(),
        };

        let mut tree = FamilyTree::new();
        for place in data.places {
            tree.add_place(place);
        }
        for event in data.events {
            tree.add_event(event);
        }
        for p in data.people {
            tree.add_person(p.person, p.events);
        }
        for f in data.families {
            tree.add_family(f.family, f.events);
        }
        Ok((tree, result))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<FamilyTree> {
        let data: TreeSnapshot = serde_json::from_str(json)?;
        Ok(Self::import_snapshot(data)?.0)
    }
}

// ============================================================================
// Files
// ============================================================================

/// Load a tree by extension: `.json` / `.bin` snapshots, anything else Gramps XML
pub fn load_tree(path: &Path) -> Result<FamilyTree> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("json") | Some("bin") => {
            let bytes = fs::read(path).map_err(|e| HistoryError::io(path, e))?;
            let data: TreeSnapshot = match SnapshotFormat::for_path(path) {
                SnapshotFormat::Json => serde_json::from_slice(&bytes)?,
                SnapshotFormat::Bincode => bincode::deserialize(&bytes)?,
            };
            let (tree, result) = FamilyTree::import_snapshot(data)?;
            info!(
                "Loaded snapshot {}: {} people, {} families, {} events, {} places",
                path.display(),
                result.people,
                result.families,
                result.events,
                result.places
            );
            Ok(tree)
        }
        _ => gramps_xml::read_file(path),
    }
}

/// Write a snapshot, format chosen by extension
pub fn save_snapshot(tree: &FamilyTree, path: &Path) -> Result<SaveStats> {
    let data = tree.export_snapshot();
    let bytes = match SnapshotFormat::for_path(path) {
        SnapshotFormat::Json => serde_json::to_vec(&data)?,
        SnapshotFormat::Bincode => bincode::serialize(&data)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
    }
    fs::write(path, &bytes).map_err(|e| HistoryError::io(path, e))?;

    Ok(SaveStats {
        people: data.people.len(),
        file_bytes: bytes.len() as u64,
    })
}
