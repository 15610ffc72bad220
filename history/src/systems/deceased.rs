//! Deceased System
//!
//! Marks people with a death, burial or cremation event.

use hecs::Entity;
use tracing::debug;

use crate::components::{Deceased, EventRefs, Person};
use crate::tree::FamilyTree;

/// Tag every deceased person with the `Deceased` marker.
/// Returns the number of deceased people.
pub fn mark_deceased(tree: &mut FamilyTree) -> usize {
    let mut deceased: Vec<Entity> = Vec::new();

    for &entity in tree.people() {
        let refs = match tree.world.get::<&EventRefs>(entity) {
            Ok(refs) => refs,
            Err(_) => continue,
        };
        let has_end_of_life = refs.0.iter().any(|handle| {
            tree.event(handle)
                .map(|event| event.event_type.marks_deceased())
                .unwrap_or(false)
        });
        if has_end_of_life {
            deceased.push(entity);
        }
    }

    for &entity in &deceased {
        if let Ok(person) = tree.world.get::<&Person>(entity) {
            debug!("{} ({}) is deceased", person.name.regular_name(), person.gramps_id);
        }
        let _ = tree.world.insert_one(entity, Deceased);
    }

    deceased.len()
}
