//! Family Tree - in-memory database over a hecs world

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::warn;

use crate::components::*;

/// Loaded genealogical database.
///
/// Every person, family, event and place is an entity; `handles` resolves
/// database keys to entities. People and families also keep their document
/// order, which is the order the collection passes walk them in.
pub struct FamilyTree {
    pub world: World,
    handles: HashMap<Handle, Entity>,
    people: Vec<Entity>,
    families: Vec<Entity>,
}

impl FamilyTree {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            handles: HashMap::new(),
            people: Vec::new(),
            families: Vec::new(),
        }
    }

    pub fn add_person(&mut self, person: Person, events: Vec<Handle>) -> Entity {
        let handle = person.handle.clone();
        let entity = self.world.spawn((person, EventRefs(events)));
        self.register(handle, entity);
        self.people.push(entity);
        entity
    }

    pub fn add_family(&mut self, family: Family, events: Vec<Handle>) -> Entity {
        let handle = family.handle.clone();
        let entity = self.world.spawn((family, EventRefs(events)));
        self.register(handle, entity);
        self.families.push(entity);
        entity
    }

    pub fn add_event(&mut self, event: Event) -> Entity {
        let handle = event.handle.clone();
        let entity = self.world.spawn((event,));
        self.register(handle, entity);
        entity
    }

    pub fn add_place(&mut self, place: Place) -> Entity {
        let handle = place.handle.clone();
        let entity = self.world.spawn((place,));
        self.register(handle, entity);
        entity
    }

    fn register(&mut self, handle: Handle, entity: Entity) {
        if let Some(previous) = self.handles.insert(handle.clone(), entity) {
            warn!("Duplicate handle {} replaces an earlier object", handle);
            let _ = self.world.despawn(previous);
            self.people.retain(|e| *e != previous);
            self.families.retain(|e| *e != previous);
        }
    }

    pub fn entity(&self, handle: &Handle) -> Option<Entity> {
        self.handles.get(handle).copied()
    }

    /// Person by handle
    pub fn person(&self, handle: &Handle) -> Option<hecs::Ref<'_, Person>> {
        self.lookup::<Person>(handle, "person")
    }

    /// Event by handle
    pub fn event(&self, handle: &Handle) -> Option<hecs::Ref<'_, Event>> {
        self.lookup::<Event>(handle, "event")
    }

    /// Place by handle
    pub fn place(&self, handle: &Handle) -> Option<hecs::Ref<'_, Place>> {
        self.lookup::<Place>(handle, "place")
    }

    fn lookup<T: hecs::Component>(&self, handle: &Handle, kind: &str) -> Option<hecs::Ref<'_, T>> {
        let found = self
            .entity(handle)
            .and_then(|entity| self.world.get::<&T>(entity).ok());
        if found.is_none() {
            warn!("Dangling {} handle {}", kind, handle);
        }
        found
    }

    /// People in document order
    pub fn people(&self) -> &[Entity] {
        &self.people
    }

    /// Families in document order
    pub fn families(&self) -> &[Entity] {
        &self.families
    }

    /// Events referenced by a person or family, resolved in reference order
    pub fn events_of(&self, entity: Entity) -> Vec<Event> {
        let refs = match self.world.get::<&EventRefs>(entity) {
            Ok(refs) => refs.0.clone(),
            Err(_) => return Vec::new(),
        };
        refs.iter()
            .filter_map(|handle| self.event(handle).map(|event| (*event).clone()))
            .collect()
    }

    /// Resolved place name of an event, if it has one
    pub fn place_name(&self, event: &Event) -> Option<String> {
        let handle = event.place.as_ref()?;
        let place = self.place(handle)?;
        place.display_name().map(str::to_string)
    }

    pub fn is_deceased(&self, entity: Entity) -> bool {
        self.world.get::<&Deceased>(entity).is_ok()
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn event_count(&self) -> usize {
        self.world.query::<&Event>().iter().count()
    }

    pub fn place_count(&self) -> usize {
        self.world.query::<&Place>().iter().count()
    }

    pub fn deceased_count(&self) -> usize {
        self.world.query::<&Person>().with::<&Deceased>().iter().count()
    }
}

impl Default for FamilyTree {
    fn default() -> Self {
        Self::new()
    }
}
