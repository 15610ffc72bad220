//! Collect System
//!
//! Buckets the events of deceased people, and of families whose partners
//! are both deceased, by Gregorian (month, day).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::components::*;
use crate::config::{EventsConfig, Labels};
use crate::error::HistoryError;
use crate::tree::FamilyTree;

/// Leap year used to decide which (month, day) pairs exist
const LEAP_YEAR: i32 = 2000;

// ============================================================================
// Day keys
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub month: u8,
    pub day: u8,
}

impl DayKey {
    /// A calendar day that exists in a leap year (Feb 29 included)
    pub fn new(month: u8, day: u8) -> Result<Self, HistoryError> {
        NaiveDate::from_ymd_opt(LEAP_YEAR, month as u32, day as u32)
            .map(|_| Self { month, day })
            .ok_or_else(|| HistoryError::InvalidDay(format!("{:02}-{:02}", month, day)))
    }

    /// All 366 days, January 1st first
    pub fn all() -> impl Iterator<Item = DayKey> {
        (1..=12u8).flat_map(|month| (1..=31u8).filter_map(move |day| DayKey::new(month, day).ok()))
    }

    /// `events_MM_DD.json`
    pub fn file_name(&self) -> String {
        format!("events_{:02}_{:02}.json", self.month, self.day)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for DayKey {
    type Err = HistoryError;

    /// `MM-DD` or `MM/DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HistoryError::InvalidDay(s.to_string());
        let (month, day) = s.trim().split_once(['-', '/']).ok_or_else(invalid)?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let day: u8 = day.parse().map_err(|_| invalid())?;
        DayKey::new(month, day)
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Person,
    Family,
}

impl RecordKind {
    pub fn label<'a>(&self, labels: &'a Labels) -> &'a str {
        match self {
            RecordKind::Person => &labels.person,
            RecordKind::Family => &labels.family,
        }
    }
}

/// One reportable event on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub gramps_id: String,
    pub gender: Gender,
    pub event_type: EventType,
    /// Gregorian year, `None` when unknown
    pub year: Option<i32>,
    pub place: String,
    /// Relationship of the couple, set for marriage events
    pub extra_info: Option<FamilyRelType>,
    pub handle: Handle,
    pub kind: RecordKind,
}

/// Which event types make it into the export
#[derive(Debug, Clone)]
pub struct EventFilter {
    report: HashSet<String>,
    unsupported: HashSet<String>,
}

impl EventFilter {
    pub fn new(config: &EventsConfig) -> Self {
        Self {
            report: config.report.iter().cloned().collect(),
            unsupported: config.unsupported.iter().cloned().collect(),
        }
    }

    pub fn is_reportable(&self, event_type: &EventType) -> bool {
        let name = event_type.as_str();
        self.report.contains(name) && !self.unsupported.contains(name)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new(&EventsConfig::default())
    }
}

/// Records grouped by day, insertion order kept within a day
#[derive(Debug, Clone, Default)]
pub struct DayBuckets {
    buckets: BTreeMap<DayKey, Vec<EventRecord>>,
}

impl DayBuckets {
    pub fn push(&mut self, key: DayKey, record: EventRecord) {
        self.buckets.entry(key).or_default().push(record);
    }

    pub fn get(&self, key: DayKey) -> &[EventRecord] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of days holding at least one record
    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Days ordered by record count, busiest first
    pub fn busiest(&self, limit: usize) -> Vec<(DayKey, usize)> {
        let mut days: Vec<(DayKey, usize)> = self
            .buckets
            .iter()
            .map(|(key, records)| (*key, records.len()))
            .collect();
        days.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        days.truncate(limit);
        days
    }
}

// ============================================================================
// Collection passes
// ============================================================================

/// Gregorian day of an event, with its year when known
fn event_day(event: &Event) -> Option<(DayKey, Option<i32>)> {
    if !event.date.is_valid() {
        return None;
    }
    let date = event.date.to_gregorian()?;
    if date.month == 0 || date.day == 0 {
        return None;
    }
    match DayKey::new(date.month, date.day) {
        Ok(key) => Some((key, (date.year != 0).then_some(date.year))),
        Err(_) => {
            debug!("Skipping {} with impossible date {}", event.gramps_id, date);
            None
        }
    }
}

fn place_of(tree: &FamilyTree, event: &Event, labels: &Labels) -> String {
    tree.place_name(event)
        .unwrap_or_else(|| labels.unknown_location.clone())
}

/// Collect person and family events of the deceased into day buckets.
///
/// Marks must already be set by [`crate::systems::mark_deceased`].
pub fn collect_events(tree: &FamilyTree, filter: &EventFilter, labels: &Labels) -> DayBuckets {
    let mut buckets = DayBuckets::default();

    info!("Collecting events for deceased individuals and their families...");
    let person_records = collect_person_events(tree, filter, labels, &mut buckets);
    let family_records = collect_family_events(tree, filter, labels, &mut buckets);

    info!(
        "Finished collecting events: {} person events, {} family events on {} days",
        person_records,
        family_records,
        buckets.day_count()
    );
    buckets
}

fn collect_person_events(
    tree: &FamilyTree,
    filter: &EventFilter,
    labels: &Labels,
    buckets: &mut DayBuckets,
) -> usize {
    let mut count = 0;

    for &entity in tree.people() {
        if !tree.is_deceased(entity) {
            continue;
        }
        let person = match tree.world.get::<&Person>(entity) {
            Ok(person) => (*person).clone(),
            Err(_) => continue,
        };

        for event in tree.events_of(entity) {
            let Some((key, year)) = event_day(&event) else {
                continue;
            };
            if !filter.is_reportable(&event.event_type) {
                continue;
            }

            // A marriage seen from one person has no relationship of its own
            let extra_info = event
                .event_type
                .is_marriage()
                .then_some(FamilyRelType::Unknown);

            buckets.push(
                key,
                EventRecord {
                    name: person.name.regular_name(),
                    gramps_id: person.gramps_id.clone(),
                    gender: person.gender,
                    event_type: event.event_type.clone(),
                    year,
                    place: place_of(tree, &event, labels),
                    extra_info,
                    handle: person.handle.clone(),
                    kind: RecordKind::Person,
                },
            );
            count += 1;
        }
    }

    count
}

/// Partner if the handle resolves to a deceased person; dangling handles warn
fn deceased_partner(tree: &FamilyTree, handle: Option<&Handle>) -> Option<Person> {
    let handle = handle?;
    let person = (*tree.person(handle)?).clone();
    let entity = tree.entity(handle)?;
    tree.is_deceased(entity).then_some(person)
}

fn collect_family_events(
    tree: &FamilyTree,
    filter: &EventFilter,
    labels: &Labels,
    buckets: &mut DayBuckets,
) -> usize {
    let mut count = 0;

    for &entity in tree.families() {
        let family = match tree.world.get::<&Family>(entity) {
            Ok(family) => (*family).clone(),
            Err(_) => continue,
        };

        // Both partners must be known and deceased
        let (Some(father), Some(mother)) = (
            deceased_partner(tree, family.father.as_ref()),
            deceased_partner(tree, family.mother.as_ref()),
        ) else {
            continue;
        };

        for event in tree.events_of(entity) {
            let Some((key, year)) = event_day(&event) else {
                continue;
            };
            if !filter.is_reportable(&event.event_type) {
                continue;
            }

            buckets.push(
                key,
                EventRecord {
                    name: format!(
                        "{} and {}",
                        father.name.regular_name(),
                        mother.name.regular_name()
                    ),
                    gramps_id: format!("{}-{}", father.gramps_id, mother.gramps_id),
                    gender: Gender::Unknown,
                    event_type: event.event_type.clone(),
                    year,
                    place: place_of(tree, &event, labels),
                    extra_info: Some(family.relationship),
                    handle: family.handle.clone(),
                    kind: RecordKind::Family,
                },
            );
            count += 1;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, DateValue};
    use crate::systems::mark_deceased;

    struct Builder {
        tree: FamilyTree,
        next: u32,
    }

    impl Builder {
        fn new() -> Self {
            let mut tree = FamilyTree::new();
            tree.add_place(Place {
                handle: Handle::new("_home"),
                gramps_id: "P1".into(),
                name: "Falun".into(),
                title: String::new(),
            });
            Self { tree, next: 0 }
        }

        fn event(&mut self, kind: &str, date: DateValue, place: bool) -> Handle {
            self.next += 1;
            let handle = Handle::new(format!("_e{}", self.next));
            self.tree.add_event(Event {
                handle: handle.clone(),
                gramps_id: format!("E{}", self.next),
                event_type: EventType::new(kind),
                date,
                place: place.then(|| Handle::new("_home")),
                description: String::new(),
            });
            handle
        }

        fn person(&mut self, id: &str, first: &str, gender: Gender, events: Vec<Handle>) -> Handle {
            let handle = Handle::new(format!("_{}", id));
            self.tree.add_person(
                Person {
                    handle: handle.clone(),
                    gramps_id: id.into(),
                    name: PersonName::new(first, "Eriksson"),
                    gender,
                },
                events,
            );
            handle
        }

        fn collect(mut self) -> DayBuckets {
            mark_deceased(&mut self.tree);
            collect_events(&self.tree, &EventFilter::default(), &Labels::default())
        }
    }

    fn day(month: u8, day: u8) -> DayKey {
        DayKey::new(month, day).unwrap()
    }

    #[test]
    fn test_day_keys() {
        assert_eq!(DayKey::all().count(), 366);
        assert!(DayKey::new(2, 29).is_ok());
        assert!(DayKey::new(4, 31).is_err());
        assert_eq!("03-07".parse::<DayKey>().unwrap(), day(3, 7));
        assert_eq!("12/25".parse::<DayKey>().unwrap().file_name(), "events_12_25.json");
        assert!("13-01".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_only_deceased_people_are_collected() {
        let mut b = Builder::new();
        let birth = b.event("Birth", DateValue::gregorian(1870, 4, 12), true);
        let death = b.event("Death", DateValue::gregorian(1931, 4, 12), false);
        b.person("I1", "Greta", Gender::Female, vec![birth, death]);
        let living_birth = b.event("Birth", DateValue::gregorian(1990, 4, 12), true);
        b.person("I2", "Nils", Gender::Male, vec![living_birth]);

        let buckets = b.collect();
        let records = buckets.get(day(4, 12));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.gramps_id == "I1"));
        assert_eq!(records[0].year, Some(1870));
        assert_eq!(records[0].place, "Falun");
        assert_eq!(records[1].place, "unknown location");
        assert_eq!(records[1].kind, RecordKind::Person);
    }

    #[test]
    fn test_dates_without_day_or_month_are_skipped() {
        let mut b = Builder::new();
        let partial = b.event("Birth", DateValue::gregorian(1850, 6, 0), false);
        let text = b.event("Graduation", DateValue::text(), false);
        let no_year = b.event("Emigration", DateValue::gregorian(0, 8, 3), false);
        let death = b.event("Death", DateValue::gregorian(1850, 0, 0), false);
        b.person("I1", "Olof", Gender::Male, vec![partial, text, no_year, death]);

        let buckets = b.collect();
        assert_eq!(buckets.total(), 1);
        let record = &buckets.get(day(8, 3))[0];
        assert_eq!(record.event_type.as_str(), "Emigration");
        assert_eq!(record.year, None);
    }

    #[test]
    fn test_julian_dates_move_to_gregorian_day() {
        let mut b = Builder::new();
        let birth = b.event("Birth", DateValue::new(Calendar::Julian, 1700, 12, 25), false);
        let death = b.event("Death", DateValue::new(Calendar::Julian, 0, 1, 1), false);
        b.person("I1", "Hedvig", Gender::Female, vec![birth, death]);

        let buckets = b.collect();
        // 11 days apart in 1700; the year turns over
        let record = &buckets.get(day(1, 5))[0];
        assert_eq!(record.year, Some(1701));
        assert_eq!(buckets.total(), 1);
    }

    #[test]
    fn test_unreportable_types_are_skipped() {
        let mut b = Builder::new();
        let occupation = b.event("Occupation", DateValue::gregorian(1880, 2, 2), false);
        let census = b.event("Census", DateValue::gregorian(1880, 2, 2), false);
        let burial = b.event("Burial", DateValue::gregorian(1900, 2, 2), false);
        b.person("I1", "Anders", Gender::Male, vec![occupation, census, burial]);

        let buckets = b.collect();
        let records = buckets.get(day(2, 2));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type.as_str(), "Burial");
    }

    #[test]
    fn test_person_marriage_uses_unknown_relationship() {
        let mut b = Builder::new();
        let marriage = b.event("Marriage", DateValue::gregorian(1890, 9, 9), false);
        let death = b.event("Death", DateValue::gregorian(1940, 1, 1), false);
        b.person("I1", "Elsa", Gender::Female, vec![marriage, death]);

        let buckets = b.collect();
        assert_eq!(buckets.get(day(9, 9))[0].extra_info, Some(FamilyRelType::Unknown));
        assert_eq!(buckets.get(day(1, 1))[0].extra_info, None);
    }

    #[test]
    fn test_family_events_need_both_partners_deceased() {
        let mut b = Builder::new();
        let d1 = b.event("Death", DateValue::gregorian(1920, 3, 1), false);
        let d2 = b.event("Death", DateValue::gregorian(1925, 3, 2), false);
        let father = b.person("I1", "Johan", Gender::Male, vec![d1]);
        let mother = b.person("I2", "Maria", Gender::Female, vec![d2]);
        let living = b.person("I3", "Sven", Gender::Male, vec![]);

        let wedding = b.event("Marriage", DateValue::gregorian(1880, 5, 20), true);
        b.tree.add_family(
            Family {
                handle: Handle::new("_f1"),
                gramps_id: "F1".into(),
                father: Some(father.clone()),
                mother: Some(mother.clone()),
                relationship: FamilyRelType::Married,
            },
            vec![wedding.clone()],
        );
        b.tree.add_family(
            Family {
                handle: Handle::new("_f2"),
                gramps_id: "F2".into(),
                father: Some(living),
                mother: Some(mother.clone()),
                relationship: FamilyRelType::Married,
            },
            vec![wedding.clone()],
        );
        b.tree.add_family(
            Family {
                handle: Handle::new("_f3"),
                gramps_id: "F3".into(),
                father: None,
                mother: Some(mother),
                relationship: FamilyRelType::Unmarried,
            },
            vec![wedding],
        );

        let buckets = b.collect();
        let records = buckets.get(day(5, 20));
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Johan Eriksson and Maria Eriksson");
        assert_eq!(record.gramps_id, "I1-I2");
        assert_eq!(record.gender, Gender::Unknown);
        assert_eq!(record.extra_info, Some(FamilyRelType::Married));
        assert_eq!(record.handle, Handle::new("_f1"));
        assert_eq!(record.kind, RecordKind::Family);
        assert_eq!(record.place, "Falun");
    }

    #[test]
    fn test_dangling_partner_skips_family() {
        let mut b = Builder::new();
        let death = b.event("Death", DateValue::gregorian(1911, 4, 4), false);
        let mother = b.person("I2", "Alma", Gender::Female, vec![death]);
        let wedding = b.event("Marriage", DateValue::gregorian(1880, 8, 8), false);
        b.tree.add_family(
            Family {
                handle: Handle::new("_f1"),
                gramps_id: "F1".into(),
                father: Some(Handle::new("_gone")),
                mother: Some(mother),
                relationship: FamilyRelType::Married,
            },
            vec![wedding],
        );

        let buckets = b.collect();
        assert!(buckets.get(day(8, 8)).is_empty());
        assert_eq!(buckets.total(), 1);
    }

    #[test]
    fn test_person_events_come_before_family_events() {
        let mut b = Builder::new();
        let d1 = b.event("Death", DateValue::gregorian(1920, 7, 7), false);
        let d2 = b.event("Death", DateValue::gregorian(1925, 1, 2), false);
        let father = b.person("I1", "Erik", Gender::Male, vec![d1]);
        let mother = b.person("I2", "Ida", Gender::Female, vec![d2]);
        let wedding = b.event("Marriage", DateValue::gregorian(1890, 7, 7), false);
        b.tree.add_family(
            Family {
                handle: Handle::new("_f1"),
                gramps_id: "F1".into(),
                father: Some(father),
                mother: Some(mother),
                relationship: FamilyRelType::CivilUnion,
            },
            vec![wedding],
        );

        let buckets = b.collect();
        let kinds: Vec<RecordKind> = buckets.get(day(7, 7)).iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecordKind::Person, RecordKind::Family]);
        assert_eq!(buckets.busiest(1), vec![(day(7, 7), 2)]);
    }
}
