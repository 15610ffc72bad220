//! Sample Trees
//!
//! Builds a synthetic tree from a seed: people with birth, death and burial
//! events spread over three centuries, parishes, and married couples. Some
//! dates are year-only and some early ones are written on the Julian
//! calendar, so a sample exercises the same paths as a real database.

use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::calendar::{from_jdn, to_jdn, Calendar, DateValue};
use crate::components::*;
use crate::error::{HistoryError, Result};
use crate::names;
use crate::tree::FamilyTree;

const FIRST_BIRTH_YEAR: i32 = 1650;
const LAST_BIRTH_YEAR: i32 = 1930;
const LIFESPAN_MEAN: f64 = 58.0;
const LIFESPAN_SD: f64 = 20.0;
const MAX_LIFESPAN: f64 = 104.0;
/// Sweden switched calendars in 1753
const JULIAN_UNTIL: i32 = 1753;

#[derive(Debug, Clone, Copy)]
pub struct SampleOptions {
    pub people: usize,
    pub seed: u64,
    /// Share of people given a death record
    pub deceased_ratio: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            people: 200,
            seed: 42,
            deceased_ratio: 0.75,
        }
    }
}

struct SampleBuilder {
    rng: StdRng,
    tree: FamilyTree,
    places: Vec<Handle>,
    next_event: usize,
}

impl SampleBuilder {
    fn random_day(&mut self, year: i32) -> Option<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        start.checked_add_days(Days::new(self.rng.gen_range(0..365)))
    }

    /// Record a Gregorian day the way an old register might have
    fn recorded(&mut self, date: NaiveDate) -> DateValue {
        let (year, month, day) = (date.year(), date.month() as u8, date.day() as u8);
        if self.rng.gen_bool(0.1) {
            return DateValue::gregorian(year, 0, 0);
        }
        if year < JULIAN_UNTIL && self.rng.gen_bool(0.5) {
            let julian = to_jdn(Calendar::Gregorian, year, month, day)
                .and_then(|jdn| from_jdn(Calendar::Julian, jdn));
            if let Some((y, m, d)) = julian {
                return DateValue::new(Calendar::Julian, y, m, d);
            }
        }
        DateValue::gregorian(year, month, day)
    }

    fn add_event(&mut self, kind: &str, date: DateValue) -> Handle {
        self.next_event += 1;
        let handle = Handle::new(format!("_sample_e{}", self.next_event));
        let place = self.places.choose(&mut self.rng).cloned();
        self.tree.add_event(Event {
            handle: handle.clone(),
            gramps_id: format!("E{:04}", self.next_event),
            event_type: EventType::new(kind),
            date,
            place,
            description: String::new(),
        });
        handle
    }
}

/// Generate a tree; the same options always give the same tree
pub fn generate(options: &SampleOptions) -> Result<FamilyTree> {
    if !(0.0..=1.0).contains(&options.deceased_ratio) {
        return Err(HistoryError::Config(format!(
            "deceased_ratio must be within 0..=1, got {}",
            options.deceased_ratio
        )));
    }
    let lifespan = Normal::new(LIFESPAN_MEAN, LIFESPAN_SD)
        .map_err(|e| HistoryError::Config(e.to_string()))?;

    let mut builder = SampleBuilder {
        rng: StdRng::seed_from_u64(options.seed),
        tree: FamilyTree::new(),
        places: Vec::new(),
        next_event: 0,
    };

    for (i, name) in names::places().iter().enumerate() {
        let handle = Handle::new(format!("_sample_p{}", i + 1));
        builder.tree.add_place(Place {
            handle: handle.clone(),
            gramps_id: format!("P{:04}", i + 1),
            name: name.to_string(),
            title: String::new(),
        });
        builder.places.push(handle);
    }

    // (handle, birth) per gender, for pairing into couples
    let mut men: Vec<(Handle, NaiveDate)> = Vec::new();
    let mut women: Vec<(Handle, NaiveDate)> = Vec::new();

    for i in 0..options.people {
        let gender = if builder.rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let name = PersonName::new(
            names::random_first_name(&mut builder.rng, gender),
            names::random_surname(&mut builder.rng),
        );

        let birth_year = builder.rng.gen_range(FIRST_BIRTH_YEAR..=LAST_BIRTH_YEAR);
        let Some(born) = builder.random_day(birth_year) else {
            continue;
        };
        let mut events = Vec::new();
        let birth_date = builder.recorded(born);
        events.push(builder.add_event("Birth", birth_date));

        if builder.rng.gen_bool(options.deceased_ratio) {
            let years = lifespan.sample(&mut builder.rng).clamp(0.0, MAX_LIFESPAN);
            let days = (years * 365.25) as u64 + builder.rng.gen_range(0..365);
            if let Some(died) = born.checked_add_days(Days::new(days)) {
                let death_date = builder.recorded(died);
                events.push(builder.add_event("Death", death_date));
                if builder.rng.gen_bool(0.8) {
                    let buried = died.checked_add_days(Days::new(builder.rng.gen_range(2..10)));
                    if let Some(buried) = buried {
                        let burial_date = builder.recorded(buried);
                        events.push(builder.add_event("Burial", burial_date));
                    }
                }
            }
        }

        let handle = Handle::new(format!("_sample_i{}", i + 1));
        builder.tree.add_person(
            Person {
                handle: handle.clone(),
                gramps_id: format!("I{:04}", i + 1),
                name,
                gender,
            },
            events,
        );
        match gender {
            Gender::Female => women.push((handle, born)),
            _ => men.push((handle, born)),
        }
    }

    let couples: Vec<_> = men.into_iter().zip(women).collect();
    for (i, ((father, father_born), (mother, mother_born))) in couples.into_iter().enumerate() {
        let relationship = if builder.rng.gen_bool(0.9) {
            FamilyRelType::Married
        } else {
            FamilyRelType::Unknown
        };

        let older = father_born.min(mother_born).year();
        let wedding_year = older + builder.rng.gen_range(18..35);
        let mut events = Vec::new();
        if let Some(wed) = builder.random_day(wedding_year) {
            let wedding_date = builder.recorded(wed);
            events.push(builder.add_event("Marriage", wedding_date));
        }

        builder.tree.add_family(
            Family {
                handle: Handle::new(format!("_sample_f{}", i + 1)),
                gramps_id: format!("F{:04}", i + 1),
                father: Some(father),
                mother: Some(mother),
                relationship,
            },
            events,
        );
    }

    let tree = builder.tree;
    info!(
        "Generated sample tree: {} people, {} families, {} events (seed {})",
        tree.person_count(),
        tree.family_count(),
        tree.event_count(),
        options.seed
    );
    Ok(tree)
}
