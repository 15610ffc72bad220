//! ECS Components for family tree entities
//!
//! People, families, events and places each live as an entity in the
//! tree's `hecs::World`; handles tie them together.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calendar::DateValue;

// ============================================================================
// Identity Components
// ============================================================================

/// Opaque database key, e.g. `_b6a5c1f0e3d24a7e9`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Person Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Unknown,
    Other,
}

impl Gender {
    /// Gramps XML `<gender>` letter
    pub fn from_xml(value: &str) -> Self {
        match value.trim() {
            "F" => Gender::Female,
            "M" => Gender::Male,
            "X" => Gender::Other,
            _ => Gender::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub surname: String,
    pub suffix: String,
}

impl PersonName {
    pub fn new(first: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            surname: surname.into(),
            suffix: String::new(),
        }
    }

    /// "First Surname" or "First Surname, Suffix"
    pub fn regular_name(&self) -> String {
        let base = format!("{} {}", self.first.trim(), self.surname.trim());
        let base = base.trim();
        let suffix = self.suffix.trim();
        if suffix.is_empty() {
            base.to_string()
        } else {
            format!("{}, {}", base, suffix)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub handle: Handle,
    pub gramps_id: String,
    pub name: PersonName,
    pub gender: Gender,
}

/// Marker: person has a death, burial or cremation event
#[derive(Debug, Clone, Copy, Default)]
pub struct Deceased;

/// Ordered event references of a person or family
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRefs(pub Vec<Handle>);

// ============================================================================
// Family Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FamilyRelType {
    Married,
    Unmarried,
    CivilUnion,
    Unknown,
    Custom,
}

impl FamilyRelType {
    /// Numeric code, used in marriage template keys
    pub fn code(&self) -> u8 {
        match self {
            FamilyRelType::Married => 0,
            FamilyRelType::Unmarried => 1,
            FamilyRelType::CivilUnion => 2,
            FamilyRelType::Unknown => 3,
            FamilyRelType::Custom => 4,
        }
    }

    /// Gramps XML `<rel type="...">` value; unrecognised strings are custom
    pub fn from_xml(value: &str) -> Self {
        match value.trim() {
            "Married" => FamilyRelType::Married,
            "Unmarried" => FamilyRelType::Unmarried,
            "Civil Union" => FamilyRelType::CivilUnion,
            "Unknown" | "" => FamilyRelType::Unknown,
            _ => FamilyRelType::Custom,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub handle: Handle,
    pub gramps_id: String,
    pub father: Option<Handle>,
    pub mother: Option<Handle>,
    pub relationship: FamilyRelType,
}

// ============================================================================
// Event & Place Components
// ============================================================================

/// Event type as its Gramps XML string ("Birth", "Adult Christening", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventType(pub String);

impl EventType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase lookup key
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Death, burial and cremation mark a person as deceased
    pub fn marks_deceased(&self) -> bool {
        matches!(self.key().as_str(), "death" | "burial" | "cremation")
    }

    pub fn is_marriage(&self) -> bool {
        self.key() == "marriage"
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub handle: Handle,
    pub gramps_id: String,
    pub event_type: EventType,
    pub date: DateValue,
    pub place: Option<Handle>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub handle: Handle,
    pub gramps_id: String,
    pub name: String,
    pub title: String,
}

impl Place {
    /// Primary name, falling back to the legacy title
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_str(), self.title.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_name() {
        let mut name = PersonName::new("Anna", "Lindqvist");
        assert_eq!(name.regular_name(), "Anna Lindqvist");

        name.suffix = "Sr".into();
        assert_eq!(name.regular_name(), "Anna Lindqvist, Sr");

        let unnamed = PersonName::new("", "Berg");
        assert_eq!(unnamed.regular_name(), "Berg");
    }

    #[test]
    fn test_relationship_codes() {
        assert_eq!(FamilyRelType::from_xml("Civil Union").code(), 2);
        assert_eq!(FamilyRelType::from_xml("Handfasting"), FamilyRelType::Custom);
        assert_eq!(FamilyRelType::from_xml("").code(), 3);
        assert_eq!(FamilyRelType::from_xml("Married").code(), 0);
    }

    #[test]
    fn test_deceased_event_types() {
        assert!(EventType::new("Burial").marks_deceased());
        assert!(EventType::new("CREMATION").marks_deceased());
        assert!(!EventType::new("Cause Of Death").marks_deceased());
    }

    #[test]
    fn test_place_display_name() {
        let place = Place {
            handle: Handle::new("_p1"),
            gramps_id: "P0001".into(),
            name: " ".into(),
            title: "Uppsala, Sweden".into(),
        };
        assert_eq!(place.display_name(), Some("Uppsala, Sweden"));
    }
}
