//! Gramps XML reader
//!
//! Streams the Gramps XML interchange format (`.gramps`, optionally
//! gzip-compressed) into a [`FamilyTree`]. Only the parts the exporter
//! needs are read: people, families, events and places.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::calendar::{Calendar, DateValue};
use crate::components::*;
use crate::error::{HistoryError, Result};
use crate::tree::FamilyTree;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a Gramps XML file, inflating it when gzip-compressed
pub fn read_file(path: &Path) -> Result<FamilyTree> {
    let file = File::open(path).map_err(|e| HistoryError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let compressed = reader
        .fill_buf()
        .map_err(|e| HistoryError::io(path, e))?
        .starts_with(&GZIP_MAGIC);

    debug!("Reading {} (gzip: {})", path.display(), compressed);
    if compressed {
        read(BufReader::new(GzDecoder::new(reader)))
    } else {
        read(reader)
    }
}

// ============================================================================
// Object builders
// ============================================================================

#[derive(Default)]
struct PersonBuilder {
    handle: String,
    gramps_id: String,
    gender: Option<Gender>,
    name: Option<PersonName>,
    events: Vec<Handle>,
    // Primary name being read, with its surnames and prim flags
    reading_name: Option<(PersonName, Vec<(String, bool)>)>,
    surname_prim: bool,
}

#[derive(Default)]
struct FamilyBuilder {
    handle: String,
    gramps_id: String,
    father: Option<Handle>,
    mother: Option<Handle>,
    relationship: Option<FamilyRelType>,
    events: Vec<Handle>,
}

#[derive(Default)]
struct EventBuilder {
    handle: String,
    gramps_id: String,
    event_type: String,
    date: Option<DateValue>,
    place: Option<Handle>,
    description: String,
}

#[derive(Default)]
struct PlaceBuilder {
    handle: String,
    gramps_id: String,
    name: Option<String>,
    title: String,
}

enum Current {
    Nothing,
    Person(PersonBuilder),
    Family(FamilyBuilder),
    Event(EventBuilder),
    Place(PlaceBuilder),
}

/// Elements whose character data we keep
const TEXT_ELEMENTS: &[&str] = &[
    "gender",
    "first",
    "surname",
    "suffix",
    "type",
    "description",
    "ptitle",
];

struct TreeReader {
    tree: FamilyTree,
    current: Current,
    stack: Vec<String>,
    text: String,
}

/// Read a Gramps XML document
pub fn read<R: BufRead>(input: R) -> Result<FamilyTree> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut state = TreeReader {
        tree: FamilyTree::new(),
        current: Current::Nothing,
        stack: Vec::new(),
        text: String::new(),
    };

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            XmlEvent::Start(ref e) => {
                let name = local_name(e);
                state.start(&name, e)?;
                state.stack.push(name);
            }
            XmlEvent::Empty(ref e) => {
                let name = local_name(e);
                state.start(&name, e)?;
                state.stack.push(name.clone());
                state.end(&name);
                state.stack.pop();
            }
            XmlEvent::Text(ref t) => {
                if state.capturing() {
                    state.text.push_str(&t.unescape()?);
                }
            }
            XmlEvent::CData(ref c) => {
                if state.capturing() {
                    state.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            XmlEvent::End(_) => {
                if let Some(name) = state.stack.last().cloned() {
                    state.end(&name);
                    state.stack.pop();
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let tree = state.tree;
    info!(
        "Loaded {} people, {} families, {} events, {} places",
        tree.person_count(),
        tree.family_count(),
        tree.event_count(),
        tree.place_count()
    );
    Ok(tree)
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attr(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    match e.try_get_attribute(key)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn hlink(e: &BytesStart) -> Result<Option<Handle>> {
    Ok(attr(e, b"hlink")?.map(Handle))
}

impl TreeReader {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn capturing(&self) -> bool {
        self.parent()
            .map(|name| TEXT_ELEMENTS.contains(&name))
            .unwrap_or(false)
    }

    fn start(&mut self, name: &str, e: &BytesStart) -> Result<()> {
        if TEXT_ELEMENTS.contains(&name) {
            self.text.clear();
        }
        let parent = self.parent().map(str::to_string);
        let parent = parent.as_deref();

        match name {
            "person" => {
                self.current = Current::Person(PersonBuilder {
                    handle: attr(e, b"handle")?.unwrap_or_default(),
                    gramps_id: attr(e, b"id")?.unwrap_or_default(),
                    ..PersonBuilder::default()
                });
                return Ok(());
            }
            "family" => {
                self.current = Current::Family(FamilyBuilder {
                    handle: attr(e, b"handle")?.unwrap_or_default(),
                    gramps_id: attr(e, b"id")?.unwrap_or_default(),
                    ..FamilyBuilder::default()
                });
                return Ok(());
            }
            "event" => {
                self.current = Current::Event(EventBuilder {
                    handle: attr(e, b"handle")?.unwrap_or_default(),
                    gramps_id: attr(e, b"id")?.unwrap_or_default(),
                    ..EventBuilder::default()
                });
                return Ok(());
            }
            "placeobj" => {
                self.current = Current::Place(PlaceBuilder {
                    handle: attr(e, b"handle")?.unwrap_or_default(),
                    gramps_id: attr(e, b"id")?.unwrap_or_default(),
                    ..PlaceBuilder::default()
                });
                return Ok(());
            }
            _ => {}
        }

        match &mut self.current {
            Current::Person(p) => match (name, parent) {
                ("name", Some("person")) => {
                    let alternate = attr(e, b"alt")?.as_deref() == Some("1");
                    if p.name.is_none() && !alternate {
                        p.reading_name = Some((PersonName::default(), Vec::new()));
                    }
                }
                ("surname", Some("name")) => {
                    p.surname_prim = attr(e, b"prim")?.as_deref() != Some("0");
                }
                ("eventref", Some("person")) => {
                    if let Some(handle) = hlink(e)? {
                        p.events.push(handle);
                    }
                }
                _ => {}
            },
            Current::Family(f) => match (name, parent) {
                ("rel", _) => {
                    f.relationship = attr(e, b"type")?.map(|t| FamilyRelType::from_xml(&t));
                }
                ("father", _) => f.father = hlink(e)?,
                ("mother", _) => f.mother = hlink(e)?,
                ("eventref", Some("family")) => {
                    if let Some(handle) = hlink(e)? {
                        f.events.push(handle);
                    }
                }
                _ => {}
            },
            Current::Event(ev) => match (name, parent) {
                ("dateval", Some("event")) => {
                    let calendar = Calendar::from_xml(&attr(e, b"cformat")?.unwrap_or_default());
                    let value = attr(e, b"val")?.unwrap_or_default();
                    ev.date = Some(DateValue::parse(calendar, &value));
                }
                ("daterange", Some("event")) | ("datespan", Some("event")) => {
                    let calendar = Calendar::from_xml(&attr(e, b"cformat")?.unwrap_or_default());
                    let value = attr(e, b"start")?.unwrap_or_default();
                    ev.date = Some(DateValue::parse(calendar, &value));
                }
                ("datestr", Some("event")) => ev.date = Some(DateValue::text()),
                ("place", Some("event")) => ev.place = hlink(e)?,
                _ => {}
            },
            Current::Place(pl) => {
                if let ("pname", Some("placeobj")) = (name, parent) {
                    if pl.name.is_none() {
                        pl.name = attr(e, b"value")?;
                    }
                }
            }
            Current::Nothing => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &str) {
        let text = std::mem::take(&mut self.text).trim().to_string();
        let parent = self
            .stack
            .len()
            .checked_sub(2)
            .map(|i| self.stack[i].clone());
        let parent = parent.as_deref();

        match name {
            "person" => {
                if let Current::Person(p) = std::mem::replace(&mut self.current, Current::Nothing) {
                    self.finish_person(p);
                }
                return;
            }
            "family" => {
                if let Current::Family(f) = std::mem::replace(&mut self.current, Current::Nothing) {
                    self.finish_family(f);
                }
                return;
            }
            "event" => {
                if let Current::Event(ev) = std::mem::replace(&mut self.current, Current::Nothing) {
                    self.finish_event(ev);
                }
                return;
            }
            "placeobj" => {
                if let Current::Place(pl) = std::mem::replace(&mut self.current, Current::Nothing) {
                    self.finish_place(pl);
                }
                return;
            }
            _ => {}
        }

        match &mut self.current {
            Current::Person(p) => match (name, parent) {
                ("gender", Some("person")) => p.gender = Some(Gender::from_xml(&text)),
                ("name", Some("person")) => {
                    if let Some((mut name, surnames)) = p.reading_name.take() {
                        name.surname = surnames
                            .iter()
                            .find(|(_, prim)| *prim)
                            .or_else(|| surnames.first())
                            .map(|(s, _)| s.clone())
                            .unwrap_or_default();
                        p.name = Some(name);
                    }
                }
                (field, Some("name")) => {
                    if let Some((name, surnames)) = p.reading_name.as_mut() {
                        match field {
                            "first" => name.first = text,
                            "suffix" => name.suffix = text,
                            "surname" => surnames.push((text, p.surname_prim)),
                            _ => {}
                        }
                    }
                }
                _ => {}
            },
            Current::Event(ev) => match (name, parent) {
                ("type", Some("event")) => ev.event_type = text,
                ("description", Some("event")) => ev.description = text,
                _ => {}
            },
            Current::Place(pl) => {
                if let ("ptitle", Some("placeobj")) = (name, parent) {
                    pl.title = text;
                }
            }
            Current::Family(_) | Current::Nothing => {}
        }
    }

    fn finish_person(&mut self, p: PersonBuilder) {
        let person = Person {
            handle: Handle(p.handle),
            gramps_id: p.gramps_id,
            name: p.name.unwrap_or_default(),
            gender: p.gender.unwrap_or(Gender::Unknown),
        };
        self.tree.add_person(person, p.events);
    }

    fn finish_family(&mut self, f: FamilyBuilder) {
        let family = Family {
            handle: Handle(f.handle),
            gramps_id: f.gramps_id,
            father: f.father,
            mother: f.mother,
            relationship: f.relationship.unwrap_or(FamilyRelType::Unknown),
        };
        self.tree.add_family(family, f.events);
    }

    fn finish_event(&mut self, ev: EventBuilder) {
        let event = Event {
            handle: Handle(ev.handle),
            gramps_id: ev.gramps_id,
            event_type: EventType(ev.event_type),
            date: ev.date.unwrap_or_default(),
            place: ev.place,
            description: ev.description,
        };
        self.tree.add_event(event);
    }

    fn finish_place(&mut self, pl: PlaceBuilder) {
        let place = Place {
            handle: Handle(pl.handle),
            gramps_id: pl.gramps_id,
            name: pl.name.unwrap_or_default(),
            title: pl.title,
        };
        self.tree.add_place(place);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<database xmlns="http://gramps-project.org/xml/1.7.1/">
  <events>
    <event handle="_e1" id="E0001">
      <type>Birth</type>
      <dateval val="1820-02-11" cformat="Julian"/>
      <place hlink="_p1"/>
      <citationref hlink="_c1"/>
    </event>
    <event handle="_e2" id="E0002">
      <type>Death</type>
      <datestr val="sometime in winter"/>
    </event>
    <event handle="_e3" id="E0003">
      <type>Marriage</type>
      <daterange start="1845-06-01" stop="1845-06-30"/>
      <description>Wedding of Per &amp; Stina</description>
    </event>
  </events>
  <people>
    <person handle="_i1" change="0" id="I0001">
      <gender>M</gender>
      <name type="Birth Name">
        <first>Per</first>
        <surname prim="0">Olsson</surname>
        <surname>Andersson</surname>
        <suffix>Jr</suffix>
      </name>
      <name alt="1" type="Also Known As">
        <first>Pelle</first>
      </name>
      <eventref hlink="_e1" role="Primary"/>
      <eventref hlink="_e2" role="Primary"/>
    </person>
    <person handle="_i2" id="I0002">
      <gender>F</gender>
      <name type="Birth Name"><first>Stina</first><surname>Berg</surname></name>
    </person>
  </people>
  <families>
    <family handle="_f1" id="F0001">
      <rel type="Civil Union"/>
      <father hlink="_i1"/>
      <mother hlink="_i2"/>
      <eventref hlink="_e3" role="Family"/>
    </family>
  </families>
  <places>
    <placeobj handle="_p1" id="P0001" type="Parish">
      <ptitle>Ovikens socken</ptitle>
      <pname value="Oviken"/>
      <pname value="Ovikens församling"/>
      <dateval val="1600"/>
    </placeobj>
  </places>
</database>"#;

    #[test]
    fn test_read_document() {
        let tree = read(DOC.as_bytes()).unwrap();
        assert_eq!(tree.person_count(), 2);
        assert_eq!(tree.family_count(), 1);
        assert_eq!(tree.event_count(), 3);
        assert_eq!(tree.place_count(), 1);

        let per = tree.person(&Handle::new("_i1")).unwrap();
        assert_eq!(per.gramps_id, "I0001");
        assert_eq!(per.gender, Gender::Male);
        assert_eq!(per.name.regular_name(), "Per Andersson, Jr");
        drop(per);

        let birth = tree.event(&Handle::new("_e1")).unwrap();
        assert_eq!(birth.event_type.as_str(), "Birth");
        assert_eq!(birth.date, DateValue::new(Calendar::Julian, 1820, 2, 11));
        assert_eq!(tree.place_name(&birth).as_deref(), Some("Oviken"));
        drop(birth);

        assert!(!tree.event(&Handle::new("_e2")).unwrap().date.is_valid());

        let marriage = tree.event(&Handle::new("_e3")).unwrap();
        assert_eq!(marriage.date, DateValue::gregorian(1845, 6, 1));
        assert_eq!(marriage.description, "Wedding of Per & Stina");
    }

    #[test]
    fn test_family_links() {
        let tree = read(DOC.as_bytes()).unwrap();
        let entity = tree.families()[0];
        let family = tree.world.get::<&Family>(entity).unwrap();
        assert_eq!(family.relationship, FamilyRelType::CivilUnion);
        assert_eq!(family.father, Some(Handle::new("_i1")));
        assert_eq!(family.mother, Some(Handle::new("_i2")));
        drop(family);
        assert_eq!(tree.events_of(entity).len(), 1);
    }

    #[test]
    fn test_rejects_malformed_xml() {
        let result = read("<database><people><person></people>".as_bytes());
        assert!(matches!(result, Err(HistoryError::Xml(_))));
    }
}
