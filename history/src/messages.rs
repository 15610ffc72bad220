//! Message formatting
//!
//! Turns an [`EventRecord`] into one readable sentence. Templates are chosen
//! by lowercase event type and gender; marriages are further split by the
//! couple's relationship (`marriage0` .. `marriage4`).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::components::Gender;
use crate::config::{Config, Labels};
use crate::systems::{EventRecord, RecordKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub male: Option<String>,
    pub female: Option<String>,
}

impl Template {
    fn both(text: String) -> Self {
        Self {
            male: Some(text.clone()),
            female: Some(text),
        }
    }
}

/// Built-in wording, inserted between the name and the year
const BUILTIN: &[(&str, &str)] = &[
    ("adopted", "was adopted in"),
    ("adult christening", "was christened in"),
    ("alternate marriage", "was married in"),
    ("annulment", "received an annulment in"),
    ("baptism", "was baptized in"),
    ("bar mitzvah", "became a bar mitzvah in"),
    ("bat mitzvah", "became a bat mitzvah in"),
    ("birth", "was born in"),
    ("blessing", "was blessed in"),
    ("burial", "was buried in"),
    ("census", "participated in a census in"),
    ("christening", "was christened in"),
    ("confirmation", "was confirmed in"),
    ("cremation", "was cremated in"),
    ("death", "died in"),
    ("degree", "was awarded a degree in"),
    ("divorce", "was granted a divorce in"),
    ("divorce filing", "filed for divorce in"),
    ("elected", "was elected in"),
    ("emigration", "emigrated in"),
    ("engagement", "became engaged in"),
    ("first communion", "received first communion in"),
    ("graduation", "graduated in"),
    ("immigration", "immigrated in"),
    ("marriage0", "got married in"),
    ("marriage1", "joined as a family in"),
    ("marriage2", "entered a civil union in"),
    ("marriage3", "joined as a family in"),
    ("marriage4", "had a custom marriage in"),
    ("marriage banns", "announced a marriage banns in"),
    ("marriage contract", "entered a marriage contract in"),
    ("marriage license", "obtained a marriage license in"),
    ("marriage settlement", "obtained a marriage settlement in"),
    ("military service", "entered military service in"),
    ("naturalization", "became naturalized in"),
    ("nobility title", "had a title bestowed in"),
    ("ordination", "was ordained in"),
    ("probate", "was granted probate in"),
    ("retirement", "retired in"),
];

static DEFAULT_TEMPLATES: Lazy<HashMap<String, Template>> = Lazy::new(|| {
    BUILTIN
        .iter()
        .map(|(key, wording)| {
            let text = format!("{{name}} {} {{year}} at {{place}}.", wording);
            (key.to_string(), Template::both(text))
        })
        .collect()
});

/// Substitute `{name}`, `{year}` and `{place}` in one pass; inserted values
/// are never scanned again
fn fill(template: &str, name: &str, year: &str, place: &str) -> String {
    let placeholders = [("{name}", name), ("{year}", year), ("{place}", place)];
    let mut out = String::with_capacity(template.len() + name.len() + place.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholders.iter().find(|(tag, _)| tail.starts_with(tag)) {
            Some((tag, value)) => {
                out.push_str(value);
                rest = &tail[tag.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Built-in templates plus configured overrides
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: HashMap<String, Template>,
    labels: Labels,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.clone(),
            labels: Labels::default(),
        }
    }
}

impl MessageCatalog {
    /// Overrides replace the built-in text per gender; unknown keys are added
    pub fn from_config(config: &Config) -> Self {
        let mut templates = DEFAULT_TEMPLATES.clone();
        for (key, custom) in &config.templates {
            let entry = templates
                .entry(key.to_lowercase())
                .or_insert(Template {
                    male: None,
                    female: None,
                });
            if let Some(male) = &custom.male {
                entry.male = Some(male.clone());
            }
            if let Some(female) = &custom.female {
                entry.female = Some(female.clone());
            }
        }
        Self {
            templates,
            labels: config.labels.clone(),
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Year as written into messages and JSON
    pub fn year_text(&self, year: Option<i32>) -> String {
        match year {
            Some(year) => year.to_string(),
            None => self.labels.unknown_year.clone(),
        }
    }

    /// `handle_type` label of a record
    pub fn kind_label(&self, kind: RecordKind) -> &str {
        kind.label(&self.labels)
    }

    pub fn format(&self, record: &EventRecord) -> String {
        let mut key = record.event_type.key();
        if key == "marriage" {
            let code = record.extra_info.map(|rel| rel.code().to_string());
            key.push_str(code.as_deref().unwrap_or(""));
        }

        let year = self.year_text(record.year);
        let template = self.templates.get(&key).and_then(|t| {
            let female = match record.gender {
                Gender::Female => t.female.as_deref(),
                _ => None,
            };
            female.or(t.male.as_deref())
        });

        match template {
            Some(text) => fill(text, &record.name, &year, &record.place),
            None => format!(
                "{} experienced a {} event in {} at {}.",
                record.name, record.event_type, year, record.place
            ),
        }
    }
}
