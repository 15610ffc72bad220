use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

use history::export::ExportOptions;
use history::sample::{self, SampleOptions};
use history::{load_tree, save_snapshot, Config, DayKey, ThisDayGenerator};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/family.gramps")
}

fn read_day(dir: &Path, name: &str) -> Value {
    let text = fs::read_to_string(dir.join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// File name -> contents for every day file in a directory
fn day_files(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&p).unwrap())
        })
        .collect()
}

#[test]
fn test_gramps_export_end_to_end() {
    let out = tempfile::tempdir().unwrap();
    let tree = load_tree(&fixture()).unwrap();
    let mut generator = ThisDayGenerator::new(tree, &Config::default());
    let summary = generator.run(out.path(), &ExportOptions::default()).unwrap();

    assert_eq!(summary.files, 6);
    assert_eq!(summary.events, 7);
    // Erik, Karin and Nils; Anna is alive
    assert_eq!(generator.tree.deceased_count(), 3);

    let names: Vec<String> = day_files(out.path()).into_keys().collect();
    assert_eq!(
        names,
        vec![
            "events_02_22.json",
            "events_03_15.json",
            "events_06_24.json",
            "events_09_22.json",
            "events_11_02.json",
            "events_11_09.json",
        ]
    );

    let march = read_day(out.path(), "events_03_15.json");
    assert_eq!(
        march,
        json!([
            {
                "person_name": "Erik Holm",
                "gramps_id": "I0001",
                "event_type": "Birth",
                "year": 1790,
                "place": "Mora",
                "description": "Erik Holm was born in 1790 at Mora.",
                "handle_type": "Person",
                "handle": "_i1"
            },
            {
                "person_name": "Nils Ström",
                "gramps_id": "I0004",
                "event_type": "Birth",
                "year": "unknown",
                "place": "unknown location",
                "description": "Nils Ström was born in unknown at unknown location.",
                "handle_type": "Person",
                "handle": "_i4"
            }
        ])
    );

    // Julian birth lands eleven days later
    let feb = read_day(out.path(), "events_02_22.json");
    assert_eq!(feb[0]["description"], "Karin Lind was born in 1760 at unknown location.");

    // French Republican 1 Vendémiaire I
    let sept = read_day(out.path(), "events_09_22.json");
    assert_eq!(sept[0]["year"], 1792);
    assert_eq!(sept[0]["place"], "Mora");

    let wedding = read_day(out.path(), "events_06_24.json");
    assert_eq!(wedding.as_array().unwrap().len(), 1);
    assert_eq!(wedding[0]["person_name"], "Erik Holm and Karin Lind");
    assert_eq!(wedding[0]["gramps_id"], "I0001-I0002");
    assert_eq!(wedding[0]["handle_type"], "Family");
    assert_eq!(wedding[0]["handle"], "_f1");
    assert_eq!(
        wedding[0]["description"],
        "Erik Holm and Karin Lind got married in 1785 at Mora."
    );

    let burial = read_day(out.path(), "events_11_09.json");
    assert_eq!(burial[0]["place"], "Falun, Kopparbergs län");
}

#[test]
fn test_gzipped_database_reads_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let gz_path = dir.path().join("family.gramps");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&fs::read(fixture()).unwrap()).unwrap();
    fs::write(&gz_path, encoder.finish().unwrap()).unwrap();

    let plain = load_tree(&fixture()).unwrap();
    let packed = load_tree(&gz_path).unwrap();
    assert_eq!(plain.to_json().unwrap(), packed.to_json().unwrap());
}

#[test]
fn test_snapshots_export_identically() {
    let dir = tempfile::tempdir().unwrap();
    let tree = load_tree(&fixture()).unwrap();
    save_snapshot(&tree, &dir.path().join("tree.json")).unwrap();
    save_snapshot(&tree, &dir.path().join("tree.bin")).unwrap();

    let mut outputs = Vec::new();
    for source in [fixture(), dir.path().join("tree.json"), dir.path().join("tree.bin")] {
        let out = dir.path().join(format!("out_{}", outputs.len()));
        let tree = load_tree(&source).unwrap();
        ThisDayGenerator::new(tree, &Config::default())
            .run(&out, &ExportOptions::default())
            .unwrap();
        outputs.push(day_files(&out));
    }
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test]
fn test_configured_templates_and_filters() {
    let config = Config::from_toml(
        r#"
        [events]
        report = ["Birth", "Burial"]

        [labels]
        unknown_year = "okänt år"
        person = "Person"

        [templates.birth]
        male = "{name} föddes {year} i {place}."
        "#,
    )
    .unwrap();

    let out = tempfile::tempdir().unwrap();
    let mut generator = ThisDayGenerator::new(load_tree(&fixture()).unwrap(), &config);
    let summary = generator.run(out.path(), &ExportOptions::default()).unwrap();
    // births on 02-22 and 03-15, burial on 11-09
    assert_eq!(summary.files, 3);

    let march = read_day(out.path(), "events_03_15.json");
    assert_eq!(march[0]["description"], "Erik Holm föddes 1790 i Mora.");
    assert_eq!(march[1]["year"], "okänt år");
    // only the male text was overridden
    let feb = read_day(out.path(), "events_02_22.json");
    assert_eq!(feb[0]["description"], "Karin Lind was born in 1760 at unknown location.");
}

#[test]
fn test_sample_tree_pipeline() {
    let out = tempfile::tempdir().unwrap();
    let tree = sample::generate(&SampleOptions {
        people: 300,
        seed: 2024,
        deceased_ratio: 0.8,
    })
    .unwrap();

    let mut generator = ThisDayGenerator::new(tree, &Config::default());
    let summary = generator.run(out.path(), &ExportOptions::default()).unwrap();
    assert!(summary.files > 0 && summary.files <= 366);

    let valid: Vec<String> = DayKey::all().map(|k| k.file_name()).collect();
    let mut events = 0;
    for (name, text) in day_files(out.path()) {
        assert!(valid.contains(&name), "unexpected file {}", name);
        let entries: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert!(!entries.is_empty());
        for entry in &entries {
            assert!(entry["description"].as_str().unwrap().ends_with('.'));
            assert!(entry["handle"].as_str().unwrap().starts_with("_sample_"));
        }
        events += entries.len();
    }
    assert_eq!(events, summary.events);
}
