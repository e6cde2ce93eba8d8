//! Integration tests for the alarmtab public API.
//!
//! Drives `Store`, `Session`, and the codec through the crate root against tempdir-backed
//! files and checks the file-level guarantees: what each operation writes, what it leaves
//! untouched, and what listing returns afterwards.

use alarmtab::codec::{self, BOM, VERSION_STAMP};
use alarmtab::{AlarmEntry, Error, Outcome, Record, SCHEMA, SCHEMA_LEN, Session, Store};

/// Helper: a full record built from an id and message, the way an entry form would.
fn record(id: &str, message: &str) -> Record {
    AlarmEntry {
        id: id.to_string(),
        details1: format!("PLC_PRG.bAlarm{id}"),
        message: message.to_string(),
        ..AlarmEntry::default()
    }
    .into_record()
}

fn ids(store: &Store) -> Vec<String> {
    store
        .list_data_records()
        .iter()
        .map(|r| r.id().to_string())
        .collect()
}

#[test]
fn fresh_file_decodes_to_version_and_header() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("x.csv");

    codec::create_fresh(&path).expect("create_fresh should succeed");
    let lines = codec::decode_all(&path);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].fields[0], VERSION_STAMP);
    assert!(lines[0].fields[1..].iter().all(String::is_empty));
    assert_eq!(lines[0].fields.len(), SCHEMA_LEN);
    assert_eq!(lines[1].fields, SCHEMA.to_vec());
}

#[test]
fn append_to_missing_path_yields_exactly_that_record() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("missing.csv");
    let store = Store::new(&path);
    let r = record("1", "first");

    store.append(&r).expect("append should succeed");

    let lines = codec::decode_all(&path);
    assert_eq!(lines.len(), 2, "header line plus the record");
    assert_eq!(lines[0].fields, SCHEMA.to_vec());
    assert_eq!(lines[1], r);
    assert_eq!(store.list_data_records(), vec![r]);
}

#[test]
fn append_new_id_grows_list_by_one() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    for fresh in [true, false] {
        let path = dir.path().join(format!("grow-{fresh}.csv"));
        let store = if fresh {
            Store::create(&path).expect("create")
        } else {
            Store::open(&path).expect("open")
        };

        for (n, id) in ["5", "abc", "12", "x y"].into_iter().enumerate() {
            assert!(!store.exists(id, None));
            let before = store.list_data_records().len();

            store.append(&record(id, "m")).expect("append");

            assert!(store.exists(id, None), "{id} should exist after append");
            assert_eq!(store.list_data_records().len(), before + 1);
            assert_eq!(before, n);
        }
    }
}

#[test]
fn update_keeps_count_and_replaces_id() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let store = Store::create(dir.path().join("alarms.csv")).expect("create");
    for id in ["1", "2", "3"] {
        store.append(&record(id, id)).expect("append");
    }
    let replacement = record("30", "renamed");

    store.update("3", replacement.clone()).expect("update");

    let records = store.list_data_records();
    assert_eq!(records.len(), 3);
    assert_eq!(records.iter().filter(|r| **r == replacement).count(), 1);
    assert!(!store.exists("3", None));
}

#[test]
fn remove_existing_and_missing() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let store = Store::create(dir.path().join("alarms.csv")).expect("create");
    for id in ["1", "2"] {
        store.append(&record(id, id)).expect("append");
    }

    store.remove("1").expect("remove");
    assert_eq!(ids(&store), vec!["2"]);

    let before = std::fs::read(store.path()).expect("read");
    let err = store.remove("1").unwrap_err();
    assert_eq!(err.outcome(), Outcome::NotFound);
    assert_eq!(std::fs::read(store.path()).expect("read"), before);
}

#[test]
fn encode_decode_round_trip_of_sanitized_records() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("alarms.csv");
    let messages = [
        "plain",
        "with \"quotes\" inside",
        "multi\r\nline",
        "unicode: Störung \u{26A0}",
        "",
    ];
    let mut lines = vec![
        codec::parse_line(&codec::version_line()),
        Record::new(SCHEMA),
    ];
    for (i, message) in messages.iter().enumerate() {
        lines.push(record(&i.to_string(), message));
    }

    codec::encode_all(&path, &lines).expect("encode_all");

    assert_eq!(codec::decode_all(&path), lines);
}

#[test]
fn only_create_fresh_writes_a_bom() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let fresh = dir.path().join("fresh.csv");
    let ensured = dir.path().join("ensured.csv");

    codec::create_fresh(&fresh).expect("create_fresh");
    codec::ensure_initialized(&ensured).expect("ensure_initialized");

    assert_eq!(&std::fs::read(&fresh).expect("read")[..2], &BOM);
    assert_ne!(&std::fs::read(&ensured).expect("read")[..2], &BOM);
}

#[test]
fn display_rows_follow_numeric_then_text_order() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let store = Store::create(dir.path().join("alarms.csv")).expect("create");
    for id in ["10", "2", "abc", "1"] {
        store.append(&record(id, id)).expect("append");
    }

    let rows = store.display_rows();

    let order: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["1", "2", "10", "abc"]);
    assert_eq!(rows[0].condition, "PLC_PRG.bAlarm1 = TRUE");
    assert_eq!(ids(&store), vec!["10", "2", "abc", "1"], "file order unchanged");
}

#[test]
fn session_workflow_add_edit_delete() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("alarms.csv");
    let mut session = Session::new();
    session.create(&path).expect("create");

    session
        .add(AlarmEntry {
            id: "100".into(),
            details1: "GVL.bEstop".into(),
            class: "Error".into(),
            message: "Emergency stop".into(),
            ..AlarmEntry::default()
        })
        .expect("add");
    session.add(AlarmEntry::with_id("7")).expect("add");

    let dup = session.add(AlarmEntry::with_id("7")).unwrap_err();
    assert!(matches!(dup, Error::DuplicateId { .. }));
    assert_eq!(dup.outcome(), Outcome::DuplicateId);

    let mut edited = session.begin_edit("7").expect("begin_edit");
    edited.message = "Guard door open".into();
    edited.class = "Warning".into();
    session.save(edited).expect("save");

    let rows = session.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "7");
    assert_eq!(rows[0].class, "Warning");
    assert_eq!(rows[0].message, "Guard door open");
    assert_eq!(rows[1].condition, "GVL.bEstop = TRUE");

    session.delete("100").expect("delete");
    assert_eq!(session.rows().len(), 1);

    let lines = codec::decode_all(&path);
    assert_eq!(lines[0].id(), VERSION_STAMP, "version line survives rewrites");
    assert_eq!(lines[1].fields, SCHEMA.to_vec(), "header survives rewrites");
}
