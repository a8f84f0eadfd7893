use saathi_voice::store::{ActivityKind, JsonStore, Note, NoteLength, HISTORY_CAP};

#[test]
fn history_is_capped_and_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    for i in 0..60 {
        store
            .record_activity(&format!("activity {}", i), ActivityKind::Practice)
            .unwrap();
    }

    let history = store.history().unwrap();
    assert_eq!(history.len(), HISTORY_CAP);
    assert_eq!(history[0].action, "activity 59", "newest entry comes first");
    assert_eq!(history[49].action, "activity 10", "oldest surviving entry is the cap boundary");
}

#[test]
fn clear_history_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    store.record_activity("one", ActivityKind::Voice).unwrap();
    store.record_activity("two", ActivityKind::Note).unwrap();
    store.clear_history().unwrap();

    assert!(store.history().unwrap().is_empty());
}

#[test]
fn notes_prepend_and_delete_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let first = Note::new(
        "Photosynthesis".into(),
        "Biology".into(),
        "Light reactions...".into(),
        NoteLength::Short,
    );
    let second = Note::new(
        "Ohm's law".into(),
        "Physics".into(),
        "V = IR".into(),
        NoteLength::Moderate,
    );

    store.add_note(first.clone()).unwrap();
    store.add_note(second.clone()).unwrap();

    let notes = store.notes().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, second.id, "newest note comes first");

    store.delete_note(&second.id).unwrap();
    let notes = store.notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, first.id);

    // Deleting an unknown id is a no-op
    store.delete_note("no-such-id").unwrap();
    assert_eq!(store.notes().unwrap().len(), 1);
}

#[test]
fn records_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = JsonStore::open(dir.path()).unwrap();
        store
            .add_note(Note::new(
                "Trigonometry".into(),
                "Maths".into(),
                "sin² + cos² = 1".into(),
                NoteLength::Long,
            ))
            .unwrap();
        store.record_activity("Saved a note", ActivityKind::Note).unwrap();
    }

    let store = JsonStore::open(dir.path()).unwrap();
    assert_eq!(store.notes().unwrap().len(), 1);
    assert_eq!(store.history().unwrap().len(), 1);
    assert_eq!(store.history().unwrap()[0].kind, ActivityKind::Note);
}

#[test]
fn empty_store_reads_as_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    assert!(store.notes().unwrap().is_empty());
    assert!(store.history().unwrap().is_empty());
}
