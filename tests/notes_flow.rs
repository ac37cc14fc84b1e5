use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use quicknote::view::{html::render_markup, EmptyReason};
use quicknote::{project, Clock, Limits, NoteId, NoteStore, NotesView, ValidationError, ViewOptions};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

#[derive(Clone)]
struct SteppingClock {
    now: Arc<Mutex<OffsetDateTime>>,
    step: Duration,
}

impl SteppingClock {
    fn new(step: Duration) -> Self {
        Self {
            now: Arc::new(Mutex::new(datetime!(2025-01-15 08:00:00 UTC))),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> OffsetDateTime {
        let mut now = self.now.lock().expect("clock lock");
        let current = *now;
        *now += self.step;
        current
    }
}

fn store(step: Duration) -> NoteStore {
    NoteStore::with_clock(Limits::default(), Box::new(SteppingClock::new(step)))
}

fn visible_titles(store: &NoteStore) -> Vec<String> {
    project(store, &ViewOptions::default())
        .cards()
        .iter()
        .map(|card| card.title.clone())
        .collect()
}

#[test]
fn groceries_example() -> anyhow::Result<()> {
    let mut store = store(Duration::seconds(1));
    store.create("Groceries", "Milk, eggs")?;

    store.search("gro");
    assert_eq!(visible_titles(&store), vec!["Groceries"]);

    store.search("xyz");
    let view = project(&store, &ViewOptions::default());
    assert_matches!(
        view,
        NotesView::Empty {
            reason: EmptyReason::NoMatches
        }
    );
    assert_eq!(
        render_markup(&view),
        "<p class=\"empty-state\">No notes match your search.</p>\n"
    );
    Ok(())
}

#[test]
fn valid_create_grows_by_one_and_leads_the_view() -> anyhow::Result<()> {
    let mut store = store(Duration::seconds(1));
    let titles = ["one", "two", "three", "four"];
    for (count, title) in titles.iter().enumerate() {
        let id = store.create(title, "body")?;
        assert_eq!(store.len(), count + 1);
        let view = project(&store, &ViewOptions::default());
        assert_eq!(view.cards()[0].id, id);
    }
    Ok(())
}

#[test]
fn invalid_input_is_rejected_for_create_and_update() -> anyhow::Result<()> {
    let mut store = store(Duration::seconds(1));
    let id = store.create("Stable", "content")?;
    let long_title = "t".repeat(121);
    let long_body = "b".repeat(5001);
    let cases: [(&str, &str, ValidationError); 4] = [
        ("", "body", ValidationError::TitleRequired),
        ("title", "", ValidationError::BodyRequired),
        (long_title.as_str(), "body", ValidationError::TitleTooLong { max: 120 }),
        ("title", long_body.as_str(), ValidationError::BodyTooLong { max: 5000 }),
    ];
    for (title, body, expected) in cases {
        assert_eq!(store.create(title, body), Err(expected.clone()));
        assert_eq!(store.update(&id, title, body), Err(expected));
    }
    assert_eq!(store.len(), 1);
    let note = store.get(&id).expect("note");
    assert_eq!((note.title.as_str(), note.body.as_str()), ("Stable", "content"));
    Ok(())
}

#[test]
fn update_keeps_identity_and_position() -> anyhow::Result<()> {
    let mut store = store(Duration::seconds(10));
    let first = store.create("first", "a")?;
    let second = store.create("second", "b")?;
    let third = store.create("third", "c")?;
    let before = store.get(&second).cloned().expect("note");

    assert!(store.update(&second, "second (edited)", "b2")?);

    let after = store.get(&second).expect("note");
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
    let order: Vec<NoteId> = store.iter().map(|n| n.id.clone()).collect();
    assert_eq!(order, vec![third, second, first]);
    Ok(())
}

#[test]
fn delete_and_unknown_ids() -> anyhow::Result<()> {
    let mut store = store(Duration::seconds(1));
    store.create("keep", "a")?;
    let gone = store.create("gone", "b")?;

    assert!(!store.delete(&NoteId::from("unknown")));
    assert_eq!(store.len(), 2);
    assert!(!store.update(&NoteId::from("unknown"), "t", "b")?);

    assert!(store.delete(&gone));
    assert_eq!(visible_titles(&store), vec!["keep"]);
    Ok(())
}

#[test]
fn empty_query_restores_collection_order() -> anyhow::Result<()> {
    let mut store = store(Duration::seconds(1));
    for title in ["Alpha", "beta", "ALPHABET"] {
        store.create(title, "x")?;
    }
    store.search("alpha");
    assert_eq!(visible_titles(&store), vec!["ALPHABET", "Alpha"]);
    store.search("");
    assert_eq!(visible_titles(&store), vec!["ALPHABET", "beta", "Alpha"]);
    Ok(())
}

#[test]
fn identical_update_round_trip() -> anyhow::Result<()> {
    let mut store = store(Duration::ZERO);
    let id = store.create("Same", "Same body")?;
    let before = store.get(&id).cloned().expect("note");
    assert!(store.update(&id, "Same", "Same body")?);
    let after = store.get(&id).expect("note");
    assert_eq!(after.title, before.title);
    assert_eq!(after.body, before.body);
    assert!(after.updated_at >= before.updated_at);
    Ok(())
}
