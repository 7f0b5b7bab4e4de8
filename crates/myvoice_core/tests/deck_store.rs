use myvoice_core::db::{open_db, open_db_in_memory};
use myvoice_core::{
    apply_command, Card, CardDeckStore, CoreConfig, Deck, DeckCommand, DeckCommandError, DragEnd,
    FirstRunPolicy, HydrationSource, MemorySlotStore, SlotStore, SqliteSlotStore,
};

const KEY: &str = "aac-cards-storage";

fn card(id: &str) -> Card {
    Card::with_id(id, id.to_uppercase(), "Smile", "bg-slate-100")
}

fn store_with<'a>(slots: &'a MemorySlotStore, ids: &[&str]) -> CardDeckStore<&'a MemorySlotStore> {
    let deck: Deck = ids.iter().map(|id| card(id)).collect();
    slots.seed(KEY, &serde_json::to_string(&deck).unwrap());
    CardDeckStore::hydrate(slots, KEY, FirstRunPolicy::Empty)
}

fn persisted(slots: &MemorySlotStore) -> Deck {
    serde_json::from_str(&slots.read_slot(KEY).unwrap().unwrap()).unwrap()
}

#[test]
fn first_run_seeds_defaults_and_persists_them() {
    let slots = MemorySlotStore::new();
    let store = CardDeckStore::from_config(&slots, &CoreConfig::default());

    assert_eq!(store.hydration_source(), HydrationSource::FirstRun);
    assert_eq!(store.deck(), &Deck::defaults());
    assert_eq!(persisted(&slots), Deck::defaults());
}

#[test]
fn first_run_with_empty_policy_starts_empty() {
    let slots = MemorySlotStore::new();
    let store = CardDeckStore::hydrate(&slots, KEY, FirstRunPolicy::Empty);
    assert!(store.deck().is_empty());
}

#[test]
fn corrupt_slot_is_recovered_with_policy() {
    let slots = MemorySlotStore::new();
    slots.seed(KEY, "{not json");
    let store = CardDeckStore::hydrate(&slots, KEY, FirstRunPolicy::Defaults);

    assert_eq!(store.hydration_source(), HydrationSource::Recovered);
    assert_eq!(store.deck(), &Deck::defaults());
    assert_eq!(persisted(&slots), Deck::defaults());
}

#[test]
fn add_appends_and_persists() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a", "b"]);

    let deck = store.add(card("x")).unwrap();
    assert_eq!(deck.ids(), ["a", "b", "x"]);
    assert_eq!(persisted(&slots).ids(), ["a", "b", "x"]);
}

#[test]
fn add_rejects_duplicate_id_without_writing() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a"]);
    let writes_before = slots.write_count();

    let err = store.add(card("a")).unwrap_err();
    assert_eq!(err, DeckCommandError::DuplicateId("a".to_string()));
    assert_eq!(store.deck().ids(), ["a"]);
    assert_eq!(slots.write_count(), writes_before);
}

#[test]
fn remove_drops_only_the_target_and_keeps_order() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a", "b", "c", "d"]);

    let deck = store.remove("b");
    assert_eq!(deck.len(), 3);
    assert_eq!(deck.ids(), ["a", "c", "d"]);
    assert_eq!(persisted(&slots).ids(), ["a", "c", "d"]);
}

#[test]
fn reorder_is_a_single_slot_move_not_a_swap() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["A", "B", "C"]);

    assert_eq!(store.reorder("A", "C").ids(), ["B", "C", "A"]);
    assert_eq!(store.reorder("B", "A").ids(), ["C", "A", "B"]);
    assert_eq!(persisted(&slots).ids(), ["C", "A", "B"]);
}

#[test]
fn unknown_ids_and_self_moves_leave_deck_unchanged() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["water"]);
    let before = store.deck().clone();

    assert_eq!(store.reorder("water", "water"), &before);
    assert_eq!(store.remove("ghost"), &before);
    assert_eq!(store.reorder("ghost", "water"), &before);
}

#[test]
fn reset_is_idempotent() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a"]);

    let once = store.reset().clone();
    let twice = store.reset().clone();
    assert_eq!(once, Deck::defaults());
    assert_eq!(once, twice);
}

#[test]
fn dispatch_routes_commands() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a", "b"]);

    store.dispatch(DeckCommand::Add(card("c"))).unwrap();
    store
        .dispatch(DeckCommand::Reorder {
            active_id: "c".to_string(),
            over_id: "a".to_string(),
        })
        .unwrap();
    store.dispatch(DeckCommand::Remove("b".to_string())).unwrap();
    assert_eq!(store.deck().ids(), ["c", "a"]);
}

#[test]
fn drag_end_without_target_is_ignored() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a", "b"]);

    store.apply_drag_end(&DragEnd {
        active_id: "a".to_string(),
        over_id: None,
    });
    assert_eq!(store.deck().ids(), ["a", "b"]);

    store.apply_drag_end(&DragEnd {
        active_id: "a".to_string(),
        over_id: Some("b".to_string()),
    });
    assert_eq!(store.deck().ids(), ["b", "a"]);
}

#[test]
fn write_failures_do_not_block_mutations() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a"]);
    slots.set_fail_writes(true);

    let deck = store.add(card("b")).unwrap();
    assert_eq!(deck.ids(), ["a", "b"]);
    assert_eq!(persisted(&slots).ids(), ["a"]);
}

#[test]
fn sqlite_slot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.db");

    {
        let conn = open_db(&path).unwrap();
        let mut store = CardDeckStore::hydrate(SqliteSlotStore::new(&conn), KEY, FirstRunPolicy::Defaults);
        store.remove("water");
        store.reorder("no", "food");
    }

    let conn = open_db(&path).unwrap();
    let store = CardDeckStore::hydrate(SqliteSlotStore::new(&conn), KEY, FirstRunPolicy::Defaults);
    assert_eq!(store.hydration_source(), HydrationSource::Persisted);
    assert_eq!(store.deck().ids(), ["no", "food", "rest", "help", "yes"]);
}

#[test]
fn persisted_layout_uses_icon_name_field() {
    let conn = open_db_in_memory().unwrap();
    let slots = SqliteSlotStore::new(&conn);
    let _store = CardDeckStore::hydrate(&slots, KEY, FirstRunPolicy::Defaults);

    let raw = slots.read_slot(KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["id"], "water");
    assert_eq!(value[0]["iconName"], "GlassWater");
}

#[test]
fn wrappers_match_pure_command_results_and_persist() {
    let slots = MemorySlotStore::new();
    let mut store = store_with(&slots, &["a", "b", "c"]);
    let commands = [
        DeckCommand::Reorder {
            active_id: "c".to_string(),
            over_id: "a".to_string(),
        },
        DeckCommand::Remove("b".to_string()),
        DeckCommand::Reset,
    ];

    let mut expected = store.deck().clone();
    for command in &commands {
        expected = apply_command(&expected, command).unwrap();
        let writes_before = slots.write_count();
        let deck = match command {
            DeckCommand::Reorder { active_id, over_id } => store.reorder(active_id, over_id),
            DeckCommand::Remove(id) => store.remove(id),
            DeckCommand::Reset => store.reset(),
            DeckCommand::Add(_) => unreachable!(),
        }
        .clone();
        assert_eq!(deck, expected);
        assert_eq!(persisted(&slots), expected);
        assert_eq!(slots.write_count(), writes_before + 1);
    }
}
