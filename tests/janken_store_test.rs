//! Tests for the reactive state store.

use janken::{Card, CardKind, GameConfig, GamePhase, GameStateStore, StatePatch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[test]
fn test_snapshots_survive_concurrent_writes() {
    let store = GameStateStore::new(&GameConfig::default());
    let snapshot = store.get_state();

    let writers: Vec<_> = (1..=4)
        .map(|round| {
            let store = store.clone();
            thread::spawn(move || {
                store.set_state(StatePatch::new().current_round(round));
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer thread");
    }

    assert_eq!(snapshot.current_round, 0);
    assert!((1..=4).contains(&store.get_state().current_round));
}

#[test]
fn test_every_write_notifies_every_listener() {
    let store = GameStateStore::new(&GameConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let calls = Arc::clone(&calls);
        store.subscribe(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    store.set_state(StatePatch::new().phase(GamePhase::Ready));
    store.set_state(StatePatch::new().current_round(1));
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[test]
fn test_unsubscribe_after_store_dropped_is_harmless() {
    let store = GameStateStore::new(&GameConfig::default());
    let subscription = store.subscribe(|_| {});
    drop(store);
    assert!(!subscription.unsubscribe());
}

#[test]
fn test_listeners_see_fully_formed_snapshots() {
    let store = GameStateStore::new(&GameConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |state| {
        sink.lock()
            .unwrap()
            .push((state.discard.len(), state.players[0].hand.len()));
    });

    let card = Card::new(CardKind::Paper, "card-1".into());
    let mut players = store.get_state().players.clone();
    players[0].hand.push(card.clone());
    store.set_state(StatePatch::new().players(players.clone()));

    players[0].hand.clear();
    store.set_state(StatePatch::new().players(players).discard(vec![card]));

    assert_eq!(*seen.lock().unwrap(), vec![(0, 1), (1, 0)]);
}

#[test]
fn test_try_update_rejection_changes_nothing() {
    let store = GameStateStore::new(&GameConfig::default());
    let before = store.get_state();
    let result = store.try_update(|state| {
        if state.phase == GamePhase::Ready {
            Ok(StatePatch::new().current_round(2))
        } else {
            Err("not ready")
        }
    });
    assert_eq!(result.unwrap_err(), "not ready");
    assert!(Arc::ptr_eq(&before, &store.get_state()));
}
