use nesplay_core::{ActionHistory, ActionName, GameState, HistoryEntry};

#[test]
fn test_capacity_plus_one_evicts_oldest() {
    for capacity in [1usize, 3, 10] {
        let mut history = ActionHistory::new(capacity);
        for i in 0..=capacity {
            history.push(HistoryEntry::new(format!("cycle {}", i)));
        }

        assert_eq!(history.len(), capacity);
        let expected: Vec<String> = (1..=capacity).map(|i| format!("cycle {}", i)).collect();
        assert_eq!(history.snapshot(), expected);
    }
}

#[test]
fn test_snapshot_is_detached() {
    let mut history = ActionHistory::new(3);
    history.push(HistoryEntry::new("first"));

    let snapshot = history.snapshot();
    history.push(HistoryEntry::new("second"));

    assert_eq!(snapshot, vec!["first"]);
    assert_eq!(history.len(), 2);
}

#[test]
fn test_mixed_entries_keep_order() {
    let state = GameState::parse("hp=15\nmp=0\ngold=120\n").unwrap();
    let mut history = ActionHistory::new(3);

    history.push(HistoryEntry::executed(&ActionName::new("MOVE_UP"), &state));
    history.push(HistoryEntry::failed("unknown action 'FLY'"));
    history.push(HistoryEntry::executed(&ActionName::new("TALK"), &state));
    history.push(HistoryEntry::executed(&ActionName::new("SEARCH"), &state));

    assert_eq!(
        history.snapshot(),
        vec![
            "Macro execution failed: unknown action 'FLY'",
            "Action: TALK, HP: 15",
            "Action: SEARCH, HP: 15",
        ]
    );
}
