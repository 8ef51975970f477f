//! Error handling and edge case tests.

use eventpvp_config::{
    Category, ConnectionState, EditorConfig, EditorError, EditorEvent, EditorSession,
    FileSnapshotStore, LoadOutcome, MemoryBackend, SaveOutcome, Snapshots, SubscriptionFilter,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn demo_session() -> (EditorSession, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::demo());
    let mut session = EditorSession::new(
        EditorConfig::default(),
        backend.clone(),
        Snapshots::in_memory(),
    );
    assert!(session.init());
    (session, backend)
}

// --- History Errors ---

#[test]
fn test_undo_without_changes() {
    let (mut session, _) = demo_session();
    assert!(matches!(session.undo(), Err(EditorError::NothingToUndo)));
    assert!(matches!(session.redo(), Err(EditorError::NothingToRedo)));
}

#[test]
fn test_missing_snapshot_leaves_cursor_untouched() {
    let (mut session, _) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());
    session.update_web_config("web.port", json!(9090)).unwrap();
    session.snapshots().clear_documents().unwrap();

    let result = session.undo();
    assert!(matches!(result, Err(EditorError::NoSnapshot(Category::Settings))));
    assert_eq!(session.log().cursor(), Some(0));
    assert_eq!(session.document(Category::Web)["web"]["port"], json!(9090));
    assert_eq!(toasts.drain_toast_keys(), vec!["error.noBackup"]);
}

#[test]
fn test_corrupt_snapshot_blocks_replay() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MemoryBackend::demo());
    let store = FileSnapshotStore::open(dir.path()).unwrap();
    let mut session = EditorSession::new(
        EditorConfig::default(),
        backend,
        Snapshots::new(Arc::new(store)),
    );
    session.init();
    session.delete_world("arena_world").unwrap();

    // Flip one content byte of the settings snapshot.
    let path = dir.path().join("config_backup.snap");
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[14] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    assert!(matches!(
        session.undo(),
        Err(EditorError::ChecksumMismatch { .. })
    ));
    assert!(session.can_undo());
    assert!(session.worlds_view().is_empty_state());
}

// --- Sync Errors ---

#[test]
fn test_partial_save_keeps_log() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());
    backend.fail_save(Category::Worlds, true);

    session.update_config("settings.auto-events.enabled", json!(true)).unwrap();
    session.delete_world("arena_world").unwrap();
    toasts.drain();

    let outcome = session.save_all();
    assert_eq!(
        outcome,
        SaveOutcome::Partial {
            saved: vec![Category::Settings],
            failed: vec![Category::Worlds]
        }
    );
    assert_eq!(session.log().len(), 2);
    assert!(session.has_unsaved_changes());
    assert_eq!(toasts.drain_toast_keys(), vec!["error.savePartial"]);

    // Snapshots still hold the last loaded state, so undo still works.
    let base = session.snapshots().base_documents().unwrap();
    assert_eq!(base.get(Category::Worlds)["worlds"]["arena_world"]["build-allowed"], json!(false));
    session.undo().unwrap();
    assert_eq!(session.worlds_view().cards().len(), 1);

    // Once the failure clears, a retry sends both documents again.
    backend.fail_save(Category::Worlds, false);
    session.redo().unwrap();
    assert!(matches!(session.save_all(), SaveOutcome::Saved { .. }));
    assert!(session.log().is_empty());
}

#[test]
fn test_offline_save_fails_everything() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());
    session.update_web_config("web.port", json!(1)).unwrap();
    backend.set_offline(true);

    assert_eq!(
        session.save_all(),
        SaveOutcome::Partial {
            saved: vec![],
            failed: vec![Category::Web]
        }
    );
    assert_eq!(toasts.drain_toast_keys(), vec!["error.saveFailed"]);
    assert_eq!(session.log().len(), 1);
}

#[test]
fn test_failed_category_keeps_previous_document() {
    let (mut session, backend) = demo_session();
    let before = session.document(Category::Worlds).clone();

    backend.set_document(Category::Worlds, json!({"worlds": {}}));
    backend.fail_fetch(Category::Worlds, true);
    backend.set_document(Category::Web, json!({"web": {"port": 2}}));

    match session.load_all() {
        LoadOutcome::Applied { loaded, failed } => {
            assert_eq!(failed, vec![Category::Worlds]);
            assert_eq!(loaded.len(), 3);
        }
        LoadOutcome::Stale => panic!("load was stale"),
    }
    assert_eq!(session.document(Category::Worlds), &before);
    assert_eq!(session.document(Category::Web)["web"]["port"], json!(2));
    assert!(session.log().is_empty());
    assert!(!session.has_unsaved_changes());
    assert_eq!(
        session.snapshots().base_documents().unwrap(),
        *session.docs()
    );
}

#[test]
fn test_offline_load_keeps_pending_changes() {
    let (mut session, backend) = demo_session();
    session.update_web_config("web.port", json!(9999)).unwrap();
    backend.set_offline(true);

    session.load_all();
    assert_eq!(session.log().len(), 1);
    assert!(session.has_unsaved_changes());
    assert_eq!(session.document(Category::Web)["web"]["port"], json!(9999));

    // The edit still reaches the server once it is back.
    backend.set_offline(false);
    assert!(matches!(session.save_all(), SaveOutcome::Saved { .. }));
    assert_eq!(backend.document(Category::Web)["web"]["port"], json!(9999));
}

#[test]
fn test_partial_load_rebases_pending_changes() {
    let (mut session, backend) = demo_session();
    session.update_web_config("web.port", json!(9999)).unwrap();
    session.delete_world("arena_world").unwrap();

    backend.set_document(Category::Web, json!({"web": {"port": 8080, "host": "0.0.0.0"}}));
    backend.fail_fetch(Category::Worlds, true);

    match session.load_all() {
        LoadOutcome::Applied { failed, .. } => assert_eq!(failed, vec![Category::Worlds]),
        LoadOutcome::Stale => panic!("load was stale"),
    }
    assert_eq!(session.log().len(), 2);
    assert!(session.has_unsaved_changes());
    let web = &session.document(Category::Web)["web"];
    assert_eq!((&web["port"], &web["host"]), (&json!(9999), &json!("0.0.0.0")));
    assert!(session.worlds_view().is_empty_state());

    session.undo().unwrap();
    assert_eq!(session.worlds_view().cards().len(), 1);
    session.undo().unwrap();
    let web = &session.document(Category::Web)["web"];
    assert_eq!((&web["port"], &web["host"]), (&json!(8080), &json!("0.0.0.0")));
}

#[test]
fn test_discard_with_failed_fetch_restores_snapshot() {
    let (mut session, backend) = demo_session();
    session.delete_world("arena_world").unwrap();
    backend.fail_fetch(Category::Worlds, true);

    match session.discard() {
        LoadOutcome::Applied { failed, .. } => assert_eq!(failed, vec![Category::Worlds]),
        LoadOutcome::Stale => panic!("load was stale"),
    }
    assert!(session.log().is_empty());
    assert_eq!(session.worlds_view().cards().len(), 1);

    // Undoing an unrelated change leaves worlds alone.
    session.update_config("settings.auto-events.enabled", json!(true)).unwrap();
    session.undo().unwrap();
    assert_eq!(session.worlds_view().cards().len(), 1);
    assert_eq!(
        session.snapshots().base_documents().unwrap(),
        *session.docs()
    );
}

#[test]
fn test_offline_load_disconnects() {
    let (mut session, backend) = demo_session();
    let before = session.docs().clone();
    let handle = session.subscribe(SubscriptionFilter::all());
    backend.set_offline(true);

    let outcome = session.load_all();
    assert_eq!(
        outcome,
        LoadOutcome::Applied {
            loaded: vec![],
            failed: Category::ALL.to_vec()
        }
    );
    assert_eq!(session.docs(), &before);

    let events = handle.drain();
    assert!(events.iter().any(|e| matches!(
        e,
        EditorEvent::Connection {
            state: ConnectionState::Disconnected,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        EditorEvent::Toast { key, .. } if key == "error.loadFailed"
    )));
    assert_eq!(events.last(), Some(&EditorEvent::Loading { active: false }));
}

#[test]
fn test_reload_failure_toast() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());
    backend.set_offline(true);

    assert!(session.reload_server().is_err());
    assert_eq!(toasts.drain_toast_keys(), vec!["server.reloadError"]);
    assert!(session.check_status().is_none());
}

// --- Editor Errors ---

#[test]
fn test_validation_keeps_modal_open() {
    let (mut session, _) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    session.open_event(None).unwrap();
    let result = session.save_event();
    assert!(matches!(result, Err(EditorError::Validation { ref key }) if key == "error.fieldRequired"));
    assert!(session.event_editor().is_open());
    assert!(session.log().is_empty());
    assert_eq!(toasts.drain_toast_keys(), vec!["error.fieldRequired"]);

    // Fixing the field lets the same scratch through.
    session.event_editor_mut().set("command", json!("duel")).unwrap();
    session.save_event().unwrap();
    assert!(!session.event_editor().is_open());
    assert_eq!(session.log().len(), 1);
}

#[test]
fn test_dotted_world_id_rejected() {
    let (mut session, _) = demo_session();
    session.open_world(None).unwrap();
    session.world_editor_mut().set_id("arena.two").unwrap();

    let result = session.save_world();
    assert!(matches!(result, Err(EditorError::Validation { ref key }) if key == "error.invalidId"));
    assert!(session.world_editor().is_open());
}

#[test]
fn test_empty_world_id_rejected() {
    let (mut session, _) = demo_session();
    session.open_world(None).unwrap();

    let result = session.save_world();
    assert!(matches!(result, Err(EditorError::Validation { ref key }) if key == "label.worldIdEmpty"));
}

#[test]
fn test_open_missing_entity() {
    let (mut session, _) = demo_session();
    assert!(matches!(session.open_equipment(Some("ghost")), Err(EditorError::NotFound(_))));
    assert!(!session.equipment_editor().is_open());
    assert!(matches!(session.save_equipment(), Err(EditorError::EditorClosed)));
}

#[test]
fn test_full_inventory() {
    let (mut session, _) = demo_session();
    session.open_equipment(None).unwrap();
    let editor = session.equipment_editor_mut();
    for _ in 0..36 {
        editor.add_item_to_inventory("DIAMOND_SWORD").unwrap();
    }
    assert!(matches!(
        editor.add_item_to_inventory("DIAMOND_SWORD"),
        Err(EditorError::InventoryFull)
    ));
    assert_eq!(editor.inventory().len(), 36);
}

// --- Other Errors ---

#[test]
fn test_unknown_language_changes_nothing() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    assert!(session.change_language("xx").is_err());
    assert_eq!(session.language(), "en");
    assert_eq!(backend.stored_language(), None);
    assert_eq!(session.snapshots().language().unwrap(), None);
    assert_eq!(toasts.drain_toast_keys(), vec!["language.error"]);
}

#[test]
fn test_bad_import_records_nothing() {
    let (mut session, _) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    assert!(session.import_json("{not json").is_err());
    assert!(session.log().is_empty());
    assert_eq!(toasts.drain_toast_keys(), vec!["import.error"]);
}

#[test]
fn test_delete_unknown_entity() {
    let (mut session, _) = demo_session();
    assert!(matches!(session.delete_event("ghost"), Err(EditorError::NotFound(_))));
    assert!(!session.has_unsaved_changes());
}

#[test]
fn test_snapshot_dir_locked() {
    let dir = TempDir::new().unwrap();
    let _first = FileSnapshotStore::open(dir.path()).unwrap();
    assert!(matches!(
        FileSnapshotStore::open(dir.path()),
        Err(EditorError::Locked)
    ));
}
