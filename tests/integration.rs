//! End-to-end tests of the editor session against the in-memory backend.

use eventpvp_config::{
    Backend, Category, ConnectionState, EditorConfig, EditorEvent, EditorSession, FileSnapshotStore,
    LoadOutcome, MemoryBackend, SaveOutcome, Snapshots, SubscriptionFilter, ViewAction,
};
use eventpvp_config::document::get_value;
use eventpvp_config::types::EntityKind;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
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

// --- Realistic Workflow Tests ---

#[test]
fn test_create_event_save_and_persist() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    session.open_event(None).unwrap();
    let editor = session.event_editor_mut();
    editor.set_id("ctf").unwrap();
    editor.set("command", json!("ctf")).unwrap();
    editor.set("display-name", json!("Capture the Flag")).unwrap();
    session.save_event().unwrap();

    assert!(!session.event_editor().is_open());
    assert_eq!(session.events_view().cards().len(), 2);
    assert!(session.has_unsaved_changes());
    assert_eq!(toasts.drain_toast_keys(), vec!["events.saved"]);

    let saves_before = backend.save_count();
    assert_eq!(
        session.save_all(),
        SaveOutcome::Saved {
            categories: vec![Category::Settings]
        }
    );
    assert_eq!(backend.save_count(), saves_before + 1);
    assert!(!session.has_unsaved_changes());

    let stored = backend.document(Category::Settings);
    assert_eq!(stored["events"]["ctf"]["display-name"], json!("Capture the Flag"));
    assert_eq!(stored["events"]["ctf"]["id"], json!("ctf"));
    assert_eq!(stored["events"]["pvparena"]["command"], json!("pvparena"));
}

#[test]
fn test_edit_existing_world_then_undo_redo() {
    let (mut session, _) = demo_session();

    session
        .dispatch(ViewAction::Edit {
            kind: EntityKind::World,
            id: "arena_world".into(),
        })
        .unwrap();
    session.world_editor_mut().set("build-allowed", json!(true)).unwrap();
    session.save_world().unwrap();

    let worlds = session.document(Category::Worlds);
    assert_eq!(worlds["worlds"]["arena_world"]["build-allowed"], json!(true));
    assert!(worlds["worlds"]["arena_world"].get("id").is_none());

    session.undo().unwrap();
    assert_eq!(
        session.document(Category::Worlds)["worlds"]["arena_world"]["build-allowed"],
        json!(false)
    );
    assert!(session.can_redo());

    session.redo().unwrap();
    assert_eq!(
        session.document(Category::Worlds)["worlds"]["arena_world"]["build-allowed"],
        json!(true)
    );
}

#[test]
fn test_equipment_editor_inventory_commit() {
    let (mut session, _) = demo_session();

    session.open_equipment(Some("pvp_starter")).unwrap();
    let editor = session.equipment_editor_mut();
    assert_eq!(editor.inventory().len(), 5);

    let grid = editor.inventory_mut().unwrap();
    assert!(grid.pick_up(0).unwrap());
    grid.drop_on(20).unwrap();
    editor.add_item_to_inventory("ENDER_PEARL").unwrap();
    session.save_equipment().unwrap();

    let inventory = get_value(
        session.document(Category::Equipment),
        "equipment-sets.pvp_starter.inventory",
    )
    .unwrap()
    .as_array()
    .unwrap()
    .clone();
    assert_eq!(inventory.len(), 6);
    assert!(inventory
        .iter()
        .any(|e| e["slot"] == json!(20) && e["item"] == json!("IRON_SWORD")));
    assert!(inventory.iter().any(|e| e["item"] == json!("ENDER_PEARL")));
}

#[test]
fn test_delete_is_recorded_and_undoable() {
    let (mut session, _) = demo_session();

    session.delete_event("pvparena").unwrap();
    assert!(session.events_view().is_empty_state());

    session.undo().unwrap();
    let cards = session.events_view();
    assert_eq!(cards.cards()[0].id, "pvparena");
}

#[test]
fn test_zero_changes_makes_no_requests() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());
    let before = backend.request_count();

    assert_eq!(session.save_all(), SaveOutcome::NoChanges);
    assert_eq!(backend.request_count(), before);
    assert_eq!(toasts.drain_toast_keys(), vec!["info.noChanges"]);
}

#[test]
fn test_undone_changes_are_not_saved() {
    let (mut session, backend) = demo_session();
    session.update_web_config("web.port", json!(9090)).unwrap();
    session.undo().unwrap();

    let before = backend.save_count();
    assert_eq!(session.save_all(), SaveOutcome::NoChanges);
    assert_eq!(backend.save_count(), before);
}

#[test]
fn test_only_changed_categories_are_saved() {
    let (mut session, backend) = demo_session();
    session.update_web_config("web.port", json!(9090)).unwrap();
    session.update_config("settings.auto-events.enabled", json!(true)).unwrap();

    let before = backend.save_count();
    let outcome = session.save_all();
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            categories: vec![Category::Settings, Category::Web]
        }
    );
    assert_eq!(backend.save_count(), before + 2);
    assert_eq!(backend.document(Category::Web)["web"]["port"], json!(9090));
}

#[test]
fn test_empty_backend_shows_empty_states() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = EditorSession::new(EditorConfig::default(), backend, Snapshots::in_memory());
    assert!(session.init());

    assert!(session.events_view().is_empty_state());
    assert!(session.worlds_view().is_empty_state());
    assert!(session.equipment_view().is_empty_state());

    let markup = session.events_view().to_markup(&session.translations());
    assert!(markup.contains("data-action=\"create\""));
    assert_eq!(session.nav_counts().events, 0);
}

#[test]
fn test_stale_load_is_discarded() {
    let (mut session, backend) = demo_session();

    let first = session.fetch_batch();
    backend.set_document(Category::Web, json!({"web": {"port": 1}}));
    let second = session.fetch_batch();

    assert_eq!(session.apply_load(first), LoadOutcome::Stale);
    assert!(matches!(session.apply_load(second), LoadOutcome::Applied { .. }));
    assert_eq!(session.document(Category::Web), &json!({"web": {"port": 1}}));
}

#[test]
fn test_load_clears_pending_changes() {
    let (mut session, _) = demo_session();
    session.update_web_config("web.port", json!(9090)).unwrap();
    assert_eq!(session.log().len(), 1);

    session.load_all();
    assert!(session.log().is_empty());
    assert_eq!(session.document(Category::Web)["web"]["port"], json!(8080));
}

#[test]
fn test_discard_restores_server_state() {
    let (mut session, _) = demo_session();
    session.delete_world("arena_world").unwrap();

    let outcome = session.discard();
    assert!(matches!(outcome, LoadOutcome::Applied { ref failed, .. } if failed.is_empty()));
    assert_eq!(session.worlds_view().cards().len(), 1);
    assert!(!session.can_undo());
}

#[test]
fn test_slow_load_warns_without_cancelling() {
    let backend = Arc::new(MemoryBackend::demo());
    backend.set_fetch_delay(Duration::from_millis(50));
    let config = EditorConfig {
        load_timeout_secs: 0,
        ..Default::default()
    };
    let mut session = EditorSession::new(config, backend, Snapshots::in_memory());
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    assert!(session.init());
    let keys = toasts.drain_toast_keys();
    assert!(keys.contains(&"warning.loadSlow".to_string()));
    assert!(keys.contains(&"success.loadedConfigs".to_string()));
    assert_eq!(session.events_view().cards().len(), 1);
}

#[test]
fn test_connection_state_follows_load() {
    let backend = Arc::new(MemoryBackend::demo());
    let mut session = EditorSession::new(
        EditorConfig::default(),
        backend.clone(),
        Snapshots::in_memory(),
    );
    let handle = session.subscribe(SubscriptionFilter::status());
    session.init();

    let states: Vec<ConnectionState> = handle
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            EditorEvent::Connection { state, .. } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![ConnectionState::Connecting, ConnectionState::Connected]);
}

// --- Language ---

#[test]
fn test_change_language_is_not_recorded() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    session.change_language("de").unwrap();
    assert_eq!(session.language(), "de");
    assert!(session.log().is_empty());
    assert_eq!(backend.stored_language().as_deref(), Some("de"));
    assert_eq!(session.snapshots().language().unwrap().as_deref(), Some("de"));
    assert_eq!(
        session.document(Category::Settings)["settings"]["language"],
        json!("de")
    );

    // The folded value survives a replay from the snapshot.
    session.update_web_config("web.port", json!(1)).unwrap();
    session.undo().unwrap();
    assert_eq!(
        session.document(Category::Settings)["settings"]["language"],
        json!("de")
    );

    let keys = toasts.drain_toast_keys();
    assert_eq!(keys[0], "success.saved");
    assert_eq!(session.t("events.saved"), "Event gespeichert");
}

#[test]
fn test_language_restored_from_server() {
    let backend = Arc::new(MemoryBackend::demo());
    backend.save_language("de").unwrap();

    let mut session = EditorSession::new(EditorConfig::default(), backend, Snapshots::in_memory());
    session.init();
    assert_eq!(session.language(), "de");
}

// --- Auth ---

#[test]
fn test_login_gate() {
    let backend = Arc::new(MemoryBackend::demo().with_token("secret"));
    let mut session = EditorSession::new(
        EditorConfig::default(),
        backend.clone(),
        Snapshots::in_memory(),
    );
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    assert!(!session.init());
    assert_eq!(backend.fetch_count(), 0);

    assert!(session.login("  ").is_err());
    assert!(session.login("wrong").is_err());
    assert_eq!(
        toasts.drain_toast_keys(),
        vec!["auth.tokenRequired", "auth.invalidToken"]
    );

    session.login("secret").unwrap();
    assert!(session.auth().authenticated);
    assert_eq!(session.events_view().cards().len(), 1);
    let keys = toasts.drain_toast_keys();
    assert_eq!(keys, vec!["auth.welcome", "success.loadedConfigs"]);

    session.logout().unwrap();
    assert!(!session.auth().authenticated);
}

// --- Export / import ---

#[test]
fn test_export_import_between_sessions() {
    let (mut source, _) = demo_session();
    source.delete_world("arena_world").unwrap();
    let exported = source.export_json().unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert!(envelope["timestamp"].is_string());
    assert!(envelope.get("config").is_some());

    let (mut target, _) = demo_session();
    target.import_json(&exported).unwrap();
    assert!(target.worlds_view().is_empty_state());
    assert_eq!(target.log().len(), 3);

    // Records are settings, worlds, equipment in that order.
    target.undo().unwrap();
    assert!(target.worlds_view().is_empty_state());
    target.undo().unwrap();
    assert_eq!(target.worlds_view().cards().len(), 1);
}

#[test]
fn test_partial_import_keeps_other_documents() {
    let (mut session, _) = demo_session();
    session
        .import_json(r#"{"worlds": {"worlds": {}}}"#)
        .unwrap();
    assert_eq!(session.log().len(), 1);
    assert!(session.worlds_view().is_empty_state());
    assert_eq!(session.events_view().cards().len(), 1);
}

// --- Server ---

#[test]
fn test_reload_and_status() {
    let (mut session, backend) = demo_session();
    let toasts = session.subscribe(SubscriptionFilter::toasts());

    session.reload_server().unwrap();
    assert_eq!(backend.reload_count(), 1);
    assert_eq!(toasts.drain_toast_keys(), vec!["server.reloadSuccess"]);

    let status = session.check_status().unwrap();
    assert_eq!(status.plugin_name, "EventPVP");
}

#[test]
fn test_status_polling_lifecycle() {
    let backend = Arc::new(MemoryBackend::demo());
    let config = EditorConfig {
        status_interval_secs: 1,
        ..Default::default()
    };
    let mut session = EditorSession::new(config, backend, Snapshots::in_memory());
    session.init();
    let handle = session.subscribe(SubscriptionFilter::status());

    session.start_status_polling();
    assert!(session.is_polling());
    let first = handle.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(matches!(first, EditorEvent::Connection { .. } | EditorEvent::Status { .. }));

    session.stop_status_polling();
    assert!(!session.is_polling());
}

#[test]
fn test_yaml_preview_omits_nulls() {
    let (mut session, _) = demo_session();
    session
        .update_config("settings.unset", serde_json::Value::Null)
        .unwrap();

    let yaml = session.yaml_preview(Category::Settings).unwrap();
    assert!(yaml.contains("pvparena"));
    assert!(!yaml.contains("unset"));
}

// --- Snapshot persistence ---

#[test]
fn test_file_snapshots_survive_restart() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MemoryBackend::demo());

    {
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let mut session = EditorSession::new(
            EditorConfig::default(),
            backend.clone(),
            Snapshots::new(Arc::new(store)),
        );
        session.init();
        session.change_language("de").unwrap();
    }

    let snapshots = Snapshots::new(Arc::new(FileSnapshotStore::open(dir.path()).unwrap()));
    assert_eq!(snapshots.language().unwrap().as_deref(), Some("de"));
    let base = snapshots.base_documents().unwrap();
    assert_eq!(base.get(Category::Settings)["settings"]["language"], json!("de"));
    assert_eq!(base.get(Category::Worlds), &backend.document(Category::Worlds));
}
