//! HTTP backend and sync layer against a local stub server.

use eventpvp_config::{
    Backend, Category, DocumentSet, EditorConfig, EditorError, EditorSession, HttpBackend,
    LocaleSource, Snapshots, SyncLayer,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

/// `(method, path, body)` of every request the stub received.
type RequestLog = Arc<Mutex<Vec<(String, String, String)>>>;

struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

fn route(method: &'static str, path: &'static str, status: u16, body: Value) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

/// Serve `routes` on an ephemeral port until the test process exits.
fn stub_server(routes: Vec<Route>) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let requests = log.clone();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);
            requests
                .lock()
                .push((method.clone(), path.clone(), String::from_utf8_lossy(&body).into_owned()));

            let (status, payload) = routes
                .iter()
                .find(|r| r.method == method && r.path == path)
                .map(|r| (r.status, r.body.clone()))
                .unwrap_or((404, r#"{"error":"not found"}"#.to_string()));
            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (addr, log)
}

fn backend(addr: &str) -> HttpBackend {
    HttpBackend::new(addr, Duration::from_secs(5))
}

#[test]
fn test_fetch_unwraps_envelope_and_raw_documents() {
    let (addr, _) = stub_server(vec![
        route("GET", "/api/config/get", 200, json!({"success": true, "data": {"events": {}}})),
        route("GET", "/api/worlds/get", 200, json!({"worlds": {"w": {}}})),
    ]);
    let backend = backend(&addr);

    assert_eq!(backend.fetch_document(Category::Settings).unwrap(), json!({"events": {}}));
    assert_eq!(
        backend.fetch_document(Category::Worlds).unwrap(),
        json!({"worlds": {"w": {}}})
    );
}

#[test]
fn test_status_errors_carry_server_message() {
    let (addr, _) = stub_server(vec![
        route("GET", "/api/equipment/get", 500, json!({"error": "disk full"})),
        route("POST", "/api/auth/login", 401, json!({"success": false, "error": "Invalid token"})),
    ]);
    let backend = backend(&addr);

    match backend.fetch_document(Category::Equipment) {
        Err(EditorError::Status { code, message }) => {
            assert_eq!(code, 500);
            assert_eq!(message, "disk full");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        backend.login("nope"),
        Err(EditorError::AuthFailed(ref m)) if m == "Invalid token"
    ));
}

#[test]
fn test_save_posts_document_and_reads_ack() {
    let (addr, log) = stub_server(vec![
        route("POST", "/api/webconfig/save", 200, json!({"success": true, "message": "ok"})),
        route("POST", "/api/worlds/save", 200, json!({"success": false, "message": "invalid yaml"})),
    ]);
    let backend = backend(&addr);

    let ack = backend
        .save_document(Category::Web, &json!({"web": {"port": 1}}))
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("ok"));
    assert!(matches!(
        backend.save_document(Category::Worlds, &json!({})),
        Err(EditorError::Rejected(ref m)) if m == "invalid yaml"
    ));

    let requests = log.lock();
    let (method, path, body) = &requests[0];
    assert_eq!((method.as_str(), path.as_str()), ("POST", "/api/webconfig/save"));
    assert_eq!(
        serde_json::from_str::<Value>(body).unwrap(),
        json!({"data": {"web": {"port": 1}}})
    );
}

#[test]
fn test_language_and_locale_endpoints() {
    let (addr, log) = stub_server(vec![
        route("GET", "/api/language/get", 200, json!({"language": "de"})),
        route("POST", "/api/language/save", 200, json!({"success": true})),
        route("GET", "/lang/de.json", 200, json!({"success.saved": "Gespeichert"})),
        route(
            "GET",
            "/lang/languages.json",
            200,
            json!({"available": [{"code": "de", "name": "German", "nativeName": "Deutsch"}], "default": "de"}),
        ),
    ]);
    let backend = backend(&addr);

    assert_eq!(backend.fetch_language().unwrap().as_deref(), Some("de"));
    backend.save_language("en").unwrap();
    assert_eq!(backend.fetch_locale("de").unwrap()["success.saved"], "Gespeichert");
    let list = backend.fetch_language_list().unwrap();
    assert_eq!(list.default, "de");
    assert_eq!(list.available[0].native_name, "Deutsch");

    let requests = log.lock();
    assert_eq!(
        serde_json::from_str::<Value>(&requests[1].2).unwrap(),
        json!({"language": "en"})
    );
}

#[test]
fn test_status_and_reload() {
    let (addr, _) = stub_server(vec![
        route(
            "GET",
            "/api/status",
            200,
            json!({"success": true, "data": {"pluginName": "EventPVP", "pluginVersion": "2.1", "onlinePlayers": 4, "maxPlayers": 50, "tps": 20.0}}),
        ),
        route("POST", "/api/reload", 200, json!({"success": true, "message": "reloaded"})),
    ]);
    let backend = backend(&addr);

    let status = backend.fetch_status().unwrap();
    assert_eq!(status.plugin_version, "2.1");
    assert_eq!(status.online_players, 4);
    assert_eq!(backend.reload().unwrap().message.as_deref(), Some("reloaded"));
}

#[test]
fn test_sync_layer_over_http() {
    let (addr, log) = stub_server(vec![
        route("GET", "/api/config/get", 200, json!({"success": true, "data": {"events": {}}})),
        route("GET", "/api/worlds/get", 200, json!({"success": true, "data": {"worlds": {}}})),
        route("GET", "/api/equipment/get", 503, json!({"message": "busy"})),
        route("GET", "/api/webconfig/get", 200, json!({"success": true, "data": {"web": {}}})),
        route("POST", "/api/config/save", 200, json!({"success": true})),
    ]);
    let sync = SyncLayer::new(Arc::new(backend(&addr)));

    let batch = sync.fetch_all();
    assert_eq!(batch.succeeded(), 3);
    assert!(sync.is_current(batch.generation));

    let mut docs = DocumentSet::new();
    docs.replace(Category::Settings, json!({"events": {"x": {}}}));
    let results = sync.save_changed(&docs, &BTreeSet::from([Category::Settings]));
    assert!(results[0].1.is_ok());

    let saves = log.lock().iter().filter(|(m, _, _)| m == "POST").count();
    assert_eq!(saves, 1);
}

#[test]
fn test_validation_without_auth_flag_requires_login() {
    let (addr, _) = stub_server(vec![route(
        "GET",
        "/api/auth/validate",
        200,
        json!({"authenticated": false}),
    )]);
    let mut session = EditorSession::new(
        EditorConfig::default(),
        Arc::new(backend(&addr)),
        Snapshots::in_memory(),
    );

    assert!(!session.authenticate());
    assert!(session.auth().auth_required);
}
