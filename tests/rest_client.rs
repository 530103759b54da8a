use std::io::Read;
use std::net::TcpListener;
use std::sync::mpsc::Sender;

use ledfx_rs::{LedFx, Method, PresetCategory, PresetError, RestClient, Transport, TransportError};
use rouille::{Request, Response};
use serde_json::json;

/// Local stand-in for a LedFx instance.
struct TestServer {
    port: u16,
    stop: Sender<()>,
}

impl TestServer {
    fn start() -> TestServer {
        let server = rouille::Server::new("127.0.0.1:0", handle).unwrap();
        let port = server.server_addr().port();
        // Not joined on drop: pooled keep-alive connections could hold it open.
        let (_handle, stop) = server.stoppable();
        TestServer { port, stop }
    }

    fn client(&self) -> RestClient {
        RestClient::new("127.0.0.1", self.port, false).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop.send(()).ok();
    }
}

fn handle(request: &Request) -> Response {
    let mut body = String::new();
    if let Some(mut data) = request.data() {
        data.read_to_string(&mut body).ok();
    }

    match request.url().as_str() {
        "/api/echo" => Response::json(&json!({
            "method": request.method(),
            "body": body,
            "contentType": request.header("Content-Type"),
            "tag": request.header("X-Tag"),
        })),
        "/api/schema" => Response::json(&json!({"effects": {"rainbow": {}, "pulse": {}}})),
        "/api/effects/rainbow/presets" => Response::json(&json!({
            "default_presets": {"warm": {}},
            "custom_presets": {}
        })),
        "/api/effects/pulse/presets" => Response::json(&json!({
            "default_presets": {},
            "custom_presets": {"party": {}}
        })),
        "/api/virtuals/wled1/presets" => Response::json(&json!({
            "status": "success",
            "received": serde_json::from_str::<serde_json::Value>(&body).ok(),
        })),
        "/api/broken" => Response::text("this is not json"),
        "/api/fail" => Response::text("effect exploded").with_status_code(500),
        "/health" => Response::json(&json!({"ok": true})),
        _ => Response::empty_404(),
    }
}

#[test]
fn test_get_decodes_json() {
    let server = TestServer::start();
    let client = server.client();

    let value = client.get("echo").unwrap();
    assert_eq!(value["method"], json!("GET"));
    assert_eq!(value["body"], json!(""));
}

#[test]
fn test_body_sent_for_every_method() {
    let server = TestServer::start();
    let client = server.client();
    let payload = json!({"category": "custom_presets"});

    for &method in [Method::Get, Method::Post, Method::Put, Method::Delete].iter() {
        let value = client.request(method, "echo", Some(&payload), &[]).unwrap();
        assert_eq!(value["method"], json!(method.as_str()));
        assert_eq!(value["contentType"], json!("application/json"));

        let sent: serde_json::Value = serde_json::from_str(value["body"].as_str().unwrap()).unwrap();
        assert_eq!(sent, payload);
    }
}

#[test]
fn test_extra_headers() {
    let server = TestServer::start();
    let client = server.client();

    let value = client
        .request(Method::Get, "echo", None, &[("X-Tag", "presets")])
        .unwrap();
    assert_eq!(value["tag"], json!("presets"));
}

#[test]
fn test_absolute_path_replaces_prefix() {
    let server = TestServer::start();
    let value = server.client().get("/health").unwrap();
    assert_eq!(value, json!({"ok": true}));
}

#[test]
fn test_error_status_is_reported() {
    let server = TestServer::start();
    let client = server.client();

    match client.get("fail").unwrap_err() {
        TransportError::Status {
            method,
            path,
            status,
            body,
        } => {
            assert_eq!(method, Method::Get);
            assert_eq!(path, "fail");
            assert_eq!(status, 500);
            assert_eq!(body, "effect exploded");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = client.get("does/not/exist").unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn test_invalid_json_is_reported() {
    let server = TestServer::start();

    let err = server.client().get("broken").unwrap_err();
    assert!(matches!(err, TransportError::Decode { .. }));
    assert_eq!(err.body(), Some("this is not json"));
    assert_eq!(err.status(), None);
}

#[test]
fn test_connection_refused() {
    // Grab a free port, then close it again.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let client = RestClient::new("127.0.0.1", port, false).unwrap();
    let err = client.get("info").unwrap_err();
    assert!(matches!(err, TransportError::Connection { .. }));
}

#[test]
fn test_preset_activation_end_to_end() {
    let server = TestServer::start();
    let ledfx = LedFx::new(server.client());

    assert_eq!(ledfx.presets.load().unwrap(), 2);
    assert_eq!(
        ledfx.presets.resolve_category("warm").unwrap(),
        PresetCategory::Default
    );
    assert_eq!(
        ledfx.presets.resolve_category("party").unwrap(),
        PresetCategory::Custom
    );
    assert!(matches!(
        ledfx.presets.resolve_category("missing"),
        Err(PresetError::NotFound(_))
    ));

    let response = ledfx.presets.set_preset("wled1", "pulse", "party").unwrap();
    assert_eq!(
        response["received"],
        json!({"category": "custom_presets", "effect_id": "pulse", "preset_id": "party"})
    );
}

#[test]
fn test_server_error_fails_resolver() {
    let server = TestServer::start();
    let ledfx = LedFx::new(server.client());

    // No such effect on the server: the presets endpoint 404s.
    let err = ledfx
        .presets
        .presets_for_effect("nope", PresetCategory::Default)
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_not_found());
}
