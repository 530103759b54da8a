//! Offline transport for tests and demos.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::{ClientResult, Method, Transport, TransportError};

/// A request seen by the [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Route {
    Json(Value),
    Fail { status: u16, body: String },
}

/// Answers requests from canned routes keyed by method and path.
///
/// Unrouted requests fail with HTTP 404. Routes can be changed while the
/// transport is shared, so a test can alter what the "remote" reports
/// between calls.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::default()
    }

    /// Answer `method path` with a JSON body.
    pub fn route(&self, method: Method, path: &str, response: Value) -> &Self {
        lock(&self.routes).insert((method, path.to_string()), Route::Json(response));
        self
    }

    /// Answer `method path` with an HTTP failure.
    pub fn fail(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        lock(&self.routes).insert(
            (method, path.to_string()),
            Route::Fail {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|req| req.method == method && req.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        _headers: &[(&str, &str)],
    ) -> ClientResult<Value> {
        lock(&self.requests).push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        let route = lock(&self.routes).get(&(method, path.to_string())).cloned();
        match route {
            Some(Route::Json(value)) => Ok(value),
            Some(Route::Fail { status, body }) => Err(TransportError::Status {
                method,
                path: path.to_string(),
                status,
                body,
            }),
            None => Err(TransportError::Status {
                method,
                path: path.to_string(),
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_routes() {
        let mock = MockTransport::new();
        mock.route(Method::Get, "info", json!({"version": "2.0"}));

        assert_eq!(mock.get("info").unwrap(), json!({"version": "2.0"}));

        let err = mock.get("config").unwrap_err();
        assert_eq!(err.status(), Some(404));

        mock.fail(Method::Get, "info", 500, "boom");
        let err = mock.get("info").unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some("boom"));
    }

    #[test]
    fn test_mock_records_requests() {
        let mock = MockTransport::new();
        mock.route(Method::Put, "scenes", json!({"status": "success"}));

        let body = json!({"id": "evening"});
        mock.put("scenes", Some(&body)).unwrap();
        mock.get("scenes").ok();

        assert_eq!(
            mock.requests(),
            vec![
                RecordedRequest {
                    method: Method::Put,
                    path: "scenes".to_string(),
                    body: Some(body),
                },
                RecordedRequest {
                    method: Method::Get,
                    path: "scenes".to_string(),
                    body: None,
                },
            ]
        );
        assert_eq!(mock.count(Method::Put, "scenes"), 1);

        mock.clear_requests();
        assert!(mock.requests().is_empty());
    }
}
