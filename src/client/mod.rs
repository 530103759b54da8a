//! REST transport for the LedFx API.
//!
//! A [`Transport`] performs one request/response cycle and hands back the
//! decoded JSON body. [`RestClient`] does it over HTTP, [`MockTransport`]
//! answers from canned routes without touching the network.

use std::fmt;

use log::debug;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config;

mod mock;
pub use self::mock::{MockTransport, RecordedRequest};

/// Path prefix of the LedFx REST API.
pub const DEFAULT_API_BASE: &str = "/api/";

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for transport calls.
pub type ClientResult<T> = Result<T, TransportError>;

/// Failures of a single request/response cycle.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request path could not be joined onto the base URL.
    #[error("invalid URL for {path}: {source}")]
    Url {
        path: String,
        source: url::ParseError,
    },
    /// No HTTP response was received (refused, reset, DNS, TLS...).
    #[error("{method} {path}: {message}")]
    Connection {
        method: Method,
        path: String,
        message: String,
    },
    /// The server answered with a status outside 2xx.
    #[error("{method} {path}: HTTP {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },
    /// The server answered 2xx but the body is not JSON.
    #[error("{method} {path}: response is not valid JSON: {source}")]
    Decode {
        method: Method,
        path: String,
        body: String,
        source: serde_json::Error,
    },
}

impl TransportError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } | TransportError::Decode { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    /// Request path the error belongs to.
    pub fn path(&self) -> &str {
        match self {
            TransportError::Url { path, .. }
            | TransportError::Connection { path, .. }
            | TransportError::Status { path, .. }
            | TransportError::Decode { path, .. } => path,
        }
    }
}

/// Something that can issue JSON requests against the LedFx API.
pub trait Transport {
    /// Issue a single request. `path` is resolved against the API base URL;
    /// `body` is sent as JSON regardless of the method.
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> ClientResult<Value>;

    fn get(&self, path: &str) -> ClientResult<Value> {
        self.request(Method::Get, path, None, &[])
    }

    fn post(&self, path: &str, body: Option<&Value>) -> ClientResult<Value> {
        self.request(Method::Post, path, body, &[])
    }

    fn put(&self, path: &str, body: Option<&Value>) -> ClientResult<Value> {
        self.request(Method::Put, path, body, &[])
    }

    fn delete(&self, path: &str, body: Option<&Value>) -> ClientResult<Value> {
        self.request(Method::Delete, path, body, &[])
    }
}

/// Blocking HTTP client for a single LedFx instance.
pub struct RestClient {
    /// Scheme, host, port and API prefix. Request paths are joined onto this.
    base_url: Url,
    /// Agent reused between calls.
    agent: ureq::Agent,
}

impl RestClient {
    /// Build a client for `host:port` using the standard `/api/` prefix.
    pub fn new(host: &str, port: u16, https: bool) -> ClientResult<RestClient> {
        RestClient::with_base(host, port, https, DEFAULT_API_BASE)
    }

    /// Build a client with a custom API prefix.
    pub fn with_base(host: &str, port: u16, https: bool, api_base: &str) -> ClientResult<RestClient> {
        let scheme = if https { "https" } else { "http" };
        let root = format!("{}://{}:{}", scheme, host, port);
        let base_url = Url::parse(&root)
            .and_then(|root| root.join(api_base))
            .map_err(|source| TransportError::Url {
                path: api_base.to_string(),
                source,
            })?;

        Ok(RestClient {
            base_url,
            agent: ureq::AgentBuilder::new().build(),
        })
    }

    pub fn from_config(server: &config::Server) -> ClientResult<RestClient> {
        RestClient::with_base(&server.host, server.port, server.https, &server.api_base)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path with standard relative-URL rules, so an
    /// absolute path replaces the API prefix.
    pub fn url_for(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| TransportError::Url {
                path: path.to_string(),
                source,
            })
    }
}

impl Transport for RestClient {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> ClientResult<Value> {
        let url = self.url_for(path)?;
        debug!("{} {}", method, url);

        let mut request = self.agent.request_url(method.as_str(), &url);
        for &(name, value) in headers {
            request = request.set(name, value);
        }

        let result = match body {
            Some(body) => request
                .set("Content-Type", "application/json")
                .send_string(&body.to_string()),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(TransportError::Status {
                    method,
                    path: path.to_string(),
                    status,
                    body: response.into_string().unwrap_or_default(),
                });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::Connection {
                    method,
                    path: path.to_string(),
                    message: err.to_string(),
                });
            }
        };

        let status = response.status();
        let text = response
            .into_string()
            .map_err(|err| TransportError::Connection {
                method,
                path: path.to_string(),
                message: err.to_string(),
            })?;

        // ureq only reports 4xx/5xx as errors.
        if !(200..300).contains(&status) {
            return Err(TransportError::Status {
                method,
                path: path.to_string(),
                status,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| TransportError::Decode {
            method,
            path: path.to_string(),
            body: text,
            source,
        })
    }
}
