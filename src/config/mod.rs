use std::path::Path;
use std::{fs, io};

use log::error;
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_API_BASE;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    /// LedFx instance to talk to.
    pub server: Server,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Host name or address of the LedFx instance.
    pub host: String,
    /// Port of the LedFx web server.
    pub port: u16,
    /// Use https instead of http.
    #[serde(default)]
    pub https: bool,
    /// Path prefix of the REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for Server {
    fn default() -> Self {
        Server {
            host: "127.0.0.1".to_string(),
            port: 8888,
            https: false,
            api_base: default_api_base(),
        }
    }
}

pub fn read_config_yaml<T: AsRef<Path>>(path: T) -> io::Result<Root> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let root: Root = serde_yaml::from_reader(reader).map_err(|err| {
        error!("Error reading config file: {}", err);
        io::Error::new(io::ErrorKind::InvalidData, err)
    })?;
    check(root)
}

pub fn read_config_json<T: AsRef<Path>>(path: T) -> io::Result<Root> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let root: Root = serde_json::from_reader(reader).map_err(|err| {
        error!("Error reading config file: {}", err);
        io::Error::new(io::ErrorKind::InvalidData, err)
    })?;
    check(root)
}

/// Quick sanity check for the configuration.
fn check(root: Root) -> io::Result<Root> {
    let server = &root.server;
    let problem = if server.host.trim().is_empty() {
        Some("server host is empty".to_string())
    } else if server.port == 0 {
        Some("server port must not be 0".to_string())
    } else if !server.api_base.starts_with('/') {
        Some(format!("apiBase must start with '/': {}", server.api_base))
    } else {
        None
    };

    match problem {
        Some(problem) => {
            error!("Invalid config: {}", problem);
            Err(io::Error::new(io::ErrorKind::InvalidData, problem))
        }
        None => Ok(root),
    }
}
