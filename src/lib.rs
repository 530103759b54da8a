//! Client for the LedFx HTTP/JSON control API.
//!
//! [`Api`] exposes one method per REST endpoint, [`PresetResolver`] works
//! out which preset category an id belongs to so presets can be activated
//! by id alone. [`LedFx`] bundles both over a single connection.

pub mod api;
pub mod client;
pub mod config;
pub mod presets;

pub use crate::api::Api;
pub use crate::client::{ClientResult, Method, MockTransport, RestClient, Transport, TransportError};
pub use crate::presets::{
    PresetActivation, PresetCategory, PresetError, PresetResolver, PresetResult, PresetTable,
};

/// Endpoint facade and preset resolver sharing one transport.
pub struct LedFx<T = RestClient> {
    pub api: Api<T>,
    pub presets: PresetResolver<T>,
}

impl LedFx<RestClient> {
    /// Connect to `host:port`. The preset table is not loaded.
    pub fn connect(host: &str, port: u16, https: bool) -> ClientResult<LedFx<RestClient>> {
        Ok(LedFx::new(RestClient::new(host, port, https)?))
    }

    pub fn from_config(config: &config::Root) -> ClientResult<LedFx<RestClient>> {
        Ok(LedFx::new(RestClient::from_config(&config.server)?))
    }
}

impl<T: Transport> LedFx<T> {
    pub fn new(transport: T) -> LedFx<T> {
        let api = Api::new(transport);
        LedFx {
            presets: PresetResolver::new(api.clone()),
            api,
        }
    }

    /// Build around `transport` and load the preset table right away.
    pub fn connect_and_load(transport: T) -> PresetResult<LedFx<T>> {
        let ledfx = LedFx::new(transport);
        ledfx.presets.load()?;
        Ok(ledfx)
    }
}
