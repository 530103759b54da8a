//! Typed wrappers around the LedFx REST endpoints.
//!
//! Method order follows the LedFx API documentation. Every call returns the
//! decoded JSON response unchanged.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{ClientResult, RestClient, Transport};

/// Endpoint facade over a shared transport.
pub struct Api<T = RestClient> {
    transport: Arc<T>,
}

impl<T> Clone for Api<T> {
    fn clone(&self) -> Self {
        Api {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Api<RestClient> {
    /// Talk to the LedFx instance at `host:port`.
    pub fn connect(host: &str, port: u16, https: bool) -> ClientResult<Api<RestClient>> {
        Ok(Api::new(RestClient::new(host, port, https)?))
    }
}

impl<T> Api<T> {
    pub fn new(transport: T) -> Api<T> {
        Api::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Api<T> {
        Api { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Api<T> {
    // General

    /// Basic information about the LedFx instance.
    pub fn info(&self) -> ClientResult<Value> {
        self.transport.get("info")
    }

    /// Current LedFx configuration.
    pub fn config(&self) -> ClientResult<Value> {
        self.transport.get("config")
    }

    /// Schemas for devices, effects and integrations.
    pub fn schema(&self) -> ClientResult<Value> {
        self.transport.get("schema")
    }

    pub fn schema_devices(&self) -> ClientResult<Value> {
        self.transport.get("schema/device")
    }

    pub fn schema_effects(&self) -> ClientResult<Value> {
        self.transport.get("schema/effect")
    }

    pub fn schema_integrations(&self) -> ClientResult<Value> {
        self.transport.get("schema/integration")
    }

    // Devices

    /// Configuration of all devices.
    pub fn devices(&self) -> ClientResult<Value> {
        self.transport.get("devices")
    }

    pub fn device_add(&self, config: &Value) -> ClientResult<Value> {
        self.transport.post("devices", Some(config))
    }

    pub fn device(&self, device_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("devices/{}", device_id))
    }

    /// Replace a device's configuration; returns the new device.
    pub fn device_modify(&self, device_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport.put(&format!("devices/{}", device_id), Some(config))
    }

    pub fn device_delete(&self, device_id: &str) -> ClientResult<Value> {
        self.transport.delete(&format!("devices/{}", device_id), None)
    }

    // Effects

    /// Effects currently created in LedFx.
    pub fn effects(&self) -> ClientResult<Value> {
        self.transport.get("effects")
    }

    pub fn effect(&self, effect_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("effects/{}", effect_id))
    }

    // Device effects

    /// Active effect config of a device.
    pub fn device_effect(&self, device_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("devices/{}/effects", device_id))
    }

    pub fn device_effect_update(&self, device_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .put(&format!("devices/{}/effects", device_id), Some(config))
    }

    /// Fill the device's active effect config with random values.
    pub fn device_effect_randomize(&self, device_id: &str) -> ClientResult<Value> {
        self.device_effect_update(device_id, &Value::from("RANDOMIZE"))
    }

    /// Switch the device to a new effect.
    pub fn device_effect_set(&self, device_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .post(&format!("devices/{}/effects", device_id), Some(config))
    }

    pub fn device_effect_clear(&self, device_id: &str) -> ClientResult<Value> {
        self.transport
            .delete(&format!("devices/{}/effects", device_id), None)
    }

    // Device presets

    /// Presets for the active effect of a device.
    pub fn device_presets(&self, device_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("devices/{}/presets", device_id))
    }

    pub fn device_preset_set(&self, device_id: &str, preset: &Value) -> ClientResult<Value> {
        self.transport
            .put(&format!("devices/{}/presets", device_id), Some(preset))
    }

    /// Save the device's active effect config as a custom preset.
    pub fn device_preset_save(&self, device_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .post(&format!("devices/{}/presets", device_id), Some(config))
    }

    pub fn device_preset_clear(&self, device_id: &str) -> ClientResult<Value> {
        self.transport
            .delete(&format!("devices/{}/presets", device_id), None)
    }

    // Effect presets

    /// Default and custom presets of an effect.
    pub fn effect_presets(&self, effect_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("effects/{}/presets", effect_id))
    }

    pub fn effect_preset_rename(&self, effect_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .put(&format!("effects/{}/presets", effect_id), Some(config))
    }

    pub fn effect_preset_delete(&self, effect_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .delete(&format!("effects/{}/presets", effect_id), Some(config))
    }

    // Scenes

    pub fn scenes(&self) -> ClientResult<Value> {
        self.transport.get("scenes")
    }

    /// Apply a saved scene to all devices.
    pub fn scene_activate(&self, config: &Value) -> ClientResult<Value> {
        self.transport.put("scenes", Some(config))
    }

    /// Save the current device effects as a scene.
    pub fn scene_save(&self, config: &Value) -> ClientResult<Value> {
        self.transport.post("scenes", Some(config))
    }

    pub fn scene_delete(&self, config: &Value) -> ClientResult<Value> {
        self.transport.delete("scenes", Some(config))
    }

    // Virtuals

    pub fn virtuals(&self) -> ClientResult<Value> {
        self.transport.get("virtuals")
    }

    /// Toggle pause on all virtuals.
    pub fn virtuals_pause_all(&self) -> ClientResult<Value> {
        self.transport.put("virtuals", None)
    }

    pub fn virtual_add(&self, config: &Value) -> ClientResult<Value> {
        self.transport.post("virtuals", Some(config))
    }

    // Virtual effects

    pub fn virtual_effect(&self, virtual_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("virtuals/{}/effects", virtual_id))
    }

    pub fn virtual_effect_update(&self, virtual_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .put(&format!("virtuals/{}/effects", virtual_id), Some(config))
    }

    pub fn virtual_effect_set(&self, virtual_id: &str, config: &Value) -> ClientResult<Value> {
        self.transport
            .post(&format!("virtuals/{}/effects", virtual_id), Some(config))
    }

    // Virtual presets

    pub fn virtual_presets(&self, virtual_id: &str) -> ClientResult<Value> {
        self.transport.get(&format!("virtuals/{}/presets", virtual_id))
    }

    /// Activate a preset on a virtual. See `PresetActivation` for the body.
    pub fn virtual_preset_set(&self, virtual_id: &str, body: &Value) -> ClientResult<Value> {
        self.transport
            .put(&format!("virtuals/{}/presets", virtual_id), Some(body))
    }

    // Identifier helpers

    /// Ids of all configured devices.
    ///
    /// A device entry without a string `id` falls back to its map key. A
    /// response without a `devices` map yields no ids.
    pub fn device_ids(&self) -> ClientResult<Vec<String>> {
        let data = self.devices()?;
        let ids = match data.get("devices").and_then(Value::as_object) {
            Some(devices) => devices
                .iter()
                .map(|(key, device)| {
                    device
                        .get("id")
                        .and_then(Value::as_str)
                        .unwrap_or(key.as_str())
                        .to_string()
                })
                .collect(),
            None => vec![],
        };
        Ok(ids)
    }

    /// Ids of all virtuals, in the order the service lists them.
    pub fn virtual_ids(&self) -> ClientResult<Vec<String>> {
        let data = self.virtuals()?;
        let ids = match data.get("virtuals").and_then(Value::as_object) {
            Some(virtuals) => virtuals.keys().cloned().collect(),
            None => vec![],
        };
        Ok(ids)
    }
}
