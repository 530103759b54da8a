//! Preset categories derived from the remote effect schema.
//!
//! LedFx splits every effect's presets into shipped ("default") and
//! user-saved ("custom") ones, and activating a preset requires naming the
//! category it lives in. The [`PresetResolver`] scans all effects once and
//! remembers which category each preset id belongs to.

use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::api::Api;
use crate::client::{RestClient, Transport, TransportError};

/// Which preset collection an id belongs to. Serializes as the response
/// field name LedFx uses for that collection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetCategory {
    #[serde(rename = "default_presets")]
    Default,
    #[serde(rename = "custom_presets")]
    Custom,
}

impl PresetCategory {
    /// Categories in the order they are scanned and listed.
    pub const ALL: [PresetCategory; 2] = [PresetCategory::Default, PresetCategory::Custom];

    pub fn field_name(self) -> &'static str {
        match self {
            PresetCategory::Default => "default_presets",
            PresetCategory::Custom => "custom_presets",
        }
    }
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Result type for resolver operations.
pub type PresetResult<T> = Result<T, PresetError>;

#[derive(Debug, Error)]
pub enum PresetError {
    /// The remote call itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// No preset table has been loaded yet.
    #[error("preset table not loaded")]
    NotLoaded,
    /// The preset id is not in the loaded table.
    #[error("preset not found: {0}")]
    NotFound(String),
    /// A response field that should hold an object holds something else.
    #[error("unexpected response from {path}: `{field}` is not an object")]
    Malformed { path: String, field: String },
}

impl PresetError {
    /// True when the remote calls worked but the preset is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PresetError::NotLoaded | PresetError::NotFound(_))
    }

    /// HTTP status of an underlying transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            PresetError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

/// Flat preset id -> category lookup across all effects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetTable {
    entries: HashMap<String, PresetCategory>,
}

impl PresetTable {
    pub fn get(&self, preset_id: &str) -> Option<PresetCategory> {
        self.entries.get(preset_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, PresetCategory> {
        self.entries.iter()
    }

    /// Later inserts for the same id replace earlier ones.
    fn insert(&mut self, preset_id: String, category: PresetCategory) {
        self.entries.insert(preset_id, category);
    }
}

/// Request that activates a preset on a virtual.
///
/// Serializes to the `{category, effect_id, preset_id}` body LedFx expects;
/// the virtual id only selects the endpoint.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PresetActivation {
    #[serde(skip)]
    pub virtual_id: String,
    pub category: PresetCategory,
    pub effect_id: String,
    pub preset_id: String,
}

impl PresetActivation {
    /// Endpoint the activation is sent to.
    pub fn path(&self) -> String {
        format!("virtuals/{}/presets", self.virtual_id)
    }

    pub fn body(&self) -> Value {
        json!({
            "category": self.category.field_name(),
            "effect_id": self.effect_id,
            "preset_id": self.preset_id,
        })
    }
}

/// Keys of the object under `field`. Missing or null fields have no keys.
fn object_keys(data: &Value, field: &str, path: &str) -> PresetResult<Vec<String>> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(vec![]),
        Some(Value::Object(map)) => Ok(map.keys().cloned().collect()),
        Some(_) => Err(PresetError::Malformed {
            path: path.to_string(),
            field: field.to_string(),
        }),
    }
}

/// Resolves preset ids to their category.
///
/// Starts unloaded; [`PresetResolver::load`] takes a point-in-time snapshot
/// of every effect's presets. The snapshot is never refreshed on its own.
///
/// Concurrent `load` calls on one resolver are serialized, and readers only
/// ever see a complete table, but the snapshot they get is whichever load
/// finished last.
pub struct PresetResolver<T = RestClient> {
    api: Api<T>,
    /// Current snapshot, replaced whole by `load`.
    table: RwLock<Option<Arc<PresetTable>>>,
    /// Held for the duration of a load.
    loading: Mutex<()>,
}

impl<T: Transport> PresetResolver<T> {
    pub fn new(api: Api<T>) -> PresetResolver<T> {
        PresetResolver {
            api,
            table: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &Api<T> {
        &self.api
    }

    /// Ids of every effect type in the remote schema, in schema order.
    pub fn effect_ids(&self) -> PresetResult<Vec<String>> {
        let schema = self.api.schema()?;
        object_keys(&schema, "effects", "schema")
    }

    /// Preset ids of one category for an effect, in service order.
    pub fn presets_for_effect(
        &self,
        effect_id: &str,
        category: PresetCategory,
    ) -> PresetResult<Vec<String>> {
        let presets = self.api.effect_presets(effect_id)?;
        let path = format!("effects/{}/presets", effect_id);
        object_keys(&presets, category.field_name(), &path)
    }

    /// Default presets followed by custom presets.
    pub fn all_presets_for_effect(&self, effect_id: &str) -> PresetResult<Vec<String>> {
        let mut presets = self.presets_for_effect(effect_id, PresetCategory::Default)?;
        presets.extend(self.presets_for_effect(effect_id, PresetCategory::Custom)?);
        Ok(presets)
    }

    /// Rebuild the preset table from the remote service.
    ///
    /// Effects are scanned in schema order, defaults before customs. When a
    /// preset id shows up more than once the last write wins: an id listed
    /// in both categories of an effect is custom, and across effects the
    /// later effect decides.
    ///
    /// On error the previous table stays in place. Returns the number of
    /// entries in the new table.
    pub fn load(&self) -> PresetResult<usize> {
        let _guard = self.loading.lock().unwrap_or_else(PoisonError::into_inner);

        let mut table = PresetTable::default();
        for effect_id in self.effect_ids()? {
            debug!("Scanning presets of effect {}", effect_id);
            for &category in PresetCategory::ALL.iter() {
                for preset_id in self.presets_for_effect(&effect_id, category)? {
                    table.insert(preset_id, category);
                }
            }
        }

        let count = table.len();
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
        info!("Loaded {} presets", count);

        Ok(count)
    }

    pub fn is_loaded(&self) -> bool {
        self.table().is_some()
    }

    /// Snapshot of the current table, if one has been loaded.
    pub fn table(&self) -> Option<Arc<PresetTable>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Category of a preset id according to the last load.
    pub fn resolve_category(&self, preset_id: &str) -> PresetResult<PresetCategory> {
        let table = self.table().ok_or(PresetError::NotLoaded)?;
        table
            .get(preset_id)
            .ok_or_else(|| PresetError::NotFound(preset_id.to_string()))
    }

    pub fn build_activation_request(
        &self,
        virtual_id: &str,
        effect_id: &str,
        preset_id: &str,
    ) -> PresetResult<PresetActivation> {
        let category = self.resolve_category(preset_id)?;
        Ok(PresetActivation {
            virtual_id: virtual_id.to_string(),
            category,
            effect_id: effect_id.to_string(),
            preset_id: preset_id.to_string(),
        })
    }

    /// Activate a preset on a virtual.
    pub fn set_preset(
        &self,
        virtual_id: &str,
        effect_id: &str,
        preset_id: &str,
    ) -> PresetResult<Value> {
        let activation = self.build_activation_request(virtual_id, effect_id, preset_id)?;
        Ok(self
            .api
            .virtual_preset_set(&activation.virtual_id, &activation.body())?)
    }
}
