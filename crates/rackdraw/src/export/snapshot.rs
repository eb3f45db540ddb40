//! JSON snapshots of a scene, and loading them back
//!
//! ```json
//! {
//!   "version": 1,
//!   "timestamp": "2024-03-09T07:05:01+00:00",
//!   "scene": { "objects": [ { "id": 1, "category": "switches", ... } ] },
//!   "metadata": { "zoom": 1.0, "width": 1200.0, "height": 2000.0 }
//! }
//! ```
//!
//! Visuals are not stored. Import recreates every object through the
//! composer, so assets are fetched again.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, span, warn, Level};

use crate::core::{RackError, SourceKind};
use crate::scene::{EquipmentComposer, LockFlags, ObjectId, Scene, ViewMetadata};

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// One object as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotObject {
    pub id: ObjectId,
    pub category: String,
    pub key: String,
    pub equipment_name: String,
    pub rack_units: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rack_position: Option<u32>,
    /// Informational; import re-runs the loader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_kind: Option<SourceKind>,
    #[serde(default)]
    pub locks: LockFlags,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotScene {
    pub objects: Vec<SnapshotObject>,
}

/// A serialisable capture of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub timestamp: String,
    pub scene: SnapshotScene,
    pub metadata: ViewMetadata,
}

impl Snapshot {
    /// Capture the scene, stamped with the current UTC time
    pub fn capture(scene: &Scene) -> Self {
        Self::capture_at(scene, Utc::now().to_rfc3339())
    }

    pub fn capture_at(scene: &Scene, timestamp: impl Into<String>) -> Self {
        let objects = scene
            .iter()
            .map(|object| SnapshotObject {
                id: object.id,
                category: object.category.clone(),
                key: object.key.clone(),
                equipment_name: object.equipment_name.clone(),
                rack_units: object.rack_units,
                x: object.x,
                y: object.y,
                scale: object.scale,
                rack_position: object.rack_position,
                source_kind: Some(object.source_kind),
                locks: object.locks,
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            timestamp: timestamp.into(),
            scene: SnapshotScene { objects },
            metadata: scene.view,
        }
    }

    pub fn to_json(&self) -> Result<String, RackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and check a snapshot document
    pub fn from_json(json: &str) -> Result<Self, RackError> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| RackError::import_error(format!("invalid snapshot: {}", e)))?;
        if snapshot.version == 0 || snapshot.version > SNAPSHOT_VERSION {
            return Err(RackError::import_error(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        let view = snapshot.metadata;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(view.zoom) || !positive(view.width) || !positive(view.height) {
            return Err(RackError::import_error(
                "metadata zoom, width and height must be positive",
            ));
        }
        Ok(snapshot)
    }
}

/// Replace the contents of `scene` with the objects in a snapshot
///
/// The scene is cleared first. On any failure it is cleared again, so it
/// is never left half-populated.
pub fn import_snapshot(
    json: &str,
    composer: &EquipmentComposer,
    scene: &mut Scene,
) -> Result<(), RackError> {
    let import_span = span!(Level::INFO, "import_snapshot", input_len = json.len());
    let _enter = import_span.enter();

    scene.clear();
    let result = restore(json, composer, scene);
    if let Err(e) = &result {
        warn!(error = %e, "Snapshot import failed, scene cleared");
        scene.clear();
    }
    result
}

fn restore(json: &str, composer: &EquipmentComposer, scene: &mut Scene) -> Result<(), RackError> {
    let snapshot = Snapshot::from_json(json)?;
    scene.view = snapshot.metadata;

    for stored in &snapshot.scene.objects {
        let mut object = composer
            .create_scene_object(&stored.category, &stored.key, stored.x, stored.y)
            .ok_or_else(|| {
                RackError::import_error(format!(
                    "object {} ({}/{}) is not in the catalog",
                    stored.id, stored.category, stored.key
                ))
            })?;

        if !stored.scale.is_finite() || stored.scale <= 0.0 {
            return Err(RackError::import_error(format!(
                "object {} has invalid scale {}",
                stored.id, stored.scale
            )));
        }
        if object.rack_units != stored.rack_units {
            warn!(
                id = stored.id,
                stored = stored.rack_units,
                catalog = object.rack_units,
                "Rack units changed since export, using catalog value"
            );
        }

        object.id = stored.id;
        object.scale = stored.scale;
        object.rack_position = stored.rack_position;
        scene.insert(object)?;
    }

    info!(objects = scene.len(), "Snapshot imported");
    Ok(())
}
