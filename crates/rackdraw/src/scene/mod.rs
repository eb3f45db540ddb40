//! Scene graph: the placed equipment that makes up one diagram
//!
//! Objects are owned by the [`Scene`] and addressed by a numeric id that is
//! stable for the object's lifetime. Ids are never reused within a scene,
//! except when a snapshot import restores the ids it recorded.

mod composer;

pub use composer::EquipmentComposer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{Canvas, EditorConfig, RackError, Rect, SourceKind};

/// Identifier of a placed object
pub type ObjectId = u64;

/// Largest id a scene accepts, the last integer a JavaScript number holds exactly
pub const MAX_OBJECT_ID: ObjectId = (1 << 53) - 1;

/// Category whose objects act as rack frames for position inference
pub const RACK_CATEGORY: &str = "racks";

/// Transform locks applied to placed equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockFlags {
    pub lock_rotation: bool,
    pub lock_skewing: bool,
    pub uniform_scaling: bool,
}

impl LockFlags {
    /// Equipment only moves and resizes along the rack axis
    pub const EQUIPMENT: LockFlags = LockFlags {
        lock_rotation: true,
        lock_skewing: true,
        uniform_scaling: true,
    };
}

impl Default for LockFlags {
    fn default() -> Self {
        Self::EQUIPMENT
    }
}

/// One placed piece of equipment
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub category: String,
    pub key: String,
    pub equipment_name: String,
    /// Fixed at creation from the catalog
    pub rack_units: u32,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub locks: LockFlags,
    /// Lowest rack unit the device occupies, U1 at the bottom
    pub rack_position: Option<u32>,
    pub source_kind: SourceKind,
    pub surface: Canvas,
}

impl SceneObject {
    /// On-canvas bounds after scaling
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.surface.width * self.scale,
            self.surface.height * self.scale,
        )
    }

    pub fn is_rack(&self) -> bool {
        self.category == RACK_CATEGORY
    }
}

/// View state saved alongside the objects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewMetadata {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self::from_config(&config)
    }
}

impl ViewMetadata {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            zoom: config.zoom,
            width: config.canvas_width,
            height: config.canvas_height,
        }
    }
}

/// One row of the equipment list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentEntry {
    pub id: ObjectId,
    pub equipment_name: String,
    pub category: String,
    pub key: String,
    pub rack_units: u32,
    pub rack_position: Option<u32>,
}

/// The diagram being edited
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: ObjectId,
    pub view: ViewMetadata,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ViewMetadata::default())
    }
}

impl Scene {
    pub fn new(view: ViewMetadata) -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            view,
        }
    }

    /// Add an object under a fresh id, returning the id
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        object.id = id;
        trace!(id, key = %object.key, "Object added");
        self.objects.insert(id, object);
        id
    }

    /// Add an object keeping its own id
    pub fn insert(&mut self, object: SceneObject) -> Result<(), RackError> {
        if self.objects.contains_key(&object.id) {
            return Err(RackError::import_error(format!(
                "duplicate object id {}",
                object.id
            )));
        }
        if object.id == 0 || object.id > MAX_OBJECT_ID {
            return Err(RackError::import_error(format!(
                "object id {} is outside 1..={}",
                object.id, MAX_OBJECT_ID
            )));
        }
        self.next_id = self.next_id.max(object.id + 1);
        self.objects.insert(object.id, object);
        Ok(())
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Move an object; false if the id is unknown
    pub fn move_to(&mut self, id: ObjectId, x: f64, y: f64) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.x = x;
                object.y = y;
                true
            }
            None => false,
        }
    }

    /// Set an object's uniform scale
    pub fn scale_object(&mut self, id: ObjectId, scale: f64) -> Result<(), RackError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RackError::render_error(format!(
                "scale must be a positive number, got {}",
                scale
            )));
        }
        let object = self
            .objects
            .get_mut(&id)
            .ok_or_else(|| RackError::render_error(format!("no object with id {}", id)))?;
        object.scale = scale;
        Ok(())
    }

    pub fn set_rack_position(&mut self, id: ObjectId, position: Option<u32>) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.rack_position = position;
                true
            }
            None => false,
        }
    }

    /// Drop every object; ids restart from 1
    pub fn clear(&mut self) {
        self.objects.clear();
        self.next_id = 1;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in id order, which is also paint order
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Bounds of all objects, or `None` for an empty scene
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .values()
            .map(SceneObject::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Derive rack positions from where devices sit on rack frames
    ///
    /// A device belongs to the rack containing its horizontal center and
    /// overlapping it vertically. Its position is the lowest unit it covers,
    /// counted from the rack bottom (U1). Devices outside every rack keep
    /// whatever position they had. Returns how many positions were set.
    pub fn infer_rack_positions(&mut self) -> usize {
        let racks: Vec<(Rect, u32)> = self
            .objects
            .values()
            .filter(|object| object.is_rack())
            .map(|object| (object.bounds(), object.rack_units))
            .collect();

        let mut assigned = 0;
        for object in self.objects.values_mut().filter(|o| !o.is_rack()) {
            let bounds = object.bounds();
            let Some((rack, units)) = racks.iter().find(|(rack, _)| {
                let cx = bounds.center_x();
                cx >= rack.x && cx <= rack.right() && bounds.y < rack.bottom() && bounds.bottom() > rack.y
            }) else {
                continue;
            };

            let unit = rack.height / f64::from(*units);
            let from_bottom = ((rack.bottom() - bounds.bottom()) / unit).round();
            let highest_start = units.saturating_sub(object.rack_units).saturating_add(1).max(1);
            let position = (from_bottom.max(0.0) as u32 + 1).clamp(1, highest_start);

            debug!(id = object.id, position, "Inferred rack position");
            object.rack_position = Some(position);
            assigned += 1;
        }
        assigned
    }

    /// Equipment sorted by rack position then name, unpositioned last
    pub fn equipment_list(&self) -> Vec<EquipmentEntry> {
        let mut entries: Vec<EquipmentEntry> = self
            .objects
            .values()
            .map(|object| EquipmentEntry {
                id: object.id,
                equipment_name: object.equipment_name.clone(),
                category: object.category.clone(),
                key: object.key.clone(),
                rack_units: object.rack_units,
                rack_position: object.rack_position,
            })
            .collect();
        entries.sort_by(|a, b| {
            let position = |e: &EquipmentEntry| e.rack_position.unwrap_or(u32::MAX);
            position(a)
                .cmp(&position(b))
                .then_with(|| a.rack_position.is_none().cmp(&b.rack_position.is_none()))
                .then_with(|| a.equipment_name.cmp(&b.equipment_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }
}
