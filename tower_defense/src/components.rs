//! Game-specific components
//!
//! These types live in the game crate and are registered into the same
//! registry as the engine components, so archetype files can mix both.

use serde_json::{json, Value};
use tower_engine::ecs::{ComponentType, EditorInput};
use tower_engine::foundation::json::JsonExt;
use tower_engine::foundation::math::Vec2;
use tower_engine::physics::rect_vs_rect;
use tower_engine::prelude::*;

/// Tile-grid position
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionComponent {
    /// Position on the map
    pub value: Vec2,

    /// Layer number
    pub z: f32,
}

impl PositionComponent {
    /// Position on a layer
    pub fn new(value: Vec2, z: f32) -> Self {
        Self { value, z }
    }
}

impl ComponentType for PositionComponent {
    const NAME: &'static str = "sPositionComponent";
}

impl JsonComponent for PositionComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self {
            value: Vec2::new(json.get_f32("x", 0.0), json.get_f32("y", 0.0)),
            z: json.get_f32("z", 0.0),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({ "x": self.value.x, "y": self.value.y, "z": self.z }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_f32("x", &mut self.value.x);
        changed |= input.edit_f32("y", &mut self.value.y);
        changed |= input.edit_f32("z", &mut self.z);
        changed
    }
}

/// What an entity is on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    /// Player or enemy
    Character,
    /// Pickup or prop
    #[default]
    Object,
    /// Floor that can be walked on
    TileWalkable,
    /// Wall or obstacle
    TileNotWalkable,
    /// Stairs leading up a level
    TileStairsUp,
    /// Stairs leading down a level
    TileStairsDown,
}

impl EntityKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 6] = [
        Self::Character,
        Self::Object,
        Self::TileWalkable,
        Self::TileNotWalkable,
        Self::TileStairsUp,
        Self::TileStairsDown,
    ];

    /// Name used in archetype files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "CHARACTER",
            Self::Object => "OBJECT",
            Self::TileWalkable => "TILE_WALKABLE",
            Self::TileNotWalkable => "TILE_NOT_WALKABLE",
            Self::TileStairsUp => "TILE_STAIRS_UP",
            Self::TileStairsDown => "TILE_STAIRS_DOWN",
        }
    }

    /// Parse an archetype file name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether characters can stand on it
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::TileWalkable | Self::TileStairsUp | Self::TileStairsDown)
    }
}

/// Entity kind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeComponent {
    /// Kind of entity
    pub kind: EntityKind,
}

impl ComponentType for TypeComponent {
    const NAME: &'static str = "sTypeComponent";
}

impl JsonComponent for TypeComponent {
    fn load_from_json(archetype: &str, json: &Value) -> EngineResult<Self> {
        let name = json.get_string("type", EntityKind::default().as_str());
        let kind = EntityKind::from_name(&name).ok_or_else(|| {
            EngineError::NotImplemented(format!(
                "Failed to load sTypeComponent of {archetype}: the entity type {name} does not exist"
            ))
        })?;
        Ok(Self { kind })
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({ "type": self.kind.as_str() }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let names = EntityKind::ALL.map(EntityKind::as_str);
        let mut selected = EntityKind::ALL.iter().position(|kind| *kind == self.kind).unwrap_or(0);
        if input.edit_choice("type", &names, &mut selected) {
            if let Some(kind) = EntityKind::ALL.get(selected) {
                self.kind = *kind;
                return true;
            }
        }
        false
    }
}

/// Facing of a character sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// North
    N,
    /// North-east
    NE,
    /// East
    E,
    /// South-east
    SE,
    /// South
    #[default]
    S,
    /// South-west
    SW,
    /// West
    W,
    /// North-west
    NW,
}

impl Orientation {
    /// Every orientation, clockwise from north
    pub const ALL: [Self; 8] = [Self::N, Self::NE, Self::E, Self::SE, Self::S, Self::SW, Self::W, Self::NW];

    /// Name used in archetype files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }

    /// Parse an archetype file name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|orientation| orientation.as_str() == name)
    }

    /// Closest orientation to a movement vector, `y` pointing north
    ///
    /// Returns `None` for a zero vector.
    pub fn from_vector(direction: &Vec2) -> Option<Self> {
        if direction.norm_squared() <= f32::EPSILON {
            return None;
        }
        // Clockwise angle from north
        let angle = direction.x.atan2(direction.y).to_degrees().rem_euclid(360.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let sector = ((angle + 22.5) / 45.0) as usize % 8;
        Some(Self::ALL[sector])
    }
}

/// Movement direction and facing
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionComponent {
    /// Direction of travel
    pub value: Vec2,

    /// Sprite facing
    pub orientation: Orientation,

    /// Movement speed multiplier
    pub speed: f32,

    /// Whether the entity moved this frame
    pub moved: bool,
}

impl Default for DirectionComponent {
    fn default() -> Self {
        Self {
            value: Vec2::zeros(),
            orientation: Orientation::default(),
            speed: 1.0,
            moved: false,
        }
    }
}

impl DirectionComponent {
    /// Change the direction of travel, turning to face it
    pub fn set_direction(&mut self, value: Vec2) {
        if let Some(orientation) = Orientation::from_vector(&value) {
            self.orientation = orientation;
        }
        self.value = value;
    }
}

impl ComponentType for DirectionComponent {
    const NAME: &'static str = "sDirectionComponent";
}

impl JsonComponent for DirectionComponent {
    fn load_from_json(archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        let name = json.get_string("orientation", defaults.orientation.as_str());
        let orientation = Orientation::from_name(&name).unwrap_or_else(|| {
            log::warn!("Unknown orientation {name} in {archetype}, facing {}", defaults.orientation.as_str());
            defaults.orientation
        });
        Ok(Self {
            value: Vec2::new(json.get_f32("x", 0.0), json.get_f32("y", 0.0)),
            orientation,
            speed: json.get_f32("speed", defaults.speed),
            moved: false,
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({
            "x": self.value.x,
            "y": self.value.y,
            "orientation": self.orientation.as_str(),
            "speed": self.speed,
        }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let names = Orientation::ALL.map(Orientation::as_str);
        let mut selected = Orientation::ALL
            .iter()
            .position(|orientation| *orientation == self.orientation)
            .unwrap_or(0);
        let mut changed = input.edit_f32("x", &mut self.value.x);
        changed |= input.edit_f32("y", &mut self.value.y);
        changed |= input.edit_f32("speed", &mut self.speed);
        if input.edit_choice("orientation", &names, &mut selected) {
            if let Some(orientation) = Orientation::ALL.get(selected) {
                self.orientation = *orientation;
                changed = true;
            }
        }
        changed
    }
}

/// Axis-aligned 2D hit box, relative to the entity position
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HitBoxComponent {
    /// Lower corner
    pub min: Vec2,

    /// Upper corner
    pub max: Vec2,
}

impl HitBoxComponent {
    /// Hit box from its corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Whether two hit boxes overlap once moved to their positions
    pub fn overlaps(&self, position: &Vec2, other: &Self, other_position: &Vec2) -> bool {
        rect_vs_rect(
            &(self.min + position),
            &(self.max + position),
            &(other.min + other_position),
            &(other.max + other_position),
        )
    }
}

fn corner(json: &Value, key: &str) -> Vec2 {
    let object = json.get_object(key);
    Vec2::new(object.get_f32("x", 0.0), object.get_f32("y", 0.0))
}

impl ComponentType for HitBoxComponent {
    const NAME: &'static str = "sHitBoxComponent";
}

impl JsonComponent for HitBoxComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self {
            min: corner(json, "min"),
            max: corner(json, "max"),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({
            "min": { "x": self.min.x, "y": self.min.y },
            "max": { "x": self.max.x, "y": self.max.y },
        }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_f32("min x", &mut self.min.x);
        changed |= input.edit_f32("min y", &mut self.min.y);
        changed |= input.edit_f32("max x", &mut self.max.x);
        changed |= input.edit_f32("max y", &mut self.max.y);
        changed
    }
}

/// Register every game component type
pub fn register_game_components(registry: &mut ComponentTypeRegistry) -> EngineResult<()> {
    registry.register::<PositionComponent>()?;
    registry.register::<TypeComponent>()?;
    registry.register::<DirectionComponent>()?;
    registry.register::<HitBoxComponent>()?;
    Ok(())
}
