//! # Tower Defense
//!
//! Game-side component types and startup glue for the tower defense game
//! running on `tower_engine`.

pub mod components;
pub mod game;

pub use components::{
    register_game_components, DirectionComponent, EntityKind, HitBoxComponent, Orientation, PositionComponent,
    TypeComponent,
};
pub use game::{game_registry, load_catalog, Game, GameError, FRAME_DT};
