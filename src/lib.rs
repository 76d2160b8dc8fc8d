//! Pixel-precision movement and collision for tile-based RPG maps.

pub mod config;
pub mod constants;
pub mod entity;
pub mod error;
pub mod events;
pub mod formatter;
pub mod map;
pub mod simulation;
pub mod systems;
