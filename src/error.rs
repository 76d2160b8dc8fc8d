//! Centralized error types for the movement simulation.
//!
//! Blocked moves, out-of-bounds targets and degenerate shapes are gameplay
//! outcomes and never surface here. These errors cover malformed inputs
//! handed to the simulation at load time and lookups of unknown entities.

use crate::entity::EntityId;

/// Main error type for the simulation.
///
/// This is the error type returned by the public `Simulation` API.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),
}

/// Errors raised while loading or validating a [`crate::config::MovementConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Grid step must be positive, got {0}")]
    InvalidGrid(f32),

    #[error("Screen size must be at least one tile, got {0}x{1}")]
    InvalidScreen(u32, u32),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to map data.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("Map must be at least 1x1 tiles, got {width}x{height}")]
    EmptyMap { width: u32, height: u32 },

    #[error("Layer {layer} has {found} tiles, expected {expected}")]
    LayerSize { layer: usize, found: usize, expected: usize },

    #[error("Region layer has {found} tiles, expected {expected}")]
    RegionSize { found: usize, expected: usize },
}

/// Errors related to entity lookups.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EntityError {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Event id {0} is already registered")]
    DuplicateEvent(u32),

    #[error("Event {event} has no page {page}")]
    PageNotFound { event: u32, page: usize },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
