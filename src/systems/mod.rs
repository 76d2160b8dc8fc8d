//! Per-tick machinery: movement resolution, collision queries, culling, the camera and move routes.

pub mod cache;
pub mod camera;
pub mod collision;
pub mod culling;
pub mod movement;
pub mod routes;
