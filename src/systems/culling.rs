//! Tracks which events are close enough to the display to be simulated and drawn.

use std::collections::BTreeSet;

use glam::{IVec2, UVec2, Vec2};
use tracing::debug;

use crate::map::grid::Grid;

/// What the culler needs to know about one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullCandidate {
    pub id: u32,
    pub tile: IVec2,
    pub always_active: bool,
    pub no_visual: bool,
}

/// Events that entered or left the active set during one refresh.
///
/// Events that never spawn a visual are left out of both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CullChanges {
    pub spawned: Vec<u32>,
    pub despawned: Vec<u32>,
}

impl CullChanges {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.despawned.is_empty()
    }
}

/// The set of events inside the padded screen rectangle.
#[derive(Debug, Clone)]
pub struct Culler {
    screen: UVec2,
    padding: u32,
    active: BTreeSet<u32>,
    /// Events that had `no_visual` set on the last pass; they produce no notifications.
    silent: BTreeSet<u32>,
    last_display: Option<Vec2>,
    last_player_tile: Option<IVec2>,
}

impl Culler {
    pub fn new(screen: UVec2, padding: u32) -> Self {
        Self {
            screen,
            padding,
            active: BTreeSet::new(),
            silent: BTreeSet::new(),
            last_display: None,
            last_player_tile: None,
        }
    }

    pub fn is_active(&self, id: u32) -> bool {
        self.active.contains(&id)
    }

    pub fn active(&self) -> impl Iterator<Item = u32> + '_ {
        self.active.iter().copied()
    }

    /// Forgets everything, as on a map load. The next refresh recomputes from scratch.
    pub fn reset(&mut self) {
        self.active.clear();
        self.silent.clear();
        self.last_display = None;
        self.last_player_tile = None;
    }

    /// Whether `tile` lies inside the padded rectangle starting at `display` (in tiles), bounds included.
    pub fn in_view(&self, grid: &Grid, display: Vec2, tile: IVec2) -> bool {
        let pad = self.padding as f32;
        let within = |offset: f32, span: u32, dimension: u32, looping: bool| {
            let offset = if looping {
                (offset + pad).rem_euclid(dimension as f32) - pad
            } else {
                offset
            };
            offset >= -pad && offset <= span as f32 + pad
        };
        within(tile.x as f32 - display.x, self.screen.x, grid.width, grid.loop_horizontal)
            && within(tile.y as f32 - display.y, self.screen.y, grid.height, grid.loop_vertical)
    }

    /// Recomputes the active set when the display or the player's tile changed since the last call.
    pub fn refresh<I>(&mut self, grid: &Grid, display: Vec2, player_tile: IVec2, candidates: I) -> CullChanges
    where
        I: IntoIterator<Item = CullCandidate>,
    {
        if self.last_display == Some(display) && self.last_player_tile == Some(player_tile) {
            return CullChanges::default();
        }
        self.last_display = Some(display);
        self.last_player_tile = Some(player_tile);
        self.recompute(grid, display, candidates)
    }

    /// Recomputes the active set unconditionally.
    ///
    /// An active event whose `no_visual` flag flipped since the last pass is spawned or despawned in place.
    pub fn recompute<I>(&mut self, grid: &Grid, display: Vec2, candidates: I) -> CullChanges
    where
        I: IntoIterator<Item = CullCandidate>,
    {
        let mut changes = CullChanges::default();
        let mut next = BTreeSet::new();
        let mut silent = BTreeSet::new();
        for candidate in candidates {
            let id = candidate.id;
            if candidate.no_visual {
                silent.insert(id);
            }
            let shown = self.active.contains(&id) && !self.silent.contains(&id);
            if candidate.always_active || self.in_view(grid, display, candidate.tile) {
                next.insert(id);
                if !candidate.no_visual && !shown {
                    changes.spawned.push(id);
                } else if candidate.no_visual && shown {
                    changes.despawned.push(id);
                }
            }
        }
        // Events gone from the candidates are judged by the flags they last had.
        changes.despawned.extend(
            self.active
                .difference(&next)
                .copied()
                .filter(|id| !self.silent.contains(id)),
        );
        self.active = next;
        self.silent = silent;

        if !changes.is_empty() {
            debug!(
                spawned = changes.spawned.len(),
                despawned = changes.despawned.len(),
                active = self.active.len(),
                "Culling changed"
            );
        }
        changes
    }
}
