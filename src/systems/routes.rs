//! Runs move routes, forced or autonomous, one command at a time.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::Rng;
use strum::IntoEnumIterator;
use tracing::trace;

use crate::entity::route::{MoveCommand, RouteCursor, RouteStep};
use crate::entity::Movable;
use crate::map::direction::{Dir8, Direction};
use crate::map::grid::Grid;
use crate::systems::movement::{MoveOutcome, Resolver};

/// Random walks cover somewhere between these many pixels, minus the grid step.
const RANDOM_WALK_PIXELS: std::ops::RangeInclusive<i32> = 6..=32;

/// Commands that complete without moving are run back to back, up to this many per tick.
const INSTANT_COMMAND_LIMIT: usize = 64;

/// What running a route did this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteAction {
    /// Nothing moved: waiting, or only instant commands ran.
    Idle,
    /// A move was attempted.
    Moved(MoveOutcome),
    /// The route has no more commands.
    Finished,
}

/// Everything outside the mover that a route can look at.
pub struct RouteContext<'r, 'a> {
    pub resolver: &'r Resolver<'a>,
    pub grid: &'r Grid,
    pub player_position: Vec2,
    pub dir8: bool,
}

/// Runs `cursor` for one tick. The mover must not be in the middle of a step.
pub fn run_route<M, R>(cursor: &mut RouteCursor, mover: &mut M, ctx: &RouteContext<'_, '_>, rng: &mut R) -> RouteAction
where
    M: Movable + ?Sized,
    R: Rng,
{
    for _ in 0..INSTANT_COMMAND_LIMIT {
        let command = match cursor.current() {
            RouteStep::Finished => return RouteAction::Finished,
            RouteStep::Pending(dir) => return RouteAction::Moved(attempt(cursor, mover, ctx, dir, true)),
            RouteStep::Command(command) => command,
        };

        match command {
            MoveCommand::Step(dir) => {
                return RouteAction::Moved(attempt(cursor, mover, ctx, dir, false));
            }
            MoveCommand::Distance { dir, pixels } => {
                let distance = mover.character().move_distance(dir.is_diagonal());
                let steps = (pixels.max(0.0) / distance).ceil() as u32;
                cursor.expand(dir, steps);
            }
            MoveCommand::Random => {
                let dir = random_direction(rng, ctx.dir8);
                let distance = mover.character().move_distance(dir.is_diagonal());
                let pixels = (rng.random_range(RANDOM_WALK_PIXELS) as f32 - mover.character().grid).max(1.0);
                let steps = (pixels / distance).round() as u32;
                trace!(entity = %mover.id(), direction = dir.as_ref(), steps, "Random walk");
                cursor.expand(dir, steps);
            }
            MoveCommand::TowardPlayer => {
                let outcome = move_toward(mover, ctx);
                finish_move(cursor, outcome, false);
                return RouteAction::Moved(outcome);
            }
            MoveCommand::Turn(dir) => {
                mover.character_mut().set_direction(dir);
                cursor.advance();
            }
            MoveCommand::Wait(frames) => {
                cursor.tick_wait(frames);
                return RouteAction::Idle;
            }
            MoveCommand::SetSpeed(speed) => {
                mover.character_mut().move_speed = speed;
                cursor.advance();
            }
            MoveCommand::SetThrough(through) => {
                mover.character_mut().through = through;
                cursor.advance();
            }
        }
    }
    RouteAction::Idle
}

fn attempt<M: Movable + ?Sized>(
    cursor: &mut RouteCursor,
    mover: &mut M,
    ctx: &RouteContext<'_, '_>,
    dir: Dir8,
    expanded: bool,
) -> MoveOutcome {
    let outcome = ctx.resolver.move_dir8(mover, dir, true);
    finish_move(cursor, outcome, expanded);
    outcome
}

/// Advances past a successful move. A failed one is skipped on skippable routes and retried otherwise.
fn finish_move(cursor: &mut RouteCursor, outcome: MoveOutcome, expanded: bool) {
    if outcome.succeeded() {
        cursor.advance();
    } else if cursor.is_skippable() {
        if expanded {
            cursor.skip();
        } else {
            cursor.advance();
        }
    }
}

fn random_direction<R: Rng>(rng: &mut R, dir8: bool) -> Dir8 {
    let choices: Vec<Dir8> = if dir8 {
        Dir8::iter().collect()
    } else {
        Direction::DIRECTIONS.into_iter().map(Dir8::from).collect()
    };
    choices.choose(rng).copied().unwrap_or(Dir8::Down)
}

/// One move along the longer axis toward the player, falling back to the shorter one.
fn move_toward<M: Movable + ?Sized>(mover: &mut M, ctx: &RouteContext<'_, '_>) -> MoveOutcome {
    let delta = ctx.grid.pixel_delta(mover.character().position, ctx.player_position);
    let facing = mover.character().direction;
    if delta == Vec2::ZERO {
        return ctx.resolver.move_straight(mover, facing, false);
    }
    let horizontal = (delta.x != 0.0).then(|| if delta.x > 0.0 { Direction::Right } else { Direction::Left });
    let vertical = (delta.y != 0.0).then(|| if delta.y > 0.0 { Direction::Down } else { Direction::Up });
    let (first, second) = if delta.x.abs() > delta.y.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };

    let mut outcome = None;
    for dir in [first, second].into_iter().flatten() {
        let result = ctx.resolver.move_straight(mover, dir, true);
        if result.succeeded() {
            return result;
        }
        outcome.get_or_insert(result);
    }
    outcome.unwrap_or_else(|| ctx.resolver.move_straight(mover, facing, false))
}
