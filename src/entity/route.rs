//! Scripted move routes and the cursor that walks through them.

use serde::{Deserialize, Serialize};

use crate::map::direction::{Dir8, Direction};

/// One instruction of a move route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveCommand {
    /// One discrete move.
    Step(Dir8),
    /// As many discrete moves as it takes to cover `pixels`.
    Distance { dir: Dir8, pixels: f32 },
    /// A short walk in a random direction.
    Random,
    /// One move toward the player.
    TowardPlayer,
    Turn(Direction),
    /// Do nothing for this many frames.
    Wait(u32),
    SetSpeed(f32),
    SetThrough(bool),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveRoute {
    pub commands: Vec<MoveCommand>,
    /// Start over after the last command.
    pub repeat: bool,
    /// Skip moves that fail instead of retrying them every tick.
    pub skippable: bool,
}

impl MoveRoute {
    pub fn new(commands: Vec<MoveCommand>) -> Self {
        Self {
            commands,
            repeat: false,
            skippable: false,
        }
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }
}

/// How an event moves when nothing forces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum MoveType {
    #[default]
    Fixed,
    Random,
    Approach,
    Custom(MoveRoute),
}

impl MoveType {
    /// The endless route equivalent to this move type.
    pub fn route(&self) -> Option<MoveRoute> {
        match self {
            MoveType::Fixed => None,
            MoveType::Random => Some(MoveRoute::new(vec![MoveCommand::Random]).repeating().skippable()),
            MoveType::Approach => Some(MoveRoute::new(vec![MoveCommand::TowardPlayer]).repeating().skippable()),
            MoveType::Custom(route) => Some(route.clone()),
        }
    }
}

/// What the cursor wants done next.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteStep {
    Command(MoveCommand),
    /// A move left over from an expanded command.
    Pending(Dir8),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSteps {
    dir: Dir8,
    remaining: u32,
}

/// A position within a [`MoveRoute`].
#[derive(Debug, Clone)]
pub struct RouteCursor {
    route: MoveRoute,
    index: usize,
    pending: Option<PendingSteps>,
    waited: u32,
}

impl RouteCursor {
    pub fn new(route: MoveRoute) -> Self {
        Self {
            route,
            index: 0,
            pending: None,
            waited: 0,
        }
    }

    pub fn is_skippable(&self) -> bool {
        self.route.skippable
    }

    pub fn current(&self) -> RouteStep {
        if let Some(pending) = self.pending {
            return RouteStep::Pending(pending.dir);
        }
        match self.route.commands.get(self.index) {
            Some(command) => RouteStep::Command(command.clone()),
            None => RouteStep::Finished,
        }
    }

    /// Turns the current command into `count` moves along `dir`.
    pub fn expand(&mut self, dir: Dir8, count: u32) {
        if count == 0 {
            self.advance();
        } else {
            self.pending = Some(PendingSteps { dir, remaining: count });
        }
    }

    /// Marks one move, or the whole current command, as done.
    pub fn advance(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.remaining -= 1;
            if pending.remaining > 0 {
                return;
            }
            self.pending = None;
        }
        self.waited = 0;
        self.index += 1;
        if self.index >= self.route.commands.len() && self.route.repeat {
            self.index = 0;
        }
    }

    /// Abandons an expanded command and moves on.
    pub fn skip(&mut self) {
        self.pending = None;
        self.advance();
    }

    /// Counts one frame of a `Wait` command. Returns `true` once it has elapsed.
    pub fn tick_wait(&mut self, frames: u32) -> bool {
        self.waited += 1;
        if self.waited >= frames {
            self.advance();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_counts_down() {
        let mut cursor = RouteCursor::new(MoveRoute::new(vec![
            MoveCommand::Distance {
                dir: Dir8::Right,
                pixels: 8.0,
            },
            MoveCommand::Turn(Direction::Up),
        ]));
        cursor.expand(Dir8::Right, 2);
        assert_eq!(cursor.current(), RouteStep::Pending(Dir8::Right));
        cursor.advance();
        assert_eq!(cursor.current(), RouteStep::Pending(Dir8::Right));
        cursor.advance();
        assert_eq!(cursor.current(), RouteStep::Command(MoveCommand::Turn(Direction::Up)));
        cursor.advance();
        assert_eq!(cursor.current(), RouteStep::Finished);
    }

    #[test]
    fn test_repeat_wraps() {
        let mut cursor = RouteCursor::new(MoveRoute::new(vec![MoveCommand::Step(Dir8::Up)]).repeating());
        cursor.advance();
        assert_eq!(cursor.current(), RouteStep::Command(MoveCommand::Step(Dir8::Up)));
    }

    #[test]
    fn test_wait_elapses() {
        let mut cursor = RouteCursor::new(MoveRoute::new(vec![MoveCommand::Wait(2)]));
        assert!(!cursor.tick_wait(2));
        assert!(cursor.tick_wait(2));
        assert_eq!(cursor.current(), RouteStep::Finished);
    }

    #[test]
    fn test_fixed_has_no_route() {
        assert!(MoveType::Fixed.route().is_none());
        assert!(MoveType::Random.route().unwrap().repeat);
    }
}
