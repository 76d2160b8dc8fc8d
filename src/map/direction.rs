use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumCount, EnumIter};

/// A cardinal facing, numbered like the keys of a numeric keypad.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount, AsRefStr)]
pub enum Direction {
    Down = 2,
    Left = 4,
    Right = 6,
    Up = 8,
}

impl Direction {
    pub const DIRECTIONS: [Direction; 4] = [Direction::Down, Direction::Left, Direction::Right, Direction::Up];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The numeric keypad code of this direction.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            2 => Some(Direction::Down),
            4 => Some(Direction::Left),
            6 => Some(Direction::Right),
            8 => Some(Direction::Up),
            _ => None,
        }
    }

    /// Slot used by per-direction tables.
    pub fn index(&self) -> usize {
        match self {
            Direction::Down => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Up => 3,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn as_ivec2(&self) -> IVec2 {
        (*self).into()
    }

    pub fn as_vec2(&self) -> Vec2 {
        self.as_ivec2().as_vec2()
    }

    /// The two diagonals sharing this cardinal component.
    pub fn adjacent_diagonals(&self) -> [Dir8; 2] {
        match self {
            Direction::Down => [Dir8::DownRight, Dir8::DownLeft],
            Direction::Left => [Dir8::DownLeft, Dir8::UpLeft],
            Direction::Right => [Dir8::UpRight, Dir8::DownRight],
            Direction::Up => [Dir8::UpLeft, Dir8::UpRight],
        }
    }
}

impl From<Direction> for IVec2 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => -IVec2::Y,
            Direction::Down => IVec2::Y,
            Direction::Left => -IVec2::X,
            Direction::Right => IVec2::X,
        }
    }
}

/// An eight-way direction, numbered like the keys of a numeric keypad.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount, AsRefStr)]
pub enum Dir8 {
    DownLeft = 1,
    Down = 2,
    DownRight = 3,
    Left = 4,
    Right = 6,
    UpLeft = 7,
    Up = 8,
    UpRight = 9,
}

impl Dir8 {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Dir8> {
        match code {
            1 => Some(Dir8::DownLeft),
            2 => Some(Dir8::Down),
            3 => Some(Dir8::DownRight),
            4 => Some(Dir8::Left),
            6 => Some(Dir8::Right),
            7 => Some(Dir8::UpLeft),
            8 => Some(Dir8::Up),
            9 => Some(Dir8::UpRight),
            _ => None,
        }
    }

    /// Builds the direction pointing along the signs of `delta`.
    pub fn from_signs(dx: i32, dy: i32) -> Option<Dir8> {
        match (dx.signum(), dy.signum()) {
            (-1, 1) => Some(Dir8::DownLeft),
            (0, 1) => Some(Dir8::Down),
            (1, 1) => Some(Dir8::DownRight),
            (-1, 0) => Some(Dir8::Left),
            (1, 0) => Some(Dir8::Right),
            (-1, -1) => Some(Dir8::UpLeft),
            (0, -1) => Some(Dir8::Up),
            (1, -1) => Some(Dir8::UpRight),
            _ => None,
        }
    }

    pub fn is_diagonal(&self) -> bool {
        self.split().is_some()
    }

    /// Splits a diagonal into its `(horizontal, vertical)` components.
    pub fn split(&self) -> Option<(Direction, Direction)> {
        match self {
            Dir8::DownLeft => Some((Direction::Left, Direction::Down)),
            Dir8::DownRight => Some((Direction::Right, Direction::Down)),
            Dir8::UpLeft => Some((Direction::Left, Direction::Up)),
            Dir8::UpRight => Some((Direction::Right, Direction::Up)),
            _ => None,
        }
    }

    pub fn cardinal(&self) -> Option<Direction> {
        match self {
            Dir8::Down => Some(Direction::Down),
            Dir8::Left => Some(Direction::Left),
            Dir8::Right => Some(Direction::Right),
            Dir8::Up => Some(Direction::Up),
            _ => None,
        }
    }

    /// Collapses to a cardinal, keeping the horizontal component of diagonals.
    pub fn to_dir4(&self) -> Direction {
        match self.split() {
            Some((horz, _)) => horz,
            None => self.cardinal().unwrap_or(Direction::Down),
        }
    }

    pub fn as_ivec2(&self) -> IVec2 {
        match self.split() {
            Some((horz, vert)) => horz.as_ivec2() + vert.as_ivec2(),
            None => self.to_dir4().as_ivec2(),
        }
    }

    pub fn from_parts(horz: Direction, vert: Direction) -> Option<Dir8> {
        let delta = horz.as_ivec2() + vert.as_ivec2();
        Dir8::from_signs(delta.x, delta.y).filter(|d| d.is_diagonal())
    }
}

impl From<Direction> for Dir8 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Down => Dir8::Down,
            Direction::Left => Dir8::Left,
            Direction::Right => Dir8::Right,
            Direction::Up => Dir8::Up,
        }
    }
}
