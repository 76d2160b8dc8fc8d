//! Pixel/tile coordinate conversion and loop-wrap arithmetic.
//!
//! Every function here is pure: wrapping only happens on axes the map marks as
//! looping, and a non-looping axis passes coordinates through untouched.

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use crate::constants::TILE_SIZE;
use crate::map::direction::Direction;

/// Converts a pixel coordinate to the index of the tile containing it.
pub fn pixel_to_tile(px: f32) -> i32 {
    (px / TILE_SIZE).floor() as i32
}

/// Converts a tile index to the pixel coordinate of its top-left corner.
pub fn tile_to_pixel(tile: i32) -> f32 {
    tile as f32 * TILE_SIZE
}

/// Converts a tile index to the pixel coordinate of its centre.
pub fn tile_center(tile: i32) -> f32 {
    tile_to_pixel(tile) + TILE_SIZE / 2.0
}

/// Converts a pixel position to the tile containing it.
pub fn tile_of(pos: Vec2) -> IVec2 {
    IVec2::new(pixel_to_tile(pos.x), pixel_to_tile(pos.y))
}

/// Shifts `x` by `distance` pixels if `dir` is horizontal.
pub fn px_with_direction(x: f32, dir: Direction, distance: f32) -> f32 {
    match dir {
        Direction::Right => x + distance,
        Direction::Left => x - distance,
        _ => x,
    }
}

/// Shifts `y` by `distance` pixels if `dir` is vertical.
pub fn py_with_direction(y: f32, dir: Direction, distance: f32) -> f32 {
    match dir {
        Direction::Down => y + distance,
        Direction::Up => y - distance,
        _ => y,
    }
}

/// The dimensions and loop flags of a map, which is all coordinate math needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    pub loop_horizontal: bool,
    pub loop_vertical: bool,
}

impl Grid {
    pub fn new(width: u32, height: u32, loop_horizontal: bool, loop_vertical: bool) -> Self {
        Self {
            width,
            height,
            loop_horizontal,
            loop_vertical,
        }
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    pub fn round_px(&self, x: f32) -> f32 {
        if self.loop_horizontal {
            x.rem_euclid(self.pixel_width())
        } else {
            x
        }
    }

    pub fn round_py(&self, y: f32) -> f32 {
        if self.loop_vertical {
            y.rem_euclid(self.pixel_height())
        } else {
            y
        }
    }

    pub fn round_pos(&self, pos: Vec2) -> Vec2 {
        Vec2::new(self.round_px(pos.x), self.round_py(pos.y))
    }

    pub fn round_x(&self, x: i32) -> i32 {
        if self.loop_horizontal {
            x.rem_euclid(self.width as i32)
        } else {
            x
        }
    }

    pub fn round_y(&self, y: i32) -> i32 {
        if self.loop_vertical {
            y.rem_euclid(self.height as i32)
        } else {
            y
        }
    }

    pub fn round_tile(&self, tile: IVec2) -> IVec2 {
        IVec2::new(self.round_x(tile.x), self.round_y(tile.y))
    }

    pub fn round_px_with_direction(&self, x: f32, dir: Direction, distance: f32) -> f32 {
        self.round_px(px_with_direction(x, dir, distance))
    }

    pub fn round_py_with_direction(&self, y: f32, dir: Direction, distance: f32) -> f32 {
        self.round_py(py_with_direction(y, dir, distance))
    }

    /// Shifts a position along `dir` without wrapping.
    pub fn shift(&self, pos: Vec2, dir: Direction, distance: f32) -> Vec2 {
        pos + dir.as_vec2() * distance
    }

    /// Shifts a position along `dir` and wraps it onto the map.
    pub fn round_shift(&self, pos: Vec2, dir: Direction, distance: f32) -> Vec2 {
        self.round_pos(self.shift(pos, dir, distance))
    }

    pub fn is_valid(&self, tile: IVec2) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width as i32 && tile.y < self.height as i32
    }

    /// Pixel offsets under which a wrapped coordinate has an equivalent image.
    ///
    /// Always starts with the zero offset; looping axes add one image on each side.
    pub fn loop_images(&self) -> SmallVec<[Vec2; 9]> {
        let xs: SmallVec<[f32; 3]> = if self.loop_horizontal {
            SmallVec::from_slice(&[0.0, -self.pixel_width(), self.pixel_width()])
        } else {
            SmallVec::from_slice(&[0.0])
        };
        let ys: SmallVec<[f32; 3]> = if self.loop_vertical {
            SmallVec::from_slice(&[0.0, -self.pixel_height(), self.pixel_height()])
        } else {
            SmallVec::from_slice(&[0.0])
        };

        let mut images = SmallVec::new();
        for &y in &ys {
            for &x in &xs {
                images.push(Vec2::new(x, y));
            }
        }
        images
    }

    /// Smallest signed tile distance from `from` to `to` along x, taking loops into account.
    pub fn delta_x(&self, from: f32, to: f32) -> f32 {
        let delta = to - from;
        if self.loop_horizontal {
            wrap_delta(delta, self.width as f32)
        } else {
            delta
        }
    }

    /// Smallest signed tile distance from `from` to `to` along y, taking loops into account.
    pub fn delta_y(&self, from: f32, to: f32) -> f32 {
        let delta = to - from;
        if self.loop_vertical {
            wrap_delta(delta, self.height as f32)
        } else {
            delta
        }
    }

    /// Shortest pixel offset from `from` to `to`, crossing looping seams when that is closer.
    pub fn pixel_delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        let delta = to - from;
        Vec2::new(
            if self.loop_horizontal { wrap_delta(delta.x, self.pixel_width()) } else { delta.x },
            if self.loop_vertical { wrap_delta(delta.y, self.pixel_height()) } else { delta.y },
        )
    }
}

fn wrap_delta(delta: f32, span: f32) -> f32 {
    let wrapped = delta.rem_euclid(span);
    if wrapped > span / 2.0 {
        wrapped - span
    } else {
        wrapped
    }
}
