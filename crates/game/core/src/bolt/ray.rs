//! Continuous-direction stepping over the grid.
//!
//! A [`Ray`] remembers where it started, a direction normalised so that its
//! dominant component is exactly one cell, and how many steps it has taken.
//! The current cell is always `origin + round(steps * direction)`, so
//! [`advance`](Ray::advance) and [`regress`](Ray::regress) are exact inverses
//! and a fixed direction always yields the same path.

use bitflags::bitflags;

use crate::state::{COMPASS, Position};

bitflags! {
    /// Solidity of the eight cells around a ray, in [`COMPASS`] order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NeighborMask: u8 {
        const N  = 1 << 0;
        const NE = 1 << 1;
        const E  = 1 << 2;
        const SE = 1 << 3;
        const S  = 1 << 4;
        const SW = 1 << 5;
        const W  = 1 << 6;
        const NW = 1 << 7;
    }
}

impl NeighborMask {
    /// Builds a mask by asking `solid` about each unit offset.
    pub fn from_fn(mut solid: impl FnMut(Position) -> bool) -> Self {
        COMPASS
            .iter()
            .enumerate()
            .filter(|(_, offset)| solid(**offset))
            .fold(Self::empty(), |mask, (i, _)| {
                mask | Self::from_bits_retain(1 << i)
            })
    }

    /// Whether the neighbour at unit `offset` is solid. The zero offset and
    /// anything farther than one cell read as open.
    pub fn is_solid(self, offset: Position) -> bool {
        COMPASS
            .iter()
            .position(|c| *c == offset)
            .is_some_and(|i| self.contains(Self::from_bits_retain(1 << i)))
    }
}

const EPSILON: f64 = 1e-9;

/// Position tracker along a straight line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    origin: Position,
    dx: f64,
    dy: f64,
    steps: i32,
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Position::ORIGIN, Position::ORIGIN)
    }
}

impl Ray {
    /// A ray starting at `source` and heading for `target`.
    ///
    /// When the two coincide the ray has no direction and never moves.
    pub fn new(source: Position, target: Position) -> Self {
        let delta = target - source;
        let m = delta.rdist();
        let (dx, dy) = if m == 0 {
            (0.0, 0.0)
        } else {
            (f64::from(delta.x) / f64::from(m), f64::from(delta.y) / f64::from(m))
        };
        Self {
            origin: source,
            dx,
            dy,
            steps: 0,
        }
    }

    /// A ray from `source` at `degrees`, measured clockwise from east with
    /// y growing downwards.
    pub fn from_degrees(source: Position, degrees: f64) -> Self {
        let mut ray = Self::new(source, source);
        ray.set_degrees(degrees);
        ray
    }

    pub fn pos(&self) -> Position {
        self.offset_at(self.steps)
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn steps(&self) -> i32 {
        self.steps
    }

    /// Direction as a unit-step offset rounded to the nearest neighbour.
    pub fn heading(&self) -> Position {
        Position::new(sign(self.dx), sign(self.dy))
    }

    pub fn is_stationary(&self) -> bool {
        self.dx.abs() < EPSILON && self.dy.abs() < EPSILON
    }

    fn offset_at(&self, steps: i32) -> Position {
        let s = f64::from(steps);
        Position::new(
            self.origin.x + (s * self.dx).round() as i32,
            self.origin.y + (s * self.dy).round() as i32,
        )
    }

    /// Moves one cell along the direction.
    pub fn advance(&mut self) {
        self.steps += 1;
    }

    /// Undoes one [`advance`](Self::advance). Returns false at the origin.
    pub fn regress(&mut self) -> bool {
        if self.steps == 0 {
            return false;
        }
        self.steps -= 1;
        true
    }

    /// Angle of travel in `[0, 360)`.
    pub fn degrees(&self) -> f64 {
        let deg = self.dy.atan2(self.dx).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// Turns the ray to `degrees`, restarting from the current cell.
    pub fn set_degrees(&mut self, degrees: f64) {
        let rad = degrees.to_radians();
        let (x, y) = (rad.cos(), rad.sin());
        let m = x.abs().max(y.abs());
        self.restart();
        if m < EPSILON {
            self.dx = 0.0;
            self.dy = 0.0;
        } else {
            self.dx = x / m;
            self.dy = y / m;
        }
    }

    fn restart(&mut self) {
        self.origin = self.pos();
        self.steps = 0;
    }

    /// The cell one step ahead, without moving.
    pub fn peek(&self) -> Position {
        self.offset_at(self.steps + 1)
    }

    /// Reflects the direction off the solid neighbours in `mask`.
    ///
    /// The ray is expected to sit on the open cell just before the obstacle.
    /// The blocked axis is mirrored; a corner (both or neither axis blocked)
    /// reverses the ray. If the mirrored step would still enter a solid cell
    /// the ray reverses, and failing that takes the first open neighbour.
    pub fn bounce(&mut self, mask: NeighborMask) {
        let (sx, sy) = (sign(self.dx), sign(self.dy));
        let block_x = sx != 0 && mask.is_solid(Position::new(sx, 0));
        let block_y = sy != 0 && mask.is_solid(Position::new(0, sy));
        let (ox, oy) = (self.dx, self.dy);

        self.restart();
        match (block_x, block_y) {
            (true, false) => self.dx = -ox,
            (false, true) => self.dy = -oy,
            _ => {
                self.dx = -ox;
                self.dy = -oy;
            }
        }

        if !mask.is_solid(self.peek() - self.pos()) {
            return;
        }
        self.dx = -ox;
        self.dy = -oy;
        if !mask.is_solid(self.peek() - self.pos()) {
            return;
        }
        if let Some(open) = COMPASS.iter().find(|c| !mask.is_solid(**c)) {
            self.dx = f64::from(open.x);
            self.dy = f64::from(open.y);
        }
    }
}

fn sign(v: f64) -> i32 {
    if v > EPSILON {
        1
    } else if v < -EPSILON {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_steps_one_cell_at_a_time() {
        let mut ray = Ray::new(Position::new(0, 0), Position::new(6, 3));
        let mut last = ray.pos();
        for _ in 0..12 {
            ray.advance();
            assert_eq!(ray.pos().distance(last), 1);
            last = ray.pos();
        }
        let mut again = Ray::new(Position::new(0, 0), Position::new(6, 3));
        for _ in 0..6 {
            again.advance();
        }
        assert_eq!(again.pos(), Position::new(6, 3));
    }

    #[test]
    fn regress_walks_back_to_origin() {
        let start = Position::new(2, 2);
        let mut ray = Ray::new(start, Position::new(7, 4));
        let mut path = vec![ray.pos()];
        for _ in 0..5 {
            ray.advance();
            path.push(ray.pos());
        }
        while let Some(expected) = path.pop() {
            assert_eq!(ray.pos(), expected);
            ray.regress();
        }
        assert_eq!(ray.pos(), start);
        assert!(!ray.regress());
    }

    #[test]
    fn degrees_round_trip() {
        let ray = Ray::new(Position::new(0, 0), Position::new(4, 4));
        assert!((ray.degrees() - 45.0).abs() < 1e-6);
        let west = Ray::new(Position::new(5, 5), Position::new(0, 5));
        assert!((west.degrees() - 180.0).abs() < 1e-6);

        let mut turned = Ray::from_degrees(Position::new(3, 3), 90.0);
        turned.advance();
        assert_eq!(turned.pos(), Position::new(3, 4));
    }

    #[test]
    fn bounce_mirrors_the_blocked_axis() {
        let mut ray = Ray::new(Position::new(0, 0), Position::new(4, 4));
        ray.advance();
        // Wall to the east only.
        let mask = NeighborMask::from_fn(|d| d.x == 1);
        ray.bounce(mask);
        ray.advance();
        assert_eq!(ray.pos(), Position::new(0, 2));
    }

    #[test]
    fn bounce_into_a_corner_reverses() {
        let mut ray = Ray::new(Position::new(0, 0), Position::new(3, 0));
        ray.advance();
        let mask = NeighborMask::from_fn(|d| d.x == 1);
        ray.bounce(mask);
        ray.advance();
        assert_eq!(ray.pos(), Position::new(0, 0));
    }

    #[test]
    fn bounce_never_steps_into_a_solid_neighbour() {
        let dirs = [(5, 1), (1, 5), (-4, 2), (3, -3), (0, 4)];
        let masks = [
            NeighborMask::E | NeighborMask::NE | NeighborMask::SE,
            NeighborMask::S | NeighborMask::SE | NeighborMask::SW,
            NeighborMask::W | NeighborMask::NW | NeighborMask::SW | NeighborMask::S,
            NeighborMask::all() - NeighborMask::W,
        ];
        for (x, y) in dirs {
            for mask in masks {
                let mut ray = Ray::new(Position::new(10, 10), Position::new(10 + x, 10 + y));
                ray.bounce(mask);
                let here = ray.pos();
                ray.advance();
                assert!(!mask.is_solid(ray.pos() - here), "{x},{y} {mask:?}");
            }
        }
    }

    #[test]
    fn mask_reads_compass_offsets() {
        let mask = NeighborMask::from_fn(|d| d == Position::new(-1, -1));
        assert_eq!(mask, NeighborMask::NW);
        assert!(mask.is_solid(Position::new(-1, -1)));
        assert!(!mask.is_solid(Position::new(0, 0)));
    }
}
