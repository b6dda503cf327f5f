use std::fmt;

/// Unique identifier for any actor tracked in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Reserved identifier for effects with no in-world originator
    /// (traps, miscasts, environmental blasts).
    pub const SYSTEM: Self = Self(u32::MAX);

    /// Returns true if this entity represents a system source.
    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 == Self::SYSTEM.0
    }

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
///
/// Also used for offsets between positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// The eight unit offsets, clockwise from north.
pub const COMPASS: [Position; 8] = [
    Position::new(0, -1),
    Position::new(1, -1),
    Position::new(1, 0),
    Position::new(1, 1),
    Position::new(0, 1),
    Position::new(-1, 1),
    Position::new(-1, 0),
    Position::new(-1, -1),
];

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev length of this offset.
    #[inline]
    pub fn rdist(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Squared Euclidean length of this offset.
    #[inline]
    pub fn abs(self) -> i32 {
        self.x * self.x + self.y * self.y
    }

    /// Chebyshev distance between two cells.
    #[inline]
    pub fn distance(self, other: Position) -> i32 {
        (self - other).rdist()
    }

    #[inline]
    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// Iterates over the eight neighbouring cells, clockwise from north.
    pub fn neighbours(self) -> impl Iterator<Item = Position> {
        COMPASS.into_iter().map(move |d| self + d)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl std::ops::Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Integer resource meter (e.g., health) tracked per actor.
///
/// `current` may drop below zero while a death is being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: i32,
    pub maximum: i32,
}

impl ResourceMeter {
    pub fn new(current: i32, maximum: i32) -> Self {
        Self { current, maximum }
    }

    pub fn full(maximum: i32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }

    /// Restores up to `amount`, returning how much was actually healed.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount.max(0)).min(self.maximum);
        self.current - before
    }

    pub fn drain(&mut self, amount: i32) {
        self.current -= amount.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_measure_chebyshev_and_squared_length() {
        let d = Position::new(-3, 2);
        assert_eq!(d.rdist(), 3);
        assert_eq!(d.abs(), 13);
        assert_eq!(Position::new(1, 1).distance(Position::new(4, -1)), 3);
    }

    #[test]
    fn compass_covers_every_neighbour_once() {
        let centre = Position::new(5, 5);
        let mut seen: Vec<_> = centre.neighbours().collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|p| p.distance(centre) == 1));
    }

    #[test]
    fn meter_restore_is_capped() {
        let mut hp = ResourceMeter::new(5, 10);
        assert_eq!(hp.restore(20), 5);
        assert!(hp.is_full());
        hp.drain(12);
        assert_eq!(hp.current, -2);
    }
}
