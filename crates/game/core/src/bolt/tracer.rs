//! Friend and foe statistics gathered by a bolt.

use core::ops::AddAssign;

/// What a bolt did, or would do, to one side of a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TracerInfo {
    /// Targets considered.
    pub count: i32,
    /// Threat-weighted sum over those targets.
    pub power: i32,
    pub hurt: i32,
    pub helped: i32,
    /// The player already agreed to hit this side; do not ask again.
    pub dont_stop: bool,
}

impl TracerInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of both sides; `dont_stop` is sticky.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self += other;
        self
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.hurt == 0 && self.helped == 0
    }
}

impl AddAssign for TracerInfo {
    fn add_assign(&mut self, other: Self) {
        self.count += other.count;
        self.power += other.power;
        self.hurt += other.hurt;
        self.helped += other.helped;
        self.dont_stop |= other.dont_stop;
    }
}
