//! Terrain features and their physical classification.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Terrain occupying a single grid cell.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Feature {
    #[default]
    Floor,
    ShallowWater,
    DeepWater,
    Lava,
    RockWall,
    ClearRockWall,
    StoneWall,
    MetalWall,
    GreenCrystalWall,
    WaxWall,
    PermaRockWall,
    Trees,
    ClosedDoor,
    SecretDoor,
    OpenDoor,
    GraniteStatue,
    OrcishIdol,
}

impl Feature {
    /// Cells that block movement and bolts.
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::RockWall
                | Self::ClearRockWall
                | Self::StoneWall
                | Self::MetalWall
                | Self::GreenCrystalWall
                | Self::WaxWall
                | Self::PermaRockWall
                | Self::Trees
                | Self::ClosedDoor
                | Self::SecretDoor
                | Self::GraniteStatue
                | Self::OrcishIdol
        )
    }

    /// Solid cells that count as walls for explosion containment.
    pub const fn is_wall(self) -> bool {
        matches!(
            self,
            Self::RockWall
                | Self::ClearRockWall
                | Self::StoneWall
                | Self::MetalWall
                | Self::GreenCrystalWall
                | Self::WaxWall
                | Self::PermaRockWall
                | Self::Trees
        )
    }

    pub const fn is_closed_door(self) -> bool {
        matches!(self, Self::ClosedDoor)
    }

    /// Walls a digging bolt turns into floor.
    pub const fn is_diggable(self) -> bool {
        matches!(self, Self::RockWall | Self::ClearRockWall)
    }

    /// Walls a disintegrating blast reduces to rubble.
    pub const fn is_disintegrable(self) -> bool {
        matches!(
            self,
            Self::RockWall | Self::WaxWall | Self::ClearRockWall | Self::GraniteStatue
        )
    }

    /// Walls fire can interact with.
    pub const fn is_flammable(self) -> bool {
        matches!(self, Self::WaxWall | Self::Trees)
    }

    pub const fn is_watery(self) -> bool {
        matches!(self, Self::ShallowWater | Self::DeepWater)
    }

    /// Human-readable description used in prompts and messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::ShallowWater => "shallow water",
            Self::DeepWater => "deep water",
            Self::Lava => "lava",
            Self::RockWall => "rock wall",
            Self::ClearRockWall => "translucent rock wall",
            Self::StoneWall => "stone wall",
            Self::MetalWall => "metal wall",
            Self::GreenCrystalWall => "wall of green crystal",
            Self::WaxWall => "wax wall",
            Self::PermaRockWall => "unnaturally hard rock wall",
            Self::Trees => "tree",
            Self::ClosedDoor => "closed door",
            Self::SecretDoor => "rock wall",
            Self::OpenDoor => "open door",
            Self::GraniteStatue => "granite statue",
            Self::OrcishIdol => "orcish idol",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn walls_are_solid() {
        for feature in Feature::iter() {
            if feature.is_wall() || feature.is_closed_door() {
                assert!(feature.is_solid(), "{feature} should be solid");
            }
        }
    }

    #[test]
    fn statues_are_solid_but_not_walls() {
        assert!(Feature::GraniteStatue.is_solid());
        assert!(!Feature::GraniteStatue.is_wall());
        assert!(!Feature::OpenDoor.is_solid());
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!("wax_wall".parse::<Feature>(), Ok(Feature::WaxWall));
        assert_eq!(Feature::GreenCrystalWall.to_string(), "green_crystal_wall");
    }
}
