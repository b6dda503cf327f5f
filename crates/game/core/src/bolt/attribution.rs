//! Who fired a bolt and who answers for what it does.

use super::{Bolt, Flavour};
use crate::state::{ActorFlags, Attitude, DamageCause, EntityId, KillCategory, World};

/// Origin of a bolt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Thrower {
    PlayerMissile,
    PlayerSpell,
    MonsterMissile,
    MonsterSpell,
    #[default]
    Misc,
    Trap,
}

impl Thrower {
    pub const fn is_player(self) -> bool {
        matches!(self, Self::PlayerMissile | Self::PlayerSpell)
    }

    pub const fn is_monster(self) -> bool {
        matches!(self, Self::MonsterMissile | Self::MonsterSpell)
    }

    pub const fn is_missile(self) -> bool {
        matches!(self, Self::PlayerMissile | Self::MonsterMissile)
    }
}

impl Bolt {
    /// Credit for kills made by this bolt.
    pub fn whose_kill(&self, world: &World) -> KillCategory {
        if self.thrower.is_player() {
            return KillCategory::You;
        }
        if self.thrower.is_monster() {
            let friendly = self
                .agent
                .and_then(|id| world.actor(id))
                .map_or(self.attitude, |a| a.effective_attitude())
                == Attitude::Friendly;
            if friendly {
                return KillCategory::Friendly;
            }
        }
        KillCategory::Other
    }

    /// The originator blamed for harm done, if any is known.
    pub fn killer(&self) -> Option<EntityId> {
        if self.thrower.is_player() {
            Some(EntityId::PLAYER)
        } else {
            self.agent
        }
    }

    /// Why this bolt hurt the player, first match wins.
    pub fn damage_cause(&self, world: &World) -> DamageCause {
        let fungal = self
            .agent
            .and_then(|id| world.actor(id))
            .is_some_and(|a| a.flags.contains(ActorFlags::FUNGAL));
        if fungal {
            return DamageCause::Spores;
        }
        if self.thrower.is_player() {
            return if self.run.reflections > 0 {
                DamageCause::Reflection {
                    reflector: self.run.reflector,
                }
            } else if self.run.bounces > 0 {
                DamageCause::Bounce
            } else if self.run.aimed_at_feet && self.effect_known {
                DamageCause::SelfAimed
            } else {
                DamageCause::Targeting
            };
        }
        if matches!(self.run.flavour, Flavour::Disintegration | Flavour::Nuke) {
            return DamageCause::Disintegration;
        }
        if self.thrower.is_monster() {
            return DamageCause::Beam;
        }
        DamageCause::WildMagic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Actor, Position};

    #[test]
    fn kill_credit_follows_the_caster() {
        let mut world = World::new(5, 5).unwrap();
        let ally = world
            .spawn(Actor::new("ally", Position::new(1, 1), 5).with_attitude(Attitude::Friendly))
            .unwrap();
        let foe = world.spawn(Actor::new("foe", Position::new(2, 2), 5)).unwrap();

        let mine = Bolt::builder().thrower(Thrower::PlayerSpell).build();
        assert_eq!(mine.whose_kill(&world), KillCategory::You);

        let pet = Bolt::builder().thrower(Thrower::MonsterSpell).agent(ally).build();
        assert_eq!(pet.whose_kill(&world), KillCategory::Friendly);

        let theirs = Bolt::builder().thrower(Thrower::MonsterSpell).agent(foe).build();
        assert_eq!(theirs.whose_kill(&world), KillCategory::Other);

        let trap = Bolt::builder().thrower(Thrower::Trap).build();
        assert_eq!(trap.whose_kill(&world), KillCategory::Other);
    }

    #[test]
    fn player_causes_prefer_reflection_then_bounce() {
        let world = World::new(5, 5).unwrap();
        let mut bolt = Bolt::builder().thrower(Thrower::PlayerSpell).build();
        assert_eq!(bolt.damage_cause(&world), DamageCause::Targeting);
        bolt.run.bounces = 1;
        assert_eq!(bolt.damage_cause(&world), DamageCause::Bounce);
        bolt.run.reflections = 1;
        bolt.run.reflector = Some(EntityId(3));
        assert_eq!(
            bolt.damage_cause(&world),
            DamageCause::Reflection {
                reflector: Some(EntityId(3))
            }
        );
    }

    #[test]
    fn non_player_causes() {
        let mut world = World::new(5, 5).unwrap();
        let fungus = world
            .spawn(Actor::new("spore", Position::new(1, 1), 1).with_flags(ActorFlags::FUNGAL))
            .unwrap();
        let spores = Bolt::builder().thrower(Thrower::MonsterSpell).agent(fungus).build();
        assert_eq!(spores.damage_cause(&world), DamageCause::Spores);

        let nuke = Bolt::builder()
            .thrower(Thrower::Trap)
            .flavour(Flavour::Disintegration)
            .build();
        assert_eq!(nuke.damage_cause(&world), DamageCause::Disintegration);

        let beam = Bolt::builder().thrower(Thrower::MonsterMissile).build();
        assert_eq!(beam.damage_cause(&world), DamageCause::Beam);

        let wild = Bolt::builder().build();
        assert_eq!(wild.damage_cause(&world), DamageCause::WildMagic);
    }
}
