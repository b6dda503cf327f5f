//! The mutable grid a bolt travels through.

use std::collections::{BTreeMap, BTreeSet};

use super::{Actor, Cloud, CloudKind, DamageRecord, EntityId, Feature, Position, WorldError};

/// An item lying on the floor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
    pub quantity: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// A noise made somewhere on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Noise {
    pub position: Position,
    pub loudness: i32,
    pub source: Option<EntityId>,
}

/// Terrain grid, actor roster, clouds, and floor items.
///
/// The player, when present, always has id [`EntityId::PLAYER`]. The player
/// may share a cell with one creature; creatures never share cells with each
/// other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    width: i32,
    height: i32,
    terrain: Vec<Feature>,
    actors: BTreeMap<EntityId, Actor>,
    clouds: BTreeMap<Position, Cloud>,
    items: BTreeMap<Position, Vec<Item>>,
    sanctuary: BTreeSet<Position>,
    silenced: BTreeSet<Position>,
    next_id: u32,
    damage_log: Vec<DamageRecord>,
    noise_log: Vec<Noise>,
}

impl World {
    /// Creates an all-floor world.
    pub fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        if width <= 0 || height <= 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            terrain: vec![Feature::Floor; (width * height) as usize],
            actors: BTreeMap::new(),
            clouds: BTreeMap::new(),
            items: BTreeMap::new(),
            sanctuary: BTreeSet::new(),
            silenced: BTreeSet::new(),
            next_id: 1,
            damage_log: Vec::new(),
            noise_log: Vec::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    fn check_bounds(&self, pos: Position) -> Result<usize, WorldError> {
        self.index(pos).ok_or(WorldError::OutOfBounds {
            position: pos,
            width: self.width,
            height: self.height,
        })
    }

    // ===== terrain =====

    /// Terrain at `pos`; everything off the map reads as permanent rock.
    pub fn feature(&self, pos: Position) -> Feature {
        self.index(pos)
            .map_or(Feature::PermaRockWall, |i| self.terrain[i])
    }

    pub fn set_feature(&mut self, pos: Position, feature: Feature) -> Result<(), WorldError> {
        let i = self.check_bounds(pos)?;
        self.terrain[i] = feature;
        Ok(())
    }

    pub fn is_solid(&self, pos: Position) -> bool {
        self.feature(pos).is_solid()
    }

    /// Open, in-bounds, and free of creatures and the player.
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_solid(pos) && !self.is_occupied(pos)
    }

    // ===== actors =====

    /// Places the player. Fails if a player already exists.
    pub fn place_player(&mut self, mut actor: Actor) -> Result<EntityId, WorldError> {
        self.check_bounds(actor.position)?;
        if self.actors.contains_key(&EntityId::PLAYER) {
            return Err(WorldError::PlayerAlreadyPlaced);
        }
        actor.id = EntityId::PLAYER;
        actor.attitude = super::Attitude::Friendly;
        self.actors.insert(EntityId::PLAYER, actor);
        Ok(EntityId::PLAYER)
    }

    /// Adds a creature, assigning it a fresh id.
    pub fn spawn(&mut self, mut actor: Actor) -> Result<EntityId, WorldError> {
        self.check_bounds(actor.position)?;
        if let Some(occupant) = self.monster_at(actor.position) {
            return Err(WorldError::CellOccupied {
                position: actor.position,
                occupant,
            });
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        actor.id = id;
        self.actors.insert(id, actor);
        Ok(id)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.actors.get(&EntityId::PLAYER)
    }

    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        self.actors.get_mut(&EntityId::PLAYER)
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// The creature (not the player) standing on `pos`.
    pub fn monster_at(&self, pos: Position) -> Option<EntityId> {
        self.actors
            .values()
            .find(|a| !a.is_player() && a.position == pos)
            .map(|a| a.id)
    }

    pub fn player_at(&self, pos: Position) -> bool {
        self.player().is_some_and(|p| p.position == pos)
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.player_at(pos) || self.monster_at(pos).is_some()
    }

    pub fn move_actor(&mut self, id: EntityId, to: Position) -> Result<(), WorldError> {
        self.check_bounds(to)?;
        if !id.is_player()
            && let Some(occupant) = self.monster_at(to)
            && occupant != id
        {
            return Err(WorldError::CellOccupied {
                position: to,
                occupant,
            });
        }
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(WorldError::UnknownActor(id))?;
        actor.position = to;
        Ok(())
    }

    pub fn remove_actor(&mut self, id: EntityId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Subtracts `amount` hit points. Creatures reduced to zero are removed
    /// from the roster; the player is left in place for the caller to judge.
    ///
    /// Returns true if the actor died.
    pub fn hurt(&mut self, id: EntityId, amount: i32) -> Result<bool, WorldError> {
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(WorldError::UnknownActor(id))?;
        actor.hp.drain(amount);
        let died = !actor.alive();
        if died && !id.is_player() {
            self.actors.remove(&id);
        }
        Ok(died)
    }

    // ===== clouds =====

    pub fn cloud_at(&self, pos: Position) -> Option<&Cloud> {
        self.clouds.get(&pos)
    }

    pub fn cloud_mut(&mut self, pos: Position) -> Option<&mut Cloud> {
        self.clouds.get_mut(&pos)
    }

    /// Places a cloud, replacing whatever gas was already there.
    /// Clouds never form inside solid terrain or off the map.
    pub fn place_cloud(
        &mut self,
        pos: Position,
        kind: CloudKind,
        duration: i32,
        owner: Option<EntityId>,
    ) -> bool {
        if !self.in_bounds(pos) || self.is_solid(pos) || duration <= 0 {
            return false;
        }
        self.clouds.insert(pos, Cloud::new(kind, duration, owner));
        true
    }

    /// Places a cloud on `pos` and spreads copies to open neighbours until
    /// `size` cells are covered.
    pub fn place_big_cloud(
        &mut self,
        pos: Position,
        kind: CloudKind,
        duration: i32,
        size: usize,
        owner: Option<EntityId>,
    ) -> usize {
        let mut frontier = vec![pos];
        let mut covered = BTreeSet::new();
        while let Some(cell) = frontier.pop() {
            if covered.len() >= size {
                break;
            }
            if covered.contains(&cell) || !self.place_cloud(cell, kind, duration, owner) {
                continue;
            }
            covered.insert(cell);
            frontier.splice(0..0, cell.neighbours());
        }
        covered.len()
    }

    pub fn remove_cloud(&mut self, pos: Position) -> Option<Cloud> {
        self.clouds.remove(&pos)
    }

    pub fn clouds(&self) -> impl Iterator<Item = (&Position, &Cloud)> {
        self.clouds.iter()
    }

    // ===== items =====

    pub fn items_at(&self, pos: Position) -> &[Item] {
        self.items.get(&pos).map_or(&[], Vec::as_slice)
    }

    pub fn drop_item(&mut self, pos: Position, item: Item) -> Result<(), WorldError> {
        self.check_bounds(pos)?;
        self.items.entry(pos).or_default().push(item);
        Ok(())
    }

    // ===== zones =====

    pub fn add_sanctuary(&mut self, pos: Position) {
        self.sanctuary.insert(pos);
    }

    pub fn is_sanctuary(&self, pos: Position) -> bool {
        self.sanctuary.contains(&pos)
    }

    pub fn add_silence(&mut self, pos: Position) {
        self.silenced.insert(pos);
    }

    pub fn is_silenced(&self, pos: Position) -> bool {
        self.silenced.contains(&pos)
    }

    /// Whether the player could hear something at `pos`.
    pub fn player_can_hear(&self, pos: Position, loudness: i32) -> bool {
        self.player().is_some_and(|p| {
            !self.is_silenced(p.position)
                && !self.is_silenced(pos)
                && p.position.distance(pos) <= loudness
        })
    }

    /// Makes a noise and returns whether the player heard it.
    pub fn noisy(&mut self, loudness: i32, pos: Position, source: Option<EntityId>) -> bool {
        if loudness <= 0 || self.is_silenced(pos) {
            return false;
        }
        self.noise_log.push(Noise {
            position: pos,
            loudness,
            source,
        });
        self.player_can_hear(pos, loudness)
    }

    pub fn noise_log(&self) -> &[Noise] {
        &self.noise_log
    }

    // ===== history =====

    pub fn record_damage(&mut self, record: DamageRecord) {
        self.damage_log.push(record);
    }

    pub fn damage_log(&self) -> &[DamageRecord] {
        &self.damage_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Attitude, CloudKind};

    fn world() -> World {
        World::new(10, 8).expect("valid dimensions")
    }

    #[test]
    fn off_map_reads_as_permanent_rock() {
        let w = world();
        assert_eq!(w.feature(Position::new(-1, 0)), Feature::PermaRockWall);
        assert!(w.is_solid(Position::new(10, 0)));
        assert!(!w.is_solid(Position::new(9, 7)));
    }

    #[test]
    fn rejects_bad_dimensions_and_placements() {
        assert!(matches!(
            World::new(0, 5),
            Err(WorldError::InvalidDimensions { .. })
        ));
        let mut w = world();
        let err = w
            .spawn(Actor::new("orc", Position::new(20, 1), 5))
            .unwrap_err();
        assert!(matches!(err, WorldError::OutOfBounds { .. }));
    }

    #[test]
    fn player_may_share_a_cell_with_one_creature() {
        let mut w = world();
        let pos = Position::new(2, 2);
        w.place_player(Actor::new("you", pos, 20)).unwrap();
        let eel = w.spawn(Actor::new("eel", pos, 5)).unwrap();
        assert!(w.player_at(pos));
        assert_eq!(w.monster_at(pos), Some(eel));
        assert!(matches!(
            w.spawn(Actor::new("orc", pos, 5)),
            Err(WorldError::CellOccupied { .. })
        ));
        assert_eq!(w.player().map(|p| p.attitude), Some(Attitude::Friendly));
    }

    #[test]
    fn dead_creatures_leave_the_roster() {
        let mut w = world();
        let orc = w.spawn(Actor::new("orc", Position::new(3, 3), 5)).unwrap();
        assert!(!w.hurt(orc, 4).unwrap());
        assert!(w.hurt(orc, 1).unwrap());
        assert!(w.actor(orc).is_none());
    }

    #[test]
    fn clouds_avoid_solid_cells() {
        let mut w = world();
        let wall = Position::new(4, 4);
        w.set_feature(wall, Feature::RockWall).unwrap();
        assert!(!w.place_cloud(wall, CloudKind::Fire, 5, None));
        assert!(w.place_cloud(Position::new(1, 1), CloudKind::Fire, 5, None));
        let covered = w.place_big_cloud(Position::new(6, 4), CloudKind::Poison, 3, 9, None);
        assert_eq!(covered, 9);
    }

    #[test]
    fn noise_reaches_player_within_loudness() {
        let mut w = world();
        w.place_player(Actor::new("you", Position::new(0, 0), 20))
            .unwrap();
        assert!(w.noisy(5, Position::new(4, 4), None));
        assert!(!w.noisy(2, Position::new(9, 7), None));
        assert_eq!(w.noise_log().len(), 2);
    }
}
