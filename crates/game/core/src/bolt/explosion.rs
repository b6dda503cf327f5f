//! Explosions: the flood-filled blast area and the order cells are hit in.
//!
//! The blast area is a cost map around the centre. Costs grow by
//! [`BeamConfig::STRAIGHT_COST`] per step outwards and by
//! [`BeamConfig::TURN_COST`] per step that doubles back towards the centre,
//! so the blast wraps round corners only grudgingly. Cells are resolved ring by
//! ring outwards from the centre.

use arrayvec::ArrayVec;

use super::{Bolt, BoltError, Flavour};
use crate::config::BeamConfig;
use crate::env::{BoltEnv, Channel, ExplosionRadius};
use crate::error::ErrorContext;
use crate::state::{COMPASS, Position, World};

const SPAN: usize = 2 * BeamConfig::MAX_EXPLOSION_RADIUS as usize + 1;
const CELLS: usize = SPAN * SPAN;
const UNREACHED: i32 = i32::MAX;

/// Cost to reach each offset from the centre; [`i32::MAX`] for unreached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplosionMap {
    costs: [[i32; SPAN]; SPAN],
}

impl Default for ExplosionMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplosionMap {
    pub const CENTRE: i32 = BeamConfig::MAX_EXPLOSION_RADIUS;

    pub fn new() -> Self {
        Self {
            costs: [[UNREACHED; SPAN]; SPAN],
        }
    }

    fn index(offset: Position) -> Option<(usize, usize)> {
        if offset.rdist() > Self::CENTRE {
            return None;
        }
        Some(((offset.x + Self::CENTRE) as usize, (offset.y + Self::CENTRE) as usize))
    }

    /// Cost recorded for `offset`, or [`i32::MAX`].
    pub fn get(&self, offset: Position) -> i32 {
        Self::index(offset).map_or(UNREACHED, |(x, y)| self.costs[y][x])
    }

    fn set(&mut self, offset: Position, cost: i32) {
        if let Some((x, y)) = Self::index(offset) {
            self.costs[y][x] = cost;
        }
    }

    pub fn is_reached(&self, offset: Position) -> bool {
        self.get(offset) != UNREACHED
    }

    /// Reached offsets with their costs, row-major.
    pub fn reached(&self) -> impl Iterator<Item = (Position, i32)> + '_ {
        let c = Self::CENTRE;
        (-c..=c)
            .flat_map(move |y| (-c..=c).map(move |x| Position::new(x, y)))
            .filter_map(|offset| {
                let cost = self.get(offset);
                (cost != UNREACHED).then_some((offset, cost))
            })
    }
}

/// Offsets within radius `r`, centre first, then each square ring once.
///
/// Every ring is walked clockwise from its north-west corner; corners are
/// visited exactly once.
pub fn radial_sweep(r: i32) -> ArrayVec<Position, CELLS> {
    let r = r.clamp(0, BeamConfig::MAX_EXPLOSION_RADIUS);
    let mut cells = ArrayVec::new();
    cells.push(Position::ORIGIN);
    for ring in 1..=r {
        for x in -ring..ring {
            cells.push(Position::new(x, -ring));
        }
        for y in -ring..ring {
            cells.push(Position::new(ring, y));
        }
        for x in (-ring + 1..=ring).rev() {
            cells.push(Position::new(x, ring));
        }
        for y in (-ring + 1..=ring).rev() {
            cells.push(Position::new(-ring, y));
        }
    }
    cells
}

/// Which obstacles halt the flood fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloodRules {
    pub radius: i32,
    /// Solid features that are not walls, such as statues.
    pub stop_at_statues: bool,
    /// Walls and closed or secret doors.
    pub stop_at_walls: bool,
}

impl FloodRules {
    pub fn new(radius: i32) -> Self {
        Self {
            radius: radius.clamp(0, BeamConfig::MAX_EXPLOSION_RADIUS),
            stop_at_statues: true,
            stop_at_walls: true,
        }
    }

    pub fn through_statues(mut self) -> Self {
        self.stop_at_statues = false;
        self
    }

    pub fn through_walls(mut self) -> Self {
        self.stop_at_walls = false;
        self
    }
}

impl Bolt {
    /// Flood-fills the blast area around the bolt's target.
    pub fn explosion_map(&self, world: &World, rules: FloodRules) -> ExplosionMap {
        let mut map = ExplosionMap::new();
        self.determine_affected_cells(world, &mut map, Position::ORIGIN, 0, rules);
        map
    }

    /// Depth-first fill from `delta` at cost `count`.
    ///
    /// A cell is revisited only when reached more cheaply than before. Area
    /// hooks keep a cell unmarked without stopping the fill behind it.
    pub fn determine_affected_cells(
        &self,
        world: &World,
        map: &mut ExplosionMap,
        delta: Position,
        count: i32,
        rules: FloodRules,
    ) {
        let r = rules.radius;
        let loc = self.run.target + delta;
        if delta.rdist() > r
            || delta.abs() > r * (r + 1)
            || count > 10 * r
            || !world.in_bounds(loc)
        {
            return;
        }

        let feature = world.feature(loc);
        if feature.is_wall() || feature.is_closed_door() {
            // An explosion set off inside rock it can breach starts there.
            let breachable_origin = delta.is_origin() && self.affects_wall(feature);
            if rules.stop_at_walls && !breachable_origin {
                return;
            }
        } else if feature.is_solid() && rules.stop_at_statues {
            return;
        }

        if self.aoe_allows(world, loc) && count < map.get(delta) {
            map.set(delta, count);
        }

        for step in COMPASS {
            let next = delta + step;
            if next.rdist() > r || map.get(next) <= count {
                continue;
            }
            let doubling_back = delta.x * step.x < 0 || delta.y * step.y < 0;
            let cost = if doubling_back {
                BeamConfig::TURN_COST
            } else {
                BeamConfig::STRAIGHT_COST
            };
            self.determine_affected_cells(world, map, next, count + cost, rules);
        }
    }

    /// Applies the catalog refinement and announces the blast.
    pub(crate) fn refine_for_explosion(&mut self, env: &mut BoltEnv<'_>) {
        if self.run.ex_size == 0 {
            self.run.ex_size = 1;
        }
        self.msg_generated = true;

        let mut see = format!("The {} explodes!", self.run.name);
        let mut hear = String::from("You hear an explosion.");

        if let Some(refinement) = self.refinement.clone() {
            if let Some(name) = refinement.rename
                && (!refinement.rename_live_only || !self.is_tracer)
            {
                self.run.name = name;
            }
            if let Some(flavour) = refinement.flavour {
                self.run.flavour = flavour;
                self.run.real_flavour = flavour;
            }
            if let Some(num) = refinement.damage_num {
                self.run.damage.num = num;
            }
            if let Some(colour) = refinement.colour {
                self.run.colour = colour;
            }
            match refinement.radius {
                ExplosionRadius::Keep => {}
                ExplosionRadius::Fixed(radius) => self.run.ex_size = radius,
                ExplosionRadius::Storm if self.is_tracer => self.run.ex_size = 3,
                ExplosionRadius::Storm => {
                    let big = env.dice.random2(self.ench_power) > 75;
                    self.run.ex_size = 2 + i32::from(big);
                }
            }
            if let Some(text) = refinement.see_message {
                see = text;
            }
            if let Some(text) = refinement.hear_message {
                hear = text;
            }
        }

        if self.is_tracer {
            return;
        }
        let centre = self.run.target;
        if env.player_sees_cell(centre) {
            self.seen = true;
            self.say(env, Channel::Plain, &see);
        } else if env.world.player_can_hear(centre, explosion_loudness(self.run.ex_size)) {
            self.say(env, Channel::Sound, &hear);
        } else {
            self.msg_generated = false;
        }
    }

    /// Blasts every reachable cell around the target.
    ///
    /// Returns true if the player saw any of it.
    pub fn explode(&mut self, env: &mut BoltEnv<'_>) -> Result<bool, BoltError> {
        let _span = tracing::debug_span!(
            "explode",
            name = %self.run.name,
            shot = env.dice.shot(),
            tracer = self.is_tracer,
        )
        .entered();

        if self.run.in_explosion_phase {
            return Err(BoltError::ExplosionReentered {
                context: ErrorContext::new(env.dice.shot()).with_position(self.run.target),
            });
        }

        if matches!(self.run.real_flavour, Flavour::Random | Flavour::Chaos) {
            self.run.flavour = self.run.real_flavour;
        } else {
            self.run.real_flavour = self.run.flavour;
        }

        let r = self.run.ex_size.min(BeamConfig::MAX_EXPLOSION_RADIUS);
        self.run.ex_size = r;
        self.run.in_explosion_phase = true;
        let centre = self.run.target;

        if env.world.is_sanctuary(centre) {
            if !self.is_tracer && env.player_sees_cell(centre) {
                let text = format!("The {} is contained.", self.run.name);
                self.say(env, Channel::God, &text);
            }
            tracing::debug!(%centre, "explosion contained");
            return Ok(false);
        }

        if !self.is_tracer {
            let heard = env
                .world
                .noisy(explosion_loudness(r), centre, self.killer());
            self.heard |= heard;
        }

        let map = self.explosion_map(env.world, FloodRules::new(r));
        let mut cells_seen = 0;
        for offset in radial_sweep(r) {
            if self.hole_in_the_middle && offset.is_origin() {
                continue;
            }
            if !map.is_reached(offset) {
                continue;
            }
            let cell = centre + offset;
            if env.player_sees_cell(cell) {
                cells_seen += 1;
            }
            self.explosion_affect_cell(env, cell)?;
        }

        tracing::debug!(%centre, radius = r, cells_seen, "exploded");
        Ok(cells_seen > 0)
    }

    fn explosion_affect_cell(
        &mut self,
        env: &mut BoltEnv<'_>,
        cell: Position,
    ) -> Result<(), BoltError> {
        let flavour = self.run.flavour;
        let centre = self.run.target;
        self.run.target = cell;
        let result = self.affect_cell(env, false);
        self.run.flavour = flavour;
        self.run.target = centre;
        result.map(|_| ())
    }
}

fn explosion_loudness(radius: i32) -> i32 {
    10 + 5 * radius
}
