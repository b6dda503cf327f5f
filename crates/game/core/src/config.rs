/// Simulation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BeamConfig {
    /// Range given to bolts created with range `-1`.
    pub default_range: i32,
    /// Foe ratio assigned to monster tracers.
    pub default_foe_ratio: i32,
    /// Foe ratio assigned to tracers of hostile summoned casters.
    pub summoned_foe_ratio: i32,
    /// Foe ratio assigned to player tracers.
    pub player_foe_ratio: i32,
    /// Chebyshev radius within which a tracer that cannot see an invisible
    /// player still "finds" them.
    pub invisible_fuzz_radius: i32,
}

impl BeamConfig {
    // ===== compile-time constants =====
    /// Line-of-sight radius; also the default bolt range.
    pub const LOS_RADIUS: i32 = 8;
    /// Largest explosion radius the flood-fill will compute.
    pub const MAX_EXPLOSION_RADIUS: i32 = 9;
    /// Attempts made to perturb a chaotic bounce before falling back.
    pub const BOUNCE_PERTURB_RETRIES: u32 = 20;
    /// Range consumed by hitting something that stops the bolt outright.
    pub const BEAM_STOP: i32 = 1000;
    /// To-hit lost for every cell of obscuring gas crossed.
    pub const CLOUD_TOHIT_PENALTY: i32 = 2;
    /// Range consumed by a bounce off solid terrain.
    pub const BOUNCE_RANGE_COST: i32 = 2;
    /// Range consumed when fire and cold cancel each other.
    pub const CLOUD_CANCEL_RANGE_COST: i32 = 5;
    /// Flood-fill cost for continuing in the parent's direction.
    pub const STRAIGHT_COST: i32 = 5;
    /// Flood-fill cost for turning around an obstacle.
    pub const TURN_COST: i32 = 17;
    /// Armour rolls subtracted from fragmentation damage.
    pub const FRAG_ARMOUR_DRAWS: u32 = 3;
    /// Chance (x in y) of a spore blast seeding a fungal hazard per cell.
    pub const SPORE_CHANCE: (u32, u32) = (2, 21);
    /// Magic resistance value meaning "cannot be enchanted at all".
    pub const MAGIC_IMMUNE: i32 = 5000;
    /// Evasion granted by phase shifting on the last rung of the hit ladder.
    pub const PHASE_SHIFT_EVASION: i32 = 8;
    /// Upper bound on sticky-flame levels applied by one hit.
    pub const MAX_NAPALM_LEVELS: i32 = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FOE_RATIO: i32 = 80;
    pub const DEFAULT_SUMMONED_FOE_RATIO: i32 = 25;
    pub const DEFAULT_PLAYER_FOE_RATIO: i32 = 100;
    pub const DEFAULT_INVISIBLE_FUZZ_RADIUS: i32 = 2;

    pub fn new() -> Self {
        Self {
            default_range: Self::LOS_RADIUS,
            default_foe_ratio: Self::DEFAULT_FOE_RATIO,
            summoned_foe_ratio: Self::DEFAULT_SUMMONED_FOE_RATIO,
            player_foe_ratio: Self::DEFAULT_PLAYER_FOE_RATIO,
            invisible_fuzz_radius: Self::DEFAULT_INVISIBLE_FUZZ_RADIUS,
        }
    }

    pub fn with_default_range(mut self, range: i32) -> Self {
        self.default_range = range;
        self
    }

    pub fn with_foe_ratios(mut self, monster: i32, summoned: i32, player: i32) -> Self {
        self.default_foe_ratio = monster;
        self.summoned_foe_ratio = summoned;
        self.player_foe_ratio = player;
        self
    }
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self::new()
    }
}
