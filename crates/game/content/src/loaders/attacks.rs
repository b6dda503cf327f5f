//! Attack catalog loader.
//!
//! Loads attack templates from RON and serves them to the core through the
//! [`AttackCatalog`] oracle.

use std::collections::BTreeMap;
use std::path::Path;

use beam_core::env::AttackCatalog;
use beam_core::{AttackId, AttackTemplate};

use crate::loaders::{LoadResult, read_file};

/// Registry of attack templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AttackRegistry {
    attacks: BTreeMap<AttackId, AttackTemplate>,
}

impl AttackRegistry {
    /// Loads the catalog embedded in the crate.
    pub fn load() -> LoadResult<Self> {
        let attacks_ron = include_str!("../../data/attacks.ron");
        Self::from_str(attacks_ron)
    }

    /// Loads a catalog from a RON file on disk.
    pub fn load_file(path: &Path) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load attacks {}: {}", path.display(), e))
    }

    /// Parses and validates a catalog.
    ///
    /// RON format: `{ "attack_id": AttackTemplate, ... }`
    pub fn from_str(content: &str) -> LoadResult<Self> {
        let attacks: BTreeMap<AttackId, AttackTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attacks RON: {}", e))?;

        for (id, template) in &attacks {
            template.validate(id)?;
        }

        tracing::debug!(count = attacks.len(), "attack catalog loaded");
        Ok(Self { attacks })
    }

    /// Gets a template by id.
    pub fn get(&self, id: &AttackId) -> Option<&AttackTemplate> {
        self.attacks.get(id)
    }

    /// Returns an iterator over all registered ids, in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &AttackId> + '_ {
        self.attacks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttackId, &AttackTemplate)> + '_ {
        self.attacks.iter()
    }

    /// Returns the number of registered attacks.
    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    /// Returns true if no attacks are registered.
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }
}

impl AttackCatalog for AttackRegistry {
    fn template(&self, id: &AttackId) -> Option<&AttackTemplate> {
        self.attacks.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beam_core::env::{AttackTraits, ExplosionRadius};
    use beam_core::{DiceDef, Flavour, ToHit};

    #[test]
    fn test_load_embedded_catalog() {
        let registry = AttackRegistry::load().expect("Failed to load attack catalog");

        assert!(registry.len() >= 40, "Should have at least 40 attacks");

        let dart = registry.get(&AttackId::from("magic_dart")).unwrap();
        assert_eq!(dart.name, "magic dart");
        assert_eq!(dart.flavour, Flavour::Magic);
        assert_eq!(dart.damage.dice(25), DiceDef::new(1, 8));
        assert_eq!(dart.to_hit.to_hit(25), ToHit::Automatic);

        let fire = registry.get(&AttackId::from("bolt_of_fire")).unwrap();
        assert!(fire.can_beam);
        assert!(fire.traits.contains(AttackTraits::SUPERHOT));
        assert_eq!(fire.capped_power(500), 200);
    }

    #[test]
    fn test_explosive_entries() {
        let registry = AttackRegistry::load().unwrap();

        let fireball = registry.get(&AttackId::from("fireball")).unwrap();
        assert!(fireball.is_explosion);
        let refinement = fireball.refinement.as_ref().unwrap();
        assert_eq!(refinement.radius, ExplosionRadius::Fixed(1));

        let storm = registry.get(&AttackId::from("great_blast_of_cold")).unwrap();
        assert!(!storm.is_explosion);
        assert!(storm.traits.contains(AttackTraits::SECRETLY_EXPLOSIVE));
        assert_eq!(
            storm.refinement.as_ref().and_then(|r| r.rename.as_deref()),
            Some("ice storm")
        );
        assert!(storm.trail_cloud.is_some());

        let vapour = registry.get(&AttackId::from("foul_vapour")).unwrap();
        assert!(vapour.traits.contains(AttackTraits::BIG_CLOUD));
        assert_eq!(vapour.endpoint_cloud.unwrap().size, 9);
    }

    #[test]
    fn test_enchantments_are_flagged() {
        let registry = AttackRegistry::load().unwrap();
        for id in ["slowing", "paralysis", "teleportation", "digging", "polymorph_other"] {
            let template = registry.require(&AttackId::from(id)).unwrap();
            assert!(template.is_enchantment(), "{id} should be an enchantment");
        }
    }

    #[test]
    fn test_rejects_inconsistent_template() {
        let bad = r#"{
            "odd": (
                name: "odd orb",
                power_cap: 10,
                flavour: fire,
                is_explosion: true,
                traits: "SECRETLY_EXPLOSIVE",
            ),
        }"#;
        let err = AttackRegistry::from_str(bad).unwrap_err();
        assert!(err.to_string().contains("odd"));
    }

    #[test]
    fn test_unknown_attack() {
        let registry = AttackRegistry::load().unwrap();
        assert!(registry.require(&AttackId::from("wand_of_wishing")).is_err());
    }
}
