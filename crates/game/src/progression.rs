//! Experience, level thresholds and the upgrade catalog.
//!
//! A single large XP gain can cross several thresholds at once. Each crossing
//! is queued in `pending_level_ups` and resolved one upgrade choice at a time.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::passive::PassiveWeaponId;

/// XP needed for the first level-up.
const FIRST_THRESHOLD: f32 = 10.0;
/// Threshold growth per level (floored).
const THRESHOLD_GROWTH: f32 = 1.5;
/// Options offered per level-up.
pub const CHOICES_PER_LEVEL: usize = 3;

/// Player experience and the queue of owed upgrade choices.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub xp: f32,
    pub level: u32,
    pub xp_to_level: f32,
    pub pending_level_ups: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp: 0.0,
            level: 1,
            xp_to_level: FIRST_THRESHOLD,
            pending_level_ups: 0,
        }
    }
}

/// XP multiplier from the permanent "XP Gain" shop upgrade.
pub fn meta_xp_multiplier(meta_xp_level: u32) -> f32 {
    1.0 + meta_xp_level as f32 * 0.1
}

impl Progression {
    /// Add XP (after the meta multiplier) and queue every threshold crossed.
    /// Returns the number of levels gained by this call.
    pub fn gain_xp(&mut self, amount: f32, meta_xp_level: u32) -> u32 {
        self.xp += amount * meta_xp_multiplier(meta_xp_level);

        let mut gained = 0;
        while self.xp >= self.xp_to_level {
            self.xp -= self.xp_to_level;
            self.level += 1;
            self.xp_to_level = (self.xp_to_level * THRESHOLD_GROWTH).floor();
            self.pending_level_ups += 1;
            gained += 1;
        }
        gained
    }

    /// Settle one owed choice. Chest upgrades never added to the counter, so this saturates.
    pub fn consume_level_up(&mut self) {
        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
    }

    /// Fraction of the way to the next level, for the XP bar.
    pub fn progress(&self) -> f32 {
        if self.xp_to_level > 0.0 {
            (self.xp / self.xp_to_level).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Player stat an upgrade increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatTarget {
    MaxHp,
    DamageMult,
    SpeedMult,
    AttackSpeedMult,
    PickupRange,
    Regen,
    Armor,
    CritChance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeEffect {
    /// Add `value` to a stat (armor and crit are capped).
    Stat(StatTarget, f32),
    /// Grant or level up a passive weapon.
    PassiveWeapon(PassiveWeaponId),
}

/// One card in the level-up screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: UpgradeEffect,
}

impl UpgradeOption {
    pub fn is_weapon(&self) -> bool {
        matches!(self.effect, UpgradeEffect::PassiveWeapon(_))
    }
}

const fn stat(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    target: StatTarget,
    value: f32,
) -> UpgradeOption {
    UpgradeOption { id, name, description, effect: UpgradeEffect::Stat(target, value) }
}

const fn weapon(id: &'static str, name: &'static str, description: &'static str, w: PassiveWeaponId) -> UpgradeOption {
    UpgradeOption { id, name, description, effect: UpgradeEffect::PassiveWeapon(w) }
}

/// Every upgrade that can be offered.
pub const UPGRADE_CATALOG: [UpgradeOption; 13] = [
    stat("maxHp", "Max HP", "+20 Maximum Health", StatTarget::MaxHp, 20.0),
    stat("damage", "Damage", "+10% Damage", StatTarget::DamageMult, 0.1),
    stat("speed", "Speed", "+10% Move Speed", StatTarget::SpeedMult, 0.1),
    stat("attackSpeed", "Attack Speed", "+15% Attack Speed", StatTarget::AttackSpeedMult, 0.15),
    stat("pickupRange", "Magnet", "+50% Pickup Range", StatTarget::PickupRange, 0.5),
    stat("regen", "Regeneration", "+1 HP/sec", StatTarget::Regen, 1.0),
    stat("armor", "Armor", "-10% Damage Taken", StatTarget::Armor, 0.1),
    stat("luck", "Luck", "+10% Crit Chance", StatTarget::CritChance, 0.1),
    weapon("holyOrbit", "Holy Orbit", "Orbiting orbs. Lvl+: +orb, +dmg", PassiveWeaponId::HolyOrbit),
    weapon("garlicAura", "Garlic Aura", "Damage aura. Lvl+: +area, +dmg", PassiveWeaponId::GarlicAura),
    weapon("boomerang", "Boomerang", "Returning blade. Lvl+: +speed, +dmg", PassiveWeaponId::Boomerang),
    weapon("lightning", "Lightning", "Random bolts. Lvl+: +strikes, +dmg", PassiveWeaponId::Lightning),
    weapon("throwingAxe", "Throwing Axe", "High dmg, penetrates. Lvl+: +axes", PassiveWeaponId::ThrowingAxe),
];

/// Look up a catalog entry by id.
pub fn upgrade_by_id(id: &str) -> Option<UpgradeOption> {
    UPGRADE_CATALOG.iter().find(|u| u.id == id).copied()
}

/// Shuffle the whole catalog and take the first three. Uniform, no replacement.
pub fn draw_choices(rng: &mut impl Rng) -> Vec<UpgradeOption> {
    let mut pool = UPGRADE_CATALOG.to_vec();
    pool.shuffle(rng);
    pool.truncate(CHOICES_PER_LEVEL);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn single_gain_crossing_three_thresholds() {
        let mut p = Progression::default();
        // 10 + 15 + 22 = 47
        let gained = p.gain_xp(50.0, 0);
        assert_eq!(gained, 3);
        assert_eq!(p.pending_level_ups, 3);
        assert_eq!(p.level, 4);
        assert_eq!(p.xp_to_level, 33.0);
        assert!((p.xp - 3.0).abs() < 1e-4);
    }

    #[test]
    fn meta_bonus_scales_xp() {
        let mut p = Progression::default();
        p.gain_xp(5.0, 2);
        assert!((p.xp - 6.0).abs() < 1e-5);
        assert_eq!(p.pending_level_ups, 0);
        assert!((p.progress() - 0.6).abs() < 1e-5);
    }

    #[test]
    fn consume_never_underflows() {
        let mut p = Progression::default();
        p.consume_level_up();
        assert_eq!(p.pending_level_ups, 0);
    }

    #[test]
    fn draws_three_distinct_options() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let choices = draw_choices(&mut rng);
            assert_eq!(choices.len(), 3);
            let ids: HashSet<_> = choices.iter().map(|c| c.id).collect();
            assert_eq!(ids.len(), 3);
        }
    }

    #[test]
    fn catalog_ids_unique_and_five_weapons() {
        let ids: HashSet<_> = UPGRADE_CATALOG.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), UPGRADE_CATALOG.len());
        assert_eq!(UPGRADE_CATALOG.iter().filter(|u| u.is_weapon()).count(), 5);
        assert_eq!(upgrade_by_id("armor").map(|u| u.effect), Some(UpgradeEffect::Stat(StatTarget::Armor, 0.1)));
    }
}
