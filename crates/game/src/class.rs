//! Playable classes and the druid's shapeshift forms.

use serde::{Deserialize, Serialize};

use crate::weapons::ActiveWeaponId;

/// Player class picked on the class-select screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerClass {
    /// Melee bruiser with a timed damage buff.
    Warrior,
    /// Shapeshifter; each form swaps stats and weapon.
    Druid,
    /// Glass cannon caster with a burst nova.
    Shaman,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 3] = [PlayerClass::Warrior, PlayerClass::Druid, PlayerClass::Shaman];

    pub fn stats(&self) -> ClassStats {
        match self {
            PlayerClass::Warrior => ClassStats {
                max_hp: 120.0,
                speed: 4.8,
                damage: 15.0,
                color: [0.8, 0.2, 0.2, 1.0],
                weapon: ActiveWeaponId::SwordSwing,
                special: SpecialAbility::BerserkerRage,
            },
            PlayerClass::Druid => ClassStats {
                max_hp: 100.0,
                speed: 5.28,
                damage: 10.0,
                color: [0.2, 0.7, 0.3, 1.0],
                weapon: ActiveWeaponId::NaturesWrath,
                special: SpecialAbility::Shapeshift,
            },
            PlayerClass::Shaman => ClassStats {
                max_hp: 80.0,
                speed: 4.8,
                damage: 18.0,
                color: [0.5, 0.2, 0.8, 1.0],
                weapon: ActiveWeaponId::SpiritBolt,
                special: SpecialAbility::AncestralWrath,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlayerClass::Warrior => "Warrior",
            PlayerClass::Druid => "Druid",
            PlayerClass::Shaman => "Shaman",
        }
    }

    /// Parse the lowercase identifier used by menus and config files.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "warrior" => Some(PlayerClass::Warrior),
            "druid" => Some(PlayerClass::Druid),
            "shaman" => Some(PlayerClass::Shaman),
            _ => None,
        }
    }

    pub fn can_shapeshift(&self) -> bool {
        self.stats().special == SpecialAbility::Shapeshift
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassStats {
    pub max_hp: f32,
    /// Units per second.
    pub speed: f32,
    pub damage: f32,
    pub color: [f32; 4],
    pub weapon: ActiveWeaponId,
    pub special: SpecialAbility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAbility {
    /// +50% damage for a few seconds.
    BerserkerRage,
    /// The druid's special is the form system itself.
    Shapeshift,
    /// Instant damage to everything nearby.
    AncestralWrath,
}

impl SpecialAbility {
    /// Seconds before the ability can be used again.
    pub fn cooldown(&self) -> f32 {
        match self {
            SpecialAbility::BerserkerRage => 30.0,
            SpecialAbility::Shapeshift => 0.0,
            SpecialAbility::AncestralWrath => 20.0,
        }
    }

    /// Seconds the effect stays active (zero for instant abilities).
    pub fn duration(&self) -> f32 {
        match self {
            SpecialAbility::BerserkerRage => 5.0,
            _ => 0.0,
        }
    }
}

/// Berserker rage damage multiplier.
pub const BERSERK_DAMAGE_MULT: f32 = 1.5;
pub const BERSERK_COLOR: [f32; 4] = [1.0, 0.5, 0.0, 1.0];
/// Ancestral wrath hits everything within this radius...
pub const WRATH_RADIUS: f32 = 5.0;
/// ...for this many times the player's base damage.
pub const WRATH_DAMAGE_MULT: f32 = 3.0;
/// Lockout after a successful shapeshift.
pub const SHAPESHIFT_COOLDOWN: f32 = 2.0;

/// Druid forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    #[default]
    Human,
    Bear,
    Wolf,
    Lunar,
}

impl Form {
    /// Hotkey order (1-4) and cycle order.
    pub const ALL: [Form; 4] = [Form::Human, Form::Bear, Form::Wolf, Form::Lunar];

    pub fn stats(&self) -> FormStats {
        match self {
            Form::Human => FormStats {
                hp_mod: 1.0,
                speed_mod: 1.0,
                damage_mod: 1.0,
                weapon: ActiveWeaponId::NaturesWrath,
                crit_bonus: 0.0,
                color: [0.2, 0.7, 0.3, 1.0],
            },
            Form::Bear => FormStats {
                hp_mod: 1.5,
                speed_mod: 0.8,
                damage_mod: 1.3,
                weapon: ActiveWeaponId::ClawSwipe,
                crit_bonus: 0.0,
                color: [0.5, 0.3, 0.1, 1.0],
            },
            Form::Wolf => FormStats {
                hp_mod: 0.9,
                speed_mod: 1.4,
                damage_mod: 1.1,
                weapon: ActiveWeaponId::Bite,
                crit_bonus: 0.2,
                color: [0.4, 0.4, 0.4, 1.0],
            },
            Form::Lunar => FormStats {
                hp_mod: 0.7,
                speed_mod: 1.0,
                damage_mod: 1.5,
                weapon: ActiveWeaponId::Moonfire,
                crit_bonus: 0.0,
                color: [0.6, 0.5, 0.9, 1.0],
            },
        }
    }

    /// Next form in the Shift-cycle.
    pub fn next(&self) -> Form {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn from_index(index: usize) -> Option<Form> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormStats {
    pub hp_mod: f32,
    pub speed_mod: f32,
    pub damage_mod: f32,
    pub weapon: ActiveWeaponId,
    /// Added to crit chance for melee hits in this form.
    pub crit_bonus: f32,
    pub color: [f32; 4],
}
