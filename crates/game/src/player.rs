//! Player state and the stat model.
//!
//! Effective stats are derived on demand from class data, shop levels,
//! run upgrades, the druid's current form and the berserker buff. Nothing
//! here caches a derived value except `health.max`, which tracks
//! `max_hp * form.hp_mod`.

use std::collections::{BTreeMap, HashMap};

use engine_core::{Cooldown, Health, Vec2};

use crate::class::{
    Form, PlayerClass, SpecialAbility, BERSERK_COLOR, BERSERK_DAMAGE_MULT, SHAPESHIFT_COOLDOWN,
};
use crate::passive::PassiveWeaponId;
use crate::persistence::MetaUpgrades;
use crate::progression::{Progression, StatTarget};
use crate::weapons::ActiveWeaponId;

/// Upper bound for armor and crit chance.
pub const STAT_CAP: f32 = 0.8;
/// Pickups start drifting toward the player inside this radius.
pub const BASE_PICKUP_RANGE: f32 = 2.0;
/// Vertical distance from the origin the player may walk.
pub const VERTICAL_LIMIT: f32 = 25.0;
/// Red flash shown after taking damage.
pub const DAMAGE_FLASH_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// The controlled character.
#[derive(Debug, Clone)]
pub struct Player {
    pub class: PlayerClass,
    pub position: Vec2,
    /// Follows the pointer; used by the boomerang when nothing is in range.
    pub facing_left: bool,
    pub is_moving: bool,

    // ── Base stats (class + shop) ───────────────────────────────────────
    /// Max HP before the form multiplier. Grows with "Max HP" upgrades.
    pub max_hp: f32,
    pub base_speed: f32,
    pub base_damage: f32,
    /// `current` is live HP, `max` is the effective cap for the current form.
    pub health: Health,

    // ── Run upgrades (only ever increase) ───────────────────────────────
    pub damage_mult: f32,
    pub speed_mult: f32,
    pub attack_speed_mult: f32,
    pub pickup_range: f32,
    /// HP per second.
    pub regen: f32,
    pub armor: f32,
    pub crit_chance: f32,

    pub progression: Progression,

    // ── Weapons ─────────────────────────────────────────────────────────
    pub weapon: ActiveWeaponId,
    pub weapon_levels: HashMap<ActiveWeaponId, u32>,
    pub weapon_timer: Cooldown,
    pub passive_levels: BTreeMap<PassiveWeaponId, u32>,

    // ── Timers ──────────────────────────────────────────────────────────
    pub form: Form,
    pub shapeshift_cooldown: Cooldown,
    pub invincibility: Cooldown,
    pub damage_flash: Cooldown,
    pub special_cooldown: Cooldown,
    /// Remaining berserker rage time; active while positive.
    pub special_duration: Cooldown,
}

impl Player {
    pub fn new(class: PlayerClass, position: Vec2, meta: &MetaUpgrades) -> Self {
        let stats = class.stats();
        let max_hp = stats.max_hp + meta.max_hp as f32 * 10.0;
        let mut weapon_levels = HashMap::new();
        weapon_levels.insert(stats.weapon, 1);

        Self {
            class,
            position,
            facing_left: false,
            is_moving: false,
            max_hp,
            base_speed: stats.speed * (1.0 + meta.speed as f32 * 0.05),
            base_damage: stats.damage * (1.0 + meta.damage as f32 * 0.05),
            health: Health::new(max_hp),
            damage_mult: 1.0,
            speed_mult: 1.0,
            attack_speed_mult: 1.0,
            pickup_range: BASE_PICKUP_RANGE,
            regen: 0.0,
            armor: 0.0,
            crit_chance: 0.0,
            progression: Progression::default(),
            weapon: stats.weapon,
            weapon_levels,
            weapon_timer: Cooldown::default(),
            passive_levels: BTreeMap::new(),
            form: Form::Human,
            shapeshift_cooldown: Cooldown::default(),
            invincibility: Cooldown::default(),
            damage_flash: Cooldown::default(),
            special_cooldown: Cooldown::default(),
            special_duration: Cooldown::default(),
        }
    }

    fn form_applies(&self) -> bool {
        self.class.can_shapeshift()
    }

    /// Form modifiers, or neutral ones for classes without forms.
    fn form_mods(&self) -> (f32, f32, f32) {
        if self.form_applies() {
            let f = self.form.stats();
            (f.hp_mod, f.speed_mod, f.damage_mod)
        } else {
            (1.0, 1.0, 1.0)
        }
    }

    /// HP cap for the current form.
    pub fn effective_max_hp(&self) -> f32 {
        self.max_hp * self.form_mods().0
    }

    /// Units per second.
    pub fn speed(&self) -> f32 {
        self.base_speed * self.speed_mult * self.form_mods().1
    }

    /// Damage used by the active weapon.
    pub fn damage(&self) -> f32 {
        let rage = if self.is_berserk() { BERSERK_DAMAGE_MULT } else { 1.0 };
        self.base_damage * self.damage_mult * self.form_mods().2 * rage
    }

    /// Damage used by passive weapons; ignores form and rage.
    pub fn passive_damage(&self) -> f32 {
        self.base_damage * self.damage_mult
    }

    /// Forms override the class weapon.
    pub fn current_weapon(&self) -> ActiveWeaponId {
        if self.form_applies() {
            self.form.stats().weapon
        } else {
            self.weapon
        }
    }

    pub fn weapon_level(&self, weapon: ActiveWeaponId) -> u32 {
        self.weapon_levels.get(&weapon).copied().unwrap_or(1)
    }

    /// Crit chance for melee swings, including the wolf bonus.
    pub fn melee_crit_chance(&self) -> f32 {
        let bonus = if self.form_applies() { self.form.stats().crit_bonus } else { 0.0 };
        self.crit_chance + bonus
    }

    /// Passive weapon level, or `None` when not owned.
    pub fn passive_level(&self, id: PassiveWeaponId) -> Option<u32> {
        self.passive_levels.get(&id).copied()
    }

    pub fn is_berserk(&self) -> bool {
        self.class.stats().special == SpecialAbility::BerserkerRage && self.special_duration.is_active()
    }

    pub fn color(&self) -> [f32; 4] {
        if self.damage_flash.is_active() {
            DAMAGE_FLASH_COLOR
        } else if self.is_berserk() {
            BERSERK_COLOR
        } else if self.form_applies() {
            self.form.stats().color
        } else {
            self.class.stats().color
        }
    }

    /// Walk along `direction` (already normalised) and face the pointer.
    pub fn apply_movement(&mut self, direction: Vec2, aim_target: Vec2, dt: f32) {
        self.is_moving = direction != Vec2::ZERO;
        if self.is_moving {
            self.position += direction * self.speed() * dt;
        }
        self.position.y = self.position.y.clamp(-VERTICAL_LIMIT, VERTICAL_LIMIT);
        self.facing_left = aim_target.x < self.position.x;
    }

    /// Count down every player timer. Ends berserker rage when its duration runs out.
    pub fn tick_timers(&mut self, dt: f32) {
        self.invincibility.tick_clamped(dt);
        self.damage_flash.tick_clamped(dt);
        self.shapeshift_cooldown.tick_clamped(dt);
        self.special_cooldown.tick_clamped(dt);
        if self.special_duration.is_active() {
            self.special_duration.tick_clamped(dt);
            if !self.special_duration.is_active() {
                log::debug!("berserker rage ended");
            }
        }
    }

    pub fn regenerate(&mut self, dt: f32) {
        if self.regen > 0.0 {
            self.health.heal(self.regen * dt);
        }
    }

    /// Switch druid form, keeping the same fraction of HP.
    /// Ignored for other classes, during the cooldown, or when already in `form`.
    pub fn shapeshift(&mut self, form: Form) -> bool {
        if !self.form_applies() || self.shapeshift_cooldown.is_active() || self.form == form {
            return false;
        }
        let old_max = self.max_hp * self.form.stats().hp_mod;
        let fraction = if old_max > 0.0 { self.health.current / old_max } else { 0.0 };

        self.form = form;
        self.health.max = self.effective_max_hp();
        self.health.current = fraction * self.health.max;
        self.shapeshift_cooldown.reset(SHAPESHIFT_COOLDOWN);
        log::debug!("shapeshifted into {:?}", form);
        true
    }

    /// Apply a stat upgrade. Armor and crit chance are capped.
    pub fn apply_stat(&mut self, target: StatTarget, value: f32) {
        match target {
            StatTarget::MaxHp => {
                self.max_hp += value;
                self.health.max = self.effective_max_hp();
                self.health.current = (self.health.current + value).min(self.health.max);
            }
            StatTarget::DamageMult => self.damage_mult += value,
            StatTarget::SpeedMult => self.speed_mult += value,
            StatTarget::AttackSpeedMult => self.attack_speed_mult += value,
            StatTarget::PickupRange => self.pickup_range += value,
            StatTarget::Regen => self.regen += value,
            StatTarget::Armor => self.armor = (self.armor + value).min(STAT_CAP),
            StatTarget::CritChance => self.crit_chance = (self.crit_chance + value).min(STAT_CAP),
        }
    }

    /// Grant a passive weapon or raise its level. Returns the new level.
    pub fn grant_passive(&mut self, id: PassiveWeaponId) -> u32 {
        let level = self.passive_levels.entry(id).or_insert(0);
        *level += 1;
        *level
    }
}
