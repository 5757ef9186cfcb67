//! Game state: phases, the current run and the entry points the UI calls.
//!
//! Per-frame gameplay lives in `update.rs`; this file owns everything that
//! happens between frames (starting a run, level-up choices, pause, the shop).

use input::InputState;
use rand::rngs::StdRng;
use rand::SeedableRng;

use engine_core::{Entity, Vec2};

use crate::class::{Form, PlayerClass, SpecialAbility, WRATH_DAMAGE_MULT, WRATH_RADIUS};
use crate::combat;
use crate::config::GameConfig;
use crate::events::{GameEvent, RunSummary};
use crate::passive::PassiveWeaponEngine;
use crate::persistence::{MetaStore, MetaUpgradeKind, MetaUpgrades, RonMetaStore, ShopError};
use crate::pickup::{self, Pickup, PickupKind, HEALTH_AMOUNT};
use crate::player::Player;
use crate::progression::{self, UpgradeEffect, UpgradeOption};
use crate::snapshot::{self, RenderItem};
use crate::spawner::EnemySpawner;
use crate::update;
use crate::vacuum::Vacuum;
use crate::world::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Playing,
    /// Waiting for `apply_upgrade`.
    LevelUp,
    Paused,
    GameOver,
}

/// Why the cards on screen are being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChoiceSource {
    LevelUp,
    /// Bonus card from a chest; settles no owed level-up.
    Chest,
}

pub struct GameState {
    pub(crate) phase: GamePhase,
    pub(crate) world: Option<WorldState>,

    // ── Systems ─────────────────────────────────────────────────────────
    pub(crate) spawner: EnemySpawner,
    pub(crate) passives: PassiveWeaponEngine,
    pub(crate) vacuum: Vacuum,
    pub(crate) rng: StdRng,

    // ── Presentation ────────────────────────────────────────────────────
    events: Vec<GameEvent>,
    /// Cards currently on screen.
    pending_choices: Option<Vec<UpgradeOption>>,
    choice_source: ChoiceSource,
    /// Chest choices that arrived while another choice was on screen.
    chest_choices: u32,
    last_summary: Option<RunSummary>,

    // ── Meta progression ────────────────────────────────────────────────
    meta: MetaUpgrades,
    store: Box<dyn MetaStore>,
}

impl GameState {
    /// Build from config: RON meta store at `save_path`, seeded or entropy RNG.
    pub fn new(config: &GameConfig) -> Self {
        Self::with_store(Box::new(RonMetaStore::new(&config.save_path)), config.seed)
    }

    /// Build around any store. Meta progression is loaded once, here.
    pub fn with_store(store: Box<dyn MetaStore>, seed: Option<u64>) -> Self {
        let meta = store.load().unwrap_or_else(|e| {
            log::warn!("Could not load meta progression: {}, starting fresh", e);
            MetaUpgrades::default()
        });
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            phase: GamePhase::Menu,
            world: None,
            spawner: EnemySpawner::new(),
            passives: PassiveWeaponEngine::new(),
            vacuum: Vacuum::new(),
            rng,
            events: Vec::new(),
            pending_choices: None,
            choice_source: ChoiceSource::LevelUp,
            chest_choices: 0,
            last_summary: None,
            meta,
            store,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut WorldState> {
        self.world.as_mut()
    }

    pub fn player(&self) -> Option<&Player> {
        self.world.as_ref().map(|w| &w.player)
    }

    pub fn meta(&self) -> &MetaUpgrades {
        &self.meta
    }

    /// Cards on screen, if a choice is being presented.
    pub fn pending_choices(&self) -> Option<&[UpgradeOption]> {
        self.pending_choices.as_deref()
    }

    pub fn last_summary(&self) -> Option<RunSummary> {
        self.last_summary
    }

    pub fn vacuum_active(&self) -> bool {
        self.vacuum.is_active()
    }

    /// Take every presentation request raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Everything the render layer needs this frame.
    pub fn snapshot(&self) -> Vec<RenderItem> {
        match &self.world {
            Some(world) => snapshot::capture(&world.entities, &world.player),
            None => Vec::new(),
        }
    }

    // ── Run lifecycle ───────────────────────────────────────────────────

    /// Begin a fresh run with `class`.
    pub fn start_game(&mut self, class: PlayerClass) {
        let player = Player::new(class, Vec2::ZERO, &self.meta);
        self.world = Some(WorldState::new(player));
        self.spawner = EnemySpawner::new();
        self.passives = PassiveWeaponEngine::new();
        self.vacuum.clear();
        self.events.clear();
        self.pending_choices = None;
        self.chest_choices = 0;
        self.last_summary = None;
        self.phase = GamePhase::Playing;
        log::info!("run started as {}", class.name());
    }

    /// Advance one frame. Only does work while playing.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        if input.is_pause_pressed() {
            match self.phase {
                GamePhase::Playing => self.pause(),
                GamePhase::Paused => self.resume(),
                _ => {}
            }
        }
        if self.phase != GamePhase::Playing {
            return;
        }
        update::gameplay(self, dt, input);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Abandon the run and tear everything down.
    pub fn quit_to_menu(&mut self) {
        self.world = None;
        self.vacuum.clear();
        self.pending_choices = None;
        self.chest_choices = 0;
        self.phase = GamePhase::Menu;
    }

    /// Player HP hit zero: record the summary and clear the field.
    pub(crate) fn game_over(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let summary = RunSummary {
            time: world.elapsed,
            kills: world.kills,
            gold: world.gold_collected,
            level: world.player.progression.level,
        };
        world.clear();
        self.vacuum.clear();
        self.pending_choices = None;
        self.chest_choices = 0;
        self.phase = GamePhase::GameOver;
        self.last_summary = Some(summary);
        self.emit(GameEvent::GameOver(summary));
        log::info!(
            "game over after {} with {} kills and {} gold",
            summary.time_survived_str(),
            summary.kills,
            summary.gold
        );
    }

    // ── Progression ─────────────────────────────────────────────────────

    /// Add XP and queue any level-ups. Opens a choice if none is on screen.
    /// Ignored outside a live run.
    pub fn gain_xp(&mut self, amount: f32) {
        if !matches!(self.phase, GamePhase::Playing | GamePhase::LevelUp) {
            return;
        }
        let xp_level = self.meta.xp_gain;
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let progression = &mut world.player.progression;
        let gained = progression.gain_xp(amount, xp_level);
        if gained == 0 {
            return;
        }
        let level = progression.level;
        log::debug!("level {} reached ({} pending)", level, progression.pending_level_ups);
        self.emit(GameEvent::LevelUp { level });
        if self.pending_choices.is_none() {
            self.present_upgrade_choice();
        }
    }

    /// Draw three cards and show them. Independent of the pending level-up counter.
    pub fn present_upgrade_choice(&mut self) {
        self.show_choice(ChoiceSource::LevelUp);
    }

    fn show_choice(&mut self, source: ChoiceSource) {
        if self.world.is_none() {
            return;
        }
        let choices = progression::draw_choices(&mut self.rng);
        self.pending_choices = Some(choices.clone());
        self.choice_source = source;
        if matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            self.phase = GamePhase::LevelUp;
        }
        self.emit(GameEvent::ShowUpgradeChoice(choices));
    }

    /// Apply a picked card and show the next choice if more are owed.
    /// Level-up cards settle one owed level-up, chest cards settle none.
    /// Returns false when there is no run.
    pub fn apply_upgrade(&mut self, option: UpgradeOption) -> bool {
        let Some(world) = self.world.as_mut() else {
            return false;
        };
        let player = &mut world.player;
        match option.effect {
            UpgradeEffect::Stat(target, value) => player.apply_stat(target, value),
            UpgradeEffect::PassiveWeapon(id) => {
                let level = player.grant_passive(id);
                log::debug!("{} now level {}", id.name(), level);
            }
        }
        let from_chest = self.pending_choices.is_some() && self.choice_source == ChoiceSource::Chest;
        if !from_chest {
            player.progression.consume_level_up();
        }
        let pending = player.progression.pending_level_ups;
        self.pending_choices = None;
        self.choice_source = ChoiceSource::LevelUp;

        if pending > 0 {
            self.show_choice(ChoiceSource::LevelUp);
        } else if self.chest_choices > 0 {
            self.chest_choices -= 1;
            self.show_choice(ChoiceSource::Chest);
        } else if self.phase == GamePhase::LevelUp {
            self.phase = GamePhase::Playing;
        }
        true
    }

    // ── Abilities ───────────────────────────────────────────────────────

    /// Druid form switch. Silently ignored when not allowed.
    pub fn shapeshift(&mut self, form: Form) -> bool {
        match self.world.as_mut() {
            Some(world) => world.player.shapeshift(form),
            None => false,
        }
    }

    /// Fire the class special if it is off cooldown.
    pub fn use_special_ability(&mut self) -> bool {
        let Some(world) = self.world.as_mut() else {
            return false;
        };
        let special = world.player.class.stats().special;
        if special == SpecialAbility::Shapeshift || world.player.special_cooldown.is_active() {
            return false;
        }
        match special {
            SpecialAbility::BerserkerRage => {
                world.player.special_duration.reset(special.duration());
                log::debug!("berserker rage");
            }
            SpecialAbility::AncestralWrath => {
                let origin = world.player.position;
                let damage = world.player.base_damage * WRATH_DAMAGE_MULT;
                let mut targets = world.enemy_targets();
                let hits: Vec<_> = targets
                    .within(origin, WRATH_RADIUS)
                    .into_iter()
                    .map(|t| targets.strike(t.entity, damage))
                    .collect();
                let kills = combat::apply_hits(world, &hits, &mut self.rng);
                log::debug!("ancestral wrath hit {} enemies, {} died", hits.len(), kills);
            }
            SpecialAbility::Shapeshift => {}
        }
        world.player.special_cooldown.reset(special.cooldown());
        true
    }

    // ── Pickups ─────────────────────────────────────────────────────────

    /// Apply a pickup's effect and remove it. Does nothing if it is already gone.
    pub(crate) fn collect_pickup(&mut self, entity: Entity) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let Ok(pickup) = world.entities.get::<&Pickup>(entity).map(|p| *p) else {
            return;
        };
        if world.entities.despawn(entity).is_err() {
            return;
        }

        match pickup.kind {
            PickupKind::XpOrb => self.gain_xp(pickup.value as f32),
            PickupKind::Gold => {
                world.gold_collected += pickup.value;
                self.meta.gold += pickup.value;
                self.save_meta();
            }
            PickupKind::Health => world.player.health.heal(HEALTH_AMOUNT),
            PickupKind::Chest => {
                if self.pending_choices.is_some() {
                    self.chest_choices += 1;
                } else {
                    self.show_choice(ChoiceSource::Chest);
                }
            }
            PickupKind::VacuumCrystal => {
                let field = pickup::live_pickups(&world.entities);
                self.vacuum.start(field, &mut self.rng);
            }
        }
    }

    // ── Meta shop ───────────────────────────────────────────────────────

    /// Buy one level of a permanent upgrade and save. Returns the new level.
    pub fn buy_meta_upgrade(&mut self, kind: MetaUpgradeKind) -> Result<u32, ShopError> {
        let level = self.meta.purchase(kind)?;
        log::info!("bought {} (level {})", kind.label(), level);
        self.save_meta();
        Ok(level)
    }

    fn save_meta(&self) {
        if let Err(e) = self.store.save(&self.meta) {
            log::warn!("Could not save meta progression: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryMetaStore;
    use crate::progression::{upgrade_by_id, StatTarget};
    use crate::passive::PassiveWeaponId;
    use std::rc::Rc;

    fn game() -> GameState {
        let mut g = GameState::with_store(Box::new(MemoryMetaStore::default()), Some(7));
        g.start_game(PlayerClass::Warrior);
        g
    }

    fn upgrade(id: &str) -> UpgradeOption {
        upgrade_by_id(id).unwrap()
    }

    #[test]
    fn large_xp_gain_queues_every_level() {
        let mut g = game();
        // 10 + 15 + 22 = 47 crosses three thresholds.
        g.gain_xp(50.0);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 3);
        assert_eq!(g.phase(), GamePhase::LevelUp);

        let prompts = g
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::ShowUpgradeChoice(_)))
            .count();
        assert_eq!(prompts, 1);

        let mut shown = 1;
        for _ in 0..3 {
            let pick = g.pending_choices().unwrap()[0];
            g.apply_upgrade(pick);
            shown += g
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::ShowUpgradeChoice(_)))
                .count();
        }
        assert_eq!(shown, 3);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
        assert_eq!(g.phase(), GamePhase::Playing);
        assert!(g.pending_choices().is_none());
    }

    #[test]
    fn stat_upgrades_stack_additively() {
        let mut g = game();
        for _ in 0..3 {
            g.apply_upgrade(upgrade("armor"));
        }
        assert!((g.player().unwrap().armor - 0.3).abs() < 1e-6);
        for _ in 0..10 {
            g.apply_upgrade(upgrade("armor"));
        }
        assert_eq!(g.player().unwrap().armor, 0.8);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
    }

    #[test]
    fn weapon_upgrade_grants_then_levels() {
        let mut g = game();
        g.apply_upgrade(upgrade("lightning"));
        assert_eq!(g.player().unwrap().passive_level(PassiveWeaponId::Lightning), Some(1));
        g.apply_upgrade(upgrade("garlicAura"));
        g.apply_upgrade(upgrade("lightning"));
        let player = g.player().unwrap();
        assert_eq!(player.passive_level(PassiveWeaponId::Lightning), Some(2));
        assert_eq!(player.passive_level(PassiveWeaponId::GarlicAura), Some(1));
        assert_eq!(player.passive_level(PassiveWeaponId::Boomerang), None);
    }

    #[test]
    fn chest_choice_does_not_touch_the_counter() {
        let mut g = game();
        Pickup::new(PickupKind::Chest, 0).spawn(&mut g.world.as_mut().unwrap().entities, Vec2::ZERO);
        let chest = pickup::live_pickups(&g.world().unwrap().entities)[0].0;
        g.collect_pickup(chest);

        assert_eq!(g.phase(), GamePhase::LevelUp);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
        g.apply_upgrade(upgrade("regen"));
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
        assert_eq!(g.phase(), GamePhase::Playing);
        assert_eq!(g.player().unwrap().regen, 1.0);
    }

    fn spawn_pickup(g: &mut GameState, kind: PickupKind, value: u32) -> Entity {
        Pickup::new(kind, value).spawn(&mut g.world.as_mut().unwrap().entities, Vec2::ZERO)
    }

    fn answer_all(g: &mut GameState) -> usize {
        let mut answered = 0;
        while g.phase() == GamePhase::LevelUp {
            let pick = g.pending_choices().unwrap()[0];
            g.apply_upgrade(pick);
            answered += 1;
        }
        answered
    }

    #[test]
    fn level_up_behind_a_chest_card_still_gets_its_prompt() {
        let mut g = game();
        let chest = spawn_pickup(&mut g, PickupKind::Chest, 0);
        let orb = spawn_pickup(&mut g, PickupKind::XpOrb, 12);
        g.collect_pickup(chest);
        g.collect_pickup(orb);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 1);

        assert_eq!(answer_all(&mut g), 2);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
        assert_eq!(g.player().unwrap().progression.level, 2);
        assert_eq!(g.phase(), GamePhase::Playing);
    }

    #[test]
    fn chest_during_level_up_choice_is_shown_afterwards() {
        let mut g = game();
        let orb = spawn_pickup(&mut g, PickupKind::XpOrb, 12);
        let chest = spawn_pickup(&mut g, PickupKind::Chest, 0);
        g.collect_pickup(orb);
        g.collect_pickup(chest);
        g.drain_events();

        g.apply_upgrade(upgrade("regen"));
        assert_eq!(g.phase(), GamePhase::LevelUp);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
        let prompts = g
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::ShowUpgradeChoice(_)))
            .count();
        assert_eq!(prompts, 1);

        assert_eq!(answer_all(&mut g), 1);
        assert_eq!(g.player().unwrap().progression.pending_level_ups, 0);
    }

    #[test]
    fn xp_after_game_over_is_ignored() {
        let mut g = game();
        g.game_over();
        g.drain_events();
        g.gain_xp(50.0);
        let player = g.player().unwrap();
        assert_eq!(player.progression.level, 1);
        assert_eq!(player.progression.pending_level_ups, 0);
        assert!(g.pending_choices().is_none());
        assert_eq!(g.phase(), GamePhase::GameOver);
        assert!(g.drain_events().is_empty());
    }

    #[test]
    fn pickup_is_collected_once() {
        let mut g = game();
        let e = Pickup::new(PickupKind::XpOrb, 4).spawn(&mut g.world.as_mut().unwrap().entities, Vec2::ZERO);
        g.collect_pickup(e);
        g.collect_pickup(e);
        assert_eq!(g.player().unwrap().progression.xp, 4.0);
    }

    #[test]
    fn gold_pickup_banks_and_saves() {
        let store = Rc::new(MemoryMetaStore::default());
        let mut g = GameState::with_store(Box::new(Rc::clone(&store)), Some(1));
        g.start_game(PlayerClass::Shaman);
        let e = Pickup::new(PickupKind::Gold, 6).spawn(&mut g.world.as_mut().unwrap().entities, Vec2::ZERO);
        g.collect_pickup(e);
        assert_eq!(g.world().unwrap().gold_collected, 6);
        assert_eq!(store.saved().gold, 6);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn shop_rejects_unaffordable_and_saves_purchases() {
        let store = Rc::new(MemoryMetaStore::new(MetaUpgrades { gold: 60, ..Default::default() }));
        let mut g = GameState::with_store(Box::new(Rc::clone(&store)), Some(1));
        assert_eq!(
            g.buy_meta_upgrade(MetaUpgradeKind::Damage),
            Err(ShopError::InsufficientGold { cost: 75, available: 60 })
        );
        assert_eq!(store.save_count(), 0);
        assert_eq!(g.buy_meta_upgrade(MetaUpgradeKind::MaxHp), Ok(1));
        assert_eq!(store.saved().gold, 10);
        assert_eq!(store.saved().max_hp, 1);

        g.start_game(PlayerClass::Warrior);
        assert_eq!(g.player().unwrap().health.max, 130.0);
    }

    #[test]
    fn berserker_rage_respects_cooldown() {
        let mut g = game();
        let base = g.player().unwrap().damage();
        assert!(g.use_special_ability());
        assert!((g.player().unwrap().damage() - base * 1.5).abs() < 1e-4);
        assert!(!g.use_special_ability());
    }

    #[test]
    fn druid_special_key_does_nothing() {
        let mut g = GameState::with_store(Box::new(MemoryMetaStore::default()), Some(2));
        g.start_game(PlayerClass::Druid);
        assert!(!g.use_special_ability());
        assert!(g.shapeshift(Form::Bear));
        assert!(!g.shapeshift(Form::Wolf));
    }

    #[test]
    fn pause_only_from_playing() {
        let mut g = game();
        g.pause();
        assert_eq!(g.phase(), GamePhase::Paused);
        g.resume();
        assert_eq!(g.phase(), GamePhase::Playing);
        g.quit_to_menu();
        g.pause();
        assert_eq!(g.phase(), GamePhase::Menu);
        assert!(g.world().is_none());
        assert!(g.snapshot().is_empty());
    }

    #[test]
    fn max_hp_upgrade_heals_by_the_same_amount() {
        let mut g = game();
        g.world_mut().unwrap().player.health.current = 50.0;
        g.apply_upgrade(upgrade("maxHp"));
        let player = g.player().unwrap();
        assert_eq!(player.max_hp, 140.0);
        assert_eq!(player.health.current, 70.0);
        assert!(matches!(upgrade("maxHp").effect, UpgradeEffect::Stat(StatTarget::MaxHp, _)));
    }
}
