use engine_core::{Health, Transform, Vec2};
use input::{ElementState, InputState, KeyCode};
use rand::rngs::StdRng;
use rand::SeedableRng;

use survivors::combat::mitigate;
use survivors::enemy::{Enemy, EnemyBundle, EnemyType};
use survivors::passive::{level_factor, orbit_radius, PassiveWeaponId};
use survivors::persistence::{MemoryMetaStore, MetaUpgrades};
use survivors::pickup::{Pickup, PickupKind};
use survivors::progression::upgrade_by_id;
use survivors::weapons::{self, spread_directions};
use survivors::{GameEvent, GamePhase, GameState, PlayerClass};

const DT: f32 = 1.0 / 60.0;

fn new_game(class: PlayerClass, seed: u64) -> GameState {
    let mut game = GameState::with_store(Box::new(MemoryMetaStore::new(MetaUpgrades::default())), Some(seed));
    game.start_game(class);
    game
}

fn idle() -> InputState {
    InputState::new()
}

// ── Scaling and formulas ──────────────────────────────────────────────────────

#[test]
fn skeleton_spawned_at_ten_minutes_has_150_hp() {
    let mut game = new_game(PlayerClass::Warrior, 1);
    let world = game.world_mut().unwrap();
    world.elapsed = 600.0;
    world.wave = 1 + (600.0f32 / 30.0).floor() as u32;
    assert_eq!(world.wave, 21);

    let e = EnemyBundle::new(EnemyType::Skeleton, Vec2::new(10.0, 0.0), world.elapsed, world.wave).spawn(&mut world.entities);
    let hp = world.entities.get::<&Health>(e).unwrap().current;
    assert!((hp - 150.0).abs() < 1e-3, "hp {hp}");
}

#[test]
fn armor_mitigation_is_linear_and_monotonic() {
    let mut last = f32::MAX;
    for step in 0..=8 {
        let armor = step as f32 * 0.1;
        let applied = mitigate(40.0, armor);
        assert!((applied - 40.0 * (1.0 - armor)).abs() < 1e-4);
        assert!(applied < last);
        last = applied;
    }
}

#[test]
fn three_shot_fan_is_minus_zero_plus_point_three() {
    let dirs = spread_directions(Vec2::X, 3, 0.3);
    let angles: Vec<f32> = dirs.iter().map(|d| d.y.atan2(d.x)).collect();
    assert!((angles[0] + 0.3).abs() < 1e-5);
    assert!(angles[1].abs() < 1e-6);
    assert!((angles[2] - 0.3).abs() < 1e-5);
}

#[test]
fn orbit_level_three_radius_and_damage_factor() {
    assert!((orbit_radius(3) - 3.0).abs() < 1e-5);
    assert!((level_factor(3, 0.2) - 1.4).abs() < 1e-6);
}

// ── Progression ───────────────────────────────────────────────────────────────

#[test]
fn one_big_xp_gain_needs_one_prompt_per_level() {
    let mut game = new_game(PlayerClass::Shaman, 2);
    // Thresholds 10, 15, 22, 33: 80 XP crosses four.
    game.gain_xp(80.0);
    assert_eq!(game.player().unwrap().progression.pending_level_ups, 4);

    let mut prompts = 0;
    while game.phase() == GamePhase::LevelUp {
        prompts += game
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::ShowUpgradeChoice(_)))
            .count();
        let choice = game.pending_choices().unwrap()[0];
        game.apply_upgrade(choice);
    }
    assert_eq!(prompts, 4);
    assert_eq!(game.player().unwrap().progression.pending_level_ups, 0);
    assert_eq!(game.player().unwrap().progression.level, 5);
}

#[test]
fn repeated_armor_upgrades_stack_then_cap() {
    let mut game = new_game(PlayerClass::Warrior, 3);
    let armor = upgrade_by_id("armor").unwrap();
    for _ in 0..3 {
        game.apply_upgrade(armor);
    }
    assert!((game.player().unwrap().armor - 0.3).abs() < 1e-6);
    for _ in 0..6 {
        game.apply_upgrade(armor);
    }
    assert_eq!(game.player().unwrap().armor, 0.8);
}

#[test]
fn passive_weapon_levels_are_independent() {
    let mut game = new_game(PlayerClass::Druid, 4);
    game.apply_upgrade(upgrade_by_id("throwingAxe").unwrap());
    game.apply_upgrade(upgrade_by_id("holyOrbit").unwrap());
    game.apply_upgrade(upgrade_by_id("throwingAxe").unwrap());
    let player = game.player().unwrap();
    assert_eq!(player.passive_level(PassiveWeaponId::ThrowingAxe), Some(2));
    assert_eq!(player.passive_level(PassiveWeaponId::HolyOrbit), Some(1));
}

#[test]
fn chest_mixed_with_level_ups_adds_exactly_one_prompt() {
    let mut game = new_game(PlayerClass::Shaman, 13);
    {
        let entities = &mut game.world_mut().unwrap().entities;
        // A chest lands next to the orb of the enemy that dropped both.
        Pickup::new(PickupKind::Chest, 0).spawn(entities, Vec2::new(0.2, 0.1));
        Pickup::new(PickupKind::XpOrb, 80).spawn(entities, Vec2::new(0.1, 0.0));
    }
    game.update(DT, &idle());
    assert_eq!(game.phase(), GamePhase::LevelUp);
    assert_eq!(game.player().unwrap().progression.level, 5);

    let mut prompts = 0;
    while game.phase() == GamePhase::LevelUp && prompts < 10 {
        let choice = game.pending_choices().unwrap()[0];
        game.apply_upgrade(choice);
        prompts += 1;
    }
    // Four level-ups plus the chest.
    assert_eq!(prompts, 5);
    assert_eq!(game.player().unwrap().progression.pending_level_ups, 0);
    assert_eq!(game.phase(), GamePhase::Playing);
}

// ── Melee crits ───────────────────────────────────────────────────────────────

#[test]
fn certain_melee_crit_doubles_sword_damage() {
    let mut game = new_game(PlayerClass::Warrior, 14);
    let mut rng = StdRng::seed_from_u64(14);
    let world = game.world_mut().unwrap();

    let plain = world.player.damage();
    let dummy = EnemyBundle::new(EnemyType::Reaper, Vec2::new(1.0, 0.0), 0.0, 1).spawn(&mut world.entities);
    weapons::update_active_weapon(world, Vec2::new(5.0, 0.0), DT, &mut rng);
    let first = {
        let health = world.entities.get::<&Health>(dummy).unwrap();
        health.max - health.current
    };
    assert!((first - plain).abs() < 1e-3, "uncrit swing dealt {first}");

    world.player.crit_chance = 1.0;
    world.player.weapon_timer.reset(0.0);
    weapons::update_active_weapon(world, Vec2::new(5.0, 0.0), DT, &mut rng);
    let health = world.entities.get::<&Health>(dummy).unwrap();
    let second = health.max - health.current - first;
    assert!((second - plain * 2.0).abs() < 1e-3, "crit swing dealt {second}");
}

// ── Full frames ───────────────────────────────────────────────────────────────

#[test]
fn lethal_contact_ends_the_run_and_clears_the_field() {
    let mut game = new_game(PlayerClass::Warrior, 5);
    {
        let world = game.world_mut().unwrap();
        world.player.health.current = 1.0;
        // Zombies survive the opening sword swing.
        EnemyBundle::new(EnemyType::Zombie, Vec2::new(0.3, 0.0), 0.0, 1).spawn(&mut world.entities);
        EnemyBundle::new(EnemyType::Imp, Vec2::new(8.0, 0.0), 0.0, 1).spawn(&mut world.entities);
    }

    game.update(DT, &idle());

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.world().unwrap().entities.len(), 0);
    assert_eq!(game.world().unwrap().player.health.current, 0.0);
    let events = game.drain_events();
    assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver(s) if s.time > 0.0)));

    // A finished run no longer advances.
    let elapsed = game.world().unwrap().elapsed;
    game.update(DT, &idle());
    assert_eq!(game.world().unwrap().elapsed, elapsed);
}

#[test]
fn invincibility_absorbs_the_second_hit() {
    let mut game = new_game(PlayerClass::Warrior, 6);
    {
        let world = game.world_mut().unwrap();
        for y in [-0.3, 0.3] {
            EnemyBundle::new(EnemyType::Zombie, Vec2::new(0.0, y), 0.0, 1).spawn(&mut world.entities);
        }
    }
    game.update(DT, &idle());
    let player = game.player().unwrap();
    // One zombie hit for 12; the other landed inside the window.
    assert_eq!(player.health.current, 108.0);
    assert!(player.invincibility.is_active());
}

#[test]
fn xp_orb_at_the_feet_levels_up_and_freezes_the_clock() {
    let mut game = new_game(PlayerClass::Warrior, 7);
    Pickup::new(PickupKind::XpOrb, 12).spawn(&mut game.world_mut().unwrap().entities, Vec2::new(0.2, 0.0));

    game.update(DT, &idle());
    assert_eq!(game.phase(), GamePhase::LevelUp);
    assert_eq!(game.player().unwrap().progression.level, 2);

    let elapsed = game.world().unwrap().elapsed;
    for _ in 0..10 {
        game.update(DT, &idle());
    }
    assert_eq!(game.world().unwrap().elapsed, elapsed);
}

#[test]
fn vacuum_crystal_collects_the_whole_field() {
    let mut game = new_game(PlayerClass::Shaman, 8);
    {
        let entities = &mut game.world_mut().unwrap().entities;
        Pickup::new(PickupKind::VacuumCrystal, 0).spawn(entities, Vec2::new(0.1, 0.0));
        for x in [30.0, -30.0, 45.0] {
            Pickup::new(PickupKind::XpOrb, 1).spawn(entities, Vec2::new(x, 10.0));
        }
    }

    game.update(DT, &idle());
    assert!(game.vacuum_active());
    for _ in 0..60 {
        game.update(DT, &idle());
    }

    assert!(!game.vacuum_active());
    assert_eq!(game.player().unwrap().progression.xp, 3.0);
    let left = game.world().unwrap().entities.query::<&Pickup>().iter().count();
    assert_eq!(left, 0);
}

#[test]
fn reaper_arrives_once_with_a_warning() {
    let mut game = new_game(PlayerClass::Warrior, 9);
    game.world_mut().unwrap().elapsed = 900.0 - DT / 2.0;

    let mut warnings = 0;
    for _ in 0..5 {
        game.update(DT, &idle());
        warnings += game.drain_events().iter().filter(|e| **e == GameEvent::BossWarning).count();
    }
    assert_eq!(warnings, 1);

    let world = game.world().unwrap();
    let bosses: Vec<f32> = world
        .entities
        .query::<(&Health, &Enemy)>()
        .iter()
        .filter(|(_, (_, e))| e.is_boss)
        .map(|(_, (h, _))| h.max)
        .collect();
    assert_eq!(bosses, vec![99999.0]);
}

#[test]
fn escape_toggles_pause() {
    let mut game = new_game(PlayerClass::Warrior, 10);
    let mut input = InputState::new();
    input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
    game.update(DT, &input);
    assert_eq!(game.phase(), GamePhase::Paused);
    assert_eq!(game.world().unwrap().elapsed, 0.0);

    input.begin_frame();
    input.process_keyboard(KeyCode::Escape, ElementState::Released);
    input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
    game.update(DT, &input);
    assert_eq!(game.phase(), GamePhase::Playing);
    assert!(game.world().unwrap().elapsed > 0.0);
}

#[test]
fn druid_hotkeys_switch_form_and_weapon() {
    let mut game = new_game(PlayerClass::Druid, 11);
    let mut input = InputState::new();
    input.process_keyboard(KeyCode::Digit2, ElementState::Pressed);
    game.update(DT, &input);

    let player = game.player().unwrap();
    assert_eq!(player.form, survivors::Form::Bear);
    assert_eq!(player.health.max, 150.0);
    assert_eq!(player.health.current, 150.0);
}

#[test]
fn ninety_seconds_of_play_keeps_the_world_consistent() {
    let mut game = new_game(PlayerClass::Warrior, 12);
    game.apply_upgrade(upgrade_by_id("garlicAura").unwrap());
    game.apply_upgrade(upgrade_by_id("holyOrbit").unwrap());

    let input = idle();
    for _ in 0..(90 * 60) {
        if game.phase() == GamePhase::LevelUp {
            let choice = game.pending_choices().unwrap()[0];
            game.apply_upgrade(choice);
        }
        if game.phase() == GamePhase::GameOver {
            break;
        }
        game.update(DT, &input);

        let world = game.world().unwrap();
        let player = &world.player;
        assert!(player.health.current >= 0.0);
        assert!(player.health.current <= player.health.max + 1e-3);
        assert!(player.position.y.abs() <= 25.0);
        if game.phase() != GamePhase::GameOver {
            for (_, (health, enemy)) in world.entities.query::<(&Health, &Enemy)>().iter() {
                assert!(health.current > 0.0);
                assert!(!enemy.is_boss);
            }
        }
    }

    let world = game.world().unwrap();
    assert!(world.kills > 0 || world.enemy_count() > 0);
    assert!(world.wave >= 1);
    let transforms = world.entities.query::<&Transform>().iter().count();
    assert_eq!(transforms, world.entities.len() as usize);
}
