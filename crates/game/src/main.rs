//! Pixel Survivors headless driver.
//!
//! Runs the simulation with scripted input: the hero walks a square, aims at
//! the nearest enemy and answers level-up prompts by the configured policy.
//! Usage: `pixel-survivors [warrior|druid|shaman]`.

use std::time::Duration;

use anyhow::{bail, Result};
use engine_core::Time;
use input::{ElementState, InputState, KeyCode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use survivors::config::AutoPick;
use survivors::progression::UpgradeOption;
use survivors::{GameConfig, GameEvent, GamePhase, GameState, PlayerClass};

/// Seconds spent walking each side of the square.
const LEG_SECONDS: f32 = 3.0;
const LEGS: [KeyCode; 4] = [KeyCode::KeyD, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyW];

fn pick(choices: &[UpgradeOption], policy: AutoPick, rng: &mut StdRng) -> Option<UpgradeOption> {
    match policy {
        AutoPick::First => choices.first().copied(),
        AutoPick::PreferWeapons => choices
            .iter()
            .find(|c| c.is_weapon())
            .or_else(|| choices.first())
            .copied(),
        AutoPick::Random if !choices.is_empty() => Some(choices[rng.gen_range(0..choices.len())]),
        AutoPick::Random => None,
    }
}

/// Hold exactly one movement key, releasing the previous one.
fn steer(input: &mut InputState, elapsed: f32) {
    let leg = (elapsed / LEG_SECONDS) as usize % LEGS.len();
    for (i, key) in LEGS.iter().enumerate() {
        let held = input.is_key_held(*key);
        if i == leg && !held {
            input.process_keyboard(*key, ElementState::Pressed);
        } else if i != leg && held {
            input.process_keyboard(*key, ElementState::Released);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    let class = match std::env::args().nth(1) {
        Some(id) => match PlayerClass::from_id(&id) {
            Some(class) => class,
            None => bail!("unknown class {:?}, expected warrior, druid or shaman", id),
        },
        None => config.default_class,
    };

    let mut game = GameState::new(&config);
    let mut picker = StdRng::seed_from_u64(config.seed.unwrap_or(0));
    let mut input = InputState::new();
    let mut time = Time::new();
    time.set_fixed_rate(config.tick_rate as f64);
    let step = time.fixed_timestep_seconds();

    log::info!(
        "headless run: {} for {:.0}s at {} Hz (meta gold {})",
        class.name(),
        config.run_seconds,
        config.tick_rate,
        game.meta().gold
    );
    game.start_game(class);
    let mut last_wave = 1;

    while game.phase() != GamePhase::GameOver {
        let elapsed = game.world().map_or(0.0, |w| w.elapsed);
        if elapsed >= config.run_seconds {
            break;
        }

        time.advance(Duration::from_secs_f32(step));
        while time.should_fixed_update() {
            input.begin_frame();
            steer(&mut input, elapsed);
            if let Some(world) = game.world() {
                let pos = world.player.position;
                if let Some(target) = world.enemy_targets().nearest(pos, f32::MAX) {
                    input.process_aim_target(target.position);
                }
            }
            game.update(step, &input);
        }

        if let Some(world) = game.world().filter(|w| w.wave != last_wave) {
            last_wave = world.wave;
            log::info!(
                "wave {} at {:.1} min: {} enemies, level {} ({:.0}% to next)",
                world.wave,
                world.minutes(),
                world.enemy_count(),
                world.player.progression.level,
                world.player.progression.progress() * 100.0
            );
        }

        for event in game.drain_events() {
            match event {
                GameEvent::LevelUp { level } => log::info!("reached level {}", level),
                GameEvent::BossWarning => log::warn!("THE REAPER APPROACHES"),
                GameEvent::ShowUpgradeChoice(_) | GameEvent::GameOver(_) => {}
            }
        }
        while game.phase() == GamePhase::LevelUp {
            let Some(choice) = game.pending_choices().and_then(|c| pick(c, config.auto_pick, &mut picker)) else {
                break;
            };
            log::info!("picked {}", choice.name);
            game.apply_upgrade(choice);
        }
    }

    let summary = match game.last_summary() {
        Some(summary) => summary,
        None => {
            let world = game.world();
            survivors::RunSummary {
                time: world.map_or(0.0, |w| w.elapsed),
                kills: world.map_or(0, |w| w.kills),
                gold: world.map_or(0, |w| w.gold_collected),
                level: world.map_or(1, |w| w.player.progression.level),
            }
        }
    };
    println!(
        "{} survived {} | level {} | {} kills | {} gold",
        class.name(),
        summary.time_survived_str(),
        summary.level,
        summary.kills,
        summary.gold
    );
    Ok(())
}
