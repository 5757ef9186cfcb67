//! Gameplay update logic: all per-frame run advancement.
//!
//! Order within a frame: clock, player, active weapon, passive weapons,
//! projectiles, enemies, death check, spawner, pickups, vacuum. Spawns and
//! kills queued along the way are flushed last.

use input::InputState;

use crate::class::Form;
use crate::combat::PlayerHit;
use crate::events::GameEvent;
use crate::pickup;
use crate::projectile;
use crate::state::GameState;
use crate::{enemy, weapons};

/// Run one frame of gameplay. Called from `GameState::update()` while playing.
pub fn gameplay(state: &mut GameState, dt: f32, input: &InputState) {
    let aim = input.aim_target();

    // Player movement, timers and regeneration
    {
        let Some(world) = state.world.as_mut() else {
            return;
        };
        world.advance_clock(dt);
        let player = &mut world.player;
        player.apply_movement(input.get_movement_input(), aim, dt);
        player.tick_timers(dt);
        player.regenerate(dt);
    }

    // Hotkeys
    if let Some(form) = input.form_hotkey_pressed().and_then(Form::from_index) {
        state.shapeshift(form);
    } else if input.is_cycle_form_pressed() {
        if let Some(next) = state.player().map(|p| p.form.next()) {
            state.shapeshift(next);
        }
    }
    if input.is_special_pressed() {
        state.use_special_ability();
    }

    let Some(world) = state.world.as_mut() else {
        return;
    };

    // Weapons
    weapons::update_active_weapon(world, aim, dt, &mut state.rng);
    state.passives.update(world, dt, &mut state.rng);
    let projectile_hit = projectile::update_projectiles(world, dt, &mut state.rng);

    // Enemies
    let (contact_hit, bolts) = enemy::update_enemies(&mut world.entities, &mut world.player, dt);
    for (transform, bolt) in bolts {
        world.spawn_projectile(transform, bolt);
    }

    if projectile_hit.max(contact_hit) == PlayerHit::Killed {
        state.game_over();
        return;
    }

    // Spawning
    let report = state.spawner.update(
        &mut world.commands,
        world.player.position,
        world.elapsed,
        world.wave,
        dt,
        &mut state.rng,
    );

    // Pickups: magnet first, then anything the vacuum delivered
    let player_pos = world.player.position;
    let collected = pickup::update_pickups(&mut world.entities, player_pos, world.player.pickup_range, dt);
    let arrived = state.vacuum.update(&mut world.entities, player_pos, dt);

    if report.boss {
        state.emit(GameEvent::BossWarning);
    }
    for entity in collected.into_iter().chain(arrived) {
        state.collect_pickup(entity);
    }

    if let Some(world) = state.world.as_mut() {
        world.flush();
    }
}
