//! Common ECS components used across the engine.

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract damage, clamping at zero. Returns true if this hit was the killing blow.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_dead();
        self.current = (self.current - amount).max(0.0);
        was_alive && self.is_dead()
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Lifetime component for temporary entities (strikes, projectiles, effects).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Tick down. Returns true once expired.
    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// Countdown timer that fires when it reaches zero and is then re-armed by the owner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cooldown {
    pub remaining: f32,
}

impl Cooldown {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining -= dt;
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Active means still counting down.
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn reset(&mut self, seconds: f32) {
        self.remaining = seconds;
    }

    /// Tick and clamp at zero, for timers that are only ever checked for "still active".
    pub fn tick_clamped(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }
}
