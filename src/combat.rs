use crate::constants::{
    BOSS_GROWTH_RATE, BOSS_INITIAL_RADIUS, BOSS_MAX_RADIUS, DAMAGE_FLASH_DECAY, DAMAGE_FLASH_SECS,
};

/// External health resource. The state machine reads it for the win check
/// and the boss drives it on eye hits; storage stays with the caller.
pub trait Health {
    fn health(&self) -> f32;
    fn take_damage(&mut self, amount: f32);
}

/// Default 0..100 meter used by the demo binary and tests.
pub struct HealthMeter {
    value: f32,
    max: f32,
}

impl HealthMeter {
    pub fn new(max: f32) -> Self {
        Self { value: max, max }
    }

    pub fn max(&self) -> f32 {
        self.max
    }
}

impl Default for HealthMeter {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health for HealthMeter {
    fn health(&self) -> f32 {
        self.value
    }

    fn take_damage(&mut self, amount: f32) {
        self.value = (self.value - amount).max(0.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    Idle,
    Entering,
    Combat,
    Victory,
    Defeat,
}

impl CombatPhase {
    pub fn is_active(self) -> bool {
        matches!(self, CombatPhase::Entering | CombatPhase::Combat)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CombatPhase::Victory | CombatPhase::Defeat)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CombatStats {
    pub objects_created: u32,
    pub objects_consumed: u32,
    pub total_damage_dealt: f32,
    pub victory_time: Option<f32>,
}

/// Finite-state combat lifecycle:
/// `idle -> entering -> combat -> victory | defeat`.
/// Victory and defeat are terminal; everything freezes there until the
/// owner builds a fresh instance.
pub struct CombatState {
    phase: CombatPhase,
    elapsed: f32,
    visual_radius: f32,
    damage_flash: f32,
    stats: CombatStats,
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatState {
    pub fn new() -> Self {
        Self {
            phase: CombatPhase::Idle,
            elapsed: 0.0,
            visual_radius: BOSS_INITIAL_RADIUS,
            damage_flash: 0.0,
            stats: CombatStats::default(),
        }
    }

    /// Begins an encounter. No-op unless idle; returns whether the
    /// transition happened so the caller knows to spawn the boss.
    pub fn start(&mut self) -> bool {
        if self.phase != CombatPhase::Idle {
            return false;
        }
        self.visual_radius = BOSS_INITIAL_RADIUS;
        self.elapsed = 0.0;
        self.damage_flash = 0.0;
        self.stats = CombatStats::default();
        self.phase = CombatPhase::Entering;
        true
    }

    /// Called by the boss once its entry motion completes.
    pub fn enter_combat(&mut self) {
        if self.phase == CombatPhase::Entering {
            self.phase = CombatPhase::Combat;
        }
    }

    pub fn update(&mut self, health: &dyn Health, dt: f32) {
        if !self.phase.is_active() {
            return;
        }
        self.elapsed += dt;
        if self.phase == CombatPhase::Combat {
            self.visual_radius += BOSS_GROWTH_RATE * dt;
        }
        self.damage_flash = (self.damage_flash - DAMAGE_FLASH_DECAY * dt).max(0.0);

        // Win and loss are mutually exclusive within one tick; the win
        // check runs first.
        if self.phase == CombatPhase::Combat && health.health() <= 0.0 {
            self.phase = CombatPhase::Victory;
            self.stats.victory_time = Some(self.elapsed);
        } else if self.phase == CombatPhase::Combat && self.visual_radius >= BOSS_MAX_RADIUS {
            self.phase = CombatPhase::Defeat;
        }
    }

    /// Renderer signal only; no gameplay effect.
    pub fn trigger_damage_flash(&mut self) {
        if self.phase.is_active() {
            self.damage_flash = DAMAGE_FLASH_SECS;
        }
    }

    pub fn record_object_created(&mut self) {
        if self.phase.is_active() {
            self.stats.objects_created += 1;
        }
    }

    pub fn record_object_consumed(&mut self) {
        if self.phase.is_active() {
            self.stats.objects_consumed += 1;
        }
    }

    pub fn record_damage(&mut self, amount: f32) {
        if self.phase.is_active() {
            self.stats.total_damage_dealt += amount;
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn visual_radius(&self) -> f32 {
        self.visual_radius
    }

    pub fn damage_flash(&self) -> f32 {
        self.damage_flash
    }

    pub fn stats(&self) -> &CombatStats {
        &self.stats
    }
}
