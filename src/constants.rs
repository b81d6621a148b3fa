//! Tuneable gameplay constants.
//!
//! Everything the encounter balances on lives here so it can be reasoned
//! about in one place instead of scattered across modules.

use std::f32::consts::FRAC_PI_2;

/// Fixed simulation timestep driven by the demo loop (seconds).
pub const FIXED_DT: f32 = 1.0 / 60.0;

// ── Ephemeral entities ───────────────────────────────────────────────────────

/// Capacity of the ephemeral ring buffer. Registering the 401st ephemeral
/// entity evicts and destroys the oldest one.
pub const MAX_EPHEMERAL: usize = 400;

// ── Boss body ────────────────────────────────────────────────────────────────

/// Visual radius the boss starts an encounter with (world units).
pub const BOSS_INITIAL_RADIUS: f32 = 60.0;

/// Visual radius at which the encounter is lost.
pub const BOSS_MAX_RADIUS: f32 = 320.0;

/// Linear visual-radius growth while combat is running (units/s).
pub const BOSS_GROWTH_RATE: f32 = 2.4;

/// Horizontal entry speed from the off-field spawn point (units/s).
pub const BOSS_ENTRY_SPEED: f32 = 140.0;

/// Resting X coordinate as a fraction of field width.
pub const BOSS_REST_X_FRACTION: f32 = 0.72;

/// Radius of the absorbing core sensor.
pub const CORE_RADIUS: f32 = 14.0;

// ── Weak-point eye ───────────────────────────────────────────────────────────

/// The eye never shrinks below this radius.
pub const EYE_MIN_RADIUS: f32 = 16.0;

/// Eye radius as a fraction of the boss visual radius.
pub const EYE_RADIUS_FRACTION: f32 = 0.38;

/// Relative drift between computed and installed eye radius that forces a
/// collider shape rebuild. Below this the stale shape is kept.
pub const EYE_REBUILD_TOLERANCE: f32 = 0.10;

/// Angular roam speed of the eye along its arc (rad/s).
pub const EYE_ROAM_SPEED: f32 = 1.4;

/// Lerp rate pulling angular velocity toward the roam target (1/s).
pub const EYE_ROAM_ACCEL: f32 = 4.0;

/// Seconds between roam direction re-rolls, randomized in this range.
pub const EYE_RETARGET_MIN_SECS: f32 = 0.5;
pub const EYE_RETARGET_MAX_SECS: f32 = 2.0;

/// Roam arc endpoints: straight right up to straight above the center.
pub const EYE_ARC_MIN: f32 = 0.0;
pub const EYE_ARC_MAX: f32 = FRAC_PI_2;

// ── Suction field ────────────────────────────────────────────────────────────

/// Base strength of the inverse-distance pull at the initial radius.
pub const SUCTION_BASE_STRENGTH: f32 = 900.0;

/// Extra strength per unit of visual-radius growth.
pub const SUCTION_GROWTH_STRENGTH: f32 = 14.0;

/// Bodies closer than this squared distance to the center are skipped.
pub const SUCTION_MIN_DIST_SQ: f32 = 1.0;

/// Suction strength at which a static scenery body tears loose and
/// becomes dynamic.
pub const SCENERY_DETACH_FORCE: f32 = 6.0;

// ── Eye damage ───────────────────────────────────────────────────────────────

/// Converts impact momentum (speed × mass) into health damage.
pub const MOMENTUM_SCALE: f32 = 0.005;

/// Impacts below this damage are ignored entirely.
pub const DAMAGE_THRESHOLD: f32 = 0.1;

/// Duration the damage flash timer is set to on a qualifying hit (seconds).
pub const DAMAGE_FLASH_SECS: f32 = 0.3;

/// Flash timer decay rate (seconds of flash lost per second).
pub const DAMAGE_FLASH_DECAY: f32 = 1.0;
