// ============ Player Constants ============

pub const PLAYER_MOVE_SPEED: f32 = 200.0;
pub const PLAYER_HEALTH: f32 = 100.0;
pub const PLAYER_PICKUP_RADIUS: f32 = 100.0;
pub const PLAYER_COLLIDER_RADIUS: f32 = 10.0;
pub const PLAYER_IMMUNITY_SECS: f32 = 1.0;
pub const MAX_EQUIPPED_WEAPONS: usize = 4;

pub const MOVE_SPEED_UPGRADE: f32 = 15.0;
pub const PICKUP_RADIUS_UPGRADE: f32 = 10.0;
pub const MAX_HEALTH_UPGRADE: f32 = 10.0;

// ============ Progression Constants ============

pub const INITIAL_XP_TO_NEXT_LEVEL: u32 = 26;
pub const UPGRADE_CHOICE_COUNT: usize = 3;
pub const LEVEL_UP_SETTLE_DELAY_SECS: f32 = 0.5;

// ============ Director Constants ============

// Spawn cadence, stage thresholds and the population cap live in the game
// config asset; these cover what the config does not reach.
pub const BASE_SPAWN_INTERVAL_MS: u32 = 1000;
pub const SPAWN_RING_MARGIN: f32 = 100.0;
pub const SPAWN_RING_FALLBACK_RADIUS: f32 = 800.0;
pub const STRAGGLER_GC_MARGIN: f32 = 300.0;
pub const FAST_SWARM_COUNT: usize = 10;
pub const BASIC_BATCH_MAX: u32 = 10;
pub const STAGE_THREE_BATCH_MAX: u32 = 16;
pub const BATCH_POSITION_JITTER: f32 = 10.0;

// ============ Enemy Constants ============

pub const STAGGER_SPEED: f32 = 20.0;
pub const STAGGER_RECOVERY_SECS: f32 = 1.5;
pub const HIT_FLASH_SECS: f32 = 0.1;
pub const DEATH_ANIMATION_SECS: f32 = 0.2;
pub const KNOCKBACK_SECS: f32 = 0.15;
pub const HEALTH_POTION_DROP_CHANCE: f64 = 0.03;
pub const HEALTH_POTION_VALUE: f32 = 20.0;

// ============ Pickup Constants ============

pub const PICKUP_ACTIVATION_DELAY_SECS: f32 = 0.5;
pub const PICKUP_COLLECT_RANGE: f32 = 20.0;
pub const PICKUP_SCOOT_DISTANCE: f32 = 40.0;
pub const PICKUP_SCOOT_SECS: f32 = 0.15;
pub const PICKUP_HOMING_SPEED_MIN: f32 = 320.0;
pub const PICKUP_HOMING_SPEED_MAX: f32 = 380.0;

// ============ Weapon Constants ============

pub const PROJECTILE_LIFESPAN_SECS: f32 = 5.0;
pub const ORBIT_REHIT_WINDOW_MS: u64 = 1000;
pub const SWING_REHIT_WINDOW_MS: u64 = 500;
pub const THROWN_REHIT_WINDOW_MS: u64 = 150;

pub const KNIFE_DAMAGE: f32 = 10.0;
pub const KNIFE_FIRE_RATE_MS: u32 = 500;
pub const KNIFE_SPEED: f32 = 500.0;
pub const KNIFE_PIERCE: u32 = 1;
pub const KNIFE_FAN_STEP_RADS: f32 = std::f32::consts::PI / 20.0;
pub const KNIFE_VOLLEY_DELAY_SECS: f32 = 0.1;
pub const KNIFE_MIN_FIRE_RATE_MS: u32 = 150;

pub const AXE_DAMAGE: f32 = 5.0;
pub const AXE_KNOCKBACK: f32 = 0.0;
pub const AXE_ORBIT_RADIUS: f32 = 120.0;
pub const AXE_ROTATION_SPEED: f32 = 0.9;
pub const AXE_MAX_BLADES: usize = 3;

pub const BOW_DAMAGE: f32 = 80.0;
pub const BOW_FIRE_RATE_MS: u32 = 1500;
pub const BOW_RANGE: f32 = 600.0;
pub const BOW_PIERCE: u32 = 3;
pub const BOW_ARROW_SPEED: f32 = 600.0;
pub const BOW_ROTATION_SPEED: f32 = 5.0;
pub const BOW_JITTER_RADS: f32 = 0.05;
pub const BOW_MIN_FIRE_RATE_MS: u32 = 300;

pub const HATCHET_DAMAGE: f32 = 8.0;
pub const HATCHET_FIRE_RATE_MS: u32 = 2500;
pub const HATCHET_SPEED: f32 = 500.0;
pub const HATCHET_KNOCKBACK: f32 = 5.0;
pub const HATCHET_SPIN: f32 = 6.0;
pub const HATCHET_MIN_FIRE_RATE_MS: u32 = 200;

pub const SICKLE_DAMAGE: f32 = 18.0;
pub const SICKLE_FIRE_RATE_MS: u32 = 2000;
pub const SICKLE_KNOCKBACK: f32 = 15.0;
pub const SICKLE_SWING_RADIUS: f32 = 80.0;
pub const SICKLE_WINDUP_SECS: f32 = 0.3;
pub const SICKLE_SWEEP_SECS: f32 = 0.2;
pub const SICKLE_RETRACT_SECS: f32 = 0.1;
pub const SICKLE_WINDUP_RADS: f32 = 0.4;
pub const SICKLE_FOLLOW_THROUGH_RADS: f32 = 0.7;
pub const SICKLE_MIN_FIRE_RATE_MS: u32 = 500;

pub const SHIELD_DAMAGE: f32 = 15.0;
pub const SHIELD_FIRE_RATE_MS: u32 = 2500;
pub const SHIELD_SPEED: f32 = 150.0;
pub const SHIELD_KNOCKBACK: f32 = 45.0;
pub const SHIELD_PIERCE: u32 = 10;
pub const SHIELD_GRAVITY: f32 = -800.0;
pub const SHIELD_BOUNCE_IMPULSE: f32 = 300.0;
pub const SHIELD_MIN_FIRE_RATE_MS: u32 = 200;

pub const FLAMETHROWER_DAMAGE: f32 = 6.0;
pub const FLAMETHROWER_FIRE_RATE_MS: u32 = 3000;
pub const FLAMETHROWER_RANGE: f32 = 150.0;
pub const FLAMETHROWER_KNOCKBACK: f32 = 5.0;
pub const FLAMETHROWER_BURN_DURATION_MS: u32 = 2000;
pub const FLAMETHROWER_BURN_TICK_MS: u32 = 500;
pub const FLAMETHROWER_MIN_FIRE_RATE_MS: u32 = 100;

// Weapon upgrade increments
pub const KNIFE_DAMAGE_UPGRADE: f32 = 1.0;
pub const KNIFE_FIRE_RATE_UPGRADE_MS: u32 = 50;
pub const AXE_DAMAGE_UPGRADE: f32 = 1.0;
pub const BOW_DAMAGE_UPGRADE: f32 = 8.0;
pub const BOW_FIRE_RATE_UPGRADE_MS: u32 = 100;
pub const HATCHET_DAMAGE_UPGRADE: f32 = 2.0;
pub const HATCHET_FIRE_RATE_UPGRADE_MS: u32 = 150;
pub const SICKLE_DAMAGE_UPGRADE: f32 = 3.0;
pub const SICKLE_KNOCKBACK_UPGRADE: f32 = 5.0;
pub const SICKLE_FIRE_RATE_UPGRADE_MS: u32 = 100;
pub const SHIELD_DAMAGE_UPGRADE: f32 = 2.0;
pub const SHIELD_FIRE_RATE_UPGRADE_MS: u32 = 150;
pub const FLAMETHROWER_DAMAGE_UPGRADE: f32 = 1.0;
pub const FLAMETHROWER_RANGE_UPGRADE: f32 = 25.0;
pub const FLAMETHROWER_FIRE_RATE_UPGRADE_MS: u32 = 5;
pub const FLAMETHROWER_BURN_UPGRADE_MS: u32 = 500;

// ============ UI Constants ============

pub const UI_MARGIN: f32 = 10.0;
pub const UI_FONT_SIZE_LARGE: f32 = 40.0;
pub const UI_FONT_SIZE_MEDIUM: f32 = 24.0;
pub const UI_FONT_SIZE_NORMAL: f32 = 20.0;
pub const UI_FONT_SIZE_SMALL: f32 = 16.0;

pub const XP_BAR_WIDTH: f32 = 300.0;
pub const XP_BAR_HEIGHT: f32 = 20.0;

pub const UPGRADE_OVERLAY_ALPHA: f32 = 0.8;
pub const UPGRADE_BUTTON_WIDTH: f32 = 400.0;
pub const UPGRADE_BUTTON_HEIGHT: f32 = 80.0;
pub const UPGRADE_BUTTON_PADDING: f32 = 10.0;
pub const UPGRADE_BUTTON_GAP: f32 = 20.0;
pub const UPGRADE_TITLE_MARGIN: f32 = 30.0;

pub const DAMAGE_TEXT_RISE: f32 = 20.0;
pub const DAMAGE_TEXT_SECS: f32 = 1.0;
