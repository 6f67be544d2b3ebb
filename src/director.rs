use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::Rng;

use crate::constants::*;
use crate::enemy::{spawn_enemy, Dying, Enemy, EnemyKind};
use crate::rng::GameRng;

pub struct DirectorPlugin;

impl Plugin for DirectorPlugin {
	fn build(&self, app: &mut App) {
		app
			.init_resource::<Director>()
			.add_systems(
				Update,
				(run_director, collect_stragglers)
					.in_set(crate::physics::MovementSet)
					.run_if(in_state(crate::RunState::Running)),
			);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
	One,
	Two,
	Three,
}

/// Drives the spawn cadence for a run. The timer is one-shot and re-armed
/// after every expiry, including expiries where the enemy cap suppressed the
/// spawn, so the cadence never stalls.
#[derive(Resource)]
pub struct Director {
	pub elapsed_secs: f32,
	pub spawn_timer: Timer,
	pub swarm_announced: bool,
	pub boss_announced: bool,
}

impl Default for Director {
	fn default() -> Self {
		Self {
			elapsed_secs: 0.0,
			spawn_timer: Timer::from_seconds(
				BASE_SPAWN_INTERVAL_MS as f32 / 1000.0,
				TimerMode::Once,
			),
			swarm_announced: false,
			boss_announced: false,
		}
	}
}

impl Director {
	/// A fresh director whose first tick already runs at the configured base
	/// interval, so a non-default config applies from the very first spawn.
	pub fn from_config(config: &crate::config::GameConfigData) -> Self {
		Self {
			spawn_timer: Timer::from_seconds(
				config.base_spawn_interval_ms as f32 / 1000.0,
				TimerMode::Once,
			),
			..Self::default()
		}
	}
}

/// What one expiry of the spawn timer puts on the field.
#[derive(Debug, PartialEq, Eq)]
pub enum SpawnOrder {
	Batch { kind: EnemyKind, count: usize },
	Single(EnemyKind),
}

pub fn stage_for(elapsed_secs: f32, stage_two_at: f32, stage_three_at: f32) -> Stage {
	if elapsed_secs >= stage_three_at {
		Stage::Three
	} else if elapsed_secs >= stage_two_at {
		Stage::Two
	} else {
		Stage::One
	}
}

pub fn spawn_interval_ms(base_ms: u32, level_factor_ms: u32, min_ms: u32, level: u32) -> u32 {
	base_ms.saturating_sub(level.saturating_mul(level_factor_ms)).max(min_ms)
}

/// Maps a composition roll in [0, 100) to a spawn order. Huge and fast-swarm
/// outcomes are narrow slices so most expiries produce a plain basic batch;
/// stage 1 only ever produces basic batches.
pub fn compose(roll: f32, stage: Stage, batch_size: usize) -> SpawnOrder {
	if roll >= 98.0 && stage >= Stage::Two {
		SpawnOrder::Batch {
			kind: EnemyKind::Fast,
			count: FAST_SWARM_COUNT,
		}
	} else if roll >= 80.0 && stage >= Stage::Two {
		SpawnOrder::Single(EnemyKind::Strong)
	} else if roll >= 77.0 && stage >= Stage::Two {
		SpawnOrder::Single(EnemyKind::Huge)
	} else {
		SpawnOrder::Batch {
			kind: EnemyKind::Basic,
			count: batch_size,
		}
	}
}

fn run_director(
	mut commands: Commands,
	mut director: ResMut<Director>,
	mut rng: ResMut<GameRng>,
	config: Res<crate::config::GameConfig>,
	progress: Res<crate::progression::Progress>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	enemy_query: Query<(), With<Enemy>>,
	window_query: Query<&Window, With<PrimaryWindow>>,
	time: Res<Time<Virtual>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();
	let spawn_radius = spawn_ring_radius(window_query.get_single().ok());

	director.elapsed_secs += time.delta_secs();
	let stage = stage_for(
		director.elapsed_secs,
		config.0.stage_two_at_secs,
		config.0.stage_three_at_secs,
	);

	// One-shot stage escalations, independent of the regular cadence.
	if stage >= Stage::Two && !director.swarm_announced {
		director.swarm_announced = true;
		info!("stage two: fast swarm inbound");
		spawn_ring_batch(
			&mut commands,
			&mut rng,
			EnemyKind::Fast,
			FAST_SWARM_COUNT,
			origin,
			spawn_radius,
		);
	}
	if stage >= Stage::Three && !director.boss_announced {
		director.boss_announced = true;
		info!("stage three: boss inbound");
		let angle = rng.0.gen_range(0.0..std::f32::consts::TAU);
		spawn_enemy(
			&mut commands,
			EnemyKind::Boss,
			origin + Vec2::new(angle.cos(), angle.sin()) * spawn_radius,
		);
	}

	if !director.spawn_timer.tick(time.delta()).just_finished() {
		return;
	}

	let interval_ms = spawn_interval_ms(
		config.0.base_spawn_interval_ms,
		config.0.spawn_interval_level_factor_ms,
		config.0.min_spawn_interval_ms,
		progress.level,
	);
	director.spawn_timer = Timer::from_seconds(interval_ms as f32 / 1000.0, TimerMode::Once);

	// At the cap the expiry is spent without spawning; the re-armed timer
	// above keeps the cadence going.
	if enemy_query.iter().count() >= config.0.max_enemies {
		return;
	}

	let batch_max = match stage {
		Stage::Three => STAGE_THREE_BATCH_MAX,
		_ => BASIC_BATCH_MAX,
	};
	let roll = rng.roll_percent();
	let batch_size = rng.0.gen_range(1..=batch_max) as usize;

	match compose(roll, stage, batch_size) {
		SpawnOrder::Single(kind) => {
			let angle = rng.0.gen_range(0.0..std::f32::consts::TAU);
			spawn_enemy(
				&mut commands,
				kind,
				origin + Vec2::new(angle.cos(), angle.sin()) * spawn_radius,
			);
		}
		SpawnOrder::Batch { kind, count } => {
			spawn_ring_batch(&mut commands, &mut rng, kind, count, origin, spawn_radius);
		}
	}
}

fn spawn_ring_radius(window: Option<&Window>) -> f32 {
	match window {
		Some(window) => {
			let half = Vec2::new(window.width(), window.height()) / 2.0;
			half.length() + SPAWN_RING_MARGIN
		}
		None => SPAWN_RING_FALLBACK_RADIUS,
	}
}

fn spawn_ring_batch(
	commands: &mut Commands,
	rng: &mut GameRng,
	kind: EnemyKind,
	count: usize,
	origin: Vec2,
	radius: f32,
) {
	let angle = rng.0.gen_range(0.0..std::f32::consts::TAU);
	let center = origin + Vec2::new(angle.cos(), angle.sin()) * radius;

	for _ in 0..count {
		let jitter = Vec2::new(
			rng.0.gen_range(-BATCH_POSITION_JITTER..=BATCH_POSITION_JITTER),
			rng.0.gen_range(-BATCH_POSITION_JITTER..=BATCH_POSITION_JITTER),
		);
		spawn_enemy(commands, kind, center + jitter);
	}
}

/// Strong enemies crawl, so once the player outranges one it will never
/// catch up. Reap them well past the viewport instead of tracking forever.
fn collect_stragglers(
	mut commands: Commands,
	enemy_query: Query<(Entity, &Transform, &Enemy), Without<Dying>>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	window_query: Query<&Window, With<PrimaryWindow>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();
	let viewport_width = window_query
		.get_single()
		.map(|window| window.width())
		.unwrap_or(SPAWN_RING_FALLBACK_RADIUS);
	let reap_distance = viewport_width + STRAGGLER_GC_MARGIN;

	for (entity, transform, enemy) in enemy_query.iter() {
		if enemy.kind != EnemyKind::Strong {
			continue;
		}
		if origin.distance(transform.translation.truncate()) > reap_distance {
			commands.entity(entity).despawn();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stages_advance_at_thresholds() {
		assert_eq!(stage_for(0.0, 60.0, 300.0), Stage::One);
		assert_eq!(stage_for(59.9, 60.0, 300.0), Stage::One);
		assert_eq!(stage_for(60.0, 60.0, 300.0), Stage::Two);
		assert_eq!(stage_for(299.9, 60.0, 300.0), Stage::Two);
		assert_eq!(stage_for(300.0, 60.0, 300.0), Stage::Three);
	}

	#[test]
	fn spawn_interval_shrinks_with_level_and_clamps() {
		assert_eq!(spawn_interval_ms(1000, 10, 150, 0), 1000);
		assert_eq!(spawn_interval_ms(1000, 10, 150, 5), 950);
		assert_eq!(spawn_interval_ms(1000, 10, 150, 85), 150);
		assert_eq!(spawn_interval_ms(1000, 10, 150, 1000), 150);
	}

	#[test]
	fn first_tick_uses_configured_base_interval() {
		let director = Director::from_config(&crate::config::GameConfigData {
			rng_seed: 1,
			starting_weapon: crate::weapons::WeaponId::Knife,
			base_spawn_interval_ms: 2500,
			spawn_interval_level_factor_ms: 10,
			min_spawn_interval_ms: 150,
			max_enemies: 450,
			stage_two_at_secs: 60.0,
			stage_three_at_secs: 300.0,
		});
		assert_eq!(director.spawn_timer.duration().as_millis(), 2500);
	}

	#[test]
	fn composition_bands() {
		assert_eq!(
			compose(0.0, Stage::One, 4),
			SpawnOrder::Batch {
				kind: EnemyKind::Basic,
				count: 4
			}
		);
		assert_eq!(
			compose(76.9, Stage::Three, 8),
			SpawnOrder::Batch {
				kind: EnemyKind::Basic,
				count: 8
			}
		);
		assert_eq!(compose(77.0, Stage::Two, 4), SpawnOrder::Single(EnemyKind::Huge));
		assert_eq!(compose(80.0, Stage::Two, 4), SpawnOrder::Single(EnemyKind::Strong));
		assert_eq!(compose(97.9, Stage::Three, 4), SpawnOrder::Single(EnemyKind::Strong));
		assert_eq!(
			compose(98.0, Stage::Two, 4),
			SpawnOrder::Batch {
				kind: EnemyKind::Fast,
				count: FAST_SWARM_COUNT
			}
		);
	}

	// At the population cap an expired tick must spawn nothing yet still
	// re-arm the spawn timer at the next interval.
	#[test]
	fn cap_skips_spawn_but_rearms_timer() {
		use std::time::Duration;

		let mut app = App::new();
		app.init_resource::<Time<Virtual>>();
		app.insert_resource(crate::config::GameConfig(crate::config::GameConfigData {
			rng_seed: 1,
			starting_weapon: crate::weapons::WeaponId::Knife,
			base_spawn_interval_ms: 1000,
			spawn_interval_level_factor_ms: 10,
			min_spawn_interval_ms: 150,
			max_enemies: 20,
			stage_two_at_secs: 60.0,
			stage_three_at_secs: 300.0,
		}));
		app.insert_resource(crate::progression::Progress::default());
		app.insert_resource(GameRng::from_seed(1));
		app.insert_resource(Director {
			spawn_timer: Timer::from_seconds(0.05, TimerMode::Once),
			..Default::default()
		});
		app.add_systems(Update, run_director);

		app.world_mut()
			.spawn((Transform::default(), crate::player::Player::default()));
		for _ in 0..20 {
			let stats = EnemyKind::Basic.stats();
			app.world_mut().spawn(Enemy {
				kind: EnemyKind::Basic,
				speed: stats.speed,
				base_speed: stats.speed,
				damage: stats.damage,
				xp: stats.xp,
				xp_drop_chance: stats.xp_drop_chance,
			});
		}

		app.world_mut()
			.resource_mut::<Time<Virtual>>()
			.advance_by(Duration::from_millis(100));
		app.update();

		let count = app
			.world_mut()
			.query::<&Enemy>()
			.iter(app.world())
			.count();
		assert_eq!(count, 20);

		let director = app.world().resource::<Director>();
		// Level 1 interval: 1000 - 1 * 10 = 990 ms.
		assert_eq!(director.spawn_timer.duration().as_millis(), 990);
		assert!(!director.spawn_timer.finished());
	}

	#[test]
	fn stage_one_only_produces_basic_batches() {
		for roll in [85.0, 98.5, 99.9] {
			assert_eq!(
				compose(roll, Stage::One, 4),
				SpawnOrder::Batch {
					kind: EnemyKind::Basic,
					count: 4
				}
			);
		}
	}
}
