use bevy::prelude::*;
use rand::Rng;

use crate::combat::Health;
use crate::constants::*;

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
	fn build(&self, app: &mut App) {
		app.add_systems(
			Update,
			(chase_player, recover_from_stagger, update_hit_flash)
				.in_set(crate::physics::MovementSet),
		)
		.add_systems(
			Update,
			handle_enemy_deaths
				.in_set(crate::physics::CombatSet)
				.after(crate::combat::apply_enemy_damage),
		)
		.add_systems(Update, purge_dying.in_set(crate::physics::CleanupSet));
	}
}

/// Enemy kinds are data: one component parameterized by kind, with per-kind
/// stats below, rather than a type per kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyKind {
	Basic,
	Fast,
	Strong,
	Huge,
	Boss,
}

pub struct EnemyStats {
	pub health: f32,
	pub speed: f32,
	pub damage: f32,
	pub xp: u32,
	pub xp_drop_chance: f64,
	pub scale: f32,
	pub color: Color,
}

impl EnemyKind {
	pub fn stats(&self) -> EnemyStats {
		match self {
			Self::Basic => EnemyStats {
				health: 20.0,
				speed: 100.0,
				damage: 5.0,
				xp: 3,
				xp_drop_chance: 0.7,
				scale: 1.0,
				color: Color::srgb(0.8, 0.8, 0.8),
			},
			Self::Fast => EnemyStats {
				health: 15.0,
				speed: 130.0,
				damage: 5.0,
				xp: 5,
				xp_drop_chance: 0.7,
				scale: 1.0,
				color: Color::srgb(0.0, 1.0, 0.0),
			},
			Self::Strong => EnemyStats {
				health: 400.0,
				speed: 20.0,
				damage: 5.0,
				xp: 10,
				xp_drop_chance: 1.0,
				scale: 1.5,
				color: Color::srgb(1.0, 0.65, 0.0),
			},
			Self::Huge => EnemyStats {
				health: 750.0,
				speed: 50.0,
				damage: 10.0,
				xp: 250,
				xp_drop_chance: 0.7,
				scale: 3.0,
				color: Color::srgb(1.0, 0.0, 0.0),
			},
			Self::Boss => EnemyStats {
				health: 4000.0,
				speed: 80.0,
				damage: 50.0,
				xp: 1000,
				xp_drop_chance: 1.0,
				scale: 12.0,
				color: Color::srgb(1.0, 0.3, 0.1),
			},
		}
	}
}

#[derive(Component)]
pub struct Enemy {
	pub kind: EnemyKind,
	pub speed: f32,
	pub base_speed: f32,
	pub damage: f32,
	pub xp: u32,
	pub xp_drop_chance: f64,
}

/// Health reached zero; death effects have fired and the entity despawns
/// when the timer completes. Its presence guards death against re-entry.
#[derive(Component)]
pub struct Dying {
	pub timer: Timer,
}

/// Temporary speed reduction after taking damage; recovers toward base speed
/// over the timer's duration.
#[derive(Component)]
pub struct Stagger {
	pub timer: Timer,
}

impl Stagger {
	pub fn new() -> Self {
		Self {
			timer: Timer::from_seconds(STAGGER_RECOVERY_SECS, TimerMode::Once),
		}
	}
}

/// Brief red tint after taking damage; purely visual feedback.
#[derive(Component)]
pub struct HitFlash {
	pub timer: Timer,
	pub base_color: Color,
}

pub fn spawn_enemy(commands: &mut Commands, kind: EnemyKind, position: Vec2) -> Entity {
	let stats = kind.stats();

	commands
		.spawn((
			Sprite {
				color: stats.color,
				custom_size: Some(Vec2::new(16.0, 16.0)),
				..default()
			},
			Transform::from_xyz(position.x, position.y, 0.0)
				.with_scale(Vec3::splat(stats.scale)),
			Enemy {
				kind,
				speed: stats.speed,
				base_speed: stats.speed,
				damage: stats.damage,
				xp: stats.xp,
				xp_drop_chance: stats.xp_drop_chance,
			},
			Health::new(stats.health),
			crate::physics::Velocity::default(),
			// Base radius; overlap checks scale it by the transform.
			crate::physics::Collider { radius: 10.0 },
		))
		.id()
}

fn chase_player(
	mut enemy_query: Query<
		(&Transform, &mut crate::physics::Velocity, &Enemy),
		(Without<Dying>, Without<crate::physics::Knockback>),
	>,
	player_query: Query<&Transform, (With<crate::player::Player>, Without<Enemy>)>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};

	for (enemy_transform, mut velocity, enemy) in enemy_query.iter_mut() {
		let direction = (player_transform.translation.truncate()
			- enemy_transform.translation.truncate())
		.normalize_or_zero();
		velocity.x = direction.x * enemy.speed;
		velocity.y = direction.y * enemy.speed;
	}
}

fn recover_from_stagger(
	mut commands: Commands,
	mut query: Query<(Entity, &mut Enemy, &mut Stagger)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut enemy, mut stagger) in query.iter_mut() {
		stagger.timer.tick(time.delta());

		let progress = stagger.timer.fraction();
		enemy.speed = STAGGER_SPEED + (enemy.base_speed - STAGGER_SPEED) * progress;

		if stagger.timer.finished() {
			enemy.speed = enemy.base_speed;
			commands.entity(entity).remove::<Stagger>();
		}
	}
}

fn update_hit_flash(
	mut commands: Commands,
	mut query: Query<(Entity, &mut Sprite, &mut HitFlash)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut sprite, mut flash) in query.iter_mut() {
		sprite.color = Color::srgb(1.0, 0.0, 0.0);
		if flash.timer.tick(time.delta()).just_finished() {
			sprite.color = flash.base_color;
			commands.entity(entity).remove::<HitFlash>();
		}
	}
}

/// Transitions enemies whose health reached zero into their death sequence
/// exactly once: drops, kill counter, then a short animation before removal.
fn handle_enemy_deaths(
	mut commands: Commands,
	mut enemy_query: Query<
		(Entity, &Transform, &Enemy, &Health, &mut crate::physics::Velocity),
		Without<Dying>,
	>,
	mut player_query: Query<&mut crate::player::Player>,
	mut rng: ResMut<crate::rng::GameRng>,
) {
	for (entity, transform, enemy, health, mut velocity) in enemy_query.iter_mut() {
		if !health.is_dead() {
			continue;
		}

		velocity.x = 0.0;
		velocity.y = 0.0;
		commands
			.entity(entity)
			.remove::<crate::physics::Collider>()
			.insert(Dying {
				timer: Timer::from_seconds(DEATH_ANIMATION_SECS, TimerMode::Once),
			});

		let position = transform.translation.truncate();
		if rng.0.gen_bool(enemy.xp_drop_chance) {
			crate::pickups::spawn_experience_orb(&mut commands, position, enemy.xp);
		} else if rng.0.gen_bool(HEALTH_POTION_DROP_CHANCE) {
			crate::pickups::spawn_health_potion(&mut commands, position, HEALTH_POTION_VALUE);
		}

		if let Ok(mut player) = player_query.get_single_mut() {
			player.kill_count += 1;
		}
	}
}

fn purge_dying(
	mut commands: Commands,
	mut query: Query<(Entity, &mut Dying, &mut Transform)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut dying, mut transform) in query.iter_mut() {
		dying.timer.tick(time.delta());
		transform.scale *= 1.0 - time.delta_secs() * 4.0;

		if dying.timer.finished() {
			commands.entity(entity).despawn();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_kind_stats_match_catalog() {
		assert_eq!(EnemyKind::Basic.stats().health, 20.0);
		assert_eq!(EnemyKind::Fast.stats().speed, 130.0);
		assert_eq!(EnemyKind::Strong.stats().xp_drop_chance, 1.0);
		assert_eq!(EnemyKind::Huge.stats().xp, 250);
		assert_eq!(EnemyKind::Boss.stats().health, 4000.0);
	}

	#[test]
	fn test_stagger_starts_at_floor() {
		let stagger = Stagger::new();
		assert_eq!(stagger.timer.fraction(), 0.0);
	}
}
