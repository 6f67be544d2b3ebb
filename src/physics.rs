use bevy::prelude::*;

pub struct PhysicsPlugin;

/// Frame ordering: all movement resolves before collision/damage, which
/// resolves before dead entities are purged, so overlap checks always see a
/// consistent snapshot of positions and health.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovementSet;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombatSet;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CleanupSet;

impl Plugin for PhysicsPlugin {
	fn build(&self, app: &mut App) {
		app.configure_sets(
			Update,
			(MovementSet, CombatSet, CleanupSet)
				.chain()
				.run_if(in_state(crate::RunState::Running)),
		)
		.add_systems(
			Update,
			(apply_velocity, apply_knockback).in_set(MovementSet),
		);
	}
}

#[derive(Component, Default)]
pub struct Velocity {
	pub x: f32,
	pub y: f32,
}

impl Velocity {
	pub fn from_vec(v: Vec2) -> Self {
		Self { x: v.x, y: v.y }
	}
}

/// Circle collider; all overlap detection in the game is circle-vs-circle.
#[derive(Component)]
pub struct Collider {
	pub radius: f32,
}

/// Forced displacement away from a damage origin. While present the entity's
/// normal steering is suspended ("direct control").
#[derive(Component)]
pub struct Knockback {
	pub direction: Vec2,
	pub strength: f32,
	pub timer: Timer,
}

impl Knockback {
	pub fn new(direction: Vec2, strength: f32) -> Self {
		Self {
			direction,
			strength,
			timer: Timer::from_seconds(crate::constants::KNOCKBACK_SECS, TimerMode::Once),
		}
	}
}

fn apply_velocity(mut query: Query<(&mut Transform, &Velocity)>, time: Res<Time<Virtual>>) {
	for (mut transform, velocity) in query.iter_mut() {
		transform.translation.x += velocity.x * time.delta_secs();
		transform.translation.y += velocity.y * time.delta_secs();
	}
}

fn apply_knockback(
	mut commands: Commands,
	mut query: Query<(Entity, &mut Transform, &mut Knockback)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut transform, mut knockback) in query.iter_mut() {
		knockback.timer.tick(time.delta());

		let speed = knockback.strength / crate::constants::KNOCKBACK_SECS;
		transform.translation.x += knockback.direction.x * speed * time.delta_secs();
		transform.translation.y += knockback.direction.y * speed * time.delta_secs();

		if knockback.timer.finished() {
			commands.entity(entity).remove::<Knockback>();
		}
	}
}

pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
	a.distance_squared(b) < (radius_a + radius_b) * (radius_a + radius_b)
}

/// Rotate `current` toward `target` by at most `max_delta` radians, taking
/// the short way around the circle.
pub fn rotate_toward(current: f32, target: f32, max_delta: f32) -> f32 {
	use std::f32::consts::{PI, TAU};

	let mut diff = (target - current) % TAU;
	if diff > PI {
		diff -= TAU;
	} else if diff < -PI {
		diff += TAU;
	}

	if diff.abs() <= max_delta {
		target
	} else {
		current + diff.signum() * max_delta
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f32::consts::PI;

	#[test]
	fn test_circles_overlap() {
		assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0));
		assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(25.0, 0.0), 10.0));
		// Touching circles do not count as overlapping
		assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
	}

	#[test]
	fn test_rotate_toward_reaches_target() {
		assert_eq!(rotate_toward(0.0, 0.1, 0.5), 0.1);
	}

	#[test]
	fn test_rotate_toward_is_capped() {
		let result = rotate_toward(0.0, 1.0, 0.25);
		assert!((result - 0.25).abs() < 1e-6);
	}

	#[test]
	fn test_rotate_toward_takes_short_way() {
		// From just above -pi to just below pi should go negative, through pi.
		let result = rotate_toward(-PI + 0.1, PI - 0.1, 0.05);
		assert!(result < -PI + 0.1);
	}
}
