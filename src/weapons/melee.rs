use bevy::prelude::*;
use std::time::Duration;

use crate::constants::*;
use crate::physics::Collider;
use crate::projectiles::{HitTracker, Projectile};

use super::Weapon;

#[derive(Component)]
pub struct SickleSpec {
	pub swing_timer: Timer,
}

impl Default for SickleSpec {
	fn default() -> Self {
		Self {
			swing_timer: Timer::from_seconds(SICKLE_FIRE_RATE_MS as f32 / 1000.0, TimerMode::Repeating),
		}
	}
}

enum SwingPhase {
	Windup,
	Sweep,
	Retract,
}

/// A sickle arc mid-swing. The blade sweeps through three timed phases:
/// a short pull back, the main sweep across the front, and a follow-through
/// before it despawns.
#[derive(Component)]
pub struct Swing {
	weapon: Entity,
	phase: SwingPhase,
	phase_timer: Timer,
	start_rotation: f32,
	rotation: f32,
	flip: f32,
}

pub fn start_swings(
	mut commands: Commands,
	mut sickle_query: Query<(Entity, &Weapon, &mut SickleSpec)>,
	player_query: Query<(&Transform, &crate::player::Player)>,
	time: Res<Time<Virtual>>,
) {
	let Ok((player_transform, player)) = player_query.get_single() else {
		return;
	};

	for (weapon_entity, weapon, mut spec) in sickle_query.iter_mut() {
		if !spec.swing_timer.tick(time.delta()).just_finished() {
			continue;
		}

		let flip = if player.last_direction.x < 0.0 { -1.0 } else { 1.0 };
		let start_rotation = if flip < 0.0 { std::f32::consts::PI } else { 0.0 };
		let origin = player_transform.translation.truncate();

		commands.spawn((
			Sprite {
				color: Color::srgb(0.85, 0.9, 0.95),
				custom_size: Some(Vec2::new(SICKLE_SWING_RADIUS, 14.0)),
				..default()
			},
			Transform::from_xyz(origin.x, origin.y, 1.0),
			Collider {
				radius: SICKLE_SWING_RADIUS / 2.0,
			},
			Projectile {
				damage: weapon.damage,
				pierce_remaining: None,
				knockback: weapon.knockback,
				owner: weapon_entity,
			},
			HitTracker::with_rehit_window(Duration::from_millis(SWING_REHIT_WINDOW_MS)),
			Swing {
				weapon: weapon_entity,
				phase: SwingPhase::Windup,
				phase_timer: Timer::from_seconds(SICKLE_WINDUP_SECS, TimerMode::Once),
				start_rotation,
				rotation: start_rotation,
				flip,
			},
		));
	}
}

pub fn update_swings(
	mut commands: Commands,
	mut swing_query: Query<(Entity, &mut Swing, &mut Transform)>,
	weapon_query: Query<&Weapon>,
	player_query: Query<&Transform, (With<crate::player::Player>, Without<Swing>)>,
	time: Res<Time<Virtual>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let center = player_transform.translation.truncate();

	for (entity, mut swing, mut transform) in swing_query.iter_mut() {
		// Orphaned swings outlive a despawned weapon by at most one phase.
		if weapon_query.get(swing.weapon).is_err() {
			commands.entity(entity).despawn();
			continue;
		}

		swing.phase_timer.tick(time.delta());
		let progress = swing.phase_timer.fraction();
		let start = swing.start_rotation;
		let flip = swing.flip;

		swing.rotation = match swing.phase {
			SwingPhase::Windup => {
				lerp_angle(start, start - SICKLE_WINDUP_RADS * flip, progress)
			}
			SwingPhase::Sweep => lerp_angle(
				start - SICKLE_WINDUP_RADS * flip,
				start + (std::f32::consts::PI + SICKLE_WINDUP_RADS) * flip,
				progress,
			),
			SwingPhase::Retract => lerp_angle(
				start + (std::f32::consts::PI + SICKLE_WINDUP_RADS) * flip,
				start + (std::f32::consts::PI + SICKLE_FOLLOW_THROUGH_RADS) * flip,
				progress,
			),
		};

		if swing.phase_timer.just_finished() {
			match swing.phase {
				SwingPhase::Windup => {
					swing.phase = SwingPhase::Sweep;
					swing.phase_timer = Timer::from_seconds(SICKLE_SWEEP_SECS, TimerMode::Once);
				}
				SwingPhase::Sweep => {
					swing.phase = SwingPhase::Retract;
					swing.phase_timer = Timer::from_seconds(SICKLE_RETRACT_SECS, TimerMode::Once);
				}
				SwingPhase::Retract => {
					commands.entity(entity).despawn();
					continue;
				}
			}
		}

		// The blade hangs off the handle end, a quarter turn behind the arm.
		let blade_angle = swing.rotation - std::f32::consts::FRAC_PI_2;
		transform.translation.x = center.x + blade_angle.cos() * SICKLE_SWING_RADIUS;
		transform.translation.y = center.y + blade_angle.sin() * SICKLE_SWING_RADIUS;
		transform.rotation = Quat::from_rotation_z(swing.rotation);
	}
}

fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
	from + (to - from) * t
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lerp_angle_endpoints() {
		assert_eq!(lerp_angle(0.0, 2.0, 0.0), 0.0);
		assert_eq!(lerp_angle(0.0, 2.0, 1.0), 2.0);
		assert_eq!(lerp_angle(1.0, 3.0, 0.5), 2.0);
	}
}
