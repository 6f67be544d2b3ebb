use bevy::prelude::*;
use std::time::Duration;

use crate::constants::*;
use crate::physics::{Collider, Velocity};
use crate::projectiles::{ArcBounce, Deceleration, HitTracker, Lifespan, Projectile, Spin};

use super::{Weapon, WeaponFired};

#[derive(Component)]
pub struct KnifeSpec {
	pub count: u32,
	pub speed: f32,
	pub pierce: u32,
}

impl Default for KnifeSpec {
	fn default() -> Self {
		Self {
			count: 1,
			speed: KNIFE_SPEED,
			pierce: KNIFE_PIERCE,
		}
	}
}

/// A duplicate knife volley queued behind the main one.
#[derive(Component)]
pub struct PendingVolley {
	pub timer: Timer,
	pub base_angle: f32,
}

#[derive(Component)]
pub struct HatchetSpec {
	pub speed: f32,
}

impl Default for HatchetSpec {
	fn default() -> Self {
		Self {
			speed: HATCHET_SPEED,
		}
	}
}

#[derive(Component)]
pub struct ShieldSpec {
	pub speed: f32,
	pub pierce: u32,
}

impl Default for ShieldSpec {
	fn default() -> Self {
		Self {
			speed: SHIELD_SPEED,
			pierce: SHIELD_PIERCE,
		}
	}
}

pub fn fire_knives(
	mut commands: Commands,
	mut fired: EventReader<WeaponFired>,
	weapon_query: Query<(&Weapon, &KnifeSpec)>,
	player_query: Query<(&Transform, &crate::player::Player)>,
) {
	let Ok((player_transform, player)) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for event in fired.read() {
		let Ok((weapon, spec)) = weapon_query.get(event.weapon) else {
			continue;
		};

		let aim = player.last_direction.normalize_or_zero();
		let base_angle =
			aim.y.atan2(aim.x) - (spec.count.saturating_sub(1)) as f32 * KNIFE_FAN_STEP_RADS / 2.0;

		spawn_knife_fan(&mut commands, event.weapon, weapon, spec, origin, base_angle);

		commands.entity(event.weapon).insert(PendingVolley {
			timer: Timer::from_seconds(KNIFE_VOLLEY_DELAY_SECS, TimerMode::Once),
			base_angle,
		});
	}
}

pub fn fire_pending_volleys(
	mut commands: Commands,
	mut volley_query: Query<(Entity, &Weapon, &KnifeSpec, &mut PendingVolley)>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	time: Res<Time<Virtual>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for (weapon_entity, weapon, spec, mut volley) in volley_query.iter_mut() {
		if !volley.timer.tick(time.delta()).just_finished() {
			continue;
		}

		let base_angle = volley.base_angle;
		spawn_knife_fan(&mut commands, weapon_entity, weapon, spec, origin, base_angle);
		commands.entity(weapon_entity).remove::<PendingVolley>();
	}
}

fn spawn_knife_fan(
	commands: &mut Commands,
	weapon_entity: Entity,
	weapon: &Weapon,
	spec: &KnifeSpec,
	origin: Vec2,
	base_angle: f32,
) {
	for i in 0..spec.count {
		let angle = base_angle + i as f32 * KNIFE_FAN_STEP_RADS;
		let direction = Vec2::new(angle.cos(), angle.sin());

		commands.spawn((
			Sprite {
				color: Color::srgb(0.8, 0.8, 0.9),
				custom_size: Some(Vec2::new(12.0, 4.0)),
				..default()
			},
			Transform::from_xyz(origin.x, origin.y, 1.0)
				.with_rotation(Quat::from_rotation_z(angle)),
			Velocity::from_vec(direction * spec.speed),
			Collider { radius: 5.0 },
			Projectile {
				damage: weapon.damage,
				pierce_remaining: Some(spec.pierce),
				knockback: weapon.knockback,
				owner: weapon_entity,
			},
			HitTracker::once_per_enemy(),
			Lifespan::new(PROJECTILE_LIFESPAN_SECS),
		));
	}
}

pub fn fire_hatchets(
	mut commands: Commands,
	mut fired: EventReader<WeaponFired>,
	weapon_query: Query<(&Weapon, &HatchetSpec)>,
	player_query: Query<(&Transform, &crate::player::Player)>,
) {
	let Ok((player_transform, player)) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for event in fired.read() {
		let Ok((weapon, spec)) = weapon_query.get(event.weapon) else {
			continue;
		};

		let direction = player.last_direction.normalize_or_zero();

		commands.spawn((
			Sprite {
				color: Color::srgb(0.6, 0.4, 0.2),
				custom_size: Some(Vec2::new(14.0, 14.0)),
				..default()
			},
			Transform::from_xyz(origin.x, origin.y, 1.0),
			Velocity::from_vec(direction * spec.speed),
			// Boomerang: constant deceleration pulls it back past the player.
			Deceleration(-direction * spec.speed),
			Spin(HATCHET_SPIN),
			Collider { radius: 10.0 },
			Projectile {
				damage: weapon.damage,
				pierce_remaining: None,
				knockback: weapon.knockback,
				owner: event.weapon,
			},
			HitTracker::with_rehit_window(Duration::from_millis(THROWN_REHIT_WINDOW_MS)),
			Lifespan::new(PROJECTILE_LIFESPAN_SECS),
		));
	}
}

pub fn fire_shields(
	mut commands: Commands,
	mut fired: EventReader<WeaponFired>,
	weapon_query: Query<(&Weapon, &ShieldSpec)>,
	player_query: Query<&Transform, With<crate::player::Player>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for event in fired.read() {
		let Ok((weapon, spec)) = weapon_query.get(event.weapon) else {
			continue;
		};

		for angle in [0.0, std::f32::consts::PI] {
			let horizontal = angle.cos() * spec.speed;

			commands.spawn((
				Sprite {
					color: Color::srgb(0.7, 0.7, 0.3),
					custom_size: Some(Vec2::new(16.0, 16.0)),
					..default()
				},
				Transform::from_xyz(origin.x, origin.y, 1.0),
				Velocity {
					x: horizontal,
					y: SHIELD_BOUNCE_IMPULSE,
				},
				ArcBounce {
					gravity: SHIELD_GRAVITY,
					bounce_y: origin.y,
					impulse: SHIELD_BOUNCE_IMPULSE,
				},
				Collider { radius: 8.0 },
				Projectile {
					damage: weapon.damage,
					pierce_remaining: Some(spec.pierce),
					knockback: weapon.knockback,
					owner: event.weapon,
				},
				HitTracker::once_per_enemy(),
				Lifespan::new(PROJECTILE_LIFESPAN_SECS),
			));
		}
	}
}
