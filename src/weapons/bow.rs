use bevy::prelude::*;

use crate::constants::*;
use crate::enemy::{Dying, Enemy};
use crate::physics::{rotate_toward, Collider, Velocity};
use crate::projectiles::{HitTracker, Lifespan, Projectile};
use crate::rng::GameRng;

use super::{Weapon, WeaponFired};

#[derive(Component)]
pub struct BowSpec {
	pub range: f32,
	pub speed: f32,
	pub pierce: u32,
	pub aim_angle: f32,
	pub target_angle: f32,
	pub has_target: bool,
}

impl Default for BowSpec {
	fn default() -> Self {
		Self {
			range: BOW_RANGE,
			speed: BOW_ARROW_SPEED,
			pierce: BOW_PIERCE,
			aim_angle: 0.0,
			target_angle: 0.0,
			has_target: false,
		}
	}
}

/// Tracks the nearest living enemy in range and turns the bow toward it at a
/// capped rate, so arrows lag slightly behind a fast-moving target.
pub fn aim_bows(
	mut bow_query: Query<&mut BowSpec>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	enemy_query: Query<&Transform, (With<Enemy>, Without<Dying>, Without<crate::player::Player>)>,
	time: Res<Time<Virtual>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for mut spec in bow_query.iter_mut() {
		let mut closest: Option<(f32, Vec2)> = None;

		for enemy_transform in enemy_query.iter() {
			let position = enemy_transform.translation.truncate();
			let distance_sq = origin.distance_squared(position);

			if distance_sq > spec.range * spec.range {
				continue;
			}

			if closest.map_or(true, |(best, _)| distance_sq < best) {
				closest = Some((distance_sq, position));
			}
		}

		match closest {
			Some((_, position)) => {
				let to_target = position - origin;
				spec.target_angle = to_target.y.atan2(to_target.x);
				spec.has_target = true;
			}
			None => {
				spec.has_target = false;
			}
		}

		spec.aim_angle = rotate_toward(
			spec.aim_angle,
			spec.target_angle,
			BOW_ROTATION_SPEED * time.delta_secs(),
		);
	}
}

pub fn fire_bows(
	mut commands: Commands,
	mut fired: EventReader<WeaponFired>,
	weapon_query: Query<(&Weapon, &BowSpec)>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	mut rng: ResMut<GameRng>,
) {
	use rand::Rng;

	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for event in fired.read() {
		let Ok((weapon, spec)) = weapon_query.get(event.weapon) else {
			continue;
		};

		// Hold fire with no target in range rather than loosing arrows blind.
		if !spec.has_target {
			continue;
		}

		let angle = spec.aim_angle + rng.0.gen_range(-BOW_JITTER_RADS..=BOW_JITTER_RADS);
		let direction = Vec2::new(angle.cos(), angle.sin());

		commands.spawn((
			Sprite {
				color: Color::srgb(0.9, 0.85, 0.5),
				custom_size: Some(Vec2::new(18.0, 3.0)),
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
				owner: event.weapon,
			},
			HitTracker::once_per_enemy(),
			Lifespan::new(PROJECTILE_LIFESPAN_SECS),
		));
	}
}
