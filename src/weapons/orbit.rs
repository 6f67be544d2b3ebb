use bevy::prelude::*;
use std::time::Duration;

use crate::constants::*;
use crate::physics::Collider;
use crate::projectiles::{HitTracker, Projectile};

use super::Weapon;

#[derive(Component, Default)]
pub struct AxeSpec {
	pub rotation: f32,
}

/// A blade circling the player, owned by an axe weapon entity.
#[derive(Component)]
pub struct OrbitingBlade {
	pub weapon: Entity,
}

pub fn spawn_blade(commands: &mut Commands, weapon: Entity) {
	commands.spawn((
		Sprite {
			color: Color::srgb(0.75, 0.75, 0.8),
			custom_size: Some(Vec2::new(18.0, 18.0)),
			..default()
		},
		Transform::from_xyz(0.0, 0.0, 1.0),
		Collider { radius: 9.0 },
		Projectile {
			damage: AXE_DAMAGE,
			pierce_remaining: None,
			knockback: AXE_KNOCKBACK,
			owner: weapon,
		},
		HitTracker::with_rehit_window(Duration::from_millis(ORBIT_REHIT_WINDOW_MS)),
		OrbitingBlade { weapon },
	));
}

pub fn blade_count(blade_query: &Query<&OrbitingBlade>, weapon: Entity) -> usize {
	blade_query
		.iter()
		.filter(|blade| blade.weapon == weapon)
		.count()
}

/// Advances each axe's rotation and redistributes its blades evenly around
/// the circle, so a newly added blade settles into place on the next frame.
pub fn update_blades(
	mut axe_query: Query<(Entity, &Weapon, &mut AxeSpec)>,
	mut blade_query: Query<(&OrbitingBlade, &mut Transform, &mut Projectile)>,
	player_query: Query<&Transform, (With<crate::player::Player>, Without<OrbitingBlade>)>,
	time: Res<Time<Virtual>>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let center = player_transform.translation.truncate();

	for (weapon_entity, weapon, mut spec) in axe_query.iter_mut() {
		spec.rotation += AXE_ROTATION_SPEED * time.delta_secs();

		let count = blade_query
			.iter()
			.filter(|(blade, _, _)| blade.weapon == weapon_entity)
			.count();
		if count == 0 {
			continue;
		}

		let step = std::f32::consts::TAU / count as f32;

		for (index, (_, mut transform, mut projectile)) in blade_query
			.iter_mut()
			.filter(|(blade, _, _)| blade.weapon == weapon_entity)
			.enumerate()
		{
			let angle = spec.rotation + index as f32 * step;
			transform.translation.x = center.x + angle.cos() * AXE_ORBIT_RADIUS;
			transform.translation.y = center.y + angle.sin() * AXE_ORBIT_RADIUS;
			transform.rotation = Quat::from_rotation_z(angle);

			// Damage upgrades land on the weapon; mirror them onto the blades.
			projectile.damage = weapon.damage;
		}
	}
}
