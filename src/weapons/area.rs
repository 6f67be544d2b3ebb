use bevy::prelude::*;

use crate::combat::{Burning, EnemyDamaged};
use crate::constants::*;
use crate::enemy::{Dying, Enemy};

use super::{Weapon, WeaponFired};

#[derive(Component)]
pub struct FlamethrowerSpec {
	pub range: f32,
	pub burn_duration_ms: u32,
}

impl Default for FlamethrowerSpec {
	fn default() -> Self {
		Self {
			range: FLAMETHROWER_RANGE,
			burn_duration_ms: FLAMETHROWER_BURN_DURATION_MS,
		}
	}
}

/// Scorches everything in range on each discharge and leaves it burning.
/// Reigniting an already-burning enemy restarts its burn from scratch.
pub fn fire_flamethrowers(
	mut commands: Commands,
	mut fired: EventReader<WeaponFired>,
	weapon_query: Query<(&Weapon, &FlamethrowerSpec)>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	enemy_query: Query<(Entity, &Transform), (With<Enemy>, Without<Dying>)>,
	mut damage_events: EventWriter<EnemyDamaged>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let origin = player_transform.translation.truncate();

	for event in fired.read() {
		let Ok((weapon, spec)) = weapon_query.get(event.weapon) else {
			continue;
		};

		for (enemy_entity, enemy_transform) in enemy_query.iter() {
			let position = enemy_transform.translation.truncate();

			if origin.distance_squared(position) > spec.range * spec.range {
				continue;
			}

			damage_events.send(EnemyDamaged {
				enemy: enemy_entity,
				amount: weapon.damage,
				origin,
				knockback: weapon.knockback,
				weapon: event.weapon,
			});

			let ticks = spec.burn_duration_ms / FLAMETHROWER_BURN_TICK_MS;
			commands.entity(enemy_entity).insert(Burning {
				tick_timer: Timer::from_seconds(
					FLAMETHROWER_BURN_TICK_MS as f32 / 1000.0,
					TimerMode::Repeating,
				),
				ticks_remaining: ticks,
				damage_per_tick: weapon.damage / 2.0,
				weapon: event.weapon,
			});
		}
	}
}
