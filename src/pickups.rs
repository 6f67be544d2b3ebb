use bevy::prelude::*;
use rand::Rng;

use crate::constants::*;
use crate::rng::GameRng;

pub struct PickupsPlugin;

impl Plugin for PickupsPlugin {
	fn build(&self, app: &mut App) {
		app
			.add_event::<XpGained>()
			.add_event::<PotionDrunk>()
			.add_systems(
				Update,
				(activate_pickups, attract_pickups, collect_pickups, drink_potions)
					.chain()
					.in_set(crate::physics::MovementSet)
					.run_if(in_state(crate::RunState::Running)),
			);
	}
}

#[derive(Event)]
pub struct XpGained(pub u32);

#[derive(Event)]
pub struct PotionDrunk(pub f32);

enum AttractPhase {
	/// Freshly dropped; ignores the player entirely.
	Inert(Timer),
	Idle,
	/// Nudged away from the player before giving chase.
	ScootBack { direction: Vec2, timer: Timer },
	Homing { speed: f32 },
}

#[derive(Component)]
pub struct Pickup {
	phase: AttractPhase,
}

#[derive(Component)]
pub struct ExperienceOrb {
	pub xp: u32,
}

#[derive(Component)]
pub struct HealthPotion {
	pub value: f32,
}

pub fn spawn_experience_orb(commands: &mut Commands, position: Vec2, xp: u32) {
	commands.spawn((
		Sprite {
			color: Color::srgb(0.3, 0.9, 1.0),
			custom_size: Some(Vec2::new(8.0, 8.0)),
			..default()
		},
		Transform::from_xyz(position.x, position.y, 0.5),
		ExperienceOrb { xp },
		Pickup {
			phase: AttractPhase::Inert(Timer::from_seconds(
				PICKUP_ACTIVATION_DELAY_SECS,
				TimerMode::Once,
			)),
		},
	));
}

pub fn spawn_health_potion(commands: &mut Commands, position: Vec2, value: f32) {
	commands.spawn((
		Sprite {
			color: Color::srgb(1.0, 0.2, 0.4),
			custom_size: Some(Vec2::new(10.0, 12.0)),
			..default()
		},
		Transform::from_xyz(position.x, position.y, 0.5),
		HealthPotion { value },
		Pickup {
			phase: AttractPhase::Inert(Timer::from_seconds(
				PICKUP_ACTIVATION_DELAY_SECS,
				TimerMode::Once,
			)),
		},
	));
}

fn activate_pickups(mut pickup_query: Query<&mut Pickup>, time: Res<Time<Virtual>>) {
	for mut pickup in pickup_query.iter_mut() {
		if let AttractPhase::Inert(ref mut timer) = pickup.phase {
			if timer.tick(time.delta()).just_finished() {
				pickup.phase = AttractPhase::Idle;
			}
		}
	}
}

/// Pulls active pickups toward the player once inside the pickup radius.
/// An idle pickup first scoots a short hop away from the player, then homes
/// in at a speed rolled once so a cloud of orbs converges raggedly.
fn attract_pickups(
	mut pickup_query: Query<(&mut Pickup, &mut Transform)>,
	player_query: Query<
		(&Transform, &crate::player::Player),
		Without<Pickup>,
	>,
	mut rng: ResMut<GameRng>,
	time: Res<Time<Virtual>>,
) {
	let Ok((player_transform, player)) = player_query.get_single() else {
		return;
	};
	let target = player_transform.translation.truncate();

	for (mut pickup, mut transform) in pickup_query.iter_mut() {
		let position = transform.translation.truncate();

		match pickup.phase {
			AttractPhase::Inert(_) => {}
			AttractPhase::Idle => {
				if position.distance(target) <= player.pickup_radius {
					let away = (position - target).normalize_or_zero();
					pickup.phase = AttractPhase::ScootBack {
						direction: away,
						timer: Timer::from_seconds(PICKUP_SCOOT_SECS, TimerMode::Once),
					};
				}
			}
			AttractPhase::ScootBack {
				direction,
				ref mut timer,
			} => {
				let step = PICKUP_SCOOT_DISTANCE / PICKUP_SCOOT_SECS * time.delta_secs();
				transform.translation.x += direction.x * step;
				transform.translation.y += direction.y * step;

				if timer.tick(time.delta()).just_finished() {
					let speed = rng
						.0
						.gen_range(PICKUP_HOMING_SPEED_MIN..=PICKUP_HOMING_SPEED_MAX);
					pickup.phase = AttractPhase::Homing { speed };
				}
			}
			AttractPhase::Homing { speed } => {
				let toward = (target - position).normalize_or_zero();
				transform.translation.x += toward.x * speed * time.delta_secs();
				transform.translation.y += toward.y * speed * time.delta_secs();
			}
		}
	}
}

fn collect_pickups(
	mut commands: Commands,
	pickup_query: Query<(Entity, &Transform, Option<&ExperienceOrb>, Option<&HealthPotion>), With<Pickup>>,
	player_query: Query<&Transform, With<crate::player::Player>>,
	mut xp_events: EventWriter<XpGained>,
	mut potion_events: EventWriter<PotionDrunk>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let target = player_transform.translation.truncate();

	for (entity, transform, orb, potion) in pickup_query.iter() {
		if transform.translation.truncate().distance(target) >= PICKUP_COLLECT_RANGE {
			continue;
		}

		if let Some(orb) = orb {
			xp_events.send(XpGained(orb.xp));
		}
		if let Some(potion) = potion {
			potion_events.send(PotionDrunk(potion.value));
		}
		commands.entity(entity).despawn();
	}
}

fn drink_potions(
	mut potion_events: EventReader<PotionDrunk>,
	mut player_query: Query<&mut crate::combat::Health, With<crate::player::Player>>,
) {
	let Ok(mut health) = player_query.get_single_mut() else {
		return;
	};

	for event in potion_events.read() {
		health.heal(event.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn drops_ignore_the_player_until_activated() {
		let mut app = App::new();
		app.init_resource::<Time<Virtual>>();
		app.insert_resource(GameRng::from_seed(5));
		app.add_systems(Update, (activate_pickups, attract_pickups).chain());

		app.world_mut()
			.spawn((Transform::default(), crate::player::Player::default()));
		let orb = app
			.world_mut()
			.spawn((
				Transform::from_xyz(10.0, 0.0, 0.5),
				Pickup {
					phase: AttractPhase::Inert(Timer::from_seconds(
						PICKUP_ACTIVATION_DELAY_SECS,
						TimerMode::Once,
					)),
				},
			))
			.id();

		// Inside the pickup radius but still inert, so it must not move.
		app.world_mut()
			.resource_mut::<Time<Virtual>>()
			.advance_by(Duration::from_millis(100));
		app.update();
		let x = app.world().get::<Transform>(orb).unwrap().translation.x;
		assert_eq!(x, 10.0);

		// Past the delay it wakes up and scoots away from the player first.
		app.world_mut()
			.resource_mut::<Time<Virtual>>()
			.advance_by(Duration::from_millis(500));
		app.update();
		app.world_mut()
			.resource_mut::<Time<Virtual>>()
			.advance_by(Duration::from_millis(16));
		app.update();
		let x = app.world().get::<Transform>(orb).unwrap().translation.x;
		assert!(x > 10.0);
	}
}
