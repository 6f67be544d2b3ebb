use bevy::prelude::*;

use crate::combat::Health;
use crate::constants::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
	fn build(&self, app: &mut App) {
		app.add_systems(OnEnter(crate::RunState::Running), spawn_player)
			.add_systems(
				Update,
				(player_movement, tick_immunity).in_set(crate::physics::MovementSet),
			);
	}
}

#[derive(Component)]
pub struct Player {
	pub move_speed: f32,
	pub pickup_radius: f32,
	/// Direction of the most recent nonzero movement; thrown weapons fire
	/// along it. Defaults to +X so they work before the player first moves.
	pub last_direction: Vec2,
	pub kill_count: u32,
}

impl Default for Player {
	fn default() -> Self {
		Self {
			move_speed: PLAYER_MOVE_SPEED,
			pickup_radius: PLAYER_PICKUP_RADIUS,
			last_direction: Vec2::X,
			kill_count: 0,
		}
	}
}

/// Post-hit invulnerability window. Contact damage is skipped while present.
#[derive(Component)]
pub struct Immunity(pub Timer);

impl Immunity {
	pub fn new() -> Self {
		Self(Timer::from_seconds(PLAYER_IMMUNITY_SECS, TimerMode::Once))
	}
}

fn spawn_player(
	mut commands: Commands,
	config: Res<crate::config::GameConfig>,
	player_query: Query<(), With<Player>>,
) {
	// Running is re-entered after every upgrade screen; only spawn once.
	if !player_query.is_empty() {
		return;
	}

	commands.spawn((
		Sprite {
			color: Color::srgb(0.2, 0.4, 0.9),
			custom_size: Some(Vec2::new(20.0, 20.0)),
			..default()
		},
		Transform::from_xyz(0.0, 0.0, 1.0),
		Player::default(),
		Health::new(PLAYER_HEALTH),
		crate::physics::Velocity::default(),
		crate::physics::Collider {
			radius: PLAYER_COLLIDER_RADIUS,
		},
	));

	crate::weapons::equip_weapon(&mut commands, config.0.starting_weapon);
}

fn player_movement(
	keyboard: Res<ButtonInput<KeyCode>>,
	mut query: Query<(&mut crate::physics::Velocity, &mut Player)>,
) {
	for (mut velocity, mut player) in query.iter_mut() {
		let mut direction = Vec2::ZERO;

		if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
			direction.x -= 1.0;
		}
		if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
			direction.x += 1.0;
		}
		if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
			direction.y += 1.0;
		}
		if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
			direction.y -= 1.0;
		}

		let direction = direction.normalize_or_zero();
		velocity.x = direction.x * player.move_speed;
		velocity.y = direction.y * player.move_speed;

		if direction != Vec2::ZERO {
			player.last_direction = direction;
		}
	}
}

fn tick_immunity(
	mut commands: Commands,
	mut query: Query<(Entity, &mut Immunity)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut immunity) in query.iter_mut() {
		if immunity.0.tick(time.delta()).just_finished() {
			commands.entity(entity).remove::<Immunity>();
		}
	}
}
