use bevy::prelude::*;

mod combat;
mod config;
mod constants;
mod director;
mod enemy;
mod physics;
mod pickups;
mod player;
mod progression;
mod projectiles;
mod rng;
mod ui;
mod upgrades;
mod weapons;

use combat::CombatPlugin;
use config::ConfigPlugin;
use director::DirectorPlugin;
use enemy::EnemyPlugin;
use physics::PhysicsPlugin;
use pickups::PickupsPlugin;
use player::PlayerPlugin;
use progression::ProgressionPlugin;
use projectiles::ProjectilesPlugin;
use ui::UiPlugin;
use upgrades::UpgradesPlugin;
use weapons::WeaponsPlugin;

/// Top-level run flow. Loading blocks on the config asset; Choosing and
/// GameOver freeze the simulation clock while their overlays are up.
#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
	#[default]
	Loading,
	Running,
	Choosing,
	GameOver,
}

#[derive(Component)]
struct GameCamera;

fn main() {
	App::new()
		.add_plugins(DefaultPlugins.set(WindowPlugin {
			primary_window: Some(Window {
				title: "Wizard Survivors".to_string(),
				resolution: (1280.0, 720.0).into(),
				resizable: true,
				..default()
			}),
			..default()
		}))
		.init_state::<RunState>()
		.add_plugins((
			ConfigPlugin,
			PhysicsPlugin,
			PlayerPlugin,
			EnemyPlugin,
			ProjectilesPlugin,
			CombatPlugin,
			WeaponsPlugin,
			DirectorPlugin,
			PickupsPlugin,
			ProgressionPlugin,
			UpgradesPlugin,
			UiPlugin,
		))
		.insert_resource(ClearColor(Color::BLACK))
		.add_systems(Startup, setup_camera)
		.add_systems(
			Update,
			(follow_player, toggle_pause).run_if(in_state(RunState::Running)),
		)
		.add_systems(OnEnter(RunState::Choosing), freeze_clock)
		.add_systems(OnExit(RunState::Choosing), thaw_clock)
		.add_systems(OnEnter(RunState::GameOver), freeze_clock)
		.run();
}

fn setup_camera(mut commands: Commands) {
	commands.spawn((Camera2d, GameCamera));
}

fn follow_player(
	player_query: Query<&Transform, With<player::Player>>,
	mut camera_query: Query<&mut Transform, (With<GameCamera>, Without<player::Player>)>,
) {
	let Ok(player_transform) = player_query.get_single() else {
		return;
	};
	let Ok(mut camera_transform) = camera_query.get_single_mut() else {
		return;
	};

	camera_transform.translation.x = player_transform.translation.x;
	camera_transform.translation.y = player_transform.translation.y;
}

fn toggle_pause(keys: Res<ButtonInput<KeyCode>>, mut time: ResMut<Time<Virtual>>) {
	if keys.just_pressed(KeyCode::Escape) || keys.just_pressed(KeyCode::KeyP) {
		if time.is_paused() {
			time.unpause();
		} else {
			time.pause();
		}
	}
}

fn freeze_clock(mut time: ResMut<Time<Virtual>>) {
	time.pause();
}

fn thaw_clock(mut time: ResMut<Time<Virtual>>) {
	time.unpause();
}
