use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
	fn build(&self, app: &mut App) {
		app.init_asset::<GameConfigData>()
			.init_asset_loader::<GameConfigLoader>()
			.add_systems(Startup, load_game_config)
			.add_systems(
				Update,
				finish_loading.run_if(in_state(crate::RunState::Loading)),
			);
	}
}

#[derive(Asset, TypePath, Deserialize, Clone)]
pub struct GameConfigData {
	pub rng_seed: u64,
	pub starting_weapon: crate::weapons::WeaponId,
	pub base_spawn_interval_ms: u32,
	pub spawn_interval_level_factor_ms: u32,
	pub min_spawn_interval_ms: u32,
	pub max_enemies: usize,
	pub stage_two_at_secs: f32,
	pub stage_three_at_secs: f32,
}

/// The validated config, available as a plain resource once loading finishes.
#[derive(Resource, Clone)]
pub struct GameConfig(pub GameConfigData);

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("could not read game config: {0}")]
	Io(#[from] std::io::Error),
	#[error("could not parse game config: {0}")]
	Parse(#[from] ron::error::SpannedError),
}

#[derive(Default)]
struct GameConfigLoader;

impl AssetLoader for GameConfigLoader {
	type Asset = GameConfigData;
	type Settings = ();
	type Error = ConfigError;

	async fn load(
		&self,
		reader: &mut dyn Reader,
		_settings: &Self::Settings,
		_load_context: &mut LoadContext<'_>,
	) -> Result<Self::Asset, Self::Error> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes).await?;
		let data = ron::de::from_bytes::<GameConfigData>(&bytes)?;
		Ok(data)
	}

	fn extensions(&self) -> &[&str] {
		&["config.ron"]
	}
}

#[derive(Resource)]
struct GameConfigHandle(Handle<GameConfigData>);

fn load_game_config(mut commands: Commands, asset_server: Res<AssetServer>) {
	commands.insert_resource(GameConfigHandle(asset_server.load("game.config.ron")));
}

/// Waits for the config asset, validates it, then seeds the run and enters
/// the Running state. A missing or invalid config aborts startup.
fn finish_loading(
	mut commands: Commands,
	handle: Res<GameConfigHandle>,
	config_assets: Res<Assets<GameConfigData>>,
	asset_server: Res<AssetServer>,
	mut next_state: ResMut<NextState<crate::RunState>>,
) {
	use bevy::asset::LoadState;

	if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&handle.0) {
		error!("game config failed to load: {err}");
		panic!("game config failed to load");
	}

	let Some(data) = config_assets.get(&handle.0) else {
		return;
	};

	let errors = validate(data);
	if !errors.is_empty() {
		error!("game config validation failed with {} error(s):", errors.len());
		for (i, err) in errors.iter().enumerate() {
			error!("  {}. {}", i + 1, err);
		}
		panic!("game config validation failed");
	}

	info!("game config loaded (seed {})", data.rng_seed);
	commands.insert_resource(crate::rng::GameRng::from_seed(data.rng_seed));
	commands.insert_resource(crate::director::Director::from_config(data));
	commands.insert_resource(GameConfig(data.clone()));
	next_state.set(crate::RunState::Running);
}

fn validate(data: &GameConfigData) -> Vec<String> {
	let mut errors = Vec::new();

	if data.max_enemies == 0 {
		errors.push("max_enemies must be at least 1".to_string());
	}
	if data.min_spawn_interval_ms == 0 {
		errors.push("min_spawn_interval_ms must be nonzero".to_string());
	}
	if data.min_spawn_interval_ms > data.base_spawn_interval_ms {
		errors.push(format!(
			"min_spawn_interval_ms ({}) exceeds base_spawn_interval_ms ({})",
			data.min_spawn_interval_ms, data.base_spawn_interval_ms
		));
	}
	if data.stage_two_at_secs >= data.stage_three_at_secs {
		errors.push(format!(
			"stage_two_at_secs ({}) must come before stage_three_at_secs ({})",
			data.stage_two_at_secs, data.stage_three_at_secs
		));
	}

	errors
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valid_config() -> GameConfigData {
		GameConfigData {
			rng_seed: 1,
			starting_weapon: crate::weapons::WeaponId::Knife,
			base_spawn_interval_ms: 1000,
			spawn_interval_level_factor_ms: 10,
			min_spawn_interval_ms: 150,
			max_enemies: 450,
			stage_two_at_secs: 60.0,
			stage_three_at_secs: 300.0,
		}
	}

	#[test]
	fn test_valid_config_passes() {
		assert!(validate(&valid_config()).is_empty());
	}

	#[test]
	fn test_zero_population_cap_rejected() {
		let mut config = valid_config();
		config.max_enemies = 0;
		assert_eq!(validate(&config).len(), 1);
	}

	#[test]
	fn test_inverted_spawn_intervals_rejected() {
		let mut config = valid_config();
		config.min_spawn_interval_ms = 2000;
		assert_eq!(validate(&config).len(), 1);
	}

	#[test]
	fn test_inverted_stage_thresholds_rejected() {
		let mut config = valid_config();
		config.stage_three_at_secs = 30.0;
		assert_eq!(validate(&config).len(), 1);
	}

	#[test]
	fn test_config_ron_parses() {
		let data: GameConfigData =
			ron::de::from_bytes(include_bytes!("../assets/game.config.ron")).unwrap();
		assert!(validate(&data).is_empty());
	}
}
