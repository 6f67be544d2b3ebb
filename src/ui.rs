use bevy::prelude::*;

use crate::combat::{DamageNumber, RunEnded};
use crate::constants::*;
use crate::upgrades::{OfferedUpgrades, UpgradeChoicesReady, UpgradeChosen};

pub struct UiPlugin;

impl Plugin for UiPlugin {
	fn build(&self, app: &mut App) {
		app
			.add_systems(OnEnter(crate::RunState::Running), spawn_hud)
			.add_systems(
				Update,
				(update_hud, spawn_damage_numbers, float_damage_numbers)
					.run_if(in_state(crate::RunState::Running)),
			)
			.add_systems(
				Update,
				(build_upgrade_overlay, read_upgrade_input)
					.run_if(in_state(crate::RunState::Choosing)),
			)
			.add_systems(OnExit(crate::RunState::Choosing), despawn_upgrade_overlay)
			.add_systems(OnEnter(crate::RunState::GameOver), spawn_summary);
	}
}

#[derive(Component)]
struct HudRoot;

#[derive(Component)]
struct HealthText;

#[derive(Component)]
struct LevelText;

#[derive(Component)]
struct KillText;

#[derive(Component)]
struct TimerText;

#[derive(Component)]
struct XpBarFill;

#[derive(Component)]
struct UpgradeOverlay;

#[derive(Component)]
struct UpgradeButton(usize);

#[derive(Component)]
struct FloatingNumber {
	timer: Timer,
}

fn spawn_hud(mut commands: Commands, hud_query: Query<(), With<HudRoot>>) {
	if !hud_query.is_empty() {
		return;
	}

	commands
		.spawn((
			HudRoot,
			Node {
				flex_direction: FlexDirection::Column,
				row_gap: Val::Px(4.0),
				margin: UiRect::all(Val::Px(UI_MARGIN)),
				..default()
			},
		))
		.with_children(|parent| {
			parent.spawn((
				HealthText,
				Text::new("HP 100 / 100"),
				TextFont {
					font_size: UI_FONT_SIZE_NORMAL,
					..default()
				},
				TextColor(Color::srgb(1.0, 0.4, 0.4)),
			));
			parent.spawn((
				LevelText,
				Text::new("Level 1"),
				TextFont {
					font_size: UI_FONT_SIZE_NORMAL,
					..default()
				},
				TextColor(Color::WHITE),
			));
			parent.spawn((
				KillText,
				Text::new("Kills 0"),
				TextFont {
					font_size: UI_FONT_SIZE_SMALL,
					..default()
				},
				TextColor(Color::srgb(0.8, 0.8, 0.8)),
			));
			parent.spawn((
				TimerText,
				Text::new("0:00"),
				TextFont {
					font_size: UI_FONT_SIZE_SMALL,
					..default()
				},
				TextColor(Color::srgb(0.8, 0.8, 0.8)),
			));

			parent
				.spawn((
					Node {
						width: Val::Px(XP_BAR_WIDTH),
						height: Val::Px(XP_BAR_HEIGHT),
						..default()
					},
					BackgroundColor(Color::srgb(0.15, 0.15, 0.2)),
				))
				.with_children(|bar| {
					bar.spawn((
						XpBarFill,
						Node {
							width: Val::Percent(0.0),
							height: Val::Percent(100.0),
							..default()
						},
						BackgroundColor(Color::srgb(0.3, 0.9, 1.0)),
					));
				});
		});
}

fn update_hud(
	player_query: Query<(&crate::player::Player, &crate::combat::Health)>,
	progress: Res<crate::progression::Progress>,
	director: Res<crate::director::Director>,
	mut health_text: Query<&mut Text, With<HealthText>>,
	mut level_text: Query<&mut Text, (With<LevelText>, Without<HealthText>)>,
	mut kill_text: Query<
		&mut Text,
		(With<KillText>, Without<HealthText>, Without<LevelText>),
	>,
	mut timer_text: Query<
		&mut Text,
		(
			With<TimerText>,
			Without<HealthText>,
			Without<LevelText>,
			Without<KillText>,
		),
	>,
	mut xp_fill: Query<&mut Node, With<XpBarFill>>,
) {
	let Ok((player, health)) = player_query.get_single() else {
		return;
	};

	if let Ok(mut text) = health_text.get_single_mut() {
		text.0 = format!("HP {:.0} / {:.0}", health.current, health.total);
	}
	if let Ok(mut text) = level_text.get_single_mut() {
		text.0 = format!("Level {}", progress.level);
	}
	if let Ok(mut text) = kill_text.get_single_mut() {
		text.0 = format!("Kills {}", player.kill_count);
	}
	if let Ok(mut text) = timer_text.get_single_mut() {
		let total = director.elapsed_secs as u32;
		text.0 = format!("{}:{:02}", total / 60, total % 60);
	}
	if let Ok(mut node) = xp_fill.get_single_mut() {
		let fraction = progress.experience as f32 / progress.xp_to_next_level.max(1) as f32;
		node.width = Val::Percent(fraction.clamp(0.0, 1.0) * 100.0);
	}
}

/// Rebuilds the overlay whenever a new hand of choices is dealt, including
/// re-deals while still in the choosing state.
fn build_upgrade_overlay(
	mut commands: Commands,
	mut ready: EventReader<UpgradeChoicesReady>,
	offered: Res<OfferedUpgrades>,
	overlay_query: Query<Entity, With<UpgradeOverlay>>,
) {
	if ready.read().last().is_none() {
		return;
	}

	for entity in overlay_query.iter() {
		commands.entity(entity).despawn_recursive();
	}

	commands
		.spawn((
			UpgradeOverlay,
			Node {
				position_type: PositionType::Absolute,
				width: Val::Percent(100.0),
				height: Val::Percent(100.0),
				flex_direction: FlexDirection::Column,
				align_items: AlignItems::Center,
				justify_content: JustifyContent::Center,
				row_gap: Val::Px(UPGRADE_BUTTON_GAP),
				..default()
			},
			BackgroundColor(Color::srgba(0.0, 0.0, 0.0, UPGRADE_OVERLAY_ALPHA)),
		))
		.with_children(|parent| {
			parent.spawn((
				Text::new("Level Up"),
				TextFont {
					font_size: UI_FONT_SIZE_LARGE,
					..default()
				},
				TextColor(Color::WHITE),
				Node {
					margin: UiRect::bottom(Val::Px(UPGRADE_TITLE_MARGIN)),
					..default()
				},
			));

			for (index, choice) in offered.0.iter().enumerate() {
				parent
					.spawn((
						UpgradeButton(index),
						Button,
						Node {
							width: Val::Px(UPGRADE_BUTTON_WIDTH),
							height: Val::Px(UPGRADE_BUTTON_HEIGHT),
							flex_direction: FlexDirection::Column,
							justify_content: JustifyContent::Center,
							padding: UiRect::all(Val::Px(UPGRADE_BUTTON_PADDING)),
							..default()
						},
						BackgroundColor(Color::srgb(0.2, 0.2, 0.3)),
					))
					.with_children(|button| {
						button.spawn((
							Text::new(format!("{}. {}", index + 1, choice.title)),
							TextFont {
								font_size: UI_FONT_SIZE_MEDIUM,
								..default()
							},
							TextColor(Color::WHITE),
						));
						button.spawn((
							Text::new(choice.detail.clone()),
							TextFont {
								font_size: UI_FONT_SIZE_SMALL,
								..default()
							},
							TextColor(Color::srgb(0.7, 0.7, 0.7)),
						));
					});
			}
		});
}

fn read_upgrade_input(
	button_query: Query<(&Interaction, &UpgradeButton), Changed<Interaction>>,
	keys: Res<ButtonInput<KeyCode>>,
	offered: Res<OfferedUpgrades>,
	mut chosen: EventWriter<UpgradeChosen>,
) {
	for (interaction, button) in button_query.iter() {
		if *interaction == Interaction::Pressed {
			chosen.send(UpgradeChosen(button.0));
			return;
		}
	}

	let hotkeys = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];
	for (index, key) in hotkeys.into_iter().enumerate() {
		if keys.just_pressed(key) && index < offered.0.len() {
			chosen.send(UpgradeChosen(index));
			return;
		}
	}
}

fn despawn_upgrade_overlay(
	mut commands: Commands,
	overlay_query: Query<Entity, With<UpgradeOverlay>>,
) {
	for entity in overlay_query.iter() {
		commands.entity(entity).despawn_recursive();
	}
}

fn spawn_damage_numbers(mut commands: Commands, mut events: EventReader<DamageNumber>) {
	for event in events.read() {
		commands.spawn((
			Text2d::new(format!("{:.0}", event.amount)),
			TextFont {
				font_size: UI_FONT_SIZE_SMALL,
				..default()
			},
			TextColor(Color::WHITE),
			Transform::from_xyz(event.position.x, event.position.y + 12.0, 5.0),
			FloatingNumber {
				timer: Timer::from_seconds(DAMAGE_TEXT_SECS, TimerMode::Once),
			},
		));
	}
}

fn float_damage_numbers(
	mut commands: Commands,
	mut number_query: Query<(
		Entity,
		&mut FloatingNumber,
		&mut Transform,
		&mut TextColor,
	)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut number, mut transform, mut color) in number_query.iter_mut() {
		number.timer.tick(time.delta());

		if number.timer.finished() {
			commands.entity(entity).despawn();
			continue;
		}

		transform.translation.y += DAMAGE_TEXT_RISE * time.delta_secs();
		color.0.set_alpha(1.0 - number.timer.fraction());
	}
}

fn spawn_summary(mut commands: Commands, mut ended: EventReader<RunEnded>) {
	let Some(run) = ended.read().last() else {
		return;
	};

	commands
		.spawn((
			Node {
				position_type: PositionType::Absolute,
				width: Val::Percent(100.0),
				height: Val::Percent(100.0),
				flex_direction: FlexDirection::Column,
				align_items: AlignItems::Center,
				justify_content: JustifyContent::Center,
				row_gap: Val::Px(8.0),
				..default()
			},
			BackgroundColor(Color::srgba(0.0, 0.0, 0.0, UPGRADE_OVERLAY_ALPHA)),
		))
		.with_children(|parent| {
			parent.spawn((
				Text::new("Game Over"),
				TextFont {
					font_size: UI_FONT_SIZE_LARGE,
					..default()
				},
				TextColor(Color::srgb(1.0, 0.3, 0.3)),
			));
			parent.spawn((
				Text::new(format!("Kills: {}", run.kills)),
				TextFont {
					font_size: UI_FONT_SIZE_MEDIUM,
					..default()
				},
				TextColor(Color::WHITE),
			));

			for weapon in &run.weapons {
				parent.spawn((
					Text::new(format!(
						"{}: {:.0} damage ({:.1}/s)",
						weapon.name, weapon.total_damage, weapon.dps
					)),
					TextFont {
						font_size: UI_FONT_SIZE_NORMAL,
						..default()
					},
					TextColor(Color::srgb(0.8, 0.8, 0.8)),
				));
			}
		});
}
