use bevy::prelude::*;

use crate::constants::*;
use crate::progression::{LevelUpQueue, LeveledUp};
use crate::rng::GameRng;
use crate::weapons::{self, WeaponId};

pub struct UpgradesPlugin;

impl Plugin for UpgradesPlugin {
	fn build(&self, app: &mut App) {
		app
			.add_event::<UpgradeChoicesReady>()
			.add_event::<UpgradeChosen>()
			.init_resource::<OfferedUpgrades>()
			.init_resource::<RedealRequested>()
			.add_systems(
				Update,
				deal_level_up_hands
					.in_set(crate::physics::CleanupSet)
					.run_if(in_state(crate::RunState::Running)),
			)
			.add_systems(OnEnter(crate::RunState::Choosing), offer_next_hand)
			.add_systems(
				Update,
				(
					offer_next_hand.run_if(resource_equals(RedealRequested(true))),
					apply_chosen_upgrade,
				)
					.run_if(in_state(crate::RunState::Choosing)),
			);
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeAction {
	EquipWeapon(WeaponId),
	WeaponDamage { weapon: Entity, amount: f32 },
	WeaponFireRate { weapon: Entity, reduce_ms: u32, floor_ms: u32 },
	WeaponKnockback { weapon: Entity, amount: f32 },
	KnifeCount { weapon: Entity },
	KnifePierce { weapon: Entity },
	AxeBlade { weapon: Entity },
	FlamethrowerRange { weapon: Entity, amount: f32 },
	FlamethrowerBurn { weapon: Entity, extend_ms: u32 },
	PlayerMoveSpeed,
	PlayerPickupRadius,
	PlayerMaxHealth,
}

#[derive(Debug, Clone)]
pub struct UpgradeChoice {
	pub title: String,
	pub detail: String,
	pub action: UpgradeAction,
}

/// The hand currently on the table.
#[derive(Resource, Default)]
pub struct OfferedUpgrades(pub Vec<UpgradeChoice>);

/// Set when the level-up queue still holds hands after a choice, so the next
/// one is presented without leaving the choosing state.
#[derive(Resource, Default, PartialEq)]
pub struct RedealRequested(pub bool);

#[derive(Event)]
pub struct UpgradeChoicesReady;

#[derive(Event)]
pub struct UpgradeChosen(pub usize);

/// What the pool builder needs to know about one equipped weapon.
pub struct WeaponSnapshot {
	pub entity: Entity,
	pub id: WeaponId,
	pub fire_rate_ms: u32,
	pub blade_count: usize,
}

fn choice(title: &str, detail: &str, action: UpgradeAction) -> UpgradeChoice {
	UpgradeChoice {
		title: title.to_string(),
		detail: detail.to_string(),
		action,
	}
}

/// Builds every upgrade the current loadout is eligible for. Fire-rate
/// options drop out at their per-weapon floor, extra axe blades at the blade
/// cap, and new weapons once all slots are filled.
///
/// Eligibility is judged against the loadout at build time. Hands are dealt
/// the moment a level clears, so a burst of level-ups can offer the same new
/// weapon in two queued hands; the apply step wastes the second pick.
pub fn build_upgrade_pool(weapons: &[WeaponSnapshot]) -> Vec<UpgradeChoice> {
	let mut pool = vec![
		choice(
			"Fleet Footed",
			"Move a little faster",
			UpgradeAction::PlayerMoveSpeed,
		),
		choice(
			"Magnetism",
			"Pick up orbs from further away",
			UpgradeAction::PlayerPickupRadius,
		),
		choice(
			"Vitality",
			"Raise maximum health",
			UpgradeAction::PlayerMaxHealth,
		),
	];

	for snapshot in weapons {
		let weapon = snapshot.entity;
		match snapshot.id {
			WeaponId::Knife => {
				pool.push(choice(
					"Sharper Knives",
					"Knife damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: KNIFE_DAMAGE_UPGRADE,
					},
				));
				if snapshot.fire_rate_ms > KNIFE_MIN_FIRE_RATE_MS {
					pool.push(choice(
						"Quick Hands",
						"Throw knives more often",
						UpgradeAction::WeaponFireRate {
							weapon,
							reduce_ms: KNIFE_FIRE_RATE_UPGRADE_MS,
							floor_ms: KNIFE_MIN_FIRE_RATE_MS,
						},
					));
				}
				pool.push(choice(
					"Another Knife",
					"Add a knife to the fan",
					UpgradeAction::KnifeCount { weapon },
				));
				pool.push(choice(
					"Piercing Knives",
					"Knives pass through one more enemy",
					UpgradeAction::KnifePierce { weapon },
				));
			}
			WeaponId::Axe => {
				pool.push(choice(
					"Heavier Axes",
					"Axe damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: AXE_DAMAGE_UPGRADE,
					},
				));
				if snapshot.blade_count < AXE_MAX_BLADES {
					pool.push(choice(
						"Another Axe",
						"Add an orbiting blade",
						UpgradeAction::AxeBlade { weapon },
					));
				}
			}
			WeaponId::Bow => {
				pool.push(choice(
					"Barbed Arrows",
					"Bow damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: BOW_DAMAGE_UPGRADE,
					},
				));
				if snapshot.fire_rate_ms > BOW_MIN_FIRE_RATE_MS {
					pool.push(choice(
						"Fast Draw",
						"Loose arrows more often",
						UpgradeAction::WeaponFireRate {
							weapon,
							reduce_ms: BOW_FIRE_RATE_UPGRADE_MS,
							floor_ms: BOW_MIN_FIRE_RATE_MS,
						},
					));
				}
			}
			WeaponId::Hatchet => {
				pool.push(choice(
					"Keener Edge",
					"Hatchet damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: HATCHET_DAMAGE_UPGRADE,
					},
				));
				if snapshot.fire_rate_ms > HATCHET_MIN_FIRE_RATE_MS {
					pool.push(choice(
						"Faster Throw",
						"Throw hatchets more often",
						UpgradeAction::WeaponFireRate {
							weapon,
							reduce_ms: HATCHET_FIRE_RATE_UPGRADE_MS,
							floor_ms: HATCHET_MIN_FIRE_RATE_MS,
						},
					));
				}
			}
			WeaponId::Sickle => {
				pool.push(choice(
					"Cruel Harvest",
					"Sickle damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: SICKLE_DAMAGE_UPGRADE,
					},
				));
				pool.push(choice(
					"Wide Swing",
					"Sickle knocks enemies back harder",
					UpgradeAction::WeaponKnockback {
						weapon,
						amount: SICKLE_KNOCKBACK_UPGRADE,
					},
				));
				if snapshot.fire_rate_ms > SICKLE_MIN_FIRE_RATE_MS {
					pool.push(choice(
						"Eager Reaper",
						"Swing the sickle more often",
						UpgradeAction::WeaponFireRate {
							weapon,
							reduce_ms: SICKLE_FIRE_RATE_UPGRADE_MS,
							floor_ms: SICKLE_MIN_FIRE_RATE_MS,
						},
					));
				}
			}
			WeaponId::Shield => {
				pool.push(choice(
					"Spiked Rim",
					"Shield damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: SHIELD_DAMAGE_UPGRADE,
					},
				));
				if snapshot.fire_rate_ms > SHIELD_MIN_FIRE_RATE_MS {
					pool.push(choice(
						"Quick Release",
						"Hurl shields more often",
						UpgradeAction::WeaponFireRate {
							weapon,
							reduce_ms: SHIELD_FIRE_RATE_UPGRADE_MS,
							floor_ms: SHIELD_MIN_FIRE_RATE_MS,
						},
					));
				}
			}
			WeaponId::Flamethrower => {
				pool.push(choice(
					"Hotter Flame",
					"Flamethrower damage up",
					UpgradeAction::WeaponDamage {
						weapon,
						amount: FLAMETHROWER_DAMAGE_UPGRADE,
					},
				));
				pool.push(choice(
					"Longer Reach",
					"Widen the burn radius",
					UpgradeAction::FlamethrowerRange {
						weapon,
						amount: FLAMETHROWER_RANGE_UPGRADE,
					},
				));
				pool.push(choice(
					"Lingering Burn",
					"Fires burn for longer",
					UpgradeAction::FlamethrowerBurn {
						weapon,
						extend_ms: FLAMETHROWER_BURN_UPGRADE_MS,
					},
				));
				if snapshot.fire_rate_ms > FLAMETHROWER_MIN_FIRE_RATE_MS {
					pool.push(choice(
						"Open Valve",
						"Discharge more often",
						UpgradeAction::WeaponFireRate {
							weapon,
							reduce_ms: FLAMETHROWER_FIRE_RATE_UPGRADE_MS,
							floor_ms: FLAMETHROWER_MIN_FIRE_RATE_MS,
						},
					));
				}
			}
		}
	}

	if weapons.len() < MAX_EQUIPPED_WEAPONS {
		for id in WeaponId::ALL {
			if weapons.iter().any(|snapshot| snapshot.id == id) {
				continue;
			}
			pool.push(UpgradeChoice {
				title: id.display_name().to_string(),
				detail: format!("Equip the {}", id.display_name()),
				action: UpgradeAction::EquipWeapon(id),
			});
		}
	}

	pool
}

pub fn deal_choices(pool: Vec<UpgradeChoice>, rng: &mut GameRng) -> Vec<UpgradeChoice> {
	let count = UPGRADE_CHOICE_COUNT.min(pool.len());
	rand::seq::index::sample(&mut rng.0, pool.len(), count)
		.into_iter()
		.map(|index| pool[index].clone())
		.collect()
}

fn snapshot_loadout(
	weapon_query: &Query<(Entity, &weapons::Weapon)>,
	blade_query: &Query<&weapons::orbit::OrbitingBlade>,
) -> Vec<WeaponSnapshot> {
	weapon_query
		.iter()
		.map(|(entity, weapon)| WeaponSnapshot {
			entity,
			id: weapon.id,
			fire_rate_ms: weapon.fire_rate_ms,
			blade_count: weapons::blade_count(blade_query, entity),
		})
		.collect()
}

/// Deals one hand of choices per cleared level, immediately, so every hand
/// reflects the loadout as it stood when that level cleared.
fn deal_level_up_hands(
	mut leveled: EventReader<LeveledUp>,
	weapon_query: Query<(Entity, &weapons::Weapon)>,
	blade_query: Query<&weapons::orbit::OrbitingBlade>,
	mut queue: ResMut<LevelUpQueue>,
	mut rng: ResMut<GameRng>,
) {
	for _ in leveled.read() {
		let pool = build_upgrade_pool(&snapshot_loadout(&weapon_query, &blade_query));
		queue.hands.push_back(deal_choices(pool, &mut rng));
	}
}

fn offer_next_hand(
	mut queue: ResMut<LevelUpQueue>,
	mut offered: ResMut<OfferedUpgrades>,
	mut redeal: ResMut<RedealRequested>,
	mut ready: EventWriter<UpgradeChoicesReady>,
	mut next_state: ResMut<NextState<crate::RunState>>,
) {
	redeal.0 = false;

	match queue.hands.pop_front() {
		Some(hand) => {
			offered.0 = hand;
			ready.send(UpgradeChoicesReady);
		}
		None => {
			next_state.set(crate::RunState::Running);
		}
	}
}

fn apply_chosen_upgrade(
	mut commands: Commands,
	mut chosen: EventReader<UpgradeChosen>,
	offered: Res<OfferedUpgrades>,
	queue: Res<LevelUpQueue>,
	mut player_query: Query<(&mut crate::player::Player, &mut crate::combat::Health)>,
	mut weapon_query: Query<&mut weapons::Weapon>,
	mut knife_query: Query<&mut weapons::ranged::KnifeSpec>,
	mut sickle_query: Query<&mut weapons::melee::SickleSpec>,
	mut flame_query: Query<&mut weapons::area::FlamethrowerSpec>,
	mut redeal: ResMut<RedealRequested>,
	mut next_state: ResMut<NextState<crate::RunState>>,
	blade_query: Query<&weapons::orbit::OrbitingBlade>,
) {
	let mut picked = None;
	for event in chosen.read() {
		picked = offered.0.get(event.0).cloned();
	}
	let Some(pick) = picked else {
		return;
	};

	info!("upgrade chosen: {}", pick.title);

	match pick.action {
		UpgradeAction::EquipWeapon(id) => {
			if weapon_query.iter().any(|weapon| weapon.id == id) {
				warn!("{} already equipped, choice wasted", id.display_name());
			} else if weapon_query.iter().count() >= MAX_EQUIPPED_WEAPONS {
				// Another hand in the same batch may have filled the last
				// slot after this one was dealt.
				warn!("weapon slots full, {} wasted", id.display_name());
			} else {
				weapons::equip_weapon(&mut commands, id);
			}
		}
		UpgradeAction::WeaponDamage { weapon, amount } => {
			if let Ok(mut weapon) = weapon_query.get_mut(weapon) {
				weapon.damage += amount;
			}
		}
		UpgradeAction::WeaponFireRate {
			weapon: entity,
			reduce_ms,
			floor_ms,
		} => {
			if let Ok(mut weapon) = weapon_query.get_mut(entity) {
				weapon.fire_rate_ms = weapon.fire_rate_ms.saturating_sub(reduce_ms).max(floor_ms);
				weapon.reinstall_cooldown();
				// Sickles schedule their own swings off a separate timer.
				if let Ok(mut sickle) = sickle_query.get_mut(entity) {
					sickle.swing_timer = Timer::from_seconds(
						weapon.fire_rate_ms as f32 / 1000.0,
						TimerMode::Repeating,
					);
				}
			}
		}
		UpgradeAction::WeaponKnockback { weapon, amount } => {
			if let Ok(mut weapon) = weapon_query.get_mut(weapon) {
				weapon.knockback += amount;
			}
		}
		UpgradeAction::KnifeCount { weapon } => {
			if let Ok(mut spec) = knife_query.get_mut(weapon) {
				spec.count += 1;
			}
		}
		UpgradeAction::KnifePierce { weapon } => {
			if let Ok(mut spec) = knife_query.get_mut(weapon) {
				spec.pierce += 1;
			}
		}
		UpgradeAction::AxeBlade { weapon } => {
			if weapons::blade_count(&blade_query, weapon) < AXE_MAX_BLADES {
				weapons::orbit::spawn_blade(&mut commands, weapon);
			}
		}
		UpgradeAction::FlamethrowerRange { weapon, amount } => {
			if let Ok(mut spec) = flame_query.get_mut(weapon) {
				spec.range += amount;
			}
		}
		UpgradeAction::FlamethrowerBurn { weapon, extend_ms } => {
			if let Ok(mut spec) = flame_query.get_mut(weapon) {
				spec.burn_duration_ms += extend_ms;
			}
		}
		UpgradeAction::PlayerMoveSpeed => {
			if let Ok((mut player, _)) = player_query.get_single_mut() {
				player.move_speed += MOVE_SPEED_UPGRADE;
			}
		}
		UpgradeAction::PlayerPickupRadius => {
			if let Ok((mut player, _)) = player_query.get_single_mut() {
				player.pickup_radius += PICKUP_RADIUS_UPGRADE;
			}
		}
		UpgradeAction::PlayerMaxHealth => {
			if let Ok((_, mut health)) = player_query.get_single_mut() {
				health.total += MAX_HEALTH_UPGRADE;
				health.heal(MAX_HEALTH_UPGRADE);
			}
		}
	}

	if queue.hands.is_empty() {
		next_state.set(crate::RunState::Running);
	} else {
		redeal.0 = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn snapshot(id: WeaponId, fire_rate_ms: u32, blade_count: usize) -> WeaponSnapshot {
		WeaponSnapshot {
			entity: Entity::from_raw(1),
			id,
			fire_rate_ms,
			blade_count,
		}
	}

	#[test]
	fn base_pool_offers_player_stats_and_all_unequipped_weapons() {
		let pool = build_upgrade_pool(&[]);
		let equips = pool
			.iter()
			.filter(|choice| matches!(choice.action, UpgradeAction::EquipWeapon(_)))
			.count();

		assert_eq!(equips, WeaponId::ALL.len());
		assert_eq!(pool.len(), 3 + WeaponId::ALL.len());
	}

	#[test]
	fn full_loadout_offers_no_equips() {
		let loadout = [
			snapshot(WeaponId::Knife, 500, 0),
			snapshot(WeaponId::Axe, 0, 1),
			snapshot(WeaponId::Bow, 1500, 0),
			snapshot(WeaponId::Sickle, 2000, 0),
		];
		let pool = build_upgrade_pool(&loadout);

		assert!(!pool
			.iter()
			.any(|choice| matches!(choice.action, UpgradeAction::EquipWeapon(_))));
	}

	#[test]
	fn axe_at_blade_cap_offers_no_extra_blade() {
		let pool = build_upgrade_pool(&[snapshot(WeaponId::Axe, 0, AXE_MAX_BLADES)]);
		assert!(!pool
			.iter()
			.any(|choice| matches!(choice.action, UpgradeAction::AxeBlade { .. })));
	}

	#[test]
	fn fire_rate_option_drops_out_at_floor() {
		let pool = build_upgrade_pool(&[snapshot(WeaponId::Hatchet, HATCHET_MIN_FIRE_RATE_MS, 0)]);
		assert!(!pool
			.iter()
			.any(|choice| matches!(choice.action, UpgradeAction::WeaponFireRate { .. })));
	}

	#[test]
	fn dealt_hand_never_exceeds_pool_or_repeats() {
		let mut rng = GameRng::from_seed(9);
		let pool = build_upgrade_pool(&[snapshot(WeaponId::Knife, 500, 0)]);
		let pool_len = pool.len();
		let hand = deal_choices(pool, &mut rng);

		assert_eq!(hand.len(), UPGRADE_CHOICE_COUNT.min(pool_len));
		for (i, a) in hand.iter().enumerate() {
			for b in hand.iter().skip(i + 1) {
				assert!(a.title != b.title);
			}
		}
	}

	// Two hands from one level-up batch can each offer a different new
	// weapon; once the slots fill, the later equip must be a no-op.
	#[test]
	fn equip_beyond_slot_cap_is_wasted() {
		let mut app = App::new();
		app.add_plugins(bevy::state::app::StatesPlugin);
		app.init_state::<crate::RunState>();
		app.add_event::<UpgradeChosen>();
		app.add_event::<UpgradeChoicesReady>();
		app.init_resource::<OfferedUpgrades>();
		app.init_resource::<RedealRequested>();
		app.init_resource::<LevelUpQueue>();
		app.add_systems(Update, apply_chosen_upgrade);

		for id in [WeaponId::Knife, WeaponId::Bow, WeaponId::Hatchet, WeaponId::Sickle] {
			app.world_mut()
				.spawn(weapons::Weapon::new(id, 10.0, 500, 0.0));
		}
		app.world_mut().resource_mut::<OfferedUpgrades>().0 = vec![choice(
			"Shield",
			"Equip the Shield",
			UpgradeAction::EquipWeapon(WeaponId::Shield),
		)];
		app.world_mut().send_event(UpgradeChosen(0));
		app.update();

		let count = app
			.world_mut()
			.query::<&weapons::Weapon>()
			.iter(app.world())
			.count();
		assert_eq!(count, MAX_EQUIPPED_WEAPONS);
	}

	#[test]
	fn tiny_pool_deals_short_hand() {
		let mut rng = GameRng::from_seed(3);
		let pool = vec![choice("Vitality", "", UpgradeAction::PlayerMaxHealth)];
		let hand = deal_choices(pool, &mut rng);
		assert_eq!(hand.len(), 1);
	}
}
