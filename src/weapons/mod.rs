use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::*;

pub mod area;
pub mod bow;
pub mod melee;
pub mod orbit;
pub mod ranged;

pub use orbit::blade_count;

pub struct WeaponsPlugin;

impl Plugin for WeaponsPlugin {
	fn build(&self, app: &mut App) {
		app.add_event::<WeaponFired>()
			.add_systems(
				Update,
				(bow::aim_bows, orbit::update_blades, melee::update_swings)
					.in_set(crate::physics::MovementSet),
			)
			.add_systems(
				Update,
				(
					tick_weapons,
					ranged::fire_knives,
					ranged::fire_pending_volleys,
					ranged::fire_hatchets,
					ranged::fire_shields,
					bow::fire_bows,
					melee::start_swings,
					area::fire_flamethrowers,
				)
					.chain()
					.in_set(crate::physics::CombatSet)
					.before(crate::combat::apply_enemy_damage),
			);
	}
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WeaponId {
	Knife,
	Axe,
	Bow,
	Hatchet,
	Sickle,
	Shield,
	Flamethrower,
}

impl WeaponId {
	pub const ALL: [WeaponId; 7] = [
		WeaponId::Knife,
		WeaponId::Axe,
		WeaponId::Bow,
		WeaponId::Hatchet,
		WeaponId::Sickle,
		WeaponId::Shield,
		WeaponId::Flamethrower,
	];

	pub fn display_name(&self) -> &'static str {
		match self {
			Self::Knife => "Knife",
			Self::Axe => "Axe",
			Self::Bow => "Bow",
			Self::Hatchet => "Hatchet",
			Self::Sickle => "Sickle",
			Self::Shield => "Shield",
			Self::Flamethrower => "Flamethrower",
		}
	}
}

/// Shared weapon state. Each equipped weapon is its own entity carrying this
/// plus a per-variant spec component. At most one entity per `WeaponId` may
/// exist; equip sites and the upgrade pipeline maintain that invariant.
#[derive(Component)]
pub struct Weapon {
	pub id: WeaponId,
	pub damage: f32,
	pub fire_rate_ms: u32,
	pub knockback: f32,
	pub total_damage_dealt: f32,
	pub time_equipped_secs: f32,
	pub cooldown: Timer,
}

impl Weapon {
	pub fn new(id: WeaponId, damage: f32, fire_rate_ms: u32, knockback: f32) -> Self {
		Self {
			id,
			damage,
			fire_rate_ms,
			knockback,
			total_damage_dealt: 0.0,
			time_equipped_secs: 0.0,
			cooldown: Timer::from_seconds(fire_rate_ms as f32 / 1000.0, TimerMode::Repeating),
		}
	}

	/// Fire-rate changes only take effect through here: the running timer is
	/// dropped and a fresh one installed at the current rate, the same
	/// cancel-and-reinstall the original unequip/equip pair performed.
	pub fn reinstall_cooldown(&mut self) {
		self.cooldown =
			Timer::from_seconds(self.fire_rate_ms as f32 / 1000.0, TimerMode::Repeating);
	}
}

/// A weapon's repeating fire timer elapsed this frame.
#[derive(Event)]
pub struct WeaponFired {
	pub weapon: Entity,
}

pub fn equip_weapon(commands: &mut Commands, id: WeaponId) -> Entity {
	match id {
		WeaponId::Knife => commands
			.spawn((
				Weapon::new(id, KNIFE_DAMAGE, KNIFE_FIRE_RATE_MS, 0.0),
				ranged::KnifeSpec::default(),
			))
			.id(),
		WeaponId::Axe => {
			let weapon = commands
				.spawn((Weapon::new(id, AXE_DAMAGE, 0, 0.0), orbit::AxeSpec::default()))
				.id();
			orbit::spawn_blade(commands, weapon);
			weapon
		}
		WeaponId::Bow => commands
			.spawn((
				Weapon::new(id, BOW_DAMAGE, BOW_FIRE_RATE_MS, 0.0),
				bow::BowSpec::default(),
			))
			.id(),
		WeaponId::Hatchet => commands
			.spawn((
				Weapon::new(id, HATCHET_DAMAGE, HATCHET_FIRE_RATE_MS, HATCHET_KNOCKBACK),
				ranged::HatchetSpec::default(),
			))
			.id(),
		WeaponId::Sickle => commands
			.spawn((
				Weapon::new(id, SICKLE_DAMAGE, SICKLE_FIRE_RATE_MS, SICKLE_KNOCKBACK),
				melee::SickleSpec::default(),
			))
			.id(),
		WeaponId::Shield => commands
			.spawn((
				Weapon::new(id, SHIELD_DAMAGE, SHIELD_FIRE_RATE_MS, SHIELD_KNOCKBACK),
				ranged::ShieldSpec::default(),
			))
			.id(),
		WeaponId::Flamethrower => commands
			.spawn((
				Weapon::new(
					id,
					FLAMETHROWER_DAMAGE,
					FLAMETHROWER_FIRE_RATE_MS,
					FLAMETHROWER_KNOCKBACK,
				),
				area::FlamethrowerSpec::default(),
			))
			.id(),
	}
}

fn tick_weapons(
	mut weapon_query: Query<(Entity, &mut Weapon)>,
	time: Res<Time<Virtual>>,
	mut fired: EventWriter<WeaponFired>,
) {
	for (entity, mut weapon) in weapon_query.iter_mut() {
		weapon.time_equipped_secs += time.delta_secs();

		// The axe orbits continuously and the sickle reschedules its own
		// swings; neither fires off the shared timer.
		if matches!(weapon.id, WeaponId::Axe | WeaponId::Sickle) {
			continue;
		}

		if weapon.cooldown.tick(time.delta()).just_finished() {
			fired.send(WeaponFired { weapon: entity });
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_reinstall_cooldown_picks_up_new_rate() {
		let mut weapon = Weapon::new(WeaponId::Knife, 10.0, 500, 0.0);
		weapon.fire_rate_ms = 450;
		weapon.reinstall_cooldown();
		assert_eq!(weapon.cooldown.duration().as_millis(), 450);
	}

	#[test]
	fn test_display_names_unique() {
		let mut names: Vec<_> = WeaponId::ALL.iter().map(|w| w.display_name()).collect();
		names.sort();
		names.dedup();
		assert_eq!(names.len(), WeaponId::ALL.len());
	}
}
