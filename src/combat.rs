use bevy::prelude::*;

use crate::enemy::{Dying, Enemy};
use crate::physics::{circles_overlap, Collider, Knockback, Velocity};
use crate::projectiles::{HitTracker, Projectile};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
	fn build(&self, app: &mut App) {
		app.add_event::<EnemyDamaged>()
			.add_event::<DamageNumber>()
			.add_event::<RunEnded>()
			.add_systems(
				Update,
				(
					resolve_projectile_hits,
					tick_burns,
					apply_enemy_damage,
					apply_contact_damage,
				)
					.chain()
					.in_set(crate::physics::CombatSet),
			);
	}
}

#[derive(Component)]
pub struct Health {
	pub current: f32,
	pub total: f32,
}

impl Health {
	pub fn new(total: f32) -> Self {
		Self {
			current: total,
			total,
		}
	}

	/// Clamps at zero. A no-op once dead, so overlapping same-tick hits
	/// cannot re-trigger death effects.
	pub fn apply_damage(&mut self, amount: f32) {
		if self.is_dead() {
			return;
		}
		self.current = (self.current - amount).max(0.0);
	}

	pub fn heal(&mut self, amount: f32) {
		self.current = (self.current + amount).min(self.total);
	}

	pub fn is_dead(&self) -> bool {
		self.current <= 0.0
	}
}

/// Damage request against an enemy. Projectile hits, area scans and burn
/// ticks all funnel through this event; one system applies them in order.
#[derive(Event)]
pub struct EnemyDamaged {
	pub enemy: Entity,
	pub amount: f32,
	pub origin: Vec2,
	pub knockback: f32,
	pub weapon: Entity,
}

/// Feedback for the presentation layer: where to float a damage number.
#[derive(Event)]
pub struct DamageNumber {
	pub position: Vec2,
	pub amount: f32,
}

#[derive(Clone)]
pub struct WeaponSummary {
	pub name: &'static str,
	pub total_damage: f32,
	pub dps: f32,
}

/// Emitted once when the player dies; drives the end-of-run summary.
#[derive(Event)]
pub struct RunEnded {
	pub kills: u32,
	pub weapons: Vec<WeaponSummary>,
}

/// Damage-over-time from the flamethrower: repeated delayed damage ticks.
#[derive(Component)]
pub struct Burning {
	pub tick_timer: Timer,
	pub ticks_remaining: u32,
	pub damage_per_tick: f32,
	pub weapon: Entity,
}

fn resolve_projectile_hits(
	mut commands: Commands,
	mut projectile_query: Query<(
		Entity,
		&Transform,
		&Collider,
		&mut Projectile,
		&mut HitTracker,
	)>,
	enemy_query: Query<(Entity, &Transform, &Collider), (With<Enemy>, Without<Projectile>, Without<Dying>)>,
	mut damage_events: EventWriter<EnemyDamaged>,
) {
	for (projectile_entity, projectile_transform, projectile_collider, mut projectile, mut tracker) in
		projectile_query.iter_mut()
	{
		let projectile_pos = projectile_transform.translation.truncate();

		for (enemy_entity, enemy_transform, enemy_collider) in enemy_query.iter() {
			let enemy_pos = enemy_transform.translation.truncate();

			if !circles_overlap(
				projectile_pos,
				projectile_collider.radius,
				enemy_pos,
				enemy_collider.radius * enemy_transform.scale.x,
			) {
				continue;
			}
			if tracker.recently_hit(enemy_entity) {
				continue;
			}

			tracker.register(enemy_entity);
			damage_events.send(EnemyDamaged {
				enemy: enemy_entity,
				amount: projectile.damage,
				origin: projectile_pos,
				knockback: projectile.knockback,
				weapon: projectile.owner,
			});

			if let Some(ref mut pierce) = projectile.pierce_remaining {
				*pierce = pierce.saturating_sub(1);
				if *pierce == 0 {
					commands.entity(projectile_entity).despawn();
					break;
				}
			}
		}
	}
}

fn tick_burns(
	mut commands: Commands,
	mut burn_query: Query<(Entity, &Transform, &mut Burning), (With<Enemy>, Without<Dying>)>,
	mut damage_events: EventWriter<EnemyDamaged>,
	time: Res<Time<Virtual>>,
) {
	for (entity, transform, mut burning) in burn_query.iter_mut() {
		if !burning.tick_timer.tick(time.delta()).just_finished() {
			continue;
		}

		damage_events.send(EnemyDamaged {
			enemy: entity,
			amount: burning.damage_per_tick,
			origin: transform.translation.truncate(),
			knockback: 0.0,
			weapon: burning.weapon,
		});

		burning.ticks_remaining = burning.ticks_remaining.saturating_sub(1);
		if burning.ticks_remaining == 0 {
			commands.entity(entity).remove::<Burning>();
		}
	}
}

pub fn apply_enemy_damage(
	mut commands: Commands,
	mut damage_events: EventReader<EnemyDamaged>,
	mut enemy_query: Query<
		(&Transform, &mut Enemy, &mut Health, Option<&mut Velocity>, Has<Knockback>),
		Without<Dying>,
	>,
	mut weapon_query: Query<&mut crate::weapons::Weapon>,
	mut number_events: EventWriter<DamageNumber>,
) {
	for event in damage_events.read() {
		let Ok((transform, mut enemy, mut health, velocity, has_knockback)) =
			enemy_query.get_mut(event.enemy)
		else {
			continue;
		};
		// Further hits on an already-dead enemy are no-ops.
		if health.is_dead() {
			continue;
		}

		health.apply_damage(event.amount);

		if let Ok(mut weapon) = weapon_query.get_mut(event.weapon) {
			weapon.total_damage_dealt += event.amount;
		}

		let enemy_pos = transform.translation.truncate();
		enemy.speed = crate::constants::STAGGER_SPEED.min(enemy.base_speed);
		commands.entity(event.enemy).insert((
			crate::enemy::Stagger::new(),
			crate::enemy::HitFlash {
				timer: Timer::from_seconds(crate::constants::HIT_FLASH_SECS, TimerMode::Once),
				base_color: enemy.kind.stats().color,
			},
		));

		if event.knockback > 0.0 && !has_knockback {
			let mut direction = (enemy_pos - event.origin).normalize_or_zero();
			if direction == Vec2::ZERO {
				direction = Vec2::X;
			}
			// Normal steering is suspended for the whole displacement, so the
			// last chase velocity must not keep integrating underneath it.
			if let Some(mut velocity) = velocity {
				velocity.x = 0.0;
				velocity.y = 0.0;
			}
			commands
				.entity(event.enemy)
				.insert(Knockback::new(direction, event.knockback));
		}

		number_events.send(DamageNumber {
			position: enemy_pos,
			amount: event.amount,
		});
	}
}

fn apply_contact_damage(
	mut commands: Commands,
	mut player_query: Query<
		(Entity, &Transform, &Collider, &mut Health, &crate::player::Player),
		Without<crate::player::Immunity>,
	>,
	enemy_query: Query<(&Transform, &Collider, &Enemy), Without<Dying>>,
	weapon_query: Query<&crate::weapons::Weapon>,
	mut run_ended: EventWriter<RunEnded>,
	mut next_state: ResMut<NextState<crate::RunState>>,
) {
	let Ok((player_entity, player_transform, player_collider, mut health, player)) =
		player_query.get_single_mut()
	else {
		return;
	};
	let player_pos = player_transform.translation.truncate();

	for (enemy_transform, enemy_collider, enemy) in enemy_query.iter() {
		if !circles_overlap(
			player_pos,
			player_collider.radius,
			enemy_transform.translation.truncate(),
			enemy_collider.radius * enemy_transform.scale.x,
		) {
			continue;
		}

		health.apply_damage(enemy.damage);
		commands
			.entity(player_entity)
			.insert(crate::player::Immunity::new());

		if health.is_dead() {
			let weapons = weapon_query.iter().map(weapon_summary).collect();
			run_ended.send(RunEnded {
				kills: player.kill_count,
				weapons,
			});
			next_state.set(crate::RunState::GameOver);
		}

		// Immunity starts immediately; at most one contact hit per window.
		break;
	}
}

fn weapon_summary(weapon: &crate::weapons::Weapon) -> WeaponSummary {
	WeaponSummary {
		name: weapon.id.display_name(),
		total_damage: weapon.total_damage_dealt,
		dps: weapon_dps(weapon.total_damage_dealt, weapon.time_equipped_secs),
	}
}

/// Guards the zero-duration case for weapons equipped on the final frame.
pub fn weapon_dps(total_damage: f32, time_equipped_secs: f32) -> f32 {
	if time_equipped_secs <= 0.0 {
		0.0
	} else {
		total_damage / time_equipped_secs
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_health_clamps_at_zero() {
		let mut health = Health::new(40.0);
		health.apply_damage(15.0);
		health.apply_damage(15.0);
		assert_eq!(health.current, 10.0);
		health.apply_damage(15.0);
		assert_eq!(health.current, 0.0);
	}

	#[test]
	fn test_damage_after_death_is_noop() {
		let mut health = Health::new(40.0);
		health.apply_damage(100.0);
		assert!(health.is_dead());
		health.apply_damage(10.0);
		assert_eq!(health.current, 0.0);
		assert!(health.is_dead());
	}

	#[test]
	fn test_heal_clamps_at_total() {
		let mut health = Health::new(100.0);
		health.apply_damage(30.0);
		health.heal(50.0);
		assert_eq!(health.current, 100.0);
	}

	#[test]
	fn test_dps_guards_zero_duration() {
		assert_eq!(weapon_dps(500.0, 0.0), 0.0);
		assert_eq!(weapon_dps(500.0, 10.0), 50.0);
	}

	// Same-tick multi-hit behavior at the ECS level: three pierce-1
	// projectiles overlapping one 40 hp enemy in a single update must clamp
	// health to zero and leave each projectile despawned after its one hit.
	#[test]
	fn test_three_overlapping_hits_one_tick() {
		let mut app = App::new();
		app.add_event::<EnemyDamaged>();
		app.add_event::<DamageNumber>();
		app.add_systems(Update, (resolve_projectile_hits, apply_enemy_damage).chain());

		let enemy = app
			.world_mut()
			.spawn((
				Transform::default(),
				Collider { radius: 10.0 },
				Enemy {
					kind: crate::enemy::EnemyKind::Basic,
					speed: 100.0,
					base_speed: 100.0,
					damage: 5.0,
					xp: 3,
					xp_drop_chance: 0.7,
				},
				Health::new(40.0),
			))
			.id();

		let weapon = app
			.world_mut()
			.spawn(crate::weapons::Weapon::new(
				crate::weapons::WeaponId::Knife,
				15.0,
				500,
				0.0,
			))
			.id();

		let mut projectiles = Vec::new();
		for _ in 0..3 {
			let id = app
				.world_mut()
				.spawn((
					Transform::default(),
					Collider { radius: 5.0 },
					Projectile {
						damage: 15.0,
						pierce_remaining: Some(1),
						knockback: 0.0,
						owner: weapon,
					},
					HitTracker::once_per_enemy(),
				))
				.id();
			projectiles.push(id);
		}

		app.update();

		let health = app.world().get::<Health>(enemy).unwrap();
		assert_eq!(health.current, 0.0);
		for id in projectiles {
			assert!(app.world().get_entity(id).is_err(), "pierce-1 projectile should despawn");
		}
		// Telemetry counts all three hit attempts that landed before death.
		let weapon = app.world().get::<crate::weapons::Weapon>(weapon).unwrap();
		assert_eq!(weapon.total_damage_dealt, 45.0);
	}

	// A scaled enemy's reach is its base radius times the transform scale,
	// applied once. A Huge enemy (scale 3) with a 5 px projectile reaches
	// 35 px, so a projectile 50 px out must miss and one 30 px out must hit.
	#[test]
	fn test_scaled_enemy_reach_applies_scale_once() {
		let mut app = App::new();
		app.add_event::<EnemyDamaged>();
		app.add_event::<DamageNumber>();
		app.add_systems(Update, (resolve_projectile_hits, apply_enemy_damage).chain());

		let stats = crate::enemy::EnemyKind::Huge.stats();
		let enemy = app
			.world_mut()
			.spawn((
				Transform::default().with_scale(Vec3::splat(stats.scale)),
				Collider { radius: 10.0 },
				Enemy {
					kind: crate::enemy::EnemyKind::Huge,
					speed: stats.speed,
					base_speed: stats.speed,
					damage: stats.damage,
					xp: stats.xp,
					xp_drop_chance: stats.xp_drop_chance,
				},
				Health::new(stats.health),
			))
			.id();

		let weapon = app
			.world_mut()
			.spawn(crate::weapons::Weapon::new(
				crate::weapons::WeaponId::Knife,
				15.0,
				500,
				0.0,
			))
			.id();

		for x in [50.0, 30.0] {
			app.world_mut().spawn((
				Transform::from_xyz(x, 0.0, 0.0),
				Collider { radius: 5.0 },
				Projectile {
					damage: 15.0,
					pierce_remaining: Some(1),
					knockback: 0.0,
					owner: weapon,
				},
				HitTracker::once_per_enemy(),
			));
		}

		app.update();

		let health = app.world().get::<Health>(enemy).unwrap();
		assert_eq!(health.current, stats.health - 15.0, "only the 30px projectile lands");
	}

	// Knockback takes direct control of the enemy: the chase velocity is
	// cleared at insertion so the enemy cannot drift toward the damage
	// origin while displaced.
	#[test]
	fn test_knockback_clears_chase_velocity() {
		let mut app = App::new();
		app.add_event::<EnemyDamaged>();
		app.add_event::<DamageNumber>();
		app.add_systems(Update, apply_enemy_damage);

		let weapon = app
			.world_mut()
			.spawn(crate::weapons::Weapon::new(
				crate::weapons::WeaponId::Hatchet,
				8.0,
				2500,
				5.0,
			))
			.id();
		let enemy = app
			.world_mut()
			.spawn((
				Transform::from_xyz(100.0, 0.0, 0.0),
				Enemy {
					kind: crate::enemy::EnemyKind::Basic,
					speed: 130.0,
					base_speed: 130.0,
					damage: 5.0,
					xp: 3,
					xp_drop_chance: 0.7,
				},
				Health::new(40.0),
				Velocity { x: -130.0, y: 0.0 },
			))
			.id();

		app.world_mut().send_event(EnemyDamaged {
			enemy,
			amount: 8.0,
			origin: Vec2::ZERO,
			knockback: 5.0,
			weapon,
		});
		app.update();

		let velocity = app.world().get::<Velocity>(enemy).unwrap();
		assert_eq!(velocity.x, 0.0);
		assert_eq!(velocity.y, 0.0);
		assert!(app.world().get::<Knockback>(enemy).is_some());
	}
}
