use bevy::prelude::*;
use std::time::Duration;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
	fn build(&self, app: &mut App) {
		app.add_systems(
			Update,
			(apply_deceleration, apply_spin, apply_arc_bounce)
				.in_set(crate::physics::MovementSet),
		)
		.add_systems(
			Update,
			(tick_hit_trackers, expire_lifespans).in_set(crate::physics::CleanupSet),
		);
	}
}

#[derive(Component)]
pub struct Projectile {
	pub damage: f32,
	/// Distinct-enemy hits left before the projectile destroys itself;
	/// `None` for projectiles that never pierce out (orbiting blades, swings).
	pub pierce_remaining: Option<u32>,
	pub knockback: f32,
	/// The weapon entity that fired this projectile, for damage telemetry.
	pub owner: Entity,
}

/// Recent-hit suppression. Overlap events re-fire every physics step while
/// two bodies intersect; entries here block re-hits, and expire after the
/// weapon's re-hit window so repeat passes still deal damage.
#[derive(Component)]
pub struct HitTracker {
	hits: Vec<(Entity, Option<Timer>)>,
	rehit_window: Option<Duration>,
}

impl HitTracker {
	/// Entries expire after `window`, allowing the same enemy to be hit again.
	pub fn with_rehit_window(window: Duration) -> Self {
		Self {
			hits: Vec::new(),
			rehit_window: Some(window),
		}
	}

	/// Entries never expire; each enemy can be hit at most once.
	pub fn once_per_enemy() -> Self {
		Self {
			hits: Vec::new(),
			rehit_window: None,
		}
	}

	pub fn recently_hit(&self, enemy: Entity) -> bool {
		self.hits.iter().any(|(e, _)| *e == enemy)
	}

	pub fn register(&mut self, enemy: Entity) {
		let timer = self
			.rehit_window
			.map(|window| Timer::new(window, TimerMode::Once));
		self.hits.push((enemy, timer));
	}

	pub fn tick(&mut self, delta: Duration) {
		self.hits.retain_mut(|(_, timer)| match timer {
			Some(timer) => !timer.tick(delta).finished(),
			None => true,
		});
	}
}

/// Despawn after a fixed duration.
#[derive(Component)]
pub struct Lifespan(pub Timer);

impl Lifespan {
	pub fn new(secs: f32) -> Self {
		Self(Timer::from_seconds(secs, TimerMode::Once))
	}
}

/// Velocity decays toward (and past) zero along `accel`; the hatchet's
/// boomerang return.
#[derive(Component)]
pub struct Deceleration(pub Vec2);

#[derive(Component)]
pub struct Spin(pub f32);

/// Parabolic vertical motion: gravity pulls the projectile down until it
/// crosses `bounce_y`, where its vertical velocity is replaced by an upward
/// impulse. Repeats until the lifespan expires.
#[derive(Component)]
pub struct ArcBounce {
	pub gravity: f32,
	pub bounce_y: f32,
	pub impulse: f32,
}

fn apply_deceleration(
	mut query: Query<(&mut crate::physics::Velocity, &Deceleration)>,
	time: Res<Time<Virtual>>,
) {
	for (mut velocity, decel) in query.iter_mut() {
		velocity.x += decel.0.x * time.delta_secs();
		velocity.y += decel.0.y * time.delta_secs();
	}
}

fn apply_spin(mut query: Query<(&mut Transform, &Spin)>, time: Res<Time<Virtual>>) {
	for (mut transform, spin) in query.iter_mut() {
		transform.rotate_z(spin.0 * time.delta_secs());
	}
}

fn apply_arc_bounce(
	mut query: Query<(&Transform, &mut crate::physics::Velocity, &ArcBounce)>,
	time: Res<Time<Virtual>>,
) {
	for (transform, mut velocity, arc) in query.iter_mut() {
		velocity.y += arc.gravity * time.delta_secs();

		if transform.translation.y <= arc.bounce_y && velocity.y < 0.0 {
			velocity.y = arc.impulse;
		}
	}
}

fn tick_hit_trackers(mut query: Query<&mut HitTracker>, time: Res<Time<Virtual>>) {
	for mut tracker in query.iter_mut() {
		tracker.tick(time.delta());
	}
}

fn expire_lifespans(
	mut commands: Commands,
	mut query: Query<(Entity, &mut Lifespan)>,
	time: Res<Time<Virtual>>,
) {
	for (entity, mut lifespan) in query.iter_mut() {
		if lifespan.0.tick(time.delta()).just_finished() {
			commands.entity(entity).despawn();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn enemy(index: u32) -> Entity {
		Entity::from_raw(index)
	}

	#[test]
	fn test_tracker_blocks_rehit_within_window() {
		let mut tracker = HitTracker::with_rehit_window(Duration::from_millis(1000));
		tracker.register(enemy(1));
		assert!(tracker.recently_hit(enemy(1)));
		assert!(!tracker.recently_hit(enemy(2)));

		tracker.tick(Duration::from_millis(500));
		assert!(tracker.recently_hit(enemy(1)));
	}

	#[test]
	fn test_tracker_allows_rehit_after_window() {
		let mut tracker = HitTracker::with_rehit_window(Duration::from_millis(150));
		tracker.register(enemy(1));
		tracker.tick(Duration::from_millis(151));
		assert!(!tracker.recently_hit(enemy(1)));
	}

	#[test]
	fn test_once_per_enemy_never_expires() {
		let mut tracker = HitTracker::once_per_enemy();
		tracker.register(enemy(1));
		tracker.tick(Duration::from_secs(3600));
		assert!(tracker.recently_hit(enemy(1)));
	}

	#[test]
	fn test_tracker_entries_expire_independently() {
		let mut tracker = HitTracker::with_rehit_window(Duration::from_millis(100));
		tracker.register(enemy(1));
		tracker.tick(Duration::from_millis(60));
		tracker.register(enemy(2));
		tracker.tick(Duration::from_millis(60));
		assert!(!tracker.recently_hit(enemy(1)));
		assert!(tracker.recently_hit(enemy(2)));
	}
}
