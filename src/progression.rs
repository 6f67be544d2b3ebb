use bevy::prelude::*;
use std::collections::VecDeque;

use crate::constants::*;
use crate::pickups::XpGained;
use crate::upgrades::UpgradeChoice;

pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
	fn build(&self, app: &mut App) {
		app
			.add_event::<LeveledUp>()
			.init_resource::<Progress>()
			.init_resource::<LevelUpQueue>()
			.add_systems(
				Update,
				(absorb_experience, settle_level_ups)
					.chain()
					.in_set(crate::physics::CleanupSet),
			);
	}
}

/// Run-wide level and experience tally.
///
/// The threshold for the first level-up is a fixed constant; every later
/// threshold comes from `xp_to_next_level`. Overflow experience carries into
/// the next level, so one large orb can clear several levels at once.
#[derive(Resource)]
pub struct Progress {
	pub level: u32,
	pub experience: u32,
	pub xp_to_next_level: u32,
	pub xp_bonus_multiplier: f32,
}

impl Default for Progress {
	fn default() -> Self {
		Self {
			level: 1,
			experience: 0,
			xp_to_next_level: INITIAL_XP_TO_NEXT_LEVEL,
			xp_bonus_multiplier: 1.0,
		}
	}
}

impl Progress {
	/// Banks experience (scaled by the bonus multiplier) and returns how many
	/// levels it cleared.
	pub fn receive_xp(&mut self, amount: u32) -> u32 {
		self.experience += (amount as f32 * self.xp_bonus_multiplier).round() as u32;
		let mut levels_gained = 0;

		while self.experience >= self.xp_to_next_level {
			self.experience -= self.xp_to_next_level;
			self.level += 1;
			self.xp_to_next_level = xp_to_next_level(self.level);
			levels_gained += 1;
		}

		levels_gained
	}
}

pub fn xp_to_next_level(level: u32) -> u32 {
	level * 20 + ((level as f32).log2() * 3.0).ceil() as u32
}

/// One level-up was cleared. The upgrade module deals a hand of choices for
/// each of these, immediately, against the loadout as it stands right now.
#[derive(Event)]
pub struct LeveledUp;

/// Hands of upgrade choices waiting to be presented, oldest first. The
/// settle timer restarts on every level-up so a burst of them becomes one
/// pause instead of several.
#[derive(Resource, Default)]
pub struct LevelUpQueue {
	pub hands: VecDeque<Vec<UpgradeChoice>>,
	pub settle: Option<Timer>,
}

fn absorb_experience(
	mut xp_events: EventReader<XpGained>,
	mut progress: ResMut<Progress>,
	mut queue: ResMut<LevelUpQueue>,
	mut leveled: EventWriter<LeveledUp>,
) {
	for event in xp_events.read() {
		let levels_gained = progress.receive_xp(event.0);
		if levels_gained > 0 {
			debug!("level up: now {}", progress.level);
			for _ in 0..levels_gained {
				leveled.send(LeveledUp);
			}
			queue.settle = Some(Timer::from_seconds(
				LEVEL_UP_SETTLE_DELAY_SECS,
				TimerMode::Once,
			));
		}
	}
}

fn settle_level_ups(
	mut queue: ResMut<LevelUpQueue>,
	mut next_state: ResMut<NextState<crate::RunState>>,
	time: Res<Time<Virtual>>,
) {
	let Some(ref mut settle) = queue.settle else {
		return;
	};

	// Holds in the finished state until the dealt hands have landed, in case
	// the dealing system runs a frame behind.
	if settle.tick(time.delta()).finished() && !queue.hands.is_empty() {
		queue.settle = None;
		next_state.set(crate::RunState::Choosing);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_threshold_is_fixed() {
		let progress = Progress::default();
		assert_eq!(progress.level, 1);
		assert_eq!(progress.xp_to_next_level, 26);
	}

	#[test]
	fn thresholds_follow_the_level_curve() {
		assert_eq!(xp_to_next_level(2), 43);
		assert_eq!(xp_to_next_level(4), 86);
		assert_eq!(xp_to_next_level(8), 169);
	}

	#[test]
	fn overflow_experience_carries() {
		let mut progress = Progress::default();
		let gained = progress.receive_xp(30);

		assert_eq!(gained, 1);
		assert_eq!(progress.level, 2);
		assert_eq!(progress.experience, 4);
		assert_eq!(progress.xp_to_next_level, 43);
	}

	#[test]
	fn one_large_orb_clears_multiple_levels() {
		let mut progress = Progress::default();
		// 26 + 43 = 69 clears two levels with 1 left over.
		let gained = progress.receive_xp(70);

		assert_eq!(gained, 2);
		assert_eq!(progress.level, 3);
		assert_eq!(progress.experience, 1);
	}

	#[test]
	fn under_threshold_gains_no_level() {
		let mut progress = Progress::default();
		assert_eq!(progress.receive_xp(25), 0);
		assert_eq!(progress.level, 1);
		assert_eq!(progress.experience, 25);
	}

	#[test]
	fn bonus_multiplier_scales_incoming_xp() {
		let mut progress = Progress {
			xp_bonus_multiplier: 1.5,
			..Default::default()
		};
		progress.receive_xp(10);
		assert_eq!(progress.experience, 15);
	}
}
