//! The one-shot door sequence: proximity trigger, door slide, fade, switch.

use crate::config::DoorConfig;
use glam::Vec3;
use labwalk_common::damp;
use serde::{Deserialize, Serialize};

/// Forward-only states of the entrance sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TriggerState {
    Idle,
    DoorOpening,
    FadingOut,
    SceneSwitched,
}

impl TriggerState {
    /// The state a pending countdown leads to, if any.
    fn after_countdown(self) -> Option<TriggerState> {
        match self {
            Self::DoorOpening => Some(Self::FadingOut),
            Self::FadingOut => Some(Self::SceneSwitched),
            Self::Idle | Self::SceneSwitched => None,
        }
    }
}

/// A delayed transition measured in simulation seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Countdown {
    remaining: f32,
}

impl Countdown {
    fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Advance by `dt`. Once elapsed, returns how far past zero it ran.
    fn tick(&mut self, dt: f32) -> Option<f32> {
        self.remaining -= dt;
        (self.remaining <= 0.0).then_some(-self.remaining)
    }
}

/// Door proximity trigger followed by timed fade-out and scene switch.
#[derive(Debug, Clone)]
pub struct DoorSequence {
    config: DoorConfig,
    state: TriggerState,
    pending: Option<Countdown>,
    state_time: f32,
    leaf_x: f32,
    cancelled: bool,
}

impl DoorSequence {
    pub fn new(config: &DoorConfig) -> Self {
        Self {
            config: config.clone(),
            state: TriggerState::Idle,
            pending: None,
            state_time: 0.0,
            leaf_x: config.leaf_closed_x,
            cancelled: false,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn is_triggered(&self) -> bool {
        self.state != TriggerState::Idle
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Seconds spent in the current state.
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    /// Seconds until the next scheduled transition.
    pub fn pending_remaining(&self) -> Option<f32> {
        self.pending.map(|c| c.remaining.max(0.0))
    }

    pub fn in_range(&self, position: Vec3) -> bool {
        position.distance(self.config.position) < self.config.trigger_radius
    }

    /// X of the left leaf centre relative to the door axis.
    pub fn left_leaf_x(&self) -> f32 {
        -self.leaf_x
    }

    pub fn right_leaf_x(&self) -> f32 {
        self.leaf_x
    }

    /// Opacity of the fade overlay in `[0, 1]`.
    pub fn fade_alpha(&self) -> f32 {
        let ramp = (self.state_time / self.config.fade_in).clamp(0.0, 1.0);
        match self.state {
            TriggerState::FadingOut => ramp,
            TriggerState::SceneSwitched => 1.0 - ramp,
            TriggerState::Idle | TriggerState::DoorOpening => 0.0,
        }
    }

    /// Drop any scheduled transition. The sequence stays in its current state.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!(state = ?self.state, "door sequence cancelled");
        }
        self.cancelled = true;
    }

    /// Advance by `dt` with the avatar at `avatar_position`. Returns the state
    /// entered during this update, if any.
    pub fn update(&mut self, dt: f32, avatar_position: Vec3) -> Option<TriggerState> {
        let entered = self.advance(dt, avatar_position);
        if let Some((state, overshoot)) = entered {
            self.state = state;
            self.state_time = overshoot;
        } else {
            self.state_time += dt;
        }

        if self.state != TriggerState::Idle {
            let t = damp(self.config.leaf_speed, dt);
            self.leaf_x += (self.config.leaf_open_x - self.leaf_x) * t;
        }
        entered.map(|(state, _)| state)
    }

    /// The state entered this update and the time already spent in it.
    fn advance(&mut self, dt: f32, avatar_position: Vec3) -> Option<(TriggerState, f32)> {
        if self.cancelled {
            return None;
        }
        match self.state {
            TriggerState::Idle => {
                if !self.in_range(avatar_position) {
                    return None;
                }
                tracing::info!(position = %avatar_position, "door triggered");
                self.pending = Some(Countdown::new(self.config.open_delay));
                Some((TriggerState::DoorOpening, 0.0))
            }
            TriggerState::DoorOpening | TriggerState::FadingOut => {
                let overshoot = self.pending.as_mut().and_then(|c| c.tick(dt))?;
                let next = self.state.after_countdown()?;
                self.pending = match next {
                    TriggerState::FadingOut => {
                        Some(Countdown::new(self.config.fade_duration - overshoot))
                    }
                    _ => None,
                };
                tracing::info!(from = ?self.state, to = ?next, "door sequence advanced");
                Some((next, overshoot))
            }
            TriggerState::SceneSwitched => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.05;
    const AT_DOOR: Vec3 = Vec3::new(0.0, 0.0, 10.0);
    const FAR: Vec3 = Vec3::new(0.0, 0.0, -10.0);

    fn run(seq: &mut DoorSequence, seconds: f32, pos: Vec3) -> Vec<TriggerState> {
        let steps = (seconds / DT).round() as usize;
        (0..steps).filter_map(|_| seq.update(DT, pos)).collect()
    }

    #[test]
    fn idle_until_in_range() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        assert!(run(&mut seq, 5.0, FAR).is_empty());
        assert_eq!(seq.state(), TriggerState::Idle);
        assert_eq!(seq.right_leaf_x(), 1.9);
        assert_eq!(seq.fade_alpha(), 0.0);
    }

    #[test]
    fn radius_boundary_is_exclusive() {
        let seq = DoorSequence::new(&DoorConfig::default());
        assert!(!seq.in_range(Vec3::new(0.0, 0.0, 8.0)));
        assert!(seq.in_range(Vec3::new(0.0, 0.0, 8.01)));
    }

    #[test]
    fn full_sequence_on_simulation_time() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        assert_eq!(seq.update(DT, AT_DOOR), Some(TriggerState::DoorOpening));
        assert!((seq.pending_remaining().unwrap() - 2.0).abs() < 1e-6);

        let entered = run(&mut seq, 1.9, FAR);
        assert!(entered.is_empty());
        assert_eq!(seq.state(), TriggerState::DoorOpening);
        assert!(seq.right_leaf_x() > 4.5);
        assert!(seq.left_leaf_x() < -4.5);

        let entered = run(&mut seq, 0.2, FAR);
        assert_eq!(entered, vec![TriggerState::FadingOut]);

        let entered = run(&mut seq, 1.6, FAR);
        assert_eq!(entered, vec![TriggerState::SceneSwitched]);
        assert!(seq.pending_remaining().is_none());
    }

    #[test]
    fn overshoot_carries_into_the_fade() {
        // Steps of 5/8 s keep the arithmetic exact.
        let dt = 0.625;
        let mut seq = DoorSequence::new(&DoorConfig::default());
        assert_eq!(seq.update(dt, AT_DOOR), Some(TriggerState::DoorOpening));

        let entered: Vec<_> = (0..4).filter_map(|_| seq.update(dt, FAR)).collect();
        assert_eq!(entered, vec![TriggerState::FadingOut]);
        assert_eq!(seq.state_time(), 0.5);
        assert_eq!(seq.pending_remaining(), Some(1.0));

        // 3.75 s after the trigger, the first step past open_delay + fade_duration.
        assert_eq!(seq.update(dt, FAR), None);
        assert_eq!(seq.update(dt, FAR), Some(TriggerState::SceneSwitched));
    }

    #[test]
    fn trigger_is_one_shot() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        seq.update(DT, AT_DOOR);
        let before = seq.pending_remaining().unwrap();
        // Leave and re-enter the radius: the countdown is not restarted.
        seq.update(DT, FAR);
        seq.update(DT, AT_DOOR);
        let after = seq.pending_remaining().unwrap();
        assert!(after < before);

        let mut entered = run(&mut seq, 10.0, AT_DOOR);
        entered.dedup();
        assert_eq!(
            entered,
            vec![TriggerState::FadingOut, TriggerState::SceneSwitched]
        );
        assert!(run(&mut seq, 10.0, AT_DOOR).is_empty());
        assert_eq!(seq.state(), TriggerState::SceneSwitched);
    }

    #[test]
    fn states_only_move_forward() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        let mut last = seq.state();
        for i in 0..200 {
            let pos = if i % 3 == 0 { AT_DOOR } else { FAR };
            seq.update(DT, pos);
            assert!(seq.state() >= last);
            last = seq.state();
        }
    }

    #[test]
    fn fade_ramps_up_then_down() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        seq.update(DT, AT_DOOR);
        run(&mut seq, 2.05, FAR);
        assert_eq!(seq.state(), TriggerState::FadingOut);
        run(&mut seq, 0.5, FAR);
        let mid = seq.fade_alpha();
        assert!(mid > 0.3 && mid < 0.7);
        run(&mut seq, 0.9, FAR);
        assert_eq!(seq.fade_alpha(), 1.0);
        run(&mut seq, 0.2, FAR);
        assert_eq!(seq.state(), TriggerState::SceneSwitched);
        run(&mut seq, 2.0, FAR);
        assert_eq!(seq.fade_alpha(), 0.0);
    }

    #[test]
    fn cancel_stops_pending_transition() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        seq.update(DT, AT_DOOR);
        seq.cancel();
        assert!(seq.is_cancelled());
        assert!(seq.pending_remaining().is_none());
        assert!(run(&mut seq, 10.0, AT_DOOR).is_empty());
        assert_eq!(seq.state(), TriggerState::DoorOpening);
    }

    #[test]
    fn cancel_before_trigger_disarms() {
        let mut seq = DoorSequence::new(&DoorConfig::default());
        seq.cancel();
        assert!(run(&mut seq, 1.0, AT_DOOR).is_empty());
        assert_eq!(seq.state(), TriggerState::Idle);
    }
}
