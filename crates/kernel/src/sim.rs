use crate::avatar::Avatar;
use crate::camera::CameraRig;
use crate::config::{ConfigError, SimConfig};
use crate::controller::PlayerController;
use crate::layout::EntranceLayout;
use crate::trigger::{DoorSequence, TriggerState};
use glam::Vec3;
use labwalk_collision::CollisionSystem;
use labwalk_input::InputSnapshot;
use serde::{Deserialize, Serialize};

/// Something noteworthy that happened during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The avatar was pushed out of an obstacle.
    Collided { tick: u64, push: Vec3 },
    /// The avatar came within range of the door.
    DoorTriggered { tick: u64, position: Vec3 },
    FadeStarted { tick: u64 },
    SceneSwitched { tick: u64 },
}

/// The scene driver.
///
/// Owns every simulated part of the entrance and advances them in a fixed
/// order each frame: controller, avatar physics, camera, door trigger.
/// Presentation reads from it; nothing outside `step` moves the avatar.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    layout: EntranceLayout,
    collision: CollisionSystem,
    collision_enabled: bool,
    avatar: Avatar,
    controller: PlayerController,
    camera: CameraRig,
    door: DoorSequence,
    tick: u64,
    elapsed: f64,
    event_log: Vec<SimEvent>,
}

impl Simulation {
    /// Validate `config`, lay out the entrance, and place the avatar at spawn.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = EntranceLayout::build(&config.layout);
        let mut collision = CollisionSystem::with_mode(config.collision);
        layout.populate(&mut collision)?;
        tracing::info!(
            props = layout.props.len(),
            colliders = collision.len(),
            mode = ?collision.mode(),
            "simulation ready"
        );

        Ok(Self {
            avatar: Avatar::new(&config.avatar),
            controller: PlayerController::new(&config.controller),
            camera: CameraRig::new(&config.camera),
            door: DoorSequence::new(&config.door),
            layout,
            collision,
            collision_enabled: true,
            tick: 0,
            elapsed: 0.0,
            event_log: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn layout(&self) -> &EntranceLayout {
        &self.layout
    }

    pub fn collision(&self) -> &CollisionSystem {
        &self.collision
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    /// Mutable avatar access for placement before stepping.
    pub fn avatar_mut(&mut self) -> &mut Avatar {
        &mut self.avatar
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn door(&self) -> &DoorSequence {
        &self.door
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.door.state()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since start or last reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    /// Toggle obstacle resolution. With collisions off the avatar walks
    /// through props.
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        if self.collision_enabled != enabled {
            tracing::debug!(enabled, "collision toggled");
        }
        self.collision_enabled = enabled;
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Advance one frame of `dt` seconds with the given input.
    pub fn step(&mut self, dt: f32, input: &InputSnapshot) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.tick += 1;
        self.elapsed += f64::from(dt);

        self.controller
            .update(dt, input, &mut self.avatar, &mut self.camera);

        let collision = self.collision_enabled.then_some(&self.collision);
        if let Some(push) = self.avatar.update(dt, collision) {
            tracing::trace!(tick = self.tick, push = %push, "avatar pushed");
            self.event_log.push(SimEvent::Collided {
                tick: self.tick,
                push,
            });
        }

        self.camera.update(dt, &self.avatar);

        if let Some(entered) = self.door.update(dt, self.avatar.position) {
            let tick = self.tick;
            let event = match entered {
                TriggerState::DoorOpening => Some(SimEvent::DoorTriggered {
                    tick,
                    position: self.avatar.position,
                }),
                TriggerState::FadingOut => Some(SimEvent::FadeStarted { tick }),
                TriggerState::SceneSwitched => {
                    tracing::info!(tick, "scene switched");
                    Some(SimEvent::SceneSwitched { tick })
                }
                TriggerState::Idle => None,
            };
            self.event_log.extend(event);
        }
    }

    /// Put the avatar back at spawn and rearm the door. Obstacles stay.
    pub fn reset(&mut self) {
        self.avatar = Avatar::new(&self.config.avatar);
        self.controller = PlayerController::new(&self.config.controller);
        self.camera = CameraRig::new(&self.config.camera);
        self.door = DoorSequence::new(&self.config.door);
        self.tick = 0;
        self.elapsed = 0.0;
        self.event_log.clear();
        tracing::debug!("simulation reset");
    }

    /// Cancel outstanding timers. No transition fires after this.
    pub fn teardown(&mut self) {
        self.door.cancel();
    }

    /// Deterministic hash of the simulated state for replay comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: Vec3| {
            for c in v.to_array() {
                mix(h, &c.to_le_bytes());
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix_vec(&mut h, self.avatar.position);
        mix_vec(&mut h, self.avatar.velocity);
        mix(&mut h, &self.avatar.facing.to_le_bytes());
        mix(&mut h, &self.controller.yaw.to_le_bytes());
        mix(&mut h, &self.controller.pitch.to_le_bytes());
        mix_vec(&mut h, self.camera.position());
        mix(&mut h, &[self.door.state() as u8]);
        mix(&mut h, &self.door.right_leaf_x().to_le_bytes());
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn forward() -> InputSnapshot {
        InputSnapshot::moving(1.0, 0.0)
    }

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default()).unwrap()
    }

    #[test]
    fn starts_at_spawn() {
        let s = sim();
        assert_eq!(s.tick(), 0);
        assert_eq!(s.avatar().position, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(s.trigger_state(), TriggerState::Idle);
        assert!(!s.collision().is_empty());
        assert!(s.events().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SimConfig::default();
        config.avatar.radius = -1.0;
        assert!(matches!(
            Simulation::new(config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn walking_forward_reaches_the_door_and_switches_scene() {
        let mut s = sim();
        let mut steps = 0;
        while s.trigger_state() == TriggerState::Idle {
            s.step(DT, &forward());
            steps += 1;
            assert!(steps < 600, "never reached the door");
        }
        assert!(s.avatar().position.z > 8.0);
        assert!(matches!(
            s.events().last(),
            Some(SimEvent::DoorTriggered { .. })
        ));

        for _ in 0..240 {
            s.step(DT, &InputSnapshot::default());
        }
        assert_eq!(s.trigger_state(), TriggerState::SceneSwitched);
        let kinds: Vec<&SimEvent> = s
            .events()
            .iter()
            .filter(|e| !matches!(e, SimEvent::Collided { .. }))
            .collect();
        assert_eq!(kinds.len(), 3);
        assert!(matches!(kinds[1], SimEvent::FadeStarted { .. }));
        assert!(matches!(kinds[2], SimEvent::SceneSwitched { .. }));
    }

    #[test]
    fn front_wall_blocks_the_avatar() {
        let mut s = sim();
        s.avatar_mut().set_position(Vec3::new(10.0, 0.0, 5.0));
        let mut collided = false;
        for _ in 0..300 {
            s.step(DT, &forward());
            assert!(s.avatar().position.z <= 11.7 + 1e-3);
            collided |= !s.events().is_empty();
        }
        assert!(collided);
        assert!(s.avatar().position.z > 11.5);
        assert_eq!(s.trigger_state(), TriggerState::Idle);
    }

    #[test]
    fn disabled_collision_walks_through_walls() {
        let mut s = sim();
        s.set_collision_enabled(false);
        s.avatar_mut().set_position(Vec3::new(10.0, 0.0, 5.0));
        for _ in 0..300 {
            s.step(DT, &forward());
        }
        assert!(s.avatar().position.z > 13.0);
        assert!(s.events().is_empty());
    }

    #[test]
    fn avatar_comes_to_rest_without_input() {
        let mut s = sim();
        for _ in 0..30 {
            s.step(DT, &forward());
        }
        assert!(s.avatar().horizontal_speed() > 1.0);
        for _ in 0..120 {
            s.step(DT, &InputSnapshot::default());
        }
        assert!(s.avatar().horizontal_speed() < 1e-3);
        assert_eq!(s.avatar().position.y, 0.0);
        let target = s.camera().target_position(s.avatar());
        assert!(s.camera().position().distance(target) < 1e-2);
    }

    #[test]
    fn same_inputs_same_hash() {
        let mut a = sim();
        let mut b = sim();
        let look = InputSnapshot {
            look_delta: glam::Vec2::new(12.0, -4.0),
            ..InputSnapshot::moving(1.0, 0.5)
        };
        for i in 0..200 {
            let input = if i % 7 == 0 { look } else { forward() };
            a.step(DT, &input);
            b.step(DT, &input);
        }
        assert_eq!(a.state_hash(), b.state_hash());

        b.step(DT, &forward());
        a.step(DT, &InputSnapshot::default());
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn teardown_stops_pending_transitions() {
        let mut s = sim();
        s.avatar_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        s.step(DT, &InputSnapshot::default());
        assert_eq!(s.trigger_state(), TriggerState::DoorOpening);
        s.teardown();
        for _ in 0..600 {
            s.step(DT, &InputSnapshot::default());
        }
        assert_eq!(s.trigger_state(), TriggerState::DoorOpening);
    }

    #[test]
    fn reset_returns_to_spawn() {
        let mut s = sim();
        for _ in 0..100 {
            s.step(DT, &forward());
        }
        s.reset();
        assert_eq!(s.tick(), 0);
        assert_eq!(s.elapsed(), 0.0);
        assert_eq!(s.avatar().position, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(s.state_hash(), sim().state_hash());
    }

    #[test]
    fn drain_events_clears_log() {
        let mut s = sim();
        s.avatar_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        s.step(DT, &InputSnapshot::default());
        assert_eq!(s.drain_events().len(), 1);
        assert!(s.events().is_empty());
    }
}
