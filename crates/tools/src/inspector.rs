use glam::Vec3;
use labwalk_collision::ObstacleId;
use labwalk_kernel::{PropKind, Simulation, TriggerState};

/// Simulation inspector for developer tooling.
///
/// Provides read-only queries against the simulation for debugging and the
/// desktop inspector panel.
pub struct SimInspector;

impl SimInspector {
    /// Produce a summary of the simulation state.
    pub fn summary(sim: &Simulation) -> SimSummary {
        let avatar = sim.avatar();
        SimSummary {
            tick: sim.tick(),
            elapsed: sim.elapsed(),
            position: avatar.position,
            speed: avatar.horizontal_speed(),
            facing: avatar.facing,
            yaw: sim.controller().yaw,
            pitch: sim.controller().pitch,
            grounded: avatar.is_grounded(),
            walking: avatar.gait().walking,
            door: sim.trigger_state(),
            door_distance: avatar.position.distance(sim.config().door.position),
            fade_alpha: sim.door().fade_alpha(),
            obstacles: sim.collision().len(),
            collision_enabled: sim.collision_enabled(),
            pending_events: sim.events().len(),
            state_hash: sim.state_hash(),
        }
    }

    /// Details of one obstacle, if the id is valid.
    pub fn inspect_obstacle(sim: &Simulation, id: ObstacleId) -> Option<ObstacleInfo> {
        let avatar = sim.avatar();
        sim.collision().get(id).map(|o| ObstacleInfo {
            id,
            center: o.center(),
            size: o.size(),
            penetration: o.penetration(avatar.position, avatar.radius),
        })
    }

    /// The `n` obstacles whose X/Z rectangles lie closest to the avatar.
    pub fn nearest_obstacles(sim: &Simulation, n: usize) -> Vec<(ObstacleId, f32)> {
        let p = sim.avatar().position;
        let mut all: Vec<(ObstacleId, f32)> = sim
            .collision()
            .obstacles()
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let cx = o.min.x.max(p.x.min(o.max.x));
                let cz = o.min.z.max(p.z.min(o.max.z));
                (ObstacleId(i), ((p.x - cx).powi(2) + (p.z - cz).powi(2)).sqrt())
            })
            .collect();
        all.sort_by(|a, b| a.1.total_cmp(&b.1));
        all.truncate(n);
        all
    }

    /// Layout prop counts by kind.
    pub fn prop_counts(sim: &Simulation) -> Vec<(PropKind, usize)> {
        [
            PropKind::Wall,
            PropKind::Roof,
            PropKind::Lamp,
            PropKind::Tree,
            PropKind::Path,
        ]
        .into_iter()
        .map(|kind| (kind, sim.layout().count(kind)))
        .collect()
    }
}

/// Summary of simulation state for the inspector.
#[derive(Debug, Clone)]
pub struct SimSummary {
    pub tick: u64,
    pub elapsed: f64,
    pub position: Vec3,
    pub speed: f32,
    pub facing: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub grounded: bool,
    pub walking: bool,
    pub door: TriggerState,
    pub door_distance: f32,
    pub fade_alpha: f32,
    pub obstacles: usize,
    pub collision_enabled: bool,
    pub pending_events: usize,
    pub state_hash: u64,
}

impl std::fmt::Display for SimSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Simulation: tick={} t={:.2}s hash={:016x}",
            self.tick, self.elapsed, self.state_hash
        )?;
        writeln!(
            f,
            "Avatar: pos=({:.2}, {:.2}, {:.2}) speed={:.2} facing={:.2} grounded={} walking={}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.speed,
            self.facing,
            self.grounded,
            self.walking
        )?;
        writeln!(f, "Camera: yaw={:.3} pitch={:.3}", self.yaw, self.pitch)?;
        writeln!(
            f,
            "Door: {:?} distance={:.2} fade={:.2}",
            self.door, self.door_distance, self.fade_alpha
        )?;
        write!(
            f,
            "Obstacles: {} collision={} pending_events={}",
            self.obstacles,
            if self.collision_enabled { "on" } else { "off" },
            self.pending_events
        )
    }
}

/// Detailed info about a single obstacle.
#[derive(Debug, Clone)]
pub struct ObstacleInfo {
    pub id: ObstacleId,
    pub center: Vec3,
    pub size: Vec3,
    /// Push the avatar would receive from this obstacle alone.
    pub penetration: Option<Vec3>,
}

impl std::fmt::Display for ObstacleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Obstacle #{} center=({:.2}, {:.2}, {:.2}) size=({:.2}, {:.2}, {:.2})",
            self.id.0,
            self.center.x,
            self.center.y,
            self.center.z,
            self.size.x,
            self.size.y,
            self.size.z,
        )?;
        if let Some(p) = self.penetration {
            write!(f, " push=({:.2}, {:.2})", p.x, p.z)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwalk_input::InputSnapshot;
    use labwalk_kernel::SimConfig;

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default()).unwrap()
    }

    #[test]
    fn summary_fresh_simulation() {
        let s = sim();
        let summary = SimInspector::summary(&s);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.door, TriggerState::Idle);
        assert!((summary.door_distance - 22.0).abs() < 1e-4);
        assert_eq!(summary.obstacles, s.collision().len());
        assert!(summary.collision_enabled);
    }

    #[test]
    fn summary_after_steps() {
        let mut s = sim();
        for _ in 0..30 {
            s.step(1.0 / 60.0, &InputSnapshot::moving(1.0, 0.0));
        }
        let summary = SimInspector::summary(&s);
        assert_eq!(summary.tick, 30);
        assert!(summary.walking);
        assert!(summary.speed > 1.0);
        assert_eq!(summary.state_hash, s.state_hash());
    }

    #[test]
    fn inspect_obstacle_found_and_missing() {
        let s = sim();
        let info = SimInspector::inspect_obstacle(&s, ObstacleId(0)).unwrap();
        assert_eq!(info.size, Vec3::new(0.8, 10.0, 25.0));
        assert!(info.penetration.is_none());
        assert!(SimInspector::inspect_obstacle(&s, ObstacleId(usize::MAX)).is_none());
    }

    #[test]
    fn nearest_obstacles_are_sorted() {
        let s = sim();
        let nearest = SimInspector::nearest_obstacles(&s, 4);
        assert_eq!(nearest.len(), 4);
        assert!(nearest.windows(2).all(|w| w[0].1 <= w[1].1));
        // The closest lamps flank spawn at (±4.5, -7).
        assert!(nearest[0].1 < 6.0);
    }

    #[test]
    fn prop_counts_cover_layout() {
        let s = sim();
        let counts = SimInspector::prop_counts(&s);
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, s.layout().props.len());
    }

    #[test]
    fn summary_display() {
        let s = sim();
        let text = format!("{}", SimInspector::summary(&s));
        assert!(text.contains("tick=0"));
        assert!(text.contains("Door: Idle"));
        let info = SimInspector::inspect_obstacle(&s, ObstacleId(0)).unwrap();
        assert!(format!("{info}").starts_with("Obstacle #0"));
    }
}
