//! Differential-drive mouse with distance sensors.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use nalgebra::{Matrix2, Vector2};
use thiserror::Error;

use super::{
    Angle, AngularVelocity, Cell, Direction, HasCollision, Maze, Position, Sensor, SensorConfig,
    Shape,
};

/// Mouse shared between the simulation loop and the algorithm's thread.
pub type SharedMouse = Arc<Mutex<Mouse>>;

/// Locks a shared mouse. A panic on the other side of the lock does not invalidate the pose, so
/// poisoning is ignored.
pub fn lock(mouse: &SharedMouse) -> MutexGuard<'_, Mouse> {
    mouse.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Position,
    pub heading: Angle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct WheelSpeeds {
    left: AngularVelocity,
    right: AngularVelocity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mouse {
    pose: Pose,
    initial_pose: Pose,
    wheel_speeds: WheelSpeeds,
    sensors: BTreeMap<String, Sensor>,
    config: MouseConfig,
}

impl Mouse {
    pub fn new(
        initial_position: Position,
        initial_heading: Angle,
        config: MouseConfig,
        maze: &Maze,
    ) -> Result<Self, MouseError> {
        if config.wheel_radius <= 0.0 || config.wheel_separation <= 0.0 {
            return Err(MouseError::InvalidDriveGeometry {
                wheel_radius: config.wheel_radius,
                wheel_separation: config.wheel_separation,
            });
        }

        let mut sensors = BTreeMap::new();
        for sensor_config in &config.sensors {
            let sensor = Sensor::new(sensor_config, initial_position, initial_heading, maze);
            if sensors.insert(sensor_config.name.clone(), sensor).is_some() {
                return Err(MouseError::DuplicateSensor(sensor_config.name.clone()));
            }
        }

        let initial_pose = Pose {
            position: initial_position,
            heading: initial_heading.normalized(),
        };
        Ok(Self {
            pose: initial_pose,
            initial_pose,
            wheel_speeds: WheelSpeeds::default(),
            sensors,
            config,
        })
    }

    pub fn current_translation(&self) -> Position {
        self.pose.position
    }

    /// Heading in [0, 2π).
    pub fn current_rotation(&self) -> Angle {
        self.pose.heading
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn initial_translation(&self) -> Position {
        self.initial_pose.position
    }

    pub fn initial_rotation(&self) -> Angle {
        self.initial_pose.heading
    }

    /// Cell the mouse is in. Only meaningful while the mouse rests on a tile center.
    pub fn discretized_translation(&self, maze: &Maze) -> Cell {
        maze.cell_at(self.pose.position)
    }

    /// Cardinal direction nearest to the heading.
    pub fn discretized_rotation(&self) -> Direction {
        Direction::from_angle(self.pose.heading)
    }

    pub fn config(&self) -> &MouseConfig {
        &self.config
    }

    pub fn set_wheel_speeds(&mut self, left: AngularVelocity, right: AngularVelocity) {
        self.wheel_speeds = WheelSpeeds { left, right };
    }

    pub fn stop(&mut self) {
        self.set_wheel_speeds(AngularVelocity::default(), AngularVelocity::default());
    }

    /// Overwrites the pose, e.g. to snap exactly onto a tile center.
    pub fn teleport(&mut self, position: Position, heading: Angle) {
        self.pose = Pose {
            position,
            heading: heading.normalized(),
        };
    }

    /// Linear speed along the heading (m/s) and yaw rate (rad/s) produced by the wheels.
    pub fn body_velocity(&self) -> (f64, f64) {
        let r = self.config.wheel_radius;
        let j = Matrix2::new(
            r / 2.0,
            r / 2.0,
            -r / self.config.wheel_separation,
            r / self.config.wheel_separation,
        );
        let q = j * Vector2::new(
            f64::from(self.wheel_speeds.left),
            f64::from(self.wheel_speeds.right),
        );
        (q[0], q[1])
    }

    /// Yaw rate as measured by a gyroscope.
    pub fn angular_velocity(&self) -> AngularVelocity {
        AngularVelocity::new(self.body_velocity().1)
    }

    /// Pose after driving with the current wheel speeds for `dt`. The mouse itself is unchanged.
    pub fn updated_pose(&self, dt: Duration) -> Pose {
        let (linear_velocity, angular_velocity) = self.body_velocity();
        let dt = dt.as_secs_f64();
        let rotation = angular_velocity * dt;
        let mid_heading = self.pose.heading + Angle::new(rotation / 2.0);

        Pose {
            position: self.pose.position + Position::polar(linear_velocity * dt, mid_heading),
            heading: (self.pose.heading + Angle::new(rotation)).normalized(),
        }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.teleport(pose.position, pose.heading);
    }

    pub fn update_sensors(&mut self, maze: &Maze) {
        let pose = self.pose;
        for sensor in self.sensors.values_mut() {
            let position = pose.position + sensor.mount_position().rotate_vector(pose.heading);
            let direction = pose.heading + sensor.mount_direction();
            sensor.update_reading(position, direction, maze);
        }
    }

    pub fn has_sensor(&self, name: &str) -> bool {
        self.sensors.contains_key(name)
    }

    pub fn read(&self, name: &str) -> Option<f64> {
        self.sensors.get(name).map(Sensor::read)
    }

    pub fn read_duration(&self, name: &str) -> Option<Duration> {
        self.sensors.get(name).map(Sensor::read_duration)
    }
}

impl HasCollision for Mouse {
    fn shape(&self) -> Shape {
        Shape::Circle {
            position: self.pose.position,
            radius: self.config.body_radius,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum MouseError {
    #[error("sensor {0:?} is defined more than once")]
    DuplicateSensor(String),
    #[error("invalid drive geometry (wheel radius {wheel_radius}, wheel separation {wheel_separation})")]
    InvalidDriveGeometry {
        wheel_radius: f64,
        wheel_separation: f64,
    },
}

/// Distances are meters, the origin is the center between the wheels and the mouse faces along
/// the positive x-axis.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseConfig {
    pub wheel_radius: f64,
    pub wheel_separation: f64,
    pub body_radius: f64,
    /// Wheel speed used for discrete movements at full speed fraction.
    pub max_wheel_speed: AngularVelocity,
    pub sensors: Vec<SensorConfig>,
}

impl Default for MouseConfig {
    fn default() -> Self {
        let sensor = |name: &str, position: Position, degree: f64| SensorConfig {
            name: name.into(),
            radius: 0.005,
            range: 0.18,
            half_width: Angle::from_deg(5.0),
            read_duration: Duration::from_millis(1),
            position,
            direction: Angle::from_deg(degree),
        };
        Self {
            wheel_radius: 0.02,
            wheel_separation: 0.07,
            body_radius: 0.04,
            max_wheel_speed: AngularVelocity::new(50.0),
            sensors: vec![
                sensor("front", Position::new(0.035, 0.0), 0.0),
                sensor("left", Position::new(0.03, 0.02), 90.0),
                sensor("right", Position::new(0.03, -0.02), -90.0),
            ],
        }
    }
}
