//! The domain module encapsulates the physical model of the simulation. It defines the `Maze`,
//! the `Mouse` and its `Sensor`s, along with the geometry that governs their interactions.
//!
//! Nothing in here knows about threads, the algorithm or the simulation loop, which keeps the
//! model testable in isolation.

mod basis;
mod collision;
mod direction;
mod maze;
mod mouse;
mod polygon;
mod sensor;

pub use basis::{Angle, AngularVelocity, Position};
pub use collision::{HasCollision, Shape};
pub use direction::{Cell, Direction};
pub use maze::{Maze, MazeError, TileGeometry};
pub use mouse::{lock, Mouse, MouseConfig, MouseError, Pose, SharedMouse};
pub use polygon::Polygon;
pub use sensor::{cast_ray, is_tile_edge, Sensor, SensorConfig, VIEW_RAYS};
