//! Distance sensor with a cone-shaped field of view.
//!
//! A reading is produced by casting a fan of rays across the cone. Each ray walks the tile
//! boundaries it crosses and stops at the first wall (or at the sensor's range), so the clipped
//! fan is the sensor's view polygon. The reading is the length of the shortest ray.

use std::time::Duration;

use super::{Angle, Cell, Direction, Maze, Polygon, Position};

/// Number of rays spread across the field of view.
pub const VIEW_RAYS: usize = 9;

const FOOTPRINT_EDGES: usize = 16;
const TILE_EDGE_TOLERANCE: f64 = 1e-9;

/// Mounting and optical parameters. Position and direction are relative to the mouse origin
/// with the mouse facing along the positive x-axis.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorConfig {
    pub name: String,
    pub radius: f64,
    pub range: f64,
    pub half_width: Angle,
    pub read_duration: Duration,
    pub position: Position,
    pub direction: Angle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sensor {
    range: f64,
    half_width: Angle,
    read_duration: Duration,
    mount_position: Position,
    mount_direction: Angle,
    initial_position: Position,
    initial_direction: Angle,
    initial_polygon: Polygon,
    initial_view_polygon: Polygon,
    current_reading: f64,
}

impl Sensor {
    /// Creates a sensor mounted on a mouse resting at `mouse_position` with `mouse_heading`.
    pub fn new(
        config: &SensorConfig,
        mouse_position: Position,
        mouse_heading: Angle,
        maze: &Maze,
    ) -> Self {
        let initial_position = mouse_position + config.position.rotate_vector(mouse_heading);
        let initial_direction = mouse_heading + config.direction;
        let mut sensor = Self {
            range: config.range,
            half_width: config.half_width,
            read_duration: config.read_duration,
            mount_position: config.position,
            mount_direction: config.direction,
            initial_position,
            initial_direction,
            initial_polygon: Polygon::circle(initial_position, config.radius, FOOTPRINT_EDGES),
            initial_view_polygon: Polygon::default(),
            current_reading: config.range,
        };
        sensor.initial_view_polygon = sensor.view_polygon(initial_position, initial_direction, None);
        sensor.update_reading(initial_position, initial_direction, maze);
        sensor
    }

    pub fn read_duration(&self) -> Duration {
        self.read_duration
    }

    pub fn mount_position(&self) -> Position {
        self.mount_position
    }

    pub fn mount_direction(&self) -> Angle {
        self.mount_direction
    }

    pub fn initial_position(&self) -> Position {
        self.initial_position
    }

    pub fn initial_direction(&self) -> Angle {
        self.initial_direction
    }

    /// Footprint of the sensor at the mouse's starting pose.
    pub fn initial_polygon(&self) -> &Polygon {
        &self.initial_polygon
    }

    /// Unobstructed field of view at the mouse's starting pose.
    pub fn initial_view_polygon(&self) -> &Polygon {
        &self.initial_view_polygon
    }

    /// Field of view at the given sensor pose, clipped by the walls of `maze`.
    pub fn current_view_polygon(
        &self,
        current_position: Position,
        current_direction: Angle,
        maze: &Maze,
    ) -> Polygon {
        self.view_polygon(current_position, current_direction, Some(maze))
    }

    /// Distance in meters to the nearest obstacle within the field of view, or the range if
    /// nothing is in view.
    pub fn read(&self) -> f64 {
        self.current_reading
    }

    pub fn update_reading(
        &mut self,
        current_position: Position,
        current_direction: Angle,
        maze: &Maze,
    ) {
        let view = self.current_view_polygon(current_position, current_direction, maze);
        self.current_reading = view
            .vertices()
            .iter()
            .skip(1)
            .map(|v| current_position.distance(*v))
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or(self.range)
            .min(self.range);
    }

    fn view_polygon(
        &self,
        current_position: Position,
        current_direction: Angle,
        maze: Option<&Maze>,
    ) -> Polygon {
        let mut vertices = Vec::with_capacity(VIEW_RAYS + 1);
        vertices.push(current_position);
        for i in 0..VIEW_RAYS {
            let fraction = i as f64 / (VIEW_RAYS - 1) as f64;
            let angle = current_direction - self.half_width + self.half_width * (2.0 * fraction);
            let end = current_position + Position::polar(self.range, angle);
            vertices.push(match maze {
                Some(maze) => cast_ray(current_position, end, maze),
                None => end,
            });
        }
        Polygon::new(vertices)
    }
}

/// Walks from `start` towards `end` across tile boundaries and returns the point where the ray
/// first meets a wall, or `end` if it meets none. Rays never leave the maze.
///
/// A ray through a tile corner is stopped by any of the walls meeting at that corner.
pub fn cast_ray(start: Position, end: Position, maze: &Maze) -> Position {
    let tile_length = maze.tile_length();
    let delta = end - start;
    let length = start.distance(end);

    let mut cell = Cell::new(
        start_index(start.x(), delta.x(), tile_length),
        start_index(start.y(), delta.y(), tile_length),
    );
    if !maze.contains(cell) {
        return start;
    }

    let (step_x, mut t_max_x, t_delta_x) = axis_traversal(start.x(), delta.x(), cell.x, tile_length);
    let (step_y, mut t_max_y, t_delta_y) = axis_traversal(start.y(), delta.y(), cell.y, tile_length);

    loop {
        let t = t_max_x.min(t_max_y);
        if t >= 1.0 {
            return end;
        }
        let crossing = start + delta * t;
        let (x_wall, y_wall) = (
            if step_x > 0 {
                Direction::East
            } else {
                Direction::West
            },
            if step_y > 0 {
                Direction::North
            } else {
                Direction::South
            },
        );

        if (t_max_x - t_max_y).abs() * length < TILE_EDGE_TOLERANCE {
            if corner_blocked(maze, cell, x_wall, y_wall) {
                return crossing;
            }
            cell = cell.neighbor(x_wall).neighbor(y_wall);
            t_max_x += t_delta_x;
            t_max_y += t_delta_y;
        } else if t_max_x < t_max_y {
            if maze.wall_exists(cell, x_wall) {
                return crossing;
            }
            cell.x += step_x;
            t_max_x += t_delta_x;
        } else {
            if maze.wall_exists(cell, y_wall) {
                return crossing;
            }
            cell.y += step_y;
            t_max_y += t_delta_y;
        }

        if !maze.contains(cell) {
            return crossing;
        }
    }
}

/// Whether any of the four walls meeting at the corner of `cell` towards `x_wall` and `y_wall`
/// exists. The perimeter closes corners on the maze's edge.
fn corner_blocked(maze: &Maze, cell: Cell, x_wall: Direction, y_wall: Direction) -> bool {
    if maze.wall_exists(cell, x_wall) || maze.wall_exists(cell, y_wall) {
        return true;
    }
    let x_neighbor = cell.neighbor(x_wall);
    let y_neighbor = cell.neighbor(y_wall);
    (maze.contains(x_neighbor) && maze.wall_exists(x_neighbor, y_wall))
        || (maze.contains(y_neighbor) && maze.wall_exists(y_neighbor, x_wall))
}

/// Whether a coordinate lies on a tile boundary.
pub fn is_tile_edge(coordinate: f64, tile_length: f64) -> bool {
    let tiles = coordinate / tile_length;
    (tiles - tiles.round()).abs() * tile_length < TILE_EDGE_TOLERANCE
}

/// Tile index a ray starts in. A ray starting on a boundary belongs to the tile it moves into.
fn start_index(coordinate: f64, delta: f64, tile_length: f64) -> i32 {
    if is_tile_edge(coordinate, tile_length) {
        let boundary = (coordinate / tile_length).round() as i32;
        if delta < 0.0 {
            boundary - 1
        } else {
            boundary
        }
    } else {
        (coordinate / tile_length).floor() as i32
    }
}

/// Step direction, ray parameter of the first boundary crossing and parameter increment between
/// crossings along one axis.
fn axis_traversal(origin: f64, delta: f64, index: i32, tile_length: f64) -> (i32, f64, f64) {
    if delta > 0.0 {
        let boundary = (index + 1) as f64 * tile_length;
        (1, (boundary - origin) / delta, tile_length / delta)
    } else if delta < 0.0 {
        let boundary = index as f64 * tile_length;
        (-1, (boundary - origin) / delta, -tile_length / delta)
    } else {
        (0, f64::INFINITY, f64::INFINITY)
    }
}
