//! Grid cells and the four cardinal directions.

use std::f64::consts::PI;

use serde::Deserialize;

use super::Angle;

/// Cardinal heading of the mouse or side of a cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Heading of a mouse facing this direction.
    pub fn angle(self) -> Angle {
        match self {
            Direction::East => Angle::new(0.0),
            Direction::North => Angle::new(0.5 * PI),
            Direction::West => Angle::new(PI),
            Direction::South => Angle::new(1.5 * PI),
        }
    }

    /// Nearest cardinal direction to an arbitrary heading.
    pub fn from_angle(angle: Angle) -> Self {
        let quarter_turns = (angle.normalized().radians() / (0.5 * PI)).round() as i64;
        match quarter_turns.rem_euclid(4) {
            0 => Direction::East,
            1 => Direction::North,
            2 => Direction::West,
            _ => Direction::South,
        }
    }

    pub fn left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    pub fn right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit step in grid coordinates.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Direction::North),
            'e' => Some(Direction::East),
            's' => Some(Direction::South),
            'w' => Some(Direction::West),
            _ => None,
        }
    }
}

/// Integer grid coordinate. Only cells within `[0, width) × [0, height)` exist in a maze.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}
