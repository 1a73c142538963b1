//! Maze with walls between grid cells.
//!
//! The maze is the physical truth the mouse moves through. Cell (x, y) spans the square
//! `[x·T, (x+1)·T] × [y·T, (y+1)·T]` where `T` is the tile length, so cell (0, 0) sits at the
//! origin and north is the positive y-axis. Walls are centered on tile boundaries.

use thiserror::Error;

use super::{Cell, Direction, HasCollision, Position, Shape};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct TileGeometry {
    pub wall_length: f64,
    pub wall_width: f64,
}

impl TileGeometry {
    pub const fn new(wall_length: f64, wall_width: f64) -> Self {
        Self {
            wall_length,
            wall_width,
        }
    }

    /// Distance between the centers of two adjacent cells.
    pub fn tile_length(&self) -> f64 {
        self.wall_length + self.wall_width
    }
}

impl Default for TileGeometry {
    fn default() -> Self {
        Self::new(0.168, 0.012)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    width: i32,
    height: i32,
    geometry: TileGeometry,
    walls: Vec<[bool; 4]>,
}

impl Maze {
    /// Maze without interior walls, enclosed by its perimeter.
    pub fn new(width: i32, height: i32, geometry: TileGeometry) -> Result<Self, MazeError> {
        if width <= 0 || height <= 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        if geometry.wall_length <= 0.0 || geometry.wall_width < 0.0 {
            return Err(MazeError::InvalidGeometry(geometry));
        }

        let mut maze = Self {
            width,
            height,
            geometry,
            walls: vec![[false; 4]; (width * height) as usize],
        };
        for x in 0..width {
            let bottom = maze.index(Cell::new(x, 0));
            maze.walls[bottom][wall_index(Direction::South)] = true;
            let top = maze.index(Cell::new(x, height - 1));
            maze.walls[top][wall_index(Direction::North)] = true;
        }
        for y in 0..height {
            let left = maze.index(Cell::new(0, y));
            maze.walls[left][wall_index(Direction::West)] = true;
            let right = maze.index(Cell::new(width - 1, y));
            maze.walls[right][wall_index(Direction::East)] = true;
        }
        Ok(maze)
    }

    pub fn with_wall(mut self, cell: Cell, direction: Direction) -> Result<Self, MazeError> {
        self.set_wall(cell, direction, true)?;
        Ok(self)
    }

    /// Sets a wall on both of its sides, so neighboring cells always agree.
    pub fn set_wall(
        &mut self,
        cell: Cell,
        direction: Direction,
        exists: bool,
    ) -> Result<(), MazeError> {
        if !self.contains(cell) {
            return Err(MazeError::CellOutOfBounds(cell));
        }
        let idx = self.index(cell);
        self.walls[idx][wall_index(direction)] = exists;
        if let Some((opposing_cell, opposing_direction)) = self.opposing_wall(cell, direction) {
            let idx = self.index(opposing_cell);
            self.walls[idx][wall_index(opposing_direction)] = exists;
        }
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_length(&self) -> f64 {
        self.geometry.tile_length()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        0 <= cell.x && cell.x < self.width && 0 <= cell.y && cell.y < self.height
    }

    /// # Panics
    ///
    /// Panics if `cell` lies outside the maze.
    pub fn wall_exists(&self, cell: Cell, direction: Direction) -> bool {
        assert!(
            self.contains(cell),
            "cell ({}, {}) is outside of the {}x{} maze",
            cell.x,
            cell.y,
            self.width,
            self.height
        );
        self.walls[self.index(cell)][wall_index(direction)]
    }

    /// The same wall seen from the neighboring cell, if that cell exists.
    pub fn opposing_wall(&self, cell: Cell, direction: Direction) -> Option<(Cell, Direction)> {
        let neighbor = cell.neighbor(direction);
        if self.contains(cell) && self.contains(neighbor) {
            Some((neighbor, direction.opposite()))
        } else {
            None
        }
    }

    /// Cell containing a position. The result may lie outside the maze.
    pub fn cell_at(&self, position: Position) -> Cell {
        let tile_length = self.tile_length();
        Cell::new(
            (position.x() / tile_length).floor() as i32,
            (position.y() / tile_length).floor() as i32,
        )
    }

    pub fn cell_center(&self, cell: Cell) -> Position {
        let tile_length = self.tile_length();
        Position::new(
            (cell.x as f64 + 0.5) * tile_length,
            (cell.y as f64 + 0.5) * tile_length,
        )
    }

    pub fn x_max(&self) -> f64 {
        self.width as f64 * self.tile_length()
    }

    pub fn y_max(&self) -> f64 {
        self.height as f64 * self.tile_length()
    }

    /// Collision geometry of a wall.
    pub fn wall_shape(&self, cell: Cell, direction: Direction) -> Shape {
        let tile_length = self.tile_length();
        let center = self.cell_center(cell);
        let (dx, dy) = direction.offset();
        let position = center + Position::new(dx as f64, dy as f64) * (tile_length / 2.0);
        match direction {
            Direction::North | Direction::South => Shape::Rectangle {
                position,
                x_length: tile_length,
                y_length: self.geometry.wall_width,
            },
            Direction::East | Direction::West => Shape::Rectangle {
                position,
                x_length: self.geometry.wall_width,
                y_length: tile_length,
            },
        }
    }

    /// Whether an object overlaps any wall near it. Objects must be smaller than a tile.
    pub fn has_collision(&self, object: &dyn HasCollision) -> bool {
        let center = match object.shape() {
            Shape::Circle { position, .. } | Shape::Rectangle { position, .. } => position,
        };
        let cell = self.cell_at(center);
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| Cell::new(cell.x + dx, cell.y + dy)))
            .filter(|c| self.contains(*c))
            .flat_map(|c| Direction::ALL.into_iter().map(move |d| (c, d)))
            .filter(|(c, d)| self.wall_exists(*c, *d))
            .any(|(c, d)| {
                let wall = WallObstacle(self.wall_shape(c, d));
                object.has_collision(&wall)
            })
    }

    /// Whether an object lies entirely within the outer boundary of the maze.
    pub fn contains_object(&self, object: &dyn HasCollision) -> bool {
        match object.shape() {
            Shape::Circle { position, radius } => {
                position.x() - radius >= 0.0
                    && position.x() + radius <= self.x_max()
                    && position.y() - radius >= 0.0
                    && position.y() + radius <= self.y_max()
            }
            Shape::Rectangle {
                position,
                x_length,
                y_length,
            } => {
                position.x() - x_length / 2.0 >= 0.0
                    && position.x() + x_length / 2.0 <= self.x_max()
                    && position.y() - y_length / 2.0 >= 0.0
                    && position.y() + y_length / 2.0 <= self.y_max()
            }
        }
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.y * self.width + cell.x) as usize
    }
}

struct WallObstacle(Shape);

impl HasCollision for WallObstacle {
    fn shape(&self) -> Shape {
        self.0
    }
}

fn wall_index(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum MazeError {
    #[error("invalid maze dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("invalid tile geometry {0:?}")]
    InvalidGeometry(TileGeometry),
    #[error("cell {0:?} is outside of the maze")]
    CellOutOfBounds(Cell),
}
