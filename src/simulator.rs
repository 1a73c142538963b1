//! Simulation of the mouse in the maze.
//!
//! The mouse's pose is updated based on its wheel speeds and the elapsed time, taking into
//! account collisions with the maze walls. The readings of the mouse's sensors are updated and,
//! unless the algorithm controls it, the fog is lifted from the tile the mouse is on.

use std::time::Duration;

use bevy::prelude::*;

use crate::{
    config::SimConfig,
    display::TileDisplay,
    domain::{lock, Maze, SharedMouse},
    resource::{ConfigRes, DisplayRes, MazeRes, MouseRes, StateRes},
    state::SharedState,
};

pub struct Simulator;

impl Plugin for Simulator {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, simulate);
    }
}

fn simulate(
    time: Res<Time>,
    mouse: Res<MouseRes>,
    maze: Res<MazeRes>,
    state: Res<StateRes>,
    display: Res<DisplayRes>,
    config: Res<ConfigRes>,
) {
    advance(&mouse, &maze, &state, &**display, &config, time.delta());
}

/// Advances the simulation by `dt`. Nothing moves while the simulation is paused.
///
/// A pose that would overlap a wall or leave the maze is not committed. The mouse stays where it
/// was and the run is marked as crashed.
pub fn advance(
    mouse: &SharedMouse,
    maze: &Maze,
    state: &SharedState,
    display: &dyn TileDisplay,
    config: &SimConfig,
    dt: Duration,
) {
    if state.paused() {
        return;
    }

    let mut mouse = lock(mouse);
    let previous = mouse.pose();
    let updated = mouse.updated_pose(dt);
    mouse.set_pose(updated);

    let valid_position = !maze.has_collision(&*mouse) && maze.contains_object(&*mouse);

    if !valid_position {
        mouse.set_pose(previous);
        if state.set_crashed() {
            log::info!(
                "The mouse crashed at ({:.3}, {:.3})",
                previous.position.x(),
                previous.position.y()
            );
        }
    }

    mouse.update_sensors(maze);

    if !config.display.algorithm_controls_tile_fog {
        let cell = mouse.discretized_translation(maze);
        if maze.contains(cell) {
            display.set_tile_fogginess(cell, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        display::{Color, TileOverlay},
        domain::{AngularVelocity, Cell, Direction, Mouse, MouseConfig, Position, TileGeometry},
        state::InterfaceType,
    };

    const DT: Duration = Duration::from_millis(10);

    struct Fixture {
        maze: Maze,
        mouse: SharedMouse,
        state: SharedState,
        overlay: TileOverlay,
        config: SimConfig,
    }

    impl Fixture {
        fn new(cell: Cell, direction: Direction) -> Self {
            let maze = Maze::new(4, 4, TileGeometry::default()).unwrap();
            let mouse = Mouse::new(
                maze.cell_center(cell),
                direction.angle(),
                MouseConfig::default(),
                &maze,
            )
            .unwrap();
            Self {
                maze,
                mouse: Arc::new(Mutex::new(mouse)),
                state: SharedState::new(InterfaceType::Continuous),
                overlay: TileOverlay::new(Color::Black, 2, 3),
                config: SimConfig::default(),
            }
        }

        fn drive(&self, left: f64, right: f64, steps: usize) {
            lock(&self.mouse)
                .set_wheel_speeds(AngularVelocity::new(left), AngularVelocity::new(right));
            for _ in 0..steps {
                advance(&self.mouse, &self.maze, &self.state, &self.overlay, &self.config, DT);
            }
        }

        fn position(&self) -> Position {
            lock(&self.mouse).current_translation()
        }
    }

    #[test]
    fn test_advance_integrates_pose() {
        let fixture = Fixture::new(Cell::new(0, 0), Direction::East);
        let start = fixture.position();

        // 0.02 m wheel radius at 2 rad/s is 0.04 m/s, for 0.5 s
        fixture.drive(2.0, 2.0, 50);

        assert_abs_diff_eq!(fixture.position(), start + Position::new(0.02, 0.0), epsilon = 1e-9);
        assert!(!fixture.state.crashed());
    }

    #[test]
    fn test_advance_while_paused() {
        let fixture = Fixture::new(Cell::new(0, 0), Direction::East);
        let start = fixture.position();
        fixture.state.set_paused(true);

        fixture.drive(2.0, 2.0, 50);

        assert_eq!(fixture.position(), start);
    }

    #[test]
    fn test_advance_does_not_commit_collisions() {
        let fixture = Fixture::new(Cell::new(0, 0), Direction::West);

        // 1 m/s westwards: the body touches the perimeter after 44 mm
        fixture.drive(50.0, 50.0, 20);

        assert!(fixture.state.crashed());
        let position = fixture.position();
        assert!(position.x() > 0.04);
        assert!(position.x() <= 0.09);
        assert_abs_diff_eq!(position.y(), 0.09, epsilon = 1e-9);
    }

    #[test]
    fn test_advance_updates_sensors() {
        let fixture = Fixture::new(Cell::new(0, 0), Direction::North);
        let before = lock(&fixture.mouse).read("front").unwrap();
        assert_abs_diff_eq!(before, 0.18, epsilon = 1e-9);

        lock(&fixture.mouse).teleport(Position::new(0.09, 0.6), Direction::North.angle());
        fixture.drive(0.0, 0.0, 1);

        // the sensor sits at y = 0.635, the north perimeter of a 4x4 maze at y = 0.72
        let after = lock(&fixture.mouse).read("front").unwrap();
        assert_abs_diff_eq!(after, 0.085, epsilon = 1e-9);
    }

    #[test]
    fn test_advance_clears_fog() {
        let mut fixture = Fixture::new(Cell::new(1, 2), Direction::North);
        fixture.drive(0.0, 0.0, 1);
        assert!(!fixture.overlay.is_foggy(Cell::new(1, 2)));
        assert!(fixture.overlay.is_foggy(Cell::new(0, 0)));

        fixture.config.display.algorithm_controls_tile_fog = true;
        let center = fixture.maze.cell_center(Cell::new(3, 3));
        lock(&fixture.mouse).teleport(center, Direction::North.angle());
        fixture.drive(0.0, 0.0, 1);
        assert!(fixture.overlay.is_foggy(Cell::new(3, 3)));
    }
}
