//! The mouse interface is the only way an algorithm interacts with the simulation.
//!
//! It offers two control surfaces. The discrete surface moves the mouse one tile at a time,
//! turns it by quarter turns and answers wall queries for the tile it stands on. The continuous
//! surface sets wheel speeds directly and samples sensors and the gyroscope. Which surface an
//! algorithm may use is fixed by the run's [`InterfaceType`]; calling the other one is a
//! programming error that aborts the algorithm.
//!
//! Movements block the calling thread. They poll the mouse pose in a loop that sleeps for the
//! configured minimum interval between checks, while the simulation loop integrates the pose on
//! its own schedule. Tile colors, fog, text and declared walls are forwarded to the display and
//! never affect the physical maze.

use std::{
    collections::BTreeSet,
    panic,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::{
    config::SimConfig,
    display::{Color, TileDisplay},
    domain::{lock, AngularVelocity, Cell, Direction, Maze, Position, SharedMouse},
    state::{InterfaceType, SharedStateHandle, INPUT_BUTTON_COUNT},
};

/// Panic payload used to unwind the algorithm's thread once shutdown has been requested.
pub(crate) struct Shutdown;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Turn {
    Left,
    Right,
}

pub struct MouseInterface {
    maze: Arc<Maze>,
    mouse: SharedMouse,
    display: Arc<dyn TileDisplay>,
    state: SharedStateHandle,
    config: SimConfig,
    discrete_wheel_speed: f64,
    tiles_with_color: BTreeSet<Cell>,
    start: Instant,
}

impl MouseInterface {
    pub fn new(
        maze: Arc<Maze>,
        mouse: SharedMouse,
        display: Arc<dyn TileDisplay>,
        state: SharedStateHandle,
        config: SimConfig,
    ) -> Self {
        let discrete_wheel_speed = f64::from(lock(&mouse).config().max_wheel_speed)
            * config.algorithm.wheel_speed_fraction;
        Self {
            maze,
            mouse,
            display,
            state,
            config,
            discrete_wheel_speed,
            tiles_with_color: BTreeSet::new(),
            start: Instant::now(),
        }
    }

    pub(crate) fn state(&self) -> SharedStateHandle {
        Arc::clone(&self.state)
    }

    pub fn maze_width(&self) -> i32 {
        self.maze.width()
    }

    pub fn maze_height(&self) -> i32 {
        self.maze.height()
    }

    pub fn delay(&self, milliseconds: u64) {
        let deadline = Instant::now() + Duration::from_millis(milliseconds);
        loop {
            self.check_shutdown();
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep((deadline - now).min(self.config.min_sleep_duration()));
        }
    }

    /// Milliseconds since the interface was created.
    pub fn millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn set_tile_color(&mut self, x: i32, y: i32, color: char) {
        if !self.within_maze(x, y) {
            log::warn!(
                "There is no tile at position ({x}, {y}) and thus you cannot set its color."
            );
            return;
        }

        let Some(color) = Color::from_char(color) else {
            log::warn!(
                "You cannot set the color of tile ({x}, {y}) to '{color}' since '{color}' is not \
                 mapped to a color."
            );
            return;
        };

        let cell = Cell::new(x, y);
        self.display.set_tile_color(cell, color);
        self.tiles_with_color.insert(cell);
    }

    pub fn clear_tile_color(&mut self, x: i32, y: i32) {
        if !self.within_maze(x, y) {
            log::warn!(
                "There is no tile at position ({x}, {y}) and thus you cannot clear its color."
            );
            return;
        }

        let cell = Cell::new(x, y);
        self.display
            .set_tile_color(cell, self.config.display.tile_base_color);
        self.tiles_with_color.remove(&cell);
    }

    pub fn clear_all_tile_color(&mut self) {
        for cell in std::mem::take(&mut self.tiles_with_color) {
            self.display
                .set_tile_color(cell, self.config.display.tile_base_color);
        }
    }

    pub fn declare_wall(&self, x: i32, y: i32, direction: char, wall_exists: bool) {
        if let Some((cell, direction)) = self.wall_reference(x, y, direction, "declare") {
            self.declare_wall_at(cell, direction, wall_exists);
        }
    }

    pub fn undeclare_wall(&self, x: i32, y: i32, direction: char) {
        if let Some((cell, direction)) = self.wall_reference(x, y, direction, "undeclare") {
            self.display.undeclare_wall(cell, direction);
            if let Some((cell, direction)) = self.opposing_half(cell, direction) {
                self.display.undeclare_wall(cell, direction);
            }
        }
    }

    pub fn set_tile_fogginess(&self, x: i32, y: i32, foggy: bool) {
        if !self.within_maze(x, y) {
            log::warn!(
                "There is no tile at position ({x}, {y}) and thus you cannot set its fogginess."
            );
            return;
        }

        if !self.config.display.algorithm_controls_tile_fog {
            log::warn!(
                "The simulator controls tile fog and thus you cannot set the fogginess of tile \
                 ({x}, {y})."
            );
            return;
        }

        self.display.set_tile_fogginess(Cell::new(x, y), foggy);
    }

    pub fn declare_tile_distance(&self, x: i32, y: i32, distance: i32) {
        if !self.within_maze(x, y) {
            log::warn!(
                "There is no tile at position ({x}, {y}) and thus you cannot set its distance."
            );
            return;
        }

        self.display
            .set_tile_text(Cell::new(x, y), vec![distance.to_string()]);
    }

    pub fn undeclare_tile_distance(&self, x: i32, y: i32) {
        if !self.within_maze(x, y) {
            log::warn!(
                "There is no tile at position ({x}, {y}) and thus you cannot clear its distance."
            );
            return;
        }

        self.display.set_tile_text(Cell::new(x, y), vec![]);
    }

    /// Puts the mouse back onto its starting pose.
    pub fn reset_position(&self) {
        let mut mouse = lock(&self.mouse);
        let (position, heading) = (mouse.initial_translation(), mouse.initial_rotation());
        mouse.stop();
        mouse.teleport(position, heading);
    }

    pub fn input_button_pressed(&self, input_button: i32) -> bool {
        match input_button_index(input_button) {
            Some(index) => self.state.input_button_pressed(index),
            None => {
                log::warn!(
                    "There is no input button with the number {input_button}, and thus you \
                     cannot check to see if it has been pressed."
                );
                false
            }
        }
    }

    pub fn acknowledge_input_button_pressed(&self, input_button: i32) {
        match input_button_index(input_button) {
            Some(index) => self.state.set_input_button_pressed(index, false),
            None => log::warn!(
                "There is no input button with the number {input_button}, and thus you cannot \
                 acknowledge that it has been pressed."
            ),
        }
    }

    /// Wheel speeds in radians per second. Positive speeds on both wheels drive forward.
    pub fn set_wheel_speeds(&self, left: f64, right: f64) {
        self.ensure_interface(InterfaceType::Continuous, "set_wheel_speeds");

        lock(&self.mouse).set_wheel_speeds(AngularVelocity::new(left), AngularVelocity::new(right));
    }

    /// Latest reading of a sensor in meters. Reads are paced to at most one per frame.
    pub fn read(&self, name: &str) -> f64 {
        self.ensure_interface(InterfaceType::Continuous, "read");

        let start = Instant::now();
        let reading = {
            let mouse = lock(&self.mouse);
            mouse.read(name).zip(mouse.read_duration(name))
        };
        let Some((value, read_duration)) = reading else {
            log::warn!("There is no sensor called {name:?} and thus you cannot read its value.");
            return 0.0;
        };
        let elapsed = start.elapsed();

        if self.config.display.print_late_sensor_reads {
            if let Some((late, percent)) = lateness(elapsed, read_duration) {
                log::warn!(
                    "A sensor read was late by {late:.6} seconds, which is {percent:.2} percent late."
                );
            }
        }

        thread::sleep(self.config.frame_duration().saturating_sub(elapsed));
        value
    }

    /// Yaw rate in degrees per second.
    pub fn read_gyro(&self) -> f64 {
        self.ensure_interface(InterfaceType::Continuous, "read_gyro");

        lock(&self.mouse).angular_velocity().to_deg_per_sec()
    }

    pub fn wall_front(&self) -> bool {
        self.ensure_interface(InterfaceType::Discrete, "wall_front");

        let (cell, direction) = self.discretized_pose();
        self.is_wall(cell, direction)
    }

    pub fn wall_right(&self) -> bool {
        self.ensure_interface(InterfaceType::Discrete, "wall_right");

        let (cell, direction) = self.discretized_pose();
        self.is_wall(cell, direction.right())
    }

    pub fn wall_left(&self) -> bool {
        self.ensure_interface(InterfaceType::Discrete, "wall_left");

        let (cell, direction) = self.discretized_pose();
        self.is_wall(cell, direction.left())
    }

    /// Drives one tile ahead. If a wall is in the way the mouse crashes and does not move.
    pub fn move_forward(&self) {
        self.ensure_interface(InterfaceType::Discrete, "move_forward");

        if self.wall_front() {
            if self.state.set_crashed() {
                log::info!("The mouse crashed into a wall");
            }
            return;
        }

        let (cell, direction) = self.discretized_pose();
        let destination = self.maze.cell_center(cell.neighbor(direction));
        let heading = direction.angle();
        let forward = Position::polar(1.0, heading);
        let speed = AngularVelocity::new(self.discrete_wheel_speed);

        loop {
            self.check_paused();
            {
                let mut mouse = lock(&self.mouse);
                if (destination - mouse.current_translation()).dot(forward) <= 0.0 {
                    break;
                }
                mouse.set_wheel_speeds(speed, speed);
            }
            thread::sleep(self.config.min_sleep_duration());
        }

        let mut mouse = lock(&self.mouse);
        mouse.stop();
        mouse.teleport(destination, heading);
    }

    pub fn turn_left(&self) {
        self.ensure_interface(InterfaceType::Discrete, "turn_left");
        self.turn(Turn::Left);
    }

    pub fn turn_right(&self) {
        self.ensure_interface(InterfaceType::Discrete, "turn_right");
        self.turn(Turn::Right);
    }

    pub fn turn_around(&self) {
        self.ensure_interface(InterfaceType::Discrete, "turn_around");
        self.turn(Turn::Right);
        self.turn(Turn::Right);
    }

    /// Rotates in place until the heading passes the next cardinal direction. Progress is the
    /// signed angle still to go, which stays continuous across the 0/2π wrap for every start
    /// heading.
    fn turn(&self, turn: Turn) {
        let (cell, direction) = self.discretized_pose();
        let (target, sign) = match turn {
            Turn::Left => (direction.left(), 1.0),
            Turn::Right => (direction.right(), -1.0),
        };
        let target_heading = target.angle();
        let speed = self.discrete_wheel_speed / 2.0;
        let (left, right) = (
            AngularVelocity::new(-sign * speed),
            AngularVelocity::new(sign * speed),
        );

        loop {
            self.check_paused();
            {
                let mut mouse = lock(&self.mouse);
                let remaining = target_heading.signed_difference(mouse.current_rotation());
                if remaining.radians() * sign <= 0.0 {
                    break;
                }
                mouse.set_wheel_speeds(left, right);
            }
            thread::sleep(self.config.min_sleep_duration());
        }

        let mut mouse = lock(&self.mouse);
        mouse.stop();
        mouse.teleport(self.maze.cell_center(cell), target_heading);
    }

    fn ensure_interface(&self, expected: InterfaceType, function: &str) {
        self.check_shutdown();
        if self.state.interface_type() != expected {
            log::error!(
                "You must declare the interface type to be {expected:?} to use \
                 MouseInterface::{function}()."
            );
            panic!("MouseInterface::{function}() requires the {expected:?} interface");
        }
    }

    /// Blocks while the simulation is paused, with the wheels stopped. The caller's next loop
    /// iteration restores its wheel speeds.
    fn check_paused(&self) {
        self.check_shutdown();
        if self.state.paused() {
            lock(&self.mouse).stop();
            while self.state.paused() {
                self.check_shutdown();
                thread::sleep(self.config.min_sleep_duration());
            }
        }
    }

    fn check_shutdown(&self) {
        if self.state.shutdown_requested() {
            lock(&self.mouse).stop();
            panic::resume_unwind(Box::new(Shutdown));
        }
    }

    fn discretized_pose(&self) -> (Cell, Direction) {
        let mouse = lock(&self.mouse);
        (
            mouse.discretized_translation(&self.maze),
            mouse.discretized_rotation(),
        )
    }

    fn is_wall(&self, cell: Cell, direction: Direction) -> bool {
        assert!(
            self.maze.contains(cell),
            "discretized mouse position ({}, {}) is outside of the maze",
            cell.x,
            cell.y
        );

        let wall_exists = self.maze.wall_exists(cell, direction);

        if self.config.display.discrete_interface_declare_wall_on_read {
            self.declare_wall_at(cell, direction, wall_exists);
        }

        wall_exists
    }

    fn declare_wall_at(&self, cell: Cell, direction: Direction, wall_exists: bool) {
        self.display.declare_wall(cell, direction, wall_exists);
        if let Some((cell, direction)) = self.opposing_half(cell, direction) {
            self.display.declare_wall(cell, direction, wall_exists);
        }
    }

    fn opposing_half(&self, cell: Cell, direction: Direction) -> Option<(Cell, Direction)> {
        if self.config.display.declare_both_wall_halves {
            self.maze.opposing_wall(cell, direction)
        } else {
            None
        }
    }

    fn wall_reference(
        &self,
        x: i32,
        y: i32,
        direction: char,
        action: &str,
    ) -> Option<(Cell, Direction)> {
        if !self.within_maze(x, y) {
            log::warn!(
                "There is no tile at position ({x}, {y}), and thus you cannot {action} any of \
                 its walls."
            );
            return None;
        }

        let Some(direction) = Direction::from_char(direction) else {
            log::warn!("The character '{direction}' is not mapped to a valid direction.");
            return None;
        };

        Some((Cell::new(x, y), direction))
    }

    fn within_maze(&self, x: i32, y: i32) -> bool {
        self.maze.contains(Cell::new(x, y))
    }
}

/// Seconds a read took beyond the sensor's read duration, and that overrun as a percentage of the
/// read duration. `None` when the read was on time.
fn lateness(elapsed: Duration, read_duration: Duration) -> Option<(f64, f64)> {
    let late = elapsed.checked_sub(read_duration).filter(|late| !late.is_zero())?;
    Some((
        late.as_secs_f64(),
        late.as_secs_f64() / read_duration.as_secs_f64() * 100.0,
    ))
}

fn input_button_index(input_button: i32) -> Option<usize> {
    usize::try_from(input_button)
        .ok()
        .filter(|index| *index < INPUT_BUTTON_COUNT)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{
        display::WallDeclaration,
        domain::{Angle, TileGeometry},
        tests::{test_config, Ticker, World},
    };

    fn empty_maze() -> Maze {
        Maze::new(16, 16, TileGeometry::default()).unwrap()
    }

    fn discrete() -> World {
        World::new(empty_maze(), test_config(InterfaceType::Discrete))
    }

    fn continuous() -> World {
        World::new(empty_maze(), test_config(InterfaceType::Continuous))
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(0, -1)]
    #[case(16, 0)]
    #[case(0, 16)]
    #[case(i32::MAX, i32::MIN)]
    fn test_tile_operations_outside_maze_do_nothing(#[case] x: i32, #[case] y: i32) {
        let mut config = test_config(InterfaceType::Discrete);
        config.display.algorithm_controls_tile_fog = true;
        let world = World::new(empty_maze(), config);
        let mut mouse = world.interface();
        let cell = Cell::new(x, y);

        mouse.set_tile_color(x, y, 'r');
        mouse.declare_wall(x, y, 'n', true);
        mouse.set_tile_fogginess(x, y, false);
        mouse.declare_tile_distance(x, y, 7);
        mouse.clear_tile_color(x, y);
        mouse.undeclare_tile_distance(x, y);
        mouse.undeclare_wall(x, y, 'n');

        assert_eq!(world.overlay.tile_color(cell), Color::Black);
        assert_eq!(
            world.overlay.wall_declaration(cell, Direction::North),
            WallDeclaration::Undeclared
        );
        assert!(world.overlay.is_foggy(cell));
        assert!(world.overlay.tile_text(cell).is_empty());
    }

    #[test]
    fn test_unmapped_symbols_do_nothing() {
        let world = discrete();
        let mut mouse = world.interface();
        let cell = Cell::new(2, 2);

        mouse.set_tile_color(2, 2, 'z');
        mouse.declare_wall(2, 2, 'x', true);

        assert_eq!(world.overlay.tile_color(cell), Color::Black);
        for direction in Direction::ALL {
            assert_eq!(
                world.overlay.wall_declaration(cell, direction),
                WallDeclaration::Undeclared
            );
        }
    }

    #[test]
    fn test_tile_colors() {
        let world = discrete();
        let mut mouse = world.interface();

        mouse.set_tile_color(1, 1, 'r');
        mouse.set_tile_color(2, 1, 'G');
        assert_eq!(world.overlay.tile_color(Cell::new(1, 1)), Color::Red);
        assert_eq!(world.overlay.tile_color(Cell::new(2, 1)), Color::DarkGreen);

        mouse.clear_tile_color(1, 1);
        assert_eq!(world.overlay.tile_color(Cell::new(1, 1)), Color::Black);

        mouse.set_tile_color(3, 3, 'y');
        mouse.clear_all_tile_color();
        assert_eq!(world.overlay.tile_color(Cell::new(2, 1)), Color::Black);
        assert_eq!(world.overlay.tile_color(Cell::new(3, 3)), Color::Black);
    }

    #[rstest]
    #[case::both_halves(true, WallDeclaration::Declared { wall_exists: true })]
    #[case::single_half(false, WallDeclaration::Undeclared)]
    fn test_declare_wall_round_trip(
        #[case] declare_both_wall_halves: bool,
        #[case] opposing: WallDeclaration,
    ) {
        let mut config = test_config(InterfaceType::Discrete);
        config.display.declare_both_wall_halves = declare_both_wall_halves;
        let world = World::new(empty_maze(), config);
        let mouse = world.interface();

        mouse.declare_wall(4, 5, 'e', true);
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(4, 5), Direction::East),
            WallDeclaration::Declared { wall_exists: true }
        );
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(5, 5), Direction::West),
            opposing
        );

        mouse.undeclare_wall(4, 5, 'e');
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(4, 5), Direction::East),
            WallDeclaration::Undeclared
        );
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(5, 5), Direction::West),
            WallDeclaration::Undeclared
        );
    }

    #[test]
    fn test_declare_wall_on_perimeter_has_no_opposing_half() {
        let world = discrete();
        let mouse = world.interface();
        mouse.declare_wall(0, 0, 's', true);
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(0, 0), Direction::South),
            WallDeclaration::Declared { wall_exists: true }
        );
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(0, -1), Direction::North),
            WallDeclaration::Undeclared
        );
    }

    #[test]
    fn test_tile_fog_and_distance() {
        let world = discrete();
        let mouse = world.interface();

        mouse.set_tile_fogginess(3, 3, false);
        assert!(world.overlay.is_foggy(Cell::new(3, 3)));

        mouse.declare_tile_distance(3, 3, 12);
        assert_eq!(world.overlay.tile_text(Cell::new(3, 3)), vec!["12".to_string()]);
        mouse.undeclare_tile_distance(3, 3);
        assert!(world.overlay.tile_text(Cell::new(3, 3)).is_empty());

        // the default tile text is 2 rows of 3 characters
        mouse.declare_tile_distance(3, 3, 12345);
        assert_eq!(world.overlay.tile_text(Cell::new(3, 3)), vec!["123".to_string()]);

        let mut config = test_config(InterfaceType::Discrete);
        config.display.algorithm_controls_tile_fog = true;
        let world = World::new(empty_maze(), config);
        world.interface().set_tile_fogginess(3, 3, false);
        assert!(!world.overlay.is_foggy(Cell::new(3, 3)));
    }

    #[rstest]
    #[case(-1)]
    #[case(10)]
    #[case(i32::MIN)]
    fn test_input_button_out_of_range(#[case] button: i32) {
        let world = discrete();
        let mouse = world.interface();
        assert!(!mouse.input_button_pressed(button));
        mouse.acknowledge_input_button_pressed(button);
    }

    #[test]
    fn test_input_button_acknowledge() {
        let world = discrete();
        let mouse = world.interface();
        world.state.set_input_button_pressed(9, true);
        assert!(mouse.input_button_pressed(9));
        assert!(mouse.input_button_pressed(9));
        mouse.acknowledge_input_button_pressed(9);
        assert!(!mouse.input_button_pressed(9));
    }

    #[test]
    fn test_wall_queries_declare_walls() {
        let maze = empty_maze()
            .with_wall(Cell::new(0, 0), Direction::North)
            .unwrap();
        let world = World::new(maze, test_config(InterfaceType::Discrete));
        let mouse = world.interface();

        assert!(mouse.wall_front());
        assert!(mouse.wall_left());
        assert!(!mouse.wall_right());

        assert_eq!(
            world.overlay.wall_declaration(Cell::new(0, 0), Direction::North),
            WallDeclaration::Declared { wall_exists: true }
        );
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(0, 1), Direction::South),
            WallDeclaration::Declared { wall_exists: true }
        );
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(0, 0), Direction::East),
            WallDeclaration::Declared { wall_exists: false }
        );
    }

    #[test]
    fn test_wall_queries_without_declaring() {
        let mut config = test_config(InterfaceType::Discrete);
        config.display.discrete_interface_declare_wall_on_read = false;
        let world = World::new(empty_maze(), config);
        let mouse = world.interface();

        assert!(mouse.wall_left());
        assert_eq!(
            world.overlay.wall_declaration(Cell::new(0, 0), Direction::West),
            WallDeclaration::Undeclared
        );
    }

    #[test]
    fn test_move_forward_along_empty_maze_until_crash() {
        let world = discrete();
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);

        for _ in 0..15 {
            mouse.move_forward();
        }
        assert!(!world.state.crashed());
        assert_eq!(world.cell(), Cell::new(0, 15));
        assert_eq!(world.direction(), Direction::North);
        let pose = world.pose();
        assert_eq!(pose.position, world.maze.cell_center(Cell::new(0, 15)));
        assert_eq!(pose.heading, Direction::North.angle());

        mouse.move_forward();
        assert!(world.state.crashed());
        assert_eq!(world.pose(), pose);

        mouse.move_forward();
        assert!(world.state.crashed());
        assert_eq!(world.pose(), pose);
    }

    #[test]
    fn test_move_forward_into_interior_wall() {
        let maze = empty_maze()
            .with_wall(Cell::new(0, 1), Direction::North)
            .unwrap();
        let world = World::new(maze, test_config(InterfaceType::Discrete));
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);

        mouse.move_forward();
        assert!(!world.state.crashed());
        let pose = world.pose();

        mouse.move_forward();
        assert!(world.state.crashed());
        assert_eq!(world.pose(), pose);
        assert_eq!(world.cell(), Cell::new(0, 1));
    }

    #[rstest]
    #[case(Direction::North)]
    #[case(Direction::East)]
    #[case(Direction::South)]
    #[case(Direction::West)]
    fn test_turns_snap_to_cardinal_headings(#[case] initial_direction: Direction) {
        let mut config = test_config(InterfaceType::Discrete);
        config.algorithm.initial_direction = initial_direction;
        let world = World::new(empty_maze(), config);
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);

        mouse.turn_left();
        assert_eq!(world.pose().heading, initial_direction.left().angle());

        mouse.turn_right();
        mouse.turn_right();
        assert_eq!(world.pose().heading, initial_direction.right().angle());

        mouse.turn_around();
        assert_eq!(world.pose().heading, initial_direction.left().angle());

        mouse.turn_left();
        assert_eq!(world.direction(), initial_direction.opposite());
        assert_eq!(world.pose().position, world.maze.cell_center(Cell::new(0, 0)));
    }

    #[rstest]
    #[case(Direction::North)]
    #[case(Direction::East)]
    #[case(Direction::South)]
    #[case(Direction::West)]
    fn test_turn_around_is_half_turn(#[case] initial_direction: Direction) {
        let mut config = test_config(InterfaceType::Discrete);
        config.algorithm.initial_direction = initial_direction;
        let world = World::new(empty_maze(), config);
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);

        mouse.turn_around();
        let turned = world.pose().heading.signed_difference(initial_direction.angle());
        assert_abs_diff_eq!(turned.radians().abs(), std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(world.direction(), initial_direction.opposite());
    }

    #[test]
    fn test_move_and_turn_through_the_maze() {
        let world = discrete();
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);

        mouse.move_forward();
        mouse.move_forward();
        mouse.turn_right();
        mouse.move_forward();
        mouse.turn_right();
        mouse.move_forward();

        insta::assert_snapshot!(
            format!("{:?} {:?}", world.cell(), world.direction()),
            @"Cell { x: 1, y: 1 } South"
        );
        assert!(!world.state.crashed());
    }

    #[test]
    fn test_move_forward_waits_while_paused() {
        let world = discrete();
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);
        world.state.set_paused(true);

        let state = Arc::clone(&world.state);
        let shared = Arc::clone(&world.mouse);
        let unpauser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            let position = lock(&shared).current_translation();
            state.set_paused(false);
            position
        });

        let start = Instant::now();
        mouse.move_forward();
        let position_while_paused = unpauser.join().unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(position_while_paused, world.maze.cell_center(Cell::new(0, 0)));
        assert_eq!(world.cell(), Cell::new(0, 1));
    }

    #[test]
    fn test_reset_position() {
        let world = discrete();
        let mouse = world.interface();
        let _ticker = Ticker::spawn(&world);

        mouse.move_forward();
        mouse.turn_left();
        mouse.reset_position();
        assert_eq!(world.cell(), Cell::new(0, 0));
        assert_eq!(world.direction(), Direction::North);
    }

    #[test]
    #[should_panic(expected = "MouseInterface::set_wheel_speeds() requires the Continuous interface")]
    fn test_continuous_operation_on_discrete_interface() {
        discrete().interface().set_wheel_speeds(1.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "MouseInterface::read() requires the Continuous interface")]
    fn test_read_on_discrete_interface() {
        discrete().interface().read("front");
    }

    #[test]
    #[should_panic(expected = "MouseInterface::move_forward() requires the Discrete interface")]
    fn test_discrete_operation_on_continuous_interface() {
        continuous().interface().move_forward();
    }

    #[test]
    #[should_panic(expected = "MouseInterface::wall_left() requires the Discrete interface")]
    fn test_wall_query_on_continuous_interface() {
        continuous().interface().wall_left();
    }

    #[test]
    fn test_continuous_straight_line() {
        let world = continuous();
        let mouse = world.interface();
        let start = world.pose();
        let _ticker = Ticker::spawn(&world);

        mouse.set_wheel_speeds(1.0, 1.0);
        thread::sleep(Duration::from_millis(200));
        mouse.set_wheel_speeds(0.0, 0.0);
        let end = world.pose();

        assert_abs_diff_eq!(end.position.x(), start.position.x(), epsilon = 1e-9);
        assert!(end.position.y() > start.position.y());
        assert_abs_diff_eq!(end.heading, start.heading, epsilon = 1e-12);
    }

    #[test]
    fn test_continuous_rotation_in_place() {
        let world = continuous();
        let mouse = world.interface();
        let start = world.pose();
        let _ticker = Ticker::spawn(&world);

        mouse.set_wheel_speeds(-1.0, 1.0);
        thread::sleep(Duration::from_millis(200));
        mouse.set_wheel_speeds(0.0, 0.0);
        let end = world.pose();

        assert_abs_diff_eq!(end.position, start.position, epsilon = 1e-9);
        assert!(end.heading.signed_difference(start.heading).radians() > 0.0);
    }

    #[test]
    fn test_read_gyro() {
        let world = continuous();
        let mouse = world.interface();
        assert_abs_diff_eq!(mouse.read_gyro(), 0.0);

        mouse.set_wheel_speeds(-1.0, 1.0);
        let config = lock(&world.mouse).config().clone();
        let expected = Angle::new(2.0 * config.wheel_radius / config.wheel_separation);
        assert_abs_diff_eq!(mouse.read_gyro(), expected.to_deg(), epsilon = 1e-9);
    }

    #[test]
    fn test_read_sensors() {
        let world = continuous();
        let mouse = world.interface();

        assert_abs_diff_eq!(mouse.read("unknown"), 0.0);
        // facing north from (0, 0): the west perimeter is 0.07 m to the left of the sensor
        assert_abs_diff_eq!(mouse.read("left"), 0.07, epsilon = 1e-9);
        assert_abs_diff_eq!(mouse.read("front"), 0.18, epsilon = 1e-9);
    }

    #[rstest]
    #[case::on_time(Duration::from_micros(500), None)]
    #[case::exactly_on_time(Duration::from_millis(1), None)]
    #[case::half_late(Duration::from_micros(1500), Some((0.0005, 50.0)))]
    #[case::twice_late(Duration::from_millis(3), Some((0.002, 200.0)))]
    fn test_late_read_report(#[case] elapsed: Duration, #[case] expected: Option<(f64, f64)>) {
        let report = lateness(elapsed, Duration::from_millis(1));
        assert_eq!(report.is_some(), expected.is_some());
        if let (Some((late, percent)), Some((expected_late, expected_percent))) = (report, expected) {
            assert_abs_diff_eq!(late, expected_late, epsilon = 1e-12);
            assert_abs_diff_eq!(percent, expected_percent, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_read_is_paced_to_frame_rate() {
        let mut config = test_config(InterfaceType::Continuous);
        config.timing.frame_rate = 20.0;
        let world = World::new(empty_maze(), config);
        let mouse = world.interface();

        let start = Instant::now();
        mouse.read("front");
        mouse.read("front");
        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}
