use std::{
    env,
    error::Error,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use bevy::{app::ScheduleRunnerPlugin, prelude::*};
use env_logger::Env;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use micromouse_sim::{
    config::SimConfig,
    controller::{Controller, Outcome},
    display::{TileDisplay, TileOverlay},
    domain::{Cell, Direction, Maze, MazeError, Mouse, MouseConfig, TileGeometry},
    interface::MouseInterface,
    resource::{ConfigRes, DisplayRes, MazeRes, MouseRes, StateRes},
    simulator::Simulator,
    state::{InterfaceType, SharedState},
};

const RNG_SEED: u64 = 42;
const MAZE_SIZE: i32 = 16;
const MAX_STEPS: usize = 1000;
const CONTINUOUS_RUN_MS: u64 = 10_000;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };

    match run(config) {
        Ok(Outcome::Finished) => ExitCode::SUCCESS,
        Ok(Outcome::Crashed) => ExitCode::from(2),
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: SimConfig) -> Result<Outcome, Box<dyn Error>> {
    let maze = create_maze(MAZE_SIZE, MAZE_SIZE, config.tile_geometry())?;
    let mouse = Mouse::new(
        maze.cell_center(Cell::new(0, 0)),
        config.algorithm.initial_direction.angle(),
        MouseConfig::default(),
        &maze,
    )?;
    let state = SharedState::handle(config.algorithm.interface_type);
    let display: Arc<dyn TileDisplay> = Arc::new(TileOverlay::new(
        config.display.tile_base_color,
        config.algorithm.tile_text_rows as usize,
        config.algorithm.tile_text_cols as usize,
    ));

    log::info!(
        "Simulating a {}x{} maze with the {:?} interface",
        maze.width(),
        maze.height(),
        config.algorithm.interface_type
    );

    let initial_direction = config.algorithm.initial_direction;
    let algorithm: Box<dyn FnMut(&mut MouseInterface) + Send> =
        match config.algorithm.interface_type {
            InterfaceType::Discrete => {
                Box::new(move |mouse: &mut MouseInterface| random_walk(mouse, initial_direction))
            }
            InterfaceType::Continuous => Box::new(wall_avoidance),
        };
    let controller = Controller::new(algorithm);
    let outcome = controller.outcome();

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(config.frame_duration())))
        .insert_resource(MazeRes::from(Arc::new(maze)))
        .insert_resource(MouseRes::from(Arc::new(Mutex::new(mouse))))
        .insert_resource(StateRes::from(state))
        .insert_resource(DisplayRes::from(display))
        .insert_resource(ConfigRes::from(config))
        .add_plugins(Simulator)
        .add_plugins(controller)
        .run();

    Ok(outcome.get().copied().unwrap_or(Outcome::Failed))
}

/// Perfect maze carved by a seeded depth-first search from tile (0, 0).
fn create_maze(width: i32, height: i32, geometry: TileGeometry) -> Result<Maze, MazeError> {
    let mut maze = Maze::new(width, height, geometry)?;
    for x in 0..width {
        for y in 0..height {
            maze.set_wall(Cell::new(x, y), Direction::North, true)?;
            maze.set_wall(Cell::new(x, y), Direction::East, true)?;
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(RNG_SEED);
    let mut visited = vec![false; (width * height) as usize];
    let index = |cell: Cell| (cell.y * width + cell.x) as usize;
    let mut stack = vec![Cell::new(0, 0)];
    visited[0] = true;

    while let Some(&cell) = stack.last() {
        let unvisited: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                let neighbor = cell.neighbor(*direction);
                maze.contains(neighbor) && !visited[index(neighbor)]
            })
            .collect();

        if unvisited.is_empty() {
            stack.pop();
            continue;
        }

        let direction = unvisited[rng.random_range(0..unvisited.len())];
        let neighbor = cell.neighbor(direction);
        maze.set_wall(cell, direction, false)?;
        visited[index(neighbor)] = true;
        stack.push(neighbor);
    }

    Ok(maze)
}

/// Wanders through the maze, choosing randomly among the open walls ahead and to the sides,
/// until it reaches the center. The mouse starts on tile (0, 0) facing `initial_direction`.
fn random_walk(mouse: &mut MouseInterface, initial_direction: Direction) {
    let mut rng = ChaCha8Rng::seed_from_u64(RNG_SEED);
    let (width, height) = (mouse.maze_width(), mouse.maze_height());
    let goal = |cell: Cell| {
        (cell.x == (width - 1) / 2 || cell.x == width / 2)
            && (cell.y == (height - 1) / 2 || cell.y == height / 2)
    };

    // dead reckoning from the start tile
    let mut cell = Cell::new(0, 0);
    let mut direction = initial_direction;
    mouse.set_tile_color(cell.x, cell.y, 'b');

    for step in 0..MAX_STEPS {
        if goal(cell) {
            log::info!("Reached the center after {step} steps");
            mouse.set_tile_color(cell.x, cell.y, 'g');
            return;
        }

        let mut options = Vec::with_capacity(3);
        if !mouse.wall_left() {
            options.push(direction.left());
        }
        if !mouse.wall_front() {
            options.push(direction);
        }
        if !mouse.wall_right() {
            options.push(direction.right());
        }

        if options.is_empty() {
            mouse.turn_around();
            direction = direction.opposite();
            continue;
        }

        let next = options[rng.random_range(0..options.len())];
        if next == direction.left() {
            mouse.turn_left();
        } else if next == direction.right() {
            mouse.turn_right();
        }
        direction = next;

        mouse.move_forward();
        cell = cell.neighbor(direction);
        mouse.set_tile_color(cell.x, cell.y, 'y');
        mouse.declare_tile_distance(cell.x, cell.y, step as i32 + 1);
    }

    log::info!("Gave up after {MAX_STEPS} steps");
}

/// Drives straight until a wall comes close, then rotates in place until the way is clear.
fn wall_avoidance(mouse: &mut MouseInterface) {
    const CRUISE: f64 = 5.0;
    const CLEARANCE: f64 = 0.12;

    while mouse.millis() < CONTINUOUS_RUN_MS {
        if mouse.read("front") > CLEARANCE {
            mouse.set_wheel_speeds(CRUISE, CRUISE);
        } else if mouse.read("left") > mouse.read("right") {
            mouse.set_wheel_speeds(-CRUISE, CRUISE);
        } else {
            mouse.set_wheel_speeds(CRUISE, -CRUISE);
        }
    }

    mouse.set_wheel_speeds(0.0, 0.0);
    log::info!("Yaw rate {:.1} deg/s after {} ms", mouse.read_gyro(), mouse.millis());
}
