//! Runs the algorithm on its own thread.
//!
//! The algorithm is ordinary blocking code. It drives the mouse through a [`MouseInterface`] that
//! it owns exclusively, while the simulation loop keeps running on the main thread. The two sides
//! only meet in the shared mouse and the shared state.

use std::{
    any::Any,
    io,
    thread::{self, JoinHandle},
};

use thiserror::Error;

use crate::{
    interface::{MouseInterface, Shutdown},
    state::SharedStateHandle,
};

const THREAD_NAME: &str = "algorithm";

/// A maze-solving algorithm. Returning from `run` ends the run.
pub trait Algorithm: Send + 'static {
    fn run(&mut self, mouse: &mut MouseInterface);
}

impl<F> Algorithm for F
where
    F: FnMut(&mut MouseInterface) + Send + 'static,
{
    fn run(&mut self, mouse: &mut MouseInterface) {
        self(mouse)
    }
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("failed to spawn the algorithm thread")]
    Spawn(#[from] io::Error),
    #[error("the algorithm panicked: {0}")]
    AlgorithmPanicked(String),
}

/// Handle to the algorithm's thread. Dropping the handle stops the algorithm and waits for it.
pub struct Scheduler {
    state: SharedStateHandle,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn(
        mut algorithm: impl Algorithm,
        mut mouse: MouseInterface,
    ) -> Result<Self, SchedulerError> {
        let state = mouse.state();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                log::info!("Algorithm started");
                algorithm.run(&mut mouse);
                log::info!("Algorithm finished after {} ms", mouse.millis());
            })?;

        Ok(Self {
            state,
            handle: Some(handle),
        })
    }

    /// Whether the algorithm has returned, panicked or been stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Asks the algorithm to stop at its next interface call and waits for it.
    pub fn stop(&mut self) -> Result<(), SchedulerError> {
        self.state.request_shutdown();
        self.join()
    }

    /// Waits for the algorithm to end. A stopped algorithm counts as a clean end. Joining again
    /// returns immediately.
    pub fn join(&mut self) -> Result<(), SchedulerError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match handle.join() {
            Ok(()) => Ok(()),
            Err(payload) if payload.is::<Shutdown>() => {
                log::info!("Algorithm stopped");
                Ok(())
            }
            Err(payload) => Err(SchedulerError::AlgorithmPanicked(panic_message(&*payload))),
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.stop() {
                log::error!("{e}");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::{Duration, Instant},
    };

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        domain::{Cell, Maze, TileGeometry},
        state::InterfaceType,
        tests::{test_config, Ticker, World},
    };

    fn world(interface_type: InterfaceType) -> World {
        World::new(
            Maze::new(16, 16, TileGeometry::default()).unwrap(),
            test_config(interface_type),
        )
    }

    fn wait_until_finished(scheduler: &Scheduler) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !scheduler.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    struct Counter(Arc<AtomicUsize>);

    impl Algorithm for Counter {
        fn run(&mut self, mouse: &mut MouseInterface) {
            for x in 0..mouse.maze_width() {
                mouse.set_tile_color(x, 0, 'g');
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_algorithm_runs_to_completion() {
        let world = world(InterfaceType::Discrete);
        let count = Arc::new(AtomicUsize::new(0));

        let mut scheduler =
            Scheduler::spawn(Counter(Arc::clone(&count)), world.interface()).unwrap();
        wait_until_finished(&scheduler);

        assert!(scheduler.is_finished());
        scheduler.join().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 16);
        scheduler.join().unwrap();
    }

    #[test]
    fn test_closure_algorithm_moves_the_mouse() {
        let world = world(InterfaceType::Discrete);
        let _ticker = Ticker::spawn(&world);

        let mut scheduler = Scheduler::spawn(
            |mouse: &mut MouseInterface| {
                mouse.move_forward();
                mouse.turn_right();
                mouse.move_forward();
            },
            world.interface(),
        )
        .unwrap();
        scheduler.join().unwrap();

        assert_eq!(world.cell(), Cell::new(1, 1));
    }

    #[test]
    fn test_algorithm_panic_is_reported() {
        let world = world(InterfaceType::Discrete);
        let algorithm: fn(&mut MouseInterface) = |_| panic!("lost");
        let mut scheduler = Scheduler::spawn(algorithm, world.interface()).unwrap();

        let error = scheduler.join().unwrap_err();
        insta::assert_snapshot!(error.to_string(), @"the algorithm panicked: lost");
    }

    #[test]
    fn test_interface_misuse_is_reported() {
        let world = world(InterfaceType::Continuous);
        let mut scheduler = Scheduler::spawn(
            |mouse: &mut MouseInterface| mouse.turn_left(),
            world.interface(),
        )
        .unwrap();

        assert!(matches!(
            scheduler.join(),
            Err(SchedulerError::AlgorithmPanicked(message)) if message.contains("Discrete")
        ));
    }

    #[test]
    fn test_stop_interrupts_blocking_algorithm() {
        let world = world(InterfaceType::Continuous);
        let algorithm: fn(&mut MouseInterface) = |mouse| loop {
            mouse.delay(10);
        };
        let mut scheduler = Scheduler::spawn(algorithm, world.interface()).unwrap();

        thread::sleep(Duration::from_millis(20));
        assert!(!scheduler.is_finished());
        scheduler.stop().unwrap();
        assert!(scheduler.is_finished());
        assert!(world.state.shutdown_requested());
    }

    #[test]
    fn test_stop_interrupts_paused_movement() {
        let world = world(InterfaceType::Discrete);
        world.state.set_paused(true);
        let _ticker = Ticker::spawn(&world);

        let mut scheduler = Scheduler::spawn(
            |mouse: &mut MouseInterface| mouse.move_forward(),
            world.interface(),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(20));
        scheduler.stop().unwrap();
        assert_eq!(world.cell(), Cell::new(0, 0));
    }

    #[test]
    fn test_drop_stops_algorithm() {
        let world = world(InterfaceType::Continuous);
        let algorithm: fn(&mut MouseInterface) = |mouse| loop {
            mouse.read("front");
        };
        let scheduler = Scheduler::spawn(algorithm, world.interface()).unwrap();

        drop(scheduler);
        assert!(world.state.shutdown_requested());
    }
}
