//! Controller running the algorithm.
//!
//! The algorithm is spawned on its own thread when the plugin is built and drives the mouse
//! through the mouse interface. The app exits once the algorithm has finished, the mouse has
//! crashed or the algorithm has failed.

use std::sync::{Arc, Mutex, PoisonError};

use bevy::{app::AppExit, prelude::*};
use once_cell::sync::OnceCell;

use crate::{
    config::SimConfig,
    domain::{Maze, SharedMouse},
    interface::MouseInterface,
    resource::{ConfigRes, DisplayRes, MazeRes, MouseRes, SchedulerRes, StateRes},
    scheduler::{Algorithm, Scheduler},
};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Crashed,
    Failed,
}

pub type SharedOutcome = Arc<OnceCell<Outcome>>;

#[derive(Resource)]
struct OutcomeRes(SharedOutcome);

pub struct Controller<A> {
    algorithm: Mutex<Option<A>>,
    outcome: SharedOutcome,
}

impl<A: Algorithm> Controller<A> {
    pub fn new(algorithm: A) -> Self {
        Self {
            algorithm: Mutex::new(Some(algorithm)),
            outcome: SharedOutcome::default(),
        }
    }

    /// Set once the app is about to exit.
    pub fn outcome(&self) -> SharedOutcome {
        Arc::clone(&self.outcome)
    }
}

fn spawn(app: &App, algorithm: impl Algorithm) -> Option<Scheduler> {
    let world = &app.world;
    let interface = MouseInterface::new(
        Arc::<Maze>::clone(world.resource::<MazeRes>()),
        SharedMouse::clone(world.resource::<MouseRes>()),
        world.resource::<DisplayRes>().shared(),
        world.resource::<StateRes>().handle(),
        SimConfig::clone(world.resource::<ConfigRes>()),
    );

    match Scheduler::spawn(algorithm, interface) {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            log::error!("{e}");
            None
        }
    }
}

fn supervise(
    mut scheduler: ResMut<SchedulerRes>,
    state: Res<StateRes>,
    outcome: Res<OutcomeRes>,
    mut exit: EventWriter<AppExit>,
) {
    let crashed = state.crashed();
    let finished = scheduler.iter().all(Scheduler::is_finished);
    if !crashed && !finished {
        return;
    }

    let result = match scheduler.take().map(|mut scheduler| scheduler.stop()) {
        Some(Ok(())) if crashed => Outcome::Crashed,
        Some(Ok(())) => Outcome::Finished,
        Some(Err(e)) => {
            log::error!("{e}");
            Outcome::Failed
        }
        None => Outcome::Failed,
    };

    log::info!("Run ended: {result:?}");
    let _ = outcome.0.set(result);
    exit.send(AppExit);
}

impl<A: Algorithm> Plugin for Controller<A> {
    fn build(&self, app: &mut App) {
        let algorithm = self
            .algorithm
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let scheduler = algorithm.and_then(|algorithm| spawn(app, algorithm));

        app.insert_resource(SchedulerRes::from(scheduler))
            .insert_resource(OutcomeRes(self.outcome()))
            .add_systems(Update, supervise);
    }
}
