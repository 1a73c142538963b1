//! The resource module wraps the shared simulation state for use with Bevy.

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use bevy::ecs::system::Resource;

use crate::{
    config::SimConfig,
    display::TileDisplay,
    domain::{Maze, SharedMouse},
    scheduler::Scheduler,
    state::{SharedState, SharedStateHandle},
};

#[derive(Resource)]
pub struct MouseRes(SharedMouse);

impl Deref for MouseRes {
    type Target = SharedMouse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SharedMouse> for MouseRes {
    fn from(value: SharedMouse) -> Self {
        Self(value)
    }
}

#[derive(Resource)]
pub struct MazeRes(Arc<Maze>);

impl Deref for MazeRes {
    type Target = Arc<Maze>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Arc<Maze>> for MazeRes {
    fn from(value: Arc<Maze>) -> Self {
        Self(value)
    }
}

#[derive(Resource)]
pub struct StateRes(SharedStateHandle);

impl StateRes {
    pub fn handle(&self) -> SharedStateHandle {
        Arc::clone(&self.0)
    }
}

impl Deref for StateRes {
    type Target = SharedState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SharedStateHandle> for StateRes {
    fn from(value: SharedStateHandle) -> Self {
        Self(value)
    }
}

#[derive(Resource)]
pub struct DisplayRes(Arc<dyn TileDisplay>);

impl DisplayRes {
    pub fn shared(&self) -> Arc<dyn TileDisplay> {
        Arc::clone(&self.0)
    }
}

impl Deref for DisplayRes {
    type Target = dyn TileDisplay;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl From<Arc<dyn TileDisplay>> for DisplayRes {
    fn from(value: Arc<dyn TileDisplay>) -> Self {
        Self(value)
    }
}

#[derive(Resource)]
pub struct ConfigRes(SimConfig);

impl Deref for ConfigRes {
    type Target = SimConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SimConfig> for ConfigRes {
    fn from(value: SimConfig) -> Self {
        Self(value)
    }
}

/// The running algorithm. Empty until the controller has spawned it.
#[derive(Resource, Default)]
pub struct SchedulerRes(Option<Scheduler>);

impl Deref for SchedulerRes {
    type Target = Option<Scheduler>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SchedulerRes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Option<Scheduler>> for SchedulerRes {
    fn from(value: Option<Scheduler>) -> Self {
        Self(value)
    }
}
