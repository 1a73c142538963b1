//! Simulation core of a micromouse maze simulator.
//!
//! A [`domain::Mouse`] drives through a [`domain::Maze`] while an algorithm steers it from its own
//! thread through the [`interface::MouseInterface`]. The [`simulator`] advances the physics and
//! the [`scheduler`] runs the algorithm. The bevy plugins in [`simulator`] and [`controller`] tie
//! both together into an app.


pub mod config;
pub mod controller;
pub mod display;
pub mod domain;
pub mod interface;
pub mod resource;
pub mod scheduler;
pub mod simulator;
pub mod state;
