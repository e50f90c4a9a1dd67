//! Road surface markings: a graph of entrances, points, lines, rules and fillers laid over
//! an external road network, and the pipeline that turns their styles into decals, meshes
//! and prefab instances grouped by level of detail.

#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate common;

#[macro_use]
extern crate log;

pub mod api;
mod change_detection;
mod config;
mod error;
mod manager;
pub mod model;
pub mod render;
mod road;
pub mod style;
#[cfg(test)]
mod tests;

pub use change_detection::*;
pub use config::*;
pub use error::*;
pub use manager::*;
pub use model::*;
pub use road::*;
pub use style::*;
