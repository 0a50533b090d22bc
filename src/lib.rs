//! Shared pieces for the Advent of Code 2021 day binaries: a stack, a
//! sentinel-bordered digit grid, coordinates, input loading, logging setup,
//! and the harness that runs each day's puzzle variants in parallel.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod harness;
pub mod input;
pub mod logging;
pub mod stack;

pub use config::{Config, DayInputs};
pub use error::{Error, Result};
pub use geometry::Coordinate;
pub use grid::BorderedGrid;
pub use harness::{Harness, Report};
pub use stack::Stack;
