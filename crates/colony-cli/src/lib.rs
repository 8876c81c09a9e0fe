//! Scenario files and the headless simulation loop behind the `colony` binary.

pub mod runner;
pub mod scenario;

pub use runner::{run, RunReport};
pub use scenario::{Order, Scenario};
