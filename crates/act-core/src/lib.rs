//! Resumable, tick-stepped behavior primitives.
//!
//! An [`Act`] is an explicit state machine stepped once per simulation tick. It answers
//! `Running` until it reaches a terminal `Success` or `Failure`, after which the driver discards
//! it. Combinators in [`combinators`] compose leaf acts into single-use behavior trees.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod act;
pub mod agent;
pub mod blackboard;
pub mod combinators;
pub mod tick;
pub mod world;

pub use act::{Act, ActOutcome, ActRunner, ActStatus};
pub use agent::AgentId;
pub use blackboard::{BbKey, Blackboard};
pub use combinators::{Condition, Sequence, Wrap};
pub use tick::TickContext;
pub use world::{WorldMut, WorldView};
