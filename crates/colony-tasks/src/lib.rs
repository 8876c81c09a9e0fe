//! Colony work orders on top of the task engine.
//!
//! [`tasks`] holds one [`task_engine::Task`] implementation per kind of work, [`acts`] the leaf
//! behaviors they compile into, and [`world`] the query/mutation surface both consume. The
//! in-memory [`sandbox::Colony`] implements that surface for tests and headless runs.

#![forbid(unsafe_code)]

pub mod acts;
pub mod model;
pub mod sandbox;
pub mod tasks;
pub mod world;

pub use acts::{
    CarryAct, CraftItemAct, CraftResourceAct, DigAct, DropOffAct, FleeEntityAct, GoToAct,
    KillEntityAct, PickUpAct,
};
pub use model::{
    CraftItem, DesignationKind, DesignationTarget, EntityId, FightOrFlight, Relationship,
    ResourceAmount, Voxel,
};
pub use sandbox::{Colony, Creature, Pile};
pub use tasks::{CraftItemTask, CraftResourceTask, DigTask, HaulTask, KillEntityTask, KillMode};
pub use world::{ColonyWorldMut, ColonyWorldView};
