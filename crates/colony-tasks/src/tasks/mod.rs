//! One task type per kind of colony work.

mod craft_item;
mod craft_resource;
mod dig;
mod haul;
mod kill;

pub use craft_item::CraftItemTask;
pub use craft_resource::CraftResourceTask;
pub use dig::DigTask;
pub use haul::HaulTask;
pub use kill::{KillEntityTask, KillMode};

use task_engine::INFEASIBLE_COST;

use crate::{ColonyWorldView, EntityId, Voxel};

/// Squared distance from the agent to `target`, or the sentinel when the agent has no position.
fn distance_cost<W: ColonyWorldView>(world: &W, agent: EntityId, target: Voxel) -> f32 {
    world
        .position(agent)
        .map(|pos| pos.dist_sq(target))
        .unwrap_or(INFEASIBLE_COST)
}
