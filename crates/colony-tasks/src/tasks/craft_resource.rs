use act_core::{Act, ActStatus, AgentId, Blackboard, Sequence, TickContext, Wrap};
use task_engine::{spawn_task, DeleteReason, ScriptError, Task, TaskPriority, INFEASIBLE_COST};

use crate::{ColonyWorldMut, ColonyWorldView, CraftItem, CraftResourceAct, GoToAct, Voxel};

/// Turn stockpiled inputs into a resource at a station, `num_repeats` times.
///
/// Each run crafts one unit. While repeats remain, the finished run queues a copy of the task
/// with one repeat fewer under the same order id.
#[derive(Debug, Clone)]
pub struct CraftResourceTask {
    item: CraftItem,
    order: u64,
    name: String,
}

impl CraftResourceTask {
    pub fn new(item: CraftItem, order: u64) -> Self {
        let name = format!("{} {} (order {order})", item.verb(), item.name);
        Self { item, order, name }
    }

    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn item(&self) -> &CraftItem {
        &self.item
    }

    fn station<W: ColonyWorldView>(&self, agent: W::Agent, world: &W) -> Option<Voxel> {
        let pos = world.position(agent)?;
        match self.item.craft_location.as_deref() {
            None => Some(pos),
            Some(tag) => world.nearest_with_tag(pos, tag),
        }
    }

    fn has_resources<W: ColonyWorldView>(&self, world: &W) -> bool {
        world.has_resources(&self.item.required_resources)
    }

    fn has_location<W: ColonyWorldView>(&self, agent: W::Agent, world: &W) -> bool {
        self.item.craft_location.is_none() || self.station(agent, world).is_some()
    }
}

impl<W> Task<W> for CraftResourceTask
where
    W: ColonyWorldMut + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> TaskPriority {
        TaskPriority::Low
    }

    fn auto_retry(&self) -> bool {
        true
    }

    fn is_feasible(&self, agent: W::Agent, world: &W) -> bool {
        self.has_resources(world) && self.has_location(agent, world)
    }

    fn compute_cost(&self, agent: W::Agent, world: &W, already_checked_feasible: bool) -> f32 {
        if !already_checked_feasible && !self.is_feasible(agent, world) {
            return INFEASIBLE_COST;
        }
        match (world.position(agent), self.station(agent, world)) {
            (Some(pos), Some(station)) => pos.dist_sq(station),
            _ => INFEASIBLE_COST,
        }
    }

    fn create_script(
        &self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &W,
    ) -> Result<Box<dyn Act<W>>, ScriptError> {
        let mut steps: Vec<Box<dyn Act<W>>> = Vec::new();
        if let Some(tag) = self.item.craft_location.as_deref() {
            let station = self
                .station(agent, world)
                .ok_or_else(|| ScriptError::NoLocation(tag.to_string()))?;
            steps.push(Box::new(GoToAct::adjacent(station)));
        }
        steps.push(Box::new(CraftResourceAct::new(self.item.clone())));

        let order = self.order;
        let mut next = (self.item.num_repeats > 1).then(|| {
            let mut item = self.item.clone();
            item.num_repeats -= 1;
            item
        });
        steps.push(Box::new(Wrap::new(
            "queue_repeat",
            move |_ctx: &TickContext, agent: W::Agent, _world: &mut W, bb: &mut Blackboard| {
                if let Some(item) = next.take() {
                    tracing::debug!(
                        agent = agent.stable_id(),
                        order,
                        remaining = item.num_repeats,
                        "Queued next craft of order"
                    );
                    spawn_task::<W>(bb, Box::new(CraftResourceTask::new(item, order)));
                }
                ActStatus::Success
            },
        )));

        Ok(Box::new(Sequence::new(steps)))
    }

    fn should_retry(&self, agent: W::Agent, world: &W) -> bool {
        self.is_feasible(agent, world)
    }

    fn should_delete(&self, agent: W::Agent, world: &W) -> Option<DeleteReason> {
        if !self.has_resources(world) {
            return Some(DeleteReason::insufficient_resources(format!(
                "{} cancelled craft task: Not enough resources.",
                world.creature_name(agent)
            )));
        }
        if !self.has_location(agent, world) {
            let location = self.item.craft_location.as_deref().unwrap_or_default();
            return Some(DeleteReason::missing_location(format!(
                "{} cancelled craft task: Needs {location}.",
                world.creature_name(agent)
            )));
        }
        None
    }

    fn clone_task(&self) -> Box<dyn Task<W>> {
        Box::new(self.clone())
    }
}
