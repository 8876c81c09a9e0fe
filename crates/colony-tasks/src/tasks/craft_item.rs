use act_core::{Act, Sequence, TickContext};
use task_engine::{DeleteKind, DeleteReason, ScriptError, Task, TaskPriority, INFEASIBLE_COST};

use super::distance_cost;
use crate::{
    ColonyWorldMut, CraftItem, CraftItemAct, DesignationKind, DesignationTarget, GoToAct, Voxel,
};

/// Build an item (a bed, a door) at a designated site.
///
/// Several agents may share the site when the crew size allows it; their work accumulates on the
/// site and whoever finishes it pays the resources.
#[derive(Debug, Clone)]
pub struct CraftItemTask {
    item: CraftItem,
    site: Voxel,
    crew: usize,
    name: String,
}

impl CraftItemTask {
    pub fn new(item: CraftItem, site: Voxel) -> Self {
        let name = format!("Craft {} at {site}", item.name);
        Self {
            item,
            site,
            crew: 1,
            name,
        }
    }

    pub fn with_crew(mut self, crew: usize) -> Self {
        self.crew = crew.max(1);
        self
    }

    pub fn site(&self) -> Voxel {
        self.site
    }

    fn designated<W: ColonyWorldMut>(&self, world: &W) -> bool {
        world.is_designated(DesignationTarget::Voxel(self.site), DesignationKind::Craft)
    }

    fn can_build<W: ColonyWorldMut>(&self, agent: W::Agent, world: &W) -> bool {
        if !self.designated(world) {
            return false;
        }
        let has_location = match self.item.craft_location.as_deref() {
            None => true,
            Some(tag) => world
                .position(agent)
                .and_then(|pos| world.nearest_with_tag(pos, tag))
                .is_some(),
        };
        has_location && world.has_resources(&self.item.required_resources)
    }
}

impl<W> Task<W> for CraftItemTask
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

    fn max_assignees(&self) -> usize {
        self.crew
    }

    fn is_feasible(&self, agent: W::Agent, world: &W) -> bool {
        self.can_build(agent, world) && world.is_reachable(agent, self.site)
    }

    fn compute_cost(&self, agent: W::Agent, world: &W, already_checked_feasible: bool) -> f32 {
        if !already_checked_feasible && !self.is_feasible(agent, world) {
            return INFEASIBLE_COST;
        }
        distance_cost(world, agent, self.site)
    }

    fn create_script(
        &self,
        _ctx: &TickContext,
        _agent: W::Agent,
        world: &W,
    ) -> Result<Box<dyn Act<W>>, ScriptError> {
        if !self.designated(world) {
            return Err(ScriptError::InvalidState(format!(
                "craft site {} is not designated",
                self.site
            )));
        }
        let steps: Vec<Box<dyn Act<W>>> = vec![
            Box::new(GoToAct::adjacent(self.site)),
            Box::new(CraftItemAct::new(self.site, self.item.clone())),
        ];
        Ok(Box::new(Sequence::new(steps)))
    }

    fn should_retry(&self, _agent: W::Agent, world: &W) -> bool {
        self.designated(world)
    }

    fn should_delete(&self, _agent: W::Agent, world: &W) -> Option<DeleteReason> {
        if self.designated(world) {
            None
        } else {
            Some(DeleteReason::new(DeleteKind::DesignationRemoved))
        }
    }

    fn clone_task(&self) -> Box<dyn Task<W>> {
        Box::new(self.clone())
    }
}
