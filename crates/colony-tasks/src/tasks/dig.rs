use act_core::{Act, Sequence, TickContext};
use task_engine::{DeleteKind, DeleteReason, ScriptError, Task, TaskPriority, INFEASIBLE_COST};

use super::distance_cost;
use crate::{ColonyWorldMut, DesignationKind, DesignationTarget, DigAct, GoToAct, Voxel};

/// Dig out a designated voxel.
#[derive(Debug, Clone)]
pub struct DigTask {
    voxel: Voxel,
    name: String,
}

impl DigTask {
    pub fn new(voxel: Voxel) -> Self {
        Self {
            voxel,
            name: format!("Dig {voxel}"),
        }
    }

    pub fn voxel(&self) -> Voxel {
        self.voxel
    }

    fn designated<W: ColonyWorldMut>(&self, world: &W) -> bool {
        world.is_designated(DesignationTarget::Voxel(self.voxel), DesignationKind::Dig)
    }
}

impl<W> Task<W> for DigTask
where
    W: ColonyWorldMut + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> TaskPriority {
        TaskPriority::Medium
    }

    fn auto_retry(&self) -> bool {
        true
    }

    fn is_feasible(&self, agent: W::Agent, world: &W) -> bool {
        self.designated(world)
            && world.voxel_health(self.voxel).is_some()
            && world.is_reachable(agent, self.voxel)
    }

    fn compute_cost(&self, agent: W::Agent, world: &W, already_checked_feasible: bool) -> f32 {
        if !already_checked_feasible && !self.is_feasible(agent, world) {
            return INFEASIBLE_COST;
        }
        distance_cost(world, agent, self.voxel)
    }

    fn create_script(
        &self,
        _ctx: &TickContext,
        _agent: W::Agent,
        world: &W,
    ) -> Result<Box<dyn Act<W>>, ScriptError> {
        if world.voxel_health(self.voxel).is_none() {
            return Err(ScriptError::MissingTarget(format!("voxel {}", self.voxel)));
        }
        let steps: Vec<Box<dyn Act<W>>> = vec![
            Box::new(GoToAct::adjacent(self.voxel)),
            Box::new(DigAct::new(self.voxel)),
        ];
        Ok(Box::new(Sequence::new(steps)))
    }

    fn should_retry(&self, _agent: W::Agent, world: &W) -> bool {
        self.designated(world) && world.voxel_health(self.voxel).is_some()
    }

    fn should_delete(&self, _agent: W::Agent, world: &W) -> Option<DeleteReason> {
        if !self.designated(world) {
            Some(DeleteReason::new(DeleteKind::DesignationRemoved))
        } else if world.voxel_health(self.voxel).is_none() {
            Some(DeleteReason::new(DeleteKind::TargetGone))
        } else {
            None
        }
    }

    fn clone_task(&self) -> Box<dyn Task<W>> {
        Box::new(self.clone())
    }
}
