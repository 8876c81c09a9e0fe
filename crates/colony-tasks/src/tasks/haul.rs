use act_core::{Act, Sequence, TickContext};
use task_engine::{DeleteKind, DeleteReason, ScriptError, Task, TaskPriority, INFEASIBLE_COST};

use crate::{
    CarryAct, ColonyWorldMut, ColonyWorldView, DesignationKind, DesignationTarget, DropOffAct,
    EntityId, GoToAct, PickUpAct, Voxel,
};

/// Carry a loose resource pile to a stockpile zone.
#[derive(Debug, Clone)]
pub struct HaulTask {
    pile: EntityId,
    zone: Voxel,
    name: String,
}

impl HaulTask {
    pub fn new(pile: EntityId, zone: Voxel) -> Self {
        Self {
            pile,
            zone,
            name: format!("Haul {pile} to {zone}"),
        }
    }

    pub fn pile(&self) -> EntityId {
        self.pile
    }

    fn designated<W: ColonyWorldView>(&self, world: &W) -> bool {
        world.is_designated(DesignationTarget::Entity(self.pile), DesignationKind::Haul)
    }

    /// The pile still lies around, or this agent is already carrying it.
    fn available_to<W: ColonyWorldView>(&self, agent: W::Agent, world: &W) -> bool {
        world.pile(self.pile).is_some()
            && world.carrier(self.pile).map_or(true, |carrier| carrier == agent)
    }
}

impl<W> Task<W> for HaulTask
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
        self.designated(world)
            && self.available_to(agent, world)
            && world
                .position(self.pile)
                .is_some_and(|pos| world.is_reachable(agent, pos))
            && world.is_reachable(agent, self.zone)
    }

    fn compute_cost(&self, agent: W::Agent, world: &W, already_checked_feasible: bool) -> f32 {
        if !already_checked_feasible && !self.is_feasible(agent, world) {
            return INFEASIBLE_COST;
        }
        match (world.position(agent), world.position(self.pile)) {
            (Some(pos), Some(pile)) => pos.dist_sq(pile) + pile.dist_sq(self.zone),
            _ => INFEASIBLE_COST,
        }
    }

    fn create_script(
        &self,
        _ctx: &TickContext,
        _agent: W::Agent,
        world: &W,
    ) -> Result<Box<dyn Act<W>>, ScriptError> {
        let pile_pos = world
            .position(self.pile)
            .ok_or_else(|| ScriptError::MissingTarget(self.pile.to_string()))?;
        let delivery: Vec<Box<dyn Act<W>>> = vec![
            Box::new(GoToAct::new(self.zone)),
            Box::new(DropOffAct::new(self.pile)),
        ];
        let steps: Vec<Box<dyn Act<W>>> = vec![
            Box::new(GoToAct::new(pile_pos)),
            Box::new(PickUpAct::new(self.pile)),
            Box::new(CarryAct::new(self.pile, Box::new(Sequence::new(delivery)))),
        ];
        Ok(Box::new(Sequence::new(steps)))
    }

    fn should_retry(&self, agent: W::Agent, world: &W) -> bool {
        self.designated(world) && self.available_to(agent, world)
    }

    fn should_delete(&self, agent: W::Agent, world: &W) -> Option<DeleteReason> {
        if !self.available_to(agent, world) {
            Some(DeleteReason::new(DeleteKind::TargetGone))
        } else if !self.designated(world) {
            Some(DeleteReason::new(DeleteKind::DesignationRemoved))
        } else {
            None
        }
    }

    fn clone_task(&self) -> Box<dyn Task<W>> {
        Box::new(self.clone())
    }
}
