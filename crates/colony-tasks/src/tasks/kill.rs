use act_core::{Act, Blackboard, Condition, Sequence, TickContext};
use serde::{Deserialize, Serialize};
use task_engine::{DeleteKind, DeleteReason, ScriptError, Task, TaskPriority, INFEASIBLE_COST};

use crate::{
    ColonyWorldMut, ColonyWorldView, DesignationKind, DesignationTarget, EntityId, FightOrFlight,
    FleeEntityAct, KillEntityAct, Relationship,
};

/// Targets farther than this (in cells) are given up on.
const MAX_PURSUIT_DISTANCE: f32 = 100.0;
const COST_SCALE: f32 = 0.01;

/// Why the target is being killed. Chop and Attack follow a player designation; Auto is
/// self-defence and needs none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KillMode {
    Chop,
    Attack,
    Auto,
}

impl KillMode {
    fn designation(self) -> Option<DesignationKind> {
        match self {
            KillMode::Chop => Some(DesignationKind::Chop),
            KillMode::Attack => Some(DesignationKind::Attack),
            KillMode::Auto => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KillEntityTask {
    target: EntityId,
    mode: KillMode,
    name: String,
}

impl KillEntityTask {
    pub fn new(target: EntityId, mode: KillMode) -> Self {
        let verb = match mode {
            KillMode::Chop => "Chop",
            KillMode::Attack | KillMode::Auto => "Kill",
        };
        Self {
            target,
            mode,
            name: format!("{verb} {target}"),
        }
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn mode(&self) -> KillMode {
        self.mode
    }

    fn target_alive<W: ColonyWorldView>(&self, world: &W) -> bool {
        world.exists(self.target) && !world.is_dead(self.target)
    }

    fn designated<W: ColonyWorldView>(&self, world: &W) -> bool {
        match self.mode.designation() {
            Some(kind) => world.is_designated(DesignationTarget::Entity(self.target), kind),
            None => true,
        }
    }
}

impl<W> Task<W> for KillEntityTask
where
    W: ColonyWorldMut + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> TaskPriority {
        TaskPriority::Urgent
    }

    fn auto_retry(&self) -> bool {
        true
    }

    fn is_feasible(&self, agent: W::Agent, world: &W) -> bool {
        if agent == self.target || !self.target_alive(world) {
            return false;
        }
        match self.mode {
            KillMode::Chop | KillMode::Attack => self.designated(world),
            KillMode::Auto => {
                world
                    .position(self.target)
                    .is_some_and(|pos| world.is_reachable(agent, pos))
                    && world.relationship(agent, self.target) != Relationship::Friendly
            }
        }
    }

    fn compute_cost(&self, agent: W::Agent, world: &W, already_checked_feasible: bool) -> f32 {
        if !already_checked_feasible && !self.is_feasible(agent, world) {
            return INFEASIBLE_COST;
        }
        match (world.position(agent), world.position(self.target)) {
            (Some(pos), Some(target)) => pos.dist_sq(target) * COST_SCALE,
            _ => INFEASIBLE_COST,
        }
    }

    fn create_script(
        &self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &W,
    ) -> Result<Box<dyn Act<W>>, ScriptError> {
        if !self.target_alive(world) || world.position(self.target).is_none() {
            return Err(ScriptError::MissingTarget(self.target.to_string()));
        }

        if self.mode != KillMode::Chop
            && world.fight_or_flight(agent, self.target) == FightOrFlight::Flee
        {
            // Running away does not finish the job: fail afterwards unless the threat is gone.
            let target = self.target;
            let steps: Vec<Box<dyn Act<W>>> = vec![
                Box::new(FleeEntityAct::new(target)),
                Box::new(Condition::new(
                    "threat_gone",
                    move |_ctx: &TickContext, _agent: W::Agent, world: &W, _bb: &Blackboard| {
                        !world.exists(target) || world.is_dead(target)
                    },
                )),
            ];
            return Ok(Box::new(Sequence::new(steps)));
        }

        Ok(Box::new(KillEntityAct::new(self.target)))
    }

    fn should_retry(&self, _agent: W::Agent, world: &W) -> bool {
        self.target_alive(world)
    }

    fn should_delete(&self, agent: W::Agent, world: &W) -> Option<DeleteReason> {
        if !self.target_alive(world) {
            return Some(DeleteReason::new(DeleteKind::TargetGone));
        }
        if let (Some(pos), Some(target)) = (world.position(agent), world.position(self.target)) {
            if pos.dist_sq(target) > MAX_PURSUIT_DISTANCE * MAX_PURSUIT_DISTANCE {
                return Some(DeleteReason::new(DeleteKind::OutOfRange));
            }
        }
        if !self.designated(world) {
            return Some(DeleteReason::new(DeleteKind::DesignationRemoved));
        }
        None
    }

    fn clone_task(&self) -> Box<dyn Task<W>> {
        Box::new(self.clone())
    }
}
