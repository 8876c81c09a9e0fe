//! Leaf acts. Each one commits at most one unit of world change per tick.

use act_core::{Act, ActStatus, AgentId, Blackboard, TickContext};

use crate::{
    ColonyWorldMut, CraftItem, DesignationKind, DesignationTarget, EntityId, ResourceAmount,
    Voxel,
};

/// Energy an agent spends per swing of a pick.
pub const DIG_ENERGY_LOSS: f32 = 10.0;
pub const DIG_POWER: f32 = 25.0;
pub const STRIKE_DAMAGE: f32 = 10.0;
/// Steps taken by one flight from a threat.
pub const FLEE_PATH_LENGTH: u32 = 5;

/// Walk one cell per tick until within `within` steps of `goal`.
#[derive(Debug, Clone)]
pub struct GoToAct {
    goal: Voxel,
    within: i32,
}

impl GoToAct {
    pub fn new(goal: Voxel) -> Self {
        Self { goal, within: 0 }
    }

    /// Stop next to the goal instead of on it.
    pub fn adjacent(goal: Voxel) -> Self {
        Self { goal, within: 1 }
    }
}

impl<W> Act<W> for GoToAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        let Some(pos) = world.position(agent) else {
            return ActStatus::Failure;
        };
        if pos.chebyshev(self.goal) <= self.within {
            return ActStatus::Success;
        }
        if !world.is_reachable(agent, self.goal) {
            return ActStatus::Failure;
        }
        world.set_position(agent, pos.step_toward(self.goal));
        ActStatus::Running
    }

    fn name(&self) -> &str {
        "go_to"
    }
}

/// Swing at a voxel until it breaks.
#[derive(Debug, Clone)]
pub struct DigAct {
    voxel: Voxel,
    energy_loss: f32,
    power: f32,
    swing_ticks: u32,
    cooldown: u32,
}

impl DigAct {
    pub fn new(voxel: Voxel) -> Self {
        Self {
            voxel,
            energy_loss: DIG_ENERGY_LOSS,
            power: DIG_POWER,
            swing_ticks: 2,
            cooldown: 0,
        }
    }

    pub fn with_swing_ticks(mut self, swing_ticks: u32) -> Self {
        self.swing_ticks = swing_ticks.max(1);
        self
    }
}

impl<W> Act<W> for DigAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        if world.voxel_health(self.voxel).is_none() {
            return ActStatus::Success;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return ActStatus::Running;
        }

        world.spend_energy(agent, self.energy_loss);
        let destroyed = world.damage_voxel(self.voxel, self.power);
        self.cooldown = self.swing_ticks.saturating_sub(1);
        if !destroyed {
            return ActStatus::Running;
        }

        world.remove_designation(DesignationTarget::Voxel(self.voxel), DesignationKind::Dig);
        tracing::debug!(agent = agent.stable_id(), voxel = %self.voxel, "Voxel dug out");
        ActStatus::Success
    }

    fn name(&self) -> &str {
        "dig"
    }
}

/// Put work into a designated craft site; whoever completes it pays the resources.
#[derive(Debug, Clone)]
pub struct CraftItemAct {
    site: Voxel,
    item: CraftItem,
}

impl CraftItemAct {
    pub fn new(site: Voxel, item: CraftItem) -> Self {
        Self { site, item }
    }
}

impl<W> Act<W> for CraftItemAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        let designation = DesignationTarget::Voxel(self.site);
        if !world.is_designated(designation, DesignationKind::Craft) {
            return ActStatus::Failure;
        }
        if world.work_on(self.site, 1) < self.item.craft_ticks {
            return ActStatus::Running;
        }
        if world.withdraw(&self.item.required_resources).is_none() {
            return ActStatus::Failure;
        }
        world.finish_craft(self.site, &self.item.name);
        world.remove_designation(designation, DesignationKind::Craft);
        tracing::debug!(agent = agent.stable_id(), site = %self.site, item = %self.item.name, "Item crafted");
        ActStatus::Success
    }

    fn name(&self) -> &str {
        "craft_item"
    }
}

/// Work a recipe for `craft_ticks` ticks, then convert its inputs into one unit of output.
///
/// Inputs are withdrawn only at the end, so a recipe interrupted halfway costs nothing.
#[derive(Debug, Clone)]
pub struct CraftResourceAct {
    item: CraftItem,
    progress: u32,
}

impl CraftResourceAct {
    pub fn new(item: CraftItem) -> Self {
        Self { item, progress: 0 }
    }
}

impl<W> Act<W> for CraftResourceAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        self.progress += 1;
        if self.progress < self.item.craft_ticks {
            return ActStatus::Running;
        }
        if world.withdraw(&self.item.required_resources).is_none() {
            return ActStatus::Failure;
        }
        world.deposit(ResourceAmount::new(self.item.output(), 1));
        tracing::debug!(
            agent = agent.stable_id(),
            resource = self.item.output(),
            "Resource crafted"
        );
        ActStatus::Success
    }

    fn name(&self) -> &str {
        "craft_resource"
    }
}

/// Chase a target and strike it once per swing until it dies.
#[derive(Debug, Clone)]
pub struct KillEntityAct {
    target: EntityId,
    damage: f32,
    swing_ticks: u32,
    cooldown: u32,
}

impl KillEntityAct {
    pub fn new(target: EntityId) -> Self {
        Self {
            target,
            damage: STRIKE_DAMAGE,
            swing_ticks: 2,
            cooldown: 0,
        }
    }
}

impl<W> Act<W> for KillEntityAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        if !world.exists(self.target) || world.is_dead(self.target) {
            return ActStatus::Failure;
        }
        let (Some(pos), Some(target_pos)) = (world.position(agent), world.position(self.target))
        else {
            return ActStatus::Failure;
        };

        if pos.chebyshev(target_pos) > 1 {
            if !world.is_reachable(agent, target_pos) {
                return ActStatus::Failure;
            }
            world.set_position(agent, pos.step_toward(target_pos));
            return ActStatus::Running;
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return ActStatus::Running;
        }
        self.cooldown = self.swing_ticks.saturating_sub(1);
        if !world.damage_entity(self.target, self.damage) {
            return ActStatus::Running;
        }

        let target = DesignationTarget::Entity(self.target);
        world.remove_designation(target, DesignationKind::Attack);
        world.remove_designation(target, DesignationKind::Chop);
        tracing::debug!(agent = agent.stable_id(), target = %self.target, "Target killed");
        ActStatus::Success
    }

    fn name(&self) -> &str {
        "kill_entity"
    }
}

/// Run straight away from a threat for a fixed number of steps.
#[derive(Debug, Clone)]
pub struct FleeEntityAct {
    threat: EntityId,
    path_length: u32,
    taken: u32,
}

impl FleeEntityAct {
    pub fn new(threat: EntityId) -> Self {
        Self {
            threat,
            path_length: FLEE_PATH_LENGTH,
            taken: 0,
        }
    }
}

impl<W> Act<W> for FleeEntityAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        let (Some(pos), Some(threat_pos)) = (world.position(agent), world.position(self.threat))
        else {
            return ActStatus::Success;
        };
        let next = pos.step_away(threat_pos);
        if !world.is_reachable(agent, next) {
            return ActStatus::Failure;
        }
        world.set_position(agent, next);
        self.taken += 1;
        if self.taken >= self.path_length {
            ActStatus::Success
        } else {
            ActStatus::Running
        }
    }

    fn name(&self) -> &str {
        "flee_entity"
    }
}

#[derive(Debug, Clone)]
pub struct PickUpAct {
    pile: EntityId,
}

impl PickUpAct {
    pub fn new(pile: EntityId) -> Self {
        Self { pile }
    }
}

impl<W> Act<W> for PickUpAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        match world.pick_up(agent, self.pile) {
            Some(_) => ActStatus::Success,
            None => ActStatus::Failure,
        }
    }

    fn name(&self) -> &str {
        "pick_up"
    }
}

#[derive(Debug, Clone)]
pub struct DropOffAct {
    pile: EntityId,
}

impl DropOffAct {
    pub fn new(pile: EntityId) -> Self {
        Self { pile }
    }
}

impl<W> Act<W> for DropOffAct
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> ActStatus {
        if world.drop_off(agent, self.pile).is_none() {
            return ActStatus::Failure;
        }
        world.remove_designation(DesignationTarget::Entity(self.pile), DesignationKind::Haul);
        ActStatus::Success
    }

    fn name(&self) -> &str {
        "drop_off"
    }
}

/// Run `inner` while holding a pile. If `inner` fails or is cancelled, the pile is set down
/// where the agent stands.
pub struct CarryAct<W>
where
    W: ColonyWorldMut + 'static,
{
    pile: EntityId,
    inner: Box<dyn Act<W>>,
}

impl<W> CarryAct<W>
where
    W: ColonyWorldMut + 'static,
{
    pub fn new(pile: EntityId, inner: Box<dyn Act<W>>) -> Self {
        Self { pile, inner }
    }
}

impl<W> Act<W> for CarryAct<W>
where
    W: ColonyWorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> ActStatus {
        let status = self.inner.tick(ctx, agent, world, blackboard);
        if status == ActStatus::Failure {
            world.put_down(agent, self.pile);
        }
        status
    }

    fn cancel(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        self.inner.cancel(ctx, agent, world, blackboard);
        world.put_down(agent, self.pile);
        tracing::debug!(agent = agent.stable_id(), pile = %self.pile, "Haul interrupted, pile set down");
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
