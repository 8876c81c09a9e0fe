use act_core::{WorldMut, WorldView};

use crate::{
    DesignationKind, DesignationTarget, EntityId, FightOrFlight, Relationship, ResourceAmount,
    Voxel,
};

/// Read-only colony queries. Task feasibility, cost and retry/delete policy only ever see this.
pub trait ColonyWorldView: WorldView<Agent = EntityId> {
    fn position(&self, entity: EntityId) -> Option<Voxel>;

    /// Display name used in announcements.
    fn creature_name(&self, entity: EntityId) -> String;

    /// Whether the entity is still in the world (dead bodies count).
    fn exists(&self, entity: EntityId) -> bool;

    fn is_dead(&self, entity: EntityId) -> bool;

    fn is_reachable(&self, agent: EntityId, to: Voxel) -> bool;

    fn relationship(&self, agent: EntityId, other: EntityId) -> Relationship;

    fn fight_or_flight(&self, agent: EntityId, threat: EntityId) -> FightOrFlight;

    fn is_designated(&self, target: DesignationTarget, kind: DesignationKind) -> bool;

    /// Remaining health of a solid voxel; `None` for open space.
    fn voxel_health(&self, voxel: Voxel) -> Option<f32>;

    /// Stockpiled resources carrying `tag`, one entry per resource type.
    fn list_resources_with_tag(&self, tag: &str) -> Vec<ResourceAmount>;

    /// Every requirement (by tag) is covered by a single resource type with enough stock.
    fn has_resources(&self, needed: &[ResourceAmount]) -> bool {
        needed.iter().all(|need| {
            self.list_resources_with_tag(&need.resource)
                .iter()
                .any(|have| have.count >= need.count)
        })
    }

    /// Closest object (station, workshop) carrying `tag`.
    fn nearest_with_tag(&self, from: Voxel, tag: &str) -> Option<Voxel>;

    /// Contents of a loose resource pile.
    fn pile(&self, pile: EntityId) -> Option<&ResourceAmount>;

    /// Agent currently carrying the pile, if any.
    fn carrier(&self, pile: EntityId) -> Option<EntityId>;
}

pub trait ColonyWorldMut: WorldMut + ColonyWorldView {
    fn set_position(&mut self, entity: EntityId, position: Voxel);

    fn add_designation(&mut self, target: DesignationTarget, kind: DesignationKind);

    fn remove_designation(&mut self, target: DesignationTarget, kind: DesignationKind) -> bool;

    /// Remove the requirements from the stockpile, all or nothing.
    fn withdraw(&mut self, needed: &[ResourceAmount]) -> Option<Vec<ResourceAmount>>;

    fn deposit(&mut self, resource: ResourceAmount);

    /// Returns `true` when the voxel was destroyed by this hit.
    fn damage_voxel(&mut self, voxel: Voxel, amount: f32) -> bool;

    /// Returns `true` when the entity died from this hit.
    fn damage_entity(&mut self, entity: EntityId, amount: f32) -> bool;

    fn spend_energy(&mut self, agent: EntityId, amount: f32);

    /// Add work to a shared craft site and return the accumulated total.
    fn work_on(&mut self, site: Voxel, amount: u32) -> u32;

    /// Turn a finished craft site into a placed item.
    fn finish_craft(&mut self, site: Voxel, item: &str);

    /// Lift a pile. Fails when someone else already carries it.
    fn pick_up(&mut self, agent: EntityId, pile: EntityId) -> Option<ResourceAmount>;

    /// Move a carried pile into the stockpile, removing it from the world.
    fn drop_off(&mut self, agent: EntityId, pile: EntityId) -> Option<ResourceAmount>;

    /// Set a carried pile down where its carrier stands. No-op unless `agent` carries it.
    fn put_down(&mut self, agent: EntityId, pile: EntityId);
}
