//! In-memory colony used by tests and the headless runner.

use std::collections::{BTreeMap, BTreeSet};

use act_core::{WorldMut, WorldView};
use serde::{Deserialize, Serialize};

use crate::{
    ColonyWorldMut, ColonyWorldView, DesignationKind, DesignationTarget, EntityId, FightOrFlight,
    Relationship, ResourceAmount, Voxel,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    pub faction: String,
    pub position: Voxel,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default = "default_energy")]
    pub energy: f32,
    /// Runs from fights instead of taking them.
    #[serde(default)]
    pub flees: bool,
}

fn default_health() -> f32 {
    100.0
}
fn default_energy() -> f32 {
    100.0
}

impl Creature {
    pub fn new(name: impl Into<String>, faction: impl Into<String>, position: Voxel) -> Self {
        Self {
            name: name.into(),
            faction: faction.into(),
            position,
            health: default_health(),
            energy: default_energy(),
            flees: false,
        }
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn fleeing(mut self) -> Self {
        self.flees = true;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pile {
    pub position: Voxel,
    pub contents: ResourceAmount,
    #[serde(default)]
    pub carrier: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
struct StockEntry {
    tags: BTreeSet<String>,
    count: u32,
}

impl StockEntry {
    fn matches(&self, resource: &str, tag: &str) -> bool {
        resource == tag || self.tags.contains(tag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Colony {
    creatures: BTreeMap<EntityId, Creature>,
    piles: BTreeMap<EntityId, Pile>,
    voxels: BTreeMap<Voxel, f32>,
    blocked: BTreeSet<Voxel>,
    designations: BTreeSet<(DesignationTarget, DesignationKind)>,
    stockpile: BTreeMap<String, StockEntry>,
    stations: Vec<(String, Voxel)>,
    craft_sites: BTreeMap<Voxel, u32>,
    built: Vec<(Voxel, String)>,
    next_entity: u64,
}

impl Colony {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> EntityId {
        self.next_entity += 1;
        EntityId(self.next_entity)
    }

    pub fn spawn(&mut self, creature: Creature) -> EntityId {
        let id = self.next_id();
        self.creatures.insert(id, creature);
        id
    }

    pub fn add_pile(&mut self, position: Voxel, contents: ResourceAmount) -> EntityId {
        let id = self.next_id();
        self.piles.insert(
            id,
            Pile {
                position,
                contents,
                carrier: None,
            },
        );
        id
    }

    pub fn add_solid(&mut self, voxel: Voxel, health: f32) {
        self.voxels.insert(voxel, health);
    }

    /// Mark a cell as unreachable.
    pub fn block(&mut self, voxel: Voxel) {
        self.blocked.insert(voxel);
    }

    pub fn add_station(&mut self, tag: impl Into<String>, voxel: Voxel) {
        self.stations.push((tag.into(), voxel));
    }

    pub fn remove_station(&mut self, voxel: Voxel) {
        self.stations.retain(|(_, at)| *at != voxel);
    }

    pub fn add_resource(&mut self, resource: impl Into<String>, tags: &[&str], count: u32) {
        let entry = self.stockpile.entry(resource.into()).or_default();
        entry.tags.extend(tags.iter().map(|t| t.to_string()));
        entry.count += count;
    }

    pub fn stock(&self, resource: &str) -> u32 {
        self.stockpile.get(resource).map_or(0, |e| e.count)
    }

    /// Every stocked resource type with a non-zero count, by name.
    pub fn stock_levels(&self) -> Vec<ResourceAmount> {
        self.stockpile
            .iter()
            .filter(|(_, entry)| entry.count > 0)
            .map(|(name, entry)| ResourceAmount::new(name.clone(), entry.count))
            .collect()
    }

    pub fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    /// Kill a creature outside of any task.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.health = 0.0;
        }
    }

    pub fn built(&self) -> &[(Voxel, String)] {
        &self.built
    }

    pub fn craft_progress(&self, site: Voxel) -> u32 {
        self.craft_sites.get(&site).copied().unwrap_or(0)
    }
}

impl WorldView for Colony {
    type Agent = EntityId;
}

impl WorldMut for Colony {}

impl ColonyWorldView for Colony {
    fn position(&self, entity: EntityId) -> Option<Voxel> {
        if let Some(creature) = self.creatures.get(&entity) {
            return Some(creature.position);
        }
        let pile = self.piles.get(&entity)?;
        match pile.carrier {
            Some(carrier) => self.creatures.get(&carrier).map(|c| c.position),
            None => Some(pile.position),
        }
    }

    fn creature_name(&self, entity: EntityId) -> String {
        self.creatures
            .get(&entity)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| entity.to_string())
    }

    fn exists(&self, entity: EntityId) -> bool {
        self.creatures.contains_key(&entity) || self.piles.contains_key(&entity)
    }

    fn is_dead(&self, entity: EntityId) -> bool {
        self.creatures.get(&entity).is_some_and(Creature::is_dead)
    }

    fn is_reachable(&self, _agent: EntityId, to: Voxel) -> bool {
        !self.blocked.contains(&to)
    }

    fn relationship(&self, agent: EntityId, other: EntityId) -> Relationship {
        match (self.creatures.get(&agent), self.creatures.get(&other)) {
            (Some(a), Some(b)) if a.faction == b.faction => Relationship::Friendly,
            (Some(_), Some(_)) => Relationship::Hostile,
            _ => Relationship::Neutral,
        }
    }

    fn fight_or_flight(&self, agent: EntityId, _threat: EntityId) -> FightOrFlight {
        if self.creatures.get(&agent).is_some_and(|c| c.flees) {
            FightOrFlight::Flee
        } else {
            FightOrFlight::Fight
        }
    }

    fn is_designated(&self, target: DesignationTarget, kind: DesignationKind) -> bool {
        self.designations.contains(&(target, kind))
    }

    fn voxel_health(&self, voxel: Voxel) -> Option<f32> {
        self.voxels.get(&voxel).copied()
    }

    fn list_resources_with_tag(&self, tag: &str) -> Vec<ResourceAmount> {
        self.stockpile
            .iter()
            .filter(|(name, entry)| entry.count > 0 && entry.matches(name, tag))
            .map(|(name, entry)| ResourceAmount::new(name.clone(), entry.count))
            .collect()
    }

    fn nearest_with_tag(&self, from: Voxel, tag: &str) -> Option<Voxel> {
        self.stations
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, at)| *at)
            .min_by(|a, b| from.dist_sq(*a).total_cmp(&from.dist_sq(*b)).then(a.cmp(b)))
    }

    fn pile(&self, pile: EntityId) -> Option<&ResourceAmount> {
        self.piles.get(&pile).map(|p| &p.contents)
    }

    fn carrier(&self, pile: EntityId) -> Option<EntityId> {
        self.piles.get(&pile).and_then(|p| p.carrier)
    }
}

impl ColonyWorldMut for Colony {
    fn set_position(&mut self, entity: EntityId, position: Voxel) {
        if let Some(creature) = self.creatures.get_mut(&entity) {
            creature.position = position;
        }
    }

    fn add_designation(&mut self, target: DesignationTarget, kind: DesignationKind) {
        self.designations.insert((target, kind));
    }

    fn remove_designation(&mut self, target: DesignationTarget, kind: DesignationKind) -> bool {
        self.designations.remove(&(target, kind))
    }

    fn withdraw(&mut self, needed: &[ResourceAmount]) -> Option<Vec<ResourceAmount>> {
        let mut left: BTreeMap<&str, u32> = self
            .stockpile
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.count))
            .collect();

        let mut taken = Vec::with_capacity(needed.len());
        for need in needed {
            let (name, _) = self.stockpile.iter().find(|(name, entry)| {
                entry.matches(name, &need.resource)
                    && left.get(name.as_str()).copied().unwrap_or(0) >= need.count
            })?;
            if let Some(count) = left.get_mut(name.as_str()) {
                *count -= need.count;
            }
            taken.push(ResourceAmount::new(name.clone(), need.count));
        }

        for amount in &taken {
            if let Some(entry) = self.stockpile.get_mut(&amount.resource) {
                entry.count -= amount.count;
            }
        }
        Some(taken)
    }

    fn deposit(&mut self, resource: ResourceAmount) {
        self.stockpile.entry(resource.resource).or_default().count += resource.count;
    }

    fn damage_voxel(&mut self, voxel: Voxel, amount: f32) -> bool {
        let Some(health) = self.voxels.get_mut(&voxel) else {
            return false;
        };
        *health -= amount;
        if *health > 0.0 {
            return false;
        }
        self.voxels.remove(&voxel);
        true
    }

    fn damage_entity(&mut self, entity: EntityId, amount: f32) -> bool {
        let Some(creature) = self.creatures.get_mut(&entity) else {
            return false;
        };
        if creature.is_dead() {
            return false;
        }
        creature.health = (creature.health - amount).max(0.0);
        creature.is_dead()
    }

    fn spend_energy(&mut self, agent: EntityId, amount: f32) {
        if let Some(creature) = self.creatures.get_mut(&agent) {
            creature.energy = (creature.energy - amount).max(0.0);
        }
    }

    fn work_on(&mut self, site: Voxel, amount: u32) -> u32 {
        let progress = self.craft_sites.entry(site).or_insert(0);
        *progress += amount;
        *progress
    }

    fn finish_craft(&mut self, site: Voxel, item: &str) {
        self.craft_sites.remove(&site);
        self.built.push((site, item.to_string()));
    }

    fn pick_up(&mut self, agent: EntityId, pile: EntityId) -> Option<ResourceAmount> {
        let pile = self.piles.get_mut(&pile)?;
        match pile.carrier {
            Some(carrier) if carrier != agent => None,
            _ => {
                pile.carrier = Some(agent);
                Some(pile.contents.clone())
            }
        }
    }

    fn drop_off(&mut self, agent: EntityId, pile: EntityId) -> Option<ResourceAmount> {
        if self.piles.get(&pile)?.carrier != Some(agent) {
            return None;
        }
        let pile = self.piles.remove(&pile)?;
        self.deposit(pile.contents.clone());
        Some(pile.contents)
    }

    fn put_down(&mut self, agent: EntityId, pile: EntityId) {
        let Some(at) = self.creatures.get(&agent).map(|c| c.position) else {
            return;
        };
        if let Some(pile) = self.piles.get_mut(&pile) {
            if pile.carrier == Some(agent) {
                pile.carrier = None;
                pile.position = at;
            }
        }
    }
}
