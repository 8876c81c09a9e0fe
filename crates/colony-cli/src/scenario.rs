//! YAML scenario: who works, what the world holds and which orders the player gave.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use colony_tasks::{
    Colony, ColonyWorldMut, CraftItem, CraftItemTask, CraftResourceTask, Creature,
    DesignationKind, DesignationTarget, DigTask, EntityId, HaulTask, KillEntityTask, KillMode,
    ResourceAmount, Voxel,
};
use task_engine::Task;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Upper bound on simulated ticks.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Creatures that take work from the pool.
    pub agents: Vec<Creature>,
    /// Everyone else (wildlife, invaders).
    pub creatures: Vec<Creature>,
    pub solids: Vec<Solid>,
    pub stations: Vec<Station>,
    pub stockpile: Vec<Stock>,
    pub piles: Vec<PileSpec>,
    pub orders: Vec<Order>,
}

fn default_ticks() -> u64 {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solid {
    pub at: Voxel,
    #[serde(default = "default_solid_health")]
    pub health: f32,
}

fn default_solid_health() -> f32 {
    50.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub tag: String,
    pub at: Voxel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub resource: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PileSpec {
    pub name: String,
    pub at: Voxel,
    pub resource: String,
    pub count: u32,
}

/// A player order. Orders that need a designation place it when the scenario is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Dig {
        at: Voxel,
    },
    CraftItem {
        item: CraftItem,
        site: Voxel,
        #[serde(default = "default_crew")]
        crew: usize,
    },
    CraftResource {
        item: CraftItem,
    },
    Kill {
        target: String,
        #[serde(default = "default_kill_mode")]
        mode: KillMode,
    },
    Haul {
        pile: String,
        zone: Voxel,
    },
}

fn default_crew() -> usize {
    1
}
fn default_kill_mode() -> KillMode {
    KillMode::Attack
}

/// A scenario turned into a live colony plus the tasks its orders produced.
pub struct Built {
    pub colony: Colony,
    pub agents: Vec<EntityId>,
    pub tasks: Vec<Box<dyn Task<Colony>>>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        let scenario: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))?;
        Ok(scenario)
    }

    pub fn build(&self) -> Result<Built> {
        let mut colony = Colony::new();
        let mut names: BTreeMap<&str, EntityId> = BTreeMap::new();

        let mut agents = Vec::with_capacity(self.agents.len());
        for creature in &self.agents {
            let id = colony.spawn(creature.clone());
            names.insert(creature.name.as_str(), id);
            agents.push(id);
        }
        for creature in &self.creatures {
            let id = colony.spawn(creature.clone());
            names.insert(creature.name.as_str(), id);
        }
        for pile in &self.piles {
            let id = colony.add_pile(pile.at, ResourceAmount::new(pile.resource.clone(), pile.count));
            names.insert(pile.name.as_str(), id);
        }
        for solid in &self.solids {
            colony.add_solid(solid.at, solid.health);
        }
        for station in &self.stations {
            colony.add_station(station.tag.clone(), station.at);
        }
        for stock in &self.stockpile {
            let tags: Vec<&str> = stock.tags.iter().map(String::as_str).collect();
            colony.add_resource(stock.resource.clone(), &tags, stock.count);
        }

        let lookup = |name: &str| -> Result<EntityId> {
            match names.get(name) {
                Some(id) => Ok(*id),
                None => bail!("Order refers to unknown entity '{name}'"),
            }
        };

        let mut tasks: Vec<Box<dyn Task<Colony>>> = Vec::with_capacity(self.orders.len());
        for (index, order) in self.orders.iter().enumerate() {
            match order {
                Order::Dig { at } => {
                    colony.add_designation(DesignationTarget::Voxel(*at), DesignationKind::Dig);
                    tasks.push(Box::new(DigTask::new(*at)));
                }
                Order::CraftItem { item, site, crew } => {
                    colony.add_designation(DesignationTarget::Voxel(*site), DesignationKind::Craft);
                    tasks.push(Box::new(
                        CraftItemTask::new(item.clone(), *site).with_crew(*crew),
                    ));
                }
                Order::CraftResource { item } => {
                    tasks.push(Box::new(CraftResourceTask::new(item.clone(), index as u64 + 1)));
                }
                Order::Kill { target, mode } => {
                    let target = lookup(target)?;
                    let kind = match mode {
                        KillMode::Attack => Some(DesignationKind::Attack),
                        KillMode::Chop => Some(DesignationKind::Chop),
                        KillMode::Auto => None,
                    };
                    if let Some(kind) = kind {
                        colony.add_designation(DesignationTarget::Entity(target), kind);
                    }
                    tasks.push(Box::new(KillEntityTask::new(target, *mode)));
                }
                Order::Haul { pile, zone } => {
                    let pile = lookup(pile)?;
                    colony.add_designation(DesignationTarget::Entity(pile), DesignationKind::Haul);
                    tasks.push(Box::new(HaulTask::new(pile, *zone)));
                }
            }
        }

        Ok(Built {
            colony,
            agents,
            tasks,
        })
    }
}
