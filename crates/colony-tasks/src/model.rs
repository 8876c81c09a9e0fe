//! Identities and value types shared by tasks, acts and worlds.

use std::fmt;

use act_core::AgentId;
use serde::{Deserialize, Serialize};

/// Integer grid cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Voxel {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn dist_sq(self, other: Voxel) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        let dz = (self.z - other.z) as f32;
        dx * dx + dy * dy + dz * dz
    }

    /// Number of single steps (diagonals included) between two cells.
    pub fn chebyshev(self, other: Voxel) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    pub fn step_toward(self, goal: Voxel) -> Voxel {
        Voxel {
            x: self.x + (goal.x - self.x).signum(),
            y: self.y + (goal.y - self.y).signum(),
            z: self.z + (goal.z - self.z).signum(),
        }
    }

    /// One step directly away from `threat`. Standing on the threat picks +x.
    pub fn step_away(self, threat: Voxel) -> Voxel {
        if self == threat {
            return Voxel::new(self.x + 1, self.y, self.z);
        }
        Voxel {
            x: self.x + (self.x - threat.x).signum(),
            y: self.y + (self.y - threat.y).signum(),
            z: self.z + (self.z - threat.z).signum(),
        }
    }
}

impl fmt::Display for Voxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// World-owned identity of a creature or object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl AgentId for EntityId {
    fn stable_id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A count of some resource. In requirements `resource` names a tag; in the stockpile it names
/// a concrete resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub resource: String,
    pub count: u32,
}

impl ResourceAmount {
    pub fn new(resource: impl Into<String>, count: u32) -> Self {
        Self {
            resource: resource.into(),
            count,
        }
    }
}

/// A craftable recipe plus the size of the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftItem {
    pub name: String,
    /// Resource type deposited when a resource craft finishes. Empty means `name`.
    #[serde(default)]
    pub resource_created: String,
    #[serde(default)]
    pub required_resources: Vec<ResourceAmount>,
    /// Tag of the station the work happens at (`"stove"`, `"anvil"`). `None` crafts anywhere.
    #[serde(default)]
    pub craft_location: Option<String>,
    #[serde(default = "default_craft_ticks")]
    pub craft_ticks: u32,
    #[serde(default = "default_num_repeats")]
    pub num_repeats: u32,
    #[serde(default)]
    pub edible: bool,
}

fn default_craft_ticks() -> u32 {
    3
}
fn default_num_repeats() -> u32 {
    1
}

impl CraftItem {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            resource_created: name.clone(),
            name,
            required_resources: Vec::new(),
            craft_location: None,
            craft_ticks: default_craft_ticks(),
            num_repeats: default_num_repeats(),
            edible: false,
        }
    }

    pub fn requiring(mut self, tag: impl Into<String>, count: u32) -> Self {
        self.required_resources.push(ResourceAmount::new(tag, count));
        self
    }

    pub fn at(mut self, station_tag: impl Into<String>) -> Self {
        self.craft_location = Some(station_tag.into());
        self
    }

    pub fn repeated(mut self, num_repeats: u32) -> Self {
        self.num_repeats = num_repeats;
        self
    }

    pub fn taking(mut self, craft_ticks: u32) -> Self {
        self.craft_ticks = craft_ticks;
        self
    }

    pub fn edible(mut self) -> Self {
        self.edible = true;
        self
    }

    pub fn output(&self) -> &str {
        if self.resource_created.is_empty() {
            &self.name
        } else {
            &self.resource_created
        }
    }

    pub fn verb(&self) -> &'static str {
        if self.edible {
            "Cook"
        } else {
            "Craft"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignationKind {
    Dig,
    Craft,
    Attack,
    Chop,
    Haul,
}

/// What a designation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignationTarget {
    Voxel(Voxel),
    Entity(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    Friendly,
    Neutral,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightOrFlight {
    Fight,
    Flee,
}
