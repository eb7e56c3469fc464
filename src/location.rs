//! Containment hierarchy of game locations.
//!
//! Built from the host's location graph and cached until the host reports that
//! the set of locations changed.

use crate::geometry::TilePos;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationKind {
    Outdoor,
    /// Indoor location entered directly from outdoors.
    Building,
    /// Indoor location entered from another indoor location.
    Room,
}

/// A door or map edge leading from one location to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warp {
    /// Location the warp leads to
    pub target: String,
    /// Tile of the warp in the location that owns it
    pub tile: TilePos,
}

/// One location as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    pub name: String,
    #[serde(default)]
    pub outdoors: bool,
    #[serde(default)]
    pub warps: Vec<Warp>,
}

/// Host collaborator exposing the game's location graph.
pub trait LocationGraph {
    fn nodes(&self) -> Vec<LocationNode>;
}

/// A location graph held in memory, e.g. loaded from a scenario file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticGraph {
    pub locations: Vec<LocationNode>,
}

impl LocationGraph for StaticGraph {
    fn nodes(&self) -> Vec<LocationNode> {
        self.locations.clone()
    }
}

/// Cached metadata about where a location sits in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationContext {
    pub name: String,
    pub kind: LocationKind,
    /// Outdoor location this one ultimately belongs to
    pub root: String,
    /// Location whose door leads here; `None` for outdoor locations
    pub parent: Option<String>,
    /// Tile of the door in `parent` that leads here
    pub warp: Option<TilePos>,
    /// Neighboring outdoor locations and the warp tile leading to each
    pub neighbors: HashMap<String, TilePos>,
}

impl LocationContext {
    pub fn is_outdoor(&self) -> bool {
        self.kind == LocationKind::Outdoor
    }
}

/// All known location contexts, keyed by location name.
#[derive(Debug, Clone, Default)]
pub struct LocationContexts {
    contexts: HashMap<String, LocationContext>,
}

impl LocationContexts {
    pub fn build(graph: &impl LocationGraph) -> Self {
        let nodes = graph.nodes();
        let by_name: HashMap<&str, &LocationNode> =
            nodes.iter().map(|node| (node.name.as_str(), node)).collect();
        let mut contexts: HashMap<String, LocationContext> = HashMap::new();

        for node in nodes.iter().filter(|node| node.outdoors) {
            let neighbors = node
                .warps
                .iter()
                .filter(|warp| {
                    warp.target != node.name
                        && by_name.get(warp.target.as_str()).is_some_and(|n| n.outdoors)
                })
                .map(|warp| (warp.target.clone(), warp.tile))
                .collect();

            contexts.insert(
                node.name.clone(),
                LocationContext {
                    name: node.name.clone(),
                    kind: LocationKind::Outdoor,
                    root: node.name.clone(),
                    parent: None,
                    warp: None,
                    neighbors,
                },
            );
        }

        // Walk indoors from every outdoor root; first visit wins.
        for root in nodes.iter().filter(|node| node.outdoors) {
            let mut queue = VecDeque::from([root]);
            while let Some(current) = queue.pop_front() {
                for warp in &current.warps {
                    let Some(&target) = by_name.get(warp.target.as_str()) else {
                        continue;
                    };
                    if target.outdoors || contexts.contains_key(&target.name) {
                        continue;
                    }
                    let kind = if current.outdoors {
                        LocationKind::Building
                    } else {
                        LocationKind::Room
                    };
                    contexts.insert(
                        target.name.clone(),
                        LocationContext {
                            name: target.name.clone(),
                            kind,
                            root: root.name.clone(),
                            parent: Some(current.name.clone()),
                            warp: Some(warp.tile),
                            neighbors: HashMap::new(),
                        },
                    );
                    queue.push_back(target);
                }
            }
        }

        log::debug!("Built {} location contexts", contexts.len());
        Self { contexts }
    }

    /// Replaces the cache after the host's location list changed.
    pub fn rebuild(&mut self, graph: &impl LocationGraph) {
        *self = Self::build(graph);
    }

    pub fn get(&self, name: &str) -> Option<&LocationContext> {
        self.contexts.get(name)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// The building that contains `name`, following rooms up to their
    /// outermost indoor parent. `None` for outdoor or unknown locations.
    pub fn building_of(&self, name: &str) -> Option<&str> {
        let mut current = self.contexts.get(name)?;
        loop {
            match current.kind {
                LocationKind::Outdoor => return None,
                LocationKind::Building => return Some(current.name.as_str()),
                LocationKind::Room => {
                    current = self.contexts.get(current.parent.as_deref()?)?;
                }
            }
        }
    }
}
