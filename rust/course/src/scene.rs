// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph contract.
//!
//! The host owns the scene graph; holes only add and remove nodes through
//! [`SceneGraph`]. [`SceneStore`] is an in-memory implementation backed by a
//! slot map, used by tests and headless hosts.

use crate::config::Material;
use crate::descriptor::HazardKind;
use crate::error::{Error, Result};
use nalgebra::{Isometry3, Point3};
use putt_lite_geometry::Mesh;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key for a node in the scene graph.
    pub struct NodeKey;
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Root of one hole's resources.
    Container { hole: usize },
    Surface,
    Rim,
    Wall,
    StartMarker,
    HazardFill(HazardKind),
    Bumper,
}

/// A node handed to the scene graph. Meshes and materials are owned by the
/// node, never shared between holes.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub role: NodeRole,
    /// Transform relative to the parent.
    pub transform: Isometry3<f64>,
    pub mesh: Option<Mesh>,
    pub material: Option<Material>,
}

impl SceneNode {
    pub fn container(hole: usize, transform: Isometry3<f64>) -> Self {
        Self {
            role: NodeRole::Container { hole },
            transform,
            mesh: None,
            material: None,
        }
    }

    pub fn mesh(role: NodeRole, mesh: Mesh, material: Material, transform: Isometry3<f64>) -> Self {
        Self {
            role,
            transform,
            mesh: Some(mesh),
            material: Some(material),
        }
    }
}

/// Host scene graph as seen by the hole builder.
pub trait SceneGraph {
    /// Add `node` under `parent`, or at the root when `parent` is `None`.
    fn add_node(&mut self, parent: Option<NodeKey>, node: SceneNode) -> Result<NodeKey>;

    /// Remove `key` and all of its descendants. Returns false if it was not present.
    fn remove_node(&mut self, key: NodeKey) -> bool;

    /// Accumulated transform from the root down to `key`.
    fn world_transform(&self, key: NodeKey) -> Option<Isometry3<f64>>;

    fn contains(&self, key: NodeKey) -> bool;

    fn world_position(&self, key: NodeKey) -> Option<Point3<f64>> {
        self.world_transform(key)
            .map(|t| Point3::from(t.translation.vector))
    }
}

#[derive(Debug)]
struct NodeEntry {
    node: SceneNode,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

/// In-memory scene graph.
#[derive(Debug)]
pub struct SceneStore {
    nodes: SlotMap<NodeKey, NodeEntry>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key).map(|e| &e.node)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|e| e.parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(key)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes
            .iter()
            .filter(|(_, e)| e.parent.is_none())
            .map(|(k, _)| k)
    }

    /// Number of nodes carrying a mesh.
    pub fn mesh_count(&self) -> usize {
        self.nodes.values().filter(|e| e.node.mesh.is_some()).count()
    }

    /// Nodes with the given role.
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = (NodeKey, &SceneNode)> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, e)| e.node.role == role)
            .map(|(k, e)| (k, &e.node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for SceneStore {
    fn add_node(&mut self, parent: Option<NodeKey>, node: SceneNode) -> Result<NodeKey> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(p) {
                return Err(Error::InvalidState(format!(
                    "parent node {:?} is not in the scene",
                    p
                )));
            }
        }

        let key = self.nodes.insert(NodeEntry {
            node,
            parent,
            children: Vec::new(),
        });
        if let Some(entry) = parent.and_then(|p| self.nodes.get_mut(p)) {
            entry.children.push(key);
        }
        Ok(key)
    }

    fn remove_node(&mut self, key: NodeKey) -> bool {
        let Some(entry) = self.nodes.remove(key) else {
            return false;
        };

        if let Some(parent) = entry.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != key);
        }

        let mut stack = entry.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(child) {
                stack.extend(removed.children);
            }
        }
        true
    }

    fn world_transform(&self, key: NodeKey) -> Option<Isometry3<f64>> {
        let mut entry = self.nodes.get(key)?;
        let mut transform = entry.node.transform;
        while let Some(parent) = entry.parent {
            entry = self.nodes.get(parent)?;
            transform = entry.node.transform * transform;
        }
        Some(transform)
    }

    fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }
}
