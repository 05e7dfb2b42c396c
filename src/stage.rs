//! # Stage Graph
//!
//! Arena-based storage for the planes a renderer draws.
//!
//! ## Responsibilities
//! - **Plane Storage**: `Vec<Option<PlaneNode>>` arena with `PlaneId` indices.
//! - **Hierarchy**: parent/child links with cycle prevention.
//! - **Handles**: `PlaneHandle` gives tiles and tween callbacks scoped
//!   mutable access with stale-handle detection.
//!
//! The engine writes positions, scales and named uniform slots; meshes,
//! textures and draw calls stay with the host renderer, which walks this
//! graph once per frame.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3};

use crate::error::EngineError;

pub type PlaneId = usize;

/// Uniform slot names the bundled grid shader consumes.
pub const U_PLANE_SIZES: &str = "uPlaneSizes";
pub const U_IMAGE_SIZES: &str = "uImageSizes";
pub const U_VIEWPORT_SIZES: &str = "uViewportSizes";
pub const U_STRENGTH: &str = "uStrength";

/// Value slot a renderer binds as a shader uniform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Vec2([f32; 2]),
}

/// One drawable plane.
#[derive(Clone, Debug)]
pub struct PlaneNode {
    /// World-space position of the plane's center.
    pub position: Vec3,
    /// World-space extents.
    pub scale: Vec2,
    /// Named uniform slots, handed verbatim to the shader.
    pub uniforms: HashMap<String, UniformValue>,
    /// Indices of child planes.
    pub children: Vec<PlaneId>,
    /// Index of the parent plane.
    pub parent: Option<PlaneId>,
}

impl PlaneNode {
    fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec2::ONE,
            uniforms: HashMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Writes a uniform slot, replacing any previous value.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }
}

/// The stage arena.
#[derive(Default)]
pub struct Stage {
    /// `Option` allows removal and slot recycling.
    nodes: Vec<Option<PlaneNode>>,
    free_indices: Vec<usize>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
        self.free_indices.clear();
    }

    /// Adds a fresh plane and returns its id, reusing freed slots.
    pub fn add_plane(&mut self) -> PlaneId {
        if let Some(id) = self.free_indices.pop() {
            self.nodes[id] = Some(PlaneNode::new());
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(PlaneNode::new()));
            id
        }
    }

    /// Recursively destroys a plane and its children, freeing their slots.
    pub fn destroy(&mut self, id: PlaneId) {
        if id >= self.nodes.len() || self.nodes[id].is_none() {
            return;
        }

        let (parent_id, children) = {
            let Some(node) = self.nodes[id].as_ref() else {
                return;
            };
            (node.parent, node.children.clone())
        };

        if let Some(pid) = parent_id {
            self.remove_child(pid, id);
        }
        for child in children {
            self.destroy(child);
        }

        self.nodes[id] = None;
        self.free_indices.push(id);
    }

    /// Attempts to parent `child` under `parent`.
    ///
    /// Returns `false` when rejected: missing planes, self-parenting, or a
    /// relationship that would close a cycle.
    pub fn try_set_parent(&mut self, parent: PlaneId, child: PlaneId) -> bool {
        if parent == child {
            return false;
        }
        if self.get(parent).is_none() || self.get(child).is_none() {
            return false;
        }

        // Reject cycles: `child` must not already be an ancestor of `parent`.
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return false;
            }
            current = self.get(id).and_then(|n| n.parent);
        }

        let old_parent = self.get(child).and_then(|n| n.parent);
        if let Some(old) = old_parent {
            if old == parent {
                return true;
            }
            self.remove_child(old, child);
        }

        if let Some(p_node) = self.nodes.get_mut(parent).and_then(|n| n.as_mut()) {
            if !p_node.children.contains(&child) {
                p_node.children.push(child);
            }
        } else {
            return false;
        }

        if let Some(c_node) = self.nodes.get_mut(child).and_then(|n| n.as_mut()) {
            c_node.parent = Some(parent);
            true
        } else {
            false
        }
    }

    /// Removes `child` from `parent`'s children list and clears the back
    /// link when it points at this parent.
    pub fn remove_child(&mut self, parent: PlaneId, child: PlaneId) {
        if let Some(p_node) = self.nodes.get_mut(parent).and_then(|n| n.as_mut()) {
            if let Some(pos) = p_node.children.iter().position(|&c| c == child) {
                p_node.children.remove(pos);
            }
        }
        if let Some(c_node) = self.nodes.get_mut(child).and_then(|n| n.as_mut()) {
            if c_node.parent == Some(parent) {
                c_node.parent = None;
            }
        }
    }

    pub fn get(&self, id: PlaneId) -> Option<&PlaneNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    pub fn get_mut(&mut self, id: PlaneId) -> Option<&mut PlaneNode> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    /// Number of live planes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scoped mutable view of one plane.
///
/// Tiles and tween callbacks hold clones of this; every access locks the
/// stage briefly and fails with `StalePlane` once the node is gone, so a
/// leaked callback can never write through freed state.
#[derive(Clone)]
pub struct PlaneHandle {
    stage: Arc<Mutex<Stage>>,
    id: PlaneId,
}

impl PlaneHandle {
    pub fn new(stage: Arc<Mutex<Stage>>, id: PlaneId) -> Self {
        Self { stage, id }
    }

    pub fn id(&self) -> PlaneId {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.stage.lock().unwrap().get(self.id).is_some()
    }

    /// Reads through the handle.
    pub fn with<R>(&self, f: impl FnOnce(&PlaneNode) -> R) -> Result<R, EngineError> {
        let stage = self.stage.lock().unwrap();
        stage
            .get(self.id)
            .map(f)
            .ok_or(EngineError::StalePlane(self.id))
    }

    /// Writes through the handle.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut PlaneNode) -> R) -> Result<R, EngineError> {
        let mut stage = self.stage.lock().unwrap();
        stage
            .get_mut(self.id)
            .map(f)
            .ok_or(EngineError::StalePlane(self.id))
    }
}
