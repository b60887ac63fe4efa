use std::collections::HashMap;

use super::node::{CachedMatrices, Node, NodeId};
use crate::error::SceneError;
use crate::math::{Mat4, Vec3};
use crate::model::ModelInstance;
use crate::transform::Transform;

/// Arena of named nodes forming a forest.
///
/// Transform edits mark the node's local matrix stale and push a world
/// invalidation down to every descendant; matrices are recomputed lazily on
/// the next query. Any edit also raises the redraw flag the engine consumes.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    names: HashMap<String, NodeId>,
    needs_redraw: bool,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node. Names must be unique.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        model: Option<ModelInstance>,
    ) -> Result<NodeId, SceneError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(SceneError::DuplicateName(name));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.names.insert(name.clone(), id);
        self.nodes.push(Node::new(name, model));
        self.needs_redraw = true;
        Ok(id)
    }

    /// Create a node and attach it under `parent` in one step.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        model: Option<ModelInstance>,
    ) -> Result<NodeId, SceneError> {
        self.get(parent)?;
        let id = self.create_node(name, model)?;
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Re-parent `child` under `parent`.
    ///
    /// The child leaves its previous parent, and its subtree's world matrices
    /// become stale. Edits that would close a cycle are rejected.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.get(parent)?;
        self.get(child)?;

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::Cycle { parent, child });
            }
            cursor = self.nodes[id.index()].parent;
        }

        if let Some(old) = self.nodes[child.index()].parent {
            self.nodes[old.index()].children.retain(|&c| c != child);
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);

        self.invalidate_world(child);
        self.needs_redraw = true;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn get(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.node(id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Result<&Node, SceneError> {
        self.find(name)
            .and_then(|id| self.node(id))
            .ok_or_else(|| SceneError::UnknownName(name.to_string()))
    }

    /// First top-level node, in creation order.
    pub fn root(&self) -> Option<NodeId> {
        self.ids().find(|&id| self.nodes[id.index()].parent.is_none())
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn model(&self, id: NodeId) -> Option<&ModelInstance> {
        self.node(id)?.model.as_ref()
    }

    /// Mutable access to a node's model; raises the redraw flag.
    pub fn model_mut(&mut self, id: NodeId) -> Option<&mut ModelInstance> {
        let model = self.nodes.get_mut(id.index())?.model.as_mut()?;
        self.needs_redraw = true;
        Some(model)
    }

    // Working-buffer updates during a frame are not scene edits.
    pub(crate) fn model_for_frame(&mut self, id: NodeId) -> Option<&mut ModelInstance> {
        self.nodes.get_mut(id.index())?.model.as_mut()
    }

    // ============ Transform edits ============

    pub fn translate(&mut self, id: NodeId, delta: Vec3) -> Result<(), SceneError> {
        self.edit_transform(id, |t| {
            t.translate(delta);
        })
    }

    pub fn rotate(&mut self, id: NodeId, delta: Vec3) -> Result<(), SceneError> {
        self.edit_transform(id, |t| {
            t.rotate(delta);
        })
    }

    /// Additive, like the other two: a delta of zero keeps the scale.
    pub fn scale(&mut self, id: NodeId, delta: Vec3) -> Result<(), SceneError> {
        self.edit_transform(id, |t| {
            t.scale_by(delta);
        })
    }

    /// Replace the whole local transform.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.edit_transform(id, |t| *t = transform)
    }

    fn edit_transform(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Transform),
    ) -> Result<(), SceneError> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(SceneError::UnknownNode(id))?;
        edit(&mut node.transform);
        node.local.set(None);
        self.invalidate_world(id);
        self.needs_redraw = true;
        Ok(())
    }

    fn invalidate_world(&self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            node.world.set(None);
            stack.extend_from_slice(&node.children);
        }
    }

    // ============ Matrix queries ============

    pub fn local_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.get(id)?.local_matrices().matrix)
    }

    /// `world(parent) * local(node)`, or just `local(node)` for top-level nodes.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        self.get(id)?;
        Ok(self.world(id).matrix)
    }

    /// Rotation-only world matrix, used for normals.
    pub fn world_rotation(&self, id: NodeId) -> Result<Mat4, SceneError> {
        self.get(id)?;
        Ok(self.world(id).rotation)
    }

    fn world(&self, id: NodeId) -> CachedMatrices {
        let node = &self.nodes[id.index()];
        if let Some(cached) = node.world.get() {
            return cached;
        }
        let local = node.local_matrices();
        let world = match node.parent {
            None => local,
            Some(parent) => {
                let parent = self.world(parent);
                CachedMatrices {
                    matrix: parent.matrix * local.matrix,
                    rotation: parent.rotation * local.rotation,
                }
            }
        };
        node.world.set(Some(world));
        world
    }

    // ============ Scene-wide state ============

    /// Flip every model between its original and triangulated polygons.
    pub fn toggle_triangulation(&mut self) {
        for model in self.nodes.iter_mut().filter_map(|n| n.model.as_mut()) {
            model.toggle_triangulation();
        }
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns the redraw flag and clears it.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}
