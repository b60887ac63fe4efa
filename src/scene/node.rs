use std::cell::Cell;
use std::fmt;

use crate::math::Mat4;
use crate::model::ModelInstance;
use crate::transform::Transform;

/// Index of a node in its [`SceneGraph`](super::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A matrix together with its rotation-only counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CachedMatrices {
    pub matrix: Mat4,
    pub rotation: Mat4,
}

/// A named element of the scene tree.
///
/// Nodes without a model are pure grouping nodes: they only contribute their
/// transform to their descendants.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    pub(crate) model: Option<ModelInstance>,
    pub(crate) transform: Transform,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    // None means stale
    pub(crate) local: Cell<Option<CachedMatrices>>,
    pub(crate) world: Cell<Option<CachedMatrices>>,
}

impl Node {
    pub(crate) fn new(name: String, model: Option<ModelInstance>) -> Self {
        Self {
            name,
            model,
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
            local: Cell::new(None),
            world: Cell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&ModelInstance> {
        self.model.as_ref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local matrix and local rotation, recomputed if stale.
    pub(crate) fn local_matrices(&self) -> CachedMatrices {
        if let Some(cached) = self.local.get() {
            return cached;
        }
        let fresh = CachedMatrices {
            matrix: self.transform.to_matrix(),
            rotation: self.transform.rotation_matrix(),
        };
        self.local.set(Some(fresh));
        fresh
    }

    pub fn has_valid_world(&self) -> bool {
        self.world.get().is_some()
    }
}
