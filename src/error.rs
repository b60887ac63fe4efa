//! Error types for the crate.
//!
//! Recoverable failures are scoped to the entity they affect: a mesh that
//! fails to load only leaves its own node unrendered, and a scene edit that
//! is rejected leaves the graph unchanged.

use thiserror::Error;

use crate::scene::NodeId;

/// Problems found while validating mesh data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("polygon {polygon} references vertex {index}, but the mesh has {count} vertices")]
    VertexIndexOutOfRange {
        polygon: usize,
        index: usize,
        count: usize,
    },

    #[error("polygon {polygon} uses color {index}, but the palette has {count} entries")]
    ColorIndexOutOfRange {
        polygon: usize,
        index: usize,
        count: usize,
    },

    #[error("{found} polygon colors given for {expected} polygons")]
    ColorCountMismatch { expected: usize, found: usize },

    #[error("{found} {kind} normals given, expected {expected}")]
    NormalCountMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Errors that can occur while loading a mesh.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no mesh registered under the name '{0}'")]
    UnknownMesh(String),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("malformed mesh data: {0}")]
    Malformed(#[from] MeshError),

    #[error("'{0}' contains no polygons")]
    Empty(String),

    #[error("loader for '{0}' stopped without delivering a result")]
    Disconnected(String),
}

/// Rejected scene graph edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("a node named '{0}' already exists")]
    DuplicateName(String),

    #[error("no node with id {0}")]
    UnknownNode(NodeId),

    #[error("no node named '{0}'")]
    UnknownName(String),

    #[error("making {child} a child of {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Shading strategies are selected by name; this is returned for unknown names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shading mode '{0}' (expected none, flat, gouraud or phong)")]
pub struct ShadingModeError(pub String);
