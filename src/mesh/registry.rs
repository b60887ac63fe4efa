//! Named mesh sources and background loading.
//!
//! Meshes are requested by name. The registry resolves the name to a source
//! and builds the [`MeshData`] on a background thread; the caller gets a
//! [`LoadHandle`] to poll once per frame. Finished meshes are cached so
//! later requests for the same name share one `Arc`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use super::{load_obj, primitives, MeshData, MeshRecord};
use crate::error::LoadError;

type LoadResult = Result<Arc<MeshData>, LoadError>;

/// Where a named mesh comes from.
#[derive(Debug, Clone)]
pub enum MeshSource {
    /// Generated in code.
    Builtin(fn() -> MeshRecord),
    /// Supplied by the application.
    Record(MeshRecord),
    /// Wavefront OBJ file on disk.
    ObjFile(PathBuf),
}

impl MeshSource {
    fn build(self) -> LoadResult {
        let record = match self {
            MeshSource::Builtin(make) => make(),
            MeshSource::Record(record) => record,
            MeshSource::ObjFile(path) => load_obj(path)?,
        };
        Ok(Arc::new(MeshData::new(record)?))
    }
}

/// Outcome of polling a [`LoadHandle`].
#[derive(Debug)]
pub enum LoadPoll {
    Pending,
    Ready(Arc<MeshData>),
    Failed(LoadError),
}

/// A mesh load in progress.
#[derive(Debug)]
pub struct LoadHandle {
    name: String,
    receiver: Receiver<LoadResult>,
}

impl LoadHandle {
    /// Name the mesh was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking check for completion.
    ///
    /// Returns the result once; the handle should be dropped afterwards.
    pub fn poll(&self) -> LoadPoll {
        match self.receiver.try_recv() {
            Ok(Ok(mesh)) => LoadPoll::Ready(mesh),
            Ok(Err(e)) => LoadPoll::Failed(e),
            Err(TryRecvError::Empty) => LoadPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                LoadPoll::Failed(LoadError::Disconnected(self.name.clone()))
            }
        }
    }

    /// Block until the load finishes.
    pub fn wait(self) -> LoadResult {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(LoadError::Disconnected(self.name)))
    }

    fn resolved(name: &str, result: LoadResult) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            name: name.to_string(),
            receiver: rx,
        }
    }
}

/// Name to source mapping plus a cache of finished meshes.
#[derive(Debug)]
pub struct MeshRegistry {
    sources: HashMap<String, MeshSource>,
    cache: HashMap<String, Arc<MeshData>>,
}

impl Default for MeshRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshRegistry {
    /// Registry with the built-in `cube` and `insideOutPoly` meshes.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "cube",
            MeshSource::Builtin(|| primitives::cube(primitives::CUBE_HALF_EXTENT)),
        );
        registry.register(
            "insideOutPoly",
            MeshSource::Builtin(primitives::inside_out_poly),
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            sources: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Register or replace a source. Replacing drops any cached mesh.
    pub fn register(&mut self, name: impl Into<String>, source: MeshSource) {
        let name = name.into();
        self.cache.remove(&name);
        self.sources.insert(name, source);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn cached(&self, name: &str) -> Option<Arc<MeshData>> {
        self.cache.get(name).cloned()
    }

    /// Remember a finished mesh so later requests resolve immediately.
    pub fn insert_cached(&mut self, name: impl Into<String>, mesh: Arc<MeshData>) {
        self.cache.insert(name.into(), mesh);
    }

    /// Start loading `name`.
    ///
    /// Cached meshes and unknown names resolve without spawning a thread.
    pub fn load(&self, name: &str) -> LoadHandle {
        if let Some(mesh) = self.cached(name) {
            return LoadHandle::resolved(name, Ok(mesh));
        }
        let Some(source) = self.sources.get(name).cloned() else {
            return LoadHandle::resolved(name, Err(LoadError::UnknownMesh(name.to_string())));
        };

        log::debug!("loading mesh '{name}'");
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(source.build());
        });

        LoadHandle {
            name: name.to_string(),
            receiver: rx,
        }
    }

    /// Load on the calling thread.
    pub fn load_blocking(&self, name: &str) -> LoadResult {
        if let Some(mesh) = self.cached(name) {
            return Ok(mesh);
        }
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::UnknownMesh(name.to_string()))?
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolygonLayout;

    #[test]
    fn test_builtin_cube_loads_in_background() {
        let registry = MeshRegistry::new();
        let mesh = registry.load("cube").wait().unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.view(PolygonLayout::Original).len(), 6);
    }

    #[test]
    fn test_unknown_name_fails_immediately() {
        let registry = MeshRegistry::new();
        let handle = registry.load("teapot");
        assert!(matches!(handle.poll(), LoadPoll::Failed(LoadError::UnknownMesh(_))));
    }

    #[test]
    fn test_cached_mesh_is_shared() {
        let mut registry = MeshRegistry::new();
        let first = registry.load_blocking("cube").unwrap();
        registry.insert_cached("cube", first.clone());
        match registry.load("cube").poll() {
            LoadPoll::Ready(mesh) => assert!(Arc::ptr_eq(&mesh, &first)),
            other => panic!("expected a cached mesh, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_record_reports_mesh_error() {
        let mut registry = MeshRegistry::empty();
        registry.register(
            "broken",
            MeshSource::Record(MeshRecord {
                vertices: vec![crate::math::Vec3::ZERO],
                polygons: vec![vec![0, 1, 2]],
                ..Default::default()
            }),
        );
        assert!(matches!(registry.load_blocking("broken"), Err(LoadError::Malformed(_))));
    }
}
