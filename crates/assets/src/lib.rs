//! Asset handles and a content-addressed asset registry.
//!
//! The core never blocks on an asset load. A [`Resource`] handle reports
//! `is_loaded` and consumers treat "not loaded" as "skip this frame".
//! Loading itself happens outside the engine core; a loader completes a
//! pending handle with [`Resource::fulfill`].
//!
//! Assets are identified by content-addressed hashes so registering the
//! same data twice yields the same id.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// A minimal mesh representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: u32,
    pub index_count: u32,
}

/// A shader program reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shader {
    pub name: String,
}

/// A texture reference with its binding unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    pub unit: u32,
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0:?}")]
    NotFound(AssetId),
    #[error("resource already loaded")]
    AlreadyLoaded,
}

/// Shared, non-blocking handle to an asset that may still be loading.
///
/// Cloning is cheap and all clones observe the same load state. Once a
/// handle is fulfilled it stays loaded for the rest of its lifetime.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    cell: Arc<OnceLock<T>>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            cell: Arc::default(),
        }
    }
}

impl<T> Resource<T> {
    /// A handle whose data has not arrived yet.
    pub fn pending() -> Self {
        Self {
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// A handle that is loaded from the start.
    pub fn loaded(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Self {
            cell: Arc::new(cell),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The asset data, if the load has completed.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Complete a pending load. Fails if the handle is already loaded.
    pub fn fulfill(&self, value: T) -> Result<(), AssetError> {
        self.cell.set(value).map_err(|_| AssetError::AlreadyLoaded)
    }
}

/// Content-addressed asset registry.
///
/// Registering an asset produces a loaded [`Resource`]; `queue_*` produces
/// a pending handle an external loader fulfills later. Registering the
/// same content twice returns the existing handle.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    meshes: BTreeMap<AssetId, Resource<Mesh>>,
    shaders: BTreeMap<AssetId, Resource<Shader>>,
    textures: BTreeMap<AssetId, Resource<Texture>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return a loaded handle to it.
    pub fn register_mesh(&mut self, mesh: Mesh) -> Resource<Mesh> {
        let id = content_hash(&[
            mesh.name.as_bytes(),
            &mesh.vertex_count.to_le_bytes(),
            &mesh.index_count.to_le_bytes(),
        ]);
        self.meshes
            .entry(id)
            .or_insert_with(|| Resource::loaded(mesh))
            .clone()
    }

    /// Register a shader and return a loaded handle to it.
    pub fn register_shader(&mut self, shader: Shader) -> Resource<Shader> {
        let id = content_hash(&[shader.name.as_bytes()]);
        self.shaders
            .entry(id)
            .or_insert_with(|| Resource::loaded(shader))
            .clone()
    }

    /// Register a texture and return a loaded handle to it.
    pub fn register_texture(&mut self, texture: Texture) -> Resource<Texture> {
        let id = content_hash(&[texture.name.as_bytes(), &texture.unit.to_le_bytes()]);
        self.textures
            .entry(id)
            .or_insert_with(|| Resource::loaded(texture))
            .clone()
    }

    /// Reserve a pending mesh slot for an asynchronous load.
    pub fn queue_mesh(&mut self, name: &str) -> Resource<Mesh> {
        let id = content_hash(&[name.as_bytes()]);
        tracing::debug!(name, ?id, "queued mesh for loading");
        self.meshes.entry(id).or_insert_with(Resource::pending).clone()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Register a default unit cube mesh.
    pub fn register_default_cube(&mut self) -> Resource<Mesh> {
        self.register_mesh(Mesh {
            name: "unit_cube".into(),
            vertex_count: 24,
            index_count: 36,
        })
    }
}

fn content_hash(parts: &[&[u8]]) -> AssetId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}
