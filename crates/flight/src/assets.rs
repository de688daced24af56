//! Hull model loading.
//!
//! Only the model's extent is needed here; drawing the meshes belongs to
//! whatever renderer consumes the scene graph. Bounds come from the
//! POSITION accessor min/max of every primitive, so buffers are never read.

use glam::Vec3;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("could not open glTF {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF {0:?} contains no mesh primitives")]
    Empty(PathBuf),
}

/// Extent of the hull model in its own space.
#[derive(Debug, Clone, PartialEq)]
pub struct HullModel {
    pub name: String,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub mesh_count: usize,
}

impl HullModel {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let document = gltf::Gltf::open(path).map_err(|source| AssetError::Gltf {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bounds_min = Vec3::splat(f32::MAX);
        let mut bounds_max = Vec3::splat(f32::MIN);
        let mut primitives = 0usize;
        let mut name = None;
        for mesh in document.meshes() {
            if name.is_none() {
                name = mesh.name().map(str::to_owned);
            }
            for primitive in mesh.primitives() {
                let bounds = primitive.bounding_box();
                bounds_min = bounds_min.min(Vec3::from_array(bounds.min));
                bounds_max = bounds_max.max(Vec3::from_array(bounds.max));
                primitives += 1;
            }
        }
        if primitives == 0 {
            return Err(AssetError::Empty(path.to_path_buf()));
        }

        let model = Self {
            name: name.unwrap_or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }),
            bounds_min,
            bounds_max,
            mesh_count: document.meshes().len(),
        };
        log::info!(
            "Loaded hull model '{}' ({} meshes, size {:?})",
            model.name,
            model.mesh_count,
            model.size()
        );
        Ok(model)
    }

    /// A model known only by its extent, for headless runs.
    pub fn from_bounds(name: impl Into<String>, bounds_min: Vec3, bounds_max: Vec3) -> Self {
        Self {
            name: name.into(),
            bounds_min,
            bounds_max,
            mesh_count: 0,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.bounds_max - self.bounds_min
    }

    pub fn center(&self) -> Vec3 {
        (self.bounds_min + self.bounds_max) * 0.5
    }

    /// Uniform scale that makes the largest dimension equal `target`.
    pub fn normalising_scale(&self, target: f32) -> f32 {
        let largest = self.size().max_element();
        if largest <= f32::EPSILON {
            1.0
        } else {
            target / largest
        }
    }
}
