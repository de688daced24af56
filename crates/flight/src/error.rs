//! Errors surfaced by session setup and the frame loop.

use crate::assets::AssetError;
use crate::config::ConfigError;
use engine_core::SceneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("hull model failed to load: {0}")]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}
