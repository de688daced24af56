//! Skyward flight core: a physics-driven craft with a chase camera, a
//! pooled projectile system and a HUD, all owned by one [`Session`].
//!
//! Rendering and audio live outside this crate. A renderer reads the scene
//! graph, the camera and the HUD snapshot after each [`Session::frame`].

pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod flight;
pub mod hud;
pub mod player;
pub mod projectiles;
pub mod quality;
pub mod session;
pub mod showcase;
pub mod starfield;
pub mod sync;
pub mod travel;

pub use assets::{AssetError, HullModel};
pub use camera::{Camera, CameraRig};
pub use config::{ConfigError, ControlMode, FlightConfig};
pub use error::SessionError;
pub use hud::HudState;
pub use quality::QualityLevel;
pub use session::Session;
