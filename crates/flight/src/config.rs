//! Flight configuration (tuning, camera, pool sizes, quality). Loaded from skyward.ron at startup.

use crate::quality::QualityLevel;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("could not parse configuration: {0}")]
    Parse(String),
}

/// How rotation is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Arrow keys and Q/E write angular velocity directly.
    #[default]
    Keyboard,
    /// The hull turns toward the point under the cursor.
    MouseAim,
}

/// Thrust, rotation and containment tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Force per held thrust key.
    pub move_speed: f32,
    pub boost_multiplier: f32,
    /// Pitch and yaw rate in rad/s.
    pub rotation_speed: f32,
    /// Roll rate in rad/s.
    pub roll_speed: f32,
    /// Linear damping while braking (fraction removed per second).
    pub brake_damping: f32,
    /// Lateral correction gain while strafing, per second.
    pub strafe_correction: f32,
    /// Softer lateral correction gain when not strafing, per second.
    pub centering_correction: f32,
    /// Pitch is refused once |forward · up| exceeds this.
    pub pitch_limit: f32,
    pub play_radius: f32,
    pub boundary_force: f32,
    /// Minimum time between shots in seconds.
    pub fire_interval: f32,
    /// Fraction of the way toward the aim orientation per 60 Hz frame.
    pub aim_turn_rate: f32,
    pub reticle_distance: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            move_speed: 50.0,
            boost_multiplier: 3.0,
            rotation_speed: 2.5,
            roll_speed: 2.0,
            brake_damping: 0.95,
            strafe_correction: 1.5,
            centering_correction: 0.6,
            pitch_limit: 0.98,
            play_radius: 400.0,
            boundary_force: 400.0,
            fire_interval: 0.2,
            aim_turn_rate: 0.1,
            reticle_distance: 150.0,
        }
    }
}

/// Physics-to-visual interpolation and gimbal animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTuning {
    pub interpolation: f32,
    /// Lateral speed above which extra smoothing kicks in.
    pub strafe_speed_threshold: f32,
    /// Interpolation multiplier while above the threshold.
    pub strafe_smoothing_scale: f32,
    pub tilt_amount: f32,
    pub bank_amount: f32,
    pub gimbal_smoothing: f32,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            interpolation: 0.3,
            strafe_speed_threshold: 8.0,
            strafe_smoothing_scale: 0.5,
            tilt_amount: 0.25,
            bank_amount: 0.5,
            gimbal_smoothing: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Offset from the player at zoom 1, in the player's local frame.
    pub offset: [f32; 3],
    pub position_smoothing: f32,
    pub look_smoothing: f32,
    pub zoom_initial: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_sensitivity: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: [u32; 2],
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.25, 1.0],
            position_smoothing: 0.04,
            look_smoothing: 0.07,
            zoom_initial: 2.0,
            zoom_min: 1.0,
            zoom_max: 25.0,
            zoom_sensitivity: 0.005,
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            viewport: [1280, 720],
        }
    }
}

impl CameraTuning {
    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Pool slots built at startup.
    pub capacity: usize,
    pub speed: f32,
    /// Seconds before a live projectile is returned to the pool.
    pub time_to_live: f32,
    /// Spawn distance ahead of the hull centre.
    pub muzzle_offset: f32,
    pub radius: f32,
    pub mass: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            capacity: 30,
            speed: 150.0,
            time_to_live: 3.0,
            muzzle_offset: 1.5,
            radius: 0.2,
            mass: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub fixed_step: f32,
    pub max_substeps: u32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_substeps: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HullTuning {
    pub mass: f32,
    pub radius: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Largest model dimension after normalisation.
    pub visual_size: f32,
}

impl Default for HullTuning {
    fn default() -> Self {
        Self {
            mass: 5.0,
            radius: 0.8,
            linear_damping: 0.3,
            angular_damping: 0.8,
            visual_size: 1.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudTuning {
    /// RGB the navball's green markings are recoloured to.
    pub navball_color: [u8; 3],
}

impl Default for HudTuning {
    fn default() -> Self {
        Self {
            navball_color: [0x00, 0xf6, 0xff],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseTuning {
    pub enabled: bool,
    pub count: usize,
    pub center: [f32; 3],
    pub attraction_strength: f32,
    pub rest_distance: f32,
    pub min_distance: f32,
    pub grid_columns: usize,
    pub grid_spacing: f32,
    /// Spring gain toward grid targets.
    pub grid_spring: f32,
    pub spawn_radius: f32,
    pub explode_seconds: f32,
    pub settle_seconds: f32,
    pub cursor_repulsion: f32,
    pub cursor_radius: f32,
    pub object_radius: f32,
    pub linear_damping: f32,
}

impl Default for ShowcaseTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 3,
            center: [0.0, 0.0, -40.0],
            attraction_strength: 30.0,
            rest_distance: 2.8,
            min_distance: 1.2,
            grid_columns: 5,
            grid_spacing: 2.0,
            grid_spring: 4.0,
            spawn_radius: 30.0,
            explode_seconds: 1.8,
            settle_seconds: 0.5,
            cursor_repulsion: 10.0,
            cursor_radius: 0.8,
            object_radius: 0.75,
            linear_damping: 0.85,
        }
    }
}

impl ShowcaseTuning {
    pub fn center(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelTuning {
    pub duration: f32,
    /// Control point lateral offset as a fraction of the travel distance.
    pub lateral_spread: f32,
    pub bank_gain: f32,
    pub max_bank: f32,
}

impl Default for TravelTuning {
    fn default() -> Self {
        Self {
            duration: 4.0,
            lateral_spread: 0.35,
            bank_gain: 25.0,
            max_bank: 0.6,
        }
    }
}

/// Complete session settings. Loaded from `skyward.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    #[serde(default)]
    pub control_mode: ControlMode,
    #[serde(default)]
    pub quality: QualityLevel,
    /// Step quality up or down from the measured frame rate.
    #[serde(default = "default_true")]
    pub adaptive_quality: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub flight: FlightTuning,
    #[serde(default)]
    pub sync: SyncTuning,
    #[serde(default)]
    pub camera: CameraTuning,
    #[serde(default)]
    pub projectiles: ProjectileTuning,
    #[serde(default)]
    pub physics: PhysicsTuning,
    #[serde(default)]
    pub hull: HullTuning,
    #[serde(default)]
    pub hud: HudTuning,
    #[serde(default)]
    pub showcase: ShowcaseTuning,
    #[serde(default)]
    pub travel: TravelTuning,
}

fn default_true() -> bool {
    true
}
fn default_seed() -> u64 {
    0x5eed
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            control_mode: ControlMode::default(),
            quality: QualityLevel::default(),
            adaptive_quality: default_true(),
            seed: default_seed(),
            flight: FlightTuning::default(),
            sync: SyncTuning::default(),
            camera: CameraTuning::default(),
            projectiles: ProjectileTuning::default(),
            physics: PhysicsTuning::default(),
            hull: HullTuning::default(),
            hud: HudTuning::default(),
            showcase: ShowcaseTuning::default(),
            travel: TravelTuning::default(),
        }
    }
}

impl FlightConfig {
    /// Load config from `skyward.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::from_ron_str(&data) {
                Ok(config) => return config,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Parse and validate a RON document.
    pub fn from_ron_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(data).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if self.projectiles.capacity == 0 {
            return invalid("projectile pool capacity must be at least 1");
        }
        if self.projectiles.time_to_live <= 0.0 {
            return invalid("projectile time_to_live must be positive");
        }
        if self.physics.fixed_step.is_nan() || self.physics.fixed_step <= 0.0 {
            return invalid("physics fixed_step must be positive");
        }
        if self.physics.max_substeps == 0 {
            return invalid("physics max_substeps must be at least 1");
        }
        if self.camera.zoom_min > self.camera.zoom_max {
            return invalid("camera zoom_min exceeds zoom_max");
        }
        if self.hull.mass <= 0.0 || self.hull.radius <= 0.0 {
            return invalid("hull mass and radius must be positive");
        }
        if self.flight.play_radius <= 0.0 {
            return invalid("play_radius must be positive");
        }
        if self.travel.duration <= 0.0 {
            return invalid("travel duration must be positive");
        }
        if self.showcase.grid_columns == 0 {
            return invalid("showcase grid_columns must be at least 1");
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("skyward.ron")
}
