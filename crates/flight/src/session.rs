//! The flight session: owns every subsystem and runs one frame at a time.
//!
//! Frame order is fixed: sample input, apply control (or travel), fire,
//! step physics once, update projectiles, sync visuals, move the showcase,
//! follow with the camera, then build the HUD.

use crate::assets::HullModel;
use crate::camera::CameraRig;
use crate::config::FlightConfig;
use crate::error::SessionError;
use crate::flight::FlightController;
use crate::hud::{navball_rotation, recolor_navball, reticle_position, HudState};
use crate::player::Player;
use crate::projectiles::ProjectilePool;
use crate::quality::{AdaptiveQuality, QualityLevel};
use crate::showcase::{ray_plane_z, Showcase};
use crate::starfield::Starfield;
use crate::sync::sync_player;
use crate::travel::{TravelFrame, TravelSequence};
use engine_core::{SceneGraph, Time, Transform};
use glam::Vec3;
use image::RgbaImage;
use input::{Action, ControlIntent, InputState, KeyBindings};
use physics::PhysicsWorld;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Duration;

pub struct Session {
    config: FlightConfig,
    time: Time,
    physics: PhysicsWorld,
    scene: SceneGraph,
    player: Player,
    controller: FlightController,
    projectiles: ProjectilePool,
    rig: CameraRig,
    travel: Option<TravelSequence>,
    showcase: Option<Showcase>,
    starfield: Starfield,
    quality: AdaptiveQuality,
    bindings: KeyBindings,
    hud: HudState,
    rng: StdRng,
}

impl Session {
    /// Load the hull model and build the session. A model that fails to load
    /// aborts creation; there is no fallback craft.
    pub fn new(config: FlightConfig, model_path: &Path) -> Result<Self, SessionError> {
        config.validate()?;
        let model = HullModel::load(model_path).inspect_err(|e| log::warn!("{}", e))?;
        Self::with_model(config, &model)
    }

    /// Build the session around an already loaded hull model.
    pub fn with_model(config: FlightConfig, model: &HullModel) -> Result<Self, SessionError> {
        config.validate()?;
        let mut physics = PhysicsWorld::with_step(config.physics.fixed_step, config.physics.max_substeps);
        let mut scene = SceneGraph::new();

        let player = Player::spawn(&mut physics, &mut scene, model, &config.hull, Transform::default())?;
        let mut projectiles = ProjectilePool::new(&mut physics, &mut scene, &config.projectiles)?;
        let showcase = if config.showcase.enabled {
            Some(Showcase::new(&mut physics, &mut scene, &config.showcase)?)
        } else {
            None
        };

        let quality = AdaptiveQuality::new(config.quality, config.adaptive_quality);
        let settings = config.quality.settings();
        projectiles.set_limit(settings.max_projectiles);
        let starfield = Starfield::generate(config.seed, settings.star_factor);

        let mut rig = CameraRig::new(&config.camera);
        rig.snap(&player.visual_transform(&scene));

        log::info!(
            "Session ready: {:?} control, {:?} quality, {} projectile slots, {} stars",
            config.control_mode,
            config.quality,
            projectiles.capacity(),
            starfield.len()
        );

        Ok(Self {
            controller: FlightController::new(config.flight.clone(), config.control_mode),
            rng: StdRng::seed_from_u64(config.seed),
            time: Time::new(),
            travel: None,
            bindings: KeyBindings::default(),
            hud: HudState::default(),
            config,
            physics,
            scene,
            player,
            projectiles,
            rig,
            showcase,
            starfield,
            quality,
        })
    }

    /// Longest frame the session simulates; anything beyond is dropped.
    fn max_frame(&self) -> f32 {
        self.config.physics.fixed_step * self.config.physics.max_substeps.max(1) as f32
    }

    /// Run one frame lasting `dt` seconds. Non-finite or negative deltas
    /// count as zero and long stalls are clamped to the sub-step budget.
    pub fn frame(&mut self, input: &InputState, dt: f32) -> Result<&HudState, SessionError> {
        let dt = if dt.is_finite() && dt > 0.0 {
            dt.min(self.max_frame())
        } else {
            0.0
        };
        self.time.advance(Duration::from_secs_f32(dt));
        let now = self.time.elapsed_seconds();
        if let Some(level) = self.quality.record_frame(dt) {
            self.apply_quality(level);
        }

        let intent = ControlIntent::sample(input, &self.bindings);
        self.rig.apply_scroll(intent.scroll);

        let travel_frame = self.advance_travel(dt);
        if travel_frame.is_none() {
            let aim_point = intent.cursor.map(|cursor| {
                let (origin, direction) = self.rig.camera.screen_ray(cursor);
                origin + direction * self.config.flight.reticle_distance
            });
            self.controller
                .apply(&mut self.physics, &self.player, &intent, aim_point, dt);

            if self.controller.fire_ready(&intent, now) {
                let hull = self.player.body_transform(&self.physics);
                if let Some(slot) =
                    self.projectiles
                        .fire(&mut self.physics, &mut self.scene, hull.position, hull.rotation, now)?
                {
                    log::debug!("Fired projectile from slot {}", slot);
                }
            }
        }

        self.physics.step_variable(dt);
        self.projectiles
            .update_all(&mut self.physics, &mut self.scene, now)?;
        sync_player(
            &self.physics,
            &mut self.scene,
            &mut self.player,
            &intent,
            &self.config.sync,
            dt,
        )?;

        if let Some(showcase) = self.showcase.as_mut() {
            let plane_z = self.config.showcase.center[2];
            let cursor = intent.cursor.and_then(|cursor| {
                let (origin, direction) = self.rig.camera.screen_ray(cursor);
                ray_plane_z(origin, direction, plane_z)
            });
            showcase.update(&mut self.physics, &mut self.scene, cursor, &mut self.rng, now)?;
        }

        let visual = self.player.visual_transform(&self.scene);
        match travel_frame {
            Some(frame) => self
                .rig
                .snap(&Transform::from_position_rotation(frame.position, frame.rotation)),
            None => self.rig.update(&visual, dt),
        }

        self.hud = HudState {
            reticle: reticle_position(&self.rig.camera, &visual, self.config.flight.reticle_distance),
            navball: navball_rotation(visual.rotation),
            speed: self.player.speed(&self.physics),
            boosting: intent.is(Action::Boost) && travel_frame.is_none(),
            zoom: self.rig.zoom(),
            live_projectiles: self.projectiles.active_count(),
            travelling: self.travel.is_some(),
        };
        Ok(&self.hud)
    }

    /// Drive the hull along the travel curve. Returns the pose used, or
    /// `None` when no travel is running.
    fn advance_travel(&mut self, dt: f32) -> Option<TravelFrame> {
        let travel = self.travel.as_mut()?;
        let frame = travel.advance(dt);
        let body = self.player.body;
        self.physics.reset_forces(body);
        self.physics.set_pose(body, frame.position, frame.rotation);
        self.physics.set_linear_velocity(body, Vec3::ZERO);
        self.physics.set_angular_velocity(body, Vec3::ZERO);
        if frame.finished {
            log::info!("Travel finished at {:?}", frame.position);
            self.travel = None;
        }
        Some(frame)
    }

    /// Fly the craft to `to` along a generated curve, suspending flight
    /// control until it arrives. Ignored while a travel is already running.
    pub fn start_travel(&mut self, to: Vec3) -> bool {
        if self.travel.is_some() {
            return false;
        }
        let hull = self.player.body_transform(&self.physics);
        self.travel = Some(TravelSequence::new(
            hull.position,
            hull.rotation,
            to,
            &self.config.travel,
            &mut self.rng,
        ));
        log::info!("Travel started from {:?} to {:?}", hull.position, to);
        true
    }

    pub fn is_travelling(&self) -> bool {
        self.travel.is_some()
    }

    /// World position of showcase object `index`.
    pub fn decoration_position(&self, index: usize) -> Option<Vec3> {
        self.showcase.as_ref()?.position(&self.physics, index)
    }

    /// Switch the showcase to its grid layout. Returns whether it started.
    pub fn showcase_to_grid(&mut self) -> bool {
        let now = self.time.elapsed_seconds();
        match self.showcase.as_mut() {
            Some(showcase) => showcase.switch_to_grid(&mut self.physics, &mut self.rng, now),
            None => false,
        }
    }

    /// Return the showcase to orbiting. Returns whether it started.
    pub fn showcase_to_orbit(&mut self) -> bool {
        let now = self.time.elapsed_seconds();
        self.showcase
            .as_mut()
            .is_some_and(|showcase| showcase.switch_to_orbit(now))
    }

    /// Recolour a navball texture with the configured marking colour.
    pub fn recolor_navball(&self, texture: &mut RgbaImage) -> usize {
        recolor_navball(texture, self.config.hud.navball_color)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.rig.camera.set_viewport(width, height);
    }

    fn apply_quality(&mut self, level: QualityLevel) {
        let settings = level.settings();
        self.projectiles.set_limit(settings.max_projectiles);
        self.starfield = Starfield::generate(self.config.seed, settings.star_factor);
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    pub fn camera_rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality.level()
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }
}
