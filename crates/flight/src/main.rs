//! Skyward - headless flight demo.
//!
//! Flies a short scripted sortie without a window and logs the HUD once per
//! second. Pass a glTF hull model path as the first argument; without one a
//! box-sized placeholder hull is used.

use anyhow::{Context, Result};
use flight::{FlightConfig, HullModel, Session};
use glam::Vec3;
use input::{ElementState, InputState, KeyCode};
use std::path::PathBuf;

const FRAME: f32 = 1.0 / 60.0;
const DURATION: f32 = 12.0;

/// Keys held during each scripted phase: (start, end, keys).
const SCRIPT: &[(f32, f32, &[KeyCode])] = &[
    (0.0, 2.0, &[KeyCode::KeyW, KeyCode::ShiftLeft]),
    (2.0, 3.0, &[KeyCode::KeyW, KeyCode::ArrowLeft]),
    (3.0, 4.0, &[KeyCode::Enter, KeyCode::KeyA]),
    (4.0, 5.0, &[KeyCode::KeyS]),
    (9.5, 11.0, &[KeyCode::KeyQ, KeyCode::Enter]),
];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = FlightConfig::load();
    let mut session = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Session::new(config, &path)
            .with_context(|| format!("starting session with hull {:?}", path))?,
        None => {
            log::info!("No hull model given, using a placeholder");
            let model = HullModel::from_bounds("placeholder", Vec3::new(-1.0, -0.4, -2.0), Vec3::new(1.0, 0.4, 2.0));
            Session::with_model(config, &model).context("starting session")?
        }
    };

    let mut input = InputState::new();
    let mut held: Vec<KeyCode> = Vec::new();
    let mut travel_started = false;
    let mut t = 0.0;
    let mut next_report = 0.0;

    while t < DURATION {
        let wanted: Vec<KeyCode> = SCRIPT
            .iter()
            .filter(|(start, end, _)| t >= *start && t < *end)
            .flat_map(|(_, _, keys)| keys.iter().copied())
            .collect();
        for key in held.iter().filter(|key| !wanted.contains(key)) {
            input.process_keyboard(*key, ElementState::Released);
        }
        for key in wanted.iter().filter(|key| !held.contains(key)) {
            input.process_keyboard(*key, ElementState::Pressed);
        }
        held = wanted;
        input.begin_frame();

        if t >= 5.0 && !travel_started {
            travel_started = session.start_travel(Vec3::new(0.0, 8.0, -32.0));
        }

        let hud = session.frame(&input, FRAME)?;
        if t >= next_report {
            log::info!(
                "t={:>5.2}s speed={:>6.2} live shots={} zoom={:.1} travelling={} reticle={:?}",
                t,
                hud.speed,
                hud.live_projectiles,
                hud.zoom,
                hud.travelling,
                hud.reticle
            );
            next_report += 1.0;
        }
        t += FRAME;
    }

    let hull = session.player().body_transform(session.physics());
    log::info!(
        "Sortie over at {:?}; first decoration at {:?}; {} visible nodes; {} stars at {:?} quality",
        hull.position,
        session.decoration_position(0),
        session.scene().instance_data().len(),
        session.starfield().len(),
        session.quality()
    );
    Ok(())
}
