//! Simulation tuning. Loaded from sim.ron at startup.
//!
//! Every magic constant of the interaction feel lives here: the historical
//! source of this behavior tuned these values across many near-duplicate
//! scripts, so they are kept in one serde-backed struct instead.

use crate::catalog::PropClass;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── Grabbing ────────────────────────────────────────────────────────
    /// Capture radius for small instruments (thermometer, scissors…), meters.
    pub instrument_capture_radius: f32,
    /// Capture radius for bulkier devices (stethoscope, BP monitor), meters.
    pub device_capture_radius: f32,
    /// Seek gain: velocity per meter of offset from the hold point, 1/s.
    pub seek_response: f32,
    /// Offset beyond this is clamped before the gain applies (runaway guard).
    pub max_seek_distance: f32,
    /// Hard cap on driven speed, m/s (tunneling guard).
    pub max_seek_speed: f32,
    /// Held props stop this far short of static geometry, meters.
    pub wall_margin: f32,
    /// Linear damping applied while held.
    pub held_linear_damping: f32,
    /// Angular damping applied while held.
    pub held_angular_damping: f32,
    /// Source velocity multiplier for throws on release.
    pub throw_multiplier: f32,
    /// Seconds after release before a prop is grabbable again.
    pub grab_cooldown: f32,
    /// Maximum distance of the UI-priority ray, meters.
    pub ui_ray_max_distance: f32,

    // ── Measurement sequences ───────────────────────────────────────────
    /// Delay between target entry and the reading appearing, seconds.
    pub result_delay: f32,
    /// How long the reading stays visible, seconds.
    pub result_display: f32,

    // ── Dialogue ────────────────────────────────────────────────────────
    /// Typewriter reveal rate, characters per second.
    pub typing_chars_per_second: f32,
    /// How long the "not ready" explanation stays before the question returns.
    pub not_ready_hold: f32,
    /// Pause after a departing line before the scene switch fires.
    pub depart_delay: f32,

    // ── Player ──────────────────────────────────────────────────────────
    /// Walk speed, m/s.
    pub walk_speed: f32,
    /// Mouse look sensitivity, radians per pixel.
    pub look_sensitivity: f32,
    /// Distance from the camera to the desktop pointer's hold point, meters.
    pub pointer_reach: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            instrument_capture_radius: 0.2,
            device_capture_radius: 0.35,
            seek_response: 12.0,
            max_seek_distance: 1.0,
            max_seek_speed: 6.0,
            wall_margin: 0.05,
            held_linear_damping: 4.0,
            held_angular_damping: 4.0,
            throw_multiplier: 1.5,
            grab_cooldown: 1.5,
            ui_ray_max_distance: 5.0,
            result_delay: 1.0,
            result_display: 2.0,
            typing_chars_per_second: 30.0,
            not_ready_hold: 2.0,
            depart_delay: 1.0,
            walk_speed: 2.0,
            look_sensitivity: 0.002,
            pointer_reach: 0.8,
        }
    }
}

impl SimConfig {
    /// Load config from `sim.ron`. If the file is missing or invalid, returns
    /// default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Capture radius for a prop class. Fixtures are never grabbable.
    pub fn capture_radius(&self, class: PropClass) -> f32 {
        match class {
            PropClass::Instrument => self.instrument_capture_radius,
            PropClass::Device => self.device_capture_radius,
            PropClass::Fixture => 0.0,
        }
    }
}

fn config_path() -> PathBuf {
    let local = Path::new("sim.ron");
    if local.exists() {
        return local.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join("sim.ron")))
        .unwrap_or_else(|| local.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pick_radius_by_class() {
        let cfg = SimConfig::default();
        assert!(cfg.capture_radius(PropClass::Instrument) < cfg.capture_radius(PropClass::Device));
        assert_eq!(cfg.capture_radius(PropClass::Fixture), 0.0);
    }

    #[test]
    fn partial_ron_fills_missing_fields() {
        let cfg: SimConfig = ron::from_str("(grab_cooldown: 2.5)").unwrap();
        assert_eq!(cfg.grab_cooldown, 2.5);
        assert_eq!(cfg.max_seek_speed, SimConfig::default().max_seek_speed);
    }
}
