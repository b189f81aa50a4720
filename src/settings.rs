//! Player settings and preferences
//!
//! Persisted separately from best scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{SWIPE_THRESHOLD, TAP_THRESHOLD};
use crate::fx::particles::MAX_PARTICLES;
use crate::input::GestureConfig;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Input ===
    /// Max movement (logical px) still treated as a tap
    pub tap_threshold: f32,
    /// Min movement (logical px) treated as a swipe
    pub swipe_threshold: f32,

    // === Effects ===
    /// Particle effects (bursts on hits, pickups)
    pub particles: bool,
    /// Cap on live particles
    pub particle_limit: usize,
    /// Confetti on the win screen
    pub confetti: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no confetti, fewer particles)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tap_threshold: TAP_THRESHOLD,
            swipe_threshold: SWIPE_THRESHOLD,

            particles: true,
            particle_limit: MAX_PARTICLES,
            confetti: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Gesture thresholds, falling back to defaults when the stored pair is unusable
    pub fn gesture_config(&self) -> GestureConfig {
        let valid = self.tap_threshold.is_finite()
            && self.swipe_threshold.is_finite()
            && self.tap_threshold > 0.0
            && self.swipe_threshold >= self.tap_threshold;
        if valid {
            GestureConfig {
                tap_threshold: self.tap_threshold,
                swipe_threshold: self.swipe_threshold,
            }
        } else {
            log::warn!(
                "Invalid gesture thresholds (tap {}, swipe {}), using defaults",
                self.tap_threshold,
                self.swipe_threshold
            );
            GestureConfig::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else if self.reduced_motion {
            self.particle_limit / 4
        } else {
            self.particle_limit
        }
    }

    /// Effective confetti (respects reduced_motion)
    pub fn effective_confetti(&self) -> bool {
        self.confetti && !self.reduced_motion
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_minis_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
