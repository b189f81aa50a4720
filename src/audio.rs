//! Audio cues
//!
//! Sounds are synthesized with the Web Audio API - no asset files. Audio is a
//! fire-and-forget collaborator: when no context can be created every call is
//! a silent no-op and the games stay fully playable.

use serde::{Deserialize, Serialize};

/// Named sound cues shared by all games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Run started
    Start,
    /// Tap / flap / jump
    Tap,
    /// Ball or player bounced off something
    Bounce,
    /// Brick / enemy destroyed, note hit, food eaten
    Hit,
    /// Point scored
    Score,
    /// Life lost or note missed
    Miss,
    /// Shot fired
    Shoot,
    /// Run won
    Win,
    /// Run lost
    Lose,
    /// New best score
    HighScore,
}

/// Fire-and-forget audio playback
pub trait AudioSink {
    /// Prepare playback after a user gesture. Must be idempotent.
    fn unlock(&mut self);

    /// Play a cue at an optional volume (0-1, default 1)
    fn play(&mut self, cue: Cue, volume: Option<f32>);
}

/// Sink that never makes a sound
#[derive(Debug, Default, Clone)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn unlock(&mut self) {}

    fn play(&mut self, _cue: Cue, _volume: Option<f32>) {}
}

/// Unlock progress of the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockState {
    /// Waiting for the first user gesture
    #[default]
    Locked,
    /// Creation / resume requested, not confirmed yet
    Pending,
    Ready,
    /// Backend could not be created; audio stays off
    Unavailable,
}

/// Guards one-time backend initialization
#[derive(Debug, Clone, Default)]
pub struct UnlockGate {
    state: UnlockState,
    attempts: u32,
}

impl UnlockGate {
    pub fn state(&self) -> UnlockState {
        self.state
    }

    /// Number of times initialization actually ran
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns true if the caller should initialize now.
    ///
    /// Only the first call from `Locked` wins; repeats while pending or after
    /// completion are no-ops.
    pub fn begin(&mut self) -> bool {
        if self.state != UnlockState::Locked {
            return false;
        }
        self.state = UnlockState::Pending;
        self.attempts += 1;
        true
    }

    pub fn resolve(&mut self, ok: bool) {
        if self.state == UnlockState::Pending {
            self.state = if ok {
                UnlockState::Ready
            } else {
                UnlockState::Unavailable
            };
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self.state, UnlockState::Pending | UnlockState::Ready)
    }
}

/// Effective cue volume from settings and per-call volume
pub fn effective_volume(master: f32, sfx: f32, muted: bool, volume: Option<f32>) -> f32 {
    if muted {
        return 0.0;
    }
    (master.clamp(0.0, 1.0) * sfx.clamp(0.0, 1.0) * volume.unwrap_or(1.0).clamp(0.0, 1.0))
        .clamp(0.0, 1.0)
}

/// One oscillator voice of a cue
#[derive(Debug, Clone, Copy)]
pub struct Tone {
    pub freq: f32,
    /// Frequency at the end of the tone (exponential glide)
    pub end_freq: f32,
    pub wave: Wave,
    pub duration: f64,
    pub delay: f64,
    pub gain: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

const fn tone(freq: f32, end_freq: f32, wave: Wave, duration: f64, delay: f64, gain: f32) -> Tone {
    Tone {
        freq,
        end_freq,
        wave,
        duration,
        delay,
        gain,
    }
}

use Wave::*;

const START: &[Tone] = &[
    tone(440.0, 440.0, Triangle, 0.1, 0.0, 0.3),
    tone(660.0, 660.0, Triangle, 0.12, 0.08, 0.3),
];
const TAP: &[Tone] = &[tone(520.0, 780.0, Sine, 0.08, 0.0, 0.25)];
const BOUNCE: &[Tone] = &[tone(150.0, 60.0, Sine, 0.1, 0.0, 0.6)];
const HIT: &[Tone] = &[
    tone(800.0, 400.0, Square, 0.06, 0.0, 0.15),
    tone(60.0, 60.0, Sine, 0.1, 0.0, 0.3),
];
const SCORE: &[Tone] = &[
    tone(880.0, 880.0, Triangle, 0.08, 0.0, 0.25),
    tone(1320.0, 1320.0, Triangle, 0.1, 0.06, 0.25),
];
const MISS: &[Tone] = &[tone(220.0, 110.0, Sawtooth, 0.2, 0.0, 0.25)];
const SHOOT: &[Tone] = &[tone(1200.0, 300.0, Square, 0.07, 0.0, 0.12)];
const WIN: &[Tone] = &[
    tone(523.0, 523.0, Triangle, 0.15, 0.0, 0.3),
    tone(659.0, 659.0, Triangle, 0.15, 0.12, 0.3),
    tone(784.0, 784.0, Triangle, 0.15, 0.24, 0.3),
    tone(1047.0, 1047.0, Triangle, 0.3, 0.36, 0.3),
];
const LOSE: &[Tone] = &[
    tone(400.0, 300.0, Sawtooth, 0.25, 0.0, 0.25),
    tone(300.0, 150.0, Sawtooth, 0.4, 0.2, 0.25),
];
const HIGH_SCORE: &[Tone] = &[
    tone(500.0, 500.0, Triangle, 0.25, 0.0, 0.25),
    tone(600.0, 600.0, Triangle, 0.25, 0.08, 0.25),
    tone(700.0, 700.0, Triangle, 0.25, 0.16, 0.25),
    tone(800.0, 800.0, Triangle, 0.25, 0.24, 0.25),
    tone(1000.0, 1000.0, Triangle, 0.25, 0.32, 0.25),
];

/// Voices making up a cue
pub fn cue_tones(cue: Cue) -> &'static [Tone] {
    match cue {
        Cue::Start => START,
        Cue::Tap => TAP,
        Cue::Bounce => BOUNCE,
        Cue::Hit => HIT,
        Cue::Score => SCORE,
        Cue::Miss => MISS,
        Cue::Shoot => SHOOT,
        Cue::Win => WIN,
        Cue::Lose => LOSE,
        Cue::HighScore => HIGH_SCORE,
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Cue, Tone, UnlockGate, Wave, cue_tones, effective_volume};
    use crate::settings::Settings;

    /// Web Audio backed sink; the context is created on the first gesture
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        gate: UnlockGate,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            Self {
                ctx: None,
                gate: UnlockGate::default(),
                master_volume: settings.master_volume,
                sfx_volume: settings.sfx_volume,
                muted: settings.muted,
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(ctx: &AudioContext, t: &Tone, vol: f32) {
            let wave = match t.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            };
            let Some((osc, gain)) = Self::create_osc(ctx, t.freq, wave) else {
                return;
            };
            let start = ctx.current_time() + t.delay;
            let end = start + t.duration;

            gain.gain().set_value_at_time(vol * t.gain, start).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
            if t.end_freq != t.freq {
                osc.frequency().set_value_at_time(t.freq, start).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(t.end_freq, end)
                    .ok();
            }
            osc.start_with_when(start).ok();
            osc.stop_with_when(end + 0.02).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn unlock(&mut self) {
            if !self.gate.begin() {
                return;
            }
            // Browsers only allow a running context after a user gesture
            match AudioContext::new() {
                Ok(ctx) => {
                    let _ = ctx.resume();
                    self.ctx = Some(ctx);
                    log::info!("Audio context created");
                }
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    self.gate.resolve(false);
                }
            }
        }

        fn play(&mut self, cue: Cue, volume: Option<f32>) {
            if !self.gate.is_usable() {
                return;
            }
            let vol = effective_volume(self.master_volume, self.sfx_volume, self.muted, volume);
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            match ctx.state() {
                AudioContextState::Running => self.gate.resolve(true),
                AudioContextState::Suspended => {
                    let _ = ctx.resume();
                }
                _ => {}
            }

            for t in cue_tones(cue) {
                Self::play_tone(ctx, t, vol);
            }
        }
    }
}
