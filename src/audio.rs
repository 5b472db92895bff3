//! Sound effects
//!
//! Every sound is a short sequence of oscillator tones synthesised with the Web
//! Audio API, so there are no assets to load. The event-to-sound mapping and the
//! tone tables are plain data and build on every target; only `AudioManager`
//! is browser-specific.

use crate::sim::{Category, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Heart caught
    Collect,
    /// Bomb clicked
    Explode,
    /// Snowflake caught
    Freeze,
    /// Freeze window over
    Thaw,
    Pause,
    Resume,
    HighScore,
    GameOver,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One oscillator note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub freq: f32,
    /// Exponential glide target, if any
    pub glide_to: Option<f32>,
    /// Seconds after the effect starts
    pub delay: f64,
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn note(wave: Wave, freq: f32, delay: f64, duration: f64, gain: f32) -> Tone {
    Tone {
        wave,
        freq,
        glide_to: None,
        delay,
        duration,
        gain,
    }
}

const fn glide(wave: Wave, freq: f32, to: f32, duration: f64, gain: f32) -> Tone {
    Tone {
        wave,
        freq,
        glide_to: Some(to),
        delay: 0.0,
        duration,
        gain,
    }
}

const COLLECT: &[Tone] = &[
    note(Wave::Sine, 660.0, 0.0, 0.12, 0.25),
    note(Wave::Sine, 880.0, 0.06, 0.15, 0.25),
];
const EXPLODE: &[Tone] = &[
    glide(Wave::Sawtooth, 110.0, 30.0, 0.45, 0.5),
    glide(Wave::Square, 60.0, 25.0, 0.3, 0.3),
];
const FREEZE: &[Tone] = &[
    note(Wave::Triangle, 1200.0, 0.0, 0.3, 0.15),
    note(Wave::Triangle, 1600.0, 0.05, 0.3, 0.12),
    note(Wave::Triangle, 2400.0, 0.1, 0.35, 0.1),
];
const THAW: &[Tone] = &[glide(Wave::Triangle, 1400.0, 500.0, 0.25, 0.12)];
const PAUSE: &[Tone] = &[note(Wave::Sine, 440.0, 0.0, 0.08, 0.2)];
const RESUME: &[Tone] = &[note(Wave::Sine, 550.0, 0.0, 0.08, 0.2)];
const HIGH_SCORE: &[Tone] = &[
    note(Wave::Sine, 523.0, 0.0, 0.12, 0.2),
    note(Wave::Sine, 659.0, 0.1, 0.12, 0.2),
    note(Wave::Sine, 784.0, 0.2, 0.12, 0.2),
    note(Wave::Sine, 1047.0, 0.3, 0.25, 0.2),
];
const GAME_OVER: &[Tone] = &[
    note(Wave::Triangle, 392.0, 0.0, 0.25, 0.25),
    note(Wave::Triangle, 330.0, 0.2, 0.25, 0.25),
    note(Wave::Triangle, 262.0, 0.4, 0.5, 0.25),
];

impl SoundEffect {
    /// The sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Resolved { category, .. } => Some(match category {
                Category::Collectible => SoundEffect::Collect,
                Category::Hazard => SoundEffect::Explode,
                Category::PowerFreeze => SoundEffect::Freeze,
            }),
            GameEvent::FreezeEnded => Some(SoundEffect::Thaw),
            GameEvent::Paused { .. } => Some(SoundEffect::Pause),
            GameEvent::Resumed => Some(SoundEffect::Resume),
            GameEvent::NewHighScore { .. } => Some(SoundEffect::HighScore),
            GameEvent::Ended { .. } => Some(SoundEffect::GameOver),
            GameEvent::Started
            | GameEvent::Spawned { .. }
            | GameEvent::Expired { .. }
            | GameEvent::FreezeStarted { .. } => None,
        }
    }

    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundEffect::Collect => COLLECT,
            SoundEffect::Explode => EXPLODE,
            SoundEffect::Freeze => FREEZE,
            SoundEffect::Thaw => THAW,
            SoundEffect::Pause => PAUSE,
            SoundEffect::Resume => RESUME,
            SoundEffect::HighScore => HIGH_SCORE,
            SoundEffect::GameOver => GAME_OVER,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, OscillatorType};

    use super::{SoundEffect, Tone, Wave};
    use crate::settings::Settings;

    /// Web Audio output
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_sfx_volume(),
            }
        }

        /// Follow the sound preferences
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_sfx_volume();
        }

        /// Resume the context (browsers require a user gesture first)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            for tone in effect.tones() {
                if self.play_tone(ctx, tone).is_none() {
                    log::debug!("Dropped a tone of {:?}", effect);
                }
            }
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone) -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(match tone.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Triangle => OscillatorType::Triangle,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let start = ctx.current_time() + tone.delay;
            let end = start + tone.duration;
            osc.frequency().set_value_at_time(tone.freq, start).ok()?;
            if let Some(to) = tone.glide_to {
                osc.frequency().exponential_ramp_to_value_at_time(to, end).ok()?;
            }
            gain.gain().set_value_at_time(tone.gain * self.volume, start).ok()?;
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;

            osc.start_with_when(start).ok()?;
            osc.stop_with_when(end + 0.05).ok()?;
            Some(())
        }
    }
}
