//! The voice engine shared between the audio callback and the control thread.
//!
//! `EngineState` is plain data with every operation taking an explicit `now`,
//! which keeps it deterministic under test. `Engine` wraps it in an
//! `Arc<Mutex<_>>` so the render context and the control context can each
//! hold a handle; every operation takes the lock for O(active voices) work
//! and nothing else. `EngineState` reports what happened instead of logging,
//! and `Engine` emits events after the guard is released.

use std::{sync::Arc, time::Instant};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, trace};

use super::{
    instrument::{Instrument, InstrumentBank},
    mixer::Mixer,
    registry::{Articulation, KeyId, Trigger, VoiceRegistry},
    voice::Voice,
    watchdog::{Sweep, Watchdog},
};
use crate::{config::EngineConfig, dsp::Envelope, MAX_BLOCK_SIZE};

/// Golden-ratio increment between per-voice noise seeds.
const SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// A key with a sounding voice, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveKey {
    pub key: KeyId,
    pub frequency: f64,
    /// Envelope level (0.0 - 1.0)
    pub level: f64,
    pub articulation: Articulation,
    pub releasing: bool,
}

/// What the UI needs after each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Keys whose registered voice has not finished, sorted by key.
    pub active: Vec<ActiveKey>,
    /// Name of the instrument new notes will use.
    pub instrument: &'static str,
    /// Voices currently being rendered, including release tails.
    pub voices: usize,
}

impl Snapshot {
    pub fn is_active(&self, key: &str) -> bool {
        self.active.iter().any(|a| a.key.as_str() == key)
    }
}

pub struct EngineState {
    config: EngineConfig,
    instruments: InstrumentBank,
    registry: VoiceRegistry,
    watchdog: Watchdog,
    mixer: Mixer,
    stereo: Vec<[f32; 2]>,
    next_seed: u64,
    evicted: u64,
}

impl EngineState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            instruments: InstrumentBank::new(config.instrument),
            registry: VoiceRegistry::new(config.debounce()),
            watchdog: Watchdog::from_config(&config),
            mixer: Mixer::new(),
            stereo: vec![[0.0; 2]; MAX_BLOCK_SIZE],
            next_seed: config.seed,
            evicted: 0,
            config,
        }
    }

    /// Key activity at `now`. See [`VoiceRegistry::trigger`].
    pub fn trigger_at(
        &mut self,
        key: impl Into<KeyId>,
        frequency: f64,
        articulation: Articulation,
        now: Instant,
    ) -> Trigger {
        let key = key.into();
        let waveform = self.instruments.current().waveform;
        let envelope = Envelope::new(
            self.config.attack_rate,
            self.config.release_rate(articulation),
        );
        let sample_rate = self.config.sample_rate as f64;
        let seed = self.next_seed;

        let (outcome, tail) = self.registry.trigger(key.clone(), articulation, now, || {
            Voice::new(waveform, frequency, sample_rate, envelope, seed)
        });

        if outcome != Trigger::Refreshed {
            self.next_seed = self.next_seed.wrapping_add(SEED_STEP);
        }
        if let Some(tail) = tail {
            self.mixer.retire(tail);
        }
        if outcome != Trigger::Refreshed {
            self.enforce_voice_limit(&key);
        }

        outcome
    }

    /// Run the watchdog, then report what is sounding.
    pub fn tick_at(&mut self, now: Instant) -> Snapshot {
        self.sweep_at(now);
        self.snapshot()
    }

    pub fn sweep_at(&mut self, now: Instant) -> Sweep {
        self.watchdog.sweep(&mut self.registry, now)
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut active: Vec<ActiveKey> = self
            .registry
            .iter()
            .filter(|(_, entry)| !entry.voice().is_finished())
            .map(|(key, entry)| ActiveKey {
                key: key.clone(),
                frequency: entry.voice().frequency(),
                level: entry.voice().level(),
                articulation: entry.articulation(),
                releasing: entry.voice().is_releasing(),
            })
            .collect();
        active.sort_by(|a, b| a.key.cmp(&b.key));

        Snapshot {
            active,
            instrument: self.instruments.current().name,
            voices: self.voice_count(),
        }
    }

    pub fn select_next_instrument(&mut self) -> &'static Instrument {
        self.instruments.select_next()
    }

    pub fn select_instrument(&mut self, index: usize) -> &'static Instrument {
        self.instruments.select(index)
    }

    pub fn instrument(&self) -> &'static Instrument {
        self.instruments.current()
    }

    pub fn instruments(&self) -> &InstrumentBank {
        &self.instruments
    }

    /// Panic button: silence and forget every voice immediately.
    ///
    /// Returns how many voices were dropped.
    pub fn clear_all(&mut self) -> usize {
        let dropped = self.voice_count();
        self.registry.clear();
        self.mixer.clear();
        dropped
    }

    /// Sum every live voice into `out`.
    pub fn render(&mut self, out: &mut [[f32; 2]]) {
        self.mixer.mix(self.registry.voices_mut(), out);
    }

    /// Render into an interleaved device buffer with `channels` channels.
    ///
    /// Mono receives the average of left and right; channels past the second
    /// are silent.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        for chunk in out.chunks_mut(channels * MAX_BLOCK_SIZE) {
            let frames = chunk.len() / channels;
            let stereo = &mut self.stereo[..frames];
            self.mixer.mix(self.registry.voices_mut(), stereo);

            for (frame, [left, right]) in chunk.chunks_exact_mut(channels).zip(stereo.iter()) {
                match frame {
                    [mono] => *mono = (left + right) * 0.5,
                    [l, r, rest @ ..] => {
                        *l = *left;
                        *r = *right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        }
    }

    /// Voices being rendered: sounding registered voices plus release tails.
    pub fn voice_count(&self) -> usize {
        self.admitted_voices() + self.mixer.fading_len()
    }

    /// Voices counted against `max_voices`: everything rendered except the
    /// ones already shed by the limit.
    pub fn admitted_voices(&self) -> usize {
        self.registry.sounding() + self.mixer.retired_len()
    }

    /// Total voices shed by the voice limit since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shed release tails (quietest first), then the least recently played
    /// keys, until the voice limit holds. `keep` is the key just triggered.
    ///
    /// Shed voices fade at the staccato rate or faster.
    fn enforce_voice_limit(&mut self, keep: &KeyId) {
        let Some(limit) = self.config.max_voices else {
            return;
        };
        let rate = self.config.release_rate(Articulation::Staccato);

        while self.admitted_voices() > limit {
            if !self.mixer.fade_quietest(rate) {
                let Some(victim) = self.registry.least_recent(keep) else {
                    break;
                };
                let Some(entry) = self.registry.remove(&victim) else {
                    break;
                };
                self.mixer.fade_out(entry.voice, rate);
            }
            self.evicted += 1;
        }
    }
}

/// Cloneable handle to the shared engine state.
#[derive(Clone)]
pub struct Engine {
    state: Arc<Mutex<EngineState>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::new(config))),
        }
    }

    /// Key activity now.
    pub fn trigger(
        &self,
        key: impl Into<KeyId>,
        frequency: f64,
        articulation: Articulation,
    ) -> Trigger {
        let key = key.into();
        let now = Instant::now();
        let (outcome, evicted) = {
            let mut state = self.state.lock();
            let before = state.evicted();
            let outcome = state.trigger_at(key.clone(), frequency, articulation, now);
            (outcome, state.evicted() - before)
        };

        match outcome {
            Trigger::Refreshed => trace!(%key, "refreshed held key"),
            Trigger::Started => debug!(%key, frequency, ?articulation, "started key"),
            Trigger::Retriggered => debug!(%key, frequency, ?articulation, "retriggered key"),
        }
        if evicted > 0 {
            debug!(evicted, "faded voices over limit");
        }
        outcome
    }

    /// Periodic control tick: watchdog sweep plus display snapshot.
    pub fn tick(&self) -> Snapshot {
        let now = Instant::now();
        let (sweep, snapshot) = {
            let mut state = self.state.lock();
            let sweep = state.sweep_at(now);
            (sweep, state.snapshot())
        };

        if sweep != Sweep::default() {
            debug!(stopped = sweep.stopped, reclaimed = sweep.reclaimed, "watchdog sweep");
        }
        snapshot
    }

    pub fn select_next_instrument(&self) -> &'static str {
        let name = self.state.lock().select_next_instrument().name;
        info!(instrument = name, "selected instrument");
        name
    }

    pub fn select_instrument(&self, index: usize) -> &'static str {
        let name = self.state.lock().select_instrument(index).name;
        info!(instrument = name, "selected instrument");
        name
    }

    pub fn instrument(&self) -> &'static str {
        self.state.lock().instrument().name
    }

    pub fn clear_all(&self) {
        let dropped = self.state.lock().clear_all();
        info!(dropped, "cleared all voices");
    }

    /// Render context entry point.
    pub fn render(&self, out: &mut [[f32; 2]]) {
        self.state.lock().render(out);
    }

    pub fn render_interleaved(&self, out: &mut [f32], channels: usize) {
        self.state.lock().render_interleaved(out, channels);
    }

    pub fn voice_count(&self) -> usize {
        self.state.lock().voice_count()
    }

    /// Direct access to the state, for callers that need several operations
    /// under one lock.
    pub fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
