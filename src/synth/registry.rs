//! Key → voice bookkeeping and the trigger protocol.
//!
//! The input layer never reports a key release. While a key is held the
//! terminal delivers a stream of repeated "key down" events instead, so the
//! registry coalesces activity that arrives within the debounce window into a
//! refresh of the existing note, and treats anything later as a new strike.

use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};

use super::voice::Voice;

/// Stable identity of a physical input key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(String);

impl KeyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyId {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for KeyId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<char> for KeyId {
    fn from(key: char) -> Self {
        Self(key.to_string())
    }
}

impl Borrow<str> for KeyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a note was struck. Selects the release speed and the watchdog timeout.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Articulation {
    /// Slow fade, long inactivity timeout.
    #[default]
    Sustained,
    /// Fast fade, short inactivity timeout (shift held).
    Staccato,
}

/// What a trigger did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// No entry existed; a new voice was registered.
    Started,
    /// A stale entry was superseded by a new voice.
    Retriggered,
    /// Repeat activity inside the debounce window; the existing voice was sustained.
    Refreshed,
}

/// The registered voice for one key.
#[derive(Debug)]
pub struct Entry {
    pub(crate) voice: Voice,
    pub(crate) last_activity: Instant,
    pub(crate) articulation: Articulation,
}

impl Entry {
    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn articulation(&self) -> Articulation {
        self.articulation
    }

    /// Time since the key last reported activity.
    pub fn inactivity(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }
}

/// Mapping from key to its registered voice.
///
/// Holds at most one voice per key. A superseded voice is handed back to the
/// caller so its release tail can keep playing outside the registry.
#[derive(Debug)]
pub struct VoiceRegistry {
    entries: HashMap<KeyId, Entry>,
    debounce: Duration,
}

impl VoiceRegistry {
    pub fn new(debounce: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            debounce,
        }
    }

    /// Register key activity at `now`.
    ///
    /// Activity within the debounce window of a still-sounding entry refreshes
    /// it. Otherwise `spawn` builds a fresh voice for the key; the voice it
    /// replaces, if any, is stopped and returned unless it had already
    /// finished.
    pub fn trigger<F>(
        &mut self,
        key: KeyId,
        articulation: Articulation,
        now: Instant,
        spawn: F,
    ) -> (Trigger, Option<Voice>)
    where
        F: FnOnce() -> Voice,
    {
        if let Some(entry) = self.entries.get_mut(&key) {
            if !entry.voice.is_finished() && entry.inactivity(now) < self.debounce {
                entry.last_activity = now;
                entry.articulation = articulation;
                entry.voice.sustain();
                return (Trigger::Refreshed, None);
            }
        }

        let entry = Entry {
            voice: spawn(),
            last_activity: now,
            articulation,
        };

        match self.entries.insert(key, entry) {
            Some(mut old) => {
                old.voice.stop();
                let tail = (!old.voice.is_finished()).then_some(old.voice);
                (Trigger::Retriggered, tail)
            }
            None => (Trigger::Started, None),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Entry>
    where
        KeyId: Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        KeyId: Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &Entry)> {
        self.entries.iter()
    }

    /// Registered voices that still produce audio.
    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.entries
            .values_mut()
            .map(|entry| &mut entry.voice)
            .filter(|voice| !voice.is_finished())
    }

    /// Count of registered voices that still produce audio.
    pub fn sounding(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.voice.is_finished())
            .count()
    }

    /// Key of the sounding entry with the oldest activity, skipping `except`.
    pub fn least_recent(&self, except: &KeyId) -> Option<KeyId> {
        self.entries
            .iter()
            .filter(|(key, entry)| *key != except && !entry.voice.is_finished())
            .min_by_key(|(_, entry)| entry.last_activity)
            .map(|(key, _)| key.clone())
    }

    pub fn remove(&mut self, key: &KeyId) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub(crate) fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&KeyId, &mut Entry) -> bool,
    {
        self.entries.retain(f);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{Envelope, Waveform};

    const DEBOUNCE: Duration = Duration::from_millis(75);

    fn spawn(frequency: f64) -> impl FnOnce() -> Voice {
        move || Voice::new(Waveform::Sine, frequency, 44_100.0, Envelope::new(0.1, 0.001), 0)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_trigger_registers() {
        let mut registry = VoiceRegistry::new(DEBOUNCE);
        let t0 = Instant::now();
        let (outcome, tail) = registry.trigger("h".into(), Articulation::Sustained, t0, spawn(440.0));
        assert_eq!(outcome, Trigger::Started);
        assert!(tail.is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("h").map(|e| e.voice().level()), Some(0.0));
    }

    #[test]
    fn repeat_inside_window_refreshes() {
        let mut registry = VoiceRegistry::new(DEBOUNCE);
        let t0 = Instant::now();
        registry.trigger("h".into(), Articulation::Sustained, t0, spawn(440.0));

        let (outcome, tail) = registry.trigger(
            "h".into(),
            Articulation::Staccato,
            t0 + ms(20),
            || panic!("refresh must not allocate a voice"),
        );
        assert_eq!(outcome, Trigger::Refreshed);
        assert!(tail.is_none());
        assert_eq!(registry.len(), 1);

        let entry = registry.get("h").unwrap();
        assert_eq!(entry.last_activity(), t0 + ms(20));
        assert_eq!(entry.articulation(), Articulation::Staccato);
    }

    #[test]
    fn refresh_cancels_release() {
        let mut registry = VoiceRegistry::new(DEBOUNCE);
        let t0 = Instant::now();
        registry.trigger("h".into(), Articulation::Sustained, t0, spawn(440.0));
        let mut block = [[0.0f32; 2]; 32];
        for voice in registry.voices_mut() {
            voice.render(&mut block);
            voice.stop();
        }
        assert!(registry.get("h").unwrap().voice().is_releasing());

        registry.trigger("h".into(), Articulation::Sustained, t0 + ms(10), spawn(440.0));
        assert!(!registry.get("h").unwrap().voice().is_releasing());
    }

    #[test]
    fn stale_repeat_supersedes() {
        let mut registry = VoiceRegistry::new(DEBOUNCE);
        let t0 = Instant::now();
        registry.trigger("h".into(), Articulation::Sustained, t0, spawn(440.0));
        let mut block = [[0.0f32; 2]; 64];
        registry.voices_mut().for_each(|v| {
            v.render(&mut block);
        });

        let (outcome, tail) =
            registry.trigger("h".into(), Articulation::Sustained, t0 + ms(100), spawn(880.0));
        assert_eq!(outcome, Trigger::Retriggered);

        let old = tail.expect("superseded voice keeps its release tail");
        assert!(old.is_releasing());
        assert_eq!(old.frequency(), 440.0);

        assert_eq!(registry.len(), 1);
        let fresh = registry.get("h").unwrap().voice();
        assert_eq!(fresh.frequency(), 880.0);
        assert_eq!(fresh.level(), 0.0);
        assert!(!fresh.is_releasing());
    }

    #[test]
    fn finished_entry_is_replaced_even_inside_window() {
        let mut registry = VoiceRegistry::new(DEBOUNCE);
        let t0 = Instant::now();
        registry.trigger("h".into(), Articulation::Staccato, t0, spawn(440.0));
        let mut block = [[0.0f32; 2]; 4];
        registry.voices_mut().for_each(|v| {
            v.stop();
            v.render(&mut block);
        });
        assert!(registry.get("h").unwrap().voice().is_finished());

        let (outcome, tail) =
            registry.trigger("h".into(), Articulation::Staccato, t0 + ms(10), spawn(440.0));
        assert_eq!(outcome, Trigger::Retriggered);
        assert!(tail.is_none(), "a finished voice has no tail to keep");
        assert!(!registry.get("h").unwrap().voice().is_finished());
    }

    #[test]
    fn keys_are_independent() {
        let mut registry = VoiceRegistry::new(DEBOUNCE);
        let t0 = Instant::now();
        registry.trigger("a".into(), Articulation::Sustained, t0, spawn(220.0));
        registry.trigger("s".into(), Articulation::Sustained, t0 + ms(5), spawn(246.9));
        registry.trigger('d'.into(), Articulation::Staccato, t0 + ms(10), spawn(261.6));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.sounding(), 3);
        assert_eq!(registry.least_recent(&"s".into()), Some("a".into()));
        assert_eq!(registry.least_recent(&"a".into()), Some("s".into()));
    }
}
