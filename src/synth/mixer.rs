use super::voice::Voice;
use crate::MAX_BLOCK_SIZE;

/// Sums voices into the stereo output and owns superseded voices.
///
/// A voice replaced in the registry still has a release tail to play. It is
/// moved here and rendered every block until it reports exhaustion, then
/// dropped. Voices shed by the voice limit sit in a separate `fading` list:
/// they are on a fast release and no longer count against the limit.
#[derive(Debug)]
pub struct Mixer {
    retired: Vec<Voice>,
    fading: Vec<Voice>,
    scratch: Vec<[f32; 2]>,
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            retired: Vec::with_capacity(64),
            fading: Vec::with_capacity(16),
            scratch: vec![[0.0; 2]; MAX_BLOCK_SIZE],
        }
    }

    /// Take ownership of a superseded voice until it finishes.
    pub fn retire(&mut self, voice: Voice) {
        if !voice.is_finished() {
            self.retired.push(voice);
        }
    }

    /// Render `registered` plus every retired voice into `out`.
    ///
    /// `out` is overwritten. Retired voices that run out during this block
    /// are dropped; registered ones are left for the watchdog to reclaim.
    pub fn mix<'a, I>(&mut self, registered: I, out: &mut [[f32; 2]])
    where
        I: IntoIterator<Item = &'a mut Voice>,
    {
        out.fill([0.0; 2]);

        let Self {
            retired,
            fading,
            scratch,
        } = self;

        for voice in registered {
            if !voice.is_finished() {
                render_into(voice, scratch, out);
            }
        }

        retired.retain_mut(|voice| render_into(voice, scratch, out));
        fading.retain_mut(|voice| render_into(voice, scratch, out));
    }

    pub fn retired(&self) -> &[Voice] {
        &self.retired
    }

    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    pub fn fading_len(&self) -> usize {
        self.fading.len()
    }

    /// Put `voice` on a release of at least `rate` per sample and keep
    /// rendering it until it finishes.
    pub fn fade_out(&mut self, mut voice: Voice, rate: f64) {
        voice.fade_out(rate);
        if !voice.is_finished() {
            self.fading.push(voice);
        }
    }

    /// Move the quietest retired voice onto a fast fade.
    ///
    /// Returns false when there are no retired voices.
    pub fn fade_quietest(&mut self, rate: f64) -> bool {
        let Some(index) = self
            .retired
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.level().total_cmp(&b.level()))
            .map(|(index, _)| index)
        else {
            return false;
        };
        let voice = self.retired.swap_remove(index);
        self.fade_out(voice, rate);
        true
    }

    /// Drop every retired and fading voice.
    pub fn clear(&mut self) {
        self.retired.clear();
        self.fading.clear();
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Add one voice into `out`, a scratch-sized chunk at a time.
///
/// Returns whether the voice is still live.
fn render_into(voice: &mut Voice, scratch: &mut [[f32; 2]], out: &mut [[f32; 2]]) -> bool {
    for chunk in out.chunks_mut(scratch.len()) {
        let rendered = voice.render(&mut scratch[..chunk.len()]);
        for (o, s) in chunk.iter_mut().zip(&scratch[..rendered.frames]) {
            o[0] += s[0];
            o[1] += s[1];
        }
        if !rendered.live {
            return false;
        }
    }
    true
}
