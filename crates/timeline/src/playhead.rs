/// Sequence position in seconds plus transport state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    position: f32,
    length: f32,
    pub rate: f32,
    pub looping: bool,
    playing: bool,
}

impl Playhead {
    pub fn new(length: f32) -> Self {
        Self {
            position: 0.0,
            length: length.max(0.0),
            rate: 1.0,
            looping: true,
            playing: true,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    pub fn rewind(&mut self) {
        self.position = 0.0;
    }

    /// Jump to `position`, clamped to `[0, length]`.
    /// NaN is ignored.
    pub fn seek(&mut self, position: f32) {
        if position.is_nan() {
            return;
        }
        self.position = position.clamp(0.0, self.length);
    }

    /// Move forward by `dt * rate` seconds. Returns whether the position
    /// changed. Non-finite steps are ignored.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing || dt.is_nan() || dt <= 0.0 || self.rate == 0.0 {
            return false;
        }
        let step = dt * self.rate;
        if !step.is_finite() {
            return false;
        }
        let before = self.position;
        let next = self.position + step;
        if self.length <= 0.0 {
            self.position = 0.0;
        } else if self.looping {
            self.position = next.rem_euclid(self.length);
        } else if next >= self.length {
            self.position = self.length;
            self.playing = false;
        } else {
            self.position = next.max(0.0);
        }
        self.position != before
    }
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new(0.0)
    }
}
