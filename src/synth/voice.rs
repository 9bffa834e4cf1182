/// The single playable note context of the monophonic voice.
///
/// A new note always supersedes the previous one. Velocity is kept after
/// release so the envelope tail is still heard at the note's level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Voice {
    note: Option<u8>,
    velocity: f32,
    accent: f32,
    active: bool,
}

impl Voice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, note: u8, velocity: f32) {
        self.note = Some(note);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.active = true;
    }

    /// Gate off. Returns false if the voice was already silent.
    pub fn release(&mut self) -> bool {
        let was_active = self.active;
        self.note = None;
        self.active = false;
        was_active
    }

    pub fn clear(&mut self) {
        *self = Self {
            accent: self.accent,
            ..Self::default()
        };
    }

    pub fn set_accent(&mut self, accent: f32) {
        self.accent = accent.clamp(0.0, 1.0);
    }

    /// Amplitude scale: velocity boosted by up to 50% at full accent.
    #[inline]
    pub fn gain(&self) -> f32 {
        self.velocity * (1.0 + self.accent * 0.5)
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn accent(&self) -> f32 {
        self.accent
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
