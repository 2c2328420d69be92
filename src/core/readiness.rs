/// One-shot latch fired by the model download progress callback.
///
/// Progress may report completion several times (and an unknown total is
/// treated as zero, so any progress completes it); only the first completion
/// starts the experience.
#[derive(Clone, Debug, Default)]
pub struct ReadinessLatch {
    fired: bool,
}

impl ReadinessLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once, on the first call where `loaded` has
    /// reached `total`.
    pub fn on_progress(&mut self, loaded: u64, total: Option<u64>) -> bool {
        if self.fired || loaded < total.unwrap_or(0) {
            return false;
        }
        self.fired = true;
        true
    }
}
