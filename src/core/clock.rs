use crate::constants::FRAME_BUDGET_SEC;

/// Fixed-budget frame gate for the render loop.
///
/// Delta time accumulates across animation frames; a frame is rendered only
/// once a full budget has built up, and the accumulator then keeps the
/// remainder modulo the budget, so a long stall renders one frame rather
/// than a catch-up burst.
#[derive(Clone, Debug)]
pub struct FrameClock {
    budget: f32,
    accum: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_BUDGET_SEC)
    }
}

impl FrameClock {
    pub fn new(budget: f32) -> Self {
        Self { budget, accum: 0.0 }
    }

    /// Add `dt_sec` and report whether this frame should render.
    pub fn advance(&mut self, dt_sec: f32) -> bool {
        self.accum += dt_sec.max(0.0);
        if self.accum < self.budget {
            return false;
        }
        self.accum %= self.budget;
        true
    }
}
