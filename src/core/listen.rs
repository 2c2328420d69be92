/// What the microphone toggle should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MicAction {
    Start,
    Stop,
}

#[derive(Clone, Debug, Default)]
pub struct MicState {
    listening: bool,
}

impl MicState {
    pub fn toggle(&mut self) -> MicAction {
        if self.listening {
            self.listening = false;
            MicAction::Stop
        } else {
            self.listening = true;
            MicAction::Start
        }
    }

    /// Stop if listening; returns whether anything changed.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.listening, false)
    }
}

/// Concatenate every alternative of every recognition result, in order.
pub fn join_transcripts<R, A>(results: R) -> String
where
    R: IntoIterator<Item = A>,
    A: IntoIterator<Item = String>,
{
    results.into_iter().flatten().collect()
}
