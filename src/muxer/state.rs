//! Muxer initialization state

/// One-shot initialization state
///
/// `Pending` moves to `Initialized` exactly once; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitState {
    /// Some bindings may still be outstanding
    #[default]
    Pending,
    /// Every registered track completed binding at least once
    Initialized,
}

impl InitState {
    /// Take the `Pending -> Initialized` transition
    ///
    /// Returns true only for the call that performed the transition.
    pub fn complete(&mut self) -> bool {
        match self {
            InitState::Pending => {
                *self = InitState::Initialized;
                true
            }
            InitState::Initialized => false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        *self == InitState::Initialized
    }
}
