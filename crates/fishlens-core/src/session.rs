//! Front-end session state machine.
//!
//! Models one user's interaction as explicit states driven by discrete
//! events. The machine never runs a classifier itself: requesting analysis
//! yields a [`SessionEffect::StartAnalysis`] that the caller executes and then
//! reports back with the same `request_id`.
//!
//! Every analysis gets a fresh, monotonically increasing `request_id`. A
//! resolution or failure carrying any other id is stale (the user picked a
//! different image, or the result arrived late) and is discarded.

use crate::error::IdentifyError;
use crate::input::ImageInput;
use crate::types::Identification;

/// Where the session currently is.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// An image is chosen but not analyzed.
    ImageSelected { image: ImageInput },
    /// A classification request is in flight. Re-submission is refused.
    Analyzing { image: ImageInput, request_id: u64 },
    /// The last request finished.
    Results {
        image: ImageInput,
        identification: Identification,
    },
    /// The last request failed. The image is kept so the user can retry.
    Failed {
        image: ImageInput,
        error: IdentifyError,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ImageSelected { .. } => "image-selected",
            Self::Analyzing { .. } => "analyzing",
            Self::Results { .. } => "results",
            Self::Failed { .. } => "failed",
        }
    }

    /// The busy flag: true while a request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Analyzing { .. })
    }

    fn image(&self) -> Option<&ImageInput> {
        match self {
            Self::Idle => None,
            Self::ImageSelected { image }
            | Self::Analyzing { image, .. }
            | Self::Results { image, .. }
            | Self::Failed { image, .. } => Some(image),
        }
    }
}

/// Things that happen to a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The user picked (or dropped) an image.
    ImageChosen(ImageInput),
    /// The user pressed "Identify".
    AnalyzeRequested,
    /// A classification request finished.
    ClassifierResolved {
        request_id: u64,
        identification: Identification,
    },
    /// A classification request failed.
    ClassifierFailed { request_id: u64, error: IdentifyError },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone)]
pub enum SessionEffect {
    /// Run identification for `image` and report back with `request_id`.
    StartAnalysis { request_id: u64, image: ImageInput },
}

/// Pure transition function: `(state, event) -> (state, effects)`.
///
/// `next_request_id` is the id handed out if this event starts an analysis.
pub fn transition(
    state: SessionState,
    event: SessionEvent,
    next_request_id: u64,
) -> (SessionState, Vec<SessionEffect>) {
    match (state, event) {
        // Choosing an image always wins; any in-flight request becomes stale.
        (_, SessionEvent::ImageChosen(image)) => (SessionState::ImageSelected { image }, vec![]),

        (state @ SessionState::Idle, SessionEvent::AnalyzeRequested) => {
            tracing::debug!("Analyze requested with no image selected; ignoring");
            (state, vec![])
        }

        (state @ SessionState::Analyzing { .. }, SessionEvent::AnalyzeRequested) => {
            tracing::debug!("Analyze requested while busy; ignoring");
            (state, vec![])
        }

        (state, SessionEvent::AnalyzeRequested) => {
            let image = match state.image() {
                Some(image) => image.clone(),
                None => return (state, vec![]),
            };
            (
                SessionState::Analyzing {
                    image: image.clone(),
                    request_id: next_request_id,
                },
                vec![SessionEffect::StartAnalysis {
                    request_id: next_request_id,
                    image,
                }],
            )
        }

        (
            SessionState::Analyzing { image, request_id },
            SessionEvent::ClassifierResolved {
                request_id: resolved_id,
                identification,
            },
        ) if request_id == resolved_id => (
            SessionState::Results {
                image,
                identification,
            },
            vec![],
        ),

        (
            SessionState::Analyzing { image, request_id },
            SessionEvent::ClassifierFailed {
                request_id: failed_id,
                error,
            },
        ) if request_id == failed_id => (SessionState::Failed { image, error }, vec![]),

        (
            state,
            SessionEvent::ClassifierResolved { request_id, .. }
            | SessionEvent::ClassifierFailed { request_id, .. },
        ) => {
            tracing::debug!(
                "Discarding stale result for request {request_id} (state: {})",
                state.name()
            );
            (state, vec![])
        }
    }
}

/// A session: current state plus the request id counter.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    next_request_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            next_request_id: 1,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply an event and return the effects to run.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = transition(state, event, self.next_request_id);
        if effects
            .iter()
            .any(|e| matches!(e, SessionEffect::StartAnalysis { .. }))
        {
            self.next_request_id += 1;
        }
        tracing::trace!("Session -> {}", next.name());
        self.state = next;
        effects
    }
}
