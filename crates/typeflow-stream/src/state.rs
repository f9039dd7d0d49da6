//! Sticky pipeline state.

use typeflow_config::ReusePolicy;
use typeflow_core::{Result, StreamError};

/// Lifecycle of a stream's pipeline.
///
/// The first error wins and freezes the pipeline: later appends are ignored
/// and terminal calls return the error. A frozen pipeline is kept only for
/// introspection (`stage_count`, `out_type`). A terminal call moves a fresh
/// pipeline to `Consumed`; its source is exhausted from then on.
pub(crate) enum StreamState<P> {
    Fresh(P),
    Consumed(P),
    Errored {
        error: StreamError,
        frozen: Option<P>,
    },
}

impl<P> StreamState<P> {
    pub(crate) fn from_result(result: Result<P>) -> Self {
        match result {
            Ok(pipeline) => StreamState::Fresh(pipeline),
            Err(error) => StreamState::errored(error),
        }
    }

    pub(crate) fn errored(error: StreamError) -> Self {
        StreamState::Errored {
            error,
            frozen: None,
        }
    }

    pub(crate) fn error(&self) -> Option<&StreamError> {
        match self {
            StreamState::Errored { error, .. } => Some(error),
            _ => None,
        }
    }

    pub(crate) fn is_consumed(&self) -> bool {
        matches!(self, StreamState::Consumed(_))
    }

    /// The pipeline, frozen or not.
    pub(crate) fn pipeline(&self) -> Option<&P> {
        match self {
            StreamState::Fresh(pipeline) | StreamState::Consumed(pipeline) => Some(pipeline),
            StreamState::Errored { frozen, .. } => frozen.as_ref(),
        }
    }

    /// The pipeline, if it still accepts stages.
    pub(crate) fn pipeline_mut(&mut self) -> Option<&mut P> {
        match self {
            StreamState::Fresh(pipeline) | StreamState::Consumed(pipeline) => Some(pipeline),
            StreamState::Errored { .. } => None,
        }
    }

    /// Returns the pipeline if a terminal call may run under `policy`.
    pub(crate) fn ready(&self, policy: ReusePolicy) -> Result<&P> {
        match self {
            StreamState::Fresh(pipeline) => Ok(pipeline),
            StreamState::Consumed(pipeline) if policy == ReusePolicy::Drain => Ok(pipeline),
            StreamState::Consumed(_) => Err(StreamError::Consumed),
            StreamState::Errored { error, .. } => Err(error.clone()),
        }
    }

    /// Marks the pipeline consumed and hands it to the terminal call.
    pub(crate) fn consume(&mut self, policy: ReusePolicy) -> Result<&mut P> {
        self.ready(policy)?;
        if let StreamState::Fresh(_) = self {
            let taken = std::mem::replace(self, StreamState::errored(StreamError::Consumed));
            if let StreamState::Fresh(pipeline) = taken {
                *self = StreamState::Consumed(pipeline);
            }
        }
        match self {
            StreamState::Fresh(pipeline) | StreamState::Consumed(pipeline) => Ok(pipeline),
            StreamState::Errored { error, .. } => Err(error.clone()),
        }
    }

    /// Gives up the pipeline, with whether it was already consumed.
    pub(crate) fn into_parts(self) -> Result<(P, bool)> {
        match self {
            StreamState::Fresh(pipeline) => Ok((pipeline, false)),
            StreamState::Consumed(pipeline) => Ok((pipeline, true)),
            StreamState::Errored { error, .. } => Err(error),
        }
    }

    /// Records `error` unless an earlier error is already kept.
    pub(crate) fn fail(&mut self, error: StreamError) {
        if self.error().is_some() {
            return;
        }
        let previous = std::mem::replace(self, StreamState::errored(error));
        if let StreamState::Errored { frozen, .. } = self {
            *frozen = match previous {
                StreamState::Fresh(pipeline) | StreamState::Consumed(pipeline) => Some(pipeline),
                StreamState::Errored { .. } => None,
            };
        }
    }
}
