//! Terminal evaluation.
//!
//! Collection drains a pipeline into a freshly built container. Results only
//! reach a caller-provided destination after the whole drain succeeded, so a
//! failing stage never leaves a destination half written.


use std::iter::FusedIterator;

use typeflow_config::StreamConfig;
use typeflow_core::{List, Map, Result, StreamError, Value};

use crate::pipeline::{Counters, EntryPipeline, SequencePipeline};

/// Drains a sequence pipeline into a list of its output type.
pub(crate) fn collect_list(
    pipeline: &mut SequencePipeline,
    config: &StreamConfig,
) -> Result<(List, Counters)> {
    let before = pipeline.counters();
    let capacity = config.capacity_for(pipeline.size_hint());
    let mut list = List::with_capacity(pipeline.chain.out_type().clone(), capacity);
    while let Some(value) = pipeline.pull()? {
        list.push(value);
    }
    Ok((list, pipeline.counters().since(before)))
}

/// Drains an entry pipeline into a map of its output types.
///
/// Duplicate keys keep the last value.
pub(crate) fn collect_map(
    pipeline: &mut EntryPipeline,
    config: &StreamConfig,
) -> Result<(Map, Counters)> {
    let before = pipeline.counters();
    let capacity = config.capacity_for(pipeline.size_hint());
    let (key, value) = pipeline.chain.out_types();
    let mut map = Map::with_capacity(key.clone(), value.clone(), capacity);
    while let Some((key, value)) = pipeline.pull()? {
        map.insert(key, value);
    }
    Ok((map, pipeline.counters().since(before)))
}

/// A built container and, for `collect_into`, where it goes.
pub(crate) struct CollectResult<'a> {
    origin: Option<&'a mut Value>,
    built: Value,
}

impl<'a> CollectResult<'a> {
    pub(crate) fn fresh(built: Value) -> Self {
        Self {
            origin: None,
            built,
        }
    }

    pub(crate) fn at(origin: &'a mut Value, built: Value) -> Self {
        Self {
            origin: Some(origin),
            built,
        }
    }

    pub(crate) fn into_value(self) -> Value {
        self.built
    }

    /// Replaces the destination's contents with the built container.
    pub(crate) fn write_back(self) {
        if let Some(origin) = self.origin {
            *origin = self.built;
        }
    }
}

enum ValuesState {
    Running(SequencePipeline),
    Failed(StreamError),
    Done,
}

/// Lazy iterator over a sequence stream's output.
///
/// Yields each surviving element as it is pulled through the stages. The
/// first error is yielded once and ends the iteration.
pub struct Values {
    state: ValuesState,
}

impl Values {
    pub(crate) fn running(pipeline: SequencePipeline) -> Self {
        Self {
            state: ValuesState::Running(pipeline),
        }
    }

    pub(crate) fn failed(error: StreamError) -> Self {
        Self {
            state: ValuesState::Failed(error),
        }
    }
}

impl Iterator for Values {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if let ValuesState::Failed(_) = self.state {
            if let ValuesState::Failed(error) = std::mem::replace(&mut self.state, ValuesState::Done) {
                return Some(Err(error));
            }
        }
        let pulled = match &mut self.state {
            ValuesState::Running(pipeline) => pipeline.pull(),
            _ => return None,
        };
        match pulled {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.state = ValuesState::Done;
                None
            }
            Err(error) => {
                self.state = ValuesState::Done;
                Some(Err(error))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            ValuesState::Running(_) => (0, None),
            ValuesState::Failed(_) => (1, Some(1)),
            ValuesState::Done => (0, Some(0)),
        }
    }
}

impl FusedIterator for Values {}
