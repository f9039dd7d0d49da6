//! Sequence pipelines.

#[cfg(test)]
mod tests;

use std::time::Instant;

use tracing::debug;
use typeflow_config::StreamConfig;
use typeflow_core::{
    check, FromValue, IntoFunc, IntoValue, List, Result, StageKind, StreamError, Value, ValueType,
};

use crate::collect::{self, CollectResult, Values};
use crate::entry::EntryStream;
use crate::pipeline::{EntryPipeline, SequencePipeline};
use crate::resolve::{require_declared, Resolver, StageChain};
use crate::source::{Cursor, EntrySource, ProjectedEntries, Projection, SequenceSource};
use crate::state::StreamState;

/// A deferred pipeline over a sequence.
///
/// Stage methods consume and return the stream so they chain. A stage whose
/// function does not fit the current element type records a sticky error
/// instead of panicking; inspect it with [`error`](Self::error) or let the
/// terminal call return it.
///
/// # Example
///
/// ```
/// use typeflow_core::{Result, StreamError, Value, ValueType};
/// use typeflow_stream::{FnResolver, SequenceStream};
///
/// let tripled = FnResolver::new(ValueType::I64, |v: Value| -> Result<Option<Value>> {
///     Ok(v.as_i64().map(|n| Value::I64(n * 3)))
/// });
/// let out: Vec<i64> = SequenceStream::from_items(-1i64..=5)
///     .map(|n: i64| n + 1)
///     .filter(|n: i64| n > 0)
///     .resolve(tripled)
///     .collect_as()
///     .unwrap();
/// assert_eq!(out, vec![3, 6, 9, 12, 15, 18]);
///
/// // A predicate over the wrong type is recorded, not applied.
/// let stream = SequenceStream::from_items(["a", "b"]).filter(|n: i64| n > 0);
/// assert!(matches!(stream.error(), Some(StreamError::StageShape { .. })));
/// ```
pub struct SequenceStream {
    state: StreamState<SequencePipeline>,
    config: StreamConfig,
}

impl SequenceStream {
    /// Streams the elements of a list value.
    pub fn from_sequence(sequence: Value) -> Self {
        Self::from_source(SequenceSource::from_sequence(sequence))
    }

    /// Streams statically typed items; the element type comes from `T`.
    pub fn from_items<T: IntoValue>(items: impl IntoIterator<Item = T>) -> Self {
        Self::from_sequence(Value::List(List::from_items(items)))
    }

    /// Streams a caller-supplied cursor whose values have type `hint`.
    pub fn from_cursor<C>(cursor: C, hint: Option<ValueType>) -> Self
    where
        C: Cursor + 'static,
    {
        Self::from_source(SequenceSource::from_cursor(cursor, hint))
    }

    /// Streams an iterator whose values have type `hint`.
    pub fn from_iter<I>(iter: I, hint: Option<ValueType>) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self::from_source(SequenceSource::from_iter(iter, hint))
    }

    fn from_source(source: Result<SequenceSource>) -> Self {
        if let Err(error) = &source {
            debug!(event = "stage_rejected", stage = "source", error = %error);
        }
        Self {
            state: StreamState::from_result(source.map(SequencePipeline::new)),
            config: StreamConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: StreamConfig) -> Self {
        if let Some(pipeline) = self.state.pipeline_mut() {
            pipeline.set_trace_elements(config.trace_elements);
        }
        self.config = config;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Element type after the last stage, `None` if construction failed.
    pub fn out_type(&self) -> Option<&ValueType> {
        self.state.pipeline().map(|pipeline| pipeline.chain.out_type())
    }

    /// Number of appended stages.
    pub fn stage_count(&self) -> usize {
        self.state.pipeline().map_or(0, |pipeline| pipeline.chain.len())
    }

    /// The first construction or append error, if any.
    pub fn error(&self) -> Option<&StreamError> {
        self.state.error()
    }

    /// True once a terminal call has run.
    pub fn is_consumed(&self) -> bool {
        self.state.is_consumed()
    }

    fn append(
        mut self,
        stage: StageKind,
        push: impl FnOnce(&mut StageChain) -> Result<()>,
    ) -> Self {
        let Some(appended) = self.state.pipeline_mut().map(|pipeline| {
            push(&mut pipeline.chain)
                .map(|()| (pipeline.chain.out_type().clone(), pipeline.chain.len()))
        }) else {
            return self;
        };
        match appended {
            Ok((out_type, depth)) => {
                debug!(event = "stage_append", stage = stage.as_str(), out_type = %out_type, depth);
            }
            Err(error) => {
                debug!(event = "stage_rejected", stage = stage.as_str(), error = %error);
                self.state.fail(error);
            }
        }
        self
    }

    /// Keeps elements for which `predicate` returns true.
    ///
    /// The predicate must take the current element type and return `bool`.
    pub fn filter<M>(self, predicate: impl IntoFunc<M>) -> Self {
        let predicate = predicate.into_func();
        self.append(StageKind::Filter, move |chain| chain.push_filter(predicate))
    }

    /// Replaces each element with `mapper(element)`.
    pub fn map<M>(self, mapper: impl IntoFunc<M>) -> Self {
        let mapper = mapper.into_func();
        self.append(StageKind::Map, move |chain| chain.push_map(mapper))
    }

    /// Appends a user-defined stage.
    pub fn resolve<R>(self, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.append(StageKind::Resolve, move |chain| {
            chain.push_custom(Box::new(resolver))
        })
    }

    /// Continues as an entry stream keyed by `projector(element)`.
    ///
    /// The projector returns a `(key, value)` pair. It runs lazily, once per
    /// element that survives the stages appended so far.
    pub fn to_entry_stream<M>(self, projector: impl IntoFunc<M>) -> EntryStream {
        let projector = projector.into_func();
        self.bridge(StageKind::PairProjection, move |elem| {
            if !check::is_pair_mapper_of(projector.signature(), elem) {
                return Err(StreamError::StageShape {
                    stage: StageKind::PairProjection,
                    expected: format!("fn({}) -> (any, any)", elem),
                    found: projector.signature().clone(),
                });
            }
            require_declared(StageKind::PairProjection, projector.signature())?;
            let results = projector.signature().results();
            let (key, value) = (results[0].clone(), results[1].clone());
            Ok((key, value, Projection::Pair(projector)))
        })
    }

    /// Continues as an entry stream keyed by the element itself, with
    /// `projector(element)` as the value.
    pub fn as_map_key<M>(self, projector: impl IntoFunc<M>) -> EntryStream {
        let projector = projector.into_func();
        self.bridge(StageKind::KeyProjection, move |elem| {
            if !check::is_mapper_of(projector.signature(), elem) {
                return Err(StreamError::StageShape {
                    stage: StageKind::KeyProjection,
                    expected: format!("fn({}) -> any", elem),
                    found: projector.signature().clone(),
                });
            }
            require_declared(StageKind::KeyProjection, projector.signature())?;
            let value = projector.signature().results()[0].clone();
            Ok((elem.clone(), value, Projection::ValueOf(projector)))
        })
    }

    fn bridge(
        self,
        stage: StageKind,
        project: impl FnOnce(&ValueType) -> Result<(ValueType, ValueType, Projection)>,
    ) -> EntryStream {
        let config = self.config;
        let (pipeline, consumed) = match self.state.into_parts() {
            Ok(parts) => parts,
            Err(error) => return EntryStream::from_state(StreamState::errored(error), config),
        };
        let (key, value, projection) = match project(pipeline.chain.out_type()) {
            Ok(parts) => parts,
            Err(error) => {
                debug!(event = "stage_rejected", stage = stage.as_str(), error = %error);
                return EntryStream::from_state(StreamState::errored(error), config);
            }
        };
        debug!(
            event = "stage_append",
            stage = stage.as_str(),
            out_type = %ValueType::map(key.clone(), value.clone()),
            depth = pipeline.chain.len() + 1,
        );

        let source = EntrySource::projected(ProjectedEntries::new(pipeline, projection), key, value);
        let mut entries = EntryPipeline::new(source);
        entries.set_trace_elements(config.trace_elements);
        // A bridge over an exhausted source is itself exhausted.
        let state = if consumed {
            StreamState::Consumed(entries)
        } else {
            StreamState::Fresh(entries)
        };
        EntryStream::from_state(state, config)
    }

    fn drain(&mut self) -> Result<List> {
        let pipeline = self.state.consume(self.config.reuse)?;
        debug!(
            event = "collect_start",
            out_type = %pipeline.chain.out_type(),
            stages = pipeline.chain.len(),
        );
        let started = Instant::now();
        let (list, counters) = match collect::collect_list(pipeline, &self.config) {
            Ok(collected) => collected,
            Err(error) => {
                // The source is only partly read; later terminals see this error.
                self.state.fail(error.clone());
                return Err(error);
            }
        };
        debug!(
            event = "collect_end",
            emitted = counters.emitted,
            dropped = counters.dropped,
            duration_us = started.elapsed().as_micros() as u64,
        );
        Ok(list)
    }

    fn expected_container(&self) -> Result<ValueType> {
        let pipeline = self.state.ready(self.config.reuse)?;
        Ok(ValueType::list(pipeline.chain.out_type().clone()))
    }

    /// Evaluates the pipeline into a new list.
    pub fn collect(&mut self) -> Result<Value> {
        let list = self.drain()?;
        Ok(CollectResult::fresh(Value::List(list)).into_value())
    }

    /// Evaluates the pipeline and replaces the contents of `destination`.
    ///
    /// # Errors
    ///
    /// [`StreamError::TypeMismatch`] if `destination` is not a list of the
    /// output type. The check runs before evaluation and the destination is
    /// only written once evaluation succeeded.
    pub fn collect_into(&mut self, destination: &mut Value) -> Result<()> {
        let expected = self.expected_container()?;
        let found = destination.value_type();
        if !expected.elem().is_some_and(|elem| check::is_list_of(&found, elem)) {
            return Err(StreamError::TypeMismatch { expected, found });
        }
        let list = self.drain()?;
        CollectResult::at(destination, Value::List(list)).write_back();
        Ok(())
    }

    /// Evaluates the pipeline into a Rust container such as `Vec<T>`.
    pub fn collect_as<T: FromValue>(&mut self) -> Result<T> {
        let expected = self.expected_container()?;
        let found = T::value_type();
        if found != expected {
            return Err(StreamError::TypeMismatch { expected, found });
        }
        T::from_value(Value::List(self.drain()?))
    }

    /// Like [`collect_as`](Self::collect_as), assigning into `destination`
    /// only on success.
    pub fn collect_into_typed<T: FromValue>(&mut self, destination: &mut T) -> Result<()> {
        *destination = self.collect_as()?;
        Ok(())
    }
}

impl IntoIterator for SequenceStream {
    type Item = Result<Value>;
    type IntoIter = Values;

    /// Pulls elements through the stages one at a time.
    fn into_iter(self) -> Values {
        let reuse = self.config.reuse;
        if let Err(error) = self.state.ready(reuse) {
            return Values::failed(error);
        }
        match self.state.into_parts() {
            Ok((mut pipeline, _)) => {
                pipeline.set_trace_elements(self.config.trace_elements);
                Values::running(pipeline)
            }
            Err(error) => Values::failed(error),
        }
    }
}
