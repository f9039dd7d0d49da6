//! Entry pipelines over key/value pairs.


use std::time::Instant;

use tracing::debug;
use typeflow_config::StreamConfig;
use typeflow_core::{
    check, FromValue, IntoFunc, IntoValue, Map, Result, StageKind, StreamError, Value, ValueType,
};

use crate::collect::{self, CollectResult};
use crate::pipeline::EntryPipeline;
use crate::resolve::{EntryChain, EntryResolver};
use crate::source::{EntryCursor, EntrySource};
use crate::state::StreamState;

/// A deferred pipeline over key/value pairs.
///
/// Built from a map, a caller cursor, or a [`SequenceStream`] bridge.
/// Collecting produces a map; equal keys keep the last value at the position
/// of their first occurrence.
///
/// [`SequenceStream`]: crate::SequenceStream
pub struct EntryStream {
    state: StreamState<EntryPipeline>,
    config: StreamConfig,
}

impl EntryStream {
    /// Streams the entries of a map value.
    pub fn from_mapping(mapping: Value) -> Self {
        Self::from_source(EntrySource::from_mapping(mapping))
    }

    /// Streams statically typed pairs; key and value types come from `K`, `V`.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: IntoValue,
        V: IntoValue,
    {
        Self::from_mapping(Value::Map(Map::from_entries(entries)))
    }

    /// Streams a caller-supplied entry cursor.
    pub fn from_entry_cursor<C>(
        cursor: C,
        key_hint: Option<ValueType>,
        value_hint: Option<ValueType>,
    ) -> Self
    where
        C: EntryCursor + 'static,
    {
        Self::from_source(EntrySource::from_entry_cursor(cursor, key_hint, value_hint))
    }

    fn from_source(source: Result<EntrySource>) -> Self {
        if let Err(error) = &source {
            debug!(event = "stage_rejected", stage = "source", error = %error);
        }
        Self::from_state(
            StreamState::from_result(source.map(EntryPipeline::new)),
            StreamConfig::default(),
        )
    }

    pub(crate) fn from_state(state: StreamState<EntryPipeline>, config: StreamConfig) -> Self {
        Self { state, config }
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

    /// Key type after the last stage.
    pub fn out_key_type(&self) -> Option<&ValueType> {
        self.state.pipeline().map(|pipeline| pipeline.chain.out_types().0)
    }

    /// Value type after the last stage.
    pub fn out_value_type(&self) -> Option<&ValueType> {
        self.state.pipeline().map(|pipeline| pipeline.chain.out_types().1)
    }

    pub fn stage_count(&self) -> usize {
        self.state.pipeline().map_or(0, |pipeline| pipeline.chain.len())
    }

    pub fn error(&self) -> Option<&StreamError> {
        self.state.error()
    }

    pub fn is_consumed(&self) -> bool {
        self.state.is_consumed()
    }

    fn append(
        mut self,
        stage: StageKind,
        push: impl FnOnce(&mut EntryChain) -> Result<()>,
    ) -> Self {
        let Some(appended) = self.state.pipeline_mut().map(|pipeline| {
            push(&mut pipeline.chain).map(|()| {
                let (key, value) = pipeline.chain.out_types();
                (ValueType::map(key.clone(), value.clone()), pipeline.chain.len())
            })
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

    /// Keeps pairs for which `predicate(key, value)` returns true.
    pub fn filter<M>(self, predicate: impl IntoFunc<M>) -> Self {
        let predicate = predicate.into_func();
        self.append(StageKind::EntryFilter, move |chain| chain.push_filter(predicate))
    }

    /// Keeps pairs whose key satisfies `predicate`.
    pub fn filter_key<M>(self, predicate: impl IntoFunc<M>) -> Self {
        let predicate = predicate.into_func();
        self.append(StageKind::FilterKey, move |chain| chain.push_filter_key(predicate))
    }

    /// Keeps pairs whose value satisfies `predicate`.
    pub fn filter_value<M>(self, predicate: impl IntoFunc<M>) -> Self {
        let predicate = predicate.into_func();
        self.append(StageKind::FilterValue, move |chain| {
            chain.push_filter_value(predicate)
        })
    }

    /// Replaces each key with `mapper(key)`.
    pub fn map_key<M>(self, mapper: impl IntoFunc<M>) -> Self {
        let mapper = mapper.into_func();
        self.append(StageKind::MapKey, move |chain| chain.push_map_key(mapper))
    }

    /// Replaces each value with `mapper(value)`.
    pub fn map_value<M>(self, mapper: impl IntoFunc<M>) -> Self {
        let mapper = mapper.into_func();
        self.append(StageKind::MapValue, move |chain| chain.push_map_value(mapper))
    }

    /// Replaces each pair with `mapper(key, value)`.
    pub fn map_entry<M>(self, mapper: impl IntoFunc<M>) -> Self {
        let mapper = mapper.into_func();
        self.append(StageKind::MapEntry, move |chain| chain.push_map_entry(mapper))
    }

    /// Appends a user-defined stage.
    pub fn resolve<R>(self, resolver: R) -> Self
    where
        R: EntryResolver + 'static,
    {
        self.append(StageKind::Resolve, move |chain| {
            chain.push_custom(Box::new(resolver))
        })
    }

    fn drain(&mut self) -> Result<Map> {
        let pipeline = self.state.consume(self.config.reuse)?;
        debug!(
            event = "collect_start",
            out_key_type = %pipeline.chain.out_types().0,
            out_value_type = %pipeline.chain.out_types().1,
            stages = pipeline.chain.len(),
        );
        let started = Instant::now();
        let (map, counters) = match collect::collect_map(pipeline, &self.config) {
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
        Ok(map)
    }

    fn expected_container(&self) -> Result<ValueType> {
        let pipeline = self.state.ready(self.config.reuse)?;
        let (key, value) = pipeline.chain.out_types();
        Ok(ValueType::map(key.clone(), value.clone()))
    }

    /// Evaluates the pipeline into a new map.
    pub fn collect(&mut self) -> Result<Value> {
        let map = self.drain()?;
        Ok(CollectResult::fresh(Value::Map(map)).into_value())
    }

    /// Evaluates the pipeline and replaces the contents of `destination`.
    ///
    /// # Errors
    ///
    /// [`StreamError::TypeMismatch`] if `destination` is not a map of the
    /// output key and value types; the destination is left untouched.
    pub fn collect_into(&mut self, destination: &mut Value) -> Result<()> {
        let expected = self.expected_container()?;
        let found = destination.value_type();
        let fits = expected
            .entry()
            .is_some_and(|(key, value)| check::is_map_of(&found, key, value));
        if !fits {
            return Err(StreamError::TypeMismatch { expected, found });
        }
        let map = self.drain()?;
        CollectResult::at(destination, Value::Map(map)).write_back();
        Ok(())
    }

    /// Evaluates the pipeline into a Rust map such as `HashMap<K, V>`.
    pub fn collect_as<T: FromValue>(&mut self) -> Result<T> {
        let expected = self.expected_container()?;
        let found = T::value_type();
        if found != expected {
            return Err(StreamError::TypeMismatch { expected, found });
        }
        T::from_value(Value::Map(self.drain()?))
    }

    /// Like [`collect_as`](Self::collect_as), assigning into `destination`
    /// only on success.
    pub fn collect_into_typed<T: FromValue>(&mut self, destination: &mut T) -> Result<()> {
        *destination = self.collect_as()?;
        Ok(())
    }
}
