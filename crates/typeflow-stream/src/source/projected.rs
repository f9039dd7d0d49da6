//! Entry source backed by a sequence pipeline and a projector.

use typeflow_core::{Func, Result, StreamError, Value};

use crate::pipeline::SequencePipeline;

/// How an upstream element becomes a key/value pair.
pub(crate) enum Projection {
    /// `fn(elem) -> (key, value)`
    Pair(Func),
    /// `fn(elem) -> value`, with the element itself as key.
    ValueOf(Func),
}

impl Projection {
    fn project(&self, element: Value) -> Result<(Value, Value)> {
        match self {
            Projection::Pair(func) => func.call1_pair(element),
            Projection::ValueOf(func) => {
                let value = func.call1(element.clone())?;
                Ok((element, value))
            }
        }
    }
}

/// Pulls elements from an upstream pipeline and projects them lazily.
///
/// The projector runs at most once per cursor position: the first read of
/// either the key or the value computes the pair, later reads at the same
/// generation reuse it.
pub(crate) struct ProjectedEntries {
    upstream: SequencePipeline,
    projection: Projection,
    current: Option<Value>,
    generation: u64,
    memo: Option<(u64, (Value, Value))>,
}

impl ProjectedEntries {
    pub(crate) fn new(upstream: SequencePipeline, projection: Projection) -> Self {
        Self {
            upstream,
            projection,
            current: None,
            generation: 0,
            memo: None,
        }
    }

    pub(crate) fn advance(&mut self) -> Result<bool> {
        self.generation += 1;
        self.current = self.upstream.pull()?;
        Ok(self.current.is_some())
    }

    fn projected(&mut self) -> Result<&(Value, Value)> {
        let fresh = matches!(&self.memo, Some((generation, _)) if *generation == self.generation);
        if !fresh {
            let element = self.current.clone().ok_or_else(|| {
                StreamError::Cursor("projected entry read before advance".to_string())
            })?;
            let entry = self.projection.project(element)?;
            self.memo = Some((self.generation, entry));
        }
        match &self.memo {
            Some((_, entry)) => Ok(entry),
            None => Err(StreamError::Cursor("projection was not memoized".to_string())),
        }
    }

    pub(crate) fn key(&mut self) -> Result<Value> {
        Ok(self.projected()?.0.clone())
    }

    pub(crate) fn value(&mut self) -> Result<Value> {
        Ok(self.projected()?.1.clone())
    }

    pub(crate) fn take_entry(&mut self) -> Result<(Value, Value)> {
        Ok(self.projected()?.clone())
    }

    pub(crate) fn size_hint(&self) -> usize {
        self.upstream.size_hint()
    }
}
