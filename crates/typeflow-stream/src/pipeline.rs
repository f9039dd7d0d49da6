//! A source plus its stage chain.

use tracing::trace;
use typeflow_core::{Result, StreamError, Value, ValueType};

use crate::resolve::{EntryChain, Outcome, StageChain};
use crate::source::{EntrySource, SequenceSource};

/// Element counts since the pipeline was built.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Counters {
    pub emitted: u64,
    pub dropped: u64,
}

impl Counters {
    pub(crate) fn since(self, earlier: Counters) -> Counters {
        Counters {
            emitted: self.emitted - earlier.emitted,
            dropped: self.dropped - earlier.dropped,
        }
    }
}

// Dynamic functions and custom resolvers are trusted at append time; this is
// where a value that breaks its declared type is caught.
fn conforms(value: &Value, declared: &ValueType) -> Result<()> {
    let found = value.value_type();
    if &found != declared {
        return Err(StreamError::Conversion {
            expected: declared.clone(),
            found,
        });
    }
    Ok(())
}

pub(crate) struct SequencePipeline {
    source: SequenceSource,
    pub(crate) chain: StageChain,
    counters: Counters,
    trace_elements: bool,
}

impl SequencePipeline {
    pub(crate) fn new(source: SequenceSource) -> Self {
        let chain = StageChain::new(source.elem_type().clone());
        Self {
            source,
            chain,
            counters: Counters::default(),
            trace_elements: false,
        }
    }

    pub(crate) fn set_trace_elements(&mut self, enabled: bool) {
        self.trace_elements = enabled;
    }

    pub(crate) fn counters(&self) -> Counters {
        self.counters
    }

    pub(crate) fn size_hint(&self) -> usize {
        self.source.size_hint()
    }

    /// Returns the next element that survives every stage, or `None` once
    /// the source is exhausted.
    pub(crate) fn pull(&mut self) -> Result<Option<Value>> {
        while self.source.advance() {
            let value = self.source.take_current()?;
            match self.chain.apply(value)? {
                Outcome::Emit(value) => {
                    conforms(&value, self.chain.out_type())?;
                    self.counters.emitted += 1;
                    return Ok(Some(value));
                }
                Outcome::Dropped(index) => {
                    self.counters.dropped += 1;
                    if self.trace_elements {
                        trace!(
                            event = "element_dropped",
                            stage = index,
                            kind = ?self.chain.kind_at(index),
                        );
                    }
                }
            }
        }
        Ok(None)
    }
}

pub(crate) struct EntryPipeline {
    source: EntrySource,
    pub(crate) chain: EntryChain,
    counters: Counters,
    trace_elements: bool,
}

impl EntryPipeline {
    pub(crate) fn new(source: EntrySource) -> Self {
        let chain = EntryChain::new(source.key_type().clone(), source.value_type().clone());
        Self {
            source,
            chain,
            counters: Counters::default(),
            trace_elements: false,
        }
    }

    pub(crate) fn set_trace_elements(&mut self, enabled: bool) {
        self.trace_elements = enabled;
    }

    pub(crate) fn counters(&self) -> Counters {
        self.counters
    }

    pub(crate) fn size_hint(&self) -> usize {
        self.source.size_hint()
    }

    pub(crate) fn pull(&mut self) -> Result<Option<(Value, Value)>> {
        while self.source.advance()? {
            let (key, value) = self.source.take_entry()?;
            match self.chain.apply(key, value)? {
                Outcome::Emit(entry) => {
                    let (key, value) = self.chain.out_types();
                    conforms(&entry.0, key)?;
                    conforms(&entry.1, value)?;
                    self.counters.emitted += 1;
                    return Ok(Some(entry));
                }
                Outcome::Dropped(index) => {
                    self.counters.dropped += 1;
                    if self.trace_elements {
                        trace!(
                            event = "element_dropped",
                            stage = index,
                            kind = ?self.chain.kind_at(index),
                        );
                    }
                }
            }
        }
        Ok(None)
    }
}
