//! Pipeline stages.
//!
//! A stage is a tagged variant carrying its function and the element type it
//! produces. Chains check each function against the type left by the previous
//! stage when it is appended, so evaluation never sees a mis-shaped stage.

#[cfg(test)]
mod tests;

use typeflow_core::{check, Func, Result, Signature, StageKind, StreamError, Value, ValueType};

/// A user-defined sequence stage.
///
/// `invoke` returns `None` to drop the element. `out_type` is read once, when
/// the resolver is appended; an emitted value of any other type fails the
/// evaluation with a conversion error.
pub trait Resolver {
    fn invoke(&self, value: Value) -> Result<Option<Value>>;

    fn out_type(&self) -> ValueType;
}

/// A user-defined entry stage.
pub trait EntryResolver {
    fn invoke(&self, key: Value, value: Value) -> Result<Option<(Value, Value)>>;

    fn out_key_type(&self) -> ValueType;

    fn out_value_type(&self) -> ValueType;
}

/// [`Resolver`] from a closure and a declared output type.
pub struct FnResolver<F> {
    out: ValueType,
    f: F,
}

impl<F> FnResolver<F>
where
    F: Fn(Value) -> Result<Option<Value>>,
{
    pub fn new(out: ValueType, f: F) -> Self {
        Self { out, f }
    }
}

impl<F> Resolver for FnResolver<F>
where
    F: Fn(Value) -> Result<Option<Value>>,
{
    fn invoke(&self, value: Value) -> Result<Option<Value>> {
        (self.f)(value)
    }

    fn out_type(&self) -> ValueType {
        self.out.clone()
    }
}

/// [`EntryResolver`] from a closure and declared output types.
pub struct FnEntryResolver<F> {
    key: ValueType,
    value: ValueType,
    f: F,
}

impl<F> FnEntryResolver<F>
where
    F: Fn(Value, Value) -> Result<Option<(Value, Value)>>,
{
    pub fn new(key: ValueType, value: ValueType, f: F) -> Self {
        Self { key, value, f }
    }
}

impl<F> EntryResolver for FnEntryResolver<F>
where
    F: Fn(Value, Value) -> Result<Option<(Value, Value)>>,
{
    fn invoke(&self, key: Value, value: Value) -> Result<Option<(Value, Value)>> {
        (self.f)(key, value)
    }

    fn out_key_type(&self) -> ValueType {
        self.key.clone()
    }

    fn out_value_type(&self) -> ValueType {
        self.value.clone()
    }
}

/// Result of pushing one element through a chain.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome<T> {
    Emit(T),
    /// Dropped by the stage at this index.
    Dropped(usize),
}

fn stage_shape(stage: StageKind, expected: String, found: &Signature) -> StreamError {
    StreamError::StageShape {
        stage,
        expected,
        found: found.clone(),
    }
}

fn undeclared(stage: StageKind, declared: &ValueType) -> StreamError {
    StreamError::StageShape {
        stage,
        expected: "a declared output type without nil".to_string(),
        found: Signature::new(Vec::new(), [declared.clone()]),
    }
}

/// Every declared result of a stage function must be a usable element type.
pub(crate) fn require_declared(stage: StageKind, signature: &Signature) -> Result<()> {
    if signature.results().iter().all(check::is_valid_hint) {
        return Ok(());
    }
    Err(stage_shape(
        stage,
        "a declared output type without nil".to_string(),
        signature,
    ))
}

enum StageOp {
    Filter(Func),
    Map(Func),
    Custom(Box<dyn Resolver>),
}

pub(crate) struct Stage {
    op: StageOp,
    out: ValueType,
}

impl Stage {
    pub(crate) fn kind(&self) -> StageKind {
        match self.op {
            StageOp::Filter(_) => StageKind::Filter,
            StageOp::Map(_) => StageKind::Map,
            StageOp::Custom(_) => StageKind::Resolve,
        }
    }

    fn invoke(&self, value: Value) -> Result<Option<Value>> {
        match &self.op {
            StageOp::Filter(predicate) => {
                if predicate.test(value.clone())? {
                    Ok(Some(value))
                } else {
                    Ok(None)
                }
            }
            StageOp::Map(mapper) => mapper.call1(value).map(Some),
            StageOp::Custom(resolver) => resolver.invoke(value),
        }
    }
}

/// Ordered sequence stages over a fixed input type.
pub(crate) struct StageChain {
    input: ValueType,
    stages: Vec<Stage>,
}

impl StageChain {
    pub(crate) fn new(input: ValueType) -> Self {
        Self {
            input,
            stages: Vec::new(),
        }
    }

    /// Element type after the last stage.
    pub(crate) fn out_type(&self) -> &ValueType {
        self.stages.last().map_or(&self.input, |stage| &stage.out)
    }

    pub(crate) fn len(&self) -> usize {
        self.stages.len()
    }

    pub(crate) fn kind_at(&self, index: usize) -> Option<StageKind> {
        self.stages.get(index).map(Stage::kind)
    }

    pub(crate) fn push_filter(&mut self, predicate: Func) -> Result<()> {
        let current = self.out_type().clone();
        if !check::is_filter_of(predicate.signature(), &current) {
            return Err(stage_shape(
                StageKind::Filter,
                format!("fn({}) -> bool", current),
                predicate.signature(),
            ));
        }
        self.stages.push(Stage {
            op: StageOp::Filter(predicate),
            out: current,
        });
        Ok(())
    }

    pub(crate) fn push_map(&mut self, mapper: Func) -> Result<()> {
        let current = self.out_type();
        if !check::is_mapper_of(mapper.signature(), current) {
            return Err(stage_shape(
                StageKind::Map,
                format!("fn({}) -> any", current),
                mapper.signature(),
            ));
        }
        require_declared(StageKind::Map, mapper.signature())?;
        let out = mapper.signature().results()[0].clone();
        self.stages.push(Stage {
            op: StageOp::Map(mapper),
            out,
        });
        Ok(())
    }

    pub(crate) fn push_custom(&mut self, resolver: Box<dyn Resolver>) -> Result<()> {
        let out = resolver.out_type();
        if !check::is_valid_hint(&out) {
            return Err(undeclared(StageKind::Resolve, &out));
        }
        self.stages.push(Stage {
            op: StageOp::Custom(resolver),
            out,
        });
        Ok(())
    }

    pub(crate) fn apply(&self, value: Value) -> Result<Outcome<Value>> {
        let mut value = value;
        for (index, stage) in self.stages.iter().enumerate() {
            match stage.invoke(value)? {
                Some(next) => value = next,
                None => return Ok(Outcome::Dropped(index)),
            }
        }
        Ok(Outcome::Emit(value))
    }
}

enum EntryOp {
    Filter(Func),
    FilterKey(Func),
    FilterValue(Func),
    MapKey(Func),
    MapValue(Func),
    MapEntry(Func),
    Custom(Box<dyn EntryResolver>),
}

fn retain(pass: bool, key: Value, value: Value) -> Option<(Value, Value)> {
    if pass {
        Some((key, value))
    } else {
        None
    }
}

pub(crate) struct EntryStage {
    op: EntryOp,
    key: ValueType,
    value: ValueType,
}

impl EntryStage {
    pub(crate) fn kind(&self) -> StageKind {
        match self.op {
            EntryOp::Filter(_) => StageKind::EntryFilter,
            EntryOp::FilterKey(_) => StageKind::FilterKey,
            EntryOp::FilterValue(_) => StageKind::FilterValue,
            EntryOp::MapKey(_) => StageKind::MapKey,
            EntryOp::MapValue(_) => StageKind::MapValue,
            EntryOp::MapEntry(_) => StageKind::MapEntry,
            EntryOp::Custom(_) => StageKind::Resolve,
        }
    }

    fn invoke(&self, key: Value, value: Value) -> Result<Option<(Value, Value)>> {
        match &self.op {
            EntryOp::Filter(predicate) => {
                let pass = predicate.test2(key.clone(), value.clone())?;
                Ok(retain(pass, key, value))
            }
            EntryOp::FilterKey(predicate) => {
                let pass = predicate.test(key.clone())?;
                Ok(retain(pass, key, value))
            }
            EntryOp::FilterValue(predicate) => {
                let pass = predicate.test(value.clone())?;
                Ok(retain(pass, key, value))
            }
            EntryOp::MapKey(mapper) => Ok(Some((mapper.call1(key)?, value))),
            EntryOp::MapValue(mapper) => Ok(Some((key, mapper.call1(value)?))),
            EntryOp::MapEntry(mapper) => mapper.call2_pair(key, value).map(Some),
            EntryOp::Custom(resolver) => resolver.invoke(key, value),
        }
    }
}

/// Ordered entry stages over fixed input key and value types.
pub(crate) struct EntryChain {
    key: ValueType,
    value: ValueType,
    stages: Vec<EntryStage>,
}

impl EntryChain {
    pub(crate) fn new(key: ValueType, value: ValueType) -> Self {
        Self {
            key,
            value,
            stages: Vec::new(),
        }
    }

    /// Key and value types after the last stage.
    pub(crate) fn out_types(&self) -> (&ValueType, &ValueType) {
        match self.stages.last() {
            Some(stage) => (&stage.key, &stage.value),
            None => (&self.key, &self.value),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.stages.len()
    }

    pub(crate) fn kind_at(&self, index: usize) -> Option<StageKind> {
        self.stages.get(index).map(EntryStage::kind)
    }

    fn push(&mut self, op: EntryOp, key: ValueType, value: ValueType) {
        self.stages.push(EntryStage { op, key, value });
    }

    fn current(&self) -> (ValueType, ValueType) {
        let (key, value) = self.out_types();
        (key.clone(), value.clone())
    }

    pub(crate) fn push_filter(&mut self, predicate: Func) -> Result<()> {
        let (key, value) = self.current();
        if !check::is_entry_filter_of(predicate.signature(), &key, &value) {
            return Err(stage_shape(
                StageKind::EntryFilter,
                format!("fn({}, {}) -> bool", key, value),
                predicate.signature(),
            ));
        }
        self.push(EntryOp::Filter(predicate), key, value);
        Ok(())
    }

    pub(crate) fn push_filter_key(&mut self, predicate: Func) -> Result<()> {
        let (key, value) = self.current();
        if !check::is_filter_of(predicate.signature(), &key) {
            return Err(stage_shape(
                StageKind::FilterKey,
                format!("fn({}) -> bool", key),
                predicate.signature(),
            ));
        }
        self.push(EntryOp::FilterKey(predicate), key, value);
        Ok(())
    }

    pub(crate) fn push_filter_value(&mut self, predicate: Func) -> Result<()> {
        let (key, value) = self.current();
        if !check::is_filter_of(predicate.signature(), &value) {
            return Err(stage_shape(
                StageKind::FilterValue,
                format!("fn({}) -> bool", value),
                predicate.signature(),
            ));
        }
        self.push(EntryOp::FilterValue(predicate), key, value);
        Ok(())
    }

    pub(crate) fn push_map_key(&mut self, mapper: Func) -> Result<()> {
        let (key, value) = self.current();
        if !check::is_mapper_of(mapper.signature(), &key) {
            return Err(stage_shape(
                StageKind::MapKey,
                format!("fn({}) -> any", key),
                mapper.signature(),
            ));
        }
        require_declared(StageKind::MapKey, mapper.signature())?;
        let new_key = mapper.signature().results()[0].clone();
        self.push(EntryOp::MapKey(mapper), new_key, value);
        Ok(())
    }

    pub(crate) fn push_map_value(&mut self, mapper: Func) -> Result<()> {
        let (key, value) = self.current();
        if !check::is_mapper_of(mapper.signature(), &value) {
            return Err(stage_shape(
                StageKind::MapValue,
                format!("fn({}) -> any", value),
                mapper.signature(),
            ));
        }
        require_declared(StageKind::MapValue, mapper.signature())?;
        let new_value = mapper.signature().results()[0].clone();
        self.push(EntryOp::MapValue(mapper), key, new_value);
        Ok(())
    }

    pub(crate) fn push_map_entry(&mut self, mapper: Func) -> Result<()> {
        let (key, value) = self.current();
        if !check::is_entry_mapper_of(mapper.signature(), &key, &value) {
            return Err(stage_shape(
                StageKind::MapEntry,
                format!("fn({}, {}) -> (any, any)", key, value),
                mapper.signature(),
            ));
        }
        require_declared(StageKind::MapEntry, mapper.signature())?;
        let results = mapper.signature().results();
        let (new_key, new_value) = (results[0].clone(), results[1].clone());
        self.push(EntryOp::MapEntry(mapper), new_key, new_value);
        Ok(())
    }

    pub(crate) fn push_custom(&mut self, resolver: Box<dyn EntryResolver>) -> Result<()> {
        let (key, value) = (resolver.out_key_type(), resolver.out_value_type());
        for declared in [&key, &value] {
            if !check::is_valid_hint(declared) {
                return Err(undeclared(StageKind::Resolve, declared));
            }
        }
        self.push(EntryOp::Custom(resolver), key, value);
        Ok(())
    }

    pub(crate) fn apply(&self, key: Value, value: Value) -> Result<Outcome<(Value, Value)>> {
        let mut entry = (key, value);
        for (index, stage) in self.stages.iter().enumerate() {
            match stage.invoke(entry.0, entry.1)? {
                Some(next) => entry = next,
                None => return Ok(Outcome::Dropped(index)),
            }
        }
        Ok(Outcome::Emit(entry))
    }
}
