//! Type-erased functions with declared signatures.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::convert::{FromValue, IntoValue};
use crate::error::{Result, StreamError};
use crate::value::Value;
use crate::value_type::ValueType;

/// Arguments or results of a [`Func`] call.
pub type Args = SmallVec<[Value; 2]>;

/// Declared parameter and result types of a [`Func`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: SmallVec<[ValueType; 2]>,
    results: SmallVec<[ValueType; 2]>,
}

impl Signature {
    pub fn new(
        params: impl IntoIterator<Item = ValueType>,
        results: impl IntoIterator<Item = ValueType>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn results(&self) -> &[ValueType] {
        &self.results
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single),
            many => {
                f.write_str(" -> (")?;
                for (i, result) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", result)?;
                }
                f.write_str(")")
            }
        }
    }
}

type Body = dyn Fn(Args) -> Result<Args> + Send + Sync;

/// A callable with a declared [`Signature`].
///
/// The body is trusted to honor the signature: argument counts are not
/// rechecked per call, result counts are.
#[derive(Clone)]
pub struct Func {
    signature: Signature,
    body: Arc<Body>,
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Func {
    /// Creates a function from an explicit signature and a dynamic body.
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(Args) -> Result<Args> + Send + Sync + 'static,
    {
        Self {
            signature,
            body: Arc::new(body),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn call(&self, args: Args) -> Result<Args> {
        let results = (self.body)(args)?;
        let expected = self.signature.results.len();
        if results.len() != expected {
            return Err(StreamError::Arity {
                expected,
                found: results.len(),
            });
        }
        Ok(results)
    }

    /// Calls a one-parameter, one-result function.
    pub fn call1(&self, arg: Value) -> Result<Value> {
        let mut args = Args::new();
        args.push(arg);
        Ok(first(self.call(args)?))
    }

    /// Calls a two-parameter, one-result function.
    pub fn call2(&self, a: Value, b: Value) -> Result<Value> {
        let mut args = Args::new();
        args.push(a);
        args.push(b);
        Ok(first(self.call(args)?))
    }

    /// Calls a one-parameter, two-result function.
    pub fn call1_pair(&self, arg: Value) -> Result<(Value, Value)> {
        let mut args = Args::new();
        args.push(arg);
        Ok(pair(self.call(args)?))
    }

    /// Calls a two-parameter, two-result function.
    pub fn call2_pair(&self, a: Value, b: Value) -> Result<(Value, Value)> {
        let mut args = Args::new();
        args.push(a);
        args.push(b);
        Ok(pair(self.call(args)?))
    }

    /// Calls a one-parameter predicate.
    pub fn test(&self, arg: Value) -> Result<bool> {
        as_bool(self.call1(arg)?)
    }

    /// Calls a two-parameter predicate.
    pub fn test2(&self, a: Value, b: Value) -> Result<bool> {
        as_bool(self.call2(a, b)?)
    }
}

// `call` has already verified the result count.
fn first(results: Args) -> Value {
    results.into_iter().next().unwrap_or(Value::Nil)
}

fn pair(results: Args) -> (Value, Value) {
    let mut results = results.into_iter();
    let key = results.next().unwrap_or(Value::Nil);
    let value = results.next().unwrap_or(Value::Nil);
    (key, value)
}

fn as_bool(value: Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(StreamError::conversion(ValueType::Bool, other.value_type())),
    }
}

fn take_arg<T: FromValue>(args: &mut smallvec::IntoIter<[Value; 2]>, found: usize) -> Result<T> {
    match args.next() {
        Some(value) => T::from_value(value),
        None => Err(StreamError::Arity {
            expected: found + 1,
            found,
        }),
    }
}

fn results1(value: Value) -> Args {
    let mut results = Args::new();
    results.push(value);
    results
}

fn results2(key: Value, value: Value) -> Args {
    let mut results = Args::new();
    results.push(key);
    results.push(value);
    results
}

/// Marker types that keep the [`IntoFunc`] impls apart.
pub mod marker {
    use std::marker::PhantomData;

    /// An already-built [`Func`](super::Func).
    pub struct Dynamic;

    /// `Fn(A) -> R`
    pub struct Unary<A, R>(PhantomData<fn(A) -> R>);

    /// `Fn(A, B) -> R`
    pub struct Binary<A, B, R>(PhantomData<fn(A, B) -> R>);

    /// `Fn(A) -> (K, V)`
    pub struct UnaryPair<A, K, V>(PhantomData<fn(A) -> (K, V)>);

    /// `Fn(A, B) -> (K, V)`
    pub struct BinaryPair<A, B, K, V>(PhantomData<fn(A, B) -> (K, V)>);
}

/// Conversion into a [`Func`].
///
/// Implemented for `Func` itself and for closures of one or two arguments
/// returning one value or a pair. The signature is derived from the closure's
/// argument and return types, so closure arguments need type annotations:
///
/// ```
/// use typeflow_core::{IntoFunc, Signature, ValueType};
///
/// let func = (|s: String| s.len() < 2).into_func();
/// assert_eq!(
///     func.signature(),
///     &Signature::new([ValueType::String], [ValueType::Bool])
/// );
/// ```
pub trait IntoFunc<Marker> {
    fn into_func(self) -> Func;
}

impl IntoFunc<marker::Dynamic> for Func {
    fn into_func(self) -> Func {
        self
    }
}

impl<F, A, R> IntoFunc<marker::Unary<A, R>> for F
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: FromValue,
    R: IntoValue,
{
    fn into_func(self) -> Func {
        let signature = Signature::new([A::value_type()], [R::value_type()]);
        let f = self;
        Func::new(signature, move |args| {
            let mut args = args.into_iter();
            let a = take_arg::<A>(&mut args, 0)?;
            Ok(results1(f(a).into_value()))
        })
    }
}

impl<F, A, B, R> IntoFunc<marker::Binary<A, B, R>> for F
where
    F: Fn(A, B) -> R + Send + Sync + 'static,
    A: FromValue,
    B: FromValue,
    R: IntoValue,
{
    fn into_func(self) -> Func {
        let signature = Signature::new([A::value_type(), B::value_type()], [R::value_type()]);
        let f = self;
        Func::new(signature, move |args| {
            let mut args = args.into_iter();
            let a = take_arg::<A>(&mut args, 0)?;
            let b = take_arg::<B>(&mut args, 1)?;
            Ok(results1(f(a, b).into_value()))
        })
    }
}

impl<F, A, K, V> IntoFunc<marker::UnaryPair<A, K, V>> for F
where
    F: Fn(A) -> (K, V) + Send + Sync + 'static,
    A: FromValue,
    K: IntoValue,
    V: IntoValue,
{
    fn into_func(self) -> Func {
        let signature = Signature::new([A::value_type()], [K::value_type(), V::value_type()]);
        let f = self;
        Func::new(signature, move |args| {
            let mut args = args.into_iter();
            let a = take_arg::<A>(&mut args, 0)?;
            let (k, v) = f(a);
            Ok(results2(k.into_value(), v.into_value()))
        })
    }
}

impl<F, A, B, K, V> IntoFunc<marker::BinaryPair<A, B, K, V>> for F
where
    F: Fn(A, B) -> (K, V) + Send + Sync + 'static,
    A: FromValue,
    B: FromValue,
    K: IntoValue,
    V: IntoValue,
{
    fn into_func(self) -> Func {
        let signature = Signature::new(
            [A::value_type(), B::value_type()],
            [K::value_type(), V::value_type()],
        );
        let f = self;
        Func::new(signature, move |args| {
            let mut args = args.into_iter();
            let a = take_arg::<A>(&mut args, 0)?;
            let b = take_arg::<B>(&mut args, 1)?;
            let (k, v) = f(a, b);
            Ok(results2(k.into_value(), v.into_value()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_signature() {
        let func = (|x: i64| x * 2).into_func();
        assert_eq!(func.signature().params(), &[ValueType::I64]);
        assert_eq!(func.signature().results(), &[ValueType::I64]);
        assert_eq!(func.call1(Value::I64(21)), Ok(Value::I64(42)));
    }

    #[test]
    fn test_binary_predicate() {
        let func = (|k: i64, v: String| k > 0 && !v.is_empty()).into_func();
        assert_eq!(func.signature().to_string(), "fn(i64, string) -> bool");
        assert_eq!(func.test2(Value::I64(1), Value::string("a")), Ok(true));
        assert_eq!(func.test2(Value::I64(0), Value::string("a")), Ok(false));
    }

    #[test]
    fn test_pair_result() {
        let func = (|x: i64| (x, x.to_string())).into_func();
        assert_eq!(func.signature().to_string(), "fn(i64) -> (i64, string)");
        assert_eq!(
            func.call1_pair(Value::I64(5)),
            Ok((Value::I64(5), Value::string("5")))
        );
    }

    #[test]
    fn test_argument_conversion_failure() {
        let func = (|x: i64| x + 1).into_func();
        let err = func.call1(Value::string("nope")).unwrap_err();
        assert_eq!(
            err,
            StreamError::Conversion {
                expected: ValueType::I64,
                found: ValueType::String,
            }
        );
    }

    #[test]
    fn test_dynamic_body_result_count_checked() {
        let func = Func::new(
            Signature::new([ValueType::I64], [ValueType::I64]),
            |_args| Ok(Args::new()),
        );
        assert_eq!(
            func.call1(Value::I64(1)),
            Err(StreamError::Arity {
                expected: 1,
                found: 0,
            })
        );
    }

    #[test]
    fn test_predicate_requires_bool() {
        let func = (|x: i64| x).into_func();
        assert!(matches!(
            func.test(Value::I64(1)),
            Err(StreamError::Conversion { .. })
        ));
    }
}
