//! Typed field data sources.
//!
//! A [`FieldAdapter<S, K>`] exposes one scalar field of the backing state
//! `S` as a remotely readable and writable variable. `K` is one of the two
//! [`Scalar`] kinds, `f64` or `u32`; both share the same validate-then-apply
//! path and differ only in the checks [`Scalar`] contributes.
//!
//! Read rejects, in order:
//! 1. an adapter with no backing field (`InternalError`);
//! 2. any non-empty index range (`InvalidRange`).
//!
//! Write rejects, in order:
//! 1. an adapter with no backing field (`InternalError`);
//! 2. a missing value (`InvalidArgument`);
//! 3. any non-empty index range (`InvalidRange`);
//! 4. a value that is not a scalar of exactly kind `K` (`TypeMismatch`);
//! 5. for `f64`, NaN or ±infinity (`OutOfRange`).
//!
//! A rejected write leaves the field untouched.

use std::fmt;
use std::marker::PhantomData;

use chrono::Utc;
use cstr_schema::{NodeId, ScalarKind};
use tracing::info;

use crate::error::AccessError;
use crate::status::StatusCode;
use crate::value::{DataValue, ReadOptions, Variant, WriteValue, has_range};

/// How a variable is named in diagnostics: its display name if it has one,
/// otherwise its numeric node id.
#[derive(Debug, Clone, Copy)]
pub struct NodeLabel<'a> {
    pub id: NodeId,
    pub display_name: Option<&'a str>,
}

impl fmt::Display for NodeLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name {
            Some(name) if !name.is_empty() => f.write_str(name),
            _ => write!(f, "{}", self.id),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for u32 {}
}

/// A primitive kind a field adapter can carry.
pub trait Scalar: sealed::Sealed + Copy + fmt::Display + Send + Sync + 'static {
    const KIND: ScalarKind;

    /// Extract a value of exactly this kind; anything else is a mismatch.
    fn from_variant(value: &Variant) -> Option<Self>;

    fn into_variant(self) -> Variant;

    /// Kind-specific value validation.
    fn check(self) -> Result<Self, AccessError> {
        Ok(self)
    }

    /// Diagnostic emitted after a successful write.
    fn written(_label: &NodeLabel<'_>, _value: Self) {}
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Double;

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn into_variant(self) -> Variant {
        Variant::Double(self)
    }

    fn check(self) -> Result<Self, AccessError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(AccessError::OutOfRange(self))
        }
    }

    fn written(label: &NodeLabel<'_>, value: Self) {
        info!(node = %label, value, "value written");
    }
}

impl Scalar for u32 {
    const KIND: ScalarKind = ScalarKind::UInt32;

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    fn into_variant(self) -> Variant {
        Variant::UInt32(self)
    }
}

/// Locates one field of kind `K` inside the backing state `S`.
pub struct FieldAccessor<S, K> {
    get: fn(&S) -> &K,
    get_mut: fn(&mut S) -> &mut K,
}

impl<S, K> FieldAccessor<S, K> {
    pub fn new(get: fn(&S) -> &K, get_mut: fn(&mut S) -> &mut K) -> Self {
        Self { get, get_mut }
    }
}

impl<S, K> Clone for FieldAccessor<S, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, K> Copy for FieldAccessor<S, K> {}

impl<S, K> fmt::Debug for FieldAccessor<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor").finish_non_exhaustive()
    }
}

/// The read/write handler the address space calls for a bound variable.
pub trait DataSource<S>: Send + Sync {
    /// Kind of the values this source produces and accepts.
    fn kind(&self) -> ScalarKind;

    fn read(&self, state: &S, options: &ReadOptions) -> Result<DataValue, AccessError>;

    fn write(
        &self,
        state: &mut S,
        request: &WriteValue,
        label: &NodeLabel<'_>,
    ) -> Result<(), AccessError>;
}

/// Data source over a single scalar field.
pub struct FieldAdapter<S, K> {
    field: Option<FieldAccessor<S, K>>,
    _kind: PhantomData<fn() -> K>,
}

impl<S, K: Scalar> FieldAdapter<S, K> {
    pub fn new(field: FieldAccessor<S, K>) -> Self {
        Self {
            field: Some(field),
            _kind: PhantomData,
        }
    }

    /// An adapter with no backing field. Every access fails with
    /// `InternalError`.
    pub fn unbound() -> Self {
        Self {
            field: None,
            _kind: PhantomData,
        }
    }

    fn accessor(&self) -> Result<&FieldAccessor<S, K>, AccessError> {
        self.field.as_ref().ok_or(AccessError::InternalError)
    }
}

impl<S, K> fmt::Debug for FieldAdapter<S, K>
where
    K: Scalar,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAdapter")
            .field("kind", &K::KIND)
            .field("bound", &self.field.is_some())
            .finish()
    }
}

impl<S, K: Scalar> DataSource<S> for FieldAdapter<S, K> {
    fn kind(&self) -> ScalarKind {
        K::KIND
    }

    fn read(&self, state: &S, options: &ReadOptions) -> Result<DataValue, AccessError> {
        let field = self.accessor()?;
        if has_range(options.index_range.as_ref()) {
            return Err(AccessError::InvalidRange);
        }

        let value = *(field.get)(state);
        let now = Utc::now();
        Ok(DataValue {
            value: value.into_variant(),
            status: StatusCode::Good,
            source_timestamp: options.include_source_timestamp.then_some(now),
            server_timestamp: now,
        })
    }

    fn write(
        &self,
        state: &mut S,
        request: &WriteValue,
        label: &NodeLabel<'_>,
    ) -> Result<(), AccessError> {
        let field = self.accessor()?;
        let value = request.value.as_ref().ok_or(AccessError::InvalidArgument)?;
        if has_range(request.index_range.as_ref()) {
            return Err(AccessError::InvalidRange);
        }

        let v = K::from_variant(value).ok_or(AccessError::TypeMismatch {
            expected: K::KIND,
            found: value.type_name(),
        })?;
        let v = v.check()?;

        *(field.get_mut)(state) = v;
        K::written(label, v);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NumericRange;

    #[derive(Debug, Default)]
    struct Tank {
        level: f64,
        batch: u32,
    }

    fn level() -> FieldAdapter<Tank, f64> {
        FieldAdapter::new(FieldAccessor::new(|t: &Tank| &t.level, |t: &mut Tank| &mut t.level))
    }

    fn batch() -> FieldAdapter<Tank, u32> {
        FieldAdapter::new(FieldAccessor::new(|t: &Tank| &t.batch, |t: &mut Tank| &mut t.batch))
    }

    fn label() -> NodeLabel<'static> {
        NodeLabel {
            id: NodeId::numeric(1, 50_001),
            display_name: Some("LEVEL"),
        }
    }

    fn range(s: &str) -> Option<NumericRange> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_read_returns_current_value() {
        let tank = Tank {
            level: 2.5,
            batch: 7,
        };
        let dv = level().read(&tank, &ReadOptions::default()).unwrap();
        assert_eq!(dv.value, Variant::Double(2.5));
        assert_eq!(dv.status, StatusCode::Good);
        assert!(dv.source_timestamp.is_none());

        let dv = batch().read(&tank, &ReadOptions::default()).unwrap();
        assert_eq!(dv.value, Variant::UInt32(7));
    }

    #[test]
    fn test_read_source_timestamp_on_request() {
        let options = ReadOptions {
            include_source_timestamp: true,
            ..ReadOptions::default()
        };
        let dv = level().read(&Tank::default(), &options).unwrap();
        assert!(dv.source_timestamp.is_some());
    }

    #[test]
    fn test_read_rejects_index_range_for_both_kinds() {
        let tank = Tank::default();
        let options = ReadOptions {
            index_range: range("0:1"),
            ..ReadOptions::default()
        };
        assert_eq!(level().read(&tank, &options), Err(AccessError::InvalidRange));
        assert_eq!(batch().read(&tank, &options), Err(AccessError::InvalidRange));
    }

    #[test]
    fn test_empty_range_is_not_a_range() {
        let options = ReadOptions {
            index_range: Some(NumericRange::default()),
            ..ReadOptions::default()
        };
        assert!(level().read(&Tank::default(), &options).is_ok());
    }

    #[test]
    fn test_unbound_adapter_is_internal_error() {
        let mut tank = Tank::default();
        let adapter = FieldAdapter::<Tank, f64>::unbound();
        assert_eq!(
            adapter.read(&tank, &ReadOptions::default()),
            Err(AccessError::InternalError)
        );
        assert_eq!(
            adapter.write(&mut tank, &WriteValue::scalar(Variant::Double(1.0)), &label()),
            Err(AccessError::InternalError)
        );
    }

    #[test]
    fn test_write_double() {
        let mut tank = Tank::default();
        level()
            .write(&mut tank, &WriteValue::scalar(Variant::Double(42.0)), &label())
            .unwrap();
        assert_eq!(tank.level, 42.0);
    }

    #[test]
    fn test_write_rejects_non_finite_and_keeps_value() {
        let mut tank = Tank {
            level: 3.0,
            batch: 0,
        };
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = level()
                .write(&mut tank, &WriteValue::scalar(Variant::Double(bad)), &label())
                .unwrap_err();
            assert!(matches!(err, AccessError::OutOfRange(_)));
            assert_eq!(err.status(), StatusCode::BadOutOfRange);
            assert_eq!(tank.level, 3.0);
        }
    }

    #[test]
    fn test_write_rejects_missing_value() {
        let mut tank = Tank::default();
        assert_eq!(
            level().write(&mut tank, &WriteValue::default(), &label()),
            Err(AccessError::InvalidArgument)
        );
    }

    #[test]
    fn test_write_rejects_index_range_for_both_kinds() {
        let mut tank = Tank::default();
        let request = WriteValue {
            value: Some(Variant::Double(1.0)),
            index_range: range("2"),
        };
        assert_eq!(
            level().write(&mut tank, &request, &label()),
            Err(AccessError::InvalidRange)
        );

        let request = WriteValue {
            value: Some(Variant::UInt32(1)),
            index_range: range("0:4"),
        };
        assert_eq!(
            batch().write(&mut tank, &request, &label()),
            Err(AccessError::InvalidRange)
        );
        assert_eq!(tank.batch, 0);
    }

    #[test]
    fn test_write_rejects_wrong_kind() {
        let mut tank = Tank::default();
        let err = level()
            .write(&mut tank, &WriteValue::scalar(Variant::Float(1.0)), &label())
            .unwrap_err();
        assert_eq!(
            err,
            AccessError::TypeMismatch {
                expected: ScalarKind::Double,
                found: "Float"
            }
        );

        let err = batch()
            .write(&mut tank, &WriteValue::scalar(Variant::Int32(5)), &label())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BadTypeMismatch);

        let err = batch()
            .write(&mut tank, &WriteValue::scalar(Variant::Double(5.0)), &label())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BadTypeMismatch);
    }

    #[test]
    fn test_write_rejects_arrays() {
        let mut tank = Tank::default();
        let request = WriteValue::scalar(Variant::Array(vec![Variant::Double(1.0)]));
        assert!(matches!(
            level().write(&mut tank, &request, &label()),
            Err(AccessError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_uint32_accepts_full_range() {
        let mut tank = Tank::default();
        batch()
            .write(&mut tank, &WriteValue::scalar(Variant::UInt32(u32::MAX)), &label())
            .unwrap();
        assert_eq!(tank.batch, u32::MAX);
    }

    #[test]
    fn test_label_falls_back_to_node_id() {
        let named = label();
        assert_eq!(named.to_string(), "LEVEL");
        let anonymous = NodeLabel {
            id: NodeId::numeric(1, 7),
            display_name: None,
        };
        assert_eq!(anonymous.to_string(), "ns=1;i=7");
    }
}
