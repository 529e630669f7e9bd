//! Binders that turn a single string into a single primitive value.
use crate::descriptor::{Shape, TypeDescriptor};
use crate::driver::BindContext;
use crate::errors::FailureKind;
use crate::registry::Binder;
use crate::value::Value;

/// An adapter to build a one-key binder out of a conversion function.
///
/// The function receives the first value registered under the key being bound.
/// If the key is absent, or has no values, the function is not invoked and the
/// binder returns [`Value::Zero`].
/// If the function returns an error, the failure is recorded and [`Value::Zero`]
/// is returned.
///
/// ```rust
/// use qbind::binders::ValueBinder;
/// use qbind::errors::FailureKind;
/// use qbind::{BinderRegistry, Value};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Cents(u64);
/// # impl qbind::Bindable for Cents {
/// #     fn descriptor() -> qbind::TypeDescriptor {
/// #         qbind::TypeDescriptor::of::<Self>(qbind::Shape::Opaque)
/// #     }
/// #     fn from_value(value: Value) -> Option<Self> {
/// #         match value {
/// #             Value::Zero => Some(Cents(0)),
/// #             other => other.downcast(),
/// #         }
/// #     }
/// # }
///
/// let mut registry = BinderRegistry::with_defaults();
/// registry.register_type::<Cents>(ValueBinder::new(|raw, ty| {
///     let (units, cents) = raw.split_once('.').unwrap_or((raw, "0"));
///     match (units.parse::<u64>(), cents.parse::<u64>()) {
///         (Ok(u), Ok(c)) => Ok(Value::custom(Cents(u * 100 + c))),
///         _ => Err(FailureKind::malformed(raw, ty)),
///     }
/// }));
/// ```
pub struct ValueBinder<F> {
    convert: F,
}

impl<F> ValueBinder<F>
where
    F: Fn(&str, &TypeDescriptor) -> Result<Value, FailureKind> + Send + Sync,
{
    pub fn new(convert: F) -> Self {
        Self { convert }
    }
}

impl<F> Binder for ValueBinder<F>
where
    F: Fn(&str, &TypeDescriptor) -> Result<Value, FailureKind> + Send + Sync,
{
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value {
        let Some(raw) = cx.params().first(key) else {
            return Value::Zero;
        };
        match (self.convert)(raw, ty) {
            Ok(value) => value,
            Err(kind) => {
                cx.fail(key, kind);
                Value::Zero
            }
        }
    }
}

fn bits(ty: &TypeDescriptor) -> u32 {
    match ty.shape() {
        Shape::Int { bits } | Shape::Uint { bits } | Shape::Float { bits } => *bits,
        _ => 64,
    }
}

/// Signed integers, parsed as base-10 text and checked against the target width.
pub fn int(raw: &str, ty: &TypeDescriptor) -> Result<Value, FailureKind> {
    if raw.is_empty() {
        return Ok(Value::Zero);
    }
    let value: i64 = raw.parse().map_err(|_| FailureKind::malformed(raw, ty))?;
    let bits = bits(ty);
    if bits < 64 {
        let bound = 1i64 << (bits - 1);
        if value < -bound || value >= bound {
            return Err(FailureKind::malformed(raw, ty));
        }
    }
    Ok(Value::Int(value))
}

/// Unsigned integers, parsed as base-10 text and checked against the target width.
pub fn uint(raw: &str, ty: &TypeDescriptor) -> Result<Value, FailureKind> {
    if raw.is_empty() {
        return Ok(Value::Zero);
    }
    let value: u64 = raw.parse().map_err(|_| FailureKind::malformed(raw, ty))?;
    let bits = bits(ty);
    if bits < 64 && value >> bits != 0 {
        return Err(FailureKind::malformed(raw, ty));
    }
    Ok(Value::Uint(value))
}

pub fn float(raw: &str, ty: &TypeDescriptor) -> Result<Value, FailureKind> {
    if raw.is_empty() {
        return Ok(Value::Zero);
    }
    raw.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| FailureKind::malformed(raw, ty))
}

/// Booleans follow HTML checkbox semantics.
///
/// `true`, `on` and `1` (case-insensitive, surrounding whitespace ignored) are `true`.
/// Everything else is `false`: an unchecked checkbox doesn't send its key at all.
pub fn boolean(raw: &str, _ty: &TypeDescriptor) -> Result<Value, FailureKind> {
    let value = raw.trim();
    let truthy = ["true", "on", "1"]
        .iter()
        .any(|candidate| value.eq_ignore_ascii_case(candidate));
    Ok(Value::Bool(truthy))
}

pub fn string(raw: &str, _ty: &TypeDescriptor) -> Result<Value, FailureKind> {
    Ok(Value::Str(raw.to_owned()))
}
