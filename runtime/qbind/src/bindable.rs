use jiff::Timestamp;

use crate::descriptor::{Shape, TypeDescriptor};
use crate::value::Value;

/// A type that can be the target of a binding.
///
/// `Bindable` replaces runtime reflection: [`Bindable::descriptor`] tells the engine
/// what the type looks like, [`Bindable::from_value`] turns a bound [`Value`] back
/// into the type.
///
/// You rarely implement this trait by hand: records and named aliases get an
/// implementation from `#[derive(Bind)]`, the supported primitives are covered by
/// this crate.
///
/// # Implementing `Bindable` for a custom type
///
/// Types bound by a custom exact-type binder usually describe themselves as
/// [`Shape::Opaque`] and unwrap a [`Value::Custom`]:
///
/// ```rust
/// use qbind::{Bindable, Shape, TypeDescriptor, Value};
///
/// #[derive(Debug, Default, PartialEq)]
/// pub struct Rgb(u8, u8, u8);
///
/// impl Bindable for Rgb {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::of::<Self>(Shape::Opaque)
///     }
///
///     fn from_value(value: Value) -> Option<Self> {
///         match value {
///             Value::Zero => Some(Rgb::default()),
///             other => other.downcast::<Rgb>(),
///         }
///     }
/// }
/// ```
pub trait Bindable: Sized + 'static {
    /// Describe the shape of this type.
    fn descriptor() -> TypeDescriptor;

    /// Convert a bound value into `Self`.
    ///
    /// Returns `None` if the value is not convertible into `Self`: the caller then drops
    /// the value and leaves the destination at its zero value.
    /// [`Value::Zero`] must always convert into the zero value of `Self`.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! signed {
    ($($ty:ty),*) => {
        $(
            impl Bindable for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ty>(Shape::Int { bits: <$ty>::BITS })
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Zero => Some(0),
                        Value::Int(v) => <$ty>::try_from(v).ok(),
                        Value::Uint(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! unsigned {
    ($($ty:ty),*) => {
        $(
            impl Bindable for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ty>(Shape::Uint { bits: <$ty>::BITS })
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Zero => Some(0),
                        Value::Uint(v) => <$ty>::try_from(v).ok(),
                        Value::Int(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! float {
    ($($ty:ty => $bits:literal),*) => {
        $(
            impl Bindable for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ty>(Shape::Float { bits: $bits })
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Zero => Some(0.0),
                        Value::Float(v) => Some(v as $ty),
                        Value::Int(v) => Some(v as $ty),
                        Value::Uint(v) => Some(v as $ty),
                        _ => None,
                    }
                }
            }
        )*
    };
}

signed!(i8, i16, i32, i64, isize);
unsigned!(u8, u16, u32, u64, usize);
float!(f32 => 32, f64 => 64);

impl Bindable for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<bool>(Shape::Bool)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Zero => Some(false),
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Bindable for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<String>(Shape::String)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Zero => Some(String::new()),
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Timestamps are a nominal type: they have no structural kind and are bound by
/// the binder registered for their exact type.
///
/// The zero timestamp is the Unix epoch.
impl Bindable for Timestamp {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Timestamp>(Shape::Opaque)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Zero => Some(Timestamp::UNIX_EPOCH),
            Value::Timestamp(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Bindable> Bindable for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Option<T>>(Shape::Pointer(T::descriptor))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Zero | Value::Optional(None) => Some(None),
            Value::Optional(Some(inner)) => T::from_value(*inner).map(Some),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Bindable> Bindable for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Vec<T>>(Shape::Sequence(T::descriptor))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Zero => Some(Vec::new()),
            Value::Seq(elements) => elements.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
