use std::any::Any;

use crate::descriptor::FieldDescriptor;

/// A value produced by a binder, before it is converted into its target type.
///
/// Binders never fail: when nothing can be bound they return [`Value::Zero`], which
/// every [`Bindable`](crate::Bindable) type converts into its zero value.
#[derive(Debug)]
#[non_exhaustive]
pub enum Value {
    /// The zero value of whatever the target type is.
    Zero,
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    Timestamp(jiff::Timestamp),
    /// A pointer: `None` if the key was absent.
    Optional(Option<Box<Value>>),
    /// Sequence elements, already placed at their index.
    Seq(Vec<Value>),
    Record(RecordValue),
    /// A value of an arbitrary type, produced by a custom exact-type binder.
    Custom(Box<dyn Any + Send>),
}

impl Value {
    /// Wrap a value of a custom type.
    pub fn custom<T: Any + Send>(value: T) -> Self {
        Value::Custom(Box::new(value))
    }

    /// Recover a value wrapped with [`Value::custom`].
    pub fn downcast<T: Any>(self) -> Option<T> {
        match self {
            Value::Custom(inner) => inner.downcast::<T>().ok().map(|b| *b),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Zero)
    }
}

/// The fields of a record that is being bound, indexed like its [`FieldDescriptor`]s.
///
/// Unbound fields hold [`Value::Zero`].
#[derive(Debug)]
pub struct RecordValue {
    slots: Vec<Value>,
}

impl RecordValue {
    /// An empty record with `len` fields.
    pub fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| Value::Zero).take(len).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    /// Store `value` at the field reached by `path`.
    ///
    /// Every index but the last one must point at an embedded record: its slot is turned
    /// into a nested [`RecordValue`] if it doesn't hold one already.
    pub(crate) fn set_path(
        &mut self,
        path: &[usize],
        value: Value,
        fields: &'static [FieldDescriptor],
    ) {
        let [head, rest @ ..] = path else {
            return;
        };
        let Some(slot) = self.slots.get_mut(*head) else {
            return;
        };
        if rest.is_empty() {
            *slot = value;
            return;
        }
        let Some(field) = fields.get(*head) else {
            return;
        };
        let inner_fields = field.ty().fields();
        if !matches!(slot, Value::Record(_)) {
            *slot = Value::Record(RecordValue::new(inner_fields.len()));
        }
        if let Value::Record(inner) = slot {
            inner.set_path(rest, value, inner_fields);
        }
    }

    /// Consume the record, yielding `(field index, value)` pairs.
    pub fn into_slots(self) -> impl Iterator<Item = (usize, Value)> {
        self.slots.into_iter().enumerate()
    }
}
