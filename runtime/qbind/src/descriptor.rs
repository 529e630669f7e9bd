//! Explicit, per-type descriptors.
//!
//! Binding is driven by [`TypeDescriptor`]s rather than by runtime reflection.
//! Every type that can be bound exposes one through [`Bindable::descriptor`],
//! either via a hand-written implementation or via `#[derive(Bind)]`.
//!
//! [`Bindable::descriptor`]: crate::Bindable::descriptor
use std::any::TypeId;
use std::fmt;

use crate::value::Value;

/// The structural kind of a type.
///
/// Kinds are the fallback lookup key of the [`BinderRegistry`]: a type that has no
/// binder registered for its exact identity is bound by the binder registered for its kind.
///
/// [`BinderRegistry`]: crate::BinderRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Uint,
    Float,
    Bool,
    String,
    Pointer,
    Sequence,
    Record,
}

/// The shape of a type, as seen by the binder.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A signed integer, `bits` wide.
    Int { bits: u32 },
    /// An unsigned integer, `bits` wide.
    Uint { bits: u32 },
    /// A floating point number, `bits` wide.
    Float { bits: u32 },
    Bool,
    String,
    /// An optional value. The function returns the descriptor of the pointee.
    Pointer(fn() -> TypeDescriptor),
    /// A sequence. The function returns the descriptor of the element type.
    Sequence(fn() -> TypeDescriptor),
    /// A record with named fields.
    Record(&'static [FieldDescriptor]),
    /// A nominal type without a structural kind (e.g. timestamps).
    ///
    /// Opaque types can only be bound by a binder registered for their exact type.
    Opaque,
}

impl Shape {
    /// The structural kind of this shape, if it has one.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Shape::Int { .. } => Some(Kind::Int),
            Shape::Uint { .. } => Some(Kind::Uint),
            Shape::Float { .. } => Some(Kind::Float),
            Shape::Bool => Some(Kind::Bool),
            Shape::String => Some(Kind::String),
            Shape::Pointer(_) => Some(Kind::Pointer),
            Shape::Sequence(_) => Some(Kind::Sequence),
            Shape::Record(_) => Some(Kind::Record),
            Shape::Opaque => None,
        }
    }
}

/// Identifies a target type: its exact identity, a human-readable name and its [`Shape`].
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    shape: Shape,
}

impl TypeDescriptor {
    /// Describe `T` as having the given shape.
    pub fn of<T: 'static>(shape: Shape) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            shape,
        }
    }

    /// Re-label this descriptor as `T`, keeping the same shape.
    ///
    /// This is how named aliases of other types (e.g. `struct Email(String)`) are described:
    /// they are bound like the type they wrap, unless a binder is registered for their
    /// exact type.
    pub fn alias<T: 'static>(self) -> Self {
        Self::of::<T>(self.shape)
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified name of the described type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> Option<Kind> {
        self.shape.kind()
    }

    /// The pointee of a pointer or the element of a sequence.
    pub fn element(&self) -> Option<TypeDescriptor> {
        match self.shape {
            Shape::Pointer(element) | Shape::Sequence(element) => Some(element()),
            _ => None,
        }
    }

    /// The fields of a record. Empty for every other shape.
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self.shape {
            Shape::Record(fields) => fields,
            _ => &[],
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.shape, Shape::Record(_))
    }

    /// Whether `value` converts into the described type.
    ///
    /// The check is structural: integers must fit, elements of sequences and pointees must
    /// be accepted by their own descriptor, records must have one slot per field.
    /// The fields of a record are checked when they are bound, not here.
    /// [`Shape::Opaque`] types accept every value: their conversion is only known to
    /// [`Bindable::from_value`].
    ///
    /// [`Bindable::from_value`]: crate::Bindable::from_value
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_zero() {
            return true;
        }
        match (&self.shape, value) {
            (Shape::Opaque, _) => true,
            (Shape::Int { bits }, Value::Int(v)) => fits_signed(i128::from(*v), *bits),
            (Shape::Int { bits }, Value::Uint(v)) => fits_signed(i128::from(*v), *bits),
            (Shape::Uint { bits }, Value::Int(v)) => fits_unsigned(i128::from(*v), *bits),
            (Shape::Uint { bits }, Value::Uint(v)) => fits_unsigned(i128::from(*v), *bits),
            (Shape::Float { .. }, Value::Float(_) | Value::Int(_) | Value::Uint(_)) => true,
            (Shape::Bool, Value::Bool(_)) | (Shape::String, Value::Str(_)) => true,
            (Shape::Pointer(_), Value::Optional(None)) => true,
            (Shape::Pointer(pointee), Value::Optional(Some(inner))) => pointee().accepts(inner),
            (Shape::Pointer(pointee), other) => pointee().accepts(other),
            (Shape::Sequence(element), Value::Seq(elements)) => {
                let element = element();
                elements.iter().all(|value| element.accepts(value))
            }
            (Shape::Record(fields), Value::Record(record)) => record.len() == fields.len(),
            _ => false,
        }
    }
}

fn fits_signed(value: i128, bits: u32) -> bool {
    let max = (1i128 << (bits - 1)) - 1;
    (-max - 1..=max).contains(&value)
}

fn fits_unsigned(value: i128, bits: u32) -> bool {
    value >= 0 && value < (1i128 << bits)
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// How a field relates to the namespace of the record that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embedding {
    /// A regular field, addressed by its wire name.
    None,
    /// An embedded record: its fields are addressed directly in the parent's namespace.
    Inline,
    /// An embedded `Option<Box<T>>`: allocated on demand, then treated like [`Embedding::Inline`].
    Pointer,
}

/// Describes a single field of a record.
///
/// Field descriptors are built in `const` context, usually by `#[derive(Bind)]`:
///
/// ```rust
/// use qbind::{Bindable, Embedding, FieldDescriptor};
///
/// const FIELDS: &[FieldDescriptor] = &[
///     FieldDescriptor::new("user_id", <u64 as Bindable>::descriptor).rename("uid"),
///     FieldDescriptor::new("internal", <bool as Bindable>::descriptor).skip(),
/// ];
/// assert_eq!(FIELDS[0].wire_name(), Some("uid"));
/// assert_eq!(FIELDS[1].wire_name(), None);
/// assert_eq!(FIELDS[1].embedding(), Embedding::None);
/// ```
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    name: &'static str,
    rename: Option<&'static str>,
    ty: fn() -> TypeDescriptor,
    embedding: Embedding,
    skip: bool,
}

impl FieldDescriptor {
    /// A regular field called `name`, whose type is described by `ty`.
    ///
    /// For embedded pointers (`Option<Box<T>>`), `ty` describes `T`.
    pub const fn new(name: &'static str, ty: fn() -> TypeDescriptor) -> Self {
        Self {
            name,
            rename: None,
            ty,
            embedding: Embedding::None,
            skip: false,
        }
    }

    /// Use `wire` instead of the declared name when looking up keys.
    ///
    /// A rename to `-` excludes the field from binding altogether.
    pub const fn rename(mut self, wire: &'static str) -> Self {
        self.rename = Some(wire);
        self
    }

    pub const fn embed(mut self, embedding: Embedding) -> Self {
        self.embedding = embedding;
        self
    }

    /// Never bind this field.
    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// The declared name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name used to address this field in the query, or `None` if the field
    /// must never be bound.
    pub fn wire_name(&self) -> Option<&'static str> {
        if self.skip {
            return None;
        }
        match self.rename {
            Some("-") => None,
            Some(wire) => Some(wire),
            None => Some(self.name),
        }
    }

    pub fn is_settable(&self) -> bool {
        self.wire_name().is_some()
    }

    pub fn ty(&self) -> TypeDescriptor {
        (self.ty)()
    }

    pub fn embedding(&self) -> Embedding {
        self.embedding
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding != Embedding::None
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name())
            .field("embedding", &self.embedding)
            .finish()
    }
}
