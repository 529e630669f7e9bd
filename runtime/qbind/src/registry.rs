use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::binders::{
    PointerBinder, SequenceBinder, StructBinder, TimestampBinder, ValueBinder, leaf,
};
use crate::descriptor::{Kind, TypeDescriptor};
use crate::driver::BindContext;
use crate::value::Value;

/// A strategy to construct a value of a given type out of the query parameters.
///
/// A binder receives the key it must bind and the descriptor of the target type.
/// It never fails: when nothing can be bound it returns [`Value::Zero`], after
/// recording the reason with [`BindContext::fail`] if something was malformed.
///
/// Closures with the right signature are binders:
///
/// ```rust
/// use qbind::{BindContext, BinderRegistry, TypeDescriptor, Value};
///
/// let mut registry = BinderRegistry::with_defaults();
/// registry.register_type::<String>(
///     |cx: &mut BindContext<'_>, key: &str, _ty: &TypeDescriptor| {
///         let upper = cx.params().first(key).map(str::to_uppercase);
///         upper.map(Value::Str).unwrap_or(Value::Zero)
///     },
/// );
/// ```
pub trait Binder: Send + Sync {
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value;
}

impl<F> Binder for F
where
    F: Fn(&mut BindContext<'_>, &str, &TypeDescriptor) -> Value + Send + Sync,
{
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value {
        self(cx, key, ty)
    }
}

/// A type-indexed table of binders.
///
/// Lookups check the exact type first, then fall back to the type's structural [`Kind`].
/// There is at most one binder per exact type and one per kind: registering again
/// replaces the previous entry.
///
/// The registry is populated once, before it is handed over to a [`QueryBinder`];
/// it is read-only from then on.
///
/// [`QueryBinder`]: crate::QueryBinder
#[derive(Default)]
pub struct BinderRegistry {
    by_type: HashMap<TypeId, (&'static str, Box<dyn Binder>)>,
    by_kind: HashMap<Kind, Box<dyn Binder>>,
}

impl BinderRegistry {
    /// An empty registry: nothing can be bound until binders are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with a binder for every structural kind and for [`jiff::Timestamp`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register_kind(Kind::Int, ValueBinder::new(leaf::int))
            .register_kind(Kind::Uint, ValueBinder::new(leaf::uint))
            .register_kind(Kind::Float, ValueBinder::new(leaf::float))
            .register_kind(Kind::Bool, ValueBinder::new(leaf::boolean))
            .register_kind(Kind::String, ValueBinder::new(leaf::string))
            .register_kind(Kind::Pointer, PointerBinder)
            .register_kind(Kind::Sequence, SequenceBinder)
            .register_kind(Kind::Record, StructBinder)
            .register_type::<jiff::Timestamp>(TimestampBinder);
        registry
    }

    /// Bind every value of type `T` with `binder`, regardless of its kind.
    pub fn register_type<T: 'static>(&mut self, binder: impl Binder + 'static) -> &mut Self {
        let name = std::any::type_name::<T>();
        if self
            .by_type
            .insert(TypeId::of::<T>(), (name, Box::new(binder)))
            .is_some()
        {
            tracing::debug!(type_name = name, "Replaced the binder registered for type");
        }
        self
    }

    /// Bind values of the given kind with `binder`, unless their exact type has a binder.
    pub fn register_kind(&mut self, kind: Kind, binder: impl Binder + 'static) -> &mut Self {
        if self.by_kind.insert(kind, Box::new(binder)).is_some() {
            tracing::debug!(kind = ?kind, "Replaced the binder registered for kind");
        }
        self
    }

    /// Find the binder for `ty`.
    ///
    /// `None` is not an error: the target is left at its zero value.
    pub fn resolve(&self, ty: &TypeDescriptor) -> Option<&dyn Binder> {
        if let Some((_, binder)) = self.by_type.get(&ty.id()) {
            return Some(binder.as_ref());
        }
        let kind = ty.kind()?;
        self.by_kind.get(&kind).map(Box::as_ref)
    }
}

impl fmt::Debug for BinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.by_type.values().map(|(name, _)| *name).collect();
        types.sort_unstable();
        let mut kinds: Vec<_> = self.by_kind.keys().map(|k| format!("{k:?}")).collect();
        kinds.sort_unstable();
        f.debug_struct("BinderRegistry")
            .field("types", &types)
            .field("kinds", &kinds)
            .finish()
    }
}
