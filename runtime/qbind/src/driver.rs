use jiff::tz::TimeZone;

use crate::bindable::Bindable;
use crate::binders::TimeLayout;
use crate::config::BindConfig;
use crate::descriptor::TypeDescriptor;
use crate::errors::{BindError, FailureKind, FieldFailure, InvalidTimeZone};
use crate::params::QueryMap;
use crate::record::{Record, RecordMut, VisitedSet};
use crate::registry::BinderRegistry;
use crate::value::Value;

/// The binding engine: a [`BinderRegistry`] plus the [`BindConfig`] it was built with.
///
/// A `QueryBinder` is immutable once built. Build it at start-up and share it: it's
/// `Send + Sync`, and every bind call keeps its own state.
///
/// # Example
///
/// ```rust
/// use qbind::{Bind, BindConfig, QueryBinder, QueryMap};
///
/// #[derive(Bind, Default, Debug)]
/// struct Base {
///     id: u64,
/// }
///
/// #[derive(Bind, Default, Debug)]
/// struct Search {
///     #[bind(flatten)]
///     base: Base,
///     q: String,
///     #[bind(rename = "tag")]
///     tags: Vec<String>,
///     page: Option<u32>,
/// }
///
/// let engine = QueryBinder::new(BindConfig::default()).unwrap();
/// let params = QueryMap::parse("id=7&q=rust&tag.1=b&tag.0=a");
///
/// let mut search = Search::default();
/// engine.bind(&mut search, &params);
/// assert_eq!(search.base.id, 7);
/// assert_eq!(search.q, "rust");
/// assert_eq!(search.tags, ["a", "b"]);
/// assert_eq!(search.page, None);
/// ```
#[derive(Debug)]
pub struct QueryBinder {
    config: BindConfig,
    registry: BinderRegistry,
    time_layouts: Vec<TimeLayout>,
    time_zone: TimeZone,
}

impl QueryBinder {
    /// An engine with the default binders.
    ///
    /// It fails if the configured time zone can't be resolved.
    pub fn new(config: BindConfig) -> Result<Self, InvalidTimeZone> {
        Self::with_registry(config, BinderRegistry::with_defaults())
    }

    /// An engine that resolves binders through `registry`.
    pub fn with_registry(
        config: BindConfig,
        registry: BinderRegistry,
    ) -> Result<Self, InvalidTimeZone> {
        let time_zone = config.resolve_time_zone()?;
        Ok(Self::from_parts(config, registry, time_zone))
    }

    fn from_parts(config: BindConfig, registry: BinderRegistry, time_zone: TimeZone) -> Self {
        Self {
            time_layouts: config.compile_layouts(),
            config,
            registry,
            time_zone,
        }
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn registry(&self) -> &BinderRegistry {
        &self.registry
    }

    pub(crate) fn time_layouts(&self) -> &[TimeLayout] {
        &self.time_layouts
    }

    pub(crate) fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Bind `params` into `destination`, in place.
    ///
    /// Every bindable field is overwritten, with its zero value if nothing could be bound.
    pub fn bind<T: Record>(&self, destination: &mut T, params: &QueryMap) {
        self.bind_dyn(destination, params);
    }

    /// Bind `params` into a freshly allocated `T`.
    pub fn bind_copy<T: Record>(&self, params: &QueryMap) -> T {
        let mut destination = T::default();
        self.bind_dyn(&mut destination, params);
        destination
    }

    /// Same as [`QueryBinder::bind`], but report the parameters that could not be bound.
    ///
    /// `destination` is bound even if an error is returned.
    pub fn bind_strict<T: Record>(
        &self,
        destination: &mut T,
        params: &QueryMap,
    ) -> Result<(), BindError> {
        let failures = self.bind_dyn(destination, params);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BindError::new(failures))
        }
    }

    /// Bind `params` into a record whose concrete type is not known statically.
    ///
    /// Returns the parameters that could not be bound.
    pub fn bind_dyn(
        &self,
        destination: &mut dyn RecordMut,
        params: &QueryMap,
    ) -> Vec<FieldFailure> {
        let span = tracing::debug_span!("bind", record = destination.type_name());
        let _guard = span.enter();

        let mut cx = BindContext::new(self, params);
        let mut visited = VisitedSet::new();
        bind_fields(&mut cx, destination, &mut visited);
        cx.failures
    }

    /// Bind a single raw value into `T`.
    ///
    /// ```rust
    /// use qbind::QueryBinder;
    ///
    /// let engine = QueryBinder::default();
    /// assert_eq!(engine.bind_value::<i32>("-12"), -12);
    /// assert!(engine.bind_value::<bool>("On"));
    /// assert_eq!(engine.bind_value::<u8>("300"), 0);
    /// ```
    pub fn bind_value<T: Bindable + Default>(&self, raw: &str) -> T {
        let mut params = QueryMap::new();
        params.insert("", raw);
        self.bind_key(&params, "")
    }

    /// Bind the parameters found under `key` into `T`.
    pub fn bind_key<T: Bindable + Default>(&self, params: &QueryMap, key: &str) -> T {
        let mut cx = BindContext::new(self, params);
        let ty = T::descriptor();
        let value = cx.bind(key, &ty);
        T::from_value(value).unwrap_or_else(|| {
            cx.fail(key, FailureKind::Inconvertible { type_name: ty.name() });
            T::default()
        })
    }
}

impl Default for QueryBinder {
    /// The default binders and configuration, in the time zone of the host.
    fn default() -> Self {
        Self::from_parts(
            BindConfig::default(),
            BinderRegistry::with_defaults(),
            TimeZone::system(),
        )
    }
}

fn bind_fields(cx: &mut BindContext<'_>, record: &mut dyn RecordMut, visited: &mut VisitedSet) {
    for (index, field) in record.fields().iter().enumerate() {
        let Some(wire_name) = field.wire_name() else {
            continue;
        };
        if field.is_embedded() {
            // Embedded fields live in the namespace of their parent.
            let depth = visited.depth();
            if let Some(inner) = record.embedded(index, visited) {
                bind_fields(cx, inner, visited);
            }
            visited.rewind(depth);
            continue;
        }
        let ty = field.ty();
        let value = cx.bind(wire_name, &ty);
        if !record.assign(index, value) {
            cx.fail(
                wire_name,
                FailureKind::Inconvertible {
                    type_name: ty.name(),
                },
            );
        }
    }
}

/// The state of a single bind call.
///
/// Binders receive it to look up parameters, to recurse into nested values through
/// [`BindContext::bind`], and to record failures.
pub struct BindContext<'a> {
    engine: &'a QueryBinder,
    params: &'a QueryMap,
    failures: Vec<FieldFailure>,
}

impl<'a> BindContext<'a> {
    pub fn new(engine: &'a QueryBinder, params: &'a QueryMap) -> Self {
        Self {
            engine,
            params,
            failures: Vec::new(),
        }
    }

    /// The parameters being bound.
    pub fn params(&self) -> &'a QueryMap {
        self.params
    }

    pub fn config(&self) -> &'a BindConfig {
        &self.engine.config
    }

    pub(crate) fn engine(&self) -> &'a QueryBinder {
        self.engine
    }

    /// Bind `key` into a value of type `ty`, using the binder registered for it.
    ///
    /// If no binder is registered, or if the binder produced a value that doesn't convert
    /// into `ty` (see [`TypeDescriptor::accepts`]), the failure is recorded and
    /// [`Value::Zero`] is returned.
    pub fn bind(&mut self, key: &str, ty: &TypeDescriptor) -> Value {
        let engine = self.engine;
        let Some(binder) = engine.registry.resolve(ty) else {
            self.fail(
                key,
                FailureKind::NoBinder {
                    type_name: ty.name(),
                },
            );
            return Value::Zero;
        };
        let value = binder.bind(self, key, ty);
        if ty.accepts(&value) {
            value
        } else {
            self.fail(
                key,
                FailureKind::Inconvertible {
                    type_name: ty.name(),
                },
            );
            Value::Zero
        }
    }

    /// Record that `key` could not be bound.
    pub fn fail(&mut self, key: &str, kind: FailureKind) {
        tracing::debug!(key, error = %kind, "Query parameter was not bound");
        self.failures.push(FieldFailure {
            key: key.to_owned(),
            kind,
        });
    }

    /// The failures recorded so far.
    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Embedding, FieldDescriptor, Shape};
    use crate::record;

    #[derive(Debug, Default)]
    struct Node {
        label: String,
        next: Option<Box<Node>>,
    }

    impl Record for Node {
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("label", <String as Bindable>::descriptor),
            FieldDescriptor::new("next", <Node as Bindable>::descriptor)
                .embed(Embedding::Pointer),
        ];
    }

    impl Bindable for Node {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Self>(Shape::Record(Self::FIELDS))
        }

        fn from_value(value: Value) -> Option<Self> {
            record::from_record_value(value)
        }
    }

    impl RecordMut for Node {
        fn fields(&self) -> &'static [FieldDescriptor] {
            Self::FIELDS
        }

        fn type_name(&self) -> &'static str {
            "Node"
        }

        fn assign(&mut self, index: usize, value: Value) -> bool {
            match index {
                0 => record::assign(&mut self.label, value),
                1 => record::assign_boxed(&mut self.next, value),
                _ => false,
            }
        }

        fn embedded<'a>(
            &'a mut self,
            index: usize,
            visited: &mut VisitedSet,
        ) -> Option<&'a mut dyn RecordMut> {
            match index {
                1 => record::descend_pointer(&mut self.next, visited),
                _ => None,
            }
        }
    }

    #[test]
    fn self_referential_embedded_pointers_terminate() {
        let engine = QueryBinder::default();
        let params: QueryMap = [("label", "x")].into_iter().collect();
        let node: Node = engine.bind_copy(&params);

        assert_eq!(node.label, "x");
        // The pointer type is allocated once, then never entered again.
        let next = node.next.as_deref().unwrap();
        assert_eq!(next.label, "x");
        assert!(next.next.is_none());
    }

    #[test]
    fn existing_pointer_targets_are_entered_once() {
        let engine = QueryBinder::default();
        let params: QueryMap = [("label", "y")].into_iter().collect();
        let mut node = Node {
            label: String::new(),
            next: Some(Box::new(Node {
                label: String::new(),
                next: Some(Box::default()),
            })),
        };
        engine.bind(&mut node, &params);

        let first = node.next.as_deref().unwrap();
        let second = first.next.as_deref().unwrap();
        assert_eq!(node.label, "y");
        assert_eq!(first.label, "y");
        assert_eq!(second.label, "y");
        let third = second.next.as_deref().unwrap();
        assert_eq!(third.label, "y");
        assert!(third.next.is_none());
    }

    #[derive(Debug, Default)]
    struct Twins {
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    }

    impl Record for Twins {
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("left", <Node as Bindable>::descriptor).embed(Embedding::Pointer),
            FieldDescriptor::new("right", <Node as Bindable>::descriptor)
                .embed(Embedding::Pointer),
        ];
    }

    impl Bindable for Twins {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Self>(Shape::Record(Self::FIELDS))
        }

        fn from_value(value: Value) -> Option<Self> {
            record::from_record_value(value)
        }
    }

    impl RecordMut for Twins {
        fn fields(&self) -> &'static [FieldDescriptor] {
            Self::FIELDS
        }

        fn type_name(&self) -> &'static str {
            "Twins"
        }

        fn assign(&mut self, index: usize, value: Value) -> bool {
            match index {
                0 => record::assign_boxed(&mut self.left, value),
                1 => record::assign_boxed(&mut self.right, value),
                _ => false,
            }
        }

        fn embedded<'a>(
            &'a mut self,
            index: usize,
            visited: &mut VisitedSet,
        ) -> Option<&'a mut dyn RecordMut> {
            match index {
                0 => record::descend_pointer(&mut self.left, visited),
                1 => record::descend_pointer(&mut self.right, visited),
                _ => None,
            }
        }
    }

    #[test]
    fn sibling_embedded_pointers_of_the_same_type_are_both_bound() {
        let engine = QueryBinder::default();
        let params: QueryMap = [("label", "z")].into_iter().collect();
        let twins: Twins = engine.bind_copy(&params);

        for side in [&twins.left, &twins.right] {
            let node = side.as_deref().unwrap();
            assert_eq!(node.label, "z");
            // Each chain still stops at its first self-reference.
            assert!(node.next.is_none());
        }
    }

    #[test]
    fn missing_binders_are_reported() {
        let engine = QueryBinder::with_registry(
            BindConfig::default().with_time_zone("UTC"),
            BinderRegistry::new(),
        )
        .unwrap();
        let params: QueryMap = [("label", "x")].into_iter().collect();
        let mut node = Node::default();
        let failures = engine.bind_dyn(&mut node, &params);

        assert_eq!(node.label, "");
        assert_eq!(failures.len(), 2);
        assert_eq!(
            failures[0].kind,
            FailureKind::NoBinder {
                type_name: "alloc::string::String"
            }
        );
    }

    #[test]
    fn context_accumulates_failures() {
        let engine = QueryBinder::default();
        let params: QueryMap = [("n", "abc")].into_iter().collect();
        let mut cx = BindContext::new(&engine, &params);
        assert!(cx.bind("n", &u8::descriptor()).is_zero());
        assert_eq!(cx.failures().len(), 1);
        assert_eq!(cx.failures()[0].key, "n");
    }
}
