use crate::descriptor::TypeDescriptor;
use crate::driver::BindContext;
use crate::registry::Binder;
use crate::value::Value;

/// Binds `Option<T>`.
///
/// An absent key yields `None`. Otherwise `T` is bound from the same key and wrapped
/// into `Some`, even if binding `T` produced its zero value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerBinder;

impl Binder for PointerBinder {
    fn bind(&self, cx: &mut BindContext<'_>, key: &str, ty: &TypeDescriptor) -> Value {
        let Some(pointee) = ty.element() else {
            return Value::Zero;
        };
        if !cx.params().contains_key(key) {
            return Value::Optional(None);
        }
        let value = cx.bind(key, &pointee);
        Value::Optional(Some(Box::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{QueryBinder, QueryMap};

    #[test]
    fn absent_keys_are_none() {
        let engine = QueryBinder::default();
        let params = QueryMap::new();
        assert_eq!(engine.bind_key::<Option<u32>>(&params, "n"), None);
    }

    #[test]
    fn present_keys_are_some_even_when_malformed() {
        let engine = QueryBinder::default();
        let params: QueryMap = [("n", "7"), ("m", "x")].into_iter().collect();
        assert_eq!(engine.bind_key::<Option<u32>>(&params, "n"), Some(7));
        assert_eq!(engine.bind_key::<Option<u32>>(&params, "m"), Some(0));
    }

    #[test]
    fn pointers_nest() {
        let engine = QueryBinder::default();
        let params: QueryMap = [("n", "on")].into_iter().collect();
        assert_eq!(
            engine.bind_key::<Option<Option<bool>>>(&params, "n"),
            Some(Some(true))
        );
    }
}
