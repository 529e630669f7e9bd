//! Errors that can happen when binding query parameters or loading the binder configuration.
//!
//! Binding itself never fails: a value that can't be bound leaves its field at the zero
//! value. The reasons are collected anyway, and [`QueryBinder::bind_strict`] surfaces them
//! as a [`BindError`].
//!
//! [`QueryBinder::bind_strict`]: crate::QueryBinder::bind_strict
use crate::descriptor::TypeDescriptor;

/// Why a query parameter was not bound into its target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FailureKind {
    /// The value could not be parsed as the expected type.
    ///
    /// ```rust
    /// use qbind::Bindable;
    /// use qbind::errors::FailureKind;
    ///
    /// let kind = FailureKind::malformed("abc", &u32::descriptor());
    /// assert_eq!(kind.to_string(), "`abc` is not a valid `u32`");
    /// ```
    #[error("`{value}` is not a valid `{expected}`")]
    Malformed {
        value: String,
        expected: &'static str,
    },
    /// A sequence key used a segment that is not a non-negative base-10 integer.
    #[error("`{segment}` is not a valid sequence index")]
    InvalidIndex { segment: String },
    /// A sequence key used an index beyond the configured maximum length.
    #[error("Sequence index {index} is out of range, the maximum length is {max}")]
    IndexOutOfRange { index: usize, max: usize },
    /// A nested key named a field that doesn't exist or can't be bound.
    #[error("There is no bindable field named `{segment}`")]
    UnknownField { segment: String },
    /// No binder is registered for the target type, nor for its structural kind.
    #[error("There is no binder registered for `{type_name}`")]
    NoBinder { type_name: &'static str },
    /// The bound value could not be converted into the type of the field.
    #[error("The bound value can't be converted into `{type_name}`")]
    Inconvertible { type_name: &'static str },
}

impl FailureKind {
    /// `raw` could not be parsed as a value of type `ty`.
    pub fn malformed(raw: &str, ty: &TypeDescriptor) -> Self {
        FailureKind::Malformed {
            value: raw.to_owned(),
            expected: ty.name(),
        }
    }
}

/// A query parameter that was not bound, and why.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to bind `{key}`: {kind}")]
pub struct FieldFailure {
    /// The key, as it appears in the query string.
    pub key: String,
    pub kind: FailureKind,
}

/// The error returned by [`QueryBinder::bind_strict`] when at least one field failed to bind.
///
/// The destination has been bound nonetheless: every failed field holds its zero value.
///
/// [`QueryBinder::bind_strict`]: crate::QueryBinder::bind_strict
#[derive(Debug, thiserror::Error)]
#[error("Failed to bind {} query parameter(s)", .failures.len())]
pub struct BindError {
    failures: Vec<FieldFailure>,
}

impl BindError {
    pub(crate) fn new(failures: Vec<FieldFailure>) -> Self {
        Self { failures }
    }

    /// The failures, in the order they occurred.
    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<FieldFailure> {
        self.failures
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to load the binder configuration")]
/// The error returned by [`BindConfig::load`](crate::BindConfig::load).
pub struct ConfigLoadError(#[source] pub(crate) anyhow::Error);

#[derive(Debug, thiserror::Error)]
#[error("`{name}` is not a known time zone")]
/// The error returned by [`QueryBinder::new`](crate::QueryBinder::new) when the configured
/// time zone can't be resolved.
pub struct InvalidTimeZone {
    pub name: String,
    #[source]
    pub(crate) source: Option<jiff::Error>,
}
