//! # qbind
//!
//! Bind flat query parameters (`user.name=Ada&tags.0=a&tags.1=b`) into strongly-typed,
//! possibly nested records.
//!
//! - Leaf values (integers, floats, booleans, strings, [`jiff::Timestamp`]s) are parsed from
//!   the first value registered under their key.
//! - Nested records are addressed with dots: `outer.inner`.
//! - Sequences are addressed by index: `seq.0`, `seq.1` for scalars, `seq.0.field` for records.
//! - Embedded records (`#[bind(flatten)]`) expose their fields in the namespace of their parent.
//!
//! Binding is best-effort: a value that can't be bound leaves its field at the zero value.
//! Use [`QueryBinder::bind_strict`] to find out which parameters were dropped, and why.
//!
//! ```rust
//! use qbind::{Bind, QueryBinder, QueryMap};
//!
//! #[derive(Bind, Default, Debug)]
//! struct Item {
//!     name: String,
//!     qty: u32,
//! }
//!
//! #[derive(Bind, Default, Debug)]
//! #[bind(rename_all = "camelCase")]
//! struct Order {
//!     order_id: u64,
//!     express: bool,
//!     items: Vec<Item>,
//! }
//!
//! let params = QueryMap::parse("orderId=9&express=on&items.1.name=pear&items.0.name=fig&items.0.qty=2");
//! let order: Order = QueryBinder::default().bind_copy(&params);
//! assert_eq!(order.order_id, 9);
//! assert!(order.express);
//! assert_eq!(order.items.len(), 2);
//! assert_eq!(order.items[0].qty, 2);
//! assert_eq!(order.items[1].name, "pear");
//! ```
extern crate self as qbind;

mod bindable;
pub mod binders;
mod config;
mod descriptor;
mod driver;
pub mod errors;
pub mod key;
mod params;
pub mod record;
mod registry;
mod value;

pub use bindable::Bindable;
pub use config::BindConfig;
pub use descriptor::{Embedding, FieldDescriptor, Kind, Shape, TypeDescriptor};
pub use driver::{BindContext, QueryBinder};
pub use params::QueryMap;
pub use record::{Record, RecordMut, VisitedSet};
pub use registry::{Binder, BinderRegistry};
pub use value::{RecordValue, Value};

/// Derive [`Bindable`], [`Record`] and [`RecordMut`] for a struct with named fields.
///
/// # Attributes
///
/// On fields:
///
/// - `#[bind(rename = "wire")]`: look the field up as `wire` rather than by its name.
///   `#[bind(rename = "-")]` excludes the field, like `#[bind(skip)]`.
/// - `#[bind(skip)]`: never bind the field. It keeps its value.
/// - `#[bind(flatten)]`: the field is an embedded record. Its own fields are addressed
///   without prefix. `Option<Box<T>>` fields are allocated when needed.
///
/// On the struct:
///
/// - `#[bind(rename_all = "...")]`: the naming convention for fields without an
///   explicit rename. One of `snake_case`, `camelCase`, `PascalCase`, `kebab-case`,
///   `SCREAMING_SNAKE_CASE` and `lowercase`.
///
/// # Aliases
///
/// Deriving `Bind` for a tuple struct with a single field makes it an alias of the
/// field's type: it is bound the same way, but a binder can be registered for it.
///
/// ```rust
/// use qbind::Bind;
///
/// #[derive(Bind, Default, Debug, PartialEq)]
/// struct Email(String);
/// ```
pub use qbind_macros::Bind;
