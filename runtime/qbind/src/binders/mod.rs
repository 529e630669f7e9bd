//! The built-in binders.
//!
//! [`BinderRegistry::with_defaults`](crate::BinderRegistry::with_defaults) installs all of them.
pub mod leaf;
mod pointer;
mod record;
mod sequence;
mod time;

pub use leaf::ValueBinder;
pub use pointer::PointerBinder;
pub use record::StructBinder;
pub use sequence::SequenceBinder;
pub use time::TimestampBinder;
pub(crate) use time::TimeLayout;
