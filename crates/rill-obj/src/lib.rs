//! rill-obj - the runtime object system.
//!
//! Every guest value is an [`Object`] on the garbage-collected heap,
//! reached through copyable [`ObjRef`] handles. The guest-visible types are
//! `int`, `bool`, `str`, `list` and `type`; the runtime adds internal
//! objects for list backing storage and for the variable environment.
//!
//! Each type is described by a [`TypeInfo`] record holding its name and
//! optional operation slots (`as_bool`, `get_element`, `set_element`).
//! Generic operations in [`ops`] dispatch through the record and raise a
//! [`RuntimeError`] naming the type when a slot is absent. Type records are
//! themselves reachable as `type` objects, and the `type` of a type object
//! is the `type` object itself.
//!
//! Identity: handles compare by pointer. The interned values (small
//! integers in `[-1, 255]`, the two booleans, the type objects) are pinned
//! singletons, so pointer identity holds for them across the whole run.

pub mod array;
pub mod boolean;
pub mod env;
pub mod error;
pub mod int;
pub mod list;
pub mod object;
pub mod ops;
pub mod str;
pub mod types;

pub use error::RuntimeError;
pub use object::{ObjKind, ObjRef, Object};
pub use types::TypeInfo;
