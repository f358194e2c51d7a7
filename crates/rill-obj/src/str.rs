//! The `str` type: immutable strings.
//!
//! Strings are byte sequences; the language assumes ASCII source, so byte
//! indexing and codepoint indexing coincide.

use crate::boolean;
use crate::error::RuntimeError;
use crate::object::{ObjKind, ObjRef};
use crate::ops;

/// Create a `str` object with the given contents. May trigger garbage
/// collection; if `data` borrows from a GC-managed object, the caller must
/// keep that object rooted.
pub fn create(data: &str) -> ObjRef {
    ObjRef::alloc(ObjKind::Str(data.into()))
}

/// Number of bytes in the string.
pub fn length(this: ObjRef) -> usize {
    this.str_value().len()
}

/// Concatenate two strings into a new one.
///
/// May trigger garbage collection; both operands must be rooted by the
/// caller.
pub fn concat(left: ObjRef, right: ObjRef) -> ObjRef {
    let mut data = String::with_capacity(length(left) + length(right));
    data.push_str(left.str_value());
    data.push_str(right.str_value());
    create(&data)
}

/// `as_bool` for `str`: non-empty is true.
pub(crate) fn as_bool(this: ObjRef) -> ObjRef {
    boolean::wrap(length(this) > 0)
}

/// `get_element` for `str`: a one-byte string.
pub(crate) fn get_element(this: ObjRef, index: ObjRef) -> Result<ObjRef, RuntimeError> {
    let i = ops::check_index(index, length(this) as i64)? as usize;
    let byte = this.str_value().as_bytes()[i];
    Ok(create(&String::from_utf8_lossy(&[byte])))
}
