//! Generic operations dispatching through the type record.

use crate::error::RuntimeError;
use crate::object::ObjRef;

/// Convert a value to a `bool` object via its type's `as_bool` slot.
pub fn as_bool(obj: ObjRef) -> Result<ObjRef, RuntimeError> {
    let info = obj.type_info();
    let f = info
        .as_bool
        .ok_or(RuntimeError::NotConvertibleToBool(info.name))?;
    let result = f(obj);
    debug_assert!(result.is_bool(), "as_bool slot returned a non-bool");
    Ok(result)
}

/// Convert a value to a host boolean.
pub fn truthy(obj: ObjRef) -> Result<bool, RuntimeError> {
    Ok(as_bool(obj)?.bool_value())
}

/// Subscript read via the type's `get_element` slot.
pub fn get_element(obj: ObjRef, index: ObjRef) -> Result<ObjRef, RuntimeError> {
    let info = obj.type_info();
    let f = info
        .get_element
        .ok_or(RuntimeError::NotSubscriptable(info.name))?;
    f(obj, index)
}

/// Subscript write via the type's `set_element` slot.
pub fn set_element(obj: ObjRef, index: ObjRef, value: ObjRef) -> Result<(), RuntimeError> {
    let info = obj.type_info();
    let f = info
        .set_element
        .ok_or(RuntimeError::NoItemAssignment(info.name))?;
    f(obj, index, value)
}

/// Validate an index against a sequence length.
///
/// The index must be an `int` in `[-len, len)`; a negative value wraps once
/// by adding `len`. Returns the wrapped index in `[0, len)`.
pub fn check_index(index: ObjRef, len: i64) -> Result<i64, RuntimeError> {
    debug_assert!(len >= 0);
    if !index.is_int() {
        return Err(RuntimeError::BadIndexType(index.type_name()));
    }
    let mut i = index.int_value();
    if i < 0 {
        i += len;
    }
    if i < 0 || i >= len {
        return Err(RuntimeError::IndexOutOfRange);
    }
    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{boolean, int, list, str as strobj};

    #[test]
    fn test_as_bool_dispatch() {
        assert!(truthy(int::create(3)).unwrap());
        assert!(!truthy(int::create(0)).unwrap());
        assert!(truthy(boolean::wrap(true)).unwrap());
        assert!(!truthy(strobj::create("")).unwrap());
        let l = list::create(1);
        assert!(!truthy(l).unwrap());
    }

    #[test]
    fn test_get_element_not_subscriptable() {
        assert_eq!(
            get_element(int::create(5), int::create(0)),
            Err(RuntimeError::NotSubscriptable("int"))
        );
    }

    #[test]
    fn test_set_element_unsupported() {
        let s = strobj::create("abc");
        let _guard = s.rooted();
        assert_eq!(
            set_element(s, int::create(0), int::create(1)),
            Err(RuntimeError::NoItemAssignment("str"))
        );
        assert_eq!(
            set_element(int::create(1), int::create(0), int::create(1)),
            Err(RuntimeError::NoItemAssignment("int"))
        );
    }

    #[test]
    fn test_check_index_wrapping() {
        assert_eq!(check_index(int::create(0), 3).unwrap(), 0);
        assert_eq!(check_index(int::create(2), 3).unwrap(), 2);
        assert_eq!(check_index(int::create(-1), 3).unwrap(), 2);
        assert_eq!(check_index(int::create(-3), 3).unwrap(), 0);
    }

    #[test]
    fn test_check_index_bounds() {
        assert_eq!(check_index(int::create(3), 3), Err(RuntimeError::IndexOutOfRange));
        assert_eq!(check_index(int::create(-4), 3), Err(RuntimeError::IndexOutOfRange));
        assert_eq!(check_index(int::create(0), 0), Err(RuntimeError::IndexOutOfRange));
    }

    #[test]
    fn test_check_index_type() {
        let s = strobj::create("x");
        assert_eq!(check_index(s, 3), Err(RuntimeError::BadIndexType("str")));
    }
}
