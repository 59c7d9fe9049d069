use std::rc::Rc;
use std::sync::Arc;

use crate::element::Props;
use crate::value::Value;

/// Strict identity comparison without coercion.
///
/// Scalars compare by value, floats treat `NaN` as equal to itself and keep
/// `0.0` and `-0.0` apart, shared pointers compare by allocation. State
/// setters only schedule a render when the new value is not the same value.
pub trait SameValue {
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! same_value_by_eq {
    ($($ty:ty),*) => {
        $(
            impl SameValue for $ty {
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_value_by_eq!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    String,
    &'static str,
    crate::element::Key
);

impl SameValue for f64 {
    fn same_value(&self, other: &Self) -> bool {
        if self.is_nan() && other.is_nan() {
            return true;
        }
        self.to_bits() == other.to_bits()
    }
}

impl SameValue for f32 {
    fn same_value(&self, other: &Self) -> bool {
        if self.is_nan() && other.is_nan() {
            return true;
        }
        self.to_bits() == other.to_bits()
    }
}

impl<T: ?Sized> SameValue for Rc<T> {
    fn same_value(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> SameValue for Arc<T> {
    fn same_value(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl SameValue for Value {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.same_value(b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Handler(a), Value::Handler(b)) => a.ptr_eq(b),
            (Value::Opaque(a), Value::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// One level deep: lists element-wise and maps entry-wise by
/// [`SameValue`].
pub fn shallow_equals(a: &Value, b: &Value) -> bool {
    if a.same_value(b) {
        return true;
    }
    match (a, b) {
        (Value::List(a), Value::List(b)) => deps_equal(a, b),
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| value.same_value(other)))
        }
        _ => false,
    }
}

pub fn deep_equals(a: &Value, b: &Value) -> bool {
    if a.same_value(b) {
        return true;
    }
    match (a, b) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| deep_equals(a, b))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| deep_equals(value, other)))
        }
        _ => false,
    }
}

/// Element-wise comparison of two dependency lists.
pub fn deps_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.same_value(b))
}

/// Shallow prop comparison used by [`crate::memo`]: same names with the same
/// values, and children that are the very same descriptors.
pub fn props_shallow_equal(a: &Props, b: &Props) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(name, value)| b.get(name).is_some_and(|other| value.same_value(other)))
        && a.children().len() == b.children().len()
        && a
            .children()
            .iter()
            .zip(b.children())
            .all(|(a, b)| a.same_node(b))
}
