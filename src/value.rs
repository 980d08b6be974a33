//! The value cell held by every node of a tree.

/// The output of a single node.
///
/// Every kind of value a registered type may carry is a variant here. Values are small and
/// `Copy`, so passing children's values to their parent is a plain copy.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The node has not produced or been initialised with a value yet.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
}

impl Value {
    /// Whether the cell is still unset.
    pub fn is_empty(&self) -> bool {
        matches!(*self, Value::Empty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::UInt(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    /// The value as a double. `Float`s are widened, no other kind converts.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(d) => Some(d),
            Value::Float(f) => Some(f64::from(f)),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn accessors_do_not_reinterpret() {
        let v = Value::from(3.0f64);
        assert_eq!(v.as_f64(), Some(3.0));
        assert_eq!(v.as_i64(), None);
        assert_eq!(Value::from(true).as_f64(), None);
        assert_eq!(Value::UInt(4).as_u64(), Some(4));
    }

    #[test]
    fn floats_widen() {
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
    }

    #[test]
    fn default_is_empty() {
        assert!(Value::default().is_empty());
        assert!(!Value::Int(0).is_empty());
    }
}
