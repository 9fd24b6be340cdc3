//! Storage values crossing the erasure boundary.

use std::fmt;

use crate::ObjectHandle;

/// A storage value held in a parameter or return slot.
///
/// Every [`TypeAdapter`](crate::TypeAdapter) maps its real type onto one of
/// these variants. Scalars and strings store themselves; objects store a
/// generational handle into an [`ObjectHeap`](crate::ObjectHeap).
#[derive(Clone, PartialEq, Default)]
pub enum Dynamic {
    /// Void/empty
    #[default]
    Void,
    /// Integer value (all integer widths, enums and flag sets stored as i64)
    Int(i64),
    /// Floating point value (f32, f64 both stored as f64)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value (owned)
    String(String),
    /// Handle to a heap-allocated object
    Object(ObjectHandle),
    /// Null handle
    NullHandle,
}

impl Dynamic {
    /// Get a human-readable name for this slot's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Void => "void",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::Bool(_) => "bool",
            Dynamic::String(_) => "string",
            Dynamic::Object(_) => "object",
            Dynamic::NullHandle => "null",
        }
    }

    /// Check if this slot is void.
    pub fn is_void(&self) -> bool {
        matches!(self, Dynamic::Void)
    }

    /// Check if this slot is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::NullHandle)
    }

    /// The object handle held by this slot, if any.
    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Dynamic::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Void => write!(f, "Void"),
            Dynamic::Int(v) => write!(f, "Int({})", v),
            Dynamic::Float(v) => write!(f, "Float({})", v),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Object(h) => write!(f, "Object({:?})", h),
            Dynamic::NullHandle => write!(f, "NullHandle"),
        }
    }
}
