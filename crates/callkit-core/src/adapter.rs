//! Per-type conversion policy for the erasure boundary.
//!
//! [`TypeAdapter`] tells the invocation layer how a real Rust type crosses into
//! a [`Dynamic`] storage slot and back, what its default value is, and how it
//! reads and writes text.
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`
//! - Floats: `f32`, `f64`
//! - `bool`, `char`, `String`
//! - Unit: `()` (void)
//! - Object handles: [`ObjectHandle`] and the nullable `Option<ObjectHandle>`
//! - User enumerations via [`enum_adapter!`](crate::enum_adapter)
//! - Flag sets via [`flags_adapter!`](crate::flags_adapter)
//!
//! Borrowed types have no adapter. A callable taking a reference is rejected at
//! compile time:
//!
//! ```compile_fail
//! use callkit_core::TypeAdapter;
//!
//! fn requires_adapter<T: TypeAdapter>() {}
//! requires_adapter::<&'static str>();
//! ```

use crate::error::ConversionError;
use crate::{Dynamic, ObjectHandle, TypeHash};

/// Conversion policy for one real type.
///
/// `from_storage(&v.into_storage())` yields `v` again for every value type.
/// Handles only keep identity.
pub trait TypeAdapter: Sized + 'static {
    /// True only for `()`. Void callables have no return slot.
    const IS_VOID: bool = false;

    /// Script-facing type name, also the input of [`TypeAdapter::type_hash`].
    fn type_name() -> &'static str;

    /// Type identity used in signatures and slot introspection.
    fn type_hash() -> TypeHash {
        TypeHash::from_name(Self::type_name())
    }

    /// Value used whenever no better value is available.
    fn default_value() -> Self;

    /// Convert into a storage slot value.
    fn into_storage(self) -> Dynamic;

    /// Convert back from a storage slot value.
    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError>;

    /// Human-readable serialization.
    fn to_text(&self) -> String;

    /// Parse from text.
    fn from_text(text: &str) -> Result<Self, ConversionError>;
}

/// Read a storage slot, falling back to the default value.
pub fn storage_or_default<T: TypeAdapter>(slot: &Dynamic) -> T {
    T::from_storage(slot).unwrap_or_else(|err| {
        log::trace!("[TypeAdapter] {}: {err}, using default", T::type_name());
        T::default_value()
    })
}

/// Parse text, falling back to the default value.
pub fn parse_or_default<T: TypeAdapter>(text: &str) -> T {
    T::from_text(text).unwrap_or_else(|err| {
        log::trace!("[TypeAdapter] {}: {err}, using default", T::type_name());
        T::default_value()
    })
}

fn mismatch(expected: &'static str, slot: &Dynamic) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: slot.type_name(),
    }
}

// ============================================================================
// Unit (void)
// ============================================================================

impl TypeAdapter for () {
    const IS_VOID: bool = true;

    fn type_name() -> &'static str {
        "void"
    }

    fn default_value() -> Self {}

    fn into_storage(self) -> Dynamic {
        Dynamic::Void
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Void => Ok(()),
            _ => Err(mismatch("void", slot)),
        }
    }

    fn to_text(&self) -> String {
        String::new()
    }

    fn from_text(_text: &str) -> Result<Self, ConversionError> {
        Ok(())
    }
}

// ============================================================================
// Integers
// ============================================================================

macro_rules! impl_int_adapter {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl TypeAdapter for $ty {
                fn type_name() -> &'static str {
                    $name
                }

                fn default_value() -> Self {
                    0
                }

                fn into_storage(self) -> Dynamic {
                    Dynamic::Int(self as i64)
                }

                fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
                    match slot {
                        Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: $name,
                            }
                        }),
                        _ => Err(mismatch($name, slot)),
                    }
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }

                fn from_text(text: &str) -> Result<Self, ConversionError> {
                    text.trim()
                        .parse::<$ty>()
                        .map_err(|_| ConversionError::parse(text, $name))
                }
            }
        )*
    };
}

impl_int_adapter!(
    i8 => "int8",
    i16 => "int16",
    i32 => "int",
    i64 => "int64",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint",
);

// u64 reinterprets the i64 bits so the full range survives storage
impl TypeAdapter for u64 {
    fn type_name() -> &'static str {
        "uint64"
    }

    fn default_value() -> Self {
        0
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::Int(self as i64)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Int(v) => Ok(*v as u64),
            _ => Err(mismatch("uint64", slot)),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        text.trim()
            .parse::<u64>()
            .map_err(|_| ConversionError::parse(text, "uint64"))
    }
}

// ============================================================================
// Floats
// ============================================================================

impl TypeAdapter for f32 {
    fn type_name() -> &'static str {
        "float"
    }

    fn default_value() -> Self {
        0.0
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::Float(self as f64)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            // Infinities and NaN are preserved
            Dynamic::Float(v) if !v.is_finite() => Ok(*v as f32),
            Dynamic::Float(v) if *v <= f32::MAX as f64 && *v >= f32::MIN as f64 => Ok(*v as f32),
            Dynamic::Float(v) => Err(ConversionError::FloatConversion {
                value: *v,
                target_type: "float",
            }),
            Dynamic::Int(v) => Ok(*v as f32),
            _ => Err(mismatch("float", slot)),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        text.trim()
            .parse::<f32>()
            .map_err(|_| ConversionError::parse(text, "float"))
    }
}

impl TypeAdapter for f64 {
    fn type_name() -> &'static str {
        "double"
    }

    fn default_value() -> Self {
        0.0
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::Float(self)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Float(v) => Ok(*v),
            Dynamic::Int(v) => Ok(*v as f64),
            _ => Err(mismatch("double", slot)),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        text.trim()
            .parse::<f64>()
            .map_err(|_| ConversionError::parse(text, "double"))
    }
}

// ============================================================================
// Bool, char, String
// ============================================================================

impl TypeAdapter for bool {
    fn type_name() -> &'static str {
        "bool"
    }

    fn default_value() -> Self {
        false
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::Bool(self)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Bool(v) => Ok(*v),
            _ => Err(mismatch("bool", slot)),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
            Ok(false)
        } else {
            Err(ConversionError::parse(text, "bool"))
        }
    }
}

impl TypeAdapter for char {
    fn type_name() -> &'static str {
        "char"
    }

    fn default_value() -> Self {
        '\0'
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::Int(self as i64)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Int(v) => u32::try_from(*v)
                .ok()
                .and_then(char::from_u32)
                .ok_or(ConversionError::IntegerOverflow {
                    value: *v,
                    target_type: "char",
                }),
            _ => Err(mismatch("char", slot)),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::parse(text, "char")),
        }
    }
}

impl TypeAdapter for String {
    fn type_name() -> &'static str {
        "string"
    }

    fn default_value() -> Self {
        String::new()
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::String(self)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", slot)),
        }
    }

    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        Ok(text.to_string())
    }
}

// ============================================================================
// Object handles
// ============================================================================

fn handle_text(handle: &ObjectHandle) -> String {
    format!("object#{}:{}", handle.index, handle.generation)
}

/// Non-nullable object handle.
///
/// The default is [`ObjectHandle::dangling`], which resolves on no heap.
impl TypeAdapter for ObjectHandle {
    fn type_name() -> &'static str {
        "object"
    }

    fn default_value() -> Self {
        ObjectHandle::dangling()
    }

    fn into_storage(self) -> Dynamic {
        Dynamic::Object(self)
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Object(handle) => Ok(*handle),
            Dynamic::NullHandle => Err(ConversionError::NullHandle {
                target_type: "object",
            }),
            _ => Err(mismatch("object", slot)),
        }
    }

    fn to_text(&self) -> String {
        handle_text(self)
    }

    fn from_text(_text: &str) -> Result<Self, ConversionError> {
        Err(ConversionError::Unsupported {
            target_type: "object",
            operation: "parsing",
        })
    }
}

/// Nullable object handle; the pointer-like channel for objects.
impl TypeAdapter for Option<ObjectHandle> {
    fn type_name() -> &'static str {
        "object@"
    }

    fn default_value() -> Self {
        None
    }

    fn into_storage(self) -> Dynamic {
        match self {
            Some(handle) => Dynamic::Object(handle),
            None => Dynamic::NullHandle,
        }
    }

    fn from_storage(slot: &Dynamic) -> Result<Self, ConversionError> {
        match slot {
            Dynamic::Object(handle) => Ok(Some(*handle)),
            Dynamic::NullHandle => Ok(None),
            _ => Err(mismatch("object@", slot)),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Some(handle) => handle_text(handle),
            None => "null".to_string(),
        }
    }

    fn from_text(text: &str) -> Result<Self, ConversionError> {
        if text.trim() == "null" {
            Ok(None)
        } else {
            Err(ConversionError::Unsupported {
                target_type: "object@",
                operation: "parsing",
            })
        }
    }
}

// ============================================================================
// Enumerations and flag sets
// ============================================================================

/// Implement [`TypeAdapter`] for a fieldless enum.
///
/// The enum must derive `num_enum::IntoPrimitive` and
/// `num_enum::TryFromPrimitive`, and implement `Default` and `Copy`. Values are
/// stored and printed as their integer representation; unknown discriminants
/// fail to convert. Implement `Default` by hand: `num_enum` treats a
/// `#[default]` variant as a catch-all.
///
/// `$name` becomes part of every signature the type appears in and must be
/// unique across adapted types. Signatures only compare names, so two enums
/// sharing a name are indistinguishable to a registry.
///
/// ```
/// use callkit_core::{enum_adapter, TypeAdapter};
/// use num_enum::{IntoPrimitive, TryFromPrimitive};
///
/// #[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
/// #[repr(u8)]
/// enum Weather {
///     Clear = 0,
///     Rain = 1,
/// }
///
/// impl Default for Weather {
///     fn default() -> Self {
///         Weather::Clear
///     }
/// }
///
/// enum_adapter!(Weather: u8, "Weather");
///
/// assert_eq!(Weather::from_text("1"), Ok(Weather::Rain));
/// assert_eq!(Weather::Rain.to_text(), "1");
/// ```
#[macro_export]
macro_rules! enum_adapter {
    ($ty:ty : $repr:ty, $name:expr) => {
        impl $crate::TypeAdapter for $ty {
            fn type_name() -> &'static str {
                $name
            }

            fn default_value() -> Self {
                <$ty as ::core::default::Default>::default()
            }

            fn into_storage(self) -> $crate::Dynamic {
                let raw: $repr = ::core::convert::From::from(self);
                $crate::Dynamic::Int(raw as i64)
            }

            fn from_storage(
                slot: &$crate::Dynamic,
            ) -> ::core::result::Result<Self, $crate::ConversionError> {
                match slot {
                    $crate::Dynamic::Int(v) => {
                        let overflow = || $crate::ConversionError::IntegerOverflow {
                            value: *v,
                            target_type: $name,
                        };
                        let raw = <$repr as ::core::convert::TryFrom<i64>>::try_from(*v)
                            .map_err(|_| overflow())?;
                        <$ty as $crate::__private::num_enum::TryFromPrimitive>::try_from_primitive(raw)
                            .map_err(|_| overflow())
                    }
                    _ => Err($crate::ConversionError::TypeMismatch {
                        expected: $name,
                        actual: slot.type_name(),
                    }),
                }
            }

            fn to_text(&self) -> ::std::string::String {
                let raw: $repr = ::core::convert::From::from(*self);
                raw.to_string()
            }

            fn from_text(text: &str) -> ::core::result::Result<Self, $crate::ConversionError> {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| $crate::ConversionError::parse(text, $name))?;
                Self::from_storage(&$crate::Dynamic::Int(value))
            }
        }
    };
}

/// Implement [`TypeAdapter`] for a `bitflags` flag set.
///
/// The default is the empty set. Bits are stored and printed as an integer;
/// unknown bits are retained. As with [`enum_adapter!`], `$name` must be
/// unique across adapted types.
///
/// ```
/// use callkit_core::{flags_adapter, TypeAdapter};
///
/// bitflags::bitflags! {
///     #[derive(Debug, Clone, Copy, PartialEq)]
///     struct Layers: u32 {
///         const WORLD = 1;
///         const UI = 2;
///     }
/// }
///
/// flags_adapter!(Layers: u32, "Layers");
///
/// assert_eq!(Layers::from_text("3"), Ok(Layers::WORLD | Layers::UI));
/// assert_eq!(Layers::default_value(), Layers::empty());
/// ```
#[macro_export]
macro_rules! flags_adapter {
    ($ty:ty : $repr:ty, $name:expr) => {
        impl $crate::TypeAdapter for $ty {
            fn type_name() -> &'static str {
                $name
            }

            fn default_value() -> Self {
                <$ty>::empty()
            }

            fn into_storage(self) -> $crate::Dynamic {
                $crate::Dynamic::Int(self.bits() as i64)
            }

            fn from_storage(
                slot: &$crate::Dynamic,
            ) -> ::core::result::Result<Self, $crate::ConversionError> {
                match slot {
                    $crate::Dynamic::Int(v) => <$repr as ::core::convert::TryFrom<i64>>::try_from(*v)
                        .map(<$ty>::from_bits_retain)
                        .map_err(|_| $crate::ConversionError::IntegerOverflow {
                            value: *v,
                            target_type: $name,
                        }),
                    _ => Err($crate::ConversionError::TypeMismatch {
                        expected: $name,
                        actual: slot.type_name(),
                    }),
                }
            }

            fn to_text(&self) -> ::std::string::String {
                self.bits().to_string()
            }

            fn from_text(text: &str) -> ::core::result::Result<Self, $crate::ConversionError> {
                text.trim()
                    .parse::<$repr>()
                    .map(<$ty>::from_bits_retain)
                    .map_err(|_| $crate::ConversionError::parse(text, $name))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_enum::{IntoPrimitive, TryFromPrimitive};

    fn round_trip<T: TypeAdapter + PartialEq + std::fmt::Debug + Clone>(value: T) {
        assert_eq!(T::from_storage(&value.clone().into_storage()), Ok(value));
    }

    #[test]
    fn value_types_round_trip_through_storage() {
        round_trip(-5_i8);
        round_trip(i16::MIN);
        round_trip(42_i32);
        round_trip(i64::MAX);
        round_trip(u8::MAX);
        round_trip(65_535_u16);
        round_trip(u32::MAX);
        round_trip(u64::MAX);
        round_trip(1.5_f32);
        round_trip(-2.25_f64);
        round_trip(true);
        round_trip('λ');
        round_trip(String::from("hello"));
        round_trip(());
    }

    #[test]
    fn integer_overflow_detected() {
        let err = u8::from_storage(&Dynamic::Int(256)).unwrap_err();
        assert!(matches!(err, ConversionError::IntegerOverflow { value: 256, .. }));
        assert!(i8::from_storage(&Dynamic::Int(-129)).is_err());
        assert!(u32::from_storage(&Dynamic::Int(-1)).is_err());
    }

    #[test]
    fn storage_type_mismatch() {
        let err = i32::from_storage(&Dynamic::String("1".into())).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "int",
                actual: "string"
            }
        );
        assert!(bool::from_storage(&Dynamic::Int(1)).is_err());
    }

    #[test]
    fn floats_accept_integer_storage() {
        assert_eq!(f32::from_storage(&Dynamic::Int(3)), Ok(3.0));
        assert_eq!(f64::from_storage(&Dynamic::Int(-4)), Ok(-4.0));
        assert!(f32::from_storage(&Dynamic::Float(f64::MAX)).is_err());
        assert!(f32::from_storage(&Dynamic::Float(f64::INFINITY)).is_ok());
    }

    #[test]
    fn defaults() {
        assert_eq!(i32::default_value(), 0);
        assert_eq!(f64::default_value(), 0.0);
        assert!(!bool::default_value());
        assert_eq!(String::default_value(), "");
        assert_eq!(<Option<ObjectHandle>>::default_value(), None);
        assert!(ObjectHandle::default_value().is_dangling());
    }

    #[test]
    fn text_parsing() {
        assert_eq!(i32::from_text(" 17 "), Ok(17));
        assert_eq!(f32::from_text("2.5"), Ok(2.5));
        assert_eq!(bool::from_text("TRUE"), Ok(true));
        assert_eq!(bool::from_text("0"), Ok(false));
        assert_eq!(char::from_text("x"), Ok('x'));
        assert_eq!(String::from_text(" keep spaces "), Ok(" keep spaces ".to_string()));
    }

    #[test]
    fn malformed_text_resolves_to_default() {
        assert!(i32::from_text("twelve").is_err());
        assert_eq!(parse_or_default::<i32>("twelve"), 0);
        assert!(!parse_or_default::<bool>("maybe"));
        assert_eq!(parse_or_default::<char>("ab"), '\0');
        assert_eq!(parse_or_default::<u8>("300"), 0);
    }

    #[test]
    fn storage_or_default_on_mismatch() {
        assert_eq!(storage_or_default::<i32>(&Dynamic::Bool(true)), 0);
        assert_eq!(storage_or_default::<i32>(&Dynamic::Int(9)), 9);
    }

    #[test]
    fn text_round_trip() {
        assert_eq!(i64::from_text(&(-99_i64).to_text()), Ok(-99));
        assert_eq!(f64::from_text(&0.1_f64.to_text()), Ok(0.1));
        assert_eq!(u64::from_text(&u64::MAX.to_text()), Ok(u64::MAX));
    }

    #[test]
    fn handles_keep_identity_only() {
        let handle = ObjectHandle::new(3, 1, std::any::TypeId::of::<u8>());
        assert_eq!(ObjectHandle::from_storage(&handle.into_storage()), Ok(handle));
        assert_eq!(handle.to_text(), "object#3:1");
        assert!(ObjectHandle::from_text("object#3:1").is_err());

        assert_eq!(<Option<ObjectHandle>>::from_storage(&Dynamic::NullHandle), Ok(None));
        assert_eq!(<Option<ObjectHandle>>::from_text("null"), Ok(None));
        assert_eq!(None::<ObjectHandle>.to_text(), "null");
        assert!(matches!(
            ObjectHandle::from_storage(&Dynamic::NullHandle),
            Err(ConversionError::NullHandle { .. })
        ));
    }

    #[test]
    fn void_is_flagged() {
        assert!(<() as TypeAdapter>::IS_VOID);
        assert!(!i32::IS_VOID);
        assert_eq!(<()>::type_name(), "void");
    }

    #[test]
    fn type_hashes_distinguish_widths() {
        assert_ne!(i32::type_hash(), i64::type_hash());
        assert_ne!(f32::type_hash(), f64::type_hash());
        assert_eq!(i32::type_hash(), TypeHash::from_name("int"));
    }

    #[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
    #[repr(i16)]
    enum Stance {
        Idle = 0,
        Crouch = 4,
        Prone = -2,
    }

    impl Default for Stance {
        fn default() -> Self {
            Stance::Idle
        }
    }

    crate::enum_adapter!(Stance: i16, "Stance");

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        struct Channels: u8 {
            const RED = 0b001;
            const GREEN = 0b010;
            const BLUE = 0b100;
        }
    }

    crate::flags_adapter!(Channels: u8, "Channels");

    #[test]
    fn enum_adapter_round_trip() {
        round_trip(Stance::Crouch);
        round_trip(Stance::Prone);
        assert_eq!(Stance::from_text("-2"), Ok(Stance::Prone));
        assert_eq!(Stance::Crouch.to_text(), "4");
        assert_eq!(Stance::default_value(), Stance::Idle);
    }

    #[test]
    fn enum_adapter_rejects_unknown_discriminant() {
        assert!(Stance::from_storage(&Dynamic::Int(3)).is_err());
        assert!(Stance::from_storage(&Dynamic::Int(1 << 20)).is_err());
        assert_eq!(parse_or_default::<Stance>("7"), Stance::Idle);
    }

    #[test]
    fn flags_adapter_round_trip() {
        round_trip(Channels::RED | Channels::BLUE);
        assert_eq!(Channels::from_text("6"), Ok(Channels::GREEN | Channels::BLUE));
        assert_eq!((Channels::RED | Channels::GREEN).to_text(), "3");
        assert_eq!(Channels::default_value(), Channels::empty());
        assert!(Channels::from_storage(&Dynamic::Int(512)).is_err());
    }
}
