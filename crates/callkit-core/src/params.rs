//! Ordered parameter lists.
//!
//! [`ParamList`] is implemented for tuples of zero to sixteen
//! [`TypeAdapter`] types. It is the single generic code path that replaces a
//! per-arity family of packs and callables.

use crate::adapter::{parse_or_default, storage_or_default};
use crate::text::FieldSource;
use crate::{Dynamic, TypeAdapter, TypeHash};

/// Maximum number of parameters a callable may declare.
pub const MAX_ARITY: usize = 16;

/// A tuple of parameter types.
///
/// Every conversion walks the parameters in index order `0..ARITY`, so
/// adapters with observable side effects see a stable sequence.
pub trait ParamList: Sized + 'static {
    /// Number of parameters.
    const ARITY: usize;

    /// Adapter type names, in order.
    fn type_names() -> Vec<&'static str>;

    /// Adapter type hashes, in order.
    fn type_hashes() -> Vec<TypeHash>;

    /// Every parameter at its default value.
    fn defaults() -> Self;

    /// Convert each parameter into a storage slot.
    fn into_storage(self) -> Vec<Dynamic>;

    /// Read parameters back from storage slots.
    ///
    /// A missing or unconvertible slot yields that parameter's default.
    fn from_storage(slots: &[Dynamic]) -> Self;

    /// Read parameters from a field source.
    ///
    /// A missing or malformed field yields that parameter's default.
    fn from_fields(source: &mut dyn FieldSource) -> Self;

    /// Storage slots holding every parameter's default.
    fn default_storage() -> Vec<Dynamic> {
        Self::defaults().into_storage()
    }
}

fn slot_at<T: TypeAdapter>(slots: &[Dynamic], index: usize) -> T {
    match slots.get(index) {
        Some(slot) => storage_or_default(slot),
        None => T::default_value(),
    }
}

fn next_field<T: TypeAdapter>(source: &mut dyn FieldSource) -> T {
    match source.next_field() {
        Some(field) => parse_or_default(&field),
        None => T::default_value(),
    }
}

macro_rules! impl_param_list {
    ($arity:expr; $($P:ident $idx:tt),*) => {
        impl<$($P: TypeAdapter),*> ParamList for ($($P,)*) {
            const ARITY: usize = $arity;

            fn type_names() -> Vec<&'static str> {
                vec![$($P::type_name()),*]
            }

            fn type_hashes() -> Vec<TypeHash> {
                vec![$($P::type_hash()),*]
            }

            fn defaults() -> Self {
                ($($P::default_value(),)*)
            }

            #[allow(non_snake_case)]
            fn into_storage(self) -> Vec<Dynamic> {
                let ($($P,)*) = self;
                vec![$($P.into_storage()),*]
            }

            #[allow(unused_variables)]
            fn from_storage(slots: &[Dynamic]) -> Self {
                ($(slot_at::<$P>(slots, $idx),)*)
            }

            #[allow(unused_variables)]
            fn from_fields(source: &mut dyn FieldSource) -> Self {
                ($(next_field::<$P>(source),)*)
            }
        }
    };
}

impl_param_list!(0;);
impl_param_list!(1; P0 0);
impl_param_list!(2; P0 0, P1 1);
impl_param_list!(3; P0 0, P1 1, P2 2);
impl_param_list!(4; P0 0, P1 1, P2 2, P3 3);
impl_param_list!(5; P0 0, P1 1, P2 2, P3 3, P4 4);
impl_param_list!(6; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5);
impl_param_list!(7; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6);
impl_param_list!(8; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7);
impl_param_list!(9; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8);
impl_param_list!(10; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9);
impl_param_list!(11; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10);
impl_param_list!(12; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10, P11 11);
impl_param_list!(13; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10, P11 11, P12 12);
impl_param_list!(14; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10, P11 11, P12 12, P13 13);
impl_param_list!(15; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10, P11 11, P12 12, P13 13, P14 14);
impl_param_list!(16; P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10, P11 11, P12 12, P13 13, P14 14, P15 15);
