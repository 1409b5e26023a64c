//! Compile-time descriptor production for Rust types.
//!
//! [`TsType`] is implemented for every type that can appear as a field;
//! [`TsRecord`] for record types that can be registered as roots. Both are
//! normally derived with `#[derive(TypeScriptify)]`.

use std::borrow::Cow;
use std::collections::{
    BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::num::{
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize, NonZeroU8,
    NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::schema::Schema;
use crate::types::{FieldKind, TypeDescriptor, TypeIdentity};

/// A type usable as a field.
pub trait TsType {
    /// Structural kind of the type when it appears as a field.
    fn field_kind() -> FieldKind;

    /// Register the record types this type refers to.
    ///
    /// Records insert their own descriptor first and only visit their fields
    /// when the insertion was new, so recursive types terminate.
    fn visit(_schema: &mut Schema) {}
}

/// A named record type that can be a conversion root.
pub trait TsRecord: TsType {
    fn identity() -> TypeIdentity;

    fn descriptor() -> TypeDescriptor;
}

macro_rules! impl_scalar {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl TsType for $ty {
                fn field_kind() -> FieldKind {
                    $kind
                }
            }
        )+
    };
}

impl_scalar!(FieldKind::Bool => bool);
impl_scalar!(FieldKind::Number =>
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);
impl_scalar!(FieldKind::Number =>
    NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize,
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize);
impl_scalar!(FieldKind::String => String, str, char);
impl_scalar!(FieldKind::String =>
    PathBuf, Path, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);
impl_scalar!(FieldKind::Any => ());

// Tuples serialize as heterogeneous arrays.
macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> TsType for ($($name,)+) {
            fn field_kind() -> FieldKind {
                FieldKind::Any
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
impl_tuple!(A, B, C, D, E, F, G);
impl_tuple!(A, B, C, D, E, F, G, H);
impl_tuple!(A, B, C, D, E, F, G, H, I);
impl_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

macro_rules! impl_pointer {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: TsType + ?Sized> TsType for $ty<T> {
                fn field_kind() -> FieldKind {
                    FieldKind::pointer(T::field_kind())
                }

                fn visit(schema: &mut Schema) {
                    T::visit(schema);
                }
            }
        )+
    };
}

impl_pointer!(Box, Rc, Arc);

impl<T: TsType> TsType for Option<T> {
    fn field_kind() -> FieldKind {
        FieldKind::pointer(T::field_kind())
    }

    fn visit(schema: &mut Schema) {
        T::visit(schema);
    }
}

impl<B: TsType + ToOwned + ?Sized> TsType for Cow<'_, B> {
    fn field_kind() -> FieldKind {
        FieldKind::pointer(B::field_kind())
    }

    fn visit(schema: &mut Schema) {
        B::visit(schema);
    }
}

impl<T: TsType + ?Sized> TsType for &T {
    fn field_kind() -> FieldKind {
        T::field_kind()
    }

    fn visit(schema: &mut Schema) {
        T::visit(schema);
    }
}

macro_rules! impl_collection {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: TsType> TsType for $ty<T> {
                fn field_kind() -> FieldKind {
                    FieldKind::collection(T::field_kind())
                }

                fn visit(schema: &mut Schema) {
                    T::visit(schema);
                }
            }
        )+
    };
}

impl_collection!(Vec, VecDeque, LinkedList, BinaryHeap, BTreeSet);

impl<T: TsType, S> TsType for HashSet<T, S> {
    fn field_kind() -> FieldKind {
        FieldKind::collection(T::field_kind())
    }

    fn visit(schema: &mut Schema) {
        T::visit(schema);
    }
}

impl<T: TsType, const N: usize> TsType for [T; N] {
    fn field_kind() -> FieldKind {
        FieldKind::collection(T::field_kind())
    }

    fn visit(schema: &mut Schema) {
        T::visit(schema);
    }
}

impl<T: TsType> TsType for [T] {
    fn field_kind() -> FieldKind {
        FieldKind::collection(T::field_kind())
    }

    fn visit(schema: &mut Schema) {
        T::visit(schema);
    }
}

// Map values resolve to the fallback, so they are not visited.
impl<K: TsType, V: TsType, S> TsType for HashMap<K, V, S> {
    fn field_kind() -> FieldKind {
        FieldKind::map(K::field_kind(), V::field_kind())
    }
}

impl<K: TsType, V: TsType> TsType for BTreeMap<K, V> {
    fn field_kind() -> FieldKind {
        FieldKind::map(K::field_kind(), V::field_kind())
    }
}
