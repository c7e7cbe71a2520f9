////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{
    any::{type_name, TypeId},
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

use crate::runtime::{MarshalResult, Payload};

/// A Rust type that can cross the host boundary inside a
/// [BoxedValue](crate::runtime::BoxedValue).
///
/// The trait describes how values of the type are stored in the boxed value
/// payload:
///
/// - Trivial types ([TRIVIAL](Self::TRIVIAL) is true) are stored inline as a
///   [Scalar](crate::runtime::Scalar). These are `bool`, integer and float
///   types, and fieldless enums exported with the [export](crate::export)
///   macro.
/// - Non-trivial types are stored behind an [Internal](crate::runtime::Internal)
///   produced by the type's [Trampoline](crate::runtime::Trampoline).
///
/// Typically, you don't need to implement this trait manually. The
/// [export](crate::export) macro implements it for exported types.
pub trait NativeType: Sized + Send + Sync + 'static {
    /// True if the values of this type are stored inline.
    const TRIVIAL: bool;

    /// The name of the type that the crate uses in error messages.
    #[inline(always)]
    fn type_name() -> &'static str {
        type_name::<Self>()
    }

    /// Moves the value into the boxed value payload.
    fn into_payload(self) -> Payload;

    /// Reads a copy of the value from the payload.
    fn from_payload(payload: &Payload) -> MarshalResult<Self>;

    /// Releases the payload previously produced by
    /// [into_payload](Self::into_payload).
    #[inline(always)]
    fn dispose(payload: Payload) {
        drop(payload);
    }
}

/// A runtime descriptor of a [NativeType].
///
/// Two descriptors are equal if and only if they describe the same Rust type.
/// There is no notion of subtyping: a value of one type is never convertible
/// into another type.
///
/// The [Display] implementation prints the type name.
#[derive(Clone, Copy, Debug)]
pub struct TypeMeta {
    id: TypeId,
    name: &'static str,
    trivial: bool,
}

impl PartialEq for TypeMeta {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id.eq(&other.id)
    }
}

impl Eq for TypeMeta {}

impl PartialEq<TypeId> for TypeMeta {
    #[inline(always)]
    fn eq(&self, other: &TypeId) -> bool {
        self.id.eq(other)
    }
}

impl Hash for TypeMeta {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Display for TypeMeta {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

impl TypeMeta {
    /// Returns the descriptor of the `T` type.
    #[inline(always)]
    pub fn of<T: NativeType>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::type_name(),
            trivial: T::TRIVIAL,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if the values of this type are stored inline.
    #[inline(always)]
    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    /// Returns true if this descriptor describes the `T` type.
    #[inline(always)]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::TypeMeta;

    #[test]
    fn test_type_meta_identity() {
        let int = TypeMeta::of::<i32>();

        assert_eq!(int, TypeMeta::of::<i32>());
        assert_ne!(int, TypeMeta::of::<u32>());
        assert!(int.is_trivial());
        assert!(int.is::<i32>());
        assert_eq!(int.to_string(), "i32");

        let string = TypeMeta::of::<String>();

        assert!(!string.is_trivial());
        assert_eq!(string.name(), "String");
    }
}
