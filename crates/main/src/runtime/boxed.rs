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
    fmt::{Debug, Formatter},
    mem::replace,
};

use crate::runtime::{Internal, MarshalError, MarshalResult, NativeType, Trampoline, TypeMeta};

/// An inline value of a trivial type.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    /// Returns the name of the stored scalar's type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::U8(_) => "u8",
            Self::I16(_) => "i16",
            Self::U16(_) => "u16",
            Self::I32(_) => "i32",
            Self::U32(_) => "u32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
        }
    }
}

/// A payload of the [BoxedValue].
#[derive(Debug)]
pub enum Payload {
    /// A trivial value stored inline.
    Scalar(Scalar),

    /// A non-trivial value stored in its internal representation.
    ///
    /// None if the object has been moved out.
    Object(Option<Internal>),
}

impl Payload {
    /// Returns a short description of the payload used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.kind(),
            Self::Object(Some(_)) => "object",
            Self::Object(None) => "empty",
        }
    }
}

/// A type-erased container of a Rust value.
///
/// The BoxedValue holds either an inline [Scalar] of a trivial type or an
/// [Internal] representation of a non-trivial type, tagged with the
/// [TypeMeta] of the value's type.
///
/// The stored value can only be read back as the exact type it was created
/// from. Reading it as any other type fails with
/// [TypeMismatch](MarshalError::TypeMismatch).
///
/// ```
/// use hostbind::runtime::{BoxedValue, MarshalError};
///
/// let boxed = BoxedValue::new(String::from("foo"));
///
/// assert!(boxed.can_convert::<String>());
/// assert_eq!(boxed.get::<String>().unwrap(), "foo");
///
/// assert!(matches!(
///     boxed.get::<i32>(),
///     Err(MarshalError::TypeMismatch { .. }),
/// ));
/// ```
///
/// When the BoxedValue is dropped, it releases the payload through the
/// destructor bound at construction exactly once.
pub struct BoxedValue {
    ty: TypeMeta,
    payload: Payload,
    dispose: fn(Payload),
}

impl Drop for BoxedValue {
    fn drop(&mut self) {
        let payload = replace(&mut self.payload, Payload::Object(None));

        (self.dispose)(payload);
    }
}

impl Debug for BoxedValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Payload::Scalar(scalar) => formatter
                .debug_tuple("BoxedValue")
                .field(&self.ty.name())
                .field(scalar)
                .finish(),

            Payload::Object(_) => formatter
                .debug_tuple("BoxedValue")
                .field(&self.ty.name())
                .field(&self.payload.kind())
                .finish(),
        }
    }
}

impl BoxedValue {
    /// Moves the value into a new BoxedValue.
    #[inline]
    pub fn new<T: NativeType>(value: T) -> Self {
        Self {
            ty: TypeMeta::of::<T>(),
            payload: value.into_payload(),
            dispose: T::dispose,
        }
    }

    /// Returns the descriptor of the stored value's type.
    #[inline(always)]
    pub fn ty(&self) -> TypeMeta {
        self.ty
    }

    #[inline(always)]
    pub fn is_trivial(&self) -> bool {
        self.ty.is_trivial()
    }

    /// Returns true if the stored object has been moved out.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            Payload::Object(None) => true,
            _ => false,
        }
    }

    #[inline(always)]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns true if the stored value is of type `T`.
    #[inline(always)]
    pub fn can_convert<T: NativeType>(&self) -> bool {
        self.ty.is::<T>()
    }

    /// Returns a copy of the stored value.
    ///
    /// Fails with [TypeMismatch](MarshalError::TypeMismatch) if the value is
    /// not of type `T`, or with [EmptyValue](MarshalError::EmptyValue) if the
    /// object has been moved out.
    pub fn get<T: NativeType>(&self) -> MarshalResult<T> {
        self.check::<T>()?;

        T::from_payload(&self.payload)
    }

    /// Moves the stored value out, leaving this BoxedValue empty.
    ///
    /// Trivial values are copied and stay in place.
    pub fn take<T: NativeType>(&mut self) -> MarshalResult<T> {
        self.check::<T>()?;

        if let Payload::Scalar(_) = &self.payload {
            return T::from_payload(&self.payload);
        }

        let payload = replace(&mut self.payload, Payload::Object(None));
        let result = T::from_payload(&payload);

        (self.dispose)(payload);

        result
    }

    /// Provides mutable access to the stored object in place.
    pub fn borrow_mut<T: Trampoline>(&mut self) -> MarshalResult<&mut T> {
        self.check::<T>()?;

        match &mut self.payload {
            Payload::Object(Some(internal)) => T::borrow_mut(internal),

            _ => Err(MarshalError::ReadOnly {
                ty: self.ty.name(),
            }),
        }
    }

    #[inline]
    fn check<T: NativeType>(&self) -> MarshalResult<()> {
        if !self.can_convert::<T>() {
            return Err(MarshalError::TypeMismatch {
                expected: T::type_name(),
                actual: self.ty.name(),
            });
        }

        if self.is_empty() {
            return Err(MarshalError::EmptyValue {
                ty: self.ty.name(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        export,
        runtime::{lock_count_of, BoxedValue, MarshalError, Payload},
    };

    #[export]
    #[derive(Clone, PartialEq, Debug)]
    struct Sample {
        id: u32,
        label: String,
    }

    #[export]
    #[derive(Clone, PartialEq, Debug)]
    struct Marker;

    #[test]
    fn test_trivial_payload() {
        let boxed = BoxedValue::new(-7i16);

        assert!(boxed.is_trivial());
        assert!(boxed.can_convert::<i16>());
        assert!(!boxed.can_convert::<i32>());
        assert_eq!(boxed.get::<i16>().unwrap(), -7);

        match boxed.get::<u16>() {
            Err(MarshalError::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, "u16");
                assert_eq!(actual, "i16");
            }

            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_float_bits() {
        let value = f64::from_bits(0x7FF8_0000_0000_0001);
        let boxed = BoxedValue::new(value);

        assert_eq!(boxed.get::<f64>().unwrap().to_bits(), value.to_bits());
    }

    #[test]
    fn test_object_lifecycle() {
        let before = lock_count_of::<Sample>();

        let sample = Sample {
            id: 3,
            label: String::from("three"),
        };

        let mut boxed = BoxedValue::new(sample.clone());

        assert!(!boxed.is_trivial());
        assert!(matches!(boxed.payload(), Payload::Object(Some(_))));
        assert_eq!(lock_count_of::<Sample>(), before + 1);
        assert_eq!(boxed.get::<Sample>().unwrap(), sample);

        boxed.borrow_mut::<Sample>().unwrap().id = 4;

        let taken = boxed.take::<Sample>().unwrap();

        assert_eq!(taken.id, 4);
        assert!(boxed.is_empty());
        assert_eq!(lock_count_of::<Sample>(), before);

        assert!(matches!(
            boxed.get::<Sample>(),
            Err(MarshalError::EmptyValue { .. }),
        ));

        drop(boxed);

        assert_eq!(lock_count_of::<Sample>(), before);
    }

    #[test]
    fn test_drop_releases_once() {
        let before = lock_count_of::<Marker>();

        let boxed = BoxedValue::new(Marker);

        assert_eq!(lock_count_of::<Marker>(), before + 1);

        drop(boxed);

        assert_eq!(lock_count_of::<Marker>(), before);
    }
}
