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

use std::fmt::{Display, Formatter};

use crate::host::HostData;

/// A dynamic class of a [HostCell](crate::host::HostCell).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ClassId {
    /// A value of unrecognized class.
    Unknown,

    /// A cell array: an array of nested cells.
    Cell,

    /// A struct record with named fields.
    Struct,

    /// An array of booleans.
    Logical,

    /// A character string.
    Char,

    /// An empty value that carries no data.
    Void,

    /// An array of 64-bit floats.
    Double,

    /// An array of 32-bit floats.
    Single,

    /// An array of `i8` numbers.
    Int8,

    /// An array of `u8` numbers.
    UInt8,

    /// An array of `i16` numbers.
    Int16,

    /// An array of `u16` numbers.
    UInt16,

    /// An array of `i32` numbers.
    Int32,

    /// An array of `u32` numbers.
    UInt32,

    /// An array of `i64` numbers.
    Int64,

    /// An array of `u64` numbers. Object handles are cells of this class.
    UInt64,

    /// A host function reference.
    Function,
}

impl Display for ClassId {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl ClassId {
    /// Returns the host-facing name of this class.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Cell => "cell",
            Self::Struct => "struct",
            Self::Logical => "logical",
            Self::Char => "char",
            Self::Void => "void",
            Self::Double => "double",
            Self::Single => "single",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Function => "function_handle",
        }
    }

    /// Returns true if cells of this class hold numeric arrays.
    #[inline]
    pub fn is_numeric(self) -> bool {
        match self {
            Self::Double
            | Self::Single
            | Self::Int8
            | Self::UInt8
            | Self::Int16
            | Self::UInt16
            | Self::Int32
            | Self::UInt32
            | Self::Int64
            | Self::UInt64 => true,

            _ => false,
        }
    }
}

/// A Rust scalar type that has a direct element representation in host
/// arrays.
///
/// The trait is implemented for `bool`, all fixed-size integer types, `f32`,
/// and `f64`. It cannot be implemented outside of this crate.
pub trait HostScalar: sealed::Sealed + Copy + Send + Sync + 'static {
    /// The class of the host arrays that hold elements of this type.
    const CLASS: ClassId;

    /// Returns the elements of the array payload if the payload holds
    /// elements of this type.
    fn slice(data: &HostData) -> Option<&[Self]>;

    /// Creates an array payload from the elements.
    fn array(values: Vec<Self>) -> HostData;
}

macro_rules! impl_host_scalar {
    ($($ty:ty => $class:ident;)*) => {
        $(
        impl sealed::Sealed for $ty {}

        impl HostScalar for $ty {
            const CLASS: ClassId = ClassId::$class;

            #[inline]
            fn slice(data: &HostData) -> Option<&[Self]> {
                match data {
                    HostData::$class(values) => Some(values.as_slice()),
                    _ => None,
                }
            }

            #[inline(always)]
            fn array(values: Vec<Self>) -> HostData {
                HostData::$class(values)
            }
        }
        )*
    };
}

impl_host_scalar! {
    bool => Logical;
    f64 => Double;
    f32 => Single;
    i8 => Int8;
    u8 => UInt8;
    i16 => Int16;
    u16 => UInt16;
    i32 => Int32;
    u32 => UInt32;
    i64 => Int64;
    u64 => UInt64;
}

mod sealed {
    pub trait Sealed {}
}
