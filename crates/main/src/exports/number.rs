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

use crate::{
    host::HostCell,
    runtime::{
        __intrinsics::{
            read_scalar,
            read_slice,
            scalar_from_payload,
            scalar_into_payload,
            wrap_single,
            IntRepr,
            ScalarRepr,
        },
        Downcast,
        Element,
        Heap,
        MarshalResult,
        NativeType,
        Outputs,
        Payload,
        Scalar,
        Upcast,
    },
};

macro_rules! impl_scalar {
    ($ty:ty as $variant:ident) => {
        impl ScalarRepr for $ty {
            #[inline(always)]
            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            #[inline(always)]
            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        }

        impl NativeType for $ty {
            const TRIVIAL: bool = true;

            #[inline(always)]
            fn into_payload(self) -> Payload {
                scalar_into_payload(self)
            }

            #[inline(always)]
            fn from_payload(payload: &Payload) -> MarshalResult<Self> {
                scalar_from_payload(payload)
            }
        }

        impl Downcast for $ty {
            #[inline(always)]
            fn downcast(cell: &HostCell, _heap: &Heap) -> MarshalResult<Self> {
                read_scalar::<Self>(cell)
            }
        }

        impl Upcast for $ty {
            #[inline(always)]
            fn upcast(_heap: &mut Heap, this: Self) -> MarshalResult<HostCell> {
                Ok(HostCell::from_scalar(this))
            }
        }

        impl Outputs for $ty {
            const COUNT: usize = 1;

            #[inline(always)]
            fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()> {
                wrap_single(heap, this, cells)
            }
        }

        impl Element for $ty {
            #[inline(always)]
            fn read_array(cell: &HostCell, _heap: &Heap) -> MarshalResult<Vec<Self>> {
                Ok(read_slice::<Self>(cell)?.to_vec())
            }

            #[inline(always)]
            fn write_array(_heap: &mut Heap, items: Vec<Self>) -> MarshalResult<HostCell> {
                Ok(HostCell::from_vec(items))
            }
        }
    };
}

macro_rules! impl_int {
    ($($ty:ty as $variant:ident;)*) => {
        $(
        impl_scalar!($ty as $variant);

        impl IntRepr for $ty {
            #[inline(always)]
            fn widen(self) -> i128 {
                self as i128
            }
        }
        )*
    };
}

impl_scalar!(bool as Bool);
impl_scalar!(f32 as F32);
impl_scalar!(f64 as F64);

impl_int! {
    i8 as I8;
    u8 as U8;
    i16 as I16;
    u16 as U16;
    i32 as I32;
    u32 as U32;
    i64 as I64;
    u64 as U64;
}

#[cfg(test)]
mod tests {
    use crate::{
        host::{ClassId, HostCell},
        runtime::{Downcast, Element, Heap, MarshalError, Upcast},
    };

    #[test]
    fn test_exact_class() {
        let heap = Heap::new();

        assert_eq!(f64::downcast(&HostCell::from_scalar(2.5), &heap).unwrap(), 2.5);

        match f64::downcast(&HostCell::from_scalar(2i32), &heap) {
            Err(MarshalError::ClassMismatch { expected, actual }) => {
                assert_eq!(expected, ClassId::Double);
                assert_eq!(actual, ClassId::Int32);
            }

            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(
            bool::downcast(&HostCell::from_vec(vec![true, false]), &heap),
            Err(MarshalError::NonScalar { actual: 2, .. }),
        ));
    }

    #[test]
    fn test_bit_exact_scalars() {
        let mut heap = Heap::new();

        for value in [f64::NAN, -0.0, f64::MIN_POSITIVE, f64::from_bits(0x7FF0_0000_0000_0001)] {
            let cell = f64::upcast(&mut heap, value).unwrap();

            assert_eq!(cell.class(), ClassId::Double);
            assert_eq!(
                f64::downcast(&cell, &heap).unwrap().to_bits(),
                value.to_bits(),
            );
        }

        let cell = u64::upcast(&mut heap, u64::MAX).unwrap();

        assert_eq!(u64::downcast(&cell, &heap).unwrap(), u64::MAX);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_numeric_arrays() {
        let mut heap = Heap::new();

        let cell = i16::write_array(&mut heap, vec![-1, 0, 1]).unwrap();

        assert_eq!(cell.dims(), (1, 3));
        assert_eq!(i16::read_array(&cell, &heap).unwrap(), vec![-1, 0, 1]);
        assert!(u16::read_array(&cell, &heap).is_err());
    }
}
