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
        __intrinsics::{object_dispose, object_from_payload, object_into_payload, wrap_single},
        Downcast,
        Element,
        Heap,
        MarshalResult,
        NativeType,
        Outputs,
        Payload,
        Trampoline,
        Upcast,
    },
};

impl<T: Element> NativeType for Vec<T> {
    const TRIVIAL: bool = false;

    #[inline(always)]
    fn into_payload(self) -> Payload {
        object_into_payload(self)
    }

    #[inline(always)]
    fn from_payload(payload: &Payload) -> MarshalResult<Self> {
        object_from_payload(payload)
    }

    #[inline(always)]
    fn dispose(payload: Payload) {
        object_dispose::<Self>(payload)
    }
}

impl<T: Element> Trampoline for Vec<T> {}

impl<T: Element> Downcast for Vec<T> {
    #[inline(always)]
    fn downcast(cell: &HostCell, heap: &Heap) -> MarshalResult<Self> {
        T::read_array(cell, heap)
    }
}

impl<T: Element> Upcast for Vec<T> {
    #[inline(always)]
    fn upcast(heap: &mut Heap, this: Self) -> MarshalResult<HostCell> {
        T::write_array(heap, this)
    }
}

impl<T: Element> Outputs for Vec<T> {
    const COUNT: usize = 1;

    #[inline(always)]
    fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()> {
        wrap_single(heap, this, cells)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        export,
        host::{ClassId, HostCell},
        runtime::{lock_count_of, BoxedValue, Downcast, Heap, MarshalError, Upcast},
    };

    #[export]
    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[export(cells)]
    #[derive(Clone, Debug, PartialEq)]
    struct Tag(String);

    #[test]
    fn test_vector_object() {
        let before = lock_count_of::<Vec<u8>>();

        let boxed = BoxedValue::new(vec![1u8, 2, 3]);

        assert!(!boxed.is_trivial());
        assert_eq!(lock_count_of::<Vec<u8>>(), before + 1);
        assert_eq!(boxed.get::<Vec<u8>>().unwrap(), vec![1, 2, 3]);

        drop(boxed);

        assert_eq!(lock_count_of::<Vec<u8>>(), before);
    }

    #[test]
    fn test_handle_arrays() {
        let mut heap = Heap::new();

        let points = vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }];
        let cell = Vec::<Point>::upcast(&mut heap, points.clone()).unwrap();

        assert_eq!(cell.class(), ClassId::UInt64);
        assert_eq!(cell.len(), 2);
        assert_eq!(heap.len(), 2);
        assert_eq!(Vec::<Point>::downcast(&cell, &heap).unwrap(), points);

        let tags = vec![Tag(String::from("a"))];
        let cell = Vec::<Tag>::upcast(&mut heap, tags.clone()).unwrap();

        assert_eq!(cell.class(), ClassId::Cell);
        assert_eq!(Vec::<Tag>::downcast(&cell, &heap).unwrap(), tags);
    }

    #[test]
    fn test_foreign_handles() {
        let mut heap = Heap::new();

        let text = heap.insert(BoxedValue::new(String::from("text")));
        let cell = HostCell::from_vec(vec![text.to_bits()]);

        assert!(matches!(
            Vec::<Point>::downcast(&cell, &heap),
            Err(MarshalError::TypeMismatch { .. }),
        ));

        assert!(matches!(
            Vec::<Point>::downcast(&HostCell::from_vec(vec![0u64]), &heap),
            Err(MarshalError::InvalidHandle { bits: 0 }),
        ));
    }
}
