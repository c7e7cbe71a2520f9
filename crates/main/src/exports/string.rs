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
    host::{ClassId, HostCell},
    runtime::{
        __intrinsics::{
            object_dispose,
            object_from_payload,
            object_into_payload,
            read_cells,
            wrap_single,
        },
        Downcast,
        Element,
        Heap,
        MarshalError,
        MarshalResult,
        NativeType,
        Outputs,
        Payload,
        Trampoline,
        Upcast,
    },
};

impl NativeType for String {
    const TRIVIAL: bool = false;

    #[inline(always)]
    fn type_name() -> &'static str {
        "String"
    }

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

impl Trampoline for String {}

impl Downcast for String {
    fn downcast(cell: &HostCell, _heap: &Heap) -> MarshalResult<Self> {
        match cell.as_str() {
            Some(text) => Ok(text.to_string()),

            None => Err(MarshalError::ClassMismatch {
                expected: ClassId::Char,
                actual: cell.class(),
            }),
        }
    }
}

impl Upcast for String {
    #[inline(always)]
    fn upcast(_heap: &mut Heap, this: Self) -> MarshalResult<HostCell> {
        Ok(HostCell::from_string(this))
    }
}

impl Upcast for &'static str {
    #[inline(always)]
    fn upcast(_heap: &mut Heap, this: Self) -> MarshalResult<HostCell> {
        Ok(HostCell::from_string(this))
    }
}

impl Outputs for String {
    const COUNT: usize = 1;

    #[inline(always)]
    fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()> {
        wrap_single(heap, this, cells)
    }
}

impl Outputs for &'static str {
    const COUNT: usize = 1;

    #[inline(always)]
    fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()> {
        wrap_single(heap, this, cells)
    }
}

// Arrays of strings are cell arrays of character cells.
impl Element for String {
    fn read_array(cell: &HostCell, heap: &Heap) -> MarshalResult<Vec<Self>> {
        read_cells(cell)?
            .iter()
            .map(|cell| Self::downcast(cell, heap))
            .collect()
    }

    fn write_array(_heap: &mut Heap, items: Vec<Self>) -> MarshalResult<HostCell> {
        Ok(HostCell::cell_array(
            items.into_iter().map(HostCell::from_string).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        host::{ClassId, HostCell},
        runtime::{Downcast, Element, Heap, MarshalError},
    };

    #[test]
    fn test_string_cells() {
        let heap = Heap::new();

        assert_eq!(
            String::downcast(&HostCell::from_string("hello"), &heap).unwrap(),
            "hello",
        );

        assert!(matches!(
            String::downcast(&HostCell::from_scalar(1.0), &heap),
            Err(MarshalError::ClassMismatch {
                expected: ClassId::Char,
                actual: ClassId::Double,
            }),
        ));
    }

    #[test]
    fn test_string_arrays() {
        let mut heap = Heap::new();

        let items = vec![String::from("a"), String::from("bc")];
        let cell = String::write_array(&mut heap, items.clone()).unwrap();

        assert_eq!(cell.class(), ClassId::Cell);
        assert_eq!(String::read_array(&cell, &heap).unwrap(), items);

        let mixed = HostCell::cell_array(vec![HostCell::from_string("a"), HostCell::from_scalar(1u8)]);

        assert!(String::read_array(&mixed, &heap).is_err());
    }
}
