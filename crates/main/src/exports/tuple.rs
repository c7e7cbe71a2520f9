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
    runtime::{Heap, MarshalResult, Outputs, Upcast},
};

macro_rules! impl_tuple {
    ($count:expr; $($arg:ident: $index:tt),+) => {
        impl<$($arg: Upcast),+> Outputs for ($($arg,)+) {
            const COUNT: usize = $count;

            fn wrap(
                heap: &mut Heap,
                this: Self,
                cells: &mut [Option<HostCell>],
            ) -> MarshalResult<()> {
                $(
                if let Some(cell) = cells.get_mut($index) {
                    *cell = Some(<$arg as Upcast>::upcast(heap, this.$index)?);
                }
                )+

                Ok(())
            }
        }
    };
}

impl_tuple!(2; A: 0, B: 1);
impl_tuple!(3; A: 0, B: 1, C: 2);
impl_tuple!(4; A: 0, B: 1, C: 2, D: 3);
impl_tuple!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

#[cfg(test)]
mod tests {
    use crate::{
        export,
        host::HostCell,
        runtime::{lock_count_of, Heap, Outputs},
    };

    #[export]
    #[derive(Clone, Debug)]
    struct Unrequested;

    #[test]
    fn test_truncation() {
        let mut heap = Heap::new();
        let before = lock_count_of::<Unrequested>();

        let mut cells = [None, Some(HostCell::empty())];

        <(f64, Unrequested)>::wrap(&mut heap, (1.0, Unrequested), &mut cells[..1]).unwrap();

        assert_eq!(cells[0].as_ref().unwrap().scalar::<f64>(), Some(1.0));
        assert_eq!(cells[1], Some(HostCell::empty()));
        assert!(heap.is_empty());
        assert_eq!(lock_count_of::<Unrequested>(), before);
    }

    #[test]
    fn test_all_components() {
        let mut heap = Heap::new();

        let mut cells = [None, None, None];

        <(u8, String, bool)>::wrap(&mut heap, (1, String::from("two"), true), &mut cells).unwrap();

        assert_eq!(cells[0].as_ref().unwrap().scalar::<u8>(), Some(1));
        assert_eq!(cells[1].as_ref().unwrap().as_str(), Some("two"));
        assert_eq!(cells[2].as_ref().unwrap().scalar::<bool>(), Some(true));
    }
}
