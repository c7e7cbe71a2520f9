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

use std::time::Duration;

use crate::{
    host::HostCell,
    runtime::{
        __intrinsics::{
            object_dispose,
            object_from_payload,
            object_into_payload,
            read_scalar,
            read_slice,
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

const NANOS_PER_MILLI: f64 = 1_000_000.0;

// Durations cross the host boundary as Double numbers of milliseconds.
fn from_millis(millis: f64) -> MarshalResult<Duration> {
    match cast::u64(millis * NANOS_PER_MILLI) {
        Ok(nanos) => Ok(Duration::from_nanos(nanos)),

        Err(error) => Err(MarshalError::NumberCast {
            to: Duration::type_name(),
            cause: error.into(),
            value: millis,
        }),
    }
}

#[inline(always)]
fn to_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl NativeType for Duration {
    const TRIVIAL: bool = false;

    #[inline(always)]
    fn type_name() -> &'static str {
        "Duration"
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

impl Trampoline for Duration {}

impl Downcast for Duration {
    #[inline(always)]
    fn downcast(cell: &HostCell, _heap: &Heap) -> MarshalResult<Self> {
        from_millis(read_scalar::<f64>(cell)?)
    }
}

impl Upcast for Duration {
    #[inline(always)]
    fn upcast(_heap: &mut Heap, this: Self) -> MarshalResult<HostCell> {
        Ok(HostCell::from_scalar(to_millis(this)))
    }
}

impl Outputs for Duration {
    const COUNT: usize = 1;

    #[inline(always)]
    fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()> {
        wrap_single(heap, this, cells)
    }
}

impl Element for Duration {
    fn read_array(cell: &HostCell, _heap: &Heap) -> MarshalResult<Vec<Self>> {
        read_slice::<f64>(cell)?
            .iter()
            .map(|millis| from_millis(*millis))
            .collect()
    }

    fn write_array(_heap: &mut Heap, items: Vec<Self>) -> MarshalResult<HostCell> {
        Ok(HostCell::from_vec(items.into_iter().map(to_millis).collect()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        host::HostCell,
        runtime::{Downcast, Heap, MarshalError, NumberCastCause, Upcast},
    };

    #[test]
    fn test_millis() {
        let mut heap = Heap::new();

        let cell = Duration::upcast(&mut heap, Duration::from_millis(1500)).unwrap();

        assert_eq!(cell.scalar::<f64>(), Some(1500.0));

        assert_eq!(
            Duration::downcast(&HostCell::from_scalar(2.5), &heap).unwrap(),
            Duration::from_micros(2500),
        );
    }

    #[test]
    fn test_invalid_millis() {
        let heap = Heap::new();

        for (millis, expected) in [
            (-1.0, NumberCastCause::Underflow),
            (f64::NAN, NumberCastCause::NAN),
            (f64::INFINITY, NumberCastCause::Infinite),
        ] {
            match Duration::downcast(&HostCell::from_scalar(millis), &heap) {
                Err(MarshalError::NumberCast { cause, .. }) => assert_eq!(cause, expected),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}
