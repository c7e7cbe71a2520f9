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

use std::{error::Error as StdError, result::Result as StdResult};

use crate::{
    host::HostCell,
    runtime::{Heap, MarshalError, MarshalResult, Outputs},
};

impl<T, E> Outputs for StdResult<T, E>
where
    T: Outputs,
    E: StdError + Send + Sync + 'static,
{
    const COUNT: usize = T::COUNT;

    #[inline]
    fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()> {
        match this {
            Ok(inner) => T::wrap(heap, inner, cells),
            Err(error) => Err(MarshalError::native(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error as StdError,
        fmt::{Display, Formatter},
    };

    use crate::{
        host::HostCell,
        runtime::{Heap, MarshalError, Outputs},
    };

    #[derive(Debug)]
    struct Overheated;

    impl Display for Overheated {
        fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("overheated")
        }
    }

    impl StdError for Overheated {}

    #[test]
    fn test_native_errors() {
        let mut heap = Heap::new();
        let mut cells = [Some(HostCell::empty())];

        assert_eq!(<Result<(f64, f64), Overheated>>::COUNT, 2);

        let error = <Result<f64, Overheated>>::wrap(&mut heap, Err(Overheated), &mut cells)
            .unwrap_err();

        assert!(matches!(error, MarshalError::Native { .. }));
        assert!(!error.is_recoverable());
        assert_eq!(cells[0], Some(HostCell::empty()));

        <Result<f64, Overheated>>::wrap(&mut heap, Ok(4.0), &mut cells).unwrap();

        assert_eq!(cells[0].as_ref().unwrap().scalar::<f64>(), Some(4.0));
    }
}
