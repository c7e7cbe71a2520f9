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

//! The marshalling core.
//!
//! This module's API describes how Rust values cross the boundary between
//! natively typed Rust functions and a dynamically typed host:
//!
//! - [NativeType] and [TypeMeta] describe the Rust types that can cross the
//!   boundary.
//! - [BoxedValue] is a type-erased container of a Rust value, and [Heap] is
//!   an arena of the boxed values that the host refers to by [Handle]s.
//! - [Trampoline] customizes how a non-trivial type is stored inside the
//!   boxed value.
//! - [Downcast], [Upcast] and [Outputs] convert between host cells and Rust
//!   values, and [Caster] loads a single function argument.
//! - [FunctionRecord] binds a Rust function to the uniform dynamic signature,
//!   and [Registry] indexes the records by class and function names.
//!
//! Typically, you don't need to implement the conversion traits manually.
//! The [export](crate::export) macro implements them for your types, and the
//! crate implements them for the standard scalar types, [String], [Vec],
//! [Duration](std::time::Duration), tuples, and [Result].

mod boxed;
mod coercion;
mod error;
mod heap;
mod invoke;
mod memory;
mod registry;
mod ty;

// This module is hidden.
//
// You should never use it directly, as its API is not part of the official
// public API of the crate.
#[doc(hidden)]
pub mod __intrinsics;

pub use crate::runtime::{
    boxed::{BoxedValue, Payload, Scalar},
    coercion::{Caster, Downcast, Element, Outputs, Upcast},
    error::{
        DispatchError,
        MarshalError,
        MarshalResult,
        NumberCastCause,
        RegistrationError,
    },
    heap::{Handle, Heap},
    invoke::{
        ArgLoader,
        FunctionRecord,
        NativeFn,
        NativeMethod,
        NativeMethodMut,
        Params,
        RecordKind,
    },
    memory::{is_locked, lock_count, lock_count_of, Internal, Trampoline},
    registry::{ClassRegistry, Registry},
    ty::{NativeType, TypeMeta},
};
