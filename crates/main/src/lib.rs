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

//! # Hostbind
//!
//! Hostbind is a marshalling boundary between statically typed Rust functions
//! and a dynamically typed host environment that represents every value as an
//! opaque, runtime-tagged value cell (a numeric array, a character string,
//! a cell array, a struct record, or an opaque object handle).
//!
//! The crate converts untyped host cells into typed Rust argument tuples,
//! calls the target function, converts the results back into host cells, and
//! manages the lifetime of Rust objects that the host refers to only through
//! integer handles.
//!
//! ## Quick Start
//!
//! ```
//! use hostbind::{
//!     dispatch::Module,
//!     export,
//!     host::HostCell,
//!     runtime::{BoxedValue, ClassRegistry, FunctionRecord, Registry},
//! };
//!
//! #[export]
//! #[derive(Clone, Debug, PartialEq)]
//! pub struct Counter {
//!     value: i64,
//! }
//!
//! impl Counter {
//!     fn new(value: i64) -> Self {
//!         Self { value }
//!     }
//!
//!     fn add(&mut self, step: i64) {
//!         self.value += step;
//!     }
//!
//!     fn get(&self) -> i64 {
//!         self.value
//!     }
//! }
//!
//! let mut class = ClassRegistry::new("Counter");
//!
//! class
//!     .function("new", Counter::new)
//!     .unwrap()
//!     .insert(
//!         "add",
//!         FunctionRecord::method_mut(Counter::add)
//!             .with_defaults([BoxedValue::new(1i64)])
//!             .unwrap(),
//!     )
//!     .unwrap()
//!     .method("get", Counter::get)
//!     .unwrap();
//!
//! let mut registry = Registry::new();
//! registry.record(class).unwrap();
//!
//! let mut module = Module::new(registry);
//!
//! // The host receives an opaque object handle.
//! let mut outputs = [None];
//! assert!(module.invoke("Counter", "new", &mut outputs, &[HostCell::from_scalar(10i64)]));
//! let counter = outputs[0].take().unwrap();
//!
//! // The step parameter falls back to its default value.
//! assert!(module.invoke("Counter", "add", &mut [], &[counter.clone()]));
//!
//! let mut outputs = [None];
//! assert!(module.invoke("Counter", "get", &mut outputs, &[counter]));
//! assert_eq!(outputs[0].as_ref().unwrap().scalar::<i64>(), Some(11));
//! ```
//!
//! ## Crate Layout
//!
//! - The [host] module models the host environment's value cells.
//! - The [runtime] module contains the marshalling core: type descriptors,
//!   boxed values, the object heap, argument casters and loaders, function
//!   records, and the function registry.
//! - The [dispatch] module provides the entry point that the host calls.
//! - The [export] attribute macro exports Rust types so that they can cross
//!   the boundary.

extern crate self as hostbind;

pub mod dispatch;
mod exports;
pub mod host;
mod report;
pub mod runtime;

/// Exports a Rust type so that its values can cross the host boundary.
///
/// Applied to a struct, the macro makes the type a non-trivial (boxed) type.
/// Its values reach the host as opaque `UInt64` handles that refer to the
/// values owned by the module's heap. The struct must implement [Clone].
///
/// Applied to a fieldless enum with an integer `#[repr]`, the macro makes the
/// type a trivial type carried in the clear as a numeric scalar of the
/// repr's class.
///
/// Options (comma-separated, or spread over several `#[export(...)]`
/// attributes):
///
/// - `name "<name>"`: the type name used in error messages.
/// - `custom`: the user implements the
///   [Trampoline](crate::runtime::Trampoline) trait manually.
/// - `cells`: arrays of this type cross the boundary as host cell arrays.
/// - `dump`: prints the generated code as a compile-time error (debug builds
///   only).
pub use hostbind_export::export;
