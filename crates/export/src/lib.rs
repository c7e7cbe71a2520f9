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

//! # Hostbind Macros Crate
//!
//! This is a helper crate for the main crate of Hostbind, a marshalling
//! boundary between statically typed Rust functions and a dynamically typed
//! host environment.
//!
//! The [export] attribute macro in this crate inspects Rust type declarations
//! and implements the main crate's conversion traits for them, so that the
//! values of these types can cross the host boundary.
//!
//! The generated code refers to the main crate as `::hostbind`. Use the macro
//! through its re-export from the main crate: `hostbind::export`.

mod export;
mod utils;

use proc_macro::TokenStream;
use quote::quote_spanned;
use syn::{parse_macro_input, spanned::Spanned};

use crate::export::ExportItem;

/// Exports a Rust type so that its values can cross the host boundary.
///
/// ```ignore
/// use hostbind::export;
///
/// // A non-trivial type. The host refers to its values by handles.
/// #[export]
/// #[derive(Clone)]
/// pub struct Vector {
///     pub x: f32,
///     pub y: f32,
/// }
///
/// // A trivial type. The host sees its values as UInt8 numbers.
/// #[export(name "Direction")]
/// #[derive(Clone, Copy)]
/// #[repr(u8)]
/// pub enum Dir {
///     Left = 1,
///     Right = 2,
/// }
/// ```
///
/// ## Exportable Items
///
/// - Non-generic struct declarations. The struct must implement [Clone].
///   The macro implements the `NativeType`, `Trampoline`, `Downcast`,
///   `Upcast`, `Outputs` and `Element` traits for the type.
/// - Non-generic fieldless enum declarations with an integer `#[repr(...)]`
///   attribute. The enum must implement [Clone]. The enum values are trivial:
///   they cross the boundary as numbers of the representation type.
///
/// ## Export Options
///
/// The options are comma-separated. They can also be spread over several
/// `#[export(...)]` attributes of the same item.
///
/// - `name "<name>"`: The type name used in error messages and function
///   signatures. The default name is the Rust name of the type.
/// - `custom`: The macro does not implement the `Trampoline` trait, and the
///   user implements it manually. Not applicable to enums.
/// - `cells`: The vectors of this type cross the host boundary as cell arrays
///   of handles rather than `UInt64` arrays of handles. Not applicable to
///   enums or together with the `custom` option.
/// - `dump`: Prints the generated code as a compile-time error. Available in
///   debug builds only.
///
/// ```ignore
/// #[export(name "Point", cells)]
/// #[export(dump)]
/// #[derive(Clone)]
/// struct Vector2(f64, f64);
/// ```
#[proc_macro_attribute]
pub fn export(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    let attr_span = attr.span();

    let input = TokenStream::from_iter(
        TokenStream::from(quote_spanned!(attr_span=> #[export(#attr)]))
            .into_iter()
            .chain(item),
    );

    let output = parse_macro_input!(input as ExportItem);
    output.into()
}
