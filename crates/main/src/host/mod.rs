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

//! An in-process model of the host environment's value cells.
//!
//! The host environment represents every value as a [HostCell]: a
//! two-dimensional array tagged with a dynamic [ClassId]. Numeric cells hold
//! typed element vectors, character cells hold text, cell arrays hold nested
//! cells, and struct cells hold a record of named fields.
//!
//! Opaque object handles are ordinary `1x1` [UInt64](ClassId::UInt64) cells.
//! The host never interprets them and passes them back unmodified.
//!
//! An embedding adapts its real host API onto this model: it converts the
//! host's native values into HostCells before calling the
//! [dispatch](crate::dispatch) entry point, and converts the produced
//! output cells back afterwards.

mod cell;
mod class;

pub use crate::host::{
    cell::{HostCell, HostData},
    class::{ClassId, HostScalar},
};
