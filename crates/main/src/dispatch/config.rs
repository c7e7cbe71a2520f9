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

/// Configuration options of the dispatch [Module](crate::dispatch::Module).
///
/// The [Default] implementation of this object provides canonical
/// configuration options.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct ModuleConfig {
    /// If set to true, the module suggests a close registered name when the
    /// host calls an unknown class or function.
    ///
    /// The default value is `true`.
    pub suggestions: bool,

    /// The minimum Jaro-Winkler similarity between a misspelled name and a
    /// registered name for the latter to be suggested.
    ///
    /// The default value is `0.8`.
    pub suggestion_threshold: f64,

    /// If set to true, the module rejects the calls that request more outputs
    /// than the function produces. Otherwise, the excess output cells are
    /// left untouched.
    ///
    /// The default value is `false`.
    pub reject_excess_outputs: bool,

    /// The number of heap slots the module preallocates.
    ///
    /// The default value is `64`.
    pub heap_capacity: usize,
}

impl Default for ModuleConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleConfig {
    /// The default constructor for the configuration.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            suggestions: true,
            suggestion_threshold: 0.8,
            reject_excess_outputs: false,
            heap_capacity: 64,
        }
    }
}
