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

use proc_macro2::TokenStream;
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    Error,
    Item,
    Result,
};

use crate::export::{item_enum::export_item_enum, item_struct::export_item_struct};

pub struct ExportItem(TokenStream);

impl Parse for ExportItem {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut item = input.parse::<Item>()?;

        let config = match &mut item {
            Item::Struct(item) => export_item_struct(item),

            Item::Enum(item) => export_item_enum(item),

            Item::Union(item) => Err(Error::new(
                item.union_token.span,
                "Union types cannot be exported.",
            )),

            Item::Type(item) => Err(Error::new(
                item.type_token.span,
                "Type aliases cannot be exported. Export the aliased type instead.",
            )),

            Item::Fn(item) => Err(Error::new(
                item.sig.fn_token.span,
                "Functions cannot be exported. Register them in a ClassRegistry instead.",
            )),

            Item::Impl(item) => Err(Error::new(
                item.impl_token.span,
                "Implementation blocks cannot be exported. Register the methods in a \
                ClassRegistry instead.",
            )),

            other => Err(Error::new(
                other.span(),
                "Only struct and enum types can be exported.",
            )),
        };

        Ok(Self(config?.export(&item)?))
    }
}

impl From<ExportItem> for proc_macro::TokenStream {
    #[inline(always)]
    fn from(value: ExportItem) -> Self {
        value.0.into()
    }
}
