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

use quote::quote_spanned;
use syn::{spanned::Spanned, Error, Fields, ItemEnum, Result};

use crate::{
    export::ExportConfig,
    utils::{drain_attrs, find_repr},
};

pub fn export_item_enum(item: &mut ItemEnum) -> Result<ExportConfig> {
    let attrs = drain_attrs(&mut item.attrs)?;

    attrs.reject_custom()?;
    attrs.reject_cells()?;

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Generic types cannot be exported.",
        ));
    }

    if item.variants.is_empty() {
        return Err(Error::new(
            item.enum_token.span,
            "Empty enum types cannot be exported.",
        ));
    }

    for variant in &item.variants {
        if !matches!(&variant.fields, Fields::Unit) {
            return Err(Error::new(
                variant.fields.span(),
                "Enum variants with data cannot be exported.",
            ));
        }
    }

    let Some(repr) = find_repr(&item.attrs)? else {
        return Err(Error::new(
            item.enum_token.span,
            "Exported enum types require an integer representation: \
            #[repr(u8)], #[repr(i32)], etc.",
        ));
    };

    let ident = &item.ident;
    let span = ident.span();
    let name = attrs.name(ident);
    let variants = item.variants.iter().map(|variant| &variant.ident);

    Ok(ExportConfig {
        dump: attrs.dump,
        stream: Some(quote_spanned!(span=>
            ::hostbind::__export_enum!(#ident, #name, #repr, [#(#variants),*]);
        )),
    })
}
