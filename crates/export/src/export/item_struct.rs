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
use syn::{spanned::Spanned, Error, ItemStruct, Result};

use crate::{export::ExportConfig, utils::drain_attrs};

pub fn export_item_struct(item: &mut ItemStruct) -> Result<ExportConfig> {
    let attrs = drain_attrs(&mut item.attrs)?;

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Generic types cannot be exported.",
        ));
    }

    if let Some(where_clause) = &item.generics.where_clause {
        return Err(Error::new(
            where_clause.where_token.span,
            "Types with where clauses cannot be exported.",
        ));
    }

    let ident = &item.ident;
    let span = ident.span();
    let name = attrs.name(ident);

    let trampoline = match &attrs.custom {
        Some(_) => {
            attrs.reject_cells()?;

            None
        }

        None => {
            let use_cells = attrs.cells.map(|span| {
                quote_spanned!(span=> const USE_CELLS: bool = true;)
            });

            Some(quote_spanned!(span=>
                impl ::hostbind::runtime::Trampoline for #ident {
                    #use_cells
                }
            ))
        }
    };

    Ok(ExportConfig {
        dump: attrs.dump,
        stream: Some(quote_spanned!(span=>
            #trampoline

            ::hostbind::__export_boxed!(#ident, #name);
        )),
    })
}
