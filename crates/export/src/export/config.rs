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

use proc_macro2::{Span, TokenStream};
use quote::{quote, ToTokens};
use syn::{Item, Result};

// The code generated for an exported item.
pub struct ExportConfig {
    pub dump: Option<Span>,
    pub stream: Option<TokenStream>,
}

impl ExportConfig {
    pub fn export(self, item: &Item) -> Result<TokenStream> {
        let Some(span) = self.dump else {
            return Ok(match self.stream {
                Some(stream) => quote!(#item #stream),
                None => item.to_token_stream(),
            });
        };

        #[cfg(not(debug_assertions))]
        {
            let _ = item;

            return Err(syn::Error::new(
                span,
                "Export dump is available in debug builds only.",
            ));
        }

        #[cfg(debug_assertions)]
        {
            let item_string = pretty(item.to_token_stream());

            let generated_string = match self.stream {
                Some(stream) => pretty(stream),
                None => String::from("(nothing generated)"),
            };

            let lines = generated_string.lines().count();

            return Err(syn::Error::new(
                span,
                format!(
                    " -- Hostbind Export Dump ({lines} generated lines) --\n\n\
                    {item_string}\n{generated_string}",
                ),
            ));
        }
    }
}

#[cfg(debug_assertions)]
fn pretty(stream: TokenStream) -> String {
    match syn::parse2::<syn::File>(stream.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(_) => stream.to_string(),
    }
}
