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

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute,
    Error,
    Ident,
    LitStr,
    Meta,
    Result,
    Token,
};

pub struct Attrs {
    pub dump: Option<Span>,
    pub name: Option<LitStr>,
    pub custom: Option<Span>,
    pub cells: Option<Span>,
}

impl Attrs {
    // Returns the explicit type name, or the Rust name of the type.
    pub fn name(&self, ident: &Ident) -> LitStr {
        match &self.name {
            Some(name) => name.clone(),
            None => LitStr::new(&ident.to_string(), ident.span()),
        }
    }

    pub fn reject_custom(&self) -> Result<()> {
        if let Some(span) = &self.custom {
            return Err(Error::new(*span, "Custom marker is not applicable here."));
        }

        Ok(())
    }

    pub fn reject_cells(&self) -> Result<()> {
        if let Some(span) = &self.cells {
            return Err(Error::new(*span, "Cells marker is not applicable here."));
        }

        Ok(())
    }

    fn append(&mut self, attr: Attr) -> Result<()> {
        match attr {
            Attr::Dump(span) => {
                if self.dump.is_some() {
                    return Err(Error::new(span, "Duplicate dump marker."));
                }

                self.dump = Some(span);
            }

            Attr::Name(name) => {
                if self.name.is_some() {
                    return Err(Error::new(name.span(), "Duplicate name option."));
                }

                if name.value().is_empty() {
                    return Err(Error::new(name.span(), "Type name must not be empty."));
                }

                self.name = Some(name);
            }

            Attr::Custom(span) => {
                if self.custom.is_some() {
                    return Err(Error::new(span, "Duplicate custom marker."));
                }

                self.custom = Some(span);
            }

            Attr::Cells(span) => {
                if self.cells.is_some() {
                    return Err(Error::new(span, "Duplicate cells marker."));
                }

                self.cells = Some(span);
            }
        }

        Ok(())
    }
}

/// Removes the `#[export(...)]` attributes from the item's attributes and
/// collects their options.
pub fn drain_attrs(attributes: &mut Vec<Attribute>) -> Result<Attrs> {
    let mut export_attributes = Vec::with_capacity(attributes.len().min(1));

    attributes.retain(|attribute| {
        if attribute.path().is_ident("export") {
            export_attributes.push(attribute.clone());
            return false;
        }

        true
    });

    let mut result = Attrs {
        dump: None,
        name: None,
        custom: None,
        cells: None,
    };

    for attribute in export_attributes {
        let attrs = match &attribute.meta {
            Meta::List(meta) => {
                meta.parse_args_with(Punctuated::<Attr, Token![,]>::parse_terminated)?
            }

            Meta::NameValue(meta) => {
                return Err(Error::new(
                    meta.eq_token.span,
                    "Name-value attribute format is not supported.",
                ))
            }

            Meta::Path(..) => continue,
        };

        for attr in attrs {
            result.append(attr)?;
        }
    }

    Ok(result)
}

/// Looks up the integer type of the `#[repr(...)]` attribute.
pub fn find_repr(attributes: &[Attribute]) -> Result<Option<Ident>> {
    let mut result = None;

    for attribute in attributes {
        if !attribute.path().is_ident("repr") {
            continue;
        }

        let metas = attribute.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;

        for meta in metas {
            let Meta::Path(path) = &meta else {
                continue;
            };

            let Some(ident) = path.get_ident() else {
                continue;
            };

            match ident.to_string().as_str() {
                "u8" | "u16" | "u32" | "u64" | "i8" | "i16" | "i32" | "i64" => {
                    result = Some(ident.clone());
                }

                "usize" | "isize" | "u128" | "i128" => {
                    return Err(Error::new(
                        ident.span(),
                        "This representation type does not have a host class.",
                    ));
                }

                _ => (),
            }
        }
    }

    Ok(result)
}

enum Attr {
    Dump(Span),
    Name(LitStr),
    Custom(Span),
    Cells(Span),
}

impl Parse for Attr {
    fn parse(input: ParseStream) -> Result<Self> {
        let lookahead = input.lookahead1();

        if lookahead.peek(keyword::dump) {
            let keyword = input.parse::<keyword::dump>()?;

            return Ok(Self::Dump(keyword.span));
        }

        if lookahead.peek(keyword::name) {
            let _ = input.parse::<keyword::name>()?;

            return Ok(Self::Name(input.parse::<LitStr>()?));
        }

        if lookahead.peek(keyword::custom) {
            let keyword = input.parse::<keyword::custom>()?;

            return Ok(Self::Custom(keyword.span));
        }

        if lookahead.peek(keyword::cells) {
            let keyword = input.parse::<keyword::cells>()?;

            return Ok(Self::Cells(keyword.span));
        }

        Err(lookahead.error())
    }
}

mod keyword {
    syn::custom_keyword!(dump);
    syn::custom_keyword!(name);
    syn::custom_keyword!(custom);
    syn::custom_keyword!(cells);
}
