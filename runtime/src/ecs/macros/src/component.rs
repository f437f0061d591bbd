use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::id::parse_id;

pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let struct_name = &ast.ident;

    let id = match parse_id(&ast, "component") {
        Ok(id) => id,
        Err(err) => return err.to_compile_error().into(),
    };

    // Use ::rusty_ecsact paths which work both inside and outside the crate.
    // Inside the crate, this works because of `extern crate self as rusty_ecsact;` in lib.rs
    TokenStream::from(quote! {
        impl ::rusty_ecsact::ecs::Component for #struct_name {
            const ID: ::rusty_ecsact::ecs::Id = ::rusty_ecsact::ecs::Id::new(#id);
        }

        ::rusty_ecsact::inventory::submit! {
            ::rusty_ecsact::ecs::registry::Registration::component::<#struct_name>()
        }
    })
}
