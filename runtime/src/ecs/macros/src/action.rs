use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::id::parse_id;

pub fn derive_action(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let struct_name = &ast.ident;

    let id = match parse_id(&ast, "action") {
        Ok(id) => id,
        Err(err) => return err.to_compile_error().into(),
    };

    TokenStream::from(quote! {
        impl ::rusty_ecsact::ecs::Action for #struct_name {
            const ID: ::rusty_ecsact::ecs::Id = ::rusty_ecsact::ecs::Id::new(#id);
        }

        ::rusty_ecsact::inventory::submit! {
            ::rusty_ecsact::ecs::registry::Registration::action::<#struct_name>()
        }
    })
}
