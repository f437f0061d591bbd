mod action;
mod component;
mod id;

use proc_macro::TokenStream;

#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}

#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(item: TokenStream) -> TokenStream {
    action::derive_action(item)
}
