use syn::{DeriveInput, Expr};

/// Find the `#[<attr>(id = ...)]` attribute on the input and return the id expression.
pub fn parse_id(ast: &DeriveInput, attr: &str) -> syn::Result<Expr> {
    let mut id = None;
    for a in ast.attrs.iter().filter(|a| a.path().is_ident(attr)) {
        a.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                id = Some(meta.value()?.parse::<Expr>()?);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported {attr} property")))
            }
        })?;
    }
    id.ok_or_else(|| {
        syn::Error::new_spanned(
            &ast.ident,
            format!("missing #[{attr}(id = ...)] attribute"),
        )
    })
}
