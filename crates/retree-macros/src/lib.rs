use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitStr};

/// Turns a render function into a `retree_core::Component` constant.
///
/// ```ignore
/// #[component]
/// fn Counter(scope: &mut Scope<'_>, props: &Props) -> Element { .. }
///
/// #[component(name = "Row")]
/// fn TodoRow(scope: &mut Scope<'_>, props: &Props) -> Element { .. }
/// ```
///
/// The constant keeps the function's name and visibility. The display name
/// used in identity paths defaults to the function name.
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut name: Option<LitStr> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported component argument; expected `name = \"...\"`"))
        }
    });
    parse_macro_input!(attr with parser);
    let func = parse_macro_input!(item as ItemFn);

    match expand_component(func, name) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_component(func: ItemFn, name: Option<LitStr>) -> syn::Result<TokenStream2> {
    let sig = &func.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "components render synchronously and cannot be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "components cannot be generic",
        ));
    }
    if sig.inputs.len() != 2 {
        return Err(syn::Error::new(
            sig.ident.span(),
            "components take `(scope: &mut Scope<'_>, props: &Props)`",
        ));
    }

    let attrs = &func.attrs;
    let vis = &func.vis;
    let ident = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;
    let block = &func.block;
    let display = name
        .map(|name| name.value())
        .unwrap_or_else(|| ident.to_string());
    let display = LitStr::new(&display, Span::call_site());

    Ok(quote! {
        #(#attrs)*
        #[allow(non_upper_case_globals)]
        #vis const #ident: ::retree_core::Component = {
            fn render(#inputs) #output #block
            ::retree_core::Component::from_fn(#display, render)
        };
    })
}
