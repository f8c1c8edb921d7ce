use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemFn, ReturnType};

/// Helper function to get function name as string
pub fn get_fn_name(func: &ItemFn) -> String {
    func.sig.ident.to_string()
}

/// Wraps the original body of `func` in a closure that keeps the declared
/// return type, so `?` inside the body still converts into the function's
/// error type.
pub fn body_closure(func: &ItemFn) -> TokenStream2 {
    let block = &func.block;
    match &func.sig.output {
        ReturnType::Default => quote!(|| #block),
        ReturnType::Type(_, ty) => quote!(|| -> #ty #block),
    }
}
