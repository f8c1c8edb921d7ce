/*
 * Procedural macros for function-level logging
 *
 * Attribute macros that wrap a function body with liblogger calls:
 * - log_entry_exit: logs when a function is entered and left
 * - measure_time: logs how long a function took, and whether it panicked
 *
 * Expanded code calls `liblogger::log_*!`, so the crate using these
 * attributes must depend on liblogger directly.
 */

extern crate proc_macro;

mod macro_utils;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, ItemFn};

use crate::macro_utils::{body_closure, get_fn_name};

/// Log entry and exit of a function
#[proc_macro_attribute]
pub fn log_entry_exit(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut input_fn = parse_macro_input!(input as ItemFn);
    let fn_name = get_fn_name(&input_fn);
    let body = body_closure(&input_fn);

    input_fn.block = Box::new(parse_quote!({
        liblogger::log_debug!(&format!("ENTRY: {}", #fn_name));

        let result = (#body)();

        liblogger::log_debug!(&format!("EXIT: {}", #fn_name));
        result
    }));

    TokenStream::from(quote!(#input_fn))
}

/// Measure execution time of a function
#[proc_macro_attribute]
pub fn measure_time(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut input_fn = parse_macro_input!(input as ItemFn);
    let fn_name = get_fn_name(&input_fn);
    let body = body_closure(&input_fn);

    input_fn.block = Box::new(parse_quote!({
        use std::panic::{catch_unwind, AssertUnwindSafe};
        use std::time::Instant;

        let start_time = Instant::now();

        let result = catch_unwind(AssertUnwindSafe(#body));

        let duration_us = start_time.elapsed().as_micros();

        match result {
            Ok(output) => {
                liblogger::log_info!(&format!("{} completed in {} us", #fn_name, duration_us), None);
                output
            },
            Err(panic_err) => {
                liblogger::log_error!(
                    &format!("{} panicked after {} us", #fn_name, duration_us),
                    None
                );
                std::panic::resume_unwind(panic_err);
            }
        }
    }));

    TokenStream::from(quote!(#input_fn))
}
