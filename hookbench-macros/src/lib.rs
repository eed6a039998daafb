//! hookbench Macros
//!
//! Procedural macro for test case registration.
//!
//! ## Macros
//!
//! - `#[hookbench::case]` - Register a test, optionally benchmarking one callable it uses

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{ItemFn, parse_macro_input};

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Parse a positive integer literal attribute: `attr = 42`
    pub fn positive_int(meta: &ParseNestedMeta) -> syn::Result<u64> {
        let value: syn::LitInt = meta.value()?.parse()?;
        let parsed: u64 = value.base10_parse()?;
        if parsed == 0 {
            return Err(syn::Error::new_spanned(value, "must be at least 1"));
        }
        Ok(parsed)
    }

    /// Parse a function path attribute: `attr = module::function`
    pub fn path(meta: &ParseNestedMeta) -> syn::Result<syn::Path> {
        meta.value()?.parse()
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Register a test case
///
/// The function takes the test's scope, and optionally its arguments, and
/// returns `anyhow::Result<()>`. Everything it wants measured must be called
/// through the scope.
///
/// # Example
///
/// ```ignore
/// fn calc_scope() -> Scope {
///     Scope::new().with_local("calc", Object::instance_of(&calculator()))
/// }
///
/// #[hookbench::case(scope = calc_scope)]
/// fn test_add(scope: &Scope) -> anyhow::Result<()> {
///     let sum = scope.call("calc.add", &Args::from_values([json!(1), json!(2)]))?;
///     anyhow::ensure!(sum == json!(3.0));
///     Ok(())
/// }
///
/// // Benchmark `calc.add` over 10 runs of the body
/// #[hookbench::case(
///     bench = "calc.add",
///     iterations = 10,
///     suite = "CalcTests",
///     scope = calc_scope,
///     setup = reset_calc,
///     teardown = reset_calc
/// )]
/// fn test_add_benchmarked(scope: &Scope, args: &Args) -> anyhow::Result<()> { ... }
/// ```
#[proc_macro_attribute]
pub fn case(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let func = parse_macro_input!(item as ItemFn);

    case_impl(args, func)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn case_impl(args: TokenStream2, func: ItemFn) -> Result<TokenStream2, syn::Error> {
    let takes_args = validate_signature(&func)?;
    let config = parse_case_config(args)?;

    let fn_name = &func.sig.ident;
    let fn_name_str = fn_name.to_string();
    let wrapper_name = format_ident!("_hookbench_body_{}", fn_name);

    let call = if takes_args {
        quote! { #fn_name(scope, args) }
    } else {
        quote! { #fn_name(scope) }
    };

    let suite = match &config.suite {
        Some(suite) => quote! { Some(#suite) },
        None => quote! { None },
    };

    let bench = match &config.bench {
        Some(target) => {
            let iterations = config
                .iterations
                .map(|n| quote! { Some(#n) })
                .unwrap_or(quote! { None });
            quote! {
                Some(::hookbench::BenchMarker {
                    target: #target,
                    iterations: #iterations,
                })
            }
        }
        None => quote! { None },
    };

    let scope_fn = match &config.scope {
        Some(path) => quote! { #path },
        None => quote! { ::hookbench::Scope::new },
    };

    let fixture = |path: &Option<syn::Path>| match path {
        Some(path) => quote! {
            Some(#path as fn(&::hookbench::Scope) -> ::hookbench::internal::anyhow::Result<()>)
        },
        None => quote! { None },
    };
    let setup_fn = fixture(&config.setup);
    let teardown_fn = fixture(&config.teardown);

    Ok(quote! {
        #func

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #wrapper_name(
            scope: &::hookbench::Scope,
            args: &::hookbench::Args,
        ) -> ::hookbench::internal::anyhow::Result<()> {
            let _ = args;
            #call
        }

        ::hookbench::internal::inventory::submit! {
            ::hookbench::TestDef {
                name: #fn_name_str,
                suite: #suite,
                file: file!(),
                line: line!(),
                module_path: module_path!(),
                bench: #bench,
                scope_fn: #scope_fn,
                setup_fn: #setup_fn,
                teardown_fn: #teardown_fn,
                body_fn: #wrapper_name,
            }
        }
    })
}

#[derive(Default)]
struct CaseConfig {
    bench: Option<String>,
    iterations: Option<u64>,
    suite: Option<String>,
    scope: Option<syn::Path>,
    setup: Option<syn::Path>,
    teardown: Option<syn::Path>,
}

fn parse_case_config(args: TokenStream2) -> Result<CaseConfig, syn::Error> {
    let mut config = CaseConfig::default();

    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "bench" => {
                let target = attr::string(&meta)?;
                if target.split('.').any(|segment| segment.trim().is_empty()) {
                    return Err(meta.error("bench target must be a dotted path like \"calc.add\""));
                }
                config.bench = Some(target);
            }
            "iterations" => config.iterations = Some(attr::positive_int(&meta)?),
            "suite" => config.suite = Some(attr::string(&meta)?),
            "scope" => config.scope = Some(attr::path(&meta)?),
            "setup" => config.setup = Some(attr::path(&meta)?),
            "teardown" => config.teardown = Some(attr::path(&meta)?),
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });

    syn::parse::Parser::parse2(parser, args)?;

    if config.iterations.is_some() && config.bench.is_none() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "hookbench: `iterations` requires `bench = \"...\"`",
        ));
    }

    Ok(config)
}

/// Accepts `fn(&Scope)` or `fn(&Scope, &Args)`; returns whether args are taken
fn validate_signature(func: &ItemFn) -> syn::Result<bool> {
    if func.sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            &func.sig,
            "hookbench: test cases cannot be async",
        ));
    }
    match func.sig.inputs.len() {
        1 => Ok(false),
        2 => Ok(true),
        _ => Err(syn::Error::new_spanned(
            &func.sig,
            "hookbench: Function must take `&Scope` and optionally `&Args`",
        )),
    }
}
