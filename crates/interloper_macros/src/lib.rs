//! Procedural macros for interloper
//!
//! This crate provides procedural macros for the interloper hook library:
//! - `#[hook]`: Attribute macro turning a function into a named [`Hook`] type
//! - `#[operation]`: Attribute macro turning a function into an [`Operation`] type
//!
//! These macros are re-exported by the main `interloper` crate and should
//! typically be used through that interface.
//!
//! [`Hook`]: https://docs.rs/interloper/latest/interloper/hooks/trait.Hook.html
//! [`Operation`]: https://docs.rs/interloper/latest/interloper/operation/trait.Operation.html
//!
//! # Examples
//!
//! ## Hook
//!
//! ```ignore
//! use interloper::prelude::*;
//!
//! #[hook(name = "require-amount")]
//! fn require_amount(_this: &mut Object<i64>, args: &mut Value) -> Result<(), InterloperError> {
//!     if args["amount"].is_null() {
//!         return Err(InterloperError::Hook("missing amount".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! account.before_hook("deposit", require_amount())?;
//! ```
//!
//! ## Hook without a result
//!
//! ```ignore
//! use interloper::prelude::*;
//!
//! #[hook]
//! fn count_calls(this: &mut Object<u64>, _args: &mut Value) {
//!     *this.state_mut() += 1;
//! }
//! ```
//!
//! ## Operation
//!
//! ```ignore
//! use interloper::prelude::*;
//!
//! #[operation]
//! fn deposit(this: &mut Object<i64>, args: &mut Value, _next: Next<'_, i64>) -> Result<Value, InterloperError> {
//!     *this.state_mut() += args["amount"].as_i64().unwrap_or_default();
//!     Ok(Value::from(*this.state()))
//! }
//!
//! account.define_operation(DepositOperation::NAME, deposit());
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse::Parser, parse_macro_input, punctuated::Punctuated, Expr, ExprLit, FnArg,
    GenericArgument, Ident, ItemFn, Lit, Meta, PathArguments, ReturnType, Token, Type,
};

/// Arguments parsed from the `#[hook(...)]` and `#[operation(...)]` attributes
struct MacroArgs {
    name: Option<String>,
}

impl MacroArgs {
    /// Parse arguments from the attribute token stream
    fn parse(attr: TokenStream2) -> syn::Result<Self> {
        let mut name = None;

        if !attr.is_empty() {
            let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
            let metas = parser.parse2(attr)?;

            for meta in metas {
                match meta {
                    Meta::NameValue(nv) => {
                        let ident = nv
                            .path
                            .get_ident()
                            .ok_or_else(|| {
                                syn::Error::new_spanned(&nv.path, "Expected simple identifier")
                            })?
                            .to_string();

                        match ident.as_str() {
                            "name" => {
                                if let Expr::Lit(ExprLit {
                                    lit: Lit::Str(lit), ..
                                }) = &nv.value
                                {
                                    name = Some(lit.value());
                                } else {
                                    return Err(syn::Error::new_spanned(
                                        &nv.value,
                                        "Expected string literal for name",
                                    ));
                                }
                            }
                            _ => {
                                return Err(syn::Error::new_spanned(
                                    &nv.path,
                                    format!("Unknown attribute '{}'", ident),
                                ));
                            }
                        }
                    }
                    _ => {
                        return Err(syn::Error::new_spanned(
                            &meta,
                            "Expected name = \"...\" format",
                        ));
                    }
                }
            }
        }

        Ok(Self { name })
    }
}

/// The two kinds of item the macros generate
#[derive(Clone, Copy)]
enum Kind {
    Hook,
    Operation,
}

impl Kind {
    fn attribute(self) -> &'static str {
        match self {
            Kind::Hook => "#[hook]",
            Kind::Operation => "#[operation]",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Kind::Hook => "Hook",
            Kind::Operation => "Operation",
        }
    }

    fn arity(self) -> usize {
        match self {
            Kind::Hook => 2,
            Kind::Operation => 3,
        }
    }

    fn signature(self) -> &'static str {
        match self {
            Kind::Hook => "fn(&mut Object<S>, &mut Value)",
            Kind::Operation => "fn(&mut Object<S>, &mut Value, Next<'_, S>)",
        }
    }
}

/// Convert a snake_case function name to a CamelCase type name with `suffix`
fn type_name(fn_name: &Ident, suffix: &str) -> Ident {
    let camel = fn_name
        .to_string()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<String>();
    Ident::new(&(camel + suffix), Span::call_site())
}

/// Parameter types of the function, in order
fn param_types(func: &ItemFn, kind: Kind) -> syn::Result<Vec<Type>> {
    let mut types = Vec::new();

    for input in &func.sig.inputs {
        match input {
            FnArg::Typed(pat_type) => types.push((*pat_type.ty).clone()),
            FnArg::Receiver(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    format!("Self parameter not supported in {}", kind.attribute()),
                ));
            }
        }
    }

    if types.len() != kind.arity() {
        return Err(syn::Error::new_spanned(
            &func.sig.inputs,
            format!("{} requires the signature {}", kind.attribute(), kind.signature()),
        ));
    }

    Ok(types)
}

/// Extract `S` from `&mut Object<S>`
fn state_type(ty: &Type, kind: Kind) -> syn::Result<Type> {
    let error = || {
        syn::Error::new_spanned(
            ty,
            format!("{} requires the first parameter to be &mut Object<S>", kind.attribute()),
        )
    };

    let Type::Reference(reference) = ty else {
        return Err(error());
    };
    if reference.mutability.is_none() {
        return Err(error());
    }
    first_type_argument(&reference.elem, "Object").ok_or_else(error)
}

/// First generic type argument of a path type whose last segment is `name`
fn first_type_argument(ty: &Type, name: &str) -> Option<Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == name {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    return args.args.iter().find_map(|arg| match arg {
                        GenericArgument::Type(inner) => Some(inner.clone()),
                        _ => None,
                    });
                }
            }
        }
    }
    None
}

/// Check if a type matches a specific type name
fn matches_type_name(ty: &Type, name: &str) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == name;
        }
    }
    false
}

/// Validate the parts of the signature shared by both macros
fn validate_function(func: &ItemFn, kind: Kind) -> syn::Result<()> {
    if let Some(asyncness) = func.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            format!("{} does not support async functions", kind.attribute()),
        ));
    }

    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            format!("{} does not support generic functions", kind.attribute()),
        ));
    }

    match (&func.sig.output, kind) {
        (ReturnType::Default, Kind::Hook) => Ok(()),
        (ReturnType::Type(_, ty), _) if matches_type_name(ty, "Result") => Ok(()),
        (output, Kind::Hook) => Err(syn::Error::new_spanned(
            output,
            "#[hook] requires return type () or Result<(), E>",
        )),
        (output, Kind::Operation) => Err(syn::Error::new_spanned(
            output,
            "#[operation] requires return type Result<Value, E>",
        )),
    }
}

/// Attribute macro for defining hooks
///
/// This macro transforms a function into a unit struct implementing
/// `interloper::hooks::Hook` and a constructor, with the same name as the
/// function, returning `Arc<dyn Hook<S>>`.
///
/// # Arguments
///
/// * `name` - Optional hook name reported by `Hook::name` (defaults to function name)
///
/// # Requirements
///
/// * Signature `fn(&mut Object<S>, &mut Value)`
/// * Return type `()` or `Result<(), E>` where `E: Into<InterloperError>`
/// * Not async, not generic
///
/// # Example
///
/// ```ignore
/// use interloper::prelude::*;
///
/// #[hook]
/// fn audit(this: &mut Object<Vec<String>>, args: &mut Value) {
///     this.state_mut().push(args.to_string());
/// }
///
/// let hook = audit();
/// assert_eq!(hook.name(), "audit");
/// ```
#[proc_macro_attribute]
pub fn hook(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    match expand(attr.into(), input_fn, Kind::Hook) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Attribute macro for defining operation bodies
///
/// This macro transforms a function into a unit struct implementing
/// `interloper::operation::Operation`, with an associated `NAME` constant,
/// and a constructor, with the same name as the function, returning
/// `Arc<dyn Operation<S>>`.
///
/// # Arguments
///
/// * `name` - Optional operation name for `NAME` (defaults to function name)
///
/// # Requirements
///
/// * Signature `fn(&mut Object<S>, &mut Value, Next<'_, S>)`
/// * Return type `Result<Value, E>` where `E: Into<InterloperError>`
/// * Not async, not generic
///
/// # Example
///
/// ```ignore
/// use interloper::prelude::*;
///
/// #[operation(name = "close")]
/// fn close_account(this: &mut Object<bool>, _args: &mut Value, _next: Next<'_, bool>) -> Result<Value, InterloperError> {
///     *this.state_mut() = false;
///     Ok(Value::Null)
/// }
///
/// scope.define_operation(CloseAccountOperation::NAME, close_account());
/// ```
#[proc_macro_attribute]
pub fn operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    match expand(attr.into(), input_fn, Kind::Operation) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Core expansion logic shared by both macros
fn expand(attr: TokenStream2, input_fn: ItemFn, kind: Kind) -> syn::Result<TokenStream2> {
    validate_function(&input_fn, kind)?;
    let args = MacroArgs::parse(attr)?;

    let types = param_types(&input_fn, kind)?;
    let state = state_type(&types[0], kind)?;

    let fn_name = &input_fn.sig.ident;
    let name = args.name.unwrap_or_else(|| fn_name.to_string());
    let struct_name = type_name(fn_name, kind.suffix());
    let vis = &input_fn.vis;
    let docs = input_fn
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"));

    // The original function, kept intact as a local item of the trait method
    let mut inner = input_fn.clone();
    inner.sig.ident = Ident::new("inner", Span::call_site());
    inner.vis = syn::Visibility::Inherited;
    inner.attrs.clear();

    let returns_result = !matches!(input_fn.sig.output, ReturnType::Default);

    let (this_ty, args_ty) = (&types[0], &types[1]);

    let generated = match kind {
        Kind::Hook => {
            let call = if returns_result {
                quote! { inner(this, args).map_err(::core::convert::Into::into) }
            } else {
                quote! {
                    inner(this, args);
                    ::core::result::Result::Ok(())
                }
            };

            quote! {
                #[doc = concat!("Hook generated from `", stringify!(#fn_name), "`")]
                #vis struct #struct_name;

                impl ::interloper::hooks::Hook<#state> for #struct_name {
                    fn name(&self) -> &str {
                        #name
                    }

                    fn call(
                        &self,
                        this: #this_ty,
                        args: #args_ty,
                    ) -> ::interloper::error::Result<()> {
                        #inner
                        #call
                    }
                }

                #(#docs)*
                #vis fn #fn_name() -> ::std::sync::Arc<dyn ::interloper::hooks::Hook<#state>> {
                    ::std::sync::Arc::new(#struct_name)
                }
            }
        }
        Kind::Operation => {
            let next_ty = &types[2];
            if !matches_type_name(next_ty, "Next") {
                return Err(syn::Error::new_spanned(
                    next_ty,
                    "#[operation] requires the third parameter to be Next<'_, S>",
                ));
            }

            quote! {
                #[doc = concat!("Operation generated from `", stringify!(#fn_name), "`")]
                #vis struct #struct_name;

                impl #struct_name {
                    /// Name to define the operation under
                    #vis const NAME: &'static str = #name;
                }

                impl ::interloper::operation::Operation<#state> for #struct_name {
                    fn call(
                        &self,
                        this: #this_ty,
                        args: #args_ty,
                        next: #next_ty,
                    ) -> ::interloper::error::Result<::interloper::Value> {
                        #inner
                        inner(this, args, next).map_err(::core::convert::Into::into)
                    }
                }

                #(#docs)*
                #vis fn #fn_name() -> ::std::sync::Arc<dyn ::interloper::operation::Operation<#state>> {
                    ::std::sync::Arc::new(#struct_name)
                }
            }
        }
    };

    Ok(generated)
}
