mod attr;

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned, ToTokens};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};
use syn::{
    ext::IdentExt, Error, Field, FnArg, GenericArgument, Generics, Ident, ImplItem, ImplItemFn, Item, ItemEnum,
    ItemImpl, ItemStruct, Pat, PatType, PathArguments, ReturnType, Signature, Type, Visibility,
};

use self::attr::{take_dependency, take_marker, take_service_implementation, DependencyArgs};

pub(crate) fn expand(mut item: Item) -> syn::Result<TokenStream> {
    let (name, descriptor) = match &mut item {
        Item::Struct(item) => (item.ident.clone(), expand_struct(item)?),
        Item::Enum(item) => (item.ident.clone(), expand_enum(item)?),
        Item::Impl(item) => (self_ident(item)?, expand_impl(item)?),
        item => {
            return Err(Error::new_spanned(
                item,
                "`injectable` expects a struct, an enum or an impl block",
            ))
        }
    };

    let entry = generate_entry(&name, &item, &descriptor);
    Ok(quote! {
        #item
        #entry
    })
}

fn generate_entry(name: &Ident, item: &Item, descriptor: &TokenStream) -> TokenStream {
    let mut hasher = DefaultHasher::new();
    item.to_token_stream().to_string().hash(&mut hasher);
    let entry_name = format_ident!(
        "__STEVEDORE_ENTRY_{}_{:X}",
        name.unraw().to_string().to_uppercase(),
        hasher.finish(),
        span = name.span()
    );

    quote_spanned! { name.span() =>
        #[::stevedore::__private::distributed_slice(::stevedore::__private::TYPE_ENTRIES)]
        #[linkme(crate = ::stevedore::__private::linkme)]
        static #entry_name: fn() -> ::stevedore::__private::TypeEntry = || {
            ::stevedore::__private::TypeEntry::new(::core::env!("CARGO_CRATE_NAME"), #descriptor)
        };
    }
}

fn reject_generics(generics: &Generics) -> syn::Result<()> {
    if generics.params.is_empty() {
        Ok(())
    } else {
        Err(Error::new_spanned(generics, "`injectable` doesn't support generic types"))
    }
}

fn self_ident(item: &ItemImpl) -> syn::Result<Ident> {
    if let Type::Path(path) = &*item.self_ty {
        if let Some(segment) = path.path.segments.last() {
            if path.qself.is_none() && segment.arguments.is_none() {
                return Ok(segment.ident.clone());
            }
        }
    }
    Err(Error::new_spanned(
        &item.self_ty,
        "`injectable` expects an impl block of a non-generic named type",
    ))
}

/// The `T` of `Wrapper<T>`, whatever the path to `Wrapper`.
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if path.qself.is_some() || segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    let mut arguments = arguments.args.iter();
    match (arguments.next(), arguments.next()) {
        (Some(GenericArgument::Type(inner)), None) => Some(inner),
        _ => None,
    }
}

/// The shared type of an `Arc<T>` or `Option<Arc<T>>` field and whether it's optional.
fn dependency_type(ty: &Type) -> Option<(&Type, bool)> {
    if let Some(inner) = generic_argument(ty, "Arc") {
        return Some((inner, false));
    }
    generic_argument(ty, "Option")
        .and_then(|inner| generic_argument(inner, "Arc"))
        .map(|inner| (inner, true))
}

fn expand_struct(item: &mut ItemStruct) -> syn::Result<TokenStream> {
    reject_generics(&item.generics)?;
    let implementation = take_service_implementation(&mut item.attrs)?.map(|args| args.to_attribute());

    let ident = &item.ident;
    let mut properties = Vec::new();
    for field in item.fields.iter_mut() {
        let Some(dependency) = take_dependency(&mut field.attrs)? else {
            continue;
        };
        properties.push(property(ident, field, &dependency)?);
    }

    Ok(quote! {
        ::stevedore::TypeDescriptor::builder::<#ident>()
            .kind(::stevedore::TypeKind::Struct)
            #implementation
            #(#properties)*
            .build()
    })
}

fn property(owner: &Ident, field: &Field, dependency: &DependencyArgs) -> syn::Result<TokenStream> {
    let Some(name) = &field.ident else {
        return Err(Error::new_spanned(field, "`dependency` requires a named field"));
    };
    let Some((inner, optional)) = dependency_type(&field.ty) else {
        return Err(Error::new_spanned(
            &field.ty,
            "a dependency field must be `Arc<T>` or `Option<Arc<T>>`",
        ));
    };

    let property_name = name.unraw().to_string();
    let value = if optional {
        quote! { ::core::option::Option::Some(value) }
    } else {
        quote! { value }
    };
    let public = !matches!(field.vis, Visibility::Inherited);
    let dependency = dependency.to_attribute();

    Ok(quote! {
        .property_with(
            ::stevedore::descriptor::PropertyDescriptor::new(
                #property_name,
                |this: &mut #owner, value: ::std::sync::Arc<#inner>| {
                    this.#name = #value;
                },
            )
            .public(#public)
            .attribute(#dependency)
        )
    })
}

fn expand_enum(item: &mut ItemEnum) -> syn::Result<TokenStream> {
    reject_generics(&item.generics)?;
    let implementation = take_service_implementation(&mut item.attrs)?.map(|args| args.to_attribute());

    for variant in &item.variants {
        if variant
            .fields
            .iter()
            .any(|field| field.attrs.iter().any(|attr| attr.path().is_ident("dependency")))
        {
            return Err(Error::new_spanned(variant, "`dependency` isn't supported on enum variants"));
        }
    }

    let ident = &item.ident;
    Ok(quote! {
        ::stevedore::TypeDescriptor::builder::<#ident>()
            .kind(::stevedore::TypeKind::Enum)
            #implementation
            .build()
    })
}

fn expand_impl(item: &mut ItemImpl) -> syn::Result<TokenStream> {
    reject_generics(&item.generics)?;
    let self_ty = &item.self_ty;

    if let Some((negative, path, _)) = &item.trait_ {
        if negative.is_some() {
            return Err(Error::new_spanned(path, "`injectable` doesn't support negative impls"));
        }
        return Ok(quote! {
            ::stevedore::TypeDescriptor::builder::<#self_ty>()
                .implements::<dyn #path>(|it| it)
                .build()
        });
    }

    let mut members = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(function) = impl_item else {
            continue;
        };
        if let Some(member) = impl_member(self_ty, function)? {
            members.push(member);
        }
    }

    Ok(quote! {
        ::stevedore::TypeDescriptor::builder::<#self_ty>()
            #(#members)*
            .build()
    })
}

fn typed_inputs(sig: &Signature) -> impl Iterator<Item = &PatType> {
    sig.inputs.iter().filter_map(|input| match input {
        FnArg::Typed(input) => Some(input),
        FnArg::Receiver(_) => None,
    })
}

/// Names of the parameters if all of them are `Arc<_>`.
fn shared_parameters(sig: &Signature) -> Option<Vec<String>> {
    typed_inputs(sig)
        .enumerate()
        .map(|(position, input)| {
            generic_argument(&input.ty, "Arc")?;
            Some(match &*input.pat {
                Pat::Ident(pat) => pat.ident.unraw().to_string(),
                _ => format!("arg{position}"),
            })
        })
        .collect()
}

fn returns_self(output: &ReturnType, self_ty: &Type) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    match &**ty {
        Type::Path(path) if path.qself.is_none() && path.path.is_ident("Self") => true,
        ty => ty.to_token_stream().to_string() == self_ty.to_token_stream().to_string(),
    }
}

/// Strips `#[dependency]` from the parameters and returns the matching descriptor calls.
fn parameter_dependencies(sig: &mut Signature) -> syn::Result<Vec<TokenStream>> {
    let mut dependencies = Vec::new();
    let inputs = sig.inputs.iter_mut().filter_map(|input| match input {
        FnArg::Typed(input) => Some(input),
        FnArg::Receiver(_) => None,
    });

    for (position, input) in inputs.enumerate() {
        if let Some(dependency) = take_dependency(&mut input.attrs)? {
            let dependency = dependency.to_attribute();
            dependencies.push(quote! { .parameter_attribute(#position, #dependency) });
        }
    }
    Ok(dependencies)
}

fn impl_member(self_ty: &Type, function: &mut ImplItemFn) -> syn::Result<Option<TokenStream>> {
    let constructor_marker = take_marker(&mut function.attrs, "injection_constructor");
    let method_marker = take_marker(&mut function.attrs, "injection_method");
    let dependencies = parameter_dependencies(&mut function.sig)?;

    let sig = &function.sig;
    let name = &sig.ident;
    let member_name = name.unraw().to_string();
    let public = !matches!(function.vis, Visibility::Inherited);
    let plain = sig.asyncness.is_none()
        && sig.unsafety.is_none()
        && sig.abi.is_none()
        && sig.variadic.is_none()
        && sig.generics.params.is_empty();
    let parameters = shared_parameters(sig).filter(|_| plain);

    match sig.receiver() {
        None => {
            if let Some(marker) = method_marker {
                return Err(Error::new_spanned(marker, "`injection_method` requires a `&mut self` receiver"));
            }
            let Some(parameters) = parameters.filter(|_| returns_self(&sig.output, self_ty)) else {
                return match constructor_marker {
                    Some(_) => Err(Error::new_spanned(
                        sig,
                        "an injection constructor must return `Self` and take only `Arc<_>` parameters",
                    )),
                    None => Ok(None),
                };
            };
            let marker = constructor_marker.map(|_| quote! { .attribute(::stevedore::attributes::InjectionConstructor) });

            Ok(Some(quote! {
                .constructor_with(
                    ::stevedore::descriptor::ConstructorDescriptor::new::<#self_ty, _, _>(#member_name, <#self_ty>::#name)
                        .parameter_names(&[#(#parameters),*])
                        .public(#public)
                        #marker
                        #(#dependencies)*
                )
            }))
        }
        Some(receiver) => {
            if let Some(marker) = constructor_marker {
                return Err(Error::new_spanned(marker, "`injection_constructor` can't be used on a method"));
            }
            let Some(marker) = method_marker else {
                return Ok(None);
            };
            let mutable = receiver.reference.is_some() && receiver.mutability.is_some();
            let Some(parameters) = parameters.filter(|_| mutable) else {
                return Err(Error::new_spanned(
                    marker,
                    "an injection method must take `&mut self` and only `Arc<_>` parameters",
                ));
            };

            Ok(Some(quote! {
                .method_with(
                    ::stevedore::descriptor::MethodDescriptor::new::<#self_ty, _, _>(#member_name, <#self_ty>::#name)
                        .parameter_names(&[#(#parameters),*])
                        .public(#public)
                        .attribute(::stevedore::attributes::InjectionMethod)
                        #(#dependencies)*
                )
            }))
        }
    }
}
