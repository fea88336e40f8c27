use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    bracketed,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute, Error, Expr, LitStr, Token, Type,
};

use crate::attr_parsing::{combine_attribute, parse_assignment_attribute, parse_attrs, Combine};

pub(crate) mod kw {
    syn::custom_keyword!(interfaces);
    syn::custom_keyword!(name);
    syn::custom_keyword!(lifetime);
    syn::custom_keyword!(inferred);
}

pub(crate) struct TypeList(Punctuated<Type, Token![,]>);

impl Parse for TypeList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        bracketed!(content in input);
        Ok(Self(content.parse_terminated(Type::parse, Token![,])?))
    }
}

/// `#[service_implementation(interfaces = [..], name = "..", lifetime = ..)]`
#[derive(Default)]
pub(crate) struct ServiceImplementationArgs {
    interfaces: Option<(kw::interfaces, TypeList)>,
    name: Option<(kw::name, LitStr)>,
    lifetime: Option<(kw::lifetime, Expr)>,
}

impl ServiceImplementationArgs {
    pub(crate) fn to_attribute(&self) -> TokenStream {
        let interfaces = self
            .interfaces
            .iter()
            .flat_map(|(_, TypeList(interfaces))| interfaces)
            .map(|interface| quote! { .interface::<#interface>() });
        let name = self.name.as_ref().map(|(_, name)| quote! { .named(#name) });
        let lifetime = self.lifetime.as_ref().map(|(_, lifetime)| {
            quote! {
                .lifetime({
                    #[allow(unused_imports)]
                    use ::stevedore::Lifetime::*;
                    #lifetime
                })
            }
        });

        quote! {
            .attribute(::stevedore::attributes::ServiceImplementation::new() #(#interfaces)* #name #lifetime)
        }
    }
}

impl Parse for ServiceImplementationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Self::default();

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::interfaces) {
                parse_assignment_attribute(input, &mut args.interfaces)?;
            } else if lh.peek(kw::name) {
                parse_assignment_attribute(input, &mut args.name)?;
            } else if lh.peek(kw::lifetime) {
                parse_assignment_attribute(input, &mut args.lifetime)?;
            } else {
                return Err(lh.error());
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

impl Combine for ServiceImplementationArgs {
    fn combine(mut self, other: Self) -> syn::Result<Self> {
        let Self {
            interfaces,
            name,
            lifetime,
        } = other;
        combine_attribute(&mut self.interfaces, interfaces)?;
        combine_attribute(&mut self.name, name)?;
        combine_attribute(&mut self.lifetime, lifetime)?;
        Ok(self)
    }
}

/// `#[dependency]`, `#[dependency("..")]`, `#[dependency(name = "..")]` or `#[dependency(inferred)]`
#[derive(Default)]
pub(crate) enum DependencyArgs {
    #[default]
    Unnamed,
    Named(LitStr),
    Inferred,
}

impl DependencyArgs {
    pub(crate) fn to_attribute(&self) -> TokenStream {
        match self {
            Self::Unnamed => quote! { ::stevedore::attributes::Dependency::new() },
            Self::Named(name) => quote! { ::stevedore::attributes::Dependency::named(#name) },
            Self::Inferred => quote! { ::stevedore::attributes::Dependency::inferred() },
        }
    }
}

impl Parse for DependencyArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let args = if input.is_empty() {
            Self::Unnamed
        } else if input.peek(LitStr) {
            Self::Named(input.parse()?)
        } else {
            let lh = input.lookahead1();
            if lh.peek(kw::name) {
                let mut name = None;
                parse_assignment_attribute::<kw::name, LitStr>(input, &mut name)?;
                match name {
                    Some((_, name)) => Self::Named(name),
                    None => Self::Unnamed,
                }
            } else if lh.peek(kw::inferred) {
                input.parse::<kw::inferred>()?;
                Self::Inferred
            } else {
                return Err(lh.error());
            }
        };

        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        if !input.is_empty() {
            return Err(input.error("unexpected argument"));
        }

        Ok(args)
    }
}

impl Combine for DependencyArgs {
    fn combine(self, _: Self) -> syn::Result<Self> {
        Err(Error::new(Span::call_site(), "`dependency` specified more than once"))
    }
}

fn take<T>(ident: &str, attrs: &mut Vec<Attribute>) -> syn::Result<Option<T>>
where
    T: Combine + Parse + Default,
{
    let parsed = parse_attrs::<T>(ident, attrs);
    attrs.retain(|attr| !attr.path().is_ident(ident));
    parsed.transpose().map_err(|(err, attr)| Error::new_spanned(attr, err))
}

pub(crate) fn take_service_implementation(attrs: &mut Vec<Attribute>) -> syn::Result<Option<ServiceImplementationArgs>> {
    take("service_implementation", attrs)
}

pub(crate) fn take_dependency(attrs: &mut Vec<Attribute>) -> syn::Result<Option<DependencyArgs>> {
    take("dependency", attrs)
}

/// Removes the marker `ident` and returns its first occurrence.
pub(crate) fn take_marker(attrs: &mut Vec<Attribute>, ident: &str) -> Option<Attribute> {
    let marker = attrs.iter().find(|attr| attr.path().is_ident(ident)).cloned();
    attrs.retain(|attr| !attr.path().is_ident(ident));
    marker
}
