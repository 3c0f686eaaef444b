use proc_macro::TokenStream;
use proc_macro_error::{abort, proc_macro_error};
use quote::quote;
use syn::{parse_macro_input, parse_quote, DeriveInput, Meta, NestedMeta, Path};

const NOTE: &str = "known capabilities: clone, clone_construct, clone_assign, default, \
                    no_move_construct, no_move_assign";

#[proc_macro_derive(Capabilities, attributes(capabilities))]
#[proc_macro_error]
pub fn capabilities(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let ident = ast.ident.clone();

    // Unions can't know which of their fields is live, so they can't copy themselves
    if let syn::Data::Union(data) = &ast.data {
        abort!(
            data.union_token,
            "union `{}` cannot describe its own lifecycle", ident;
            help = "wrap it in a struct that tracks the live field"
        )
    }

    let flags = Flags::parse(&ast);

    // Only ask for the std traits the requested capabilities actually use
    let (impl_generics, ty_generics, _) = ast.generics.split_for_impl();
    let this: syn::Type = parse_quote!(#ident #ty_generics);
    let mut bounds: Vec<syn::WherePredicate> = Vec::new();
    if flags.copy_construct || flags.copy_assign {
        bounds.push(parse_quote!(#this: ::core::clone::Clone));
    }
    if flags.default {
        bounds.push(parse_quote!(#this: ::core::default::Default));
    }
    let mut generics = ast.generics.clone();
    if !bounds.is_empty() {
        generics.make_where_clause().predicates.extend(bounds);
    }
    let where_clause = &generics.where_clause;

    let hooks = flags.hooks();
    let Flags {
        copy_construct,
        copy_assign,
        default,
        no_move_construct,
        no_move_assign,
    } = flags;
    let move_construct = !no_move_construct;
    let move_assign = !no_move_assign;

    quote! {
        impl #impl_generics ::allele::Capabilities for #ident #ty_generics #where_clause {
            const COPY_CONSTRUCTIBLE: bool = #copy_construct;
            const MOVE_CONSTRUCTIBLE: bool = #move_construct;
            const COPY_ASSIGNABLE: bool = #copy_assign;
            const MOVE_ASSIGNABLE: bool = #move_assign;
            const DEFAULT_CONSTRUCTIBLE: bool = #default;

            #hooks
        }
    }
    .into()
}

/// The capabilities requested through `#[capabilities(...)]`
#[derive(Default)]
struct Flags {
    copy_construct: bool,
    copy_assign: bool,
    default: bool,
    no_move_construct: bool,
    no_move_assign: bool,
}

impl Flags {
    fn parse(ast: &DeriveInput) -> Self {
        let mut flags = Flags::default();
        for attr in ast.attrs.iter().filter(|attr| attr.path.is_ident("capabilities")) {
            let list = match attr.parse_meta() {
                Ok(Meta::List(list)) => list,
                Ok(other) => abort!(other, "expected `#[capabilities(...)]`"; note = NOTE),
                Err(err) => abort!(attr, "{}", err; note = NOTE),
            };
            for nested in list.nested {
                match nested {
                    NestedMeta::Meta(Meta::Path(path)) => flags.set(&path),
                    other => abort!(other, "expected a capability name"; note = NOTE),
                }
            }
        }
        flags
    }

    fn set(&mut self, path: &Path) {
        let name = match path.get_ident() {
            Some(ident) => ident.to_string(),
            None => abort!(path, "expected a capability name"; note = NOTE),
        };
        match name.as_str() {
            "clone" => {
                self.copy_construct = true;
                self.copy_assign = true;
            }
            "clone_construct" => self.copy_construct = true,
            "clone_assign" => self.copy_assign = true,
            "default" => self.default = true,
            "no_move_construct" => self.no_move_construct = true,
            "no_move_assign" => self.no_move_assign = true,
            _ => abort!(path, "unknown capability `{}`", name; note = NOTE),
        }
    }

    /// Hook overrides for the enabled capabilities. Disabled ones keep the
    /// trait's `Unsupported` defaults.
    fn hooks(&self) -> proc_macro2::TokenStream {
        let mut hooks = proc_macro2::TokenStream::new();
        if self.copy_construct {
            hooks.extend(quote! {
                fn copy_construct(&self) -> ::core::result::Result<Self, ::allele::Unsupported> {
                    ::core::result::Result::Ok(::core::clone::Clone::clone(self))
                }
            });
        }
        if self.copy_assign {
            hooks.extend(quote! {
                fn copy_assign(
                    &mut self,
                    source: &Self,
                ) -> ::core::result::Result<(), ::allele::Unsupported> {
                    ::core::clone::Clone::clone_from(self, source);
                    ::core::result::Result::Ok(())
                }
            });
        }
        if self.default {
            hooks.extend(quote! {
                fn default_construct() -> ::core::result::Result<Self, ::allele::Unsupported> {
                    ::core::result::Result::Ok(::core::default::Default::default())
                }
            });
        }
        hooks
    }
}
