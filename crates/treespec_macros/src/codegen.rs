//! Code generation: turns the DSL AST into `TestTree` construction calls.
//!
//! Everything is emitted as flat `let` statements in one block, so an `as`
//! binding is visible to every later item regardless of nesting.

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

use crate::dsl::*;

// ============================================================================
// Public entry point
// ============================================================================

pub fn generate(tree: TreeDef) -> TokenStream {
    let mut gen = Generator {
        tree: Ident::new("__tree", Span::mixed_site()),
        next_group: 0,
    };

    let tree_ident = gen.tree.clone();
    let root = gen.fresh_group();
    let name = &tree.name;
    let items = gen.items(&tree.items, &root);

    quote! {
        {
            #[allow(unused_mut)]
            let mut #tree_ident = ::treespec::TestTree::new(#name);
            let #root = #tree_ident.root();
            #items
            #tree_ident
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

struct Generator {
    /// The `TestTree` binding.
    tree: Ident,
    /// Counter for hidden group bindings.
    next_group: usize,
}

impl Generator {
    fn fresh_group(&mut self) -> Ident {
        let ident = Ident::new(&format!("__group_{}", self.next_group), Span::mixed_site());
        self.next_group += 1;
        ident
    }

    fn items(&mut self, items: &[DslItem], parent: &Ident) -> TokenStream {
        let mut output = TokenStream::new();
        for item in items {
            match item {
                DslItem::Group(block) => output.extend(self.group(block, parent)),
                DslItem::Test(block) => output.extend(self.test(block, parent)),
                DslItem::Hook(block) => output.extend(self.hook(block, parent)),
                DslItem::Summary(_) => output.extend(self.summary(parent)),
            }
        }
        output
    }

    fn group(&mut self, block: &GroupBlock, parent: &Ident) -> TokenStream {
        let name = &block.name;
        let handle = match &block.binding {
            Some(binding) => binding.clone(),
            None => self.fresh_group(),
        };
        let after = dependencies(&block.after);
        let summary = if block.summary {
            self.summary(&handle)
        } else {
            quote! {}
        };
        let items = self.items(&block.items, &handle);

        let tree = &self.tree;
        quote! {
            let #handle = #tree.add_group(#parent, #name, #after);
            #summary
            #items
        }
    }

    fn test(&mut self, block: &TestBlock, parent: &Ident) -> TokenStream {
        let tree = &self.tree;
        let name = &block.name;
        let param = &block.param;
        let body = &block.body;
        let after = dependencies(&block.after);
        let closure = Ident::new("__body", Span::mixed_site());

        let add = quote! { #tree.add_test(#parent, #name, #after, #closure) };
        let statement = match &block.binding {
            Some(binding) => quote! { let #binding = #add; },
            None => quote! { #add; },
        };

        quote! {
            #[allow(unreachable_code)]
            let #closure = move |#param: &mut ::treespec::TestContext| -> ::treespec::Outcome {
                { #body };
                Ok(())
            };
            #statement
        }
    }

    fn hook(&mut self, block: &HookBlock, group: &Ident) -> TokenStream {
        let tree = &self.tree;
        let setter = Ident::new(block.kind.setter(), Span::call_site());
        let body = &block.body;
        quote! {
            #tree.group_mut(#group).#setter(move || { #body });
        }
    }

    fn summary(&self, group: &Ident) -> TokenStream {
        let tree = &self.tree;
        quote! {
            #tree.group_mut(#group).set_print_summary(true);
        }
    }
}

/// `&[NodeId::from(a), NodeId::from(b)]`
fn dependencies(ids: &[Ident]) -> TokenStream {
    quote! {
        &[#(::treespec::NodeId::from(#ids)),*]
    }
}
