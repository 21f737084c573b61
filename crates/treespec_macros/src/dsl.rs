//! DSL AST types and `syn::parse::Parse` implementations.
//!
//! Parses the `tree!` syntax into a structured AST.

use proc_macro2::{Span, TokenStream};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, parenthesized, Ident, LitStr, Pat, Result, Token};

// ============================================================================
// AST types
// ============================================================================

/// `"Root name" { items... }`
#[derive(Debug)]
pub struct TreeDef {
    pub name: LitStr,
    pub items: Vec<DslItem>,
}

/// A single DSL node.
#[derive(Debug)]
pub enum DslItem {
    Group(GroupBlock),
    Test(TestBlock),
    Hook(HookBlock),
    /// `summary;`: print a summary after the enclosing group.
    Summary(Span),
}

/// `group "name" [as ident] [after(ids..)] [summary] { items... }`
#[derive(Debug)]
pub struct GroupBlock {
    pub name: LitStr,
    pub binding: Option<Ident>,
    pub after: Vec<Ident>,
    pub summary: bool,
    pub items: Vec<DslItem>,
}

/// `test "name" [as ident] [after(ids..)] |ctx| { body }`
#[derive(Debug)]
pub struct TestBlock {
    pub name: LitStr,
    pub binding: Option<Ident>,
    pub after: Vec<Ident>,
    pub param: Pat,
    pub body: TokenStream,
}

/// `before_run { ... }` and friends.
#[derive(Debug)]
pub struct HookBlock {
    pub kind: HookKind,
    pub body: TokenStream,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    BeforeRun,
    AfterRun,
    BeforeEachTest,
    AfterEachTest,
}

impl HookKind {
    /// Name of the `Group` setter the hook is installed with.
    pub fn setter(self) -> &'static str {
        match self {
            HookKind::BeforeRun => "on_before_run",
            HookKind::AfterRun => "on_after_run",
            HookKind::BeforeEachTest => "on_before_each_test",
            HookKind::AfterEachTest => "on_after_each_test",
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

impl Parse for TreeDef {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: LitStr = input.parse()?;
        let content;
        braced!(content in input);
        let items = parse_items(&content)?;
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after the root group"));
        }
        Ok(TreeDef { name, items })
    }
}

/// Parse a sequence of DSL items until the stream is exhausted.
fn parse_items(input: ParseStream) -> Result<Vec<DslItem>> {
    let mut items = Vec::new();
    while !input.is_empty() {
        items.push(input.parse::<DslItem>()?);
    }
    Ok(items)
}

impl Parse for DslItem {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident: Ident = input.parse()?;
        let name = ident.to_string();

        match name.as_str() {
            "group" => Ok(DslItem::Group(parse_group_block(input)?)),
            "test" => Ok(DslItem::Test(parse_test_block(input)?)),

            "summary" => {
                input.parse::<Token![;]>()?;
                Ok(DslItem::Summary(ident.span()))
            }

            "before_run" => Ok(DslItem::Hook(parse_hook_block(input, HookKind::BeforeRun)?)),
            "after_run" => Ok(DslItem::Hook(parse_hook_block(input, HookKind::AfterRun)?)),
            "before_each_test" => Ok(DslItem::Hook(parse_hook_block(
                input,
                HookKind::BeforeEachTest,
            )?)),
            "after_each_test" => Ok(DslItem::Hook(parse_hook_block(
                input,
                HookKind::AfterEachTest,
            )?)),

            _ => Err(syn::Error::new(
                ident.span(),
                format!(
                    "unknown DSL keyword `{name}`. Expected one of: \
                     group, test, summary, before_run, after_run, \
                     before_each_test, after_each_test"
                ),
            )),
        }
    }
}

// ============================================================================
// Block parsers
// ============================================================================

/// Optional modifiers shared by groups and tests.
#[derive(Default)]
struct Modifiers {
    binding: Option<Ident>,
    after: Vec<Ident>,
    summary: bool,
}

/// Parse `as ident`, `after(ids..)` and (for groups) `summary`, in any order,
/// up to the token that opens the item's body.
fn parse_modifiers(input: ParseStream, allow_summary: bool) -> Result<Modifiers> {
    let mut modifiers = Modifiers::default();

    while !input.peek(syn::token::Brace) && !input.peek(Token![|]) && !input.is_empty() {
        if input.peek(Token![as]) {
            input.parse::<Token![as]>()?;
            modifiers.binding = Some(input.parse()?);
            continue;
        }

        let modifier: Ident = input.parse()?;
        match modifier.to_string().as_str() {
            "after" => {
                let content;
                parenthesized!(content in input);
                let ids = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?;
                modifiers.after.extend(ids);
            }
            "summary" if allow_summary => modifiers.summary = true,
            other => {
                let expected = if allow_summary {
                    "`as`, `after` or `summary`"
                } else {
                    "`as` or `after`"
                };
                return Err(syn::Error::new(
                    modifier.span(),
                    format!("unknown modifier `{other}`. Expected {expected}"),
                ));
            }
        }
    }

    Ok(modifiers)
}

/// Parse: `"name" [modifiers] { items... }`
fn parse_group_block(input: ParseStream) -> Result<GroupBlock> {
    let name: LitStr = input.parse()?;
    let modifiers = parse_modifiers(input, true)?;

    let content;
    braced!(content in input);
    let items = parse_items(&content)?;

    Ok(GroupBlock {
        name,
        binding: modifiers.binding,
        after: modifiers.after,
        summary: modifiers.summary,
        items,
    })
}

/// Parse: `"name" [modifiers] |param| { body }`
fn parse_test_block(input: ParseStream) -> Result<TestBlock> {
    let name: LitStr = input.parse()?;
    let modifiers = parse_modifiers(input, false)?;

    input.parse::<Token![|]>()?;
    let param = Pat::parse_single(input)?;
    input.parse::<Token![|]>()?;

    let body_content;
    braced!(body_content in input);
    let body: TokenStream = body_content.parse()?;

    Ok(TestBlock {
        name,
        binding: modifiers.binding,
        after: modifiers.after,
        param,
        body,
    })
}

/// Parse: `{ body }`
fn parse_hook_block(input: ParseStream, kind: HookKind) -> Result<HookBlock> {
    let content;
    braced!(content in input);
    let body: TokenStream = content.parse()?;
    Ok(HookBlock { kind, body })
}
