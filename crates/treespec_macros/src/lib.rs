//! Proc macros for the `treespec` testing framework.

mod codegen;
mod dsl;

/// Declare a whole test tree in one block. Evaluates to a `TestTree`.
///
/// # Example
///
/// ```text
/// let tree = treespec::tree! {
///     "Example tests" {
///         summary;
///
///         group "Parsing" as parsing {
///             test "numbers" as numbers |t| {
///                 compare!(t, "42".parse::<i32>()?, 42);
///             }
///             test "lists" after(numbers) |t| {
///                 check!(t, "1,2".split(',').count() == 2);
///             }
///         }
///
///         group "Evaluation" after(parsing) {
///             before_each_test { println!("fresh state"); }
///             test "sum" |t| { check!(t, 1 + 1 == 2); }
///         }
///     }
/// };
/// treespec::run_main(tree);
/// ```
///
/// # Supported DSL keywords
///
/// ## Nodes
/// - `group "name" [as ident] [after(ids..)] [summary] { items... }`
/// - `test "name" [as ident] [after(ids..)] |ctx| { body }`: the body may
///   use `?`; it returns `Ok(())` when it falls off the end
///
/// `as` bindings hold the node's handle and are visible to every later
/// item, at any depth. `after(..)` names the nodes that must pass first.
///
/// ## Group settings
/// - `summary;`: print a summary after the enclosing group
/// - `before_run { ... }` / `after_run { ... }`: once around the group
/// - `before_each_test { ... }` / `after_each_test { ... }`: around every
///   direct child test
#[proc_macro]
pub fn tree(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let tree = syn::parse_macro_input!(input as dsl::TreeDef);
    codegen::generate(tree).into()
}
