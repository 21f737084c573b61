//! # treespec: dependency-gated test trees with nested error reports
//!
//! Tests and groups form a tree. Each node may require other nodes to pass
//! first; a node whose requirements did not pass is cancelled instead of
//! run. Failed checks do not abort a test: they are collected into a nested
//! report, organized by the sections that were open when they happened.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use treespec::{check, compare, section, TestTree};
//!
//! fn main() {
//!     let mut tree = TestTree::new("Parser tests");
//!     let root = tree.root();
//!     let lexer = tree.add_group(root, "Lexer", &[]);
//!     let tokens = tree.add_test(lexer, "tokens", &[], |t| {
//!         let words: Vec<&str> = "a b c".split(' ').collect();
//!         compare!(t, words.len(), 3);
//!         Ok(())
//!     });
//!     tree.add_test(lexer, "positions", &[tokens.into()], |t| {
//!         {
//!             let mut t = section!(t, "first word");
//!             check!(t, "a b".find('b') == Some(2));
//!         }
//!         check!(t, "ab".len() == 2);
//!         Ok(())
//!     });
//!
//!     treespec::run_main(tree);
//! }
//! ```
//!
//! ## Features
//!
//! - `macros` (default): the [`tree!`] DSL

mod chain;
pub mod checks;
mod context;
pub mod error_tree;
pub mod logger;
pub mod runner;
mod summary;
mod table;
mod tree;

pub use chain::Chain;
pub use checks::{approx_eq, vec2_to_string, Approx, Vec2, DEFAULT_EPSILON};
pub use context::{location, ErrorStack, Section, TestContext};
pub use error_tree::{escape, escape_char, ErrorKind, ErrorNode};
pub use logger::{ConsoleLogger, Logger, MemoryLogger, Style};
pub use runner::{run_main, RunConfig};
pub use summary::print_summary;
pub use table::TableBuilder;
pub use tree::{
    GroupHooks, GroupId, Hook, Node, NodeId, NodeKind, NoHooks, Outcome, Outcomes, Status, Test,
    TestId, TestTree,
};

#[cfg(feature = "macros")]
pub use treespec_macros::tree;

// ============================================================================
// Check macros
// ============================================================================

/// Record an informational line at the call site. Does not fail the test.
#[macro_export]
macro_rules! message {
    ($t:expr, $message:expr $(,)?) => {
        $t.message(file!(), line!(), $message)
    };
}

/// Fail unless the condition holds. Evaluates to the condition.
///
/// `check!(t, x > 0)` records `Failed condition: x > 0 [file.rs:12]`;
/// `check!(t, x > 0, "x must be positive")` uses the message instead.
#[macro_export]
macro_rules! check {
    ($t:expr, $value:expr $(,)?) => {
        $t.check(file!(), line!(), $value, stringify!($value))
    };
    ($t:expr, $value:expr, $message:expr $(,)?) => {
        $t.check_with(file!(), line!(), $value, stringify!($value), $message)
    };
}

/// Fail unless `actual == expected`, reporting both values.
///
/// Optional trailing arguments: a `to_str` closure used to render both
/// values, and an equality closure used instead of `==`.
#[macro_export]
macro_rules! compare {
    ($t:expr, $actual:expr, $expected:expr $(,)?) => {
        $t.compare(file!(), line!(), stringify!($actual), $actual, $expected)
    };
    ($t:expr, $actual:expr, $expected:expr, $to_str:expr $(,)?) => {
        $t.compare_fmt(file!(), line!(), stringify!($actual), $actual, $expected, $to_str)
    };
    ($t:expr, $actual:expr, $expected:expr, $to_str:expr, $eq:expr $(,)?) => {
        $t.compare_by(file!(), line!(), stringify!($actual), $actual, $expected, $to_str, $eq)
    };
}

/// Fail unless `|actual - expected| < epsilon` (default `1e-4`).
#[macro_export]
macro_rules! approx_compare {
    ($t:expr, $actual:expr, $expected:expr $(,)?) => {
        $t.approx_compare(
            file!(),
            line!(),
            stringify!($actual),
            $actual,
            $expected,
            $crate::DEFAULT_EPSILON,
        )
    };
    ($t:expr, $actual:expr, $expected:expr, $epsilon:expr $(,)?) => {
        $t.approx_compare(file!(), line!(), stringify!($actual), $actual, $expected, $epsilon)
    };
}

/// Compare two 2D vectors component by component.
#[macro_export]
macro_rules! vec2_compare {
    ($t:expr, $actual:expr, $expected:expr $(,)?) => {
        $t.vec2_compare(file!(), line!(), stringify!($actual), $actual, $expected)
    };
}

/// Compare two 2D vectors component by component within `epsilon`.
#[macro_export]
macro_rules! vec2_approx_compare {
    ($t:expr, $actual:expr, $expected:expr $(,)?) => {
        $t.vec2_approx_compare(
            file!(),
            line!(),
            stringify!($actual),
            $actual,
            $expected,
            $crate::DEFAULT_EPSILON,
        )
    };
    ($t:expr, $actual:expr, $expected:expr, $epsilon:expr $(,)?) => {
        $t.vec2_approx_compare(file!(), line!(), stringify!($actual), $actual, $expected, $epsilon)
    };
}

/// Open a section at the call site. Bind the result to keep it open:
///
/// ```rust
/// # use treespec::{check, section, TestContext};
/// # fn body(t: &mut TestContext) {
/// {
///     let mut t = section!(t, "setup");
///     check!(t, 1 + 1 == 2);
/// } // section closes here
/// # }
/// ```
#[macro_export]
macro_rules! section {
    ($t:expr $(,)?) => {
        $t.section("", file!(), line!())
    };
    ($t:expr, $message:expr $(,)?) => {
        $t.section($message, file!(), line!())
    };
}

/// Evaluate an expression inside a section named after the expression.
///
/// `$t` must be a binding; inside the expression it refers to the section.
#[macro_export]
macro_rules! wrap_section {
    ($t:ident, $e:expr $(,)?) => {{
        let mut section = $t.section(stringify!($e), file!(), line!());
        let $t: &mut $crate::TestContext = &mut section;
        $e
    }};
}

/// Return from the test body early unless the condition holds.
#[macro_export]
macro_rules! require {
    ($value:expr $(,)?) => {
        if !$value {
            return Ok(());
        }
    };
}

/// Return from the test body early if any check has failed so far.
#[macro_export]
macro_rules! require_no_errors {
    ($t:expr $(,)?) => {
        if !$t.result() {
            return Ok(());
        }
    };
}
