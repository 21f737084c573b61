//! Table-driven tests: parameterized test cases via a builder.

use crate::context::TestContext;
use crate::tree::{GroupId, NodeId, Outcome, TestTree};
use std::rc::Rc;

/// Builder for table-driven (parameterized) tests.
///
/// Each `.case()` becomes a separate test inside a new group.
///
/// # Example
///
/// ```rust
/// use treespec::{compare, MemoryLogger, TestTree};
///
/// let mut tree = TestTree::new("math");
/// let root = tree.root();
/// tree.table(root, "addition")
///     .case("small", (2, 3, 5))
///     .case("large", (100, 200, 300))
///     .run(|t, (a, b, expected)| {
///         compare!(t, a + b, *expected);
///         Ok(())
///     });
///
/// assert!(tree.run(&mut MemoryLogger::new()));
/// ```
pub struct TableBuilder<'a, T> {
    tree: &'a mut TestTree,
    parent: GroupId,
    name: String,
    required: Vec<NodeId>,
    cases: Vec<(String, T)>,
}

impl<'a, T: 'static> TableBuilder<'a, T> {
    /// Gate the whole table on `required`.
    pub fn after(mut self, required: &[NodeId]) -> Self {
        self.required = required.to_vec();
        self
    }

    /// Add a named test case with parameter data.
    pub fn case(mut self, label: &str, data: T) -> Self {
        self.cases.push((label.to_string(), data));
        self
    }

    /// Add an unnamed test case (auto-named `case_1`, `case_2`, ...).
    pub fn case_unnamed(mut self, data: T) -> Self {
        let label = format!("case_{}", self.cases.len() + 1);
        self.cases.push((label, data));
        self
    }

    /// Register one test per case, all sharing `body`. Returns the group.
    pub fn run(self, body: impl Fn(&mut TestContext, &T) -> Outcome + 'static) -> GroupId {
        let group = self.tree.add_group(self.parent, self.name, &self.required);
        let body = Rc::new(body);

        for (label, data) in self.cases {
            let body = Rc::clone(&body);
            self.tree.add_test(group, label, &[], move |t| body(t, &data));
        }

        group
    }
}

impl TestTree {
    /// Start building a table-driven group under `parent`.
    pub fn table<T: 'static>(&mut self, parent: GroupId, name: &str) -> TableBuilder<'_, T> {
        TableBuilder {
            tree: self,
            parent,
            name: name.to_string(),
            required: Vec::new(),
            cases: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;

    #[test]
    fn test_each_case_becomes_a_test() {
        let mut tree = TestTree::new("root");
        let root = tree.root();
        let group = tree
            .table(root, "lengths")
            .case("empty", ("", 0usize))
            .case_unnamed(("abc", 3))
            .case("wrong", ("ab", 5))
            .run(|t, (text, len)| {
                t.compare(file!(), line!(), "len", text.len(), *len);
                Ok(())
            });

        assert!(!tree.run(&mut MemoryLogger::new()));
        let names: Vec<&str> = tree.child_tests(group).iter().map(|id| tree.name(*id)).collect();
        assert_eq!(names, vec!["empty", "case_2", "wrong"]);
        assert_eq!(tree.outcomes(group).passed, vec!["empty", "case_2"]);
        assert_eq!(tree.outcomes(root).failed, vec!["lengths/wrong"]);
    }

    #[test]
    fn test_gated_table_is_cancelled() {
        let mut tree = TestTree::new("root");
        let root = tree.root();
        let gate = tree.add_test(root, "gate", &[], |_| anyhow::bail!("not ready"));
        let group = tree
            .table(root, "cases")
            .after(&[gate.into()])
            .case("one", 1)
            .case("two", 2)
            .run(|_, _| Ok(()));

        tree.run(&mut MemoryLogger::new());
        assert_eq!(tree.outcomes(group).cancelled, vec!["one", "two"]);
        assert_eq!(tree.outcomes(root).cancelled, vec!["cases/one", "cases/two"]);
    }
}
