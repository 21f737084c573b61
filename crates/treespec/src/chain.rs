//! Sequential chains: tests that each depend on the one before.
//!
//! A failing step cancels every later step, so a chain stops at its first
//! failure without any extra bookkeeping.

use crate::context::TestContext;
use crate::tree::{GroupId, NodeId, Outcome, TestId, TestTree};

/// Adds steps to a group, each gated on the previous step.
///
/// # Example
///
/// ```rust
/// use treespec::{check, MemoryLogger, TestTree};
///
/// let mut tree = TestTree::new("workflow");
/// let root = tree.root();
/// let steps = tree.chain(root, &[], |chain| {
///     chain.step("create account", |_| Ok(()));
///     chain.step("verify email", |t| { check!(t, false); Ok(()) });
///     chain.step("login", |_| Ok(()));
/// });
///
/// tree.run(&mut MemoryLogger::new());
/// assert!(tree.status(steps[2]).cancelled);
/// ```
pub struct Chain<'a> {
    tree: &'a mut TestTree,
    group: GroupId,
    required: Vec<NodeId>,
    steps: Vec<TestId>,
}

impl Chain<'_> {
    /// Add the next step. The first step depends on the chain's own
    /// requirements, every later one on its predecessor.
    pub fn step(
        &mut self,
        name: &str,
        body: impl FnMut(&mut TestContext) -> Outcome + 'static,
    ) -> TestId {
        let required = match self.steps.last() {
            Some(previous) => vec![NodeId::from(*previous)],
            None => self.required.clone(),
        };
        let id = self.tree.add_test(self.group, name, &required, body);
        self.steps.push(id);
        id
    }
}

impl TestTree {
    /// Add a chain of steps to `group`. Returns the steps in order.
    pub fn chain(
        &mut self,
        group: GroupId,
        required: &[NodeId],
        body: impl FnOnce(&mut Chain<'_>),
    ) -> Vec<TestId> {
        let mut chain = Chain {
            tree: self,
            group,
            required: required.to_vec(),
            steps: Vec::new(),
        };
        body(&mut chain);
        chain.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_steps_depend_on_predecessor() {
        let mut tree = TestTree::new("root");
        let root = tree.root();
        let gate = tree.add_test(root, "gate", &[], |_| Ok(()));
        let steps = tree.chain(root, &[gate.into()], |chain| {
            chain.step("first", |_| Ok(()));
            chain.step("second", |_| Ok(()));
        });

        assert_eq!(tree.node(steps[0]).required(), &[NodeId::from(gate)]);
        assert_eq!(tree.node(steps[1]).required(), &[NodeId::from(steps[0])]);
    }

    #[test]
    fn test_failure_stops_the_chain() {
        let ran = Rc::new(Cell::new(0));
        let mut tree = TestTree::new("root");
        let root = tree.root();

        let counter = ran.clone();
        let steps = tree.chain(root, &[], move |chain| {
            let c = counter.clone();
            chain.step("first", move |_| {
                c.set(c.get() + 1);
                Ok(())
            });
            chain.step("second", |t| {
                t.fail();
                Ok(())
            });
            let c = counter.clone();
            chain.step("third", move |_| {
                c.set(c.get() + 1);
                Ok(())
            });
        });

        assert!(!tree.run(&mut MemoryLogger::new()));
        assert_eq!(ran.get(), 1);
        assert!(tree.status(steps[0]).result);
        assert!(!tree.status(steps[1]).cancelled);
        assert!(tree.status(steps[2]).cancelled);
        assert!(!tree.status(steps[2]).has_run);
    }
}
