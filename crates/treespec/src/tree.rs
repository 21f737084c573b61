//! Test tree data model and construction API.
//!
//! A [`TestTree`] owns every node in an arena. Construction calls hand out
//! small copyable handles ([`TestId`], [`GroupId`]) that stay valid for the
//! tree's lifetime and are used both to declare dependencies and to inspect
//! results after a run.
//!
//! ```rust
//! use treespec::{check, MemoryLogger, TestTree};
//!
//! let mut tree = TestTree::new("Calculator");
//! let root = tree.root();
//! let adds = tree.add_test(root, "adds", &[], |t| {
//!     check!(t, 2 + 2 == 4);
//!     Ok(())
//! });
//! tree.add_test(root, "uses adds", &[adds.into()], |t| {
//!     check!(t, 4 - 2 == 2);
//!     Ok(())
//! });
//!
//! let mut logger = MemoryLogger::new();
//! assert!(tree.run(&mut logger));
//! ```

use crate::context::TestContext;
use std::sync::atomic::{AtomicU32, Ordering};

/// What a test body returns. Any `Err` fails the test.
pub type Outcome = anyhow::Result<()>;

pub(crate) type TestBody = Box<dyn FnMut(&mut TestContext) -> Outcome>;

/// A group lifecycle callback.
pub type Hook = Box<dyn FnMut()>;

static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(0);

// ============================================================================
// Handles
// ============================================================================

/// Handle to any node of a [`TestTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u32,
    index: usize,
}

/// Handle to a leaf test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestId(NodeId);

/// Handle to a group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(NodeId);

impl From<TestId> for NodeId {
    fn from(id: TestId) -> NodeId {
        id.0
    }
}

impl From<GroupId> for NodeId {
    fn from(id: GroupId) -> NodeId {
        id.0
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Run state shared by tests and groups.
///
/// Before a run everything is `false`. A node that ran has `has_run` set and
/// is never `cancelled`; a cancelled node never has `has_run` set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    pub has_run: bool,
    pub result: bool,
    pub cancelled: bool,
}

/// Names of descendants by outcome, filled by the last run of a group.
/// Names below nested groups are qualified as `group/name`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcomes {
    pub passed: Vec<String>,
    pub cancelled: Vec<String>,
    pub failed: Vec<String>,
    pub empty_groups: Vec<String>,
}

impl Outcomes {
    pub fn clear(&mut self) {
        self.passed.clear();
        self.cancelled.clear();
        self.failed.clear();
        self.empty_groups.clear();
    }

    /// Append `other`'s names, each prefixed with `"{prefix}/"`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Outcomes) {
        let qualify = |names: &[String]| {
            names
                .iter()
                .map(|name| format!("{prefix}/{name}"))
                .collect::<Vec<_>>()
        };
        self.passed.extend(qualify(&other.passed));
        self.cancelled.extend(qualify(&other.cancelled));
        self.failed.extend(qualify(&other.failed));
        self.empty_groups.extend(qualify(&other.empty_groups));
    }

    /// No cancellations and no failures.
    pub fn all_passed(&self) -> bool {
        self.cancelled.is_empty() && self.failed.is_empty()
    }
}

/// Overridable callbacks around a whole group run.
///
/// Implement this to give a group custom setup and teardown; both default
/// to doing nothing.
pub trait GroupHooks {
    fn before_group(&mut self) {}

    fn after_group(&mut self) {}
}

/// The hooks of a plain group.
pub struct NoHooks;

impl GroupHooks for NoHooks {}

/// A leaf test: a body and the context it runs against.
pub struct Test {
    pub(crate) body: Option<TestBody>,
    pub(crate) context: TestContext,
}

impl Test {
    pub fn context(&self) -> &TestContext {
        &self.context
    }
}

/// A group of tests and nested groups.
pub struct Group {
    pub(crate) children: Vec<NodeId>,
    pub(crate) outcomes: Outcomes,
    pub(crate) max_test_name: usize,
    pub(crate) print_summary: bool,
    pub(crate) hooks: Box<dyn GroupHooks>,
    pub(crate) on_before_run: Hook,
    pub(crate) on_after_run: Hook,
    pub(crate) on_before_each_test: Hook,
    pub(crate) on_after_each_test: Hook,
}

impl Group {
    fn new(hooks: Box<dyn GroupHooks>) -> Self {
        Group {
            children: Vec::new(),
            outcomes: Outcomes::default(),
            max_test_name: 0,
            print_summary: false,
            hooks,
            on_before_run: Box::new(|| {}),
            on_after_run: Box::new(|| {}),
            on_before_each_test: Box::new(|| {}),
            on_after_each_test: Box::new(|| {}),
        }
    }

    /// Outcome lists from the last run.
    pub fn outcomes(&self) -> &Outcomes {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Print a summary at the end of each run of this group.
    pub fn set_print_summary(&mut self, enabled: bool) -> &mut Self {
        self.print_summary = enabled;
        self
    }

    /// Runs before the first child.
    pub fn on_before_run(&mut self, hook: impl FnMut() + 'static) -> &mut Self {
        self.on_before_run = Box::new(hook);
        self
    }

    /// Runs after the last child.
    pub fn on_after_run(&mut self, hook: impl FnMut() + 'static) -> &mut Self {
        self.on_after_run = Box::new(hook);
        self
    }

    /// Runs before every direct child test.
    pub fn on_before_each_test(&mut self, hook: impl FnMut() + 'static) -> &mut Self {
        self.on_before_each_test = Box::new(hook);
        self
    }

    /// Runs after every direct child test.
    pub fn on_after_each_test(&mut self, hook: impl FnMut() + 'static) -> &mut Self {
        self.on_after_each_test = Box::new(hook);
        self
    }
}

/// Either kind of node.
pub enum NodeKind {
    Test(Test),
    Group(Group),
}

/// A named node with its dependencies and run state.
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<GroupId>,
    pub(crate) required: Vec<NodeId>,
    pub(crate) status: Status,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    pub fn required(&self) -> &[NodeId] {
        &self.required
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Test(_))
    }

    pub fn as_test(&self) -> Option<&Test> {
        match &self.kind {
            NodeKind::Test(test) => Some(test),
            NodeKind::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Test(_) => None,
        }
    }
}

// ============================================================================
// TestTree
// ============================================================================

/// Owner of a whole test hierarchy, rooted at a single group.
pub struct TestTree {
    id: u32,
    nodes: Vec<Node>,
}

impl TestTree {
    /// Create a tree whose root group is called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        TestTree::with_hooks(name, NoHooks)
    }

    /// Create a tree whose root group has custom hooks.
    pub fn with_hooks(name: impl Into<String>, hooks: impl GroupHooks + 'static) -> Self {
        let root = Node {
            name: name.into(),
            parent: None,
            required: Vec::new(),
            status: Status::default(),
            kind: NodeKind::Group(Group::new(Box::new(hooks))),
        };
        TestTree {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> GroupId {
        GroupId(NodeId {
            tree: self.id,
            index: 0,
        })
    }

    // ---- Construction --------------------------------------------------------

    /// Add a leaf test to `parent`. It runs only if every node in `required`
    /// passed.
    pub fn add_test(
        &mut self,
        parent: GroupId,
        name: impl Into<String>,
        required: &[NodeId],
        body: impl FnMut(&mut TestContext) -> Outcome + 'static,
    ) -> TestId {
        let kind = NodeKind::Test(Test {
            body: Some(Box::new(body)),
            context: TestContext::new(),
        });
        TestId(self.push_node(parent, name.into(), required, kind))
    }

    /// Add an empty group to `parent`. Its children are skipped and marked
    /// cancelled unless every node in `required` passed.
    pub fn add_group(&mut self, parent: GroupId, name: impl Into<String>, required: &[NodeId]) -> GroupId {
        self.add_group_with(parent, name, required, NoHooks)
    }

    /// Like [`add_group`](Self::add_group), with custom group hooks.
    pub fn add_group_with(
        &mut self,
        parent: GroupId,
        name: impl Into<String>,
        required: &[NodeId],
        hooks: impl GroupHooks + 'static,
    ) -> GroupId {
        let kind = NodeKind::Group(Group::new(Box::new(hooks)));
        GroupId(self.push_node(parent, name.into(), required, kind))
    }

    fn push_node(&mut self, parent: GroupId, name: String, required: &[NodeId], kind: NodeKind) -> NodeId {
        self.check_handle(parent.0);
        for dep in required {
            self.check_handle(*dep);
        }
        let id = NodeId {
            tree: self.id,
            index: self.nodes.len(),
        };
        tracing::trace!(target: "treespec", name = %name, index = id.index, "node added");
        self.nodes.push(Node {
            name,
            parent: Some(parent),
            required: required.to_vec(),
            status: Status::default(),
            kind,
        });
        self.group_mut(parent).children.push(id);
        id
    }

    fn check_handle(&self, id: NodeId) {
        assert!(
            id.tree == self.id && id.index < self.nodes.len(),
            "treespec: node handle does not belong to this tree"
        );
    }

    // ---- Access --------------------------------------------------------------

    pub fn node(&self, id: impl Into<NodeId>) -> &Node {
        let id = id.into();
        self.check_handle(id);
        &self.nodes[id.index]
    }

    pub(crate) fn node_mut(&mut self, id: impl Into<NodeId>) -> &mut Node {
        let id = id.into();
        self.check_handle(id);
        &mut self.nodes[id.index]
    }

    pub fn name(&self, id: impl Into<NodeId>) -> &str {
        &self.node(id).name
    }

    pub fn status(&self, id: impl Into<NodeId>) -> Status {
        self.node(id).status
    }

    pub fn test(&self, id: TestId) -> &Test {
        match &self.node(id).kind {
            NodeKind::Test(test) => test,
            NodeKind::Group(_) => panic!("treespec: test handle points at a group"),
        }
    }

    pub(crate) fn test_mut(&mut self, id: TestId) -> &mut Test {
        match &mut self.node_mut(id).kind {
            NodeKind::Test(test) => test,
            NodeKind::Group(_) => panic!("treespec: test handle points at a group"),
        }
    }

    pub fn group(&self, id: GroupId) -> &Group {
        match &self.node(id).kind {
            NodeKind::Group(group) => group,
            NodeKind::Test(_) => panic!("treespec: group handle points at a test"),
        }
    }

    /// Mutable access to a group, to set hooks or summary printing.
    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        match &mut self.node_mut(id).kind {
            NodeKind::Group(group) => group,
            NodeKind::Test(_) => panic!("treespec: group handle points at a test"),
        }
    }

    /// Outcome lists from the group's last run.
    pub fn outcomes(&self, id: GroupId) -> &Outcomes {
        &self.group(id).outcomes
    }

    /// Forget every node's status from an earlier run.
    pub(crate) fn reset_statuses(&mut self) {
        for node in &mut self.nodes {
            node.status = Status::default();
        }
    }

    // ---- Navigation ----------------------------------------------------------

    pub fn is_root(&self, id: impl Into<NodeId>) -> bool {
        self.node(id).parent.is_none()
    }

    /// Follow parent links up to the group without a parent.
    pub fn root_of(&self, id: GroupId) -> GroupId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Names from just below the root down to `id`, joined with `/`.
    pub fn path(&self, id: impl Into<NodeId>) -> String {
        let mut names = Vec::new();
        let mut current = id.into();
        while let Some(parent) = self.node(current).parent {
            names.push(self.node(current).name.as_str());
            current = parent.into();
        }
        names.reverse();
        names.join("/")
    }

    /// Direct children in declaration order.
    pub fn children(&self, id: GroupId) -> &[NodeId] {
        &self.group(id).children
    }

    pub fn child_tests(&self, id: GroupId) -> Vec<TestId> {
        self.children(id)
            .iter()
            .filter(|child| self.node(**child).is_leaf())
            .map(|child| TestId(*child))
            .collect()
    }

    pub fn child_groups(&self, id: GroupId) -> Vec<GroupId> {
        self.children(id)
            .iter()
            .filter(|child| !self.node(**child).is_leaf())
            .map(|child| GroupId(*child))
            .collect()
    }

    /// Every test beneath `id`, depth first in declaration order.
    pub fn all_tests(&self, id: GroupId) -> Vec<TestId> {
        let mut tests = Vec::new();
        self.collect_tests(id, &mut tests);
        tests
    }

    fn collect_tests(&self, id: GroupId, tests: &mut Vec<TestId>) {
        for &child in self.children(id) {
            if self.node(child).is_leaf() {
                tests.push(TestId(child));
            } else {
                self.collect_tests(GroupId(child), tests);
            }
        }
    }

    /// Classify a child handle by its node kind.
    pub(crate) fn classify(&self, id: NodeId) -> Child {
        if self.node(id).is_leaf() {
            Child::Test(TestId(id))
        } else {
            Child::Group(GroupId(id))
        }
    }
}

/// A child handle with its kind resolved.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Child {
    Test(TestId),
    Group(GroupId),
}
