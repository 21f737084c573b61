//! The mutable context handed to a test body: result flag, error report and
//! the stack of sections errors currently attach to.

use crate::error_tree::{ErrorKind, ErrorNode};
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// Format a call site as `[file:line]`, keeping only the file name.
pub fn location(file: &str, line: u32) -> String {
    let file_name = Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file);
    format!("[{file_name}:{line}]")
}

// ============================================================================
// ErrorStack
// ============================================================================

/// Attach points into a test's error tree.
///
/// Each frame is the index of a container among its parent's children, so
/// the frames together form a path from the root. The root itself is the
/// bottom of the stack and is never popped.
#[derive(Clone, Debug, Default)]
pub struct ErrorStack {
    frames: Vec<usize>,
}

impl ErrorStack {
    /// Number of open sections.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn push(&mut self, index: usize) {
        self.frames.push(index);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn clear(&mut self) {
        self.frames.clear();
    }

    /// Resolve the top of the stack inside `root`.
    fn top<'a>(&self, root: &'a mut ErrorNode) -> &'a mut ErrorNode {
        let mut node = root;
        for &index in &self.frames {
            node = match node.child_mut(index) {
                Some(child) => child,
                None => unreachable!("treespec: error stack points outside its tree"),
            };
        }
        node
    }
}

// ============================================================================
// TestContext
// ============================================================================

/// State a test body reads and writes while it runs.
///
/// Checks (see the `check!`, `compare!`, ... macros) record failures here;
/// [`TestContext::section`] opens a named scope for them.
#[derive(Debug)]
pub struct TestContext {
    result: bool,
    errors: ErrorNode,
    stack: ErrorStack,
}

impl Default for TestContext {
    fn default() -> Self {
        TestContext::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            result: false,
            errors: ErrorNode::root(),
            stack: ErrorStack::default(),
        }
    }

    /// `false` as soon as any check failed.
    pub fn result(&self) -> bool {
        self.result
    }

    /// Mark the test as failed without recording anything.
    pub fn fail(&mut self) {
        self.result = false;
    }

    /// The whole error report of this test.
    pub fn errors(&self) -> &ErrorNode {
        &self.errors
    }

    /// Number of sections currently open.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The node new errors attach to.
    pub fn current_error(&mut self) -> &mut ErrorNode {
        self.stack.top(&mut self.errors)
    }

    /// Open a section labelled `"message [file:line]"`.
    ///
    /// Errors recorded through the returned guard land inside the section.
    /// The section closes when the guard is dropped, whichever way the
    /// enclosing scope is left.
    pub fn section(&mut self, message: &str, file: &str, line: u32) -> Section<'_> {
        let separator = if message.is_empty() { "" } else { " " };
        let label = format!("{message}{separator}{}", location(file, line));
        let top = self.current_error();
        top.add_kind(label, ErrorKind::Container);
        let index = top.children().len() - 1;
        self.stack.push(index);
        tracing::trace!(target: "treespec", depth = self.stack.depth(), "section opened");
        Section { context: self }
    }

    /// Reset for a fresh run: optimistic result, empty report.
    pub(crate) fn begin(&mut self) {
        self.result = true;
        self.errors.clear();
        self.stack.clear();
    }

    /// Forget everything from an earlier run.
    pub(crate) fn reset(&mut self) {
        self.begin();
        self.result = false;
    }

    /// Record a fault that ended the body early.
    pub(crate) fn record_fault(&mut self, description: &str) {
        self.current_error().add(format!("EXCEPTION: {description}"));
        self.result = false;
    }
}

// ============================================================================
// Section
// ============================================================================

/// An open section. Dereferences to the [`TestContext`] and closes the
/// section on drop, including during unwinding.
pub struct Section<'a> {
    context: &'a mut TestContext,
}

impl Deref for Section<'_> {
    type Target = TestContext;

    fn deref(&self) -> &TestContext {
        self.context
    }
}

impl DerefMut for Section<'_> {
    fn deref_mut(&mut self) -> &mut TestContext {
        self.context
    }
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        self.context.stack.pop();
        tracing::trace!(target: "treespec", depth = self.context.stack.depth(), "section closed");
    }
}
