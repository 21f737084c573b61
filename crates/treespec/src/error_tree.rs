//! Nested error reports: one tree per test.
//!
//! A test's report is rooted at an [`ErrorKind::Root`] node. Scoped sections
//! add [`ErrorKind::Container`] nodes, failed checks add [`ErrorKind::Leaf`]
//! nodes. Containers that hold no leaf anywhere beneath them are invisible
//! when the tree is rendered:
//!
//! ```text
//! parse header [parser.rs:12]
//!   Failed condition: header.len() > 4 [parser.rs:14]
//! value [parser.rs:20]
//!   Expected value: 3
//!   Actual value:   4
//! ```

use crate::logger::{Logger, Style};

/// What an [`ErrorNode`] stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The root of a test's report. Never rendered itself.
    Root,
    /// A named section. Rendered only if some leaf lives beneath it.
    Container,
    /// An actual error message.
    Leaf,
}

/// A node of a test's error report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorNode {
    kind: ErrorKind,
    message: String,
    children: Vec<ErrorNode>,
}

impl ErrorNode {
    pub fn root() -> Self {
        ErrorNode::new(String::new(), ErrorKind::Root)
    }

    pub fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        ErrorNode {
            kind,
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn children(&self) -> &[ErrorNode] {
        &self.children
    }

    /// Append a leaf child and return it for further nesting.
    pub fn add(&mut self, message: impl Into<String>) -> &mut ErrorNode {
        self.add_kind(message, ErrorKind::Leaf)
    }

    /// Append a child of the given kind and return it for further nesting.
    pub fn add_kind(&mut self, message: impl Into<String>, kind: ErrorKind) -> &mut ErrorNode {
        self.children.push(ErrorNode::new(message, kind));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut ErrorNode> {
        self.children.get_mut(index)
    }

    pub(crate) fn clear(&mut self) {
        self.children.clear();
    }

    /// Whether any node beneath this one is a leaf. Stops at the first hit.
    pub fn has_leaf(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.kind == ErrorKind::Leaf || child.has_leaf())
    }

    /// Whether this node shows up in rendered output.
    pub fn is_visible(&self) -> bool {
        match self.kind {
            ErrorKind::Container => self.has_leaf(),
            ErrorKind::Root | ErrorKind::Leaf => true,
        }
    }

    /// Visible lines of the report, depth first, as `(depth, message)`.
    ///
    /// The iterator is lazy and borrows the tree; call again to restart.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            stack: vec![(self, 0)],
        }
    }

    /// Write the visible part of the tree to `logger`, one line per node,
    /// nesting one level per generation below the root.
    pub fn render(&self, logger: &mut dyn Logger) {
        let mut depth = 0;
        for (line_depth, message) in self.lines() {
            while depth < line_depth {
                logger.nest();
                depth += 1;
            }
            while depth > line_depth {
                logger.unnest();
                depth -= 1;
            }
            logger.write(&escape(message, false), Style::Plain);
            logger.end_line();
        }
        while depth > 0 {
            logger.unnest();
            depth -= 1;
        }
    }
}

/// Iterator returned by [`ErrorNode::lines`].
pub struct Lines<'a> {
    stack: Vec<(&'a ErrorNode, usize)>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, depth)) = self.stack.pop() {
            if !node.is_visible() {
                continue;
            }
            let child_depth = match node.kind {
                ErrorKind::Root => depth,
                _ => depth + 1,
            };
            for child in node.children.iter().rev() {
                self.stack.push((child, child_depth));
            }
            if node.kind != ErrorKind::Root {
                return Some((depth, node.message.as_str()));
            }
        }
        None
    }
}

// ============================================================================
// Escaping
// ============================================================================

/// Render one character of input for diagnostics. `None` is end of input.
pub fn escape_char(c: Option<char>) -> String {
    match c {
        None => "\\(EOF)".to_string(),
        Some('\n') => "\\n".to_string(),
        Some('\r') => "\\r".to_string(),
        Some('\t') => "\\t".to_string(),
        Some('\0') => "\\0".to_string(),
        Some('\\') => "\\\\".to_string(),
        Some('"') => "\\\"".to_string(),
        Some(c) if c.is_control() => format!("({})", c as u32),
        Some(c) => c.to_string(),
    }
}

/// Escape control characters in `text`. Quotes are left alone unless
/// `convert_quotes` is set.
pub fn escape(text: &str, convert_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' && !convert_quotes {
            result.push(c);
        } else {
            result.push_str(&escape_char(Some(c)));
        }
    }
    result
}
