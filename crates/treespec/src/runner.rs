//! Dependency-gated, sequential execution of a [`TestTree`].
//!
//! Running a group walks its children in declaration order and prints one
//! aligned status line per test, with the error report of failed tests
//! beneath it:
//!
//! ```text
//! Example tests
//!   ExampleModule1
//!     List1
//!       first--|passed
//!       second-|FAILED
//!         Failed condition: false [module_1.rs:18]
//!       third--|cancelled
//!     List2
//!       Cancelled 3 tests
//! ```

use crate::logger::{ConsoleLogger, Logger, Style};
use crate::summary;
use crate::tree::{Child, GroupId, Status, Test, TestId, TestTree};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration parsed from command-line args.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Only list tests, don't run them.
    pub list: bool,
    /// Print the summary after the root group.
    pub summary: bool,
    /// Color status words.
    pub color: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            list: false,
            summary: true,
            color: false,
        }
    }
}

impl RunConfig {
    /// Parse from the process args (compatible with `cargo test -- <args>`).
    pub fn from_args() -> Self {
        let mut config = RunConfig::parse(std::env::args().skip(1));
        config.color = crate::logger::use_color();
        config
    }

    /// Parse flags. Unknown flags and positional arguments are ignored.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = RunConfig::default();
        for arg in args {
            match arg.as_ref() {
                "--list" => config.list = true,
                "--no-summary" => config.summary = false,
                _ => {} // ignore unknown flags
            }
        }
        config
    }
}

/// Run `tree` on stdout and exit with status 1 unless its root passed.
///
/// Meant to be called from `fn main()` of a `harness = false` test target.
pub fn run_main(mut tree: TestTree) {
    let config = RunConfig::from_args();
    let mut logger = ConsoleLogger::new(config.color);

    if config.list {
        tree.list(&mut logger);
        return;
    }

    let root = tree.root();
    tree.group_mut(root).set_print_summary(config.summary);
    let passed = tree.run(&mut logger);
    drop(logger);

    if !passed {
        std::process::exit(1);
    }
}

// ============================================================================
// Running
// ============================================================================

impl TestTree {
    /// Run the whole tree from its root. Returns the root's result.
    pub fn run(&mut self, logger: &mut dyn Logger) -> bool {
        let root = self.root();
        self.run_group(root, logger)
    }

    /// Run one group and everything beneath it.
    ///
    /// The group passes when nothing beneath it failed or was cancelled.
    /// Only the root prints its own name and clears every status left from
    /// an earlier run; nested groups are announced by their parent.
    pub fn run_group(&mut self, id: GroupId, logger: &mut dyn Logger) -> bool {
        let name = self.name(id).to_string();
        let _span = tracing::debug_span!(target: "treespec", "group", name = %name).entered();

        let is_root = self.is_root(id);
        let root = self.root_of(id);
        if is_root || self.group(root).max_test_name == 0 {
            self.update_name_width();
        }
        if is_root {
            self.reset_statuses();
            logger.styled_line(&name, Style::Banner);
            logger.nest();
        }

        self.node_mut(id).status = Status::default();
        self.group_mut(id).outcomes.clear();

        {
            let group = self.group_mut(id);
            group.hooks.before_group();
            (group.on_before_run)();
        }

        for child in self.children(id).to_vec() {
            match self.classify(child) {
                Child::Test(test) => self.run_child_test(id, test, logger),
                Child::Group(group) => self.run_child_group(id, group, logger),
            }
        }

        {
            let group = self.group_mut(id);
            group.hooks.after_group();
            (group.on_after_run)();
        }

        if self.group(id).print_summary {
            summary::print_summary(self.outcomes(id), is_root, logger);
        }
        if is_root {
            logger.unnest();
        }

        let result = self.outcomes(id).all_passed();
        self.node_mut(id).status = Status {
            has_run: true,
            result,
            cancelled: false,
        };
        debug!(target: "treespec", group = %name, result, "group finished");
        result
    }

    /// Run one test unless a dependency did not pass.
    ///
    /// A dependency that never ran has `result == false` too, so cancellation
    /// spreads along dependency chains on its own.
    pub fn run_test(&mut self, id: TestId) -> bool {
        let ready = self
            .node(id)
            .required()
            .iter()
            .all(|dep| self.status(*dep).result);

        self.node_mut(id).status = Status::default();
        if !ready {
            self.test_mut(id).context.reset();
            self.node_mut(id).status.cancelled = true;
            debug!(target: "treespec", test = %self.name(id), "dependency did not pass, cancelled");
            return false;
        }

        let result = self.test_mut(id).execute();
        self.node_mut(id).status = Status {
            has_run: true,
            result,
            cancelled: false,
        };
        debug!(target: "treespec", test = %self.name(id), result, "test finished");
        result
    }

    /// Status lines align to the longest test name in the whole tree.
    fn update_name_width(&mut self) {
        let root = self.root();
        let width = self
            .all_tests(root)
            .into_iter()
            .map(|test| self.name(test).chars().count())
            .max()
            .unwrap_or(0);
        self.group_mut(root).max_test_name = width;
    }

    fn run_child_test(&mut self, parent: GroupId, test: TestId, logger: &mut dyn Logger) {
        let name = self.name(test).to_string();
        let width = self.group(self.root_of(parent)).max_test_name;
        let padding = "-".repeat(width.saturating_sub(name.chars().count()));
        logger.write(&format!("{name}{padding}|"), Style::Plain);

        logger.mute();
        (self.group_mut(parent).on_before_each_test)();
        let passed = self.run_test(test);
        (self.group_mut(parent).on_after_each_test)();
        logger.unmute();

        if passed {
            logger.styled_line("passed", Style::Passed);
            self.group_mut(parent).outcomes.passed.push(name);
        } else if self.status(test).cancelled {
            logger.styled_line("cancelled", Style::Cancelled);
            self.group_mut(parent).outcomes.cancelled.push(name);
        } else {
            logger.styled_line("FAILED", Style::Failed);
            logger.nest();
            self.test(test).context().errors().render(logger);
            logger.unnest();
            self.group_mut(parent).outcomes.failed.push(name);
        }
    }

    fn run_child_group(&mut self, parent: GroupId, group: GroupId, logger: &mut dyn Logger) {
        let name = self.name(group).to_string();
        logger.styled_line(&name, Style::Banner);
        logger.nest();

        if self.group(group).is_empty() {
            self.group_mut(parent).outcomes.empty_groups.push(name.clone());
        }

        let ready = self
            .node(group)
            .required()
            .iter()
            .all(|dep| self.status(*dep).result);

        if ready {
            self.run_group(group, logger);
        } else {
            let count = self.cancel_group(group);
            debug!(target: "treespec", group = %name, count, "dependency did not pass, group cancelled");
            logger.styled_line(&format!("Cancelled {count} tests"), Style::Cancelled);
        }

        logger.unnest();

        let outcomes = self.outcomes(group).clone();
        self.group_mut(parent).outcomes.merge_prefixed(&name, &outcomes);
    }

    /// Mark every node beneath `id` cancelled without running anything.
    /// Returns how many tests were cancelled.
    fn cancel_group(&mut self, id: GroupId) -> usize {
        self.node_mut(id).status = cancelled();
        let mut names = Vec::new();

        for child in self.children(id).to_vec() {
            match self.classify(child) {
                Child::Test(test) => {
                    self.test_mut(test).context.reset();
                    self.node_mut(test).status = cancelled();
                    names.push(self.name(test).to_string());
                }
                Child::Group(group) => {
                    self.cancel_group(group);
                    let prefix = self.name(group);
                    names.extend(
                        self.outcomes(group)
                            .cancelled
                            .iter()
                            .map(|name| format!("{prefix}/{name}")),
                    );
                }
            }
        }

        let count = names.len();
        let outcomes = &mut self.group_mut(id).outcomes;
        outcomes.clear();
        outcomes.cancelled = names;
        count
    }

    /// Print every test's path, with the paths of its dependencies.
    pub fn list(&self, logger: &mut dyn Logger) {
        for test in self.all_tests(self.root()) {
            let required = self.node(test).required();
            if required.is_empty() {
                logger.line(&self.path(test));
            } else {
                let deps: Vec<String> = required.iter().map(|dep| self.path(*dep)).collect();
                logger.line(&format!("{} (after: {})", self.path(test), deps.join(", ")));
            }
        }
    }

    /// Render the error report of one test.
    pub fn render_errors(&self, id: TestId, logger: &mut dyn Logger) {
        self.test(id).context().errors().render(logger);
    }
}

fn cancelled() -> Status {
    Status {
        has_run: false,
        result: false,
        cancelled: true,
    }
}

impl Test {
    /// Run the body once against a fresh context. Faults never escape.
    fn execute(&mut self) -> bool {
        self.context.begin();
        let Some(mut body) = self.body.take() else {
            self.context.record_fault("test body is not available");
            return false;
        };

        let context = &mut self.context;
        let outcome = catch_unwind(AssertUnwindSafe(|| body(context)));
        self.body = Some(body);

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => self.context.record_fault(&format!("{error:#}")),
            Err(payload) => self.context.record_fault(&panic_message(payload.as_ref())),
        }
        self.context.result()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
