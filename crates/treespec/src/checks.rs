//! Checks a test body records its expectations with.
//!
//! Every check leaves the context alone on success. On failure it appends an
//! entry under the current section and marks the test failed; the body keeps
//! running. Use the macros (`check!`, `compare!`, ...) to fill in the call
//! site and the checked expression automatically.

use crate::context::{location, TestContext};
use std::fmt::Display;

/// Tolerance used by approximate comparisons unless one is given.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Scalars that can be compared within a tolerance.
pub trait Approx: Copy + Display {
    fn abs_diff(self, other: Self) -> f64;
}

macro_rules! impl_approx {
    ($($ty:ty),*) => {
        $(
            impl Approx for $ty {
                fn abs_diff(self, other: Self) -> f64 {
                    (self as f64 - other as f64).abs()
                }
            }
        )*
    };
}

impl_approx!(f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

/// `|left - right| < epsilon`
pub fn approx_eq<T: Approx>(left: T, right: T, epsilon: f64) -> bool {
    left.abs_diff(right) < epsilon
}

/// A two-component vector, compared component by component.
pub trait Vec2 {
    type Scalar: Copy + PartialEq + Display;

    fn x(&self) -> Self::Scalar;
    fn y(&self) -> Self::Scalar;
}

impl<T: Copy + PartialEq + Display> Vec2 for (T, T) {
    type Scalar = T;

    fn x(&self) -> T {
        self.0
    }

    fn y(&self) -> T {
        self.1
    }
}

impl<T: Copy + PartialEq + Display> Vec2 for [T; 2] {
    type Scalar = T;

    fn x(&self) -> T {
        self[0]
    }

    fn y(&self) -> T {
        self[1]
    }
}

/// Render a vector as `(x y)`.
pub fn vec2_to_string<V: Vec2>(vec: &V) -> String {
    format!("({} {})", vec.x(), vec.y())
}

impl TestContext {
    /// Attach an informational line. Does not fail the test.
    pub fn message(&mut self, file: &str, line: u32, message: &str) {
        let entry = format!("{message} {}", location(file, line));
        self.current_error().add(entry);
    }

    /// Fail with `Failed condition: <expr>` unless `value` holds.
    pub fn check(&mut self, file: &str, line: u32, value: bool, expr: &str) -> bool {
        if !value {
            let entry = format!("Failed condition: {expr} {}", location(file, line));
            self.current_error().add(entry);
            self.fail();
        }
        value
    }

    /// Like [`check`](Self::check), with `message` in place of `Failed condition`.
    pub fn check_with(
        &mut self,
        file: &str,
        line: u32,
        value: bool,
        expr: &str,
        message: &str,
    ) -> bool {
        if !value {
            let entry = format!("{message}: {expr} {}", location(file, line));
            self.current_error().add(entry);
            self.fail();
        }
        value
    }

    /// Fail unless `actual == expected`, reporting both values.
    pub fn compare<A, E>(&mut self, file: &str, line: u32, name: &str, actual: A, expected: E) -> bool
    where
        A: PartialEq<E> + Display,
        E: Display,
    {
        if actual != expected {
            self.compare_fail(file, line, name, &actual.to_string(), &expected.to_string());
            return false;
        }
        true
    }

    /// Fail unless `actual == expected`, rendering values with `to_str`.
    pub fn compare_fmt<T: PartialEq>(
        &mut self,
        file: &str,
        line: u32,
        name: &str,
        actual: T,
        expected: T,
        to_str: impl Fn(&T) -> String,
    ) -> bool {
        self.compare_by(file, line, name, actual, expected, to_str, |a, b| a == b)
    }

    /// Fail unless `eq(actual, expected)`, rendering values with `to_str`.
    #[allow(clippy::too_many_arguments)]
    pub fn compare_by<T>(
        &mut self,
        file: &str,
        line: u32,
        name: &str,
        actual: T,
        expected: T,
        to_str: impl Fn(&T) -> String,
        eq: impl Fn(&T, &T) -> bool,
    ) -> bool {
        if !eq(&actual, &expected) {
            self.compare_fail(file, line, name, &to_str(&actual), &to_str(&expected));
            return false;
        }
        true
    }

    /// Fail unless `|actual - expected| < epsilon`.
    pub fn approx_compare<T: Approx>(
        &mut self,
        file: &str,
        line: u32,
        name: &str,
        actual: T,
        expected: T,
        epsilon: f64,
    ) -> bool {
        if !approx_eq(actual, expected, epsilon) {
            self.compare_fail(file, line, name, &actual.to_string(), &expected.to_string());
            return false;
        }
        true
    }

    /// Fail unless both components are equal.
    pub fn vec2_compare<V: Vec2>(
        &mut self,
        file: &str,
        line: u32,
        name: &str,
        actual: V,
        expected: V,
    ) -> bool {
        if actual.x() != expected.x() || actual.y() != expected.y() {
            self.compare_fail(file, line, name, &vec2_to_string(&actual), &vec2_to_string(&expected));
            return false;
        }
        true
    }

    /// Fail unless both components are within `epsilon`.
    pub fn vec2_approx_compare<V>(
        &mut self,
        file: &str,
        line: u32,
        name: &str,
        actual: V,
        expected: V,
        epsilon: f64,
    ) -> bool
    where
        V: Vec2,
        V::Scalar: Approx,
    {
        let x_ok = approx_eq(actual.x(), expected.x(), epsilon);
        let y_ok = approx_eq(actual.y(), expected.y(), epsilon);
        if !x_ok || !y_ok {
            self.compare_fail(file, line, name, &vec2_to_string(&actual), &vec2_to_string(&expected));
            return false;
        }
        true
    }

    fn compare_fail(&mut self, file: &str, line: u32, name: &str, actual: &str, expected: &str) {
        let entry = self
            .current_error()
            .add(format!("{name} {}", location(file, line)));
        entry.add(format!("Expected value: {expected}"));
        entry.add(format!("Actual value:   {actual}"));
        self.fail();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> TestContext {
        let mut ctx = TestContext::new();
        ctx.begin();
        ctx
    }

    fn messages(ctx: &TestContext) -> Vec<String> {
        ctx.errors().lines().map(|(_, m)| m.to_string()).collect()
    }

    #[test]
    fn test_passing_checks_leave_no_trace() {
        let mut ctx = started();
        assert!(ctx.check("a.rs", 1, 2 + 2 == 4, "2 + 2 == 4"));
        assert!(ctx.compare("a.rs", 2, "four", 4, 4));
        assert!(ctx.approx_compare("a.rs", 3, "pi", 3.14159, 3.1416, DEFAULT_EPSILON));
        assert!(ctx.vec2_compare("a.rs", 4, "pos", (1, 2), (1, 2)));
        assert!(ctx.result());
        assert!(ctx.errors().children().is_empty());
    }

    #[test]
    fn test_failed_condition_entry() {
        let mut ctx = started();
        assert!(!ctx.check("src/t.rs", 10, false, "false"));
        assert!(!ctx.result());
        assert_eq!(messages(&ctx), vec!["Failed condition: false [t.rs:10]"]);
    }

    #[test]
    fn test_check_with_custom_message() {
        let mut ctx = started();
        ctx.check_with("t.rs", 11, false, "x > 0", "This test is expected to fail");
        assert_eq!(
            messages(&ctx),
            vec!["This test is expected to fail: x > 0 [t.rs:11]"]
        );
    }

    #[test]
    fn test_failed_checks_do_not_stop_later_ones() {
        let mut ctx = started();
        ctx.check("t.rs", 1, false, "a");
        ctx.check("t.rs", 2, true, "b");
        ctx.check("t.rs", 3, false, "c");
        assert_eq!(ctx.errors().children().len(), 2);
    }

    #[test]
    fn test_compare_reports_expected_then_actual() {
        let mut ctx = started();
        assert!(!ctx.compare("t.rs", 5, "four", 5, 4));
        assert_eq!(
            messages(&ctx),
            vec!["four [t.rs:5]", "Expected value: 4", "Actual value:   5"]
        );
    }

    #[test]
    fn test_compare_strings_across_types() {
        let mut ctx = started();
        let owned = String::from("abc");
        assert!(ctx.compare("t.rs", 1, "owned", owned.as_str(), "abc"));
        assert!(!ctx.compare("t.rs", 2, "owned", owned, "abd"));
    }

    #[test]
    fn test_compare_by_uses_custom_equality() {
        let mut ctx = started();
        let same_len = |a: &&str, b: &&str| a.len() == b.len();
        let show = |s: &&str| format!("<{s}>");
        assert!(ctx.compare_by("t.rs", 1, "word", "abc", "xyz", show, same_len));
        assert!(!ctx.compare_by("t.rs", 2, "word", "abc", "wxyz", show, same_len));
        assert_eq!(messages(&ctx)[1], "Expected value: <wxyz>");
    }

    #[test]
    fn test_approx_compare_honors_epsilon() {
        let mut ctx = started();
        assert!(ctx.approx_compare("t.rs", 1, "v", 1.00001f32, 1.0f32, DEFAULT_EPSILON));
        assert!(!ctx.approx_compare("t.rs", 2, "v", 1.001, 1.0, DEFAULT_EPSILON));
        assert!(ctx.approx_compare("t.rs", 3, "v", 1.001, 1.0, 0.01));
        assert_eq!(ctx.errors().children().len(), 1);
    }

    #[test]
    fn test_vec2_failure_renders_whole_vector() {
        let mut ctx = started();
        assert!(!ctx.vec2_compare("t.rs", 8, "pos", [1, 2], [1, 3]));
        assert_eq!(
            messages(&ctx),
            vec!["pos [t.rs:8]", "Expected value: (1 3)", "Actual value:   (1 2)"]
        );
    }

    #[test]
    fn test_vec2_approx_compare() {
        let mut ctx = started();
        assert!(ctx.vec2_approx_compare("t.rs", 1, "p", (0.5, 0.25), (0.50001, 0.25), DEFAULT_EPSILON));
        assert!(!ctx.vec2_approx_compare("t.rs", 2, "p", (0.5, 0.25), (0.5, 0.3), DEFAULT_EPSILON));
        assert!(!ctx.result());
    }

    #[test]
    fn test_message_does_not_fail() {
        let mut ctx = started();
        ctx.message("t.rs", 3, "note");
        assert!(ctx.result());
        assert_eq!(messages(&ctx), vec!["note [t.rs:3]"]);
    }

    #[test]
    fn test_checks_attach_inside_open_section() {
        let mut ctx = started();
        {
            let mut section = ctx.section("setup", "t.rs", 1);
            section.check("t.rs", 2, false, "ready");
        }
        ctx.check("t.rs", 4, false, "done");

        let top: Vec<&str> = ctx.errors().children().iter().map(|e| e.message()).collect();
        assert_eq!(top, vec!["setup [t.rs:1]", "Failed condition: done [t.rs:4]"]);
        assert_eq!(ctx.errors().children()[0].children().len(), 1);
    }
}
