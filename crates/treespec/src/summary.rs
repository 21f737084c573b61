//! End-of-run summary.

use crate::logger::{Logger, Style};
use crate::tree::Outcomes;

/// Print counts, failed names and empty groups. `ALL PASSED` appears only
/// for the root, and only if something passed and nothing else happened.
pub fn print_summary(outcomes: &Outcomes, is_root: bool, logger: &mut dyn Logger) {
    let counts = format!(
        "Passed {} tests, cancelled {} tests, failed {} tests",
        outcomes.passed.len(),
        outcomes.cancelled.len(),
        outcomes.failed.len()
    );

    if outcomes.failed.is_empty() {
        logger.line(&counts);
    } else {
        logger.write(&counts, Style::Plain);
        logger.line(":");
        logger.nest();
        for name in &outcomes.failed {
            logger.styled_line(name, Style::Failed);
        }
        logger.unnest();
    }

    if !outcomes.empty_groups.is_empty() {
        let warning = format!("WARNING: {} empty groups:", outcomes.empty_groups.len());
        logger.styled_line(&warning, Style::Warning);
        logger.nest();
        for name in &outcomes.empty_groups {
            logger.line(name);
        }
        logger.unnest();
    }

    if is_root && !outcomes.passed.is_empty() && outcomes.all_passed() {
        logger.styled_line("ALL PASSED", Style::Passed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_passed_at_root() {
        let outcomes = Outcomes {
            passed: names(&["a", "G/b"]),
            ..Outcomes::default()
        };
        let mut logger = MemoryLogger::new();
        print_summary(&outcomes, true, &mut logger);
        assert_eq!(
            logger.lines(),
            vec!["Passed 2 tests, cancelled 0 tests, failed 0 tests", "ALL PASSED"]
        );
    }

    #[test]
    fn test_no_all_passed_below_root() {
        let outcomes = Outcomes {
            passed: names(&["a"]),
            ..Outcomes::default()
        };
        let mut logger = MemoryLogger::new();
        print_summary(&outcomes, false, &mut logger);
        assert_eq!(logger.lines().len(), 1);
    }

    #[test]
    fn test_no_all_passed_without_passes() {
        let mut logger = MemoryLogger::new();
        print_summary(&Outcomes::default(), true, &mut logger);
        assert_eq!(
            logger.lines(),
            vec!["Passed 0 tests, cancelled 0 tests, failed 0 tests"]
        );
    }

    #[test]
    fn test_failures_and_empty_groups_listed() {
        let outcomes = Outcomes {
            passed: names(&["a"]),
            cancelled: names(&["G/c"]),
            failed: names(&["G/b"]),
            empty_groups: names(&["E", "G/F"]),
        };
        let mut logger = MemoryLogger::new();
        print_summary(&outcomes, true, &mut logger);
        assert_eq!(
            logger.contents(),
            "Passed 1 tests, cancelled 1 tests, failed 1 tests:\n\
             \x20 G/b\n\
             WARNING: 2 empty groups:\n\
             \x20 E\n\
             \x20 G/F\n"
        );
    }
}
