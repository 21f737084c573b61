//! The classic example tree: three modules, lists gated on each other,
//! and empty groups at two depths.

use treespec::{check, compare, GroupId, MemoryLogger, TestTree};

fn module_1(tree: &mut TestTree, parent: GroupId) -> GroupId {
    let module = tree.add_group(parent, "ExampleModule1", &[]);

    let list_1 = tree.add_group(module, "List1", &[]);
    let first = tree.add_test(list_1, "first", &[], |t| {
        let four = 2 + 2;
        check!(t, four > 0);
        compare!(t, four, 4);
        Ok(())
    });
    let second = tree.add_test(list_1, "second", &[first.into()], |_| Ok(()));
    tree.add_test(list_1, "third", &[second.into()], |_| Ok(()));

    let list_2 = tree.add_group(module, "List2", &[]);
    let first = tree.add_test(list_2, "first", &[], |_| Ok(()));
    let second = tree.add_test(list_2, "second", &[], |t| {
        check!(t, false);
        Ok(())
    });
    tree.add_test(list_2, "third", &[first.into(), second.into()], |_| Ok(()));

    list_3(tree, module, list_2);
    module
}

fn list_3(tree: &mut TestTree, parent: GroupId, after: GroupId) {
    let list = tree.add_group(parent, "List3", &[after.into()]);
    tree.chain(list, &[], |chain| {
        chain.step("first", |_| Ok(()));
        chain.step("second", |_| Ok(()));
        chain.step("third", |_| Ok(()));
    });
}

fn module_2(tree: &mut TestTree, parent: GroupId, after: GroupId) -> GroupId {
    let module = tree.add_group(parent, "ExampleModule2", &[after.into()]);
    let list_1 = tree.add_group(module, "List1", &[]);
    tree.add_test(list_1, "first", &[], |_| Ok(()));
    module
}

fn module_3(tree: &mut TestTree, parent: GroupId) -> GroupId {
    let module = tree.add_group(parent, "ExampleModule3", &[]);
    let list_1 = tree.add_group(module, "List1", &[]);
    tree.add_test(list_1, "first", &[], |_| Ok(()));
    let second = tree.add_test(list_1, "second", &[], |t| {
        check!(t, false);
        Ok(())
    });
    tree.add_test(list_1, "third", &[second.into()], |_| Ok(()));
    tree.add_group(module, "EmptyModule", &[]);
    module
}

fn example_tree() -> TestTree {
    let mut tree = TestTree::new("Example tests");
    let root = tree.root();
    tree.group_mut(root).set_print_summary(true);

    let m1 = module_1(&mut tree, root);
    module_2(&mut tree, root, m1);
    module_3(&mut tree, root);
    tree.add_group(root, "EmptyModule", &[]);

    for group in tree.child_groups(root) {
        tree.group_mut(group).set_print_summary(true);
    }
    tree
}

#[test]
fn example_tree_outcomes() {
    let mut tree = example_tree();
    let mut logger = MemoryLogger::new();
    assert!(!tree.run(&mut logger));

    let outcomes = tree.outcomes(tree.root());
    assert_eq!(
        outcomes.passed,
        vec![
            "ExampleModule1/List1/first",
            "ExampleModule1/List1/second",
            "ExampleModule1/List1/third",
            "ExampleModule1/List2/first",
            "ExampleModule3/List1/first",
        ]
    );
    assert_eq!(
        outcomes.cancelled,
        vec![
            "ExampleModule1/List2/third",
            "ExampleModule1/List3/first",
            "ExampleModule1/List3/second",
            "ExampleModule1/List3/third",
            "ExampleModule2/List1/first",
            "ExampleModule3/List1/third",
        ]
    );
    assert_eq!(
        outcomes.failed,
        vec!["ExampleModule1/List2/second", "ExampleModule3/List1/second"]
    );
    assert_eq!(
        outcomes.empty_groups,
        vec!["ExampleModule3/EmptyModule", "EmptyModule"]
    );
}

#[test]
fn example_tree_report() {
    let mut tree = example_tree();
    let mut logger = MemoryLogger::new();
    tree.run(&mut logger);
    let lines = logger.lines();

    // Status lines are padded to the longest test name, "second".
    assert_eq!(lines[0], "Example tests");
    assert_eq!(lines[1], "  ExampleModule1");
    assert_eq!(lines[2], "    List1");
    assert_eq!(lines[3], "      first-|passed");
    assert_eq!(lines[4], "      second|passed");
    assert_eq!(lines[5], "      third-|passed");
    assert_eq!(lines[6], "    List2");
    assert_eq!(lines[7], "      first-|passed");
    assert_eq!(lines[8], "      second|FAILED");
    assert!(lines[9].starts_with("        Failed condition: false [example_modules_test.rs:"));
    assert_eq!(lines[10], "      third-|cancelled");
    assert_eq!(lines[11], "    List3");
    assert_eq!(lines[12], "      Cancelled 3 tests");
    assert_eq!(lines[13], "    Passed 4 tests, cancelled 4 tests, failed 1 tests:");
    assert_eq!(lines[14], "      List2/second");
    assert_eq!(lines[15], "  ExampleModule2");
    assert_eq!(lines[16], "    Cancelled 1 tests");

    let contents = logger.contents();
    assert!(contents.contains("    WARNING: 1 empty groups:\n      EmptyModule\n"));
    assert!(contents.ends_with(
        "  Passed 5 tests, cancelled 6 tests, failed 2 tests:\n\
         \x20   ExampleModule1/List2/second\n\
         \x20   ExampleModule3/List1/second\n\
         \x20 WARNING: 2 empty groups:\n\
         \x20   ExampleModule3/EmptyModule\n\
         \x20   EmptyModule\n"
    ));
    assert!(!contents.contains("ALL PASSED"));
}

#[test]
fn cancelled_module_never_runs_its_subtree() {
    let mut tree = example_tree();
    tree.run(&mut MemoryLogger::new());

    let module_2 = tree
        .child_groups(tree.root())
        .into_iter()
        .find(|group| tree.name(*group) == "ExampleModule2")
        .expect("module 2 exists");
    assert!(tree.status(module_2).cancelled);
    for test in tree.all_tests(module_2) {
        let status = tree.status(test);
        assert!(status.cancelled);
        assert!(!status.has_run);
    }
}
