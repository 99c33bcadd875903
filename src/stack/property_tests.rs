//! Property-based tests for the window stack
//!
//! These tests drive the stack with arbitrary operation sequences and
//! verify the structural invariants: one window per level, strictly
//! ascending z-order, and a topmost that always matches the highest
//! occupied slot.

use super::*;
use crate::config::StrataConfig;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum StackOp {
    Push(u64, WindowLevel),
    Pop(u64),
    PopAll,
}

fn level_strategy() -> impl Strategy<Value = WindowLevel> {
    prop_oneof![
        Just(WindowLevel::Low),
        Just(WindowLevel::Medium),
        Just(WindowLevel::High),
    ]
}

fn op_strategy() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        (1u64..16, level_strategy()).prop_map(|(controller, level)| StackOp::Push(controller, level)),
        (1u64..16).prop_map(StackOp::Pop),
        Just(StackOp::PopAll),
    ]
}

fn driven_stack(ops: &[StackOp]) -> (WindowStack, Arc<AssociationTable>) {
    let table = Arc::new(AssociationTable::new());
    let stack = WindowStack::with_table(0, &StrataConfig::default(), Arc::clone(&table))
        .expect("stack creation must succeed");
    for op in ops {
        match op {
            StackOp::Push(controller, level) => {
                let _ = stack.push(*controller, *level, None, None);
            }
            StackOp::Pop(controller) => {
                let _ = stack.pop(*controller, None, None);
            }
            StackOp::PopAll => {
                let _ = stack.pop_all(None, None);
            }
        }
    }
    (stack, table)
}

proptest! {
    #[test]
    fn ordered_windows_stay_strictly_ascending(
        ops in proptest::collection::vec(op_strategy(), 0..48)
    ) {
        let (stack, _table) = driven_stack(&ops);

        let ordered = stack.ordered_windows();
        prop_assert!(!ordered.is_empty());
        prop_assert!(ordered[0].is_root());
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].z_index() < pair[1].z_index());
        }
        prop_assert_eq!(ordered.last().unwrap().id, stack.topmost_window().id);
    }

    #[test]
    fn each_level_holds_at_most_one_window(
        ops in proptest::collection::vec(op_strategy(), 0..48)
    ) {
        let (stack, _table) = driven_stack(&ops);

        let ordered = stack.ordered_windows();
        for level in WindowLevel::ALL {
            let at_level = ordered
                .iter()
                .filter(|w| w.level == Some(level))
                .count();
            prop_assert!(at_level <= 1);
            prop_assert_eq!(
                stack.window_at(level).map(|w| w.controller),
                stack.controller_at(level)
            );
        }
    }

    #[test]
    fn repeated_pushes_at_one_level_always_replace(
        controllers in proptest::collection::vec(1u64..12, 1..12)
    ) {
        let table = Arc::new(AssociationTable::new());
        let stack = WindowStack::with_table(0, &StrataConfig::default(), Arc::clone(&table))
            .expect("stack creation must succeed");

        let mut last_window_id = None;
        for controller in &controllers {
            let window = stack.push(*controller, WindowLevel::Medium, None, None);
            // The previous occupant is gone from the table as soon as
            // the synchronous transition finalizes.
            if let Some(previous) = last_window_id {
                prop_assert!(table.get(previous).is_none());
            }
            last_window_id = Some(window.id);
        }

        prop_assert_eq!(stack.ordered_windows().len(), 2);
        prop_assert_eq!(
            stack.controller_at(WindowLevel::Medium),
            controllers.last().copied()
        );
    }

    #[test]
    fn managed_windows_stay_associated(
        ops in proptest::collection::vec(op_strategy(), 0..48)
    ) {
        let (stack, table) = driven_stack(&ops);

        for window in stack.ordered_windows() {
            let association = table.get(window.id);
            prop_assert!(association.is_some());
            prop_assert_eq!(association.unwrap().owner, Some(stack.id()));
        }
    }
}
