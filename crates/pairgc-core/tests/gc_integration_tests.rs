//! Integration tests for Garbage Collection
//!
//! Tests cover:
//! - Rooted objects survive, unrooted objects are reclaimed
//! - Nested object graphs
//! - Cycles (mutual and self-referential)
//! - Growth threshold triggering
//! - Flag hygiene, count consistency, idempotence
//! - Teardown

use pairgc_core::{Object, ObjectRef, Vm, VmError, VmOptions};
use std::collections::HashSet;

/// Every handle reachable from the VM's roots, computed without the collector
fn reachable(vm: &Vm) -> HashSet<ObjectRef> {
    let mut seen = HashSet::new();
    let mut pending: Vec<ObjectRef> = vm.roots().to_vec();
    while let Some(handle) = pending.pop() {
        if !seen.insert(handle) {
            continue;
        }
        if let Some(object) = vm.get(handle) {
            pending.extend(object.references());
        }
    }
    seen
}

fn assert_no_marks(vm: &Vm) {
    assert!(
        vm.heap().iter().all(|(_, object)| !object.is_marked()),
        "mark bits leaked past the end of a cycle"
    );
}

// ===== Scenarios =====

#[test]
fn test_objects_on_stack_are_preserved() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();

    assert_eq!(vm.collect(), 0);
    assert_eq!(vm.num_allocated(), 2);
    assert_eq!(vm.destroy(), 2);
}

#[test]
fn test_unreached_objects_are_collected() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    vm.pop().unwrap();
    vm.pop().unwrap();

    assert_eq!(vm.collect(), 2);
    assert_eq!(vm.num_allocated(), 0);
    assert_eq!(vm.destroy(), 0);
}

#[test]
fn test_reach_nested_objects() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    let p1 = vm.push_pair().unwrap();
    vm.push_scalar(3).unwrap();
    vm.push_scalar(4).unwrap();
    let p2 = vm.push_pair().unwrap();
    let p3 = vm.push_pair().unwrap();

    assert_eq!(vm.collect(), 0);
    assert_eq!(vm.num_allocated(), 7);
    assert_eq!(vm.stack_depth(), 1);
    assert_eq!(vm.get(p3).and_then(Object::as_pair), Some((p1, p2)));
    assert_eq!(vm.display(p3).to_string(), "((1, 2), (3, 4))");
    assert_eq!(vm.destroy(), 7);
}

#[test]
fn test_handle_cycles() {
    let mut vm = Vm::new();
    let one = vm.push_scalar(1).unwrap();
    let two = vm.push_scalar(2).unwrap();
    let a = vm.push_pair().unwrap();
    let three = vm.push_scalar(3).unwrap();
    let four = vm.push_scalar(4).unwrap();
    let b = vm.push_pair().unwrap();

    // Set up a cycle, and also make 2 and 4 unreachable
    vm.set_second(a, b).unwrap();
    vm.set_second(b, a).unwrap();

    assert_eq!(vm.collect(), 2);
    assert_eq!(vm.num_allocated(), 4);
    for survivor in [one, three, a, b] {
        assert!(vm.contains(survivor));
    }
    assert!(!vm.contains(two));
    assert!(!vm.contains(four));
    assert_eq!(vm.destroy(), 4);
}

#[test]
fn test_stack_overflow_is_reported() {
    let mut vm = Vm::new();
    for i in 0..256 {
        vm.push_scalar(i).unwrap();
    }

    assert_eq!(
        vm.push_scalar(256),
        Err(VmError::StackOverflow { capacity: 256 })
    );
    assert_eq!(vm.stack_depth(), 256);
}

#[test]
fn test_stack_underflow_is_reported() {
    let mut vm = Vm::new();
    assert_eq!(vm.pop(), Err(VmError::StackUnderflow));
    assert_eq!(vm.push_pair(), Err(VmError::StackUnderflow));
}

// ===== Pair operand order =====

#[test]
fn test_pair_takes_second_from_top_of_stack() {
    let mut vm = Vm::new();
    let bottom = vm.push_scalar(10).unwrap();
    let top = vm.push_scalar(20).unwrap();
    let pair = vm.push_pair().unwrap();

    let object = vm.get(pair).unwrap();
    assert_eq!(object.first(), Some(bottom));
    assert_eq!(object.second(), Some(top));
    assert_eq!(vm.display(pair).to_string(), "(10, 20)");
}

#[test]
fn test_pair_operands_survive_triggered_collection() {
    // Threshold 2: the pair allocation finds both scalars live and collects
    let mut vm = Vm::with_options(VmOptions {
        gc_threshold: 2,
        ..Default::default()
    });
    let first = vm.push_scalar(1).unwrap();
    let second = vm.push_scalar(2).unwrap();
    let pair = vm.push_pair().unwrap();

    assert_eq!(vm.gc_stats().collections, 1);
    assert_eq!(vm.gc_stats().last_freed_count, 0);
    assert!(vm.contains(first));
    assert!(vm.contains(second));
    assert_eq!(vm.display(pair).to_string(), "(1, 2)");
}

// ===== Cycles =====

#[test]
fn test_self_cycle() {
    let mut vm = Vm::new();
    let seed = vm.push_scalar(0).unwrap();
    vm.push_scalar(0).unwrap();
    let pair = vm.push_pair().unwrap();
    vm.set_first(pair, pair).unwrap();
    vm.set_second(pair, pair).unwrap();

    assert_eq!(vm.collect(), 2);
    assert_eq!(vm.num_allocated(), 1);
    assert_eq!(vm.gc_stats().last_marked_count, 1);
    assert!(!vm.contains(seed));
}

#[test]
fn test_unrooted_cycle_is_collected() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    let a = vm.push_pair().unwrap();
    vm.push_scalar(3).unwrap();
    vm.push_scalar(4).unwrap();
    let b = vm.push_pair().unwrap();
    vm.set_first(a, b).unwrap();
    vm.set_first(b, a).unwrap();

    vm.pop().unwrap();
    vm.pop().unwrap();

    assert_eq!(vm.collect(), 6);
    assert_eq!(vm.num_allocated(), 0);
}

#[test]
fn test_long_ring() {
    let mut vm = Vm::with_options(VmOptions {
        gc_threshold: usize::MAX,
        ..Default::default()
    });
    let mut ring = Vec::new();
    for i in 0..100 {
        vm.push_scalar(i).unwrap();
        vm.push_scalar(i).unwrap();
        ring.push(vm.push_pair().unwrap());
        vm.pop().unwrap();
    }
    for window in ring.windows(2) {
        vm.set_second(window[0], window[1]).unwrap();
    }
    vm.set_second(ring[99], ring[0]).unwrap();

    // Reach the ring through one rooted pair; the detached scalars die
    let anchor = vm.push_scalar(-1).unwrap();
    vm.push_scalar(-1).unwrap();
    let holder = vm.push_pair().unwrap();
    vm.set_second(holder, ring[50]).unwrap();
    vm.collect();
    assert!(vm.contains(anchor));
    assert!(ring.iter().all(|&pair| vm.contains(pair)));
    assert_eq!(vm.num_allocated(), 202);

    // Nothing rooted: the whole ring goes
    vm.pop().unwrap();
    assert_eq!(vm.collect(), 202);
    assert_eq!(vm.num_allocated(), 0);
}

// ===== Growth threshold =====

#[test]
fn test_threshold_triggers_collection() {
    let mut vm = Vm::new();
    for i in 0..8 {
        vm.push_scalar(i).unwrap();
    }
    assert_eq!(vm.gc_stats().collections, 0);

    // Ninth allocation finds 8 live objects and collects first
    vm.push_scalar(8).unwrap();
    assert_eq!(vm.gc_stats().collections, 1);
    assert_eq!(vm.gc_stats().threshold_collections, 1);
    assert_eq!(vm.threshold(), 16);
    assert_eq!(vm.num_allocated(), 9);
}

#[test]
fn test_threshold_resets_after_explicit_collection() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    vm.push_scalar(3).unwrap();
    vm.pop().unwrap();

    vm.collect();
    assert_eq!(vm.threshold(), 4);
}

#[test]
fn test_zero_survivors_force_collection_on_next_allocation() {
    let mut vm = Vm::new();
    for i in 0..8 {
        vm.push_scalar(i).unwrap();
    }
    for _ in 0..8 {
        vm.pop().unwrap();
    }

    // Collects the 8 dead scalars, threshold drops to 0
    vm.push_scalar(100).unwrap();
    assert_eq!(vm.gc_stats().collections, 1);
    assert_eq!(vm.threshold(), 0);
    assert_eq!(vm.num_allocated(), 1);

    // Threshold 0 means this allocation collects again (the rooted 100 survives)
    vm.push_scalar(101).unwrap();
    assert_eq!(vm.gc_stats().collections, 2);
    assert_eq!(vm.threshold(), 2);
    assert_eq!(vm.num_allocated(), 2);
}

#[test]
fn test_custom_initial_threshold() {
    let mut vm = Vm::with_options(VmOptions {
        gc_threshold: 100,
        ..Default::default()
    });
    for i in 0..50 {
        vm.push_scalar(i).unwrap();
        vm.pop().unwrap();
    }
    assert_eq!(vm.gc_stats().collections, 0);
    assert_eq!(vm.num_allocated(), 50);
}

// ===== Properties =====

#[test]
fn test_flag_hygiene_after_every_collection() {
    let mut vm = Vm::with_options(VmOptions {
        gc_threshold: 3,
        ..Default::default()
    });
    for i in 0..40 {
        vm.push_scalar(i).unwrap();
        if i % 3 == 2 {
            vm.push_pair().unwrap();
        }
        assert_no_marks(&vm);
    }
    vm.collect();
    assert_no_marks(&vm);
}

#[test]
fn test_count_consistency() {
    let mut vm = Vm::with_options(VmOptions {
        gc_threshold: 4,
        ..Default::default()
    });
    for i in 0..30 {
        vm.push_scalar(i).unwrap();
        if i % 2 == 1 {
            vm.push_pair().unwrap();
        }
        if i % 5 == 4 {
            vm.pop().unwrap();
        }
        assert_eq!(vm.num_allocated(), vm.heap().iter().count());
        assert_eq!(vm.heap_stats().allocation_count, vm.num_allocated());
    }
}

#[test]
fn test_soundness_and_completeness() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    let a = vm.push_pair().unwrap();
    vm.push_scalar(3).unwrap();
    vm.push_scalar(4).unwrap();
    vm.push_pair().unwrap();
    vm.push_pair().unwrap();
    vm.push_scalar(5).unwrap();
    vm.push_scalar(6).unwrap();
    vm.push_pair().unwrap();
    vm.pop().unwrap();
    vm.set_first(a, a).unwrap();

    let expected = reachable(&vm);
    vm.collect();

    let live: HashSet<ObjectRef> = vm.heap().iter().map(|(handle, _)| handle).collect();
    assert_eq!(live, expected);
}

#[test]
fn test_collect_is_idempotent() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    let pair = vm.push_pair().unwrap();
    vm.push_scalar(3).unwrap();
    vm.pop().unwrap();

    assert_eq!(vm.collect(), 1);
    let snapshot = vm.heap_dump();

    assert_eq!(vm.collect(), 0);
    assert_eq!(vm.num_allocated(), 3);
    assert_eq!(vm.heap_dump(), snapshot);
    assert_eq!(vm.display(pair).to_string(), "(1, 2)");
}

#[test]
fn test_slots_are_reused_after_collection() {
    let mut vm = Vm::new();
    let old = vm.push_scalar(1).unwrap();
    vm.pop().unwrap();
    vm.collect();

    let new = vm.push_scalar(2).unwrap();
    assert_eq!(new.index(), old.index());
    assert!(!vm.contains(old));
    assert_eq!(vm.get(new).and_then(Object::as_scalar), Some(2));
    assert_eq!(vm.heap_stats().slot_count, 1);
}

#[test]
fn test_deep_graph_marks_without_recursion() {
    let mut vm = Vm::with_options(VmOptions {
        gc_threshold: usize::MAX,
        ..Default::default()
    });
    vm.push_scalar(0).unwrap();
    for i in 1..100_000 {
        vm.push_scalar(i).unwrap();
        vm.push_pair().unwrap();
    }

    assert_eq!(vm.collect(), 0);
    assert_eq!(vm.num_allocated(), 199_999);
    assert_eq!(vm.stack_depth(), 1);
}

// ===== Teardown =====

#[test]
fn test_teardown_releases_rooted_and_unrooted() {
    let mut vm = Vm::new();
    vm.push_scalar(1).unwrap();
    vm.push_scalar(2).unwrap();
    vm.push_pair().unwrap();
    vm.push_scalar(3).unwrap();
    vm.pop().unwrap();
    vm.push_scalar(4).unwrap();

    assert_eq!(vm.destroy(), 5);
}

#[test]
fn test_independent_vms() {
    let mut left = Vm::new();
    let mut right = Vm::new();

    left.push_scalar(1).unwrap();
    right.push_scalar(2).unwrap();
    right.pop().unwrap();

    assert_eq!(right.collect(), 1);
    assert_eq!(left.num_allocated(), 1);
    assert_eq!(right.num_allocated(), 0);
}
