// Tests for deep_clone and nested ownership
use crate::*;

fn sample() -> Metatable {
    let t = Metatable::new();
    t.set("name", "lamp").unwrap();
    t.set("level", 3).unwrap();
    let nested = Metatable::new();
    nested.set("inner", "value").unwrap();
    nested.set("list", vec![1, 2, 3]).unwrap();
    t.set("nested", nested).unwrap();
    t
}

#[test]
fn test_clone_is_equal_but_distinct() {
    let t = sample();
    let copy = t.deep_clone();

    assert!(!copy.ptr_eq(&t));
    assert!(copy.deep_eq(&t));
    assert_eq!(copy.ref_count(), 1);
}

#[test]
fn test_mutating_clone_leaves_source() {
    let t = sample();
    let copy = t.deep_clone();

    copy.set("name", "other").unwrap();
    let nested = copy.get("nested").unwrap();
    let nested = nested.as_table().unwrap();
    nested.set("inner", ()).unwrap();
    nested.get("list").unwrap().as_table().unwrap().push(4).unwrap();

    assert_eq!(t.get("name").unwrap().as_str(), Some("lamp"));
    let source_nested = t.get("nested").unwrap();
    let source_nested = source_nested.as_table().unwrap();
    assert_eq!(source_nested.get("inner").unwrap().as_str(), Some("value"));
    assert_eq!(source_nested.get("list").unwrap().as_table().unwrap().len(), 3);
}

#[test]
fn test_mutating_source_leaves_clone() {
    let t = sample();
    let copy = t.deep_clone();

    t.set("level", ()).unwrap();
    t.get("nested").unwrap().as_table().unwrap().set("extra", true).unwrap();

    assert_eq!(copy.get("level").unwrap().as_number(), Some(3.0));
    let nested = copy.get("nested").unwrap();
    assert!(nested.as_table().unwrap().get("extra").unwrap().is_nil());
}

#[test]
fn test_storing_shared_table_copies_it() {
    let shared = Metatable::new();
    shared.set("a", 1).unwrap();

    let t = Metatable::new();
    t.set("child", &shared).unwrap();
    shared.set("a", 2).unwrap();

    let child = t.get("child").unwrap();
    assert!(!child.as_table().unwrap().ptr_eq(&shared));
    assert_eq!(child.as_table().unwrap().get("a").unwrap().as_number(), Some(1.0));
}

#[test]
fn test_storing_table_into_itself() {
    let t = Metatable::new();
    t.set("a", 1).unwrap();
    t.set("self", &t).unwrap();

    let inner = t.get("self").unwrap();
    let inner = inner.as_table().unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner.get("a").unwrap().as_number(), Some(1.0));
}

#[test]
fn test_clone_of_empty() {
    let copy = Metatable::new().deep_clone();
    assert!(copy.is_empty());
}

#[test]
fn test_storing_ancestor_copies_it() {
    let root = Metatable::new();
    root.set("child", Metatable::new()).unwrap();
    let child = Metatable::from_value(root.get("child").unwrap()).unwrap();

    // `root` is handed over by value while `child` lives inside it
    child.set("loop", root).unwrap();

    let copy = Metatable::from_value(child.get("loop").unwrap()).unwrap();
    let inner = Metatable::from_value(copy.get("child").unwrap()).unwrap();
    assert!(!inner.ptr_eq(&child));
    assert!(inner.is_empty());
}
