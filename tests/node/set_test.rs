//! Writes through a node.

use std::sync::Arc;

use sysctl_tree::kernel::{Kernel, MockKernel};
use sysctl_tree::{Sysctl, SysctlError, TypedValue, WritePolicy};

fn setup() -> (Arc<MockKernel>, Sysctl) {
    let kernel = Arc::new(MockKernel::fixture());
    let ctl = Sysctl::with_kernel(Arc::clone(&kernel) as Arc<dyn Kernel>);
    (kernel, ctl)
}

#[test]
fn read_only_node_rejects_writes_without_touching_the_kernel() {
    let (kernel, ctl) = setup();
    let node = ctl.node("hw.ncpu").expect("node");
    let before = node.value().expect("value");

    let err = node.set(TypedValue::Int(4)).expect_err("read-only");
    assert!(matches!(err, SysctlError::NotWritable(_)));
    assert_eq!(kernel.writes(), 0);

    node.invalidate();
    assert_eq!(node.value().expect("value"), before);
}

#[test]
fn set_then_read_back() {
    let (kernel, ctl) = setup();
    let node = ctl.node("kern.hostname").expect("node");
    assert_eq!(node.value().expect("value"), Some(TypedValue::Text("mock.local".into())));

    node.set(TypedValue::Text("build01".into())).expect("write");
    assert_eq!(kernel.writes(), 1);
    assert_eq!(kernel.value_of(&[1, 10]), Some(b"build01\0".to_vec()));
    assert_eq!(node.value().expect("value"), Some(TypedValue::Text("build01".into())));
}

#[test]
fn integer_write_is_native_width() {
    let (kernel, ctl) = setup();
    let node = ctl.node("kern.securelevel").expect("node");
    node.set(TypedValue::Int(2)).expect("write");
    assert_eq!(kernel.value_of(&[1, 32]), Some(2_i32.to_ne_bytes().to_vec()));
}

#[test]
fn mismatched_value_is_rejected_before_the_write() {
    let (kernel, ctl) = setup();
    let node = ctl.node("kern.maxfiles").expect("node");
    let err = node.set(TypedValue::Text("lots".into())).expect_err("type");
    assert!(matches!(err, SysctlError::TypeMismatch { .. }));
    assert_eq!(kernel.writes(), 0);
}

#[test]
fn out_of_range_value_is_rejected() {
    let (kernel, ctl) = setup();
    let node = ctl.node("kern.ipc.soacceptqueue").expect("node");
    let err = node.set(TypedValue::Int(-5)).expect_err("range");
    assert!(matches!(err, SysctlError::OutOfRange { .. }));
    assert_eq!(kernel.writes(), 0);
}

#[test]
fn tuneable_writes_follow_policy() {
    let (kernel, ctl) = setup();
    let strict = ctl.clone().with_policy(WritePolicy {
        reject_tuneable_writes: true,
    });
    let err = strict
        .node("kern.maxfiles")
        .expect("node")
        .set(TypedValue::Int(65_536))
        .expect_err("policy");
    assert!(matches!(err, SysctlError::NotWritable(_)));
    assert_eq!(kernel.writes(), 0);

    ctl.node("kern.maxfiles")
        .expect("node")
        .set(TypedValue::Int(65_536))
        .expect("default policy allows it");
    assert_eq!(kernel.writes(), 1);
}
