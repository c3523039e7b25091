//! The async facade over the mock namespace.

use std::sync::Arc;

use sysctl_tree::kernel::{Kernel, MockKernel};
use sysctl_tree::{Access, AsyncSysctl, Oid, Sysctl, SysctlError, TypedValue};

fn setup() -> (Arc<MockKernel>, AsyncSysctl) {
    let kernel = Arc::new(MockKernel::fixture());
    let ctl = Sysctl::with_kernel(Arc::clone(&kernel) as Arc<dyn Kernel>);
    (kernel, AsyncSysctl::new(ctl))
}

#[tokio::test]
async fn filter_matches_the_blocking_walk() {
    let (_, ctl) = setup();
    let nodes = ctl
        .filter(Some("kern.ipc".to_owned()), Access::Any)
        .await
        .expect("walk");
    let names: Vec<&str> = nodes.iter().map(|node| node.name()).collect();
    assert_eq!(names, vec!["kern.ipc.maxsockbuf", "kern.ipc.soacceptqueue"]);

    let blocking = ctl
        .blocking()
        .filter(Some("kern.ipc"), Access::Any)
        .expect("walk");
    assert_eq!(blocking.len(), nodes.len());
}

#[tokio::test]
async fn resolve_read_and_describe() {
    let (_, ctl) = setup();
    assert_eq!(
        ctl.oid("hw.ncpu").await.expect("oid"),
        Oid::from(vec![6, 3])
    );
    let node = ctl.node("kern.ostype").await.expect("node");
    assert_eq!(
        ctl.value(Arc::clone(&node)).await.expect("value"),
        Some(TypedValue::Text("FreeBSD".into()))
    );
    assert_eq!(
        ctl.description(node).await.expect("description"),
        "Operating system type"
    );
}

#[tokio::test]
async fn set_runs_on_the_blocking_pool() {
    let (kernel, ctl) = setup();
    let node = ctl.node("vm.overcommit").await.expect("node");
    ctl.set(Arc::clone(&node), TypedValue::Int(1))
        .await
        .expect("write");
    assert_eq!(kernel.writes(), 1);
    assert_eq!(
        ctl.value(node).await.expect("value"),
        Some(TypedValue::Int(1))
    );
}

#[tokio::test]
async fn errors_pass_through() {
    let (_, ctl) = setup();
    let err = ctl.node("no.such.node").await.expect_err("unknown");
    assert!(matches!(err, SysctlError::NotFound(_)));
}
