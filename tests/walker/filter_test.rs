//! Writability filter.

use std::sync::Arc;

use sysctl_tree::kernel::MockKernel;
use sysctl_tree::{Access, Node, Sysctl};

fn walk(start: Option<&str>, access: Access) -> Vec<Node> {
    Sysctl::with_kernel(Arc::new(MockKernel::fixture()))
        .filter(start, access)
        .expect("walk")
}

fn names(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(|node| node.name().to_owned()).collect()
}

#[test]
fn writable_only() {
    let nodes = walk(Some("kern"), Access::WritableOnly);
    assert!(nodes.iter().all(Node::is_writable));
    assert_eq!(
        names(&nodes),
        vec![
            "kern.maxfiles",
            "kern.hostname",
            "kern.ipc.maxsockbuf",
            "kern.ipc.soacceptqueue",
            "kern.securelevel",
            "kern.dummy",
        ]
    );
}

#[test]
fn read_only_only() {
    let nodes = walk(Some("kern"), Access::ReadOnlyOnly);
    assert!(nodes.iter().all(|node| !node.is_writable()));
    assert_eq!(
        names(&nodes),
        vec!["kern.ostype", "kern.osrelease", "kern.maxproc", "kern.clockrate"]
    );
}

#[test]
fn filters_partition_the_unfiltered_walk() {
    let all = names(&walk(None, Access::Any));
    let writable = names(&walk(None, Access::WritableOnly));
    let read_only = names(&walk(None, Access::ReadOnlyOnly));
    assert_eq!(writable.len().saturating_add(read_only.len()), all.len());

    // Each filtered list is a subsequence of the full walk.
    for subset in [&writable, &read_only] {
        let mut rest = all.iter();
        assert!(subset.iter().all(|name| rest.any(|candidate| candidate == name)));
    }
}

#[test]
fn leaf_start_ignores_the_filter() {
    let nodes = walk(Some("hw.ncpu"), Access::WritableOnly);
    assert_eq!(names(&nodes), vec!["hw.ncpu"]);
}
