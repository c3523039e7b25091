//! Enumeration order, subtree boundaries and failure handling.

use std::sync::Arc;

use sysctl_tree::kernel::MockKernel;
use sysctl_tree::{Access, Errno, Node, Sysctl, SysctlError};

fn names(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(|node| node.name().to_owned()).collect()
}

#[test]
fn kern_walk_yields_every_leaf_below_kern() {
    let ctl = Sysctl::with_kernel(Arc::new(MockKernel::fixture()));
    let kern = ctl.oid("kern").expect("kern");
    let nodes = ctl.filter(Some("kern"), Access::Any).expect("walk");
    assert_eq!(
        names(&nodes),
        vec![
            "kern.ostype",
            "kern.osrelease",
            "kern.maxproc",
            "kern.maxfiles",
            "kern.hostname",
            "kern.clockrate",
            "kern.ipc.maxsockbuf",
            "kern.ipc.soacceptqueue",
            "kern.securelevel",
            "kern.dummy",
        ]
    );
    assert!(nodes.iter().all(|node| kern.is_ancestor_of(node.oid())));
    assert!(nodes.iter().all(|node| !node.kind().is_node()));
}

#[test]
fn whole_namespace_is_sorted() {
    let ctl = Sysctl::with_kernel(Arc::new(MockKernel::fixture()));
    let nodes = ctl.filter(None, Access::Any).expect("walk");
    let oids: Vec<_> = nodes.iter().map(|node| node.oid().clone()).collect();
    let mut sorted = oids.clone();
    sorted.sort();
    assert_eq!(oids, sorted);
    assert_eq!(names(&nodes).last().map(String::as_str), Some("hw.pagesizes"));
}

#[test]
fn leaf_start_is_a_single_node() {
    let ctl = Sysctl::with_kernel(Arc::new(MockKernel::fixture()));
    let nodes = ctl.filter(Some("kern.hostname"), Access::Any).expect("walk");
    assert_eq!(names(&nodes), vec!["kern.hostname"]);
}

#[test]
fn unknown_start_is_empty() {
    let ctl = Sysctl::with_kernel(Arc::new(MockKernel::fixture()));
    let nodes = ctl
        .filter(Some("totally.bogus.name"), Access::Any)
        .expect("walk");
    assert!(nodes.is_empty());
}

#[test]
fn kind_failure_on_start_propagates() {
    let kernel = Arc::new(MockKernel::fixture());
    // Kind meta-path for hw.ncpu.
    kernel.fail_with(&[0, 4, 6, 3], Errno::EPERM);
    let ctl = Sysctl::with_kernel(kernel);
    let err = ctl
        .filter(Some("hw.ncpu"), Access::Any)
        .expect_err("kind lookup fails");
    assert_eq!(err.errno(), Some(Errno::EPERM));
}

#[test]
fn next_failure_ends_the_walk_with_an_error() {
    let kernel = Arc::new(MockKernel::fixture());
    // Next-leaf meta-path after kern.maxfiles.
    kernel.fail_with(&[0, 2, 1, 7], Errno::EPERM);
    let ctl = Sysctl::with_kernel(kernel);

    let mut walk = ctl.walk(Some("kern"), Access::Any);
    let mut seen = Vec::new();
    let mut failure = None;
    for item in walk.by_ref() {
        match item {
            Ok(node) => seen.push(node.name().to_owned()),
            Err(err) => failure = Some(err),
        }
    }
    assert_eq!(
        seen,
        vec!["kern.ostype", "kern.osrelease", "kern.maxproc", "kern.maxfiles"]
    );
    assert!(matches!(failure, Some(SysctlError::KernelIo { .. })));
    assert!(walk.next().is_none());

    assert!(ctl.filter(Some("kern"), Access::Any).is_err());
}

#[test]
fn walk_is_lazy() {
    let kernel = Arc::new(MockKernel::fixture());
    let ctl = Sysctl::with_kernel(Arc::clone(&kernel) as Arc<dyn sysctl_tree::kernel::Kernel>);
    let mut walk = ctl.walk(None, Access::Any);
    let first = walk.next().expect("one item").expect("node");
    assert_eq!(first.name(), "kern.ostype");
    let after_first = kernel.calls();
    let second = walk.next().expect("one item").expect("node");
    assert_eq!(second.name(), "kern.osrelease");
    assert!(kernel.calls() > after_first);
}

#[test]
fn failed_start_lookup_is_an_empty_walk() {
    let kernel = Arc::new(MockKernel::fixture());
    // Name-to-oid meta-path.
    kernel.fail_with(&[0, 3], Errno::EINVAL);
    let ctl = Sysctl::with_kernel(kernel);
    let nodes = ctl.filter(Some("kern"), Access::Any).expect("empty, not an error");
    assert!(nodes.is_empty());
}

#[test]
fn skipped_entries_only_show_below_a_named_start() {
    let ctl = Sysctl::with_kernel(Arc::new(MockKernel::fixture()));

    let vm = ctl.filter(Some("vm"), Access::Any).expect("walk");
    assert_eq!(
        names(&vm),
        vec!["vm.loadavg", "vm.overcommit", "vm.kmem_size", "vm.pmap_debug"]
    );

    let all = ctl.filter(None, Access::Any).expect("walk");
    assert!(names(&all).iter().all(|name| name != "vm.pmap_debug"));
    assert!(names(&all).iter().any(|name| name == "vm.kmem_size"));
}
