//! Name, kind and description resolution through the meta-paths.

use std::sync::Arc;

use sysctl_tree::kernel::MockKernel;
use sysctl_tree::{CtlType, Oid, Sysctl, SysctlError};

fn ctl() -> Sysctl {
    Sysctl::with_kernel(Arc::new(MockKernel::fixture()))
}

#[test]
fn forward_and_reverse_agree() {
    let ctl = ctl();
    for name in ["kern.hostname", "kern.ipc.maxsockbuf", "hw.pagesizes", "vm"] {
        let oid = ctl.oid(name).expect("forward");
        assert_eq!(ctl.name(&oid).expect("reverse"), name);
    }
}

#[test]
fn unknown_name_is_not_found() {
    let err = ctl().oid("totally.bogus.name").expect_err("unknown");
    assert!(matches!(err, SysctlError::NotFound(_)));
}

#[test]
fn kind_and_format_for_clockrate() {
    let ctl = ctl();
    let oid = ctl.oid("kern.clockrate").expect("oid");
    let (kind, format) = ctl.kind(&oid).expect("kind");
    assert_eq!(kind.ctl_type(), CtlType::Opaque);
    assert!(format.is_clockinfo());
    assert!(!kind.is_writable());
}

#[test]
fn interior_node_kind() {
    let ctl = ctl();
    let (kind, format) = ctl.kind(&Oid::from(vec![1, 30])).expect("kind");
    assert!(kind.is_node());
    assert_eq!(format.as_str(), "N");
}

#[test]
fn description_text_and_empty() {
    let ctl = ctl();
    assert_eq!(
        ctl.description(&Oid::from(vec![1, 10])).expect("described"),
        "Hostname"
    );
    assert_eq!(ctl.description(&Oid::from(vec![6, 3])).expect("blank"), "");
}

#[test]
fn description_unsupported_platform() {
    let ctl = Sysctl::with_kernel(Arc::new(MockKernel::fixture().without_descriptions()));
    let err = ctl
        .description(&Oid::from(vec![1, 10]))
        .expect_err("no descriptions");
    assert!(err.is_unsupported());
}

#[test]
fn next_walks_leaves_in_order() {
    let ctl = ctl();
    let next = ctl.next(&Oid::from(vec![1, 12])).expect("next");
    assert_eq!(next, Some(Oid::from(vec![1, 30, 1])));
    assert_eq!(ctl.next(&Oid::from(vec![6, 100])).expect("end"), None);
}

#[test]
fn path_below_leaf_is_malformed() {
    let err = ctl().fetch(&Oid::from(vec![1, 1, 4])).expect_err("below a leaf");
    assert!(matches!(err, SysctlError::MalformedPath(_)));
}

#[test]
fn next_noskip_returns_skipped_entries() {
    let ctl = ctl();
    let after = Oid::from(vec![2, 20]);
    assert_eq!(ctl.next(&after).expect("next"), Some(Oid::from(vec![6, 1])));
    assert_eq!(
        ctl.next_noskip(&after).expect("next"),
        Some(Oid::from(vec![2, 25]))
    );
}
