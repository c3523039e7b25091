//! In-memory namespace implementing the full meta-path protocol.
//!
//! Used by the test suite and by the CLI's `--mock` flag. Besides plain
//! reads and writes it can simulate a value growing between the size
//! probe and the fetch, and inject arbitrary errors per path.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Errno;
use crate::kind::{CtlType, Kind, CTLFLAG_RD, CTLFLAG_SKIP, CTLFLAG_TUN, CTLFLAG_WR};

use super::{
    Kernel, CTL_SYSCTL, CTL_SYSCTL_NAME, CTL_SYSCTL_NAME2OID, CTL_SYSCTL_NEXT,
    CTL_SYSCTL_NEXTNOSKIP, CTL_SYSCTL_OIDDESCR, CTL_SYSCTL_OIDFMT,
};

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    kind: Kind,
    format: String,
    description: Option<String>,
    value: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<Vec<i32>, Entry>,
    growth: HashMap<Vec<i32>, VecDeque<usize>>,
    failures: HashMap<Vec<i32>, Errno>,
    calls: usize,
    writes: usize,
}

/// In-memory [`Kernel`] backend.
#[derive(Debug)]
pub struct MockKernel {
    state: Mutex<State>,
    descriptions: bool,
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKernel {
    /// Empty namespace.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            descriptions: true,
        }
    }

    /// Add an interior node.
    pub fn node(self, oid: &[i32], name: &str) -> Self {
        self.insert(
            oid,
            Entry {
                name: name.to_owned(),
                kind: Kind::new(CtlType::Node, CTLFLAG_RD),
                format: "N".to_owned(),
                description: None,
                value: Vec::new(),
            },
        )
    }

    /// Add a leaf holding `value` exactly as the kernel would return it.
    pub fn leaf(self, oid: &[i32], name: &str, kind: Kind, format: &str, value: Vec<u8>) -> Self {
        self.insert(
            oid,
            Entry {
                name: name.to_owned(),
                kind,
                format: format.to_owned(),
                description: None,
                value,
            },
        )
    }

    /// Attach a description to an existing entry.
    pub fn describe(self, oid: &[i32], text: &str) -> Self {
        if let Some(entry) = self.lock().entries.get_mut(oid) {
            entry.description = Some(text.to_owned());
        }
        self
    }

    /// Behave like a platform without the description meta-path.
    pub fn without_descriptions(mut self) -> Self {
        self.descriptions = false;
        self
    }

    /// Make the next reads of `oid` grow its value by the queued byte counts,
    /// one per read that supplies a buffer, before the buffer size is checked.
    pub fn queue_growth(&self, oid: &[i32], amounts: impl IntoIterator<Item = usize>) {
        self.lock()
            .growth
            .entry(oid.to_vec())
            .or_default()
            .extend(amounts);
    }

    /// Fail every call against `name` (value or meta-path) with `errno`.
    pub fn fail_with(&self, name: &[i32], errno: Errno) {
        self.lock().failures.insert(name.to_vec(), errno);
    }

    /// Raw stored bytes of a leaf.
    pub fn value_of(&self, oid: &[i32]) -> Option<Vec<u8>> {
        self.lock().entries.get(oid).map(|entry| entry.value.clone())
    }

    /// Replace a leaf's stored bytes, bypassing write checks.
    pub fn set_raw(&self, oid: &[i32], value: Vec<u8>) {
        if let Some(entry) = self.lock().entries.get_mut(oid) {
            entry.value = value;
        }
    }

    /// Total number of primitive calls served.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Number of successful value writes.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// A small FreeBSD-shaped namespace: `kern`, `kern.ipc`, `vm` and `hw`.
    ///
    /// `vm.pmap_debug` is marked as skipped, so only walks below `vm` see it.
    pub fn fixture() -> Self {
        let ro = CTLFLAG_RD;
        let rw = CTLFLAG_RD | CTLFLAG_WR;
        Self::new()
            .node(&[1], "kern")
            .leaf(&[1, 1], "kern.ostype", Kind::new(CtlType::String, ro), "A", text("FreeBSD"))
            .describe(&[1, 1], "Operating system type")
            .leaf(&[1, 2], "kern.osrelease", Kind::new(CtlType::String, ro), "A", text("14.1-RELEASE"))
            .describe(&[1, 2], "Operating system release")
            .leaf(&[1, 6], "kern.maxproc", Kind::new(CtlType::Int, ro | CTLFLAG_TUN), "I", int(4116))
            .describe(&[1, 6], "Maximum number of processes")
            .leaf(&[1, 7], "kern.maxfiles", Kind::new(CtlType::Int, rw | CTLFLAG_TUN), "I", int(32_768))
            .describe(&[1, 7], "Maximum number of files")
            .leaf(&[1, 10], "kern.hostname", Kind::new(CtlType::String, rw), "A", text("mock.local"))
            .describe(&[1, 10], "Hostname")
            .leaf(
                &[1, 12],
                "kern.clockrate",
                Kind::new(CtlType::Opaque, ro),
                "S,clockinfo",
                [1000_i32, 1000, 0, 127, 8128]
                    .iter()
                    .flat_map(|v| v.to_ne_bytes())
                    .collect(),
            )
            .describe(&[1, 12], "Rate and period of various kernel clocks")
            .node(&[1, 30], "kern.ipc")
            .leaf(&[1, 30, 1], "kern.ipc.maxsockbuf", Kind::new(CtlType::Ulong, rw), "LU", ulong(2_097_152))
            .leaf(&[1, 30, 3], "kern.ipc.soacceptqueue", Kind::new(CtlType::Uint, rw), "IU", uint(4096))
            .leaf(&[1, 32], "kern.securelevel", Kind::new(CtlType::Int, rw), "I", int(-1))
            .leaf(&[1, 1000], "kern.dummy", Kind::new(CtlType::Int, rw), "I", int(0))
            .node(&[2], "vm")
            .leaf(
                &[2, 2],
                "vm.loadavg",
                Kind::new(CtlType::Opaque, ro),
                "S,loadavg",
                vec![0x2a; 24],
            )
            .leaf(&[2, 12], "vm.overcommit", Kind::new(CtlType::Int, rw), "I", int(0))
            .leaf(&[2, 20], "vm.kmem_size", Kind::new(CtlType::U64, ro), "QU", 8_589_934_592_u64.to_ne_bytes().to_vec())
            .leaf(
                &[2, 25],
                "vm.pmap_debug",
                Kind::new(CtlType::Int, ro | CTLFLAG_SKIP),
                "I",
                int(0),
            )
            .node(&[6], "hw")
            .leaf(&[6, 1], "hw.machine", Kind::new(CtlType::String, ro), "A", text("amd64"))
            .leaf(&[6, 3], "hw.ncpu", Kind::new(CtlType::Int, ro), "I", int(8))
            .leaf(&[6, 5], "hw.physmem", Kind::new(CtlType::Ulong, ro), "LU", ulong(17_179_869_184))
            .leaf(
                &[6, 100],
                "hw.pagesizes",
                Kind::new(CtlType::Ulong, ro),
                "S",
                [4096_u64, 2_097_152, 1_073_741_824]
                    .iter()
                    .flat_map(|v| ulong(*v))
                    .collect(),
            )
    }

    fn insert(self, oid: &[i32], entry: Entry) -> Self {
        self.lock().entries.insert(oid.to_vec(), entry);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Kernel for MockKernel {
    fn sysctl(
        &self,
        name: &[i32],
        old: Option<&mut [u8]>,
        new: Option<&[u8]>,
    ) -> Result<usize, Errno> {
        let mut state = self.lock();
        state.calls = state.calls.saturating_add(1);
        if let Some(errno) = state.failures.get(name) {
            return Err(*errno);
        }
        match name {
            [CTL_SYSCTL, selector, rest @ ..] => self.meta(&state, *selector, rest, old, new),
            _ => value_call(&mut state, name, old, new),
        }
    }
}

impl MockKernel {
    fn meta(
        &self,
        state: &State,
        selector: i32,
        rest: &[i32],
        old: Option<&mut [u8]>,
        new: Option<&[u8]>,
    ) -> Result<usize, Errno> {
        if new.is_some() && selector != CTL_SYSCTL_NAME2OID {
            return Err(Errno::EPERM);
        }
        let payload = match selector {
            CTL_SYSCTL_NAME => c_string(&lookup(state, rest)?.name),
            CTL_SYSCTL_NEXT | CTL_SYSCTL_NEXTNOSKIP => {
                let skip = selector == CTL_SYSCTL_NEXT;
                let next = state
                    .entries
                    .range::<[i32], _>((Bound::Excluded(rest), Bound::Unbounded))
                    .find(|(oid, entry)| !entry.kind.is_node() && !(skip && hidden(state, oid)))
                    .map(|(oid, _)| oid)
                    .ok_or(Errno::ENOENT)?;
                words(next)
            }
            CTL_SYSCTL_NAME2OID => {
                let raw = new.ok_or(Errno::EINVAL)?;
                let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
                let wanted = std::str::from_utf8(&raw[..end]).map_err(|_| Errno::EINVAL)?;
                let oid = state
                    .entries
                    .iter()
                    .find(|(_, entry)| entry.name == wanted)
                    .map(|(oid, _)| oid)
                    .ok_or(Errno::ENOENT)?;
                words(oid)
            }
            CTL_SYSCTL_OIDFMT => {
                let entry = lookup(state, rest)?;
                let mut payload = entry.kind.raw().to_ne_bytes().to_vec();
                payload.extend(c_string(&entry.format));
                payload
            }
            CTL_SYSCTL_OIDDESCR => {
                if !self.descriptions {
                    return Err(Errno::EOPNOTSUPP);
                }
                let entry = lookup(state, rest)?;
                c_string(entry.description.as_deref().unwrap_or(""))
            }
            _ => return Err(Errno::ENOENT),
        };
        respond(&payload, old)
    }
}

fn value_call(
    state: &mut State,
    name: &[i32],
    old: Option<&mut [u8]>,
    new: Option<&[u8]>,
) -> Result<usize, Errno> {
    let is_leaf_prefix = state
        .entries
        .iter()
        .any(|(oid, entry)| !entry.kind.is_node() && oid.len() < name.len() && name.starts_with(oid));
    if is_leaf_prefix {
        return Err(Errno::ENOTDIR);
    }
    let grow = if old.is_some() {
        state
            .growth
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0)
    } else {
        0
    };
    let entry = state.entries.get_mut(name).ok_or(Errno::ENOENT)?;
    if entry.kind.is_node() {
        return Err(Errno::EISDIR);
    }
    if let Some(bytes) = new {
        if !entry.kind.is_writable() {
            return Err(Errno::EPERM);
        }
        let mut stored = bytes.to_vec();
        if entry.kind.ctl_type() == CtlType::String {
            stored.push(0);
        }
        entry.value = stored;
        state.writes = state.writes.saturating_add(1);
        return Ok(0);
    }
    entry.value.resize(entry.value.len().saturating_add(grow), 0);
    respond(&entry.value, old)
}

/// Whether `oid` or one of its ancestors is marked as skipped.
fn hidden(state: &State, oid: &[i32]) -> bool {
    state
        .entries
        .iter()
        .any(|(prefix, entry)| entry.kind.is_skipped() && oid.starts_with(prefix))
}

fn lookup<'a>(state: &'a State, oid: &[i32]) -> Result<&'a Entry, Errno> {
    state.entries.get(oid).ok_or(Errno::ENOENT)
}

fn respond(payload: &[u8], old: Option<&mut [u8]>) -> Result<usize, Errno> {
    match old {
        None => Ok(payload.len()),
        Some(buf) if buf.len() < payload.len() => Err(Errno::ENOMEM),
        Some(buf) => {
            buf[..payload.len()].copy_from_slice(payload);
            Ok(payload.len())
        }
    }
}

fn words(oid: &[i32]) -> Vec<u8> {
    oid.iter().flat_map(|part| part.to_ne_bytes()).collect()
}

fn c_string(s: &str) -> Vec<u8> {
    let mut raw = s.as_bytes().to_vec();
    raw.push(0);
    raw
}

fn text(s: &str) -> Vec<u8> {
    c_string(s)
}

fn int(v: i32) -> Vec<u8> {
    v.to_ne_bytes().to_vec()
}

fn uint(v: u32) -> Vec<u8> {
    v.to_ne_bytes().to_vec()
}

fn ulong(v: u64) -> Vec<u8> {
    libc::c_ulong::try_from(v)
        .unwrap_or(libc::c_ulong::MAX)
        .to_ne_bytes()
        .to_vec()
}
