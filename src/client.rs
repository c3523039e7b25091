//! Cloneable handle tying a kernel backend to query limits and write policy.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::kernel::{Kernel, NativeKernel};
use crate::kind::{FormatHint, Kind};
use crate::node::Node;
use crate::oid::Oid;
use crate::query::{self, Fetched, QueryLimits};
use crate::resolve;
use crate::walker::{Access, Walk};

/// Write-side policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct WritePolicy {
    /// Treat boot-time tuneables as read-only even when the kernel marks
    /// them writable.
    #[serde(default)]
    pub reject_tuneable_writes: bool,
}

/// Entry point to the namespace.
///
/// Cheap to clone; every [`Node`] carries its own clone.
#[derive(Debug, Clone)]
pub struct Sysctl {
    kernel: Arc<dyn Kernel>,
    limits: QueryLimits,
    policy: WritePolicy,
}

impl Sysctl {
    /// Handle on the host kernel.
    ///
    /// # Errors
    ///
    /// [`crate::SysctlError::Unsupported`] on platforms without a sysctl namespace.
    pub fn native() -> Result<Self> {
        Ok(Self::with_kernel(Arc::new(NativeKernel::open()?)))
    }

    /// Handle on an arbitrary backend.
    pub fn with_kernel(kernel: Arc<dyn Kernel>) -> Self {
        Self {
            kernel,
            limits: QueryLimits::default(),
            policy: WritePolicy::default(),
        }
    }

    /// Replace the resize-retry limits.
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the write policy.
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active resize-retry limits.
    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Active write policy.
    pub fn policy(&self) -> &WritePolicy {
        &self.policy
    }

    /// Raw value bytes of `oid`; `None` for interior nodes.
    ///
    /// # Errors
    ///
    /// Kernel failures and [`crate::SysctlError::BufferLimit`].
    pub fn fetch(&self, oid: &Oid) -> Result<Option<Vec<u8>>> {
        match query::read(self.kernel.as_ref(), oid.as_slice(), None, &self.limits) {
            Ok(Fetched::Value(raw)) => Ok(Some(raw)),
            Ok(Fetched::Container) => Ok(None),
            Err(err) => Err(err.into_error(oid.as_slice())),
        }
    }

    /// Write raw bytes to `oid`.
    ///
    /// # Errors
    ///
    /// Kernel failures, mapped to the write taxonomy.
    pub fn store(&self, oid: &Oid, bytes: &[u8]) -> Result<()> {
        debug!(oid = %oid, len = bytes.len(), "writing value");
        query::write(self.kernel.as_ref(), oid.as_slice(), bytes)
            .map_err(|err| err.into_write_error(oid.as_slice()))
    }

    /// Kind and format hint of `oid`.
    ///
    /// # Errors
    ///
    /// See [`resolve::kind`].
    pub fn kind(&self, oid: &Oid) -> Result<(Kind, FormatHint)> {
        resolve::kind(self.kernel.as_ref(), &self.limits, oid)
    }

    /// Dotted name of `oid`.
    ///
    /// # Errors
    ///
    /// See [`resolve::name`].
    pub fn name(&self, oid: &Oid) -> Result<String> {
        resolve::name(self.kernel.as_ref(), &self.limits, oid)
    }

    /// Numeric path of a dotted name.
    ///
    /// # Errors
    ///
    /// See [`resolve::oid`].
    pub fn oid(&self, name: &str) -> Result<Oid> {
        resolve::oid(self.kernel.as_ref(), &self.limits, name)
    }

    /// Description of `oid`.
    ///
    /// # Errors
    ///
    /// See [`resolve::description`].
    pub fn description(&self, oid: &Oid) -> Result<String> {
        resolve::description(self.kernel.as_ref(), &self.limits, oid)
    }

    /// Next leaf after `oid`.
    ///
    /// # Errors
    ///
    /// See [`resolve::next`].
    pub fn next(&self, oid: &Oid) -> Result<Option<Oid>> {
        resolve::next(self.kernel.as_ref(), &self.limits, oid)
    }

    /// Next leaf after `oid`, including entries marked as skipped.
    ///
    /// # Errors
    ///
    /// See [`resolve::next_noskip`].
    pub fn next_noskip(&self, oid: &Oid) -> Result<Option<Oid>> {
        resolve::next_noskip(self.kernel.as_ref(), &self.limits, oid)
    }

    /// Node for a dotted name.
    ///
    /// # Errors
    ///
    /// [`crate::SysctlError::NotFound`] for unknown names, otherwise
    /// resolution failures.
    pub fn node(&self, name: &str) -> Result<Node> {
        let oid = self.oid(name)?;
        self.node_at(oid)
    }

    /// Node for a numeric path, resolving its kind and name.
    ///
    /// # Errors
    ///
    /// Resolution failures.
    pub fn node_at(&self, oid: Oid) -> Result<Node> {
        let (kind, format) = self.kind(&oid)?;
        Node::resolve(self.clone(), oid, kind, format)
    }

    /// Lazily enumerate nodes below `start` (the whole namespace when
    /// `None` or empty).
    pub fn walk(&self, start: Option<&str>, access: Access) -> Walk {
        Walk::new(self.clone(), start, access)
    }

    /// Enumerate nodes below `start` and collect them in namespace order.
    ///
    /// # Errors
    ///
    /// The first kernel failure met during the walk.
    pub fn filter(&self, start: Option<&str>, access: Access) -> Result<Vec<Node>> {
        self.walk(start, access).collect()
    }
}
