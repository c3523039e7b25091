//! A single namespace entry with lazily fetched value and description.

use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use crate::client::Sysctl;
use crate::codec::{self, TypedValue};
use crate::error::{Result, SysctlError};
use crate::kind::{CtlType, FormatHint, Kind};
use crate::oid::Oid;

#[derive(Debug, Clone)]
enum Cached {
    Unresolved,
    Resolved(Option<TypedValue>),
}

/// One entry of the namespace.
///
/// Path, name, kind and format hint are resolved when the node is built.
/// The value and description are fetched on first access and cached until
/// [`Node::invalidate`]; the value cache sits behind a lock so a node can be
/// shared across threads.
#[derive(Debug)]
pub struct Node {
    ctl: Sysctl,
    oid: Oid,
    name: String,
    kind: Kind,
    format: FormatHint,
    description: OnceLock<String>,
    value: Mutex<Cached>,
}

impl Node {
    pub(crate) fn resolve(ctl: Sysctl, oid: Oid, kind: Kind, format: FormatHint) -> Result<Self> {
        let name = ctl.name(&oid)?;
        Ok(Self {
            ctl,
            oid,
            name,
            kind,
            format,
            description: OnceLock::new(),
            value: Mutex::new(Cached::Unresolved),
        })
    }

    /// Numeric path.
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// Dotted display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Packed kind word.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Type tag.
    pub fn ctl_type(&self) -> CtlType {
        self.kind.ctl_type()
    }

    /// Format hint.
    pub fn format(&self) -> &FormatHint {
        &self.format
    }

    /// Writable at runtime.
    pub fn is_writable(&self) -> bool {
        self.kind.is_writable()
    }

    /// Settable at boot time.
    pub fn is_tuneable(&self) -> bool {
        self.kind.is_tuneable()
    }

    /// Description, fetched once.
    ///
    /// # Errors
    ///
    /// [`SysctlError::Unsupported`] when the platform has no descriptions.
    pub fn description(&self) -> Result<&str> {
        if let Some(text) = self.description.get() {
            return Ok(text);
        }
        let text = self.ctl.description(&self.oid)?;
        Ok(self.description.get_or_init(|| text))
    }

    /// Decoded value, fetched once; `None` for interior nodes.
    ///
    /// # Errors
    ///
    /// Kernel failures and decode errors.
    pub fn value(&self) -> Result<Option<TypedValue>> {
        let mut cached = self.lock_value();
        if let Cached::Resolved(value) = &*cached {
            return Ok(value.clone());
        }
        let value = match self.ctl.fetch(&self.oid)? {
            Some(raw) => Some(codec::decode(&raw, self.kind, &self.format)?),
            None => None,
        };
        *cached = Cached::Resolved(value.clone());
        Ok(value)
    }

    /// Write a new value and drop the cached one.
    ///
    /// # Errors
    ///
    /// [`SysctlError::NotWritable`] for read-only nodes (and tuneables when
    /// the policy says so), encode validation errors, and kernel failures.
    /// Nothing is written when validation fails.
    pub fn set(&self, value: TypedValue) -> Result<()> {
        if !self.is_writable() {
            return Err(SysctlError::NotWritable(self.name.clone()));
        }
        if self.is_tuneable() && self.ctl.policy().reject_tuneable_writes {
            return Err(SysctlError::NotWritable(format!(
                "{} is a boot-time tuneable",
                self.name
            )));
        }
        let raw = codec::encode(&value, self.kind, &self.format)?;
        let mut cached = self.lock_value();
        self.ctl.store(&self.oid, &raw)?;
        debug!(name = %self.name, "value written");
        *cached = Cached::Unresolved;
        Ok(())
    }

    /// Forget the cached value so the next read queries the kernel.
    pub fn invalidate(&self) {
        *self.lock_value() = Cached::Unresolved;
    }

    fn lock_value(&self) -> MutexGuard<'_, Cached> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Sysctl: {}>", self.name)
    }
}
