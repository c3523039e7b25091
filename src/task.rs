//! Async facade for callers on a tokio runtime.
//!
//! Every call that may block in the kernel runs on the blocking pool, so
//! the async executor thread is free for the duration of the call.

use std::sync::Arc;

use tokio::task;

use crate::client::Sysctl;
use crate::codec::TypedValue;
use crate::error::{Result, SysctlError};
use crate::node::Node;
use crate::oid::Oid;
use crate::walker::Access;

/// Async wrapper around [`Sysctl`].
#[derive(Debug, Clone)]
pub struct AsyncSysctl {
    ctl: Sysctl,
}

impl AsyncSysctl {
    /// Wrap a handle.
    pub fn new(ctl: Sysctl) -> Self {
        Self { ctl }
    }

    /// Underlying blocking handle.
    pub fn blocking(&self) -> &Sysctl {
        &self.ctl
    }

    /// See [`Sysctl::filter`].
    ///
    /// # Errors
    ///
    /// Walk failures, or [`SysctlError::Task`] if the blocking task dies.
    pub async fn filter(&self, start: Option<String>, access: Access) -> Result<Vec<Arc<Node>>> {
        let ctl = self.ctl.clone();
        run(move || {
            ctl.filter(start.as_deref(), access)
                .map(|nodes| nodes.into_iter().map(Arc::new).collect())
        })
        .await
    }

    /// See [`Sysctl::node`].
    ///
    /// # Errors
    ///
    /// Resolution failures, or [`SysctlError::Task`].
    pub async fn node(&self, name: impl Into<String>) -> Result<Arc<Node>> {
        let ctl = self.ctl.clone();
        let name = name.into();
        run(move || ctl.node(&name).map(Arc::new)).await
    }

    /// See [`Sysctl::oid`].
    ///
    /// # Errors
    ///
    /// Resolution failures, or [`SysctlError::Task`].
    pub async fn oid(&self, name: impl Into<String>) -> Result<Oid> {
        let ctl = self.ctl.clone();
        let name = name.into();
        run(move || ctl.oid(&name)).await
    }

    /// See [`Node::value`].
    ///
    /// # Errors
    ///
    /// Read failures, or [`SysctlError::Task`].
    pub async fn value(&self, node: Arc<Node>) -> Result<Option<TypedValue>> {
        run(move || node.value()).await
    }

    /// See [`Node::description`].
    ///
    /// # Errors
    ///
    /// Read failures, or [`SysctlError::Task`].
    pub async fn description(&self, node: Arc<Node>) -> Result<String> {
        run(move || node.description().map(str::to_owned)).await
    }

    /// See [`Node::set`].
    ///
    /// # Errors
    ///
    /// Write failures, or [`SysctlError::Task`].
    pub async fn set(&self, node: Arc<Node>, value: TypedValue) -> Result<()> {
        run(move || node.set(value)).await
    }
}

async fn run<T, F>(call: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(call)
        .await
        .map_err(|err| SysctlError::Task(err.to_string()))?
}
