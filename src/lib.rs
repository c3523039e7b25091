//! sysctl-tree — typed, enumerable access to the BSD sysctl namespace.
//!
//! The kernel exposes a tree of numerically addressed nodes. This crate
//! walks that tree through the meta-path protocol, resolves names, kinds
//! and descriptions, and converts raw values to and from [`TypedValue`].
//!
//! See `DESIGN.md` for the architecture notes.

#![warn(missing_docs)]

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod kernel;
pub mod kind;
pub mod logging;
pub mod node;
pub mod oid;
pub mod query;
pub mod report;
pub mod resolve;
pub mod task;
pub mod walker;

pub use client::{Sysctl, WritePolicy};
pub use codec::{ClockInfo, TypedValue};
pub use error::{Errno, Result, SysctlError};
pub use kind::{CtlType, FormatHint, Kind};
pub use node::Node;
pub use oid::Oid;
pub use task::AsyncSysctl;
pub use walker::{Access, Walk};
