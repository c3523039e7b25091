//! Namespace enumeration with an optional writability filter.
//!
//! A walk resolves its starting name, short-circuits on a leaf, and
//! otherwise asks the kernel for the next leaf until the namespace ends
//! or the returned path leaves the starting subtree. Whole-namespace walks
//! leave out entries the kernel marks as skipped; a walk below a named
//! node lists them.

use serde::Deserialize;
use tracing::debug;

use crate::client::Sysctl;
use crate::error::Result;
use crate::kernel::CTL_KERN;
use crate::kind::Kind;
use crate::node::Node;
use crate::oid::Oid;

/// Writability filter applied during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Every node.
    #[default]
    Any,
    /// Only nodes writable at runtime.
    WritableOnly,
    /// Only nodes that are not writable at runtime.
    ReadOnlyOnly,
}

impl Access {
    /// Build from the tri-state flag used by callers: `Some(true)` for
    /// writable only, `Some(false)` for read-only only.
    pub fn from_writable(writable: Option<bool>) -> Self {
        match writable {
            None => Self::Any,
            Some(true) => Self::WritableOnly,
            Some(false) => Self::ReadOnlyOnly,
        }
    }

    /// Whether a node of `kind` passes the filter.
    pub fn admits(self, kind: Kind) -> bool {
        match self {
            Self::Any => true,
            Self::WritableOnly => kind.is_writable(),
            Self::ReadOnlyOnly => !kind.is_writable(),
        }
    }
}

#[derive(Debug)]
enum State {
    Start(Option<String>),
    Iterate {
        prefix: Oid,
        frontier: Oid,
        noskip: bool,
    },
    Done,
}

/// Lazy enumeration; yields nodes in kernel namespace order.
///
/// The first error ends the walk.
#[derive(Debug)]
pub struct Walk {
    ctl: Sysctl,
    access: Access,
    state: State,
}

impl Walk {
    pub(crate) fn new(ctl: Sysctl, start: Option<&str>, access: Access) -> Self {
        let start = start.filter(|name| !name.is_empty()).map(str::to_owned);
        Self {
            ctl,
            access,
            state: State::Start(start),
        }
    }

    fn begin(&mut self, start: Option<String>) -> Result<Option<Node>> {
        let Some(name) = start else {
            self.state = State::Iterate {
                prefix: Oid::root(),
                frontier: Oid::from(vec![CTL_KERN]),
                noskip: false,
            };
            return Ok(None);
        };
        let oid = match self.ctl.oid(&name) {
            Ok(oid) => oid,
            Err(err) => {
                debug!(%name, error = %err, "start did not resolve, nothing to walk");
                return Ok(None);
            }
        };
        let (kind, format) = self.ctl.kind(&oid)?;
        if kind.is_node() {
            self.state = State::Iterate {
                prefix: oid.clone(),
                frontier: oid,
                noskip: true,
            };
            return Ok(None);
        }
        Node::resolve(self.ctl.clone(), oid, kind, format).map(Some)
    }

    fn step(&mut self, prefix: Oid, frontier: Oid, noskip: bool) -> Result<Option<Node>> {
        let next = if noskip {
            self.ctl.next_noskip(&frontier)?
        } else {
            self.ctl.next(&frontier)?
        };
        let Some(next) = next else {
            debug!(%prefix, "end of namespace");
            return Ok(None);
        };
        if !prefix.is_prefix_of(&next) {
            debug!(%prefix, %next, "left the subtree");
            return Ok(None);
        }
        let (kind, format) = self.ctl.kind(&next)?;
        self.state = State::Iterate {
            prefix,
            frontier: next.clone(),
            noskip,
        };
        if !self.access.admits(kind) {
            return Ok(None);
        }
        Node::resolve(self.ctl.clone(), next, kind, format).map(Some)
    }
}

impl Iterator for Walk {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let outcome = match std::mem::replace(&mut self.state, State::Done) {
                State::Done => return None,
                State::Start(start) => self.begin(start),
                State::Iterate {
                    prefix,
                    frontier,
                    noskip,
                } => self.step(prefix, frontier, noskip),
            };
            match outcome {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => continue,
                Err(err) => {
                    self.state = State::Done;
                    return Some(Err(err));
                }
            }
        }
    }
}
