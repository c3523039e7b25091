//! Rendering nodes for the command line.

use std::fmt::Write as _;

use serde::Serialize;

use crate::codec::TypedValue;
use crate::error::Result;
use crate::kind::CtlType;
use crate::node::Node;
use crate::oid::Oid;

/// What to include for each node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Print names only; skips value reads.
    pub names_only: bool,
    /// Print descriptions instead of values.
    pub describe: bool,
    /// Append the type label to each value.
    pub show_type: bool,
}

/// Snapshot of one node, ready to print.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    /// Dotted name.
    pub name: String,
    /// Numeric path.
    pub oid: Oid,
    /// Type tag.
    #[serde(rename = "type")]
    pub ctl_type: CtlType,
    /// Format hint, when the kernel reports one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Writable at runtime.
    pub writable: bool,
    /// Settable at boot time.
    pub tuneable: bool,
    /// Decoded value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TypedValue>,
    /// Description text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeReport {
    /// Read whatever `options` asks for from `node`.
    ///
    /// A platform without descriptions yields `None` rather than an error.
    ///
    /// # Errors
    ///
    /// Value or description read failures.
    pub fn collect(node: &Node, options: ReportOptions) -> Result<Self> {
        let value = if options.names_only || options.describe {
            None
        } else {
            node.value()?
        };
        let description = if options.describe {
            match node.description() {
                Ok(text) => Some(text.to_owned()),
                Err(err) if err.is_unsupported() => None,
                Err(err) => return Err(err),
            }
        } else {
            None
        };
        Ok(Self {
            name: node.name().to_owned(),
            oid: node.oid().clone(),
            ctl_type: node.ctl_type(),
            format: node.format().as_str().to_owned(),
            writable: node.is_writable(),
            tuneable: node.is_tuneable(),
            value,
            description,
        })
    }
}

/// `sysctl(8)`-style text: one `name: value` line per node.
pub fn render_text(reports: &[NodeReport], options: ReportOptions) -> String {
    let mut out = String::new();
    for report in reports {
        if options.names_only {
            let _ = writeln!(out, "{}", report.name);
            continue;
        }
        let body = if options.describe {
            report.description.clone().unwrap_or_default()
        } else {
            report
                .value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        };
        if options.show_type {
            let _ = writeln!(out, "{}: {} ({})", report.name, body, report.ctl_type);
        } else {
            let _ = writeln!(out, "{}: {}", report.name, body);
        }
    }
    out
}

/// Pretty-printed JSON array.
///
/// # Errors
///
/// Serialization failures.
pub fn render_json(reports: &[NodeReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
