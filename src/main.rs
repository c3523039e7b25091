//! sysctl-tree CLI entry point.
//!
//! Lists, reads, describes and writes sysctl nodes, in the spirit of
//! `sysctl(8)`.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use tracing::debug;

use sysctl_tree::config::{load_config, load_default_config, Config, OutputFormat};
use sysctl_tree::kernel::MockKernel;
use sysctl_tree::logging::{self, LogFormat};
use sysctl_tree::report::{render_json, render_text, NodeReport, ReportOptions};
use sysctl_tree::{codec, Access, Node, Sysctl, TypedValue};

/// sysctl-tree — browse and tune the kernel's sysctl namespace.
#[derive(Parser)]
#[command(name = "sysctl-tree", version, about)]
struct Cli {
    /// Config file (default: ~/.sysctl-tree/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the built-in in-memory namespace instead of the host kernel.
    #[arg(long, global = true, hide = true)]
    mock: bool,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Shared output flags.
#[derive(Args)]
struct OutputArgs {
    /// Output format (overrides the config file).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Shorthand for `--format json`.
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Print the type of each value.
    #[arg(short = 't', long)]
    show_type: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// List nodes below NAME (everything when omitted).
    List {
        /// Starting node.
        name: Option<String>,
        /// Only writable nodes.
        #[arg(short = 'W', long, conflicts_with = "readonly")]
        writable: bool,
        /// Only read-only nodes.
        #[arg(short = 'R', long)]
        readonly: bool,
        /// Print names only.
        #[arg(short = 'N', long)]
        names_only: bool,
        /// Print descriptions instead of values.
        #[arg(short = 'd', long)]
        describe: bool,
        /// Keep only names matching this regular expression.
        #[arg(long = "match")]
        pattern: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print values; an interior node prints its whole subtree.
    Get {
        /// Node names.
        #[arg(required = true)]
        names: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Write a value: NAME=VALUE.
    Set {
        /// Assignment, e.g. `kern.hostname=build01`.
        assignment: String,
    },
    /// Print a node's description.
    Describe {
        /// Node name.
        name: String,
    },
    /// Print a node's numeric path.
    Oid {
        /// Node name.
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            load_config(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => load_default_config().context("failed to load default config")?,
    };
    logging::init_cli(&config.logging.level, cli.log_format)?;

    let ctl = open(&config, cli.mock)?;
    debug!(mock = cli.mock, "namespace opened");

    match cli.command {
        Command::List {
            name,
            writable,
            readonly,
            names_only,
            describe,
            pattern,
            output,
        } => {
            let access = match (writable, readonly) {
                (true, _) => Access::WritableOnly,
                (_, true) => Access::ReadOnlyOnly,
                _ => Access::Any,
            };
            let pattern = pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .context("invalid --match pattern")?;
            let nodes = ctl
                .filter(name.as_deref(), access)
                .context("failed to walk the namespace")?;
            let nodes: Vec<Node> = nodes
                .into_iter()
                .filter(|node| pattern.as_ref().map_or(true, |re| re.is_match(node.name())))
                .collect();
            let options = ReportOptions {
                names_only,
                describe,
                show_type: output.show_type || config.output.show_type,
            };
            print_nodes(&nodes, options, output_format(&output, &config))
        }
        Command::Get { names, output } => {
            let mut nodes = Vec::new();
            for name in &names {
                let found = ctl
                    .filter(Some(name.as_str()), Access::Any)
                    .with_context(|| format!("failed to read {name}"))?;
                if found.is_empty() {
                    bail!("unknown oid '{name}'");
                }
                nodes.extend(found);
            }
            let options = ReportOptions {
                show_type: output.show_type || config.output.show_type,
                ..ReportOptions::default()
            };
            print_nodes(&nodes, options, output_format(&output, &config))
        }
        Command::Set { assignment } => {
            let Some((name, text)) = assignment.split_once('=') else {
                bail!("expected NAME=VALUE, got '{assignment}'");
            };
            let node = ctl
                .node(name)
                .with_context(|| format!("unknown oid '{name}'"))?;
            let old = node.value().with_context(|| format!("failed to read {name}"))?;
            let value = codec::parse(text, node.kind())
                .with_context(|| format!("invalid value for {name}"))?;
            node.set(value)
                .with_context(|| format!("failed to set {name}"))?;
            let new = node.value().with_context(|| format!("failed to read {name}"))?;
            let show = |v: Option<TypedValue>| v.map(|v| v.to_string()).unwrap_or_default();
            println!("{name}: {} -> {}", show(old), show(new));
            Ok(())
        }
        Command::Describe { name } => {
            let node = ctl
                .node(&name)
                .with_context(|| format!("unknown oid '{name}'"))?;
            let text = node
                .description()
                .with_context(|| format!("failed to describe {name}"))?;
            println!("{name}: {text}");
            Ok(())
        }
        Command::Oid { name } => {
            let oid = ctl
                .oid(&name)
                .with_context(|| format!("unknown oid '{name}'"))?;
            println!("{name}: {oid}");
            Ok(())
        }
    }
}

/// Open the namespace the user asked for.
fn open(config: &Config, mock: bool) -> anyhow::Result<Sysctl> {
    let ctl = if mock {
        Sysctl::with_kernel(Arc::new(MockKernel::fixture()))
    } else {
        Sysctl::native().context("failed to open the sysctl namespace")?
    };
    Ok(ctl.with_limits(config.query).with_policy(config.policy))
}

fn output_format(output: &OutputArgs, config: &Config) -> OutputFormat {
    if output.json {
        return OutputFormat::Json;
    }
    output.format.unwrap_or(config.output.format)
}

fn print_nodes(nodes: &[Node], options: ReportOptions, format: OutputFormat) -> anyhow::Result<()> {
    let reports = nodes
        .iter()
        .map(|node| {
            NodeReport::collect(node, options)
                .with_context(|| format!("failed to read {}", node.name()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let rendered = match format {
        OutputFormat::Text => render_text(&reports, options),
        OutputFormat::Json => {
            let mut json = render_json(&reports).context("failed to serialise output")?;
            json.push('\n');
            json
        }
    };
    std::io::stdout()
        .write_all(rendered.as_bytes())
        .context("failed to write output")
}
