//! gridusage - disk usage reports for storage cluster file inventories.
//!
//! Usage:
//!   gdu groups DIR                 Summary of every group
//!   gdu breakdown DIR -c PERIOD    Sizes within one group category
//!   gdu servers DIR                Data repartition by server
//!   gdu list DIR -k KEY            File listing of one group
//!   gdu treemap DIR                Treemap edge list
//!   gdu classify PATH...           Show how paths are classified
//!   gdu export DIR                 Groups and treemap as JSON
//!   gdu --help                     Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use gridusage_analyze::{
    GroupBuilder, GroupCategory, GroupSummary, PathClassifier, ReportConfig, TreeAggregator,
    UsageReport, category_breakdown, group_listing, report, server_repartition,
};
use gridusage_scan::{Inventory, ListingScanner, ScanConfig};

#[derive(Parser)]
#[command(
    name = "gridusage",
    version,
    about = "Disk usage reports for storage cluster file inventories",
    long_about = "gridusage reads one `size mtime path` listing per storage host, \
                  classifies every path by period, pass, run and user, and reports \
                  where the disk space goes."
)]
struct Cli {
    /// JSON report configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Where listings come from and how their paths are read.
#[derive(Args)]
struct ListingArgs {
    /// Directory holding one listing file per host
    dir: PathBuf,

    /// Only read listing files whose name starts with this
    #[arg(short, long)]
    pattern: Option<String>,

    /// Mount prefix to strip from listed paths
    #[arg(long)]
    prefix: Option<String>,

    /// Number of threads for reading listings (0 = auto)
    #[arg(short, long, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Summary of every group
    Groups {
        #[command(flatten)]
        listing: ListingArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Sizes within one group category
    Breakdown {
        #[command(flatten)]
        listing: ListingArgs,

        /// Category (filetype, server, datatype, user, run, period, esdpass, aod, ds)
        #[arg(short, long)]
        category: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Data repartition by server
    Servers {
        #[command(flatten)]
        listing: ListingArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// File listing of one group
    List {
        #[command(flatten)]
        listing: ListingArgs,

        /// Group key (e.g. "ESDPASS:LHC15o_pass1")
        #[arg(short, long)]
        key: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Treemap edge list
    Treemap {
        #[command(flatten)]
        listing: ListingArgs,

        /// Treemap root (overrides the configuration)
        #[arg(short, long)]
        root: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show how paths are classified
    Classify {
        /// Paths to classify
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Export groups and treemap to JSON
    Export {
        #[command(flatten)]
        listing: ListingArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Groups { listing, format } => run_groups(&listing, config, format)?,
        Command::Breakdown {
            listing,
            category,
            format,
        } => run_breakdown(&listing, config, &category, format)?,
        Command::Servers { listing, format } => run_servers(&listing, config, format)?,
        Command::List {
            listing,
            key,
            output,
        } => run_list(&listing, config, &key, output)?,
        Command::Treemap {
            listing,
            root,
            format,
        } => run_treemap(&listing, config, root, format)?,
        Command::Classify { paths } => run_classify(&config, &paths),
        Command::Export { listing, output } => run_export(&listing, config, output)?,
    }

    Ok(())
}

/// Log to stderr so reports on stdout stay clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let config: ReportConfig = serde_json::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config.validate().map_err(|e| eyre!(e))?;
    tracing::debug!(?config, "loaded report configuration");
    Ok(config)
}

/// Read every host listing, applying command line overrides to `config`.
fn ingest(args: &ListingArgs, config: &mut ReportConfig) -> Result<Inventory> {
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }

    let mut scan_config = ScanConfig::new(&args.dir);
    scan_config.threads = args.threads;
    if let Some(pattern) = &args.pattern {
        scan_config = scan_config.with_name_prefix(pattern);
    }

    eprintln!("Reading listings in {}...", args.dir.display());

    let inventory = ListingScanner::new()
        .scan(&scan_config, config)
        .context("Ingestion failed")?;

    if inventory.has_warnings() {
        eprintln!("{} warning(s) during ingestion", inventory.warnings.len());
    }

    Ok(inventory)
}

/// Print the summary of every group.
fn run_groups(args: &ListingArgs, mut config: ReportConfig, format: OutputFormat) -> Result<()> {
    let inventory = ingest(args, &mut config)?;
    let index = GroupBuilder::with_config(&config)
        .build_groups(&inventory.records)
        .context("Grouping failed")?;
    let summaries = report(&index);

    match format {
        OutputFormat::Text => {
            print_header(&format!(
                "{} files, {} in {} groups",
                inventory.len(),
                format_size(inventory.total_size()),
                summaries.len()
            ));
            print_summaries("Group", &summaries);
            if !index.unclassified().is_empty() {
                println!();
                println!(
                    " {} file(s) could not be classified",
                    index.unclassified().len()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }

    Ok(())
}

/// Print the groups of one category.
fn run_breakdown(
    args: &ListingArgs,
    mut config: ReportConfig,
    category: &str,
    format: OutputFormat,
) -> Result<()> {
    let category: GroupCategory = category
        .parse()
        .map_err(|_| eyre!("Unknown category {category:?}"))?;

    let inventory = ingest(args, &mut config)?;
    let index = GroupBuilder::with_config(&config)
        .build_groups(&inventory.records)
        .context("Grouping failed")?;
    let summaries = category_breakdown(&index, category);

    match format {
        OutputFormat::Text => {
            print_header(&format!("Disk space by {category}"));
            print_summaries(category.as_ref(), &summaries);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }

    Ok(())
}

/// Print the data repartition by server.
fn run_servers(args: &ListingArgs, mut config: ReportConfig, format: OutputFormat) -> Result<()> {
    let inventory = ingest(args, &mut config)?;
    let index = GroupBuilder::with_config(&config)
        .build_groups(&inventory.records)
        .context("Grouping failed")?;
    let servers = server_repartition(&index);

    match format {
        OutputFormat::Text => {
            print_header("Occupied disk by server");
            let max_size = servers.iter().map(|s| s.total_size).max().unwrap_or(1).max(1);
            for server in &servers {
                println!(
                    " {:<20} {:>10} {:>8} files  {}",
                    server.key,
                    format_size(server.total_size),
                    server.file_count,
                    make_bar(server.total_size as f64 / max_size as f64, 30)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&servers)?);
        }
    }

    Ok(())
}

/// Write the listing of one group.
fn run_list(
    args: &ListingArgs,
    mut config: ReportConfig,
    key: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let inventory = ingest(args, &mut config)?;
    let index = GroupBuilder::with_config(&config)
        .build_groups(&inventory.records)
        .context("Grouping failed")?;
    let listing = group_listing(&index, key).ok_or_else(|| eyre!("No group named {key:?}"))?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, listing)?;
            eprintln!("Wrote {}", output_path.display());
        }
        None => print!("{listing}"),
    }

    Ok(())
}

/// Print the treemap edge list.
fn run_treemap(
    args: &ListingArgs,
    mut config: ReportConfig,
    root: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(root) = root {
        config.treemap_root = root;
    }

    let inventory = ingest(args, &mut config)?;
    let tree = TreeAggregator::with_config(&config)
        .build(&inventory.records)
        .context("Treemap failed")?;
    let nodes = tree.nodes();

    match format {
        OutputFormat::Text => {
            print_header(&format!(
                "{} - {}",
                tree.root(),
                format_size(tree.total_size())
            ));
            for node in &nodes {
                println!(
                    " {:<60} {:<50} {:>10} {:>6.3}",
                    node.path,
                    node.parent.as_deref().unwrap_or("null"),
                    node.aggregate_size,
                    node.color_weight
                );
            }
            if !tree.unplaced().is_empty() {
                println!();
                println!(" {} file(s) too shallow for the treemap", tree.unplaced().len());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
    }

    Ok(())
}

/// Classify paths given on the command line.
fn run_classify(config: &ReportConfig, paths: &[String]) {
    let classifier = PathClassifier::with_grammar(config.grammar.clone());

    for path in paths {
        let c = classifier.classify(path);
        println!("{path}");
        println!(
            "  status={} period={} pass={} aod_pass={} run={} user={}",
            c.status,
            c.period,
            c.pass,
            c.aod_pass,
            c.run_label(),
            c.user
        );
    }
}

/// Export the complete report to JSON.
fn run_export(args: &ListingArgs, mut config: ReportConfig, output: Option<PathBuf>) -> Result<()> {
    let inventory = ingest(args, &mut config)?;
    let report = UsageReport::build(&inventory.records, &config).context("Grouping failed")?;

    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

fn print_header(title: &str) {
    println!();
    println!("{}", "─".repeat(70));
    println!(" {title}");
    println!("{}", "─".repeat(70));
    println!();
}

fn print_summaries(label: &str, summaries: &[GroupSummary]) {
    println!(" {:<50} {:>8} {:>12}", label, "Files", "Size");
    for summary in summaries {
        println!(
            " {:<50} {:>8} {:>12}",
            truncate(&summary.key, 50),
            summary.file_count,
            format_size(summary.total_size)
        );
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
