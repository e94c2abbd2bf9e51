//! CLI entry point for `dormmail`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use dormmail::config::Config;
use dormmail::export::MailResponse;
use dormmail::{FetchError, MailQuery, MailRecord};

/// Exit status for "upstream unavailable" (sysexits `EX_UNAVAILABLE`).
const EXIT_UNAVAILABLE: i32 = 69;
/// Exit status for a fetch that failed on local settings (`EX_CONFIG`).
const EXIT_CONFIG: i32 = 78;

#[derive(Parser)]
#[command(
    name = "dormmail",
    version,
    about = "List unclaimed packages on the NCNU dormitory mail board"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List packages (default)
    List {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the JSON response envelope instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the departments that currently have packages
    Departments {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        json: bool,
    },
    /// Export packages to a file
    Export {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output format: json or csv (default from config)
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show the config file path and effective settings
    Config {
        /// Write the effective settings to the config file
        #[arg(long)]
        save: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(Args, Clone, Default)]
struct SourceArgs {
    /// Parse a saved copy of the page instead of fetching it
    #[arg(long, value_name = "HTML")]
    file: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Department substring, e.g. 資工
    #[arg(short, long)]
    department: Option<String>,
    /// Recipient: surname, masked (王Ｏ明) or full name (王小明)
    #[arg(short, long)]
    name: Option<String>,
}

impl FilterArgs {
    fn query(&self) -> MailQuery {
        MailQuery {
            department: self.department.clone(),
            name: self.name.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = dormmail::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        None => cmd_list(&SourceArgs::default(), &FilterArgs::default(), false, &config),
        Some(Commands::List {
            source,
            filter,
            json,
        }) => cmd_list(&source, &filter, json, &config),
        Some(Commands::Departments { source, json }) => cmd_departments(&source, json, &config),
        Some(Commands::Export {
            source,
            filter,
            format,
            output,
        }) => {
            let format = format.unwrap_or_else(|| config.export.default_format.clone());
            cmd_export(&source, &filter, &format, &output, &config)
        }
        Some(Commands::Config { save }) => cmd_config(&config, save),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = dormmail::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "dormmail.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Get records from `--file` or the network.
///
/// The outer error is a local problem (unreadable file); the inner one
/// means the board could not be reached.
fn load_records(
    source: &SourceArgs,
    config: &Config,
    spinner: bool,
) -> anyhow::Result<Result<Vec<MailRecord>, FetchError>> {
    let options = config.parser.options();

    if let Some(ref path) = source.file {
        if !path.exists() {
            anyhow::bail!("File not found: {}", path.display());
        }
        let html = dormmail::fetch::read_page(path, &config.source)?;
        return Ok(Ok(dormmail::parse(&html, &options)));
    }

    let pb = if spinner {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("valid template"),
        );
        pb.set_message(format!("Fetching {}", config.source.url));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = dormmail::fetch_records(&config.source, &options);

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    Ok(result)
}

/// Report a failed fetch and exit; `json` prints the failure envelope.
fn fetch_failed(err: &FetchError, json: bool) -> ! {
    if json {
        let resp = MailResponse::unavailable(err);
        match serde_json::to_string_pretty(&resp) {
            Ok(body) => println!("{body}"),
            Err(e) => eprintln!("  Could not encode response: {e}"),
        }
    }
    if err.is_unavailable() {
        eprintln!("  Dorm mail service unavailable: {err}");
        std::process::exit(EXIT_UNAVAILABLE);
    }
    eprintln!("  Check the [source] section of your config: {err}");
    std::process::exit(EXIT_CONFIG);
}

fn cmd_list(source: &SourceArgs, filter: &FilterArgs, json: bool, config: &Config) -> anyhow::Result<()> {
    let query = filter.query();
    let records = match load_records(source, config, !json)? {
        Ok(records) => query.apply(&records),
        Err(err) => fetch_failed(&err, json),
    };

    if json {
        let resp = MailResponse::ok(records);
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        print_records_table(&records);
    }
    Ok(())
}

fn cmd_departments(source: &SourceArgs, json: bool, config: &Config) -> anyhow::Result<()> {
    let records = match load_records(source, config, !json)? {
        Ok(records) => records,
        Err(err) => fetch_failed(&err, json),
    };
    let departments = dormmail::all_departments(&records);

    if json {
        let items: Vec<serde_json::Value> = departments
            .iter()
            .map(|d| {
                serde_json::json!({
                    "department": d,
                    "count": records.iter().filter(|r| r.department.trim() == d.as_str()).count(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!();
    println!("  {} department(s)", departments.len());
    println!();
    for d in &departments {
        let count = records.iter().filter(|r| r.department.trim() == d.as_str()).count();
        println!("    {count:>4}  {d}");
    }
    println!();
    Ok(())
}

fn cmd_export(
    source: &SourceArgs,
    filter: &FilterArgs,
    format: &str,
    output: &Path,
    config: &Config,
) -> anyhow::Result<()> {
    let records = match load_records(source, config, true)? {
        Ok(records) => filter.query().apply(&records),
        Err(err) => fetch_failed(&err, false),
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        "json" => dormmail::export::json::export_json(&records, output)?,
        "csv" => dormmail::export::csv::export_csv(&records, output, config.export.csv_separator)?,
        _ => {
            anyhow::bail!("Unknown export format '{}'. Supported: json, csv", format);
        }
    }

    println!(
        "  Exported {} package(s) as {} to {}",
        records.len(),
        format,
        output.display()
    );
    Ok(())
}

/// Print (and optionally save) the effective configuration.
fn cmd_config(config: &Config, save: bool) -> anyhow::Result<()> {
    match dormmail::config::config_file_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory on this platform"),
    }
    println!("# log: {}", dormmail::config::log_file_path(config).display());
    println!();
    print!("{}", toml::to_string_pretty(config)?);

    if save {
        dormmail::config::save_config(config)?;
        eprintln!("  Saved configuration");
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "dormmail", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print records as a table; CJK columns are padded by display width.
fn print_records_table(records: &[MailRecord]) {
    println!();
    println!("  {} package(s)", records.len());
    println!();

    if records.is_empty() {
        return;
    }

    println!(
        "  {} {} {} {} {} {} {} {}",
        fit("#", 6),
        fit("Arrived", 10),
        fit("Recipient", 10),
        fit("Carrier", 12),
        fit("Type", 8),
        fit("Tracking", 18),
        fit("Department", 16),
        "Days"
    );
    println!("  {}", "-".repeat(90));

    for r in records {
        println!(
            "  {} {} {} {} {} {} {} {}",
            fit(&r.id, 6),
            fit(&r.arrival_time, 10),
            fit(&r.recipient, 10),
            fit(&r.carrier, 12),
            fit(&r.kind, 8),
            fit(&r.tracking_number, 18),
            fit(&r.department, 16),
            r.days_since_arrival
        );
    }
    println!();
}

/// Truncate or pad `s` to exactly `width` terminal columns.
fn fit(s: &str, width: usize) -> String {
    if s.width() <= width {
        return format!("{s}{}", " ".repeat(width - s.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}
