//! datefmt — MySQL DATE_FORMAT() to SQLite STRFTIME() rewriter
//!
//! # Usage
//!
//! ```bash
//! # Rewrite a statement
//! datefmt "SELECT DATE_FORMAT(created_at, '%d/%m/%Y') FROM orders"
//!
//! # Explain how a format string converts
//! datefmt explain '%h:%i %p'
//!
//! # Rewrite and run against SQLite
//! datefmt run "SELECT DATE_FORMAT(?, '%Y-%m') AS month" --bind '2024-03-05 14:07:09'
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use datefmt::prelude::*;
use serde_json::json;

#[derive(Parser)]
#[command(name = "datefmt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rewrite MySQL DATE_FORMAT() calls as SQLite STRFTIME()", long_about = None)]
#[command(after_help = "EXAMPLES:
    datefmt \"SELECT DATE_FORMAT(o.created_at, '%d/%c/%Y') FROM orders o\"
    datefmt translate o.created_at \"'%H:%i:%s'\"
    datefmt explain '%r %p'
    datefmt run \"SELECT DATE_FORMAT('2024-03-05 14:07:09', '%T') AS t\"")]
struct Cli {
    /// The SQL statement to rewrite
    query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Config file (defaults to ./datefmt.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite connection URL for `run`
    #[arg(long, env = "DATEFMT_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one call from its date and format operands
    Translate {
        /// Date operand, e.g. o.created_at
        date: String,
        /// Format operand, e.g. '%Y-%m-%d' (quoted) or :fmt
        format_expr: String,
    },
    /// Show how a MySQL format string converts
    Explain {
        /// Raw format string, without SQL quotes
        format_string: String,
    },
    /// Print the directive conversion table
    Table,
    /// Rewrite a statement and run it against SQLite
    Run {
        /// The SQL statement to run
        query: String,

        /// Parameter bindings, in order
        #[arg(short, long, value_delimiter = ',')]
        bind: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "datefmt=debug" } else { "datefmt=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::load()?,
    };
    let translator = Translator::from_config(&config);

    match &cli.command {
        Some(Commands::Translate { date, format_expr }) => {
            let sql = translator.translate(date, format_expr)?;
            print_rewrite(&format!("DATE_FORMAT({}, {})", date, format_expr), &sql, cli.format);
        }
        Some(Commands::Explain { format_string }) => explain(format_string, cli.format),
        Some(Commands::Table) => show_table(cli.format),
        Some(Commands::Run { query, bind }) => {
            let url = cli
                .database_url
                .clone()
                .or_else(|| config.sqlite.url.clone())
                .unwrap_or_else(|| "sqlite::memory:".to_string());
            run_query(query, bind, &url, &config, cli).await?;
        }
        None => match &cli.query {
            Some(query) => {
                let sql = translator.rewrite(query)?;
                print_rewrite(query, &sql, cli.format);
            }
            None => {
                println!("{}", "datefmt — DATE_FORMAT() to STRFTIME()".cyan().bold());
                println!();
                println!("Usage: datefmt <QUERY> [OPTIONS]");
                println!();
                println!("Try: datefmt --help");
            }
        },
    }

    Ok(())
}

fn print_rewrite(input: &str, output: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let doc = json!({ "input": input, "output": output });
            println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
        }
        OutputFormat::Text => println!("{}", output),
    }
}

fn explain(format_string: &str, format: OutputFormat) {
    let (converted, hits) = explain_format(format_string);

    if let OutputFormat::Json = format {
        let doc = json!({
            "input": format_string,
            "output": converted,
            "substitutions": hits,
        });
        println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
        return;
    }

    println!("{} {}", "MySQL: ".dimmed(), format_string.yellow());
    println!("{} {}", "SQLite:".dimmed(), converted.green());

    if hits.is_empty() {
        println!();
        println!("{}", "(no directives converted)".dimmed());
        return;
    }

    println!();
    for hit in &hits {
        let line = format!(
            "  {} → {:10} ×{}",
            hit.source,
            if hit.target.is_empty() { "''" } else { hit.target },
            hit.occurrences
        );
        if hit.lossy {
            println!("{} {}", line.yellow(), "(lossy)".yellow().dimmed());
        } else {
            println!("{}", line.white());
        }
    }
}

fn show_table(format: OutputFormat) {
    if let OutputFormat::Json = format {
        println!(
            "{}",
            serde_json::to_string_pretty(CONVERSION_TABLE).unwrap_or_default()
        );
        return;
    }

    println!(
        "{:8} {:10} {:6} {}",
        "MySQL".white().bold(),
        "SQLite".white().bold(),
        "Lossy".white().bold(),
        "Meaning".white().bold()
    );
    println!("{}", "─".repeat(80).dimmed());

    for d in CONVERSION_TABLE {
        let target = if d.target.is_empty() { "''" } else { d.target };
        let lossy = if d.lossy { "yes" } else { "" };
        println!(
            "{:8} {:10} {:6} {}",
            d.source.cyan().bold(),
            target.green(),
            lossy.yellow(),
            d.description.dimmed()
        );
    }
}

async fn run_query(
    query: &str,
    bind: &[String],
    url: &str,
    config: &Config,
    cli: &Cli,
) -> Result<()> {
    let engine = SqliteEngine::connect_with(url, config).await?;

    let mut prepared = engine.query(query);
    for raw in bind {
        prepared = prepared.bind(QueryValue::parse_cli(raw));
    }

    if cli.verbose {
        println!("{} {}", "SQL:".dimmed(), prepared.sql()?.white());
    }

    let trimmed = query.trim_start().to_ascii_uppercase();
    if trimmed.starts_with("SELECT") || trimmed.starts_with("WITH") {
        let rows = prepared.fetch_all().await?;
        format_output(&rows, cli.format);
    } else {
        let affected = prepared.execute().await?;
        println!("{} {} rows affected", "✓".green(), affected);
    }

    Ok(())
}

fn format_output(results: &[HashMap<String, serde_json::Value>], format: OutputFormat) {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results).unwrap_or_default());
        }
        OutputFormat::Text => {
            let mut columns: Vec<&String> = results[0].keys().collect();
            columns.sort();

            let mut widths: HashMap<&String, usize> =
                columns.iter().map(|c| (*c, c.len())).collect();
            for row in results {
                for (col, val) in row {
                    let len = val_to_string(val).len();
                    if let Some(w) = widths.get_mut(col) {
                        *w = (*w).max(len);
                    }
                }
            }

            let header: Vec<String> = columns
                .iter()
                .map(|c| format!("{:width$}", c, width = widths[*c]))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[*c])).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in results {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let val = row.get(*c).map(val_to_string).unwrap_or_default();
                        format!("{:width$}", val, width = widths[*c])
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", results.len().to_string().cyan());
        }
    }
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}
