// Entry point and high-level CLI flow.
//
// A one-shot run loads the export, applies the filters given on the command
// line and prints the report. `--interactive` keeps the menu flow instead:
// - Option [1] loads and cleans the CSV, printing diagnostics.
// - Option [2] asks for filters and the prior-month total, then prints the
//   report.
// - After a report the user can go back to the menu or exit.
mod config;
mod error;
mod filter;
mod loader;
mod output;
mod projection;
mod reports;
mod types;
mod util;

use anyhow::Context;
use clap::Parser;
use config::{ReportConfig, DEFAULT_PRIOR_TOTAL};
use filter::FilterConfig;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use types::IncidentRecord;

#[derive(Parser)]
#[command(name = "incident_report")]
#[command(
    about = "Cross-tabulations, month-over-month change and next-month projection for a support-incident export",
    long_about = None
)]
struct Cli {
    /// Incident export in CSV form
    #[arg(default_value = "warren.csv")]
    input: PathBuf,
    /// Keep only this Issue Type (repeatable; default: all observed)
    #[arg(long = "issue-type")]
    issue_types: Vec<String>,
    /// Keep only this Priority (repeatable; default: all observed)
    #[arg(long = "priority")]
    priorities: Vec<String>,
    /// Incident total of the prior month
    #[arg(long, default_value_t = DEFAULT_PRIOR_TOTAL)]
    prior_total: f64,
    /// Treat the prior-month total as not supplied
    #[arg(long, conflicts_with = "prior_total")]
    no_prior: bool,
    /// Month (1-12) whose observed days feed the daily average
    #[arg(long)]
    reference_month: Option<u32>,
    #[arg(long, requires = "target_month")]
    target_year: Option<i32>,
    #[arg(long, requires = "target_year")]
    target_month: Option<u32>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Menu-driven session
    #[arg(long, conflicts_with = "json")]
    interactive: bool,
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn report_config(&self) -> ReportConfig {
        ReportConfig {
            filter: FilterConfig {
                issue_types: allow_list(&self.issue_types),
                priorities: allow_list(&self.priorities),
            },
            prior_total: if self.no_prior {
                None
            } else {
                Some(self.prior_total)
            },
            reference_month: self.reference_month,
            target: self.target_year.zip(self.target_month),
        }
    }
}

fn allow_list(values: &[String]) -> Option<BTreeSet<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().cloned().collect())
    }
}

/// Logs go to stderr so the report on stdout stays clean. `RUST_LOG` wins
/// over `--log-level`.
fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load(path: &Path) -> anyhow::Result<Vec<IncidentRecord>> {
    let (data, load_report) = loader::load_and_clean(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    eprintln!(
        "Processing dataset... ({} rows loaded, {} with labels, {} label occurrences)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.labelled_rows),
        util::format_int(load_report.label_occurrences)
    );
    if let (Some(first), Some(last)) = (load_report.first_created, load_report.last_created) {
        eprintln!(
            "Created between {} and {}.",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }
    Ok(data)
}

// ── Interactive session ───────────────────────────────────────────────────────

/// Records loaded once and reused for every report of the session.
struct Session {
    path: PathBuf,
    base: ReportConfig,
    data: Option<Vec<IncidentRecord>>,
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_input(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to go back to the menu. End of input counts as "no".
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_input("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn prompt_allow_list(name: &str, domain: &BTreeSet<String>) -> Option<BTreeSet<String>> {
    let shown: Vec<&str> = domain.iter().map(String::as_str).collect();
    let answer = read_input(&format!(
        "{} to include, comma-separated (blank = all) [{}]: ",
        name,
        shown.join(", ")
    ))?;
    let picked = util::split_list(&answer);
    if picked.is_empty() {
        None
    } else {
        Some(picked.into_iter().collect())
    }
}

fn prompt_prior_total(default: Option<f64>) -> Option<f64> {
    let shown = default.map_or_else(|| "none".to_string(), |d| util::format_number(d, 0));
    loop {
        let Some(answer) = read_input(&format!(
            "Number of incidents in the prior month [{}]: ",
            shown
        )) else {
            return default;
        };
        if answer.is_empty() {
            return default;
        }
        match answer.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => return Some(v),
            _ => println!("Invalid number. Please enter a non-negative value."),
        }
    }
}

fn handle_load(session: &mut Session) {
    match load(&session.path) {
        Ok(data) => {
            println!();
            session.data = Some(data);
        }
        Err(e) => eprintln!("Failed to load file: {:#}\n", e),
    }
}

fn handle_generate_reports(session: &Session) {
    let Some(data) = session.data.as_deref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    let config = ReportConfig {
        filter: FilterConfig {
            issue_types: prompt_allow_list("Issue Types", &filter::issue_type_domain(data)),
            priorities: prompt_allow_list("Priorities", &filter::priority_domain(data)),
        },
        prior_total: prompt_prior_total(session.base.prior_total),
        ..session.base.clone()
    };

    println!("\nGenerating reports...\n");
    match reports::build_report(data, &config) {
        Ok(report) => println!("{}", output::render_report(&report)),
        Err(e) => eprintln!("Report error: {}\n", e),
    }
}

fn run_interactive(path: PathBuf, base: ReportConfig) {
    let mut session = Session {
        path,
        base,
        data: None,
    };
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_input("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut session),
            "2" => {
                println!();
                handle_generate_reports(&session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let config = cli.report_config();
    config.validate().context("invalid arguments")?;

    if cli.interactive {
        run_interactive(cli.input, config);
        return Ok(());
    }

    let data = load(&cli.input)?;
    let report = reports::build_report(&data, &config)?;
    if cli.json {
        println!("{}", output::to_json(&report)?);
    } else {
        println!("{}", output::render_report(&report));
    }
    Ok(())
}
