// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::io;

// Use library instead of local modules
use chart_of_accounts::export::{active_only, write_csv, write_json};
use chart_of_accounts::{display_code, logging, walk_forest, AppConfig, ChartOfAccounts};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = AppConfig::from_env();

    match args.get(1).map(String::as_str) {
        Some("tree") => {
            logging::init(&config)?;
            let chart = config.load_chart()?;
            run_tree(&chart, args.get(2).map(String::as_str))?;
        }
        Some("export") => {
            logging::init(&config)?;
            let chart = config.load_chart()?;
            run_export(&chart, &args[2..])?;
        }
        Some("help") | Some("--help") | Some("-h") => print_usage(),
        Some(other) => {
            print_usage();
            bail!("Unknown command: {}", other);
        }
        None => run_ui_mode(config)?,
    }

    Ok(())
}

fn print_usage() {
    println!("coa - chart of accounts hierarchy");
    println!();
    println!("USAGE:");
    println!("  coa                       interactive browser");
    println!("  coa tree [QUERY]          print the (filtered) hierarchy");
    println!("  coa export [csv|json] [--active]");
    println!("                            flat GL account list on stdout");
    println!();
    println!("ENV: COA_SEED, COA_LOG, COA_LOG_FILE");
}

fn run_tree(chart: &ChartOfAccounts, query: Option<&str>) -> Result<()> {
    let tree = chart.get_tree(query);

    if tree.is_empty() {
        println!("No accounts match.");
        return Ok(());
    }

    walk_forest(&tree, |node, depth| {
        let status = if node.status.is_active() { "" } else { "  [Inactive]" };
        println!(
            "{}{:<20} {}{}",
            "  ".repeat(depth),
            display_code(&node.code),
            node.title,
            status
        );
    });

    Ok(())
}

fn run_export(chart: &ChartOfAccounts, args: &[String]) -> Result<()> {
    let mut format = "csv";
    let mut active = false;
    for arg in args {
        match arg.as_str() {
            "csv" | "json" => format = arg.as_str(),
            "--active" => active = true,
            other => bail!("Unknown export option: {}", other),
        }
    }

    let mut options = chart.account_options();
    if active {
        options = active_only(options);
    }

    let stdout = io::stdout();
    match format {
        "json" => write_json(&options, stdout.lock())?,
        _ => write_csv(&options, stdout.lock())?,
    }
    tracing::debug!(accounts = options.len(), format, "export written");

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(mut config: AppConfig) -> Result<()> {
    if config.log_file.is_none() {
        config.log_file = Some(logging::default_ui_log_file());
    }
    logging::init(&config)?;

    let chart = config.load_chart()?;
    let mut app = ui::App::new(chart);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: coa tree | coa export");
    std::process::exit(1);
}
