mod gemini;
mod markdown;
mod normalize;
mod paper;
mod scholar;
mod script;
mod search;

pub const USER_AGENT: &str = concat!("scholarsync/", env!("CARGO_PKG_VERSION"), " (CLI)");

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use tracing::{debug, error, info, warn};

use gemini::GeminiClient;
use script::{DEFAULT_SCRIPT_NAME, ScriptError};
use search::filters::{DEFAULT_DOWNLOAD_PATH, DEFAULT_MAX_RESULTS, DEFAULT_YEAR_START, current_year};
use search::{SearchFilters, SearchSession};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Overall request timeout. Grounded generation can take a while.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Find downloadable papers with Gemini Grounding and emit a batch-download script.
///
/// Requires `GEMINI_API_KEY`; `GEMINI_MODEL` overrides the default model.
#[derive(Parser)]
#[command(name = "scholarsync", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for papers on a topic and optionally write a download script
    Search(SearchArgs),
    /// Print the Google Scholar URL for a topic, for manual checking
    ScholarUrl(ScholarUrlArgs),
}

#[derive(Args)]
struct YearRange {
    /// First publication year to include
    #[arg(long = "from", default_value_t = DEFAULT_YEAR_START)]
    year_start: i32,

    /// Last publication year to include (default: current year)
    #[arg(long = "to")]
    year_end: Option<i32>,
}

#[derive(Args)]
struct SearchArgs {
    /// Research topic or keywords
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    #[command(flatten)]
    years: YearRange,

    /// Minimum citation count (recorded, not yet applied to results)
    #[arg(long, default_value_t = 0)]
    min_citations: u32,

    /// How many papers to ask for
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS, value_parser = clap::value_parser!(u32).range(1..))]
    max_results: u32,

    /// Folder the generated script downloads into
    #[arg(long, default_value = DEFAULT_DOWNLOAD_PATH)]
    dest: String,

    /// Keep only these results (1-based, comma separated). Default: all
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Drop these results (1-based, comma separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<usize>,

    /// Write a Python download script for the selected papers
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_SCRIPT_NAME)]
    script: Option<PathBuf>,

    /// Print results as JSON instead of Markdown
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ScholarUrlArgs {
    /// Research topic or keywords
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    #[command(flatten)]
    years: YearRange,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Search(args) => run_search(args).await,
        Command::ScholarUrl(args) => print_scholar_url(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scholarsync=info".parse()?),
        )
        .init();
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let filters = SearchFilters {
        query: args.query.join(" "),
        year_start: args.years.year_start,
        year_end: args.years.year_end.unwrap_or_else(current_year),
        min_citations: args.min_citations,
        max_results: args.max_results,
        download_path: args.dest,
    };
    if filters.year_start > filters.year_end {
        warn!(
            year_start = filters.year_start,
            year_end = filters.year_end,
            "year range is inverted; no paper can match"
        );
    }

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let gemini = GeminiClient::from_env(http)?;
    info!(model = gemini.model(), "starting paper search");

    let mut session = SearchSession::new();
    session.search(&gemini, &filters).await?;
    apply_selection(&mut session, &args.select, &args.exclude);
    debug!(
        status = ?session.status(),
        results = session.papers().len(),
        selected = session.selected_count(),
        "selection applied"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.papers())?);
    } else {
        print!("{}", search::report::format_results(session.papers(), &filters));
    }

    if let Some(path) = args.script {
        match script::write_script(&path, session.selected(), &filters.download_path) {
            Ok(count) => {
                let shown = path.to_string_lossy();
                eprintln!(
                    "Wrote {count} paper(s) to {shown}. Run it with: python3 {}",
                    shell_escape::escape(shown.clone())
                );
            }
            Err(ScriptError::NothingSelected) => {
                warn!("no papers selected, download script not written");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Selects `select` (or everything when empty), then drops `exclude`.
/// Positions are 1-based, as printed in the listing.
fn apply_selection(session: &mut SearchSession, select: &[usize], exclude: &[usize]) {
    if select.is_empty() {
        session.select_all();
    } else {
        session.deselect_all();
        for id in ids_at(session, select) {
            session.toggle(&id);
        }
    }

    for id in ids_at(session, exclude) {
        let selected = session.papers().iter().any(|p| p.id == id && p.selected);
        if selected {
            session.toggle(&id);
        }
    }
}

fn ids_at(session: &SearchSession, positions: &[usize]) -> Vec<String> {
    let positions: BTreeSet<usize> = positions.iter().copied().collect();
    positions
        .into_iter()
        .filter_map(|position| {
            let paper = position
                .checked_sub(1)
                .and_then(|i| session.papers().get(i));
            if paper.is_none() {
                warn!(position, "no result at this position, ignoring");
            }
            paper.map(|p| p.id.clone())
        })
        .collect()
}

fn print_scholar_url(args: &ScholarUrlArgs) -> Result<(), Box<dyn std::error::Error>> {
    let year_end = args.years.year_end.unwrap_or_else(current_year);
    let url = scholar::scholar_url(&args.query.join(" "), args.years.year_start, year_end)?;
    println!("{url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_defaults() {
        let cli = Cli::try_parse_from(["scholarsync", "search", "graph", "networks"]).unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.query.join(" "), "graph networks");
        assert_eq!(args.years.year_start, 2015);
        assert_eq!(args.years.year_end, None);
        assert_eq!(args.max_results, 50);
        assert_eq!(args.dest, "C:/Scholar_Papers");
        assert!(args.select.is_empty());
        assert!(args.exclude.is_empty());
        assert!(args.script.is_none());
        assert!(!args.json);
    }

    #[test]
    fn bare_script_flag_uses_default_name() {
        let cli = Cli::try_parse_from([
            "scholarsync",
            "search",
            "topic",
            "--select",
            "1,3",
            "--from",
            "2019",
            "--to",
            "2021",
            "--script",
        ])
        .unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.select, [1, 3]);
        assert_eq!(args.years.year_start, 2019);
        assert_eq!(args.years.year_end, Some(2021));
        assert_eq!(args.script, Some(PathBuf::from(DEFAULT_SCRIPT_NAME)));
    }

    #[test]
    fn zero_max_results_is_rejected() {
        assert!(Cli::try_parse_from(["scholarsync", "search", "x", "--max-results", "0"]).is_err());
    }

    #[tokio::test]
    async fn selection_keeps_chosen_positions_minus_exclusions() {
        let mock = search::testing::MockCompletion::replying(&[r#"[
            {"title": "one", "year": 2024},
            {"title": "two", "year": 2023},
            {"title": "three", "year": 2022}
        ]"#]);
        let filters = SearchFilters {
            query: "topic".into(),
            year_start: 2015,
            year_end: 2025,
            ..SearchFilters::default()
        };
        let mut session = SearchSession::new();
        session.search(&mock, &filters).await.unwrap();

        apply_selection(&mut session, &[1, 3, 3, 9], &[3, 0]);

        let selected: Vec<&str> = session.selected().map(|p| p.title.as_str()).collect();
        assert_eq!(selected, ["one"]);
    }

    #[tokio::test]
    async fn empty_selection_keeps_everything_but_exclusions() {
        let mock = search::testing::MockCompletion::replying(&[r#"[
            {"title": "one", "year": 2024},
            {"title": "two", "year": 2023}
        ]"#]);
        let filters = SearchFilters {
            query: "topic".into(),
            year_start: 2015,
            year_end: 2025,
            ..SearchFilters::default()
        };
        let mut session = SearchSession::new();
        session.search(&mock, &filters).await.unwrap();

        apply_selection(&mut session, &[], &[2, 2]);

        let selected: Vec<&str> = session.selected().map(|p| p.title.as_str()).collect();
        assert_eq!(selected, ["one"]);
    }

    #[test]
    fn query_is_required() {
        assert!(Cli::try_parse_from(["scholarsync", "search"]).is_err());
    }
}
