mod app;
mod config;
mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use logscope_engine::{
    Collaborators, Completion, Explorer, ExplorerConfig, QueryOutcome, RecordSource, SessionToken,
};
use logscope_source::FixtureSource;
use logscope_types::{parse_span, TimeRange};

use app::Action;
use config::Settings;
use console::ConsoleHooks;

/// Logscope - explore log streams by time window and tags
#[derive(Parser, Debug)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixture document serving streams and records
    #[arg(long, value_name = "PATH")]
    fixture: Option<PathBuf>,

    /// Session token presented to the sources
    #[arg(long)]
    token: Option<String>,

    /// Stream to make active instead of the first one
    #[arg(long)]
    stream: Option<String>,

    /// Query the span before now (e.g. 45m, 2h, 1d)
    #[arg(long, conflicts_with = "start")]
    last: Option<String>,

    /// Window start (RFC 3339)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Window end (RFC 3339)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Tag to select once records arrive; repeat to build an ordered selection
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Look up records whose body matches this text
    #[arg(long)]
    find: Option<String>,

    /// Display timezone: utc, local or an offset like +05:30
    #[arg(long)]
    tz: Option<String>,

    /// Length of the initial window in minutes
    #[arg(long)]
    window_minutes: Option<i64>,

    /// Artificial delay for every fixture request
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Print the filtered rows once and exit
    #[arg(long)]
    batch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .merge_args(&args);

    // RUST_LOG wins over the settings file
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match settings.log_filter.as_deref() {
            Some(directive) => tracing_subscriber::EnvFilter::new(directive),
            None => tracing_subscriber::EnvFilter::new("warn"),
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args, settings).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// One iteration of the console loop
enum Step {
    Input(String),
    Outcome(QueryOutcome),
    Quit,
}

async fn run_app(args: Args, settings: Settings) -> Result<()> {
    let fixture = settings
        .fixture
        .as_ref()
        .context("no fixture given, pass --fixture or set `fixture` in the config file")?;
    let session = settings.session_token.clone().and_then(SessionToken::new);

    let source = FixtureSource::from_path(fixture)
        .with_context(|| format!("failed to load fixture {}", fixture.display()))?
        .with_session(session.clone())
        .with_latency(settings.latency());
    let source = Arc::new(source);

    let timezone = settings.display_timezone()?;
    let config = ExplorerConfig {
        initial_window: settings.initial_window()?,
        anchor: None,
        display_timezone: timezone,
    };
    let hooks = Arc::new(ConsoleHooks::new(timezone));

    let mut explorer = Explorer::start(
        &*source,
        Arc::clone(&source),
        session,
        config,
        Collaborators::uniform(Arc::clone(&hooks)),
    )
    .await
    .context("could not start the explorer")?;

    apply_window_args(&mut explorer, &args)?;
    explorer.settle().await;

    // Selections are cleared by every query cycle, so apply them after settling
    for tag in &args.tags {
        explorer.add_tag(tag);
    }
    if let Some(text) = &args.find {
        explorer.set_lookup_query(text);
    }

    console::print_view(&explorer);
    if args.find.is_some() {
        console::print_candidates(&explorer);
    }

    if args.batch {
        if let Some(err) = explorer.last_error() {
            anyhow::bail!("query failed: {err}");
        }
        return Ok(());
    }

    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let step = tokio::select! {
            line = lines.next_line() => match line.context("failed to read input")? {
                Some(line) => Step::Input(line),
                None => Step::Quit,
            },
            outcome = explorer.next_outcome() => match outcome {
                Some(outcome) => Step::Outcome(outcome),
                None => Step::Quit,
            },
        };

        match step {
            Step::Quit => break,
            Step::Outcome(outcome) => match explorer.handle_outcome(outcome) {
                Completion::Applied { .. } => console::print_view(&explorer),
                Completion::Failed(_) | Completion::Discarded { .. } => {}
            },
            Step::Input(line) => match app::parse_line(&line) {
                Ok(None) => {}
                Ok(Some(Action::Quit)) => break,
                Ok(Some(action)) => handle_action(&mut explorer, &hooks, action),
                Err(e) => println!("{e:#}"),
            },
        }
    }

    Ok(())
}

/// Stream and window flags; each may supersede the start-up query
fn apply_window_args<R: RecordSource>(explorer: &mut Explorer<R>, args: &Args) -> Result<()> {
    if let Some(stream) = &args.stream {
        explorer.select_stream(stream)?;
    }

    if let (Some(start), Some(end)) = (&args.start, &args.end) {
        let range = TimeRange::parse(start, end)?;
        explorer.set_range(range.start, range.end);
    } else if let Some(span) = &args.last {
        explorer.set_last(parse_span(span)?);
    }
    Ok(())
}

fn handle_action<R: RecordSource>(
    explorer: &mut Explorer<R>,
    hooks: &ConsoleHooks,
    action: Action,
) {
    let generation = explorer.generation();

    match action {
        Action::ListStreams(filter) => {
            explorer.set_stream_query(filter.as_deref().unwrap_or_default());
            console::print_streams(explorer);
        }
        Action::UseStream(name) => {
            if let Err(e) = explorer.select_stream(&name) {
                println!("{e}");
            }
        }
        Action::SetRange(range) => explorer.set_range(range.start, range.end),
        Action::Last(span) => explorer.set_last(span),
        Action::NextPreset => explorer.cycle_preset(true),
        Action::PrevPreset => explorer.cycle_preset(false),
        Action::SetTimezone(timezone) => {
            hooks.set_timezone(timezone);
            explorer.set_display_timezone(timezone);
            console::print_view(explorer);
        }
        Action::ToggleTag(tag) => {
            explorer.toggle_tag(&tag);
            console::print_view(explorer);
        }
        Action::RemoveTag(tag) => {
            if explorer.remove_tag(&tag) {
                console::print_view(explorer);
            } else {
                println!("'{tag}' is not selected");
            }
        }
        Action::ClearTags => {
            explorer.clear_tags();
            console::print_view(explorer);
        }
        Action::ListTags => console::print_tags(explorer),
        Action::Find(text) => {
            explorer.set_lookup_query(&text);
            console::print_candidates(explorer);
        }
        Action::OpenCandidate(n) => {
            if explorer.open_candidate(n - 1).is_none() {
                println!("no candidate {n}");
            }
        }
        Action::OpenRow(n) => {
            if explorer.open_row(n - 1).is_none() {
                println!("no row {n}");
            }
        }
        Action::CloseDetail => explorer.close_detail(),
        Action::Refresh => {
            if !explorer.refresh() {
                println!("nothing to refresh, choose a stream first");
            }
        }
        Action::Show => console::print_view(explorer),
        Action::Help => console::print_help(),
        Action::Quit => {}
    }

    if explorer.generation() != generation {
        console::print_status(explorer);
    }
}
