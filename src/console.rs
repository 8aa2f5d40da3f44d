//! Console collaborators and output

use parking_lot::Mutex;

use logscope_engine::{
    DetailView, DisplayTimezone, ErrorReporter, Explorer, FetchError, LogRecord, QueryError,
    RecordSource, SessionGuard, SessionSignal, TimeWindow,
};

use crate::app::COMMANDS;

/// Tags printed next to each row
const ROW_TAGS: usize = 3;

/// Prints engine notifications to the terminal
pub struct ConsoleHooks {
    /// Zone used by the detail view, kept in step with the explorer
    timezone: Mutex<DisplayTimezone>,
}

impl ConsoleHooks {
    pub fn new(timezone: DisplayTimezone) -> Self {
        Self {
            timezone: Mutex::new(timezone),
        }
    }

    pub fn set_timezone(&self, timezone: DisplayTimezone) {
        *self.timezone.lock() = timezone;
    }
}

impl SessionGuard for ConsoleHooks {
    fn session_invalid(&self, signal: &SessionSignal) {
        tracing::error!(?signal, "session invalid");
        match signal {
            SessionSignal::MissingToken => {
                eprintln!(
                    "No session token. Pass --token or set session_token in the config file."
                )
            }
            SessionSignal::Rejected(err) => {
                eprintln!("Session rejected ({err}). Sign in again and restart.")
            }
        }
    }
}

impl ErrorReporter for ConsoleHooks {
    fn query_failed(&self, error: &QueryError) {
        println!("! {error} (showing previous results)");
    }

    fn streams_unavailable(&self, error: &FetchError) {
        println!("! could not load streams: {error}");
    }
}

impl DetailView for ConsoleHooks {
    fn open(&self, record: &LogRecord) {
        let timezone = *self.timezone.lock();
        println!("--- record ---");
        println!("time: {}", timezone.format(record.time));
        println!("tags: {}", record.labels());
        println!("{}", record.body);
        println!("--------------");
    }

    fn close(&self) {
        println!("(detail closed)");
    }
}

pub fn print_status<R: RecordSource>(explorer: &Explorer<R>) {
    let stream = explorer
        .directory()
        .active()
        .map_or("<none>", |s| s.name.as_str());

    println!("[{stream}] {}", window_summary(explorer.window()));
    if explorer.is_loading() {
        println!("loading...");
    }
    if let Some(err) = explorer.last_error() {
        println!("last error: {err}");
    }
}

/// Window bounds in the display timezone, plus the preset they came from
fn window_summary(window: &TimeWindow) -> String {
    let range = window.range();
    let mut summary = format!(
        "{} .. {} ({})",
        window.format(range.start),
        window.format(range.end),
        window.timezone().label()
    );
    if let Some(preset) = window.preset() {
        summary.push_str(" last ");
        summary.push_str(preset.label());
    }
    summary
}

pub fn print_view<R: RecordSource>(explorer: &Explorer<R>) {
    print_status(explorer);

    let view = explorer.view();
    if !view.selection().is_empty() {
        println!("tags: {}", view.selection().as_slice().join(" > "));
    }
    for (i, record) in view.rows().enumerate() {
        println!(
            "{:>4}  {}  {}  [{}]",
            i + 1,
            explorer.window().format(record.time),
            record.body,
            record.leading_tags(ROW_TAGS).join(", ")
        );
    }
    println!("{} of {} records", view.len(), view.total());
}

pub fn print_streams<R: RecordSource>(explorer: &Explorer<R>) {
    let directory = explorer.directory();
    if directory.nothing_found() {
        println!("no streams match '{}'", directory.query());
        return;
    }
    for stream in directory.filtered() {
        let marker = if directory.active() == Some(stream) { '*' } else { ' ' };
        println!("{marker} {stream}");
    }
}

pub fn print_tags<R: RecordSource>(explorer: &Explorer<R>) {
    let universe = explorer.view().tag_universe();
    if universe.is_empty() {
        println!("no tags to select");
        return;
    }
    for tag in universe {
        let marker = if explorer.selection().contains(tag) { '*' } else { ' ' };
        println!("{marker} {tag}");
    }
}

pub fn print_candidates<R: RecordSource>(explorer: &Explorer<R>) {
    let lookup = explorer.lookup();
    if lookup.nothing_found() {
        println!("nothing found for '{}'", lookup.query());
        return;
    }
    for (i, record) in lookup.candidates().enumerate() {
        println!("{:>4}  {}", i + 1, record.body);
    }
}

pub fn print_help() {
    for command in COMMANDS {
        println!("  {:<22}{}", command.usage, command.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn test_window_summary_names_preset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 10, 0).unwrap();
        let mut window = TimeWindow::new(TimeDelta::minutes(10), now);
        assert_eq!(
            window_summary(&window),
            "15/01/2024, 10:00:00 .. 15/01/2024, 10:10:00 (UTC)"
        );

        window.cycle_preset(true, now);
        window.cycle_preset(true, now);
        assert_eq!(
            window_summary(&window),
            "15/01/2024, 09:55:00 .. 15/01/2024, 10:10:00 (UTC) last 15m"
        );
    }
}
