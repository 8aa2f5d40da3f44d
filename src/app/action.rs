use chrono::TimeDelta;

use logscope_types::{DisplayTimezone, TimeRange};

/// Everything the operator can ask the console to do (command pattern)
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // Streams
    ListStreams(Option<String>),
    UseStream(String),

    // Time window
    SetRange(TimeRange),
    Last(TimeDelta),
    NextPreset,
    PrevPreset,
    SetTimezone(DisplayTimezone),

    // Tag selection
    ToggleTag(String),
    RemoveTag(String),
    ClearTags,
    ListTags,

    // Lookup and detail, indices are 1-based as printed
    Find(String),
    OpenCandidate(usize),
    OpenRow(usize),
    CloseDetail,

    Refresh,
    Show,
    Help,
    Quit,
}
