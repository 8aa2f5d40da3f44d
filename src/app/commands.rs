use anyhow::{bail, Context, Result};

use logscope_types::{parse_span, DisplayTimezone, TimeRange};

use super::Action;

/// A console command as listed by `help`
#[derive(Clone, Copy, Debug)]
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub const COMMANDS: &[Command] = &[
    Command {
        name: "streams",
        usage: "streams [filter]",
        description: "List streams, optionally narrowed by name",
    },
    Command {
        name: "use",
        usage: "use <stream>",
        description: "Make a stream active and query it",
    },
    Command {
        name: "range",
        usage: "range <start> <end>",
        description: "Query an absolute window (RFC 3339)",
    },
    Command {
        name: "last",
        usage: "last <span>",
        description: "Query the span before now (45m, 2h, 1d)",
    },
    Command {
        name: "next",
        usage: "next",
        description: "Switch to the next window preset",
    },
    Command {
        name: "prev",
        usage: "prev",
        description: "Switch to the previous window preset",
    },
    Command {
        name: "tz",
        usage: "tz <zone>",
        description: "Display times in utc, local or an offset like +05:30",
    },
    Command {
        name: "tag",
        usage: "tag <tag>",
        description: "Toggle a tag in the selection",
    },
    Command {
        name: "untag",
        usage: "untag <tag>",
        description: "Remove a tag from the selection",
    },
    Command {
        name: "clear-tags",
        usage: "clear-tags",
        description: "Drop every selected tag",
    },
    Command {
        name: "tags",
        usage: "tags",
        description: "List the tags offered for selection",
    },
    Command {
        name: "find",
        usage: "find [text]",
        description: "Look up records by body text",
    },
    Command {
        name: "open",
        usage: "open <n>",
        description: "Show lookup candidate n",
    },
    Command {
        name: "row",
        usage: "row <n>",
        description: "Show displayed row n",
    },
    Command {
        name: "close",
        usage: "close",
        description: "Close the record detail",
    },
    Command {
        name: "refresh",
        usage: "refresh",
        description: "Re-run the current query",
    },
    Command {
        name: "show",
        usage: "show",
        description: "Print the filtered rows",
    },
    Command {
        name: "help",
        usage: "help",
        description: "List commands",
    },
    Command {
        name: "quit",
        usage: "quit",
        description: "Leave the console",
    },
];

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<Action>> {
    let line = line.trim();
    let Some((name, rest)) = split_word(line) else {
        return Ok(None);
    };

    let action = match name {
        "streams" => Action::ListStreams((!rest.is_empty()).then(|| rest.to_string())),
        "use" => Action::UseStream(required(name, rest)?.to_string()),
        "range" => {
            let (start, end) = split_word(rest)
                .filter(|(_, end)| !end.is_empty())
                .context("usage: range <start> <end>")?;
            Action::SetRange(TimeRange::parse(start, end)?)
        }
        "last" => Action::Last(parse_span(required(name, rest)?)?),
        "next" => Action::NextPreset,
        "prev" => Action::PrevPreset,
        "tz" => Action::SetTimezone(required(name, rest)?.parse::<DisplayTimezone>()?),
        "tag" => Action::ToggleTag(required(name, rest)?.to_string()),
        "untag" => Action::RemoveTag(required(name, rest)?.to_string()),
        "clear-tags" => Action::ClearTags,
        "tags" => Action::ListTags,
        "find" => Action::Find(rest.to_string()),
        "open" => Action::OpenCandidate(index(name, rest)?),
        "row" => Action::OpenRow(index(name, rest)?),
        "close" => Action::CloseDetail,
        "refresh" => Action::Refresh,
        "show" => Action::Show,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => bail!("unknown command '{other}', type 'help' for a list"),
    };
    Ok(Some(action))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    })
}

fn required<'a>(name: &str, rest: &'a str) -> Result<&'a str> {
    if rest.is_empty() {
        let usage = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .map_or(name, |c| c.usage);
        bail!("usage: {usage}");
    }
    Ok(rest)
}

fn index(name: &str, rest: &str) -> Result<usize> {
    let n: usize = required(name, rest)?
        .parse()
        .with_context(|| format!("'{rest}' is not a row number"))?;
    if n == 0 {
        bail!("rows are numbered from 1");
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn parse(line: &str) -> Action {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_stream_commands() {
        assert_eq!(parse("streams"), Action::ListStreams(None));
        assert_eq!(
            parse("streams  my stream "),
            Action::ListStreams(Some("my stream".to_string()))
        );
        assert_eq!(parse("use app-a"), Action::UseStream("app-a".to_string()));
        assert!(parse_line("use").is_err());
    }

    #[test]
    fn test_window_commands() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap();
        assert_eq!(
            parse("range 2024-01-15T10:00:00Z 2024-01-15T11:00:00+00:00"),
            Action::SetRange(TimeRange::new(start, end))
        );
        assert!(parse_line("range 2024-01-15T10:00:00Z").is_err());
        assert_eq!(parse("last 45m"), Action::Last(TimeDelta::minutes(45)));
        assert!(parse_line("last soon").is_err());
        assert_eq!(parse("next"), Action::NextPreset);
    }

    #[test]
    fn test_timezone_command() {
        assert_eq!(parse("tz utc"), Action::SetTimezone(DisplayTimezone::Utc));
        assert!(parse_line("tz mars").is_err());
    }

    #[test]
    fn test_tag_and_lookup_commands() {
        assert_eq!(parse("tag env:prod"), Action::ToggleTag("env:prod".to_string()));
        assert_eq!(parse("untag env:prod"), Action::RemoveTag("env:prod".to_string()));
        assert_eq!(parse("find"), Action::Find(String::new()));
        assert_eq!(
            parse("find connection refused"),
            Action::Find("connection refused".to_string())
        );
        assert_eq!(parse("open 2"), Action::OpenCandidate(2));
        assert_eq!(parse("row 1"), Action::OpenRow(1));
        assert!(parse_line("row 0").is_err());
        assert!(parse_line("row two").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_line("frobnicate").unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_every_listed_command_parses() {
        for command in COMMANDS {
            let line = command
                .usage
                .replace("<stream>", "app-a")
                .replace("<start> <end>", "2024-01-15T10:00:00Z 2024-01-15T11:00:00Z")
                .replace("<span>", "1h")
                .replace("<zone>", "local")
                .replace("<tag>", "svc:a")
                .replace("<n>", "1")
                .replace("[filter]", "")
                .replace("[text]", "x");
            assert!(parse_line(&line).unwrap().is_some(), "{}", command.usage);
        }
    }
}
