use chrono::{DateTime, TimeDelta, Utc};

use logscope_types::{DisplayTimezone, TimeRange, TimeRangePreset};

/// Query window bounds plus the timezone record times are shown in
#[derive(Clone, Debug)]
pub struct TimeWindow {
    range: TimeRange,
    timezone: DisplayTimezone,
    /// Preset the current range was derived from, if any
    preset: Option<TimeRangePreset>,
}

impl TimeWindow {
    /// Window covering the `span` before `now`
    pub fn new(span: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            range: TimeRange::last(span, now),
            timezone: DisplayTimezone::Utc,
            preset: None,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Replace both bounds at once.
    ///
    /// `start > end` is accepted as-is. Returns whether the bounds changed.
    pub fn set_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.preset = None;
        self.replace(TimeRange::new(start, end))
    }

    /// Switch to a relative preset ending at `now`
    pub fn apply_preset(&mut self, preset: TimeRangePreset, now: DateTime<Utc>) -> bool {
        self.preset = Some(preset);
        self.replace(preset.range(now))
    }

    /// Step to the next (or previous) preset, starting from the default
    pub fn cycle_preset(&mut self, forward: bool, now: DateTime<Utc>) -> bool {
        let preset = match self.preset {
            Some(current) if forward => current.next(),
            Some(current) => current.prev(),
            None => TimeRangePreset::default(),
        };
        self.apply_preset(preset, now)
    }

    fn replace(&mut self, range: TimeRange) -> bool {
        if range.is_inverted() {
            tracing::debug!(%range, "window start is after end; query will match nothing");
        }
        if self.range == range {
            return false;
        }
        self.range = range;
        true
    }

    pub fn preset(&self) -> Option<TimeRangePreset> {
        self.preset
    }

    pub fn timezone(&self) -> DisplayTimezone {
        self.timezone
    }

    /// Only affects formatting
    pub fn set_display_timezone(&mut self, timezone: DisplayTimezone) {
        self.timezone = timezone;
    }

    /// Render an instant in the display timezone
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        self.timezone.format(instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_initial_window_is_trailing_span() {
        let window = TimeWindow::new(TimeDelta::minutes(10), at(10, 30));
        assert_eq!(window.range(), TimeRange::new(at(10, 20), at(10, 30)));
        assert_eq!(window.timezone(), DisplayTimezone::Utc);
    }

    #[test]
    fn test_set_range_reports_change() {
        let mut window = TimeWindow::new(TimeDelta::minutes(10), at(10, 30));
        assert!(!window.set_range(at(10, 20), at(10, 30)));
        assert!(window.set_range(at(9, 0), at(10, 0)));
        assert!(window.set_range(at(10, 0), at(9, 0)));
        assert!(window.range().is_inverted());
    }

    #[test]
    fn test_timezone_leaves_range_alone() {
        let mut window = TimeWindow::new(TimeDelta::minutes(10), at(10, 30));
        let before = window.range();
        window.set_display_timezone("+05:30".parse().unwrap());
        assert_eq!(window.range(), before);
        assert_eq!(window.format(at(10, 30)), "15/01/2024, 16:00:00");
    }

    #[test]
    fn test_cycle_presets() {
        let mut window = TimeWindow::new(TimeDelta::minutes(10), at(10, 30));
        assert!(window.cycle_preset(true, at(11, 0)));
        assert_eq!(window.preset(), Some(TimeRangePreset::Last10m));

        window.cycle_preset(true, at(11, 0));
        assert_eq!(window.preset(), Some(TimeRangePreset::Last15m));
        assert_eq!(window.range().start, at(10, 45));

        window.cycle_preset(false, at(11, 0));
        assert_eq!(window.preset(), Some(TimeRangePreset::Last10m));

        window.set_range(at(9, 0), at(10, 0));
        assert_eq!(window.preset(), None);
    }
}
