use std::io::{self, Write};

use podtrace_logs::classify_event;
use podtrace_types::{DiffEmphasis, KubeletEvent, Subsystem, truncate};

use crate::duration::format_millis;
use crate::theme::Theme;

/// Default width of the message column
pub const DEFAULT_MESSAGE_WIDTH: usize = 90;

/// Width the time columns are padded to
const TIME_COLUMN_WIDTH: usize = 9;

const COLUMN_HEADER: &str = "ELAPSED\tDIFF\tSYSTEM\tMESSAGE";

/// One computed timeline row, before formatting
#[derive(Clone, Debug, PartialEq)]
struct TimelineRow {
    /// Milliseconds since the first row
    elapsed_ms: f64,

    /// Milliseconds since the previous row
    delta_ms: f64,

    emphasis: DiffEmphasis,
    subsystem: Subsystem,

    /// Message, already cut to the column width
    message: String,
}

/// Turns time-ordered events into timeline rows
#[derive(Clone, Debug)]
pub struct TimelineRenderer {
    first_timestamp: Option<f64>,
    previous_timestamp: Option<f64>,
    message_width: usize,
    theme: Theme,
}

impl TimelineRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            first_timestamp: None,
            previous_timestamp: None,
            message_width: DEFAULT_MESSAGE_WIDTH,
            theme,
        }
    }

    /// Set the message column width
    pub fn with_message_width(mut self, width: usize) -> Self {
        self.message_width = width;
        self
    }

    /// Compute the row for the next event and advance the clock.
    ///
    /// The first event defines time zero and has no delta.
    fn next_row(&mut self, event: &KubeletEvent) -> TimelineRow {
        let ts = event.timestamp;
        let first = *self.first_timestamp.get_or_insert(ts);
        let elapsed_ms = ts - first;
        let delta_ms = self.previous_timestamp.map_or(0.0, |prev| ts - prev);
        self.previous_timestamp = Some(ts);

        TimelineRow {
            elapsed_ms,
            delta_ms,
            emphasis: DiffEmphasis::from_millis(delta_ms.abs().trunc() as i64),
            subsystem: classify_event(event),
            message: truncate(&event.message, self.message_width).into_owned(),
        }
    }

    /// Format a row as a tab separated line (no trailing newline)
    fn format_row(&self, row: &TimelineRow) -> String {
        let elapsed = format_millis(row.elapsed_ms);
        let diff = format!(
            "{:<width$}",
            format_millis(row.delta_ms),
            width = TIME_COLUMN_WIDTH
        );
        format!(
            "{:<width$}\t{}\t{}\t{}",
            elapsed,
            self.theme.diff(&diff, row.emphasis),
            self.theme.subsystem(row.subsystem),
            row.message,
            width = TIME_COLUMN_WIDTH,
        )
    }

    /// Write the line naming the pod being analysed
    pub fn write_pod_header<W: Write>(&self, out: &mut W, pod: &str) -> io::Result<()> {
        writeln!(out, "Pod: {pod}")
    }

    /// Write the section title and column names
    fn write_column_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "Logs:")?;
        writeln!(out, "{COLUMN_HEADER}")
    }

    /// Write the column header and one row per event, in the order given
    pub fn render<W: Write>(&mut self, out: &mut W, events: &[KubeletEvent]) -> io::Result<()> {
        self.write_column_header(out)?;
        for event in events {
            let row = self.next_row(event);
            writeln!(out, "{}", self.format_row(&row))?;
        }
        out.flush()
    }
}
