use std::fmt::Display;

use crossterm::style::ContentStyle;
use podtrace_types::{DiffEmphasis, Subsystem};

/// Applies timeline styles, or leaves text plain when color is off
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    enabled: bool,
}

impl Theme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Theme that never emits escape codes
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Render `content` with `style` applied
    fn paint<D: Display>(&self, style: ContentStyle, content: D) -> String {
        if self.enabled && style != ContentStyle::default() {
            style.apply(content).to_string()
        } else {
            content.to_string()
        }
    }

    /// Subsystem label in its category color
    pub fn subsystem(&self, subsystem: Subsystem) -> String {
        self.paint(subsystem.style(), subsystem.label())
    }

    /// Already padded diff column, emphasised by gap size
    pub fn diff(&self, text: &str, emphasis: DiffEmphasis) -> String {
        self.paint(emphasis.style(), text)
    }
}
