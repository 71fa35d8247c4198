//! Shared types for podtrace
//!
//! This crate contains the event record parsed from kubelet log lines and the
//! display categories used when rendering a timeline.

use crossterm::style::{Attribute, Color, ContentStyle};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;

// ============================================================================
// Event Types
// ============================================================================

/// The single pod an event is about
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PodRef {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub namespace: String,
}

impl std::fmt::Display for PodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// One structured kubelet log line.
///
/// Every field is optional on the wire. A missing field, a JSON `null` or a
/// value of the wrong type decodes to the zero value of that field alone, so
/// `KubeletEvent::default()` is exactly what an empty object produces.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KubeletEvent {
    /// Milliseconds since an arbitrary epoch
    #[serde(rename = "ts", deserialize_with = "lenient")]
    pub timestamp: f64,

    #[serde(rename = "msg", deserialize_with = "lenient")]
    pub message: String,

    #[serde(deserialize_with = "lenient")]
    pub pod: PodRef,

    /// Pods referenced by events that cover a set of pods
    #[serde(rename = "pods", deserialize_with = "lenient")]
    pub related_pods: Vec<String>,

    /// Emitting module, e.g. `pleg/generic.go:123`
    #[serde(rename = "caller", deserialize_with = "lenient")]
    pub origin: String,
}

impl KubeletEvent {
    pub fn pod_name(&self) -> &str {
        &self.pod.name
    }
}

/// Decode one field, falling back to its zero value on `null` or a type mismatch.
///
/// Only the field is lost; syntax errors still fail the whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

// ============================================================================
// Display Types
// ============================================================================

fn style(color: Option<Color>, bold: bool) -> ContentStyle {
    let mut style = ContentStyle {
        foreground_color: color,
        ..ContentStyle::default()
    };
    if bold {
        style.attributes.set(Attribute::Bold);
    }
    style
}

/// Kubelet subsystem an event originates from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Volume,
    SyncPod,
    Pleg,
    Status,
    Mount,
    Probe,
    Misc,
}

impl Subsystem {
    /// Column label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Volume => "VOLUME",
            Self::SyncPod => "SYNCPOD",
            Self::Pleg => "PLEG",
            Self::Status => "STATUS",
            Self::Mount => "MOUNT",
            Self::Probe => "PROBE",
            Self::Misc => "MISC",
        }
    }

    /// Get display color for this subsystem
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Volume => Some(Color::DarkGreen),
            Self::SyncPod => Some(Color::DarkBlue),
            Self::Pleg => Some(Color::DarkRed),
            Self::Status => Some(Color::Blue),
            Self::Mount => Some(Color::Green),
            Self::Probe => Some(Color::DarkYellow),
            Self::Misc => None,
        }
    }

    /// Every label is rendered bold on top of its color
    pub fn style(&self) -> ContentStyle {
        style(self.color(), true)
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Visual weight given to the gap between two consecutive events
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DiffEmphasis {
    #[default]
    None,
    Mild,
    MildBold,
    Elevated,
    ElevatedBold,
    Severe,
    SevereBold,
}

impl DiffEmphasis {
    /// Thresholds in milliseconds, each one overriding the ones below it
    const THRESHOLDS: [(i64, DiffEmphasis); 6] = [
        (10, Self::Mild),
        (30, Self::MildBold),
        (50, Self::Elevated),
        (100, Self::ElevatedBold),
        (300, Self::Severe),
        (500, Self::SevereBold),
    ];

    /// Pick the emphasis for a gap of `millis` whole milliseconds
    pub fn from_millis(millis: i64) -> Self {
        let mut emphasis = Self::None;
        for (threshold, level) in Self::THRESHOLDS {
            if millis > threshold {
                emphasis = level;
            }
        }
        emphasis
    }

    pub fn style(&self) -> ContentStyle {
        match self {
            Self::None => ContentStyle::default(),
            Self::Mild => style(Some(Color::DarkYellow), false),
            Self::MildBold => style(Some(Color::DarkYellow), true),
            Self::Elevated => style(Some(Color::Yellow), false),
            Self::ElevatedBold => style(Some(Color::Yellow), true),
            Self::Severe => style(Some(Color::DarkRed), false),
            Self::SevereBold => style(Some(Color::DarkRed), true),
        }
    }
}

// ============================================================================
// Text Helpers
// ============================================================================

/// Marker appended to shortened text
const ELLIPSIS: &str = "...";

/// Shorten `text` to at most `max` characters, ending in `...` when cut.
///
/// Text that already fits is returned unchanged.
pub fn truncate(text: &str, max: usize) -> Cow<'_, str> {
    if text.chars().count() <= max {
        return Cow::Borrowed(text);
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut shortened: String = text.chars().take(keep).collect();
    shortened.push_str(ELLIPSIS);
    Cow::Owned(shortened)
}
