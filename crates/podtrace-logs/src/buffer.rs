use podtrace_types::{KubeletEvent, Subsystem};

use crate::classifier::classify_event;

/// Accepted events, held until the stream ends so they can be time-ordered
#[derive(Clone, Debug, Default)]
pub struct EventBuffer {
    /// Internal storage, in arrival order
    events: Vec<KubeletEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new event
    pub fn push(&mut self, event: KubeletEvent) {
        self.events.push(event);
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get event count per subsystem
    pub fn subsystem_counts(&self) -> SubsystemCounts {
        let mut counts = SubsystemCounts::default();

        for event in &self.events {
            match classify_event(event) {
                Subsystem::Volume => counts.volume += 1,
                Subsystem::SyncPod => counts.syncpod += 1,
                Subsystem::Pleg => counts.pleg += 1,
                Subsystem::Status => counts.status += 1,
                Subsystem::Mount => counts.mount += 1,
                Subsystem::Probe => counts.probe += 1,
                Subsystem::Misc => counts.misc += 1,
            }
        }

        counts
    }

    /// Consume the buffer, returning events sorted by timestamp.
    ///
    /// The sort is stable, so events sharing a timestamp keep arrival order.
    pub fn into_sorted(mut self) -> Vec<KubeletEvent> {
        self.events
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        self.events
    }
}

/// Counts per subsystem
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubsystemCounts {
    pub volume: usize,
    pub syncpod: usize,
    pub pleg: usize,
    pub status: usize,
    pub mount: usize,
    pub probe: usize,
    pub misc: usize,
}
