use podtrace_types::KubeletEvent;

/// Periodic, pod-agnostic event from the pod lifecycle event generator
pub const PLEG_RELIST_MSG: &str = "GenericPLEG: Relisting";

/// Logged once the kubelet starts tearing a pod down
pub const GRACEFUL_DELETION_MSG: &str = "Pod is marked for graceful deletion, begin teardown";

/// Outcome of offering one event to the filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterDecision {
    /// The event belongs on the timeline
    Accept,
    /// The event is unrelated and should be dropped
    Reject,
    /// Stop reading input; the current event is excluded
    Stop,
}

/// Where the filter is in the relevance window lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum WindowState {
    /// No event for the target pod seen yet
    #[default]
    Closed,
    /// At least one event for the target pod was accepted
    Open,
    /// Early stop triggered; terminal
    Stopped,
}

/// Stateful filter selecting the events relevant to one pod
#[derive(Clone, Debug)]
pub struct RelevanceFilter {
    /// Target pod name, matched as a prefix against `pod.name`
    pod: String,

    /// Stop at the first graceful deletion of the target pod
    stop_after_deletion: bool,

    state: WindowState,
}

impl RelevanceFilter {
    /// Create a filter for the given pod
    pub fn new(pod: impl Into<String>) -> Self {
        Self {
            pod: pod.into(),
            stop_after_deletion: false,
            state: WindowState::Closed,
        }
    }

    /// Enable or disable the early stop on graceful deletion
    pub fn with_stop_after_deletion(mut self, enabled: bool) -> Self {
        self.stop_after_deletion = enabled;
        self
    }

    /// Decide whether `event` belongs to the pod's timeline
    pub fn check(&mut self, event: &KubeletEvent) -> FilterDecision {
        match self.state {
            WindowState::Stopped => return FilterDecision::Stop,
            WindowState::Open if event.message == PLEG_RELIST_MSG => {
                return FilterDecision::Accept;
            }
            _ => {}
        }

        // Loose prefix match: the runtime appends generation suffixes to pod names
        if event.pod_name().starts_with(self.pod.as_str()) {
            if self.stop_after_deletion && event.message == GRACEFUL_DELETION_MSG {
                tracing::info!(pod = %event.pod, "Graceful deletion seen, stopping");
                self.state = WindowState::Stopped;
                return FilterDecision::Stop;
            }
            self.open();
            return FilterDecision::Accept;
        }

        if event.related_pods.iter().any(|p| p == &self.pod) {
            self.open();
            return FilterDecision::Accept;
        }

        FilterDecision::Reject
    }

    fn open(&mut self) {
        if self.state == WindowState::Closed {
            tracing::debug!(pod = %self.pod, "Relevance window opened");
            self.state = WindowState::Open;
        }
    }

    /// Get the target pod
    pub fn pod(&self) -> &str {
        &self.pod
    }
}
