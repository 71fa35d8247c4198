use podtrace_types::{KubeletEvent, Subsystem};

const VOLUME_PREFIXES: [&str; 4] = [
    "volumemanager/",
    "populator/",
    "reconciler/",
    "operationexecutor/",
];

const SYNCPOD_MESSAGES: [&str; 2] = ["syncPod enter", "syncPod exit"];

/// Map an event to the kubelet subsystem that emitted it.
///
/// Rules are checked in a fixed order and the first match wins.
pub fn classify(origin: &str, message: &str) -> Subsystem {
    if VOLUME_PREFIXES.iter().any(|p| origin.starts_with(p)) {
        Subsystem::Volume
    } else if origin.starts_with("kuberuntime/")
        || SYNCPOD_MESSAGES.iter().any(|m| *m == message)
    {
        Subsystem::SyncPod
    } else if origin.starts_with("pleg/") {
        Subsystem::Pleg
    } else if origin.starts_with("status/") {
        Subsystem::Status
    } else if origin.starts_with("kubelet/kubelet_pods") {
        Subsystem::Mount
    } else if origin.starts_with("prober") {
        Subsystem::Probe
    } else {
        Subsystem::Misc
    }
}

/// Classify a parsed event
pub fn classify_event(event: &KubeletEvent) -> Subsystem {
    classify(&event.origin, &event.message)
}
