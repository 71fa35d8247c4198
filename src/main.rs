mod config;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, debug, info};

use config::{Cli, Config, load_config, normalize_args};
use podtrace_logs::{LogStream, RelevanceFilter};
use podtrace_render::{Theme, TimelineRenderer};

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    // Diagnostics go to stderr so stdout carries only the timeline
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run_app(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_app(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    debug!(?config, "Resolved configuration");

    let theme = Theme::new(config.color.enabled());
    run_pipeline(&config, theme, io::stdin().lock(), &mut io::stdout().lock())
}

/// Read kubelet log lines from `input` and write the pod's timeline to `out`
fn run_pipeline<R: BufRead, W: Write>(
    config: &Config,
    theme: Theme,
    input: R,
    out: &mut W,
) -> Result<()> {
    let mut renderer = TimelineRenderer::new(theme).with_message_width(config.message_width);
    renderer.write_pod_header(out, &config.pod)?;

    let filter = RelevanceFilter::new(config.pod.as_str())
        .with_stop_after_deletion(config.stop_after_deletion);
    let mut stream = LogStream::new(filter);
    stream.consume(input).context("Failed to read log input")?;

    if tracing::enabled!(Level::DEBUG) {
        let counts = stream.buffer().subsystem_counts();
        debug!(
            volume = counts.volume,
            syncpod = counts.syncpod,
            pleg = counts.pleg,
            status = counts.status,
            mount = counts.mount,
            probe = counts.probe,
            misc = counts.misc,
            "Accepted events by subsystem"
        );
    }

    let (events, stats) = stream.finish()?;
    info!(
        lines = stats.lines,
        discarded = stats.discarded,
        extracted = stats.extracted,
        accepted = stats.accepted,
        stopped_early = stats.stopped_early,
        "Finished reading log input"
    );

    renderer
        .render(out, &events)
        .context("Failed to write timeline")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;
    use podtrace_logs::PipelineError;

    fn config(pod: &str, stop_after_deletion: bool) -> Config {
        Config {
            pod: pod.to_string(),
            stop_after_deletion,
            color: ColorMode::Never,
            message_width: podtrace_render::DEFAULT_MESSAGE_WIDTH,
        }
    }

    fn run(config: &Config, input: &str) -> Result<String> {
        let mut out = Vec::new();
        run_pipeline(config, Theme::plain(), input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_syncpod_scenario() {
        let input = r#"foo bar {"ts":100,"msg":"syncPod enter","pod":{"name":"nginx-abc123"},"caller":"kuberuntime/x.go:1"}"#;
        let output = run(&config("nginx", false), input).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Pod: nginx");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Logs:");
        assert_eq!(lines[3], "ELAPSED\tDIFF\tSYSTEM\tMESSAGE");
        assert_eq!(lines[4], "0s       \t0s       \tSYNCPOD\tsyncPod enter");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_relist_after_window_opens() {
        let input = concat!(
            r#"{"ts":100,"msg":"syncPod enter","pod":{"name":"nginx-abc123"},"caller":"kuberuntime/x.go:1"}"#,
            "\n",
            r#"{"ts":140,"msg":"GenericPLEG: Relisting","caller":"pleg/generic.go:191"}"#,
            "\n",
            r#"{"ts":141,"msg":"GenericPLEG: Relisting","caller":"kubelet/other.go:1"}"#,
            "\n",
        );
        let output = run(&config("nginx", false), input).unwrap();
        let rows: Vec<&str> = output.lines().skip(4).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "40ms     \t40ms     \tPLEG\tGenericPLEG: Relisting");
        assert_eq!(rows[2], "41ms     \t1ms      \tMISC\tGenericPLEG: Relisting");
    }

    #[test]
    fn test_stop_after_deletion_scenario() {
        let input = concat!(
            r#"{"ts":1,"msg":"syncPod enter","pod":{"name":"nginx-1"}}"#,
            "\n",
            r#"{"ts":2,"msg":"Pod is marked for graceful deletion, begin teardown","pod":{"name":"nginx-1"}}"#,
            "\n",
            r#"{"ts":3,"msg":"syncPod exit","pod":{"name":"nginx-1"}}"#,
            "\n",
        );
        let output = run(&config("nginx", true), input).unwrap();
        let rows: Vec<&str> = output.lines().skip(4).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].ends_with("syncPod enter"));

        let output = run(&config("nginx", false), input).unwrap();
        assert_eq!(output.lines().skip(4).count(), 3);
    }

    #[test]
    fn test_mistyped_related_pods_still_rendered() {
        let input = r#"{"ts":1,"msg":"syncPod enter","pod":{"name":"nginx-1"},"pods":[{"name":"nginx-1","namespace":"default"}]}"#;
        let output = run(&config("nginx", false), input).unwrap();
        let rows: Vec<&str> = output.lines().skip(4).collect();
        assert_eq!(rows, vec!["0s       \t0s       \tSYNCPOD\tsyncPod enter"]);
    }

    #[test]
    fn test_no_matching_lines_fails() {
        let input = r#"{"ts":1,"msg":"syncPod enter","pod":{"name":"redis-0"}}"#;
        let err = run(&config("nginx", false), input).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoMessages { .. })
        ));
        assert!(err.to_string().contains("No messages found"));
    }

    #[test]
    fn test_out_of_order_input_renders_sorted() {
        let input = concat!(
            r#"{"ts":300,"msg":"third","pod":{"name":"nginx-1"}}"#,
            "\n",
            r#"{"ts":100,"msg":"first","pod":{"name":"nginx-1"}}"#,
            "\n",
            r#"{"ts":200,"msg":"second","pod":{"name":"nginx-1"}}"#,
            "\n",
        );
        let output = run(&config("nginx", false), input).unwrap();
        let messages: Vec<&str> = output
            .lines()
            .skip(4)
            .filter_map(|row| row.rsplit('\t').next())
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }
}
