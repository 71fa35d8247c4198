//! Duration formatting for timeline columns.
//!
//! Durations arrive as float milliseconds and are shown in the compact
//! `1h2m3.5s` / `1.5ms` / `300µs` notation kubelet operators are used to.

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Display granularity: a tenth of a millisecond
pub const DISPLAY_STEP_NANOS: i64 = 100_000;

/// Convert float milliseconds to whole nanoseconds, truncating toward zero
pub fn millis_to_nanos(millis: f64) -> i64 {
    (millis * NANOS_PER_MILLI as f64) as i64
}

/// Round to the nearest multiple of `step`, halves away from zero
pub fn round_nanos(nanos: i64, step: i64) -> i64 {
    if step <= 0 {
        return nanos;
    }
    let rem = nanos % step;
    if rem.abs() * 2 < step {
        nanos - rem
    } else if nanos < 0 {
        nanos.saturating_sub(step + rem)
    } else {
        nanos.saturating_add(step - rem)
    }
}

/// Format float milliseconds for display, rounded to [`DISPLAY_STEP_NANOS`]
pub fn format_millis(millis: f64) -> String {
    format_nanos(round_nanos(millis_to_nanos(millis), DISPLAY_STEP_NANOS))
}

/// Format a nanosecond count, e.g. `0s`, `250µs`, `1.5ms`, `2.25s`, `1h0m5s`
pub fn format_nanos(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }

    let sign = if nanos < 0 { "-" } else { "" };
    let abs = nanos.unsigned_abs();

    if abs < NANOS_PER_SEC {
        let (unit, precision) = if abs < NANOS_PER_MICRO {
            ("ns", 0)
        } else if abs < NANOS_PER_MILLI {
            ("µs", 3)
        } else {
            ("ms", 6)
        };
        let (whole, frac) = split_fraction(abs, precision);
        return format!("{sign}{whole}{frac}{unit}");
    }

    let (secs, frac) = split_fraction(abs, 9);
    let hours = secs / 3600;
    let minutes = secs / 60 % 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}{frac}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}{frac}s")
    } else {
        format!("{sign}{seconds}{frac}s")
    }
}

/// Split `value` into its integer part and a `.ddd` fraction with trailing
/// zeros dropped (empty when the fraction is zero)
fn split_fraction(value: u64, precision: u32) -> (u64, String) {
    let scale = 10u64.pow(precision);
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return (whole, String::new());
    }
    let digits = format!("{:0width$}", frac, width = precision as usize);
    (whole, format!(".{}", digits.trim_end_matches('0')))
}
