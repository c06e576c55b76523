//! Display utilities for the aura CLI.

use aura_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Creates the spinner shown while a job runs.
pub(crate) fn job_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Returns true for lines that only report transfer or encode progress.
///
/// These replace each other in place instead of scrolling.
pub(crate) fn is_progress_line(line: &str) -> bool {
    let line = line.trim_start();
    (line.starts_with("[download]") && line.contains('%'))
        || line.starts_with("[ffmpeg] frame=")
        || line.starts_with("[ffmpeg] size=")
}

/// Formats a duration in seconds as `H:MM:SS` or `M:SS`.
pub(crate) fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "unknown".to_string();
    }
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Prints a metadata summary.
pub(crate) fn print_media_info(info: &MediaInfo) {
    println!("Title:    {}", info.title);
    if info.is_playlist {
        println!("Type:     playlist");
        println!("Entries:  {}", info.entry_count);
    } else {
        println!("Type:     single");
        println!("Duration: {}", format_duration(info.duration_seconds));
    }

    let mut heights: Vec<u64> = info
        .available_formats
        .iter()
        .filter_map(|f| f.get("height").and_then(serde_json::Value::as_u64))
        .collect();
    heights.sort_unstable();
    heights.dedup();
    if !heights.is_empty() {
        let list: Vec<String> = heights.iter().rev().map(|h| format!("{h}p")).collect();
        println!("Heights:  {}", list.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines() {
        assert!(is_progress_line("[download]  42.0% of 10.00MiB at 2.00MiB/s ETA 00:03"));
        assert!(is_progress_line("[ffmpeg] frame=  240 fps= 60 q=28.0 size=512kB"));
        assert!(!is_progress_line("[download] Destination: /dl/a.mp4"));
        assert!(!is_progress_line("> [aura] Ready!"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59.6), "1:00");
        assert_eq!(format_duration(3725.0), "1:02:05");
        assert_eq!(format_duration(0.0), "unknown");
    }
}
