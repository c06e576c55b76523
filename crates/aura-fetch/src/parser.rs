//! Stateful parsing of downloader output.

use std::path::{Path, PathBuf};

use crate::matcher::{LineSignal, OutputMatcher, PathPriority, YtDlpMatcher};

/// Result of feeding one line to a [`ProgressParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Forward the line to the user.
    Log(String),
    /// The host is throttling; the line is replaced by a rate-limit event.
    RateLimited(String),
}

/// Final output file recovered from the downloader's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    /// Absolute path of the produced file.
    pub path: PathBuf,
    /// Strength of the signal that set it.
    pub priority: PathPriority,
}

impl ResolvedOutput {
    /// Returns true once a post-processor has confirmed the path.
    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        self.priority == PathPriority::PostProcessed
    }
}

/// Tracks the downloader's output line by line.
///
/// The resolved path follows these rules:
///
/// - a post-processor line always sets it
/// - a destination line sets it unless a post-processor already did
/// - an already-downloaded line sets it only if nothing else has
#[derive(Debug)]
pub struct ProgressParser<M = YtDlpMatcher> {
    matcher: M,
    base_dir: PathBuf,
    resolved: Option<ResolvedOutput>,
}

impl ProgressParser<YtDlpMatcher> {
    /// Creates a parser for `yt-dlp` output. Relative paths resolve against
    /// `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_matcher(YtDlpMatcher, base_dir)
    }
}

impl<M: OutputMatcher> ProgressParser<M> {
    /// Creates a parser with a custom matcher.
    #[must_use]
    pub fn with_matcher(matcher: M, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            matcher,
            base_dir: base_dir.into(),
            resolved: None,
        }
    }

    /// Classifies one line and updates the resolved path.
    pub fn feed(&mut self, line: &str) -> ParsedLine {
        match self.matcher.classify(line) {
            LineSignal::Plain => {}
            LineSignal::RateLimited => return ParsedLine::RateLimited(line.to_string()),
            LineSignal::OutputPath { path, priority } => self.offer(path, priority),
        }
        ParsedLine::Log(line.to_string())
    }

    fn offer(&mut self, path: PathBuf, priority: PathPriority) {
        let accept = match &self.resolved {
            None => true,
            Some(current) => match priority {
                PathPriority::PostProcessed => true,
                PathPriority::Destination => !current.is_authoritative(),
                PathPriority::AlreadyDownloaded => false,
            },
        };
        if accept {
            let path = if path.is_absolute() {
                path
            } else {
                self.base_dir.join(path)
            };
            log::debug!("output path ({priority:?}): {}", path.display());
            self.resolved = Some(ResolvedOutput { path, priority });
        }
    }

    /// The output path recovered so far.
    #[must_use]
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved.as_ref().map(|r| r.path.as_path())
    }

    /// The output recovered so far, with its priority.
    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedOutput> {
        self.resolved.as_ref()
    }

    /// Consumes the parser, returning the recovered output path.
    #[must_use]
    pub fn into_resolved_path(self) -> Option<PathBuf> {
        self.resolved.map(|r| r.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_destination() {
        let mut parser = ProgressParser::new("/dl");
        parser.feed("[download] Destination: /dl/v.f137.mp4");
        parser.feed("[download] Destination: /dl/v.f140.m4a");
        assert_eq!(parser.resolved_path(), Some(Path::new("/dl/v.f140.m4a")));
        parser.feed(r#"[Merger] Merging formats into "/dl/v.mp4""#);
        parser.feed("[download] Destination: /dl/other.mp4");
        assert_eq!(parser.resolved_path(), Some(Path::new("/dl/v.mp4")));
        assert!(parser.resolved().unwrap().is_authoritative());
    }

    #[test]
    fn test_already_downloaded_only_if_unset() {
        let mut parser = ProgressParser::new("/dl");
        parser.feed("[download] /dl/a.mp4 has already been downloaded");
        assert_eq!(parser.resolved_path(), Some(Path::new("/dl/a.mp4")));
        parser.feed("[download] /dl/b.mp4 has already been downloaded");
        assert_eq!(parser.resolved_path(), Some(Path::new("/dl/a.mp4")));
        parser.feed("[download] Destination: /dl/c.mp4");
        assert_eq!(parser.resolved_path(), Some(Path::new("/dl/c.mp4")));
    }

    #[test]
    fn test_relative_paths_resolved_against_destination() {
        let mut parser = ProgressParser::new("/music");
        parser.feed("[ExtractAudio] Destination: Artist - Song.mp3");
        assert_eq!(
            parser.into_resolved_path(),
            Some(PathBuf::from("/music/Artist - Song.mp3"))
        );
    }

    #[test]
    fn test_lines_forwarded_and_rate_limit_replaced() {
        let mut parser = ProgressParser::new("/dl");
        assert_eq!(
            parser.feed("[download]  50.0% of 1MiB"),
            ParsedLine::Log("[download]  50.0% of 1MiB".into())
        );
        assert_eq!(
            parser.feed("[download] Destination: /dl/x.mp4"),
            ParsedLine::Log("[download] Destination: /dl/x.mp4".into())
        );
        assert!(matches!(
            parser.feed("ERROR: HTTP Error 429: Too Many Requests"),
            ParsedLine::RateLimited(_)
        ));
    }

    #[test]
    fn test_no_path_without_signals() {
        let mut parser = ProgressParser::new("/dl");
        parser.feed("[youtube] abc: Downloading webpage");
        assert!(parser.resolved_path().is_none());
    }

    struct EveryLineIsAFile;

    impl OutputMatcher for EveryLineIsAFile {
        fn classify(&self, line: &str) -> LineSignal {
            LineSignal::OutputPath {
                path: PathBuf::from(line),
                priority: PathPriority::Destination,
            }
        }
    }

    #[test]
    fn test_custom_matcher() {
        let mut parser = ProgressParser::with_matcher(EveryLineIsAFile, "/base");
        parser.feed("one.bin");
        parser.feed("two.bin");
        assert_eq!(parser.resolved_path(), Some(Path::new("/base/two.bin")));
    }
}
