//! Splitting raw process output into lines.

/// Incremental splitter for process output.
///
/// Lines end at `\n` or `\r`; the transcoder rewrites its stats line in place
/// with bare carriage returns, so both count as terminators. Empty lines are
/// dropped and invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    /// Creates an empty splitter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feeds a chunk and returns every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                if let Some(line) = self.take_line() {
                    lines.push(line);
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Returns the trailing partial line, if any.
    pub fn finish(&mut self) -> Option<String> {
        self.take_line()
    }

    fn take_line(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        if line.trim().is_empty() { None } else { Some(line) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_and_carriage_return() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"one\ntwo\r\nthree\rfour");
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(splitter.finish(), Some("four".to_string()));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_lines_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"[download]  12").is_empty());
        assert!(splitter.push(b".5% of 10MiB").is_empty());
        assert_eq!(splitter.push(b"\r"), vec!["[download]  12.5% of 10MiB"]);
    }

    #[test]
    fn test_empty_lines_dropped() {
        let mut splitter = LineSplitter::new();
        assert_eq!(splitter.push(b"\n\n\r\r  \na\n"), vec!["a"]);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"caf\xff\n");
        assert_eq!(lines, vec!["caf\u{fffd}"]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let mut splitter = LineSplitter::new();
        let bytes = "naïve\n".as_bytes();
        assert!(splitter.push(&bytes[..3]).is_empty());
        assert_eq!(splitter.push(&bytes[3..]), vec!["naïve"]);
    }
}
