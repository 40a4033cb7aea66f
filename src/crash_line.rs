//! Summarize a crash report by the frame that crashed.

const CRASHED_THREAD_MARKER: &str = "Crashed thread:";
const OWN_MODULES: [&str; 2] = ["sumatrapdf.exe!", "libmupdf.dll!"];

/// Return the first frame of the crashed thread that belongs to our own
/// modules, starting at the `module!symbol` token (addresses dropped).
///
/// Falls back to the first frame of the section when no own-module frame is
/// found, and to an empty string when the report has no crashed-thread section.
pub fn extract_crashing_line(report: &[u8]) -> String {
    let report = String::from_utf8_lossy(report);
    let mut lines = report.lines();

    if !lines
        .by_ref()
        .any(|line| line.trim_start().starts_with(CRASHED_THREAD_MARKER))
    {
        return String::new();
    }

    let frames: Vec<&str> = lines
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| !line.is_empty())
        .collect();

    frames
        .iter()
        .find(|frame| is_own_frame(frame))
        .or_else(|| frames.first())
        .map(|frame| strip_address(frame).to_string())
        .unwrap_or_default()
}

fn is_own_frame(frame: &str) -> bool {
    let lower = frame.to_ascii_lowercase();
    OWN_MODULES.iter().any(|module| lower.contains(module))
}

fn strip_address(frame: &str) -> &str {
    frame
        .split_whitespace()
        .find(|token| token.contains('!'))
        .and_then(|token| frame.find(token))
        .map_or(frame, |start| &frame[start..])
}
