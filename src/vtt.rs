use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static TIMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\d+:)?\d{1,2}:\d{2}[.,]\d{3}\s*-->\s*(?:\d+:)?\d{1,2}:\d{2}[.,]\d{3}").unwrap()
});

/// Convert raw WebVTT markup into a plain transcript, one caption line per output line.
///
/// Drops the header block, NOTE/STYLE/REGION blocks, cue identifiers, timing lines and
/// inline tags. A line identical to the previously kept line is dropped, which folds the
/// rolling duplicates of YouTube auto-captions; repeats further apart are kept.
///
/// Running it on its own output returns the output unchanged.
pub fn clean(vtt: &str) -> String {
    let lines: Vec<String> = vtt.lines().map(normalize_line).collect();

    let mut kept: Vec<&str> = Vec::new();
    let mut in_block = false;
    let mut at_start = true;
    // NOTE/STYLE/REGION only open a block right after a blank line, never inside a cue
    let mut after_blank = false;

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            in_block = false;
            after_blank = true;
            continue;
        }
        if in_block {
            continue;
        }

        let first = std::mem::replace(&mut at_start, false);
        let boundary = std::mem::replace(&mut after_blank, false);
        if first && line.starts_with("WEBVTT") {
            in_block = true;
            continue;
        }
        if boundary && is_block_start(line) {
            in_block = true;
            continue;
        }
        if is_header_line(line) || is_timing_line(line) {
            continue;
        }
        // cue identifier
        if lines.get(i + 1).is_some_and(|next| is_timing_line(next)) {
            continue;
        }
        if kept.last() == Some(&line.as_str()) {
            continue;
        }
        kept.push(line);
    }

    kept.join("\n")
}

/// Remove inline markup such as `<c>`, `</c>`, `<i>` and `<00:01:02.345>` from a line
pub fn strip_tags(line: &str) -> String {
    TAG_RE.replace_all(line, "").into_owned()
}

pub fn is_timing_line(line: &str) -> bool {
    TIMING_RE.is_match(line)
}

fn normalize_line(line: &str) -> String {
    let line = line.replace('\u{feff}', "");
    strip_tags(&line).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_header_line(line: &str) -> bool {
    line.starts_with("WEBVTT") || line.starts_with("Kind:") || line.starts_with("Language:")
}

fn is_block_start(line: &str) -> bool {
    line == "NOTE" || line.starts_with("NOTE ") || line == "STYLE" || line == "REGION"
}
