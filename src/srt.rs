use std::{
    fs,
    path::Path,
    sync::LazyLock,
    time::Duration,
};

use regex::Regex;

use crate::error::{AlignError, Result};

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+:\d{2}:\d{2}[,.]\d{1,3})\s*-->\s*(\d+:\d{2}:\d{2}[,.]\d{1,3})")
        .expect("timing regex is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleItem {
    pub index: u32,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

/// Reads an SRT file and returns only the text of each item, in file order.
pub fn read_payloads(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let items = read_file(path)?;
    Ok(items.into_iter().map(|item| item.text).collect())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<SubtitleItem>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse(&content).map_err(|(line, message)| AlignError::SubtitleFormat {
        path: path.to_path_buf(),
        line,
        message,
    })
}

/// Parses SRT text. Errors carry the 1-based line number.
pub fn parse(content: &str) -> std::result::Result<Vec<SubtitleItem>, (usize, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .enumerate()
        .map(|(n, l)| (n + 1, l))
        .peekable();

    let mut items = Vec::new();
    loop {
        // Skip blank lines between blocks
        while lines.next_if(|(_, l)| l.trim().is_empty()).is_some() {}

        let Some((line_no, index_line)) = lines.next() else {
            break;
        };
        let index = index_line
            .trim()
            .parse::<u32>()
            .map_err(|_| (line_no, format!("expected subtitle index, got '{index_line}'")))?;

        let (line_no, timing_line) = lines
            .next()
            .ok_or_else(|| (line_no, "missing timing line".to_owned()))?;
        let caps = TIMING_LINE
            .captures(timing_line)
            .ok_or_else(|| (line_no, format!("malformed timing line '{timing_line}'")))?;
        let start = parse_time(&caps[1]).ok_or_else(|| (line_no, "bad start time".to_owned()))?;
        let end = parse_time(&caps[2]).ok_or_else(|| (line_no, "bad end time".to_owned()))?;

        let mut text_lines = Vec::new();
        while let Some((_, line)) = lines.next_if(|(_, l)| !l.trim().is_empty()) {
            text_lines.push(line);
        }

        items.push(SubtitleItem {
            index,
            start,
            end,
            text: text_lines.join("\n"),
        });
    }

    Ok(items)
}

fn parse_time(s: &str) -> Option<Duration> {
    // Expected format: "HH:MM:SS,mmm"
    let parts: Vec<&str> = s.split([':', ',', '.']).collect();
    if parts.len() != 4 {
        return None;
    }

    let hours = parts[0].parse::<u64>().ok()?;
    let minutes = parts[1].parse::<u64>().ok()?;
    let seconds = parts[2].parse::<u64>().ok()?;
    let millis = format!("{:0<3}", parts[3]).parse::<u32>().ok()?;

    let secs = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    Some(Duration::new(secs, millis * 1_000_000))
}
