//! Deterministic repairs of systematic OCR misreads.
//!
//! Two fixes are applied to every recognized line before classification:
//! - a closing coordinate bracket read as the digit `1` is restored
//! - lines that OCR merged across a section boundary are split again

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::model::RawLine;

/// `[x,y` followed by a `1` standing in for the closing bracket.
static BRACKET_MISREAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\[\s*-?\d{1,2}\s*,\s*-?\d{1,2})1").expect("bracket pattern is valid")
});

/// Structural break rules, applied in order. Each inserts a newline between
/// its two capture groups.
static BREAK_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Step label followed by the next section's text
        r"(?i)([ÉE]TAPE\s*:\s*\d+\s*/\s*\d+)\s*([^\d\s/])",
        // Coordinates followed by the zone description
        r"(\[\s*-?\d{1,3}\s*,\s*-?\d{1,3}\s*\])\s*([\p{Lu}(])",
        // End of zone description followed by a hint
        r"(\))\s*(\p{Lu})",
        // Hint status label followed by the next hint
        r"(EN\s+COURS|VALID[ÉE]E?)\s*(\S)",
        // Hint text followed by the remaining tries counter
        r"(?i)(\S)\s+(\d+\s+essais?\s+restants?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("break pattern is valid"))
    .collect()
});

/// Single characters OCR produces from icons and borders.
const DEBRIS_CHARS: &[char] = &[
    'Q', 'q', '?', '|', '.', ',', ':', ';', '-', '_', '~', '\'', '"', '`', '^', '*', '•', '°',
    '®', '™', '©', '«', '»',
];

/// Restores `]` where OCR read the closing coordinate bracket as `1`.
///
/// `"[3,-51"` becomes `"[3,-5]"`. A `1` already followed by `]` belongs to
/// the number and is left alone.
pub fn repair_brackets(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for caps in BRACKET_MISREAD.captures_iter(line) {
        let (Some(whole), Some(coords)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if line[whole.end()..].starts_with(']') {
            continue;
        }
        out.push_str(&line[last..whole.start()]);
        out.push_str(coords.as_str());
        out.push(']');
        last = whole.end();
    }

    out.push_str(&line[last..]);
    out
}

/// Splits a line that OCR merged across known section boundaries.
///
/// Fragments that are a single debris character are dropped.
pub fn split_merged(line: &str) -> Vec<String> {
    let mut text = line.to_string();
    for rule in BREAK_RULES.iter() {
        text = rule.replace_all(&text, "$1\n$2").into_owned();
    }

    text.split('\n')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty() && !is_debris(fragment))
        .map(str::to_string)
        .collect()
}

/// Applies both repairs to every line, preserving order.
pub fn correct_lines(lines: &[RawLine]) -> Vec<String> {
    let mut corrected = Vec::with_capacity(lines.len());
    for line in lines {
        let repaired = repair_brackets(&line.text);
        let fragments = split_merged(&repaired);
        if fragments.len() != 1 || fragments[0] != line.text.trim() {
            debug!("Corrected {} line '{}' -> {:?}", line.region, line.text, fragments);
        }
        corrected.extend(fragments);
    }
    corrected
}

fn is_debris(fragment: &str) -> bool {
    let mut chars = fragment.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => DEBRIS_CHARS.contains(&c),
        _ => false,
    }
}
