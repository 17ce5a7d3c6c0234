//! Hint segmentation.
//!
//! OCR line breaks inside the hints band do not line up with hint
//! boundaries: one hint may wrap over two lines, and two short hints may
//! come back as one line. Lines are accumulated word by word and split at
//! the first capitalized word that plausibly starts a new hint.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::model::HintEntry;

/// Proper nouns whose capitalized words never start a new hint.
const PROPER_NOUNS: &[&str] = &[
    "Amakna",
    "Astrub",
    "Bonta",
    "Bouftou",
    "Brâkmar",
    "Bwork",
    "Chafer",
    "Craqueleur",
    "Dragodinde",
    "Frigost",
    "Incarnam",
    "Kanniboul",
    "Kerubim",
    "Koalak",
    "Kwak",
    "Otomaï",
    "Pandala",
    "Piou",
    "Sufokia",
    "Tofu",
    "Wabbit",
    "Zaap",
];

/// Words OCR hallucinates from icons, borders and arrow glyphs.
const ARTIFACT_WORDS: &[&str] = &[
    "Q", "q", "I", "l", "|", "?", "??", "'", "’", "‘", "«", "»", "•", "©", "®", "-", "_", "~", "*",
];

/// Whole lines consisting of one of these characters are dropped.
const NOISE_LINE_CHARS: &[char] = &['Q', 'q', '?', '|', '.', ',', '-', '_', '•', '*', '~'];

/// Decorative characters removed from finished hint text.
const DECORATIVE_CHARS: &[char] = &['•', '·', '*', '~', '_', '|', '«', '»', '"', '“', '”'];

static STATUS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"EN\s+COURS|VALID[ÉE]E?S?").expect("status pattern is valid")
});

static TRADEMARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[™®©]").expect("trademark pattern is valid"));

static DIGIT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)\d+(\s|$)").expect("digit pattern is valid"));

static LEADING_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w(]+").expect("leading symbol pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone)]
struct PendingWord {
    text: String,
    /// Index of the input line the word came from
    line: usize,
}

/// Accumulates hint lines and emits discrete hint entries.
#[derive(Debug, Default)]
pub struct HintSegmenter {
    pending: Vec<PendingWord>,
    entries: Vec<HintEntry>,
    lines_seen: usize,
}

impl HintSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one OCR line from the hints section.
    ///
    /// At most one split is applied per line; the text after the split
    /// stays pending and is re-examined when the next line arrives.
    pub fn push_line(&mut self, line: &str) {
        let cleaned = strip_noise(line);
        if cleaned.is_empty() || is_noise_line(&cleaned) {
            debug!("Dropping hint noise line '{}'", line);
            return;
        }

        let line_index = self.lines_seen;
        self.lines_seen += 1;
        self.pending.extend(
            filter_artifact_words(&cleaned)
                .into_iter()
                .map(|text| PendingWord {
                    text,
                    line: line_index,
                }),
        );

        if let Some(at) = split_point(&self.pending) {
            let rest = self.pending.split_off(at);
            let finished = std::mem::replace(&mut self.pending, rest);
            self.emit(&join_words(&finished));
        }
    }

    /// Emits whatever is pending as the final entry.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let finished = std::mem::take(&mut self.pending);
        self.emit(&join_words(&finished));
    }

    /// Flushes and returns all entries.
    pub fn take_entries(&mut self) -> Vec<HintEntry> {
        self.flush();
        self.lines_seen = 0;
        std::mem::take(&mut self.entries)
    }

    fn emit(&mut self, text: &str) {
        let text = sanitize_hint(text);
        if text.is_empty() {
            return;
        }
        debug!("Hint {}: '{}'", self.entries.len(), text);
        let order = self.entries.len();
        self.entries.push(HintEntry::new(text, order));
    }
}

/// Removes status labels, trademark glyphs, stray numbers and leading
/// symbols from a raw hint line.
pub fn strip_noise(line: &str) -> String {
    let text = STATUS_LABEL.replace_all(line, " ");
    let text = TRADEMARKS.replace_all(&text, " ");
    // Run twice: adjacent digit tokens share the separating space.
    let text = DIGIT_TOKEN.replace_all(&text, " ");
    let text = DIGIT_TOKEN.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(text.trim(), " ");
    LEADING_SYMBOLS.replace(&text, "").trim().to_string()
}

/// Drops artifact words unless they belong to a known proper noun.
pub fn filter_artifact_words(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter(|word| !is_artifact(word) || is_in_proper_noun(word))
        .map(str::to_string)
        .collect()
}

/// Normalizes a finished hint: decorative characters removed, whitespace
/// collapsed, ends trimmed. Applying it twice changes nothing.
pub fn sanitize_hint(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !DECORATIVE_CHARS.contains(c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Index of the first word that starts a new hint, if any.
///
/// A split word is capitalized, not the first word, not part of a known
/// proper noun, and not an OCR artifact. A capitalized word directly after
/// another capitalized word on the same line continues a title-case run
/// ("Bonjour Monde") and does not split.
fn split_point(words: &[PendingWord]) -> Option<usize> {
    (1..words.len()).find(|&i| {
        let word = &words[i];
        let previous = &words[i - 1];

        if !starts_uppercase(&word.text) || is_artifact(&word.text) || is_proper_noun_part(&word.text)
        {
            return false;
        }

        let in_title_run = previous.line == word.line
            && starts_uppercase(&previous.text)
            && !is_proper_noun_part(&previous.text);
        !in_title_run
    })
}

fn join_words(words: &[PendingWord]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn is_artifact(word: &str) -> bool {
    ARTIFACT_WORDS.contains(&word)
}

fn is_noise_line(line: &str) -> bool {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => NOISE_LINE_CHARS.contains(&c),
        _ => false,
    }
}

/// True when the word occurs anywhere inside a known proper noun.
fn is_in_proper_noun(word: &str) -> bool {
    PROPER_NOUNS.iter().any(|noun| noun.contains(word))
}

/// True when the word (ignoring trailing punctuation) is one of the
/// whitespace- or apostrophe-separated components of a known proper noun.
fn is_proper_noun_part(word: &str) -> bool {
    let word = word.trim_end_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    PROPER_NOUNS.iter().any(|noun| {
        noun.split(|c: char| c.is_whitespace() || c == '\'' || c == '’')
            .any(|part| part == word)
    })
}
