//! Splits input text into chunks short enough for the Google speech endpoint.
//!
//! Text that already fits in [`MAX_CHARS`] is sent as one chunk. Longer text is
//! cut at punctuation first, then any piece that is still too long is cut at
//! the last space before the limit.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest chunk, in characters, the endpoint accepts in one call.
pub const MAX_CHARS: usize = 100;

const TONE_MARKS: &[char] = &['?', '!', '？', '！'];
const OTHER_PUNCTUATION: &[char] = &[
    '¡', '(', ')', '[', ']', '¿', '…', '‥', '،', ';', '—', '。', '，', '、', '：', '\n',
];
const ALL_PUNCTUATION: &str = "?!？！.,¡()[]¿…‥،;:—。，、：\n";

static ABBREVIATIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(dr|jr|mr|mrs|ms|msgr|prof|sr|st)\.").expect("abbreviation pattern")
});

pub fn tokenize(text: &str) -> Vec<String> {
    let text = preprocess(text.trim());
    if text.chars().count() <= MAX_CHARS {
        return clean_tokens(vec![text]);
    }

    clean_tokens(split_on_punctuation(&text))
        .iter()
        .flat_map(|token| minimize(token, ' ', MAX_CHARS))
        .filter(|token| !token.is_empty())
        .collect()
}

fn preprocess(text: &str) -> String {
    // hyphenated line breaks join back into one word
    let text = text.replace("-\n", "").replace("Esq.", "Esquire");
    // a period after an abbreviation is not a sentence end
    ABBREVIATIONS.replace_all(&text, "$1").into_owned()
}

fn split_on_punctuation(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if TONE_MARKS.contains(&c) {
            current.push(c);
            tokens.push(std::mem::take(&mut current));
        } else if (c == '.' || c == ',')
            && chars.get(i + 1) == Some(&' ')
            && !follows_initialism(&chars, i)
        {
            tokens.push(std::mem::take(&mut current));
            i += 1;
        } else if c == ':' && !(i > 0 && chars[i - 1].is_ascii_digit()) {
            tokens.push(std::mem::take(&mut current));
        } else if OTHER_PUNCTUATION.contains(&c) {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        i += 1;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

// the second period of `e.g. ` or `i.e. `
fn follows_initialism(chars: &[char], i: usize) -> bool {
    i >= 2 && chars[i - 2] == '.' && chars[i - 1].is_ascii_alphabetic()
}

fn clean_tokens(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| {
            !token
                .chars()
                .all(|c| c.is_whitespace() || ALL_PUNCTUATION.contains(c))
        })
        .collect()
}

/// Cuts `text` into pieces of at most `max_size` characters, preferring to cut
/// right before the last `delim` inside the limit.
pub fn minimize(text: &str, delim: char, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut rest = &chars[..];
    let mut pieces = Vec::new();
    loop {
        if rest.first() == Some(&delim) {
            rest = &rest[1..];
        }
        if rest.len() <= max_size {
            pieces.push(rest.iter().collect());
            return pieces;
        }
        let idx = rest[..max_size]
            .iter()
            .rposition(|&c| c == delim)
            .unwrap_or(max_size);
        pieces.push(rest[..idx].iter().collect());
        rest = &rest[idx..];
    }
}
