//! Text helpers shared by every evaluator: normalization, boundary-aware
//! phrase matching and E-number extraction.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref E_NUMBER: Regex = Regex::new(r"\be\s*-?\s*([0-9]{3,4}[a-z]?)\b").unwrap();
    static ref E_NUMBER_SPELLED: Regex =
        Regex::new(r"\be\s*-?\s*numbers?\s*([0-9]{3,4}[a-z]?)\b").unwrap();
}

/// Lowercase, trim, unify dashes and apostrophes, collapse whitespace.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text
        .trim()
        .to_lowercase()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{2019}', "'");

    WHITESPACE.replace_all(&lowered, " ").into_owned()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_single_token(phrase: &str) -> bool {
    !phrase.is_empty() && phrase.chars().all(char::is_alphanumeric)
}

/// True when `needle` occurs in `haystack` with no word character on either side.
fn bounded_match(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

/// Phrase match after normalizing both sides.
///
/// A single alphanumeric token must sit on word boundaries so "ham" does not
/// fire on "graham"; multi-word or punctuated phrases match as substrings.
pub fn word_in_text(text: &str, phrase: &str) -> bool {
    let text = normalize(text);
    let phrase = normalize(phrase);

    if text.is_empty() || phrase.is_empty() {
        return false;
    }

    if is_single_token(&phrase) {
        bounded_match(&text, &phrase)
    } else {
        text.contains(&phrase)
    }
}

pub fn any_word_in_text<S: AsRef<str>>(text: &str, phrases: &[S]) -> bool {
    first_word_in_text(text, phrases).is_some()
}

/// First phrase of `phrases` (in list order) found in `text`.
pub fn first_word_in_text<'a, S: AsRef<str>>(text: &str, phrases: &'a [S]) -> Option<&'a str> {
    phrases
        .iter()
        .map(AsRef::as_ref)
        .find(|phrase| word_in_text(text, phrase))
}

/// Extract E-number codes ("E-471", "e 120", "E number 330") as a sorted set.
pub fn extract_e_numbers(text: &str) -> Vec<String> {
    let text = normalize(text);
    let mut codes = BTreeSet::new();

    for regex in [&*E_NUMBER, &*E_NUMBER_SPELLED] {
        for caps in regex.captures_iter(&text) {
            if let Some(code) = caps.get(1) {
                codes.insert(code.as_str().to_string());
            }
        }
    }

    codes.into_iter().collect()
}

pub fn contains_e_number(text: &str, code: &str) -> bool {
    let code = code.trim_start_matches(['e', 'E']).to_lowercase();
    extract_e_numbers(text).iter().any(|found| *found == code)
}

/// Remove duplicates, keeping the first occurrence.
pub fn dedupe<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}
