//! Text statistics used by the automated layer.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// Transcription placeholders emitted by captioning and speech-to-text tools.
    static ref TRANSCRIPT_PLACEHOLDER: Regex = Regex::new(
        r"(?i)[\[(]\s*(?:inaudible|unintelligible|indistinct|music|applause|laughter|laughs|crosstalk|silence|noise|blank_audio|no speech|foreign|cheering|sound)\s*[\])]"
    )
    .unwrap();
    /// HTML entities left behind by scrapers.
    static ref HTML_ENTITY: Regex = Regex::new(r"&(?:[a-zA-Z]{2,8}|#[0-9]{1,6}|#x[0-9a-fA-F]{1,6});").unwrap();
}

pub fn words(content: &str) -> Vec<&str> {
    content.split_whitespace().collect()
}

/// Distinct lower-cased words over total words; 0.0 for no words.
pub fn unique_word_ratio(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    distinct.len() as f64 / words.len() as f64
}

/// Non-blank segments between full stops.
pub fn sentence_count(content: &str) -> usize {
    content
        .split('.')
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

pub fn avg_word_length(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let total: usize = words.iter().map(|w| w.chars().count()).sum();
    total as f64 / words.len() as f64
}

/// Count of transcription placeholders and scrape artifacts.
pub fn artifact_count(content: &str) -> usize {
    TRANSCRIPT_PLACEHOLDER.find_iter(content).count() + HTML_ENTITY.find_iter(content).count()
}

/// Share of characters that are neither alphanumeric nor whitespace.
pub fn punctuation_density(content: &str) -> f64 {
    let mut total = 0usize;
    let mut punct = 0usize;
    for c in content.chars() {
        total += 1;
        if !c.is_alphanumeric() && !c.is_whitespace() {
            punct += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        punct as f64 / total as f64
    }
}
