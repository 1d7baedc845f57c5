use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

/// Whole-word, case-insensitive matcher over a fixed keyword list.
///
/// Patterns are compiled once per crawl run; matched keywords keep the
/// casing they were supplied with.
pub struct KeywordMatcher {
    patterns: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    pub fn new(keywords: &[String]) -> Self {
        let patterns = keywords
            .iter()
            .filter_map(|keyword| {
                let pattern = format!(r"\b{}\b", regex::escape(keyword));
                match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                    Ok(re) => Some((keyword.clone(), re)),
                    Err(e) => {
                        log::warn!("Skipping keyword {keyword:?}: {e}");
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// Returns the subset of keywords that occur in `page` as whole words.
    pub fn find_in(&self, page: &str) -> HashSet<String> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(page))
            .map(|(keyword, _)| keyword.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
