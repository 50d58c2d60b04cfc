//! # shopcheck-match
//!
//! Resolves a free-text query against labels scraped from a page.
//!
//! Two policies, deliberately different:
//!
//! - [`best_match`] is for search results: an exact (trimmed, case-insensitive)
//!   hit wins outright, otherwise the candidate sharing the most query tokens wins.
//! - [`find_exact`] is for pickers (city, area): only an exact normalized label
//!   counts, so a near miss can never select the wrong location.
//!
//! ```
//! use shopcheck_match::{best_match, MatchKind};
//!
//! let results = ["Vitacare Air Freshener Anti-Tobacco Spray 300ml", "Hand Wash 250 ml"];
//! let m = best_match("Vitacare Air Freshener Anti -Tobacco Spray 300 ml", &results).unwrap();
//! assert_eq!(m.index, 0);
//! assert!(matches!(m.kind, MatchKind::Tokens { .. }));
//! ```

use std::fmt;

/// Query tokens must be longer than this to be scored ("ml", "of", "to" are noise).
pub const NOISE_TOKEN_LEN: usize = 2;

/// A candidate label with its token-overlap score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub text: String,
    pub score: usize,
}

/// How a [`Match`] was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized candidate equals the normalized query.
    Exact,
    /// Highest token overlap: `score` of `tokens` query tokens found.
    Tokens { score: usize, tokens: usize },
}

/// The winning candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Position in the candidate list (what the page clicks).
    pub index: usize,
    /// The candidate as it was given, not normalized.
    pub text: &'a str,
    pub kind: MatchKind,
}

impl fmt::Display for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MatchKind::Exact => write!(f, "[{}] \"{}\" (exact)", self.index, self.text),
            MatchKind::Tokens { score, tokens } => {
                write!(f, "[{}] \"{}\" (score {}/{})", self.index, self.text, score, tokens)
            }
        }
    }
}

/// Lowercase and trim.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whitespace-split tokens of the normalized query, noise tokens removed.
pub fn query_tokens(query: &str) -> Vec<String> {
    normalize(query)
        .split_whitespace()
        .filter(|t| t.chars().count() > NOISE_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Number of `tokens` appearing as substrings of the normalized candidate.
pub fn score(tokens: &[String], candidate: &str) -> usize {
    let candidate = normalize(candidate);
    tokens
        .iter()
        .filter(|t| candidate.contains(t.as_str()))
        .count()
}

/// Token-overlap score for every candidate, in input order.
pub fn score_candidates<S: AsRef<str>>(query: &str, candidates: &[S]) -> Vec<MatchCandidate> {
    let tokens = query_tokens(query);
    candidates
        .iter()
        .map(|c| MatchCandidate {
            text: c.as_ref().to_string(),
            score: score(&tokens, c.as_ref()),
        })
        .collect()
}

/// Pick the best candidate for `query`.
///
/// Exact normalized equality wins first (first such candidate). Otherwise the
/// candidate with the strictly highest token score above zero wins; ties keep the
/// earliest candidate. Returns `None` when nothing overlaps.
pub fn best_match<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Option<Match<'a>> {
    let wanted = normalize(query);
    if let Some(index) = candidates
        .iter()
        .position(|c| normalize(c.as_ref()) == wanted)
    {
        return Some(Match {
            index,
            text: candidates[index].as_ref(),
            kind: MatchKind::Exact,
        });
    }

    let tokens = query_tokens(query);
    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let s = score(&tokens, candidate.as_ref());
        let beats = match best {
            Some((_, top)) => s > top,
            None => s > 0,
        };
        if beats {
            best = Some((index, s));
        }
    }

    best.map(|(index, score)| Match {
        index,
        text: candidates[index].as_ref(),
        kind: MatchKind::Tokens {
            score,
            tokens: tokens.len(),
        },
    })
}

/// Position of the option whose normalized text equals the normalized `label`.
pub fn find_exact<S: AsRef<str>>(label: &str, options: &[S]) -> Option<usize> {
    let wanted = normalize(label);
    options.iter().position(|o| normalize(o.as_ref()) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_match_is_exact() {
        let candidates = ["Vitacare Hand Wash"];
        let m = best_match("Vitacare Hand Wash", &candidates).unwrap();
        assert_eq!(m.text, "Vitacare Hand Wash");
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_exact_ignores_case_and_padding() {
        let candidates = ["Soap", "  vitacare HAND wash  "];
        let m = best_match("Vitacare Hand Wash", &candidates).unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_exact_beats_higher_token_score() {
        // Earlier candidate contains every token but only the later one is exact.
        let candidates = ["air freshener spray refill", "Air Freshener Spray"];
        let m = best_match("air freshener spray", &candidates).unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_token_pass_when_strings_differ() {
        let candidates = ["Foo Bar baz"];
        let m = best_match("foo bar", &candidates).unwrap();
        assert_eq!(m.text, "Foo Bar baz");
        assert_eq!(m.kind, MatchKind::Tokens { score: 2, tokens: 2 });
    }

    #[test]
    fn test_no_overlap_is_none() {
        assert!(best_match("xyz", &["abc", "def"]).is_none());
    }

    #[test]
    fn test_empty_candidates_is_none() {
        let empty: [&str; 0] = [];
        assert!(best_match("ab cd ef", &empty).is_none());
    }

    #[test]
    fn test_short_tokens_are_noise() {
        assert_eq!(query_tokens("ok go to market"), vec!["market".to_string()]);
        let m = best_match("ok go to market", &["go to market plaza"]).unwrap();
        assert_eq!(m.kind, MatchKind::Tokens { score: 1, tokens: 1 });

        // Only noise tokens: nothing can score.
        assert!(best_match("ok go to", &["go to market plaza"]).is_none());
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let candidates = ["Lemon Spray 300ml", "Lemon Spray 500ml", "Lemon Soap"];
        for _ in 0..10 {
            let m = best_match("lemon spray", &candidates).unwrap();
            assert_eq!(m.index, 0);
        }
        let m = best_match("lemon spray large", &candidates).unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.kind, MatchKind::Tokens { score: 2, tokens: 3 });
    }

    #[test]
    fn test_punctuation_variant_resolves_by_tokens() {
        let candidates = [
            "Vitacare Hand Sanitizer 500 ml",
            "Vitacare Air Freshener Anti-Tobacco Spray 300ml",
            "Vitacare Air Freshener 300 ml All Combo pack of 12 Items",
        ];
        let m = best_match("Vitacare Air Freshener Anti -Tobacco Spray 300 ml", &candidates).unwrap();
        assert_eq!(m.index, 1);
        // vitacare air freshener anti -tobacco spray 300; "ml" is noise
        assert_eq!(m.kind, MatchKind::Tokens { score: 7, tokens: 7 });
    }

    #[test]
    fn test_score_candidates_keeps_order() {
        let scored = score_candidates("green tea", &["Green Tea", "Black Tea", "Coffee"]);
        let scores: Vec<usize> = scored.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![2, 1, 0]);
        assert_eq!(scored[1].text, "Black Tea");
    }

    #[test]
    fn test_find_exact_is_exact_only() {
        let options = ["Select area", "Banasree", "Banasree East"];
        assert_eq!(find_exact("banasree", &options), Some(1));
        assert_eq!(find_exact(" Banasree East ", &options), Some(2));
        assert_eq!(find_exact("Banas", &options), None);
    }

    #[test]
    fn test_match_display() {
        let m = best_match("foo bar", &["Foo Bar baz"]).unwrap();
        assert_eq!(m.to_string(), "[0] \"Foo Bar baz\" (score 2/2)");
    }
}
