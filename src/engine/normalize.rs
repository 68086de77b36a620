//! Query text normalization applied before rollup.

use rayon::prelude::*;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use crate::types::{ObservationSet, RollupResult};

/// Lowercases, transliterates to ASCII, replaces non-word characters with
/// spaces, and stems each token with the English Snowball stemmer.
pub struct QueryNormalizer {
    non_word: Regex,
    stemmer: Option<Stemmer>,
}

impl QueryNormalizer {
    /// Create a normalizer with stemming enabled.
    pub fn new() -> RollupResult<Self> {
        Ok(Self {
            non_word: Regex::new(r"\W+")?,
            stemmer: Some(Stemmer::create(Algorithm::English)),
        })
    }

    /// Turn token stemming on or off.
    pub fn with_stemming(mut self, enabled: bool) -> Self {
        self.stemmer = enabled.then(|| Stemmer::create(Algorithm::English));
        self
    }

    /// Whether tokens are stemmed.
    pub fn stems(&self) -> bool {
        self.stemmer.is_some()
    }

    /// Normalize a single query.
    pub fn normalize(&self, query: &str) -> String {
        let lowered = query.to_lowercase();
        let ascii = deunicode::deunicode(&lowered);
        let spaced = self.non_word.replace_all(&ascii, " ");
        let tokens = spaced.split_whitespace();
        match &self.stemmer {
            Some(stemmer) => tokens
                .map(|token| stemmer.stem(token))
                .collect::<Vec<_>>()
                .join(" "),
            None => tokens.collect::<Vec<_>>().join(" "),
        }
    }

    /// Normalize every query in place, in parallel. Categories are untouched.
    pub fn normalize_all(&self, observations: &mut ObservationSet) {
        log::info!(
            "Normalizing {} queries on {} threads (stemming {})",
            observations.len(),
            rayon::current_num_threads(),
            if self.stems() { "on" } else { "off" }
        );
        observations
            .as_mut_slice()
            .par_iter_mut()
            .for_each(|o| o.query = self.normalize(&o.query));
    }
}
