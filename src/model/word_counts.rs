// Sparse per-cluster word histogram.
//
// Each cluster only stores the tokens it actually contains. Removing the last
// occurrence of a token drops its entry, so memory tracks the observed
// vocabulary of the cluster rather than K x V.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Token -> occurrence count for the documents currently in one cluster.
///
/// Entries are never zero: `remove` deletes a key when its count reaches zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordCounts {
    counts: HashMap<String, usize>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of `token` in this cluster (0 when absent).
    pub fn get(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Add one occurrence of `token`.
    pub fn add(&mut self, token: &str) {
        match self.counts.get_mut(token) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(token.to_string(), 1);
            }
        }
    }

    /// Remove one occurrence of `token`, dropping the entry when it hits zero.
    ///
    /// Returns `false` if the token was not present (nothing changed).
    pub fn remove(&mut self, token: &str) -> bool {
        match self.counts.get_mut(token) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(token);
                true
            }
            None => false,
        }
    }

    /// Sum of all counts. Equals the cluster's word count when consistent.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct tokens held.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(w, &c)| (w.as_str(), c))
    }

    /// The `n` most frequent tokens, count descending, ties broken alphabetically.
    pub fn top_words(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(&String, &usize)> = self.counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(n)
            .map(|(w, &c)| (w.clone(), c))
            .collect()
    }
}

impl FromIterator<(String, usize)> for WordCounts {
    /// Build from raw pairs. Zero counts are skipped to keep the map sparse.
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        let counts = iter.into_iter().filter(|(_, c)| *c > 0).collect();
        Self { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_prunes_zero() {
        let mut wc = WordCounts::new();
        wc.add("rust");
        wc.add("rust");
        wc.add("gibbs");
        assert_eq!(wc.get("rust"), 2);
        assert_eq!(wc.total(), 3);

        assert!(wc.remove("gibbs"));
        assert_eq!(wc.len(), 1, "zero-count entry should be dropped");
        assert_eq!(wc.get("gibbs"), 0);

        assert!(wc.remove("rust"));
        assert!(wc.remove("rust"));
        assert!(wc.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut wc = WordCounts::new();
        wc.add("a");
        assert!(!wc.remove("b"));
        assert_eq!(wc.total(), 1);
    }

    #[test]
    fn test_top_words_ordering() {
        let wc: WordCounts = vec![
            ("b".to_string(), 3),
            ("a".to_string(), 3),
            ("c".to_string(), 5),
            ("d".to_string(), 0),
        ]
        .into_iter()
        .collect();

        assert_eq!(wc.len(), 3);
        let top = wc.top_words(2);
        assert_eq!(top, vec![("c".to_string(), 5), ("a".to_string(), 3)]);
    }
}
