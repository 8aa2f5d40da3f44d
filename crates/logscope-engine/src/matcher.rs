/// Check whether `selection` appears in `record_tags` as a subsequence.
///
/// Every selected tag must be found in the record, in the same relative
/// order, though not necessarily contiguously. An empty selection matches
/// every record. This is deliberately not a set test: `[b, a]` does not match
/// a record tagged `[a, b]`.
pub fn matches_tags<T, S>(record_tags: &[T], selection: &[S]) -> bool
where
    T: AsRef<str>,
    S: AsRef<str>,
{
    let mut remaining = record_tags.iter();
    selection
        .iter()
        .all(|wanted| remaining.any(|tag| tag.as_ref() == wanted.as_ref()))
}

/// Case-insensitive, whitespace-stripped substring query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompactQuery {
    /// Text as typed
    raw: String,

    /// Lowercased with all whitespace removed
    needle: String,
}

impl CompactQuery {
    pub fn new(text: &str) -> Self {
        Self {
            raw: text.to_string(),
            needle: compact(text),
        }
    }

    /// Check whether the haystack contains this query
    pub fn matches(&self, haystack: &str) -> bool {
        self.needle.is_empty() || compact(haystack).contains(&self.needle)
    }

    /// An empty query matches everything
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Text as typed
    pub fn text(&self) -> &str {
        &self.raw
    }
}

fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Straightforward recursive definition used to cross-check the matcher
    fn is_subsequence(record: &[String], selection: &[String]) -> bool {
        match (selection.split_first(), record.split_first()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some((want, rest_sel)), Some((have, rest_rec))) => {
                if want == have {
                    is_subsequence(rest_rec, rest_sel)
                } else {
                    is_subsequence(rest_rec, selection)
                }
            }
        }
    }

    /// Every sequence over `alphabet` up to `max_len` items long
    fn sequences(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
        let mut all = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for seq in &frontier {
                for letter in alphabet {
                    let mut extended: Vec<String> = seq.clone();
                    extended.push(letter.to_string());
                    next.push(extended);
                }
            }
            all.extend(next.iter().cloned());
            frontier = next;
        }
        all
    }

    #[test]
    fn test_order_sensitivity() {
        assert!(!matches_tags(&tags(&["a", "b"]), &tags(&["b", "a"])));
        assert!(matches_tags(&tags(&["a", "b"]), &tags(&["a", "b"])));
        assert!(matches_tags(&tags(&["x", "a", "y", "b"]), &tags(&["a", "b"])));
    }

    #[test]
    fn test_empty_cases() {
        let empty: Vec<String> = Vec::new();
        assert!(matches_tags(&tags(&["a"]), &empty));
        assert!(matches_tags(&empty, &empty));
        assert!(!matches_tags(&empty, &tags(&["a"])));
    }

    #[test]
    fn test_repeated_selection_needs_repeated_tags() {
        assert!(!matches_tags(&tags(&["a", "b"]), &tags(&["a", "a"])));
        assert!(matches_tags(&tags(&["a", "b", "a"]), &tags(&["a", "a"])));
    }

    #[test]
    fn test_matches_reference_definition() {
        let all = sequences(&["a", "b", "c"], 3);
        for record in &all {
            for selection in &all {
                assert_eq!(
                    matches_tags(record, selection),
                    is_subsequence(record, selection),
                    "record={record:?} selection={selection:?}"
                );
            }
        }
    }

    #[test]
    fn test_compact_query_ignores_case_and_whitespace() {
        let query = CompactQuery::new("MyStream");
        assert!(query.matches("my stream"));
        assert!(query.matches("prod-MY STREAM-eu"));
        assert!(!query.matches("my-stream"));

        let query = CompactQuery::new("  connection  refused ");
        assert!(query.matches("ERROR: Connection refused by peer"));
        assert_eq!(query.text(), "  connection  refused ");
    }

    #[test]
    fn test_empty_compact_query_matches_all() {
        assert!(CompactQuery::default().matches("anything"));
        let blank = CompactQuery::new("   ");
        assert!(blank.is_empty());
        assert!(blank.matches(""));
    }
}
