//! Context assembly and the user-facing answer text.

use faqdb_core::types::SearchHit;

/// Returned when nothing relevant was retrieved. Never produced for a real answer.
pub const NOT_FOUND_ANSWER: &str = "❌ I cannot find the answer in the ingested documents.";

/// Prefix of every real answer.
pub const ANSWER_LABEL: &str = "📌 **Answer (from ingested documents):**";

pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Ranked hits for one question plus the context assembled from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub hits: Vec<SearchHit>,
    /// `None` when the joined hit texts are blank.
    pub context: Option<String>,
}

impl Retrieval {
    /// Drop hits under `min_score` (if set), then join the remaining texts in
    /// rank order.
    pub fn from_hits(mut hits: Vec<SearchHit>, min_score: Option<f32>) -> Self {
        if let Some(min) = min_score { hits.retain(|h| h.score >= min); }
        let context = hits.iter().map(|h| h.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR);
        let context = if context.trim().is_empty() { None } else { Some(context) };
        Self { hits, context }
    }

    pub fn is_found(&self) -> bool { self.context.is_some() }

    /// Distinct sources of the hits, in rank order.
    pub fn sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in self.hits.iter().filter_map(SearchHit::source) {
            if !out.contains(&s) { out.push(s); }
        }
        out
    }

    pub fn render(&self) -> String {
        match &self.context {
            Some(context) => format!("{}{}{}", ANSWER_LABEL, CONTEXT_SEPARATOR, context),
            None => NOT_FOUND_ANSWER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faqdb_core::types::Meta;

    fn hit(id: &str, text: &str, score: f32, source: &str) -> SearchHit {
        let mut metadata = Meta::new();
        metadata.insert("source".into(), source.into());
        SearchHit { id: id.into(), text: text.into(), metadata, score, vector: vec![] }
    }

    #[test]
    fn joins_in_rank_order_with_blank_line() {
        let r = Retrieval::from_hits(vec![hit("a:0", "first", 0.9, "a"), hit("b:0", "second", 0.4, "b")], None);
        assert_eq!(r.context.as_deref(), Some("first\n\nsecond"));
        assert_eq!(r.render(), format!("{ANSWER_LABEL}\n\nfirst\n\nsecond"));
        assert_eq!(r.sources(), ["a", "b"]);
    }

    #[test]
    fn blank_texts_are_not_found() {
        let r = Retrieval::from_hits(vec![hit("a:0", "   ", 0.9, "a"), hit("a:1", "\n", 0.8, "a")], None);
        assert!(!r.is_found());
        assert_eq!(r.render(), NOT_FOUND_ANSWER);
    }

    #[test]
    fn min_score_filters_before_assembly() {
        let r = Retrieval::from_hits(vec![hit("a:0", "close", 0.8, "a"), hit("a:1", "far", 0.1, "a")], Some(0.5));
        assert_eq!(r.context.as_deref(), Some("close"));
        let r = Retrieval::from_hits(vec![hit("a:1", "far", 0.1, "a")], Some(0.5));
        assert_eq!(r.render(), NOT_FOUND_ANSWER);
    }

    #[test]
    fn sentinel_is_distinguishable_from_answers() {
        assert!(!NOT_FOUND_ANSWER.starts_with(ANSWER_LABEL));
        let r = Retrieval::from_hits(vec![hit("a:0", NOT_FOUND_ANSWER, 1.0, "a")], None);
        assert_ne!(r.render(), NOT_FOUND_ANSWER);
    }
}
