//! Similarity and ranking shared by every store backend, so that all of them
//! order identical data identically.

use std::cmp::Ordering;

use faqdb_core::types::SearchHit;

/// Cosine similarity in `[-1, 1]`. A zero vector is similar to nothing (0.0).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0f64, 0f64, 0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y; na += x * x; nb += y * y;
    }
    if na == 0.0 || nb == 0.0 { return 0.0; }
    let sim = (dot / (na.sqrt() * nb.sqrt())) as f32;
    if sim.is_finite() { sim.clamp(-1.0, 1.0) } else { 0.0 }
}

/// A scored record together with its insertion sequence number.
pub struct Candidate {
    pub seq: u64,
    pub hit: SearchHit,
}

/// Highest score first; exact ties go to the earlier insertion.
pub fn rank(mut candidates: Vec<Candidate>, k: usize) -> Vec<SearchHit> {
    candidates.sort_by(|a, b| match b.hit.score.total_cmp(&a.hit.score) {
        Ordering::Equal => a.seq.cmp(&b.seq),
        other => other,
    });
    candidates.truncate(k);
    candidates.into_iter().map(|c| c.hit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(seq: u64, id: &str, score: f32) -> Candidate {
        Candidate { seq, hit: SearchHit { id: id.into(), text: String::new(), metadata: Default::default(), score, vector: vec![] } }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let ranked = rank(vec![cand(2, "c", 0.5), cand(0, "a", 0.5), cand(1, "b", 0.9), cand(3, "d", 0.5)], 3);
        let ids: Vec<&str> = ranked.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }
}
