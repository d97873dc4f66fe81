use faqdb_core::config::{EmbeddingConfig, EmbeddingProviderKind};
use faqdb_core::traits::Embedder;
use faqdb_core::Error;
use faqdb_embed::{get_default_embedder, FakeEmbedder};

fn fake_config(dim: usize) -> EmbeddingConfig {
    EmbeddingConfig { provider: EmbeddingProviderKind::Fake, fake_dim: dim, ..EmbeddingConfig::default() }
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = get_default_embedder(&fake_config(384)).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(embedder.dim(), 384);
    assert_eq!(v1.len(), 384, "embedding dim is 384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    assert_eq!(v1, v2, "deterministic for same input");
}

#[test]
fn fake_embedder_separates_different_texts() {
    let embedder = FakeEmbedder::new(64);
    let a = embedder.embed("exam registration deadline").unwrap();
    let b = embedder.embed("library opening hours").unwrap();
    let dot: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
    assert!(dot < 0.99, "distinct texts should not collapse onto one vector (dot={dot})");
}

#[test]
fn fake_embedder_blank_text_is_zero_vector() {
    let v = FakeEmbedder::new(8).embed("   ").unwrap();
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn missing_model_dir_is_embedding_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    let config = EmbeddingConfig {
        provider: EmbeddingProviderKind::Bert,
        model_dir: Some(tmp.path().join("no-model").to_string_lossy().into_owned()),
        ..EmbeddingConfig::default()
    };
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok() {
        return;
    }
    match get_default_embedder(&config) {
        Err(Error::EmbeddingUnavailable(msg)) => assert!(msg.contains("no-model"), "{msg}"),
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("a missing configured model_dir must not fall back to another model"),
    }
}
