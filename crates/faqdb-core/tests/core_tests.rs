use std::fs;
use std::io::Write;
use tempfile::TempDir;

use faqdb_core::config::{Config, EmbeddingProviderKind, StoreBackend};
use faqdb_core::source::{list_txt_files, read_source};
use faqdb_core::Error;

#[test]
fn read_source_returns_full_text() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("exam_rules.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    write!(f, "Registration closes on Friday.\n\nBring your student card.").unwrap();

    let text = read_source(&file_path).expect("read");
    assert_eq!(text, "Registration closes on Friday.\n\nBring your student card.");
}

#[test]
fn read_source_decodes_invalid_utf8_lossily() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("latin1.txt");
    fs::write(&file_path, [b'c', b'a', b'f', 0xE9]).unwrap();

    let text = read_source(&file_path).expect("lossy read");
    assert!(text.starts_with("caf"));
}

#[test]
fn missing_source_is_unavailable() {
    let tmp = TempDir::new().unwrap();
    let err = read_source(&tmp.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }), "got {err:?}");
}

#[test]
fn list_txt_files_is_recursive_and_sorted() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("exams")).unwrap();
    fs::write(dir.join("b.txt"), "bravo").unwrap();
    fs::write(dir.join("exams/a.txt"), "alpha").unwrap();
    fs::write(dir.join("notes.md"), "ignored").unwrap();

    let files = list_txt_files(dir).expect("list");
    assert_eq!(files, vec![dir.join("b.txt"), dir.join("exams/a.txt")]);
}

#[test]
fn list_txt_files_on_missing_dir_fails() {
    let tmp = TempDir::new().unwrap();
    assert!(matches!(list_txt_files(&tmp.path().join("missing")), Err(Error::SourceUnavailable { .. })));
}

#[test]
fn settings_default_without_any_file() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        let settings = Config::load().and_then(|c| c.settings()).map_err(|e| e.to_string())?;
        assert_eq!(settings.chunking.chunk_size, 400);
        assert_eq!(settings.chunking.overlap, 50);
        assert_eq!(settings.retrieval.top_k, 2);
        assert_eq!(settings.retrieval.min_score, None);
        assert_eq!(settings.store.backend, StoreBackend::Lance);
        assert_eq!(settings.embedding.provider, EmbeddingProviderKind::Bert);
        Ok(())
    });
}

#[test]
fn env_file_and_env_vars_layer_over_base_file() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file("config.toml", r#"
            [chunking]
            chunk_size = 200
            overlap = 20

            [store]
            backend = "memory"
            table = "rules"
        "#)?;
        jail.create_file("config.test.toml", r#"
            [embedding]
            provider = "fake"
            fake_dim = 16
        "#)?;
        jail.set_env("APP_RETRIEVAL__TOP_K", "5");

        let config = Config::load().map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.chunking.chunk_size, 200);
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.store.table, "rules");
        assert_eq!(settings.embedding.provider, EmbeddingProviderKind::Fake);
        assert_eq!(settings.embedding.fake_dim, 16);
        assert_eq!(settings.retrieval.top_k, 5);

        let table: String = config.get("store.table").map_err(|e| e.to_string())?;
        assert_eq!(table, "rules");
        Ok(())
    });
}

#[test]
fn invalid_chunking_is_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file("config.toml", "[chunking]\nchunk_size = 50\noverlap = 50\n")?;
        let err = Config::load().and_then(|c| c.settings()).unwrap_err();
        assert!(err.to_string().contains("overlap"), "{err}");
        Ok(())
    });
}

#[test]
fn zero_top_k_is_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.set_env("APP_RETRIEVAL__TOP_K", "0");
        assert!(Config::load().and_then(|c| c.settings()).is_err());
        Ok(())
    });
}
