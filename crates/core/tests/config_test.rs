use releval_core::config::Config;
use std::io::Write;

fn with_env_var<F, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    std::env::set_var(key, value);
    let result = f();
    std::env::remove_var(key);
    result
}

#[test]
fn test_env_overrides_file_values() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(
        br#"
        [evaluation]
        relevance_threshold = 1
        judged_docs_only = false
    "#,
    )
    .expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");

    let config = with_env_var("RELEVAL_EVALUATION__RELEVANCE_THRESHOLD", "3", || {
        with_env_var("RELEVAL_MEASURES__MAP_CUTOFFS", "10,20", || {
            Config::from_file(file.path())
        })
    })
    .expect("Failed to load config");

    assert_eq!(config.evaluation.relevance_threshold, 3);
    assert!(!config.evaluation.judged_docs_only);
    assert_eq!(config.measures.map_cutoffs, vec![10, 20]);
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}
