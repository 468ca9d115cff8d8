use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use prompt_enhancer_cli::cli::runtime::{load_config, read_config};
use prompt_enhancer_cli::Config;

#[tokio::test]
async fn yaml_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "service:\n  base_url: http://127.0.0.1:8787/api\n  timeout_secs: 5\npage:\n  selectors:\n    - 'textarea[name=\"chat\"]'\n  debounce_ms: 75\n"
    )
    .unwrap();

    let loaded = load_config(Some(&file.path().to_path_buf()))
        .await
        .expect("config loads");
    assert_eq!(loaded.path, file.path());

    let endpoint = loaded.config.endpoint().expect("endpoint");
    assert_eq!(
        endpoint.enhance_url(),
        "http://127.0.0.1:8787/api/enhance-prompt"
    );
    assert_eq!(endpoint.request_timeout, Duration::from_secs(5));

    let settings = loaded.config.page_settings().expect("page settings");
    assert_eq!(
        settings.chain.selectors().to_vec(),
        vec![r#"textarea[name="chat"]"#.to_string()]
    );
    assert_eq!(settings.timing.debounce, Duration::from_millis(75));
    assert_eq!(settings.timing.blur_grace, Duration::from_millis(100));
}

#[tokio::test]
async fn missing_or_empty_file_means_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing: PathBuf = dir.path().join("nope.yaml");
    assert_eq!(read_config(&missing).await.unwrap(), Config::default());

    let empty = dir.path().join("empty.yaml");
    std::fs::write(&empty, "").unwrap();
    assert_eq!(read_config(&empty).await.unwrap(), Config::default());
}

#[tokio::test]
async fn malformed_yaml_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "service: [not, a, map]\n").unwrap();

    let err = read_config(&path).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
