use copycat::config::{create_default_config, parse_config, ConfigInit};
use copycat::defaults::DEFAULT_CONFIG;
use copycat::errors::CopyCatError;
use tempfile::tempdir;
use tokio::fs;

#[tokio::test]
async fn test_create_default_config_writes_template_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    let first = create_default_config(root).await.unwrap();
    assert_eq!(first, ConfigInit::Created);
    let written = fs::read_to_string(root.join(".copycat")).await.unwrap();
    assert_eq!(written, DEFAULT_CONFIG);

    fs::write(root.join(".copycat"), "[INCLUDE]\ncustom/**\n")
        .await
        .unwrap();
    let second = create_default_config(root).await.unwrap();
    assert_eq!(second, ConfigInit::AlreadyExists);
    let kept = fs::read_to_string(root.join(".copycat")).await.unwrap();
    assert_eq!(kept, "[INCLUDE]\ncustom/**\n", "existing config must not be overwritten");
}

#[tokio::test]
async fn test_default_template_parses_to_example_lists() {
    let dir = tempdir().unwrap();
    create_default_config(dir.path()).await.unwrap();

    let config = parse_config(dir.path()).await.unwrap();
    assert_eq!(
        config.include,
        vec!["src/**", "prisma/schema.prisma", "package.json"]
    );
    assert_eq!(
        config.ignore,
        vec![
            ".env*",
            "**/dist/**",
            "**/build/**",
            "**/out/**",
            "**/*.test.ts",
            "**/*.spec.ts",
            "coverage/**"
        ]
    );
}

#[tokio::test]
async fn test_missing_config_is_reported() {
    let dir = tempdir().unwrap();
    let result = parse_config(dir.path()).await;
    assert!(
        matches!(result, Err(CopyCatError::ConfigMissing(_))),
        "Expected ConfigMissing, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_crlf_config_is_trimmed() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(".copycat"),
        "# header\r\n[INCLUDE]\r\n  src/**  \r\n\r\n[IGNORE]\r\n\t*.tmp\r\n",
    )
    .await
    .unwrap();

    let config = parse_config(dir.path()).await.unwrap();
    assert_eq!(config.include, vec!["src/**"]);
    assert_eq!(config.ignore, vec!["*.tmp"]);
}
