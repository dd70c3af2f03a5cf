mod common;

use common::options;
use compass_task::args::{build_script, check_conflicts, classify, ArgsError, ScriptSettings};
use serde_json::json;
use tempfile::TempDir;

fn settings_in(dir: &TempDir) -> ScriptSettings {
    ScriptSettings {
        dir: Some(dir.path().to_path_buf()),
    }
}

fn entries(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

// =============================================================================
// CONFLICTS
// =============================================================================

#[test]
fn raw_and_config_are_mutually_exclusive() {
    let original = options(json!({ "raw": "x = 1\n", "config": "config.rb" }));
    let classified = classify(original.clone()).unwrap();

    let err = check_conflicts(&classified, &original).unwrap_err();
    assert!(matches!(err, ArgsError::RawWithConfig));
    let message = err.to_string();
    assert!(message.contains("`raw`") && message.contains("`config`"));
}

#[test]
fn script_options_cannot_join_external_config() {
    let original = options(json!({
        "config": "config.rb",
        "cssPath": "css",
        "assetCacheBuster": false,
    }));
    let classified = classify(original.clone()).unwrap();

    let err = check_conflicts(&classified, &original).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The option `config` cannot be combined with these options: cssPath, assetCacheBuster."
    );
}

#[test]
fn external_config_alone_is_fine() {
    let original = options(json!({ "config": "config.rb", "outputStyle": "nested" }));
    let classified = classify(original.clone()).unwrap();
    assert!(check_conflicts(&classified, &original).is_ok());
}

#[tokio::test]
async fn conflict_is_reported_before_any_file_is_written() {
    let dir = TempDir::new().unwrap();
    let original = options(json!({ "raw": "x = 1\n", "config": "config.rb" }));
    let classified = classify(original.clone()).unwrap();

    let result = build_script(&classified, &original, &settings_in(&dir)).await;

    assert!(matches!(result, Err(ArgsError::RawWithConfig)));
    assert_eq!(entries(&dir), 0);
}

// =============================================================================
// SCRIPT LIFECYCLE
// =============================================================================

#[tokio::test]
async fn empty_raw_text_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let original = options(json!({ "outputStyle": "nested" }));
    let classified = classify(original.clone()).unwrap();

    let script = build_script(&classified, &original, &settings_in(&dir))
        .await
        .unwrap();

    assert!(script.is_none());
    assert_eq!(entries(&dir), 0);
}

#[tokio::test]
async fn script_holds_exact_raw_text() {
    let dir = TempDir::new().unwrap();
    let original = options(json!({
        "raw": "relative_assets = true\n",
        "imagesPath": "img's",
        "spriteLoadPath": ["a", "b"],
    }));
    let classified = classify(original.clone()).unwrap();

    let script = build_script(&classified, &original, &settings_in(&dir))
        .await
        .unwrap()
        .expect("script should be created");

    let contents = std::fs::read_to_string(script.path()).unwrap();
    assert_eq!(
        contents,
        "relative_assets = true\nimages_path = 'img\\'s'\nsprite_load_path << \"a\"\nsprite_load_path << \"b\"\n"
    );
    assert!(script.path().starts_with(dir.path()));
    assert_eq!(script.path().extension().unwrap(), "rb");
}

#[tokio::test]
async fn dropping_the_guard_deletes_the_script() {
    let dir = TempDir::new().unwrap();
    let original = options(json!({ "cssPath": "css" }));
    let classified = classify(original.clone()).unwrap();

    let script = build_script(&classified, &original, &settings_in(&dir))
        .await
        .unwrap()
        .unwrap();
    let path = script.path().to_path_buf();
    assert!(path.exists());

    drop(script);
    assert!(!path.exists());
}

#[tokio::test]
async fn scripts_get_unique_names() {
    let dir = TempDir::new().unwrap();
    let original = options(json!({ "cssPath": "css" }));
    let classified = classify(original.clone()).unwrap();
    let settings = settings_in(&dir);

    let first = build_script(&classified, &original, &settings).await.unwrap().unwrap();
    let second = build_script(&classified, &original, &settings).await.unwrap().unwrap();

    assert_ne!(first.path(), second.path());
    first.close().unwrap();
    second.close().unwrap();
    assert_eq!(entries(&dir), 0);
}

#[tokio::test]
async fn creation_failure_is_propagated() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    let original = options(json!({ "cssPath": "css" }));
    let classified = classify(original.clone()).unwrap();

    let err = build_script(
        &classified,
        &original,
        &ScriptSettings {
            dir: Some(missing.clone()),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ArgsError::ScriptCreation { dir: Some(ref d), .. } if *d == missing));
    assert!(!err.is_configuration());
}
