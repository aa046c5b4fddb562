//! Preference persistence across host restarts

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use audiorec::application::ports::{
    DirectoryPicker, FolderOpener, HostBoundary, OpenError, PickerError, PreferenceStore,
};
use audiorec::application::HostService;
use audiorec::domain::preferences::{default_preferences, DESTINATION_KEY};
use audiorec::domain::recording::RecordingBlob;
use audiorec::infrastructure::JsonPreferenceStore;

struct Picks(Option<PathBuf>);

#[async_trait]
impl DirectoryPicker for Picks {
    async fn pick_directory(&self) -> Result<Option<PathBuf>, PickerError> {
        Ok(self.0.clone())
    }
}

struct NoOpener;

#[async_trait]
impl FolderOpener for NoOpener {
    async fn open(&self, _path: &Path) -> Result<(), OpenError> {
        Ok(())
    }
}

fn host(
    prefs: &Path,
    home: &Path,
    picked: Option<PathBuf>,
) -> HostService<JsonPreferenceStore, Picks, NoOpener> {
    let store = JsonPreferenceStore::load(prefs, default_preferences(home));
    HostService::new(store, Picks(picked), NoOpener, home.join("audios"))
}

#[test]
fn set_then_fresh_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user-preferences.json");

    let mut store = JsonPreferenceStore::load(&path, default_preferences(dir.path()));
    store.set("volume", json!(0.8)).unwrap();
    store.set(DESTINATION_KEY, json!("/srv/rec")).unwrap();

    let reloaded = JsonPreferenceStore::load(&path, default_preferences(Path::new("/other")));
    assert_eq!(reloaded.get("volume"), Some(&json!(0.8)));
    assert_eq!(reloaded.get(DESTINATION_KEY), Some(&json!("/srv/rec")));
}

#[test]
fn missing_file_yields_defaults_by_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user-preferences.json");
    let defaults = default_preferences(Path::new("/home/u"));

    let store = JsonPreferenceStore::load(&path, defaults.clone());

    assert_eq!(store.values(), &defaults);
    assert_eq!(store.destination(), Some(PathBuf::from("/home/u/audios")));
    assert!(!path.exists());
}

#[test]
fn invalid_json_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user-preferences.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonPreferenceStore::load(&path, default_preferences(Path::new("/home/u")));

    assert_eq!(store.destination(), Some(PathBuf::from("/home/u/audios")));
}

#[test]
fn repeated_set_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user-preferences.json");
    let mut store = JsonPreferenceStore::load(&path, default_preferences(Path::new("/home/u")));

    store.set(DESTINATION_KEY, json!("/srv/rec")).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();
    store.set(DESTINATION_KEY, json!("/srv/rec")).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
    let on_disk: Value = serde_json::from_str(&second).unwrap();
    assert_eq!(on_disk, json!({ "destination": "/srv/rec" }));
}

#[tokio::test]
async fn first_run_saves_under_home_audios() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("home").join("u");
    let prefs = dir.path().join("data").join("user-preferences.json");

    let host = host(&prefs, &home, None);
    assert_eq!(host.attach().await.unwrap(), home.join("audios"));

    let saved = host
        .save_buffer(RecordingBlob::webm(vec![0x1A, 0x45, 0xDF, 0xA3]))
        .await
        .unwrap();

    assert_eq!(saved.path.parent(), Some(home.join("audios").as_path()));
    assert_eq!(saved.path.extension().and_then(|e| e.to_str()), Some("webm"));
    assert!(saved
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.parse::<u64>().is_ok()));
    assert_eq!(std::fs::read(&saved.path).unwrap().len(), 4);
    assert!(!prefs.exists());
}

#[tokio::test]
async fn chosen_destination_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("home");
    let prefs = dir.path().join("user-preferences.json");
    let chosen = dir.path().join("chosen");

    let first = host(&prefs, &home, Some(chosen.clone()));
    assert_eq!(first.choose_destination().await.unwrap(), Some(chosen.clone()));
    drop(first);

    let restarted = host(&prefs, &home, None);
    assert_eq!(restarted.attach().await.unwrap(), chosen.clone());

    let saved = restarted
        .save_buffer(RecordingBlob::webm(Vec::new()))
        .await
        .unwrap();
    assert_eq!(saved.path.parent(), Some(chosen.as_path()));
}

#[tokio::test]
async fn cancelled_dialog_leaves_destination() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("home");
    let prefs = dir.path().join("user-preferences.json");

    let host = host(&prefs, &home, None);
    assert_eq!(host.choose_destination().await.unwrap(), None);

    assert_eq!(host.destination(), home.join("audios"));
    assert!(!prefs.exists());
}
