use super::*;

fn temp_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("kala-prefs-{}", uuid::Uuid::new_v4()))
        .join("prefs.json")
}

#[test]
fn defaults_fill_cultural_context() {
    let prefs = Preferences::default();
    assert_eq!(prefs.locale(), "en");
    assert_eq!(
        prefs.cultural_context(),
        CulturalContext::new("north_india", "textiles", "traditional_craftsmanship")
    );
}

#[test]
fn update_persists_and_reloads() {
    let path = temp_path();
    let store = PreferenceStore::load(&path);
    assert_eq!(store.snapshot(), Preferences::default());

    store
        .update(|p| {
            p.locale = Some("hi".into());
            p.artisan_id = Some("artisan-7".into());
        })
        .unwrap();

    let reloaded = PreferenceStore::load(&path);
    assert_eq!(reloaded.snapshot().locale(), "hi");
    assert_eq!(reloaded.snapshot().artisan_id.as_deref(), Some("artisan-7"));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn corrupt_file_yields_defaults() {
    let path = temp_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let store = PreferenceStore::load(&path);
    assert_eq!(store.snapshot(), Preferences::default());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn in_memory_update_never_fails() {
    let store = PreferenceStore::in_memory(Preferences::default());
    let updated = store.update(|p| p.craft = Some("pottery".into())).unwrap();
    assert_eq!(updated.cultural_context().craft_category.as_deref(), Some("pottery"));
}
