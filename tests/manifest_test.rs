use nextkit::error::Error;
use nextkit::manifest::{load_manifest, EntryKind};
use nextkit::store::{DirectoryStore, EmbeddedStore};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_discovery_when_files_are_not_listed() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.yml"), "name: discovered\nignore:\n  - \"**/*.log\"\n  - \".DS_Store\"\n").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/index.ts.j2"), "export const name = '{{ project_slug }}';\n").unwrap();
    fs::write(dir.path().join("src/debug.log"), "noise").unwrap();
    fs::write(dir.path().join(".DS_Store"), "noise").unwrap();
    fs::write(dir.path().join("LICENSE"), "MIT").unwrap();

    let store = DirectoryStore::new(dir.path()).unwrap();
    let (manifest, entries) = load_manifest(&store).unwrap();

    assert_eq!(manifest.name, "discovered");
    let sources: Vec<_> = entries.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["LICENSE", "src/index.ts.j2"]);
    assert_eq!(entries[0].kind(), EntryKind::Copy);
    assert_eq!(entries[1].kind(), EntryKind::Substitute);
    assert_eq!(entries[1].destination(), "src/index.ts");
}

#[test]
fn test_missing_source_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.yml"), "name: broken\nfiles:\n  - source: nowhere.txt\n").unwrap();
    let store = DirectoryStore::new(dir.path()).unwrap();

    match load_manifest(&store) {
        Err(Error::Manifest(msg)) => assert!(msg.contains("nowhere.txt")),
        other => panic!("Expected manifest error, got {other:?}"),
    }
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path()).unwrap();
    assert!(matches!(load_manifest(&store), Err(Error::Manifest(_))));
}

#[test]
fn test_source_outside_template_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.yml"), "name: escape\nfiles:\n  - source: ../secret\n").unwrap();
    let store = DirectoryStore::new(dir.path()).unwrap();
    assert!(matches!(load_manifest(&store), Err(Error::Manifest(_))));
}

#[test]
fn test_bundled_manifest_sources_exist() {
    let store = EmbeddedStore::new("nextjs").unwrap();
    let (manifest, entries) = load_manifest(&store).unwrap();
    assert_eq!(manifest.name, "nextjs");
    assert!(entries.iter().any(|e| e.destination() == ".gitignore"));
    assert!(entries.iter().any(|e| e.in_group("tests")));
}
