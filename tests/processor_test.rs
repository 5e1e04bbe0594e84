use nextkit::error::Error;
use nextkit::manifest::{load_manifest, EntryKind, ManifestEntry};
use nextkit::processor::Processor;
use nextkit::renderer::MiniJinjaRenderer;
use nextkit::store::DirectoryStore;
use nextkit::variables::{resolve, Request};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, path: &str, contents: &[u8]) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, contents).unwrap();
}

fn template(manifest: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "manifest.yml", manifest.as_bytes());
    write(dir.path(), "README.md.j2", b"# {{ project_name }}\n");
    write(dir.path(), "config/app.json.j2", b"{\"name\": \"{{ project_slug }}\"}\n");
    write(dir.path(), "logo.bin", &[0xff, 0x00, 0x7b, 0x7b]);
    write(dir.path(), "e2e/home.spec.ts.j2", b"expect({{ project_name | tojson }})\n");
    dir
}

fn variables(skip_tests: bool) -> nextkit::variables::VariableSet {
    let request = Request {
        target: PathBuf::from("./demo"),
        name: Some("Demo App".to_string()),
        skip_tests,
        ..Default::default()
    };
    resolve(&request, &IndexMap::new(), None).unwrap()
}

const MANIFEST: &str = r#"
name: fixture
files:
  - source: README.md.j2
  - source: config/app.json.j2
    destination: "{{ project_slug }}/app.json"
  - source: logo.bin
  - source: e2e/home.spec.ts.j2
    group: tests
"#;

#[test]
fn test_plan_substitutes_and_copies() {
    let dir = template(MANIFEST);
    let store = DirectoryStore::new(dir.path()).unwrap();
    let (_, entries) = load_manifest(&store).unwrap();
    let vars = variables(false);
    let renderer = MiniJinjaRenderer::new();

    let plan = Processor::new(&store, &renderer, &vars, false).plan(&entries).unwrap();
    let destinations: Vec<_> = plan.files.iter().map(|f| f.destination.clone()).collect();
    assert_eq!(
        destinations,
        vec![
            PathBuf::from("README.md"),
            PathBuf::from("demo-app/app.json"),
            PathBuf::from("logo.bin"),
            PathBuf::from("e2e/home.spec.ts"),
        ]
    );
    assert_eq!(plan.files[0].contents, b"# Demo App\n");
    assert_eq!(plan.files[1].contents, b"{\"name\": \"demo-app\"}\n");
    assert_eq!(plan.files[2].kind, EntryKind::Copy);
    // Binary bytes that look like braces are never rendered.
    assert_eq!(plan.files[2].contents, vec![0xff, 0x00, 0x7b, 0x7b]);
    assert_eq!(plan.files[3].contents, b"expect(\"Demo App\")\n");
}

#[test]
fn test_plan_skips_tests_group() {
    let dir = template(MANIFEST);
    let store = DirectoryStore::new(dir.path()).unwrap();
    let (_, entries) = load_manifest(&store).unwrap();
    let vars = variables(true);
    let renderer = MiniJinjaRenderer::new();

    let plan = Processor::new(&store, &renderer, &vars, true).plan(&entries).unwrap();
    assert_eq!(plan.files.len(), 3);
    assert_eq!(plan.skipped, vec!["e2e/home.spec.ts.j2".to_string()]);
}

#[test]
fn test_unresolved_placeholder_in_content() {
    let dir = template("name: fixture\nfiles:\n  - source: broken.txt.j2\n");
    write(dir.path(), "broken.txt.j2", b"{{ project_name }} by {{ maintainer }}\n");
    let store = DirectoryStore::new(dir.path()).unwrap();
    let (_, entries) = load_manifest(&store).unwrap();
    let vars = variables(false);
    let renderer = MiniJinjaRenderer::new();

    let err = Processor::new(&store, &renderer, &vars, false).plan(&entries).unwrap_err();
    match err {
        Error::UnresolvedToken { template, .. } => assert_eq!(template, "broken.txt.j2"),
        other => panic!("Expected UnresolvedToken, got {other:?}"),
    }
}

#[test]
fn test_unresolved_placeholder_in_path() {
    let dir = template("name: fixture\nfiles:\n  - source: logo.bin\n    destination: \"{{ assets_dir }}/logo.bin\"\n");
    let store = DirectoryStore::new(dir.path()).unwrap();
    let (_, entries) = load_manifest(&store).unwrap();
    let vars = variables(false);
    let renderer = MiniJinjaRenderer::new();

    let result = Processor::new(&store, &renderer, &vars, false).plan(&entries);
    assert!(matches!(result, Err(Error::UnresolvedToken { .. })));
}

#[test]
fn test_duplicate_destinations_rejected() {
    let dir = template(
        "name: fixture\nfiles:\n  - source: README.md.j2\n  - source: logo.bin\n    destination: README.md\n",
    );
    let store = DirectoryStore::new(dir.path()).unwrap();
    let (_, entries) = load_manifest(&store).unwrap();
    let vars = variables(false);
    let renderer = MiniJinjaRenderer::new();

    let result = Processor::new(&store, &renderer, &vars, false).plan(&entries);
    assert!(matches!(result, Err(Error::Manifest(_))));
}

#[test]
fn test_destination_escaping_target_rejected() {
    let entries = vec![ManifestEntry {
        source: "logo.bin".to_string(),
        destination: Some("../{{ project_slug }}.bin".to_string()),
        kind: None,
        group: None,
    }];
    let dir = template("name: fixture\n");
    let store = DirectoryStore::new(dir.path()).unwrap();
    let vars = variables(false);
    let renderer = MiniJinjaRenderer::new();

    let result = Processor::new(&store, &renderer, &vars, false).plan(&entries);
    assert!(matches!(result, Err(Error::Manifest(_))));
}
