//! Integration tests for navigation between bound methods and bundle keys
//!
//! Each test lays out a small Maven project on disk and resolves definitions
//! in both directions.

use std::fs;
use std::path::{Path, PathBuf};

use linkki_lsp::store::path_to_uri;
use linkki_lsp::types::{Location, Position, Range};
use linkki_lsp::{AnalysisContext, DefinitionResolver, DocumentStore, ServerConfig};
use tempfile::TempDir;

const ORDER_PMO: &str = r#"package org.example;

@UISection
public class OrderPmo {

    @UICheckBox(position = 10, caption = "")
    public boolean isActive() {
        return true;
    }

    @UITextField(position = 20)
    public String getNote() {
        return "";
    }
}
"#;

struct Project {
    _dir: TempDir,
    source: PathBuf,
    bundle: PathBuf,
    bundle_de: PathBuf,
    root_bundle: PathBuf,
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project() -> Project {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let source = root.join("src/main/java/org/example/OrderPmo.java");
    let bundle = root.join("src/main/resources/org/example/messages.properties");
    let bundle_de = root.join("src/main/resources/org/example/messages_de.properties");
    let root_bundle = root.join("src/main/resources/messages.properties");

    write(&source, ORDER_PMO);
    write(&bundle, "OrderPmo_active=Active\nOrderPmo_active_label=Is active\nOrderPmo_note=Note\n");
    write(&bundle_de, "OrderPmo_active=Aktiv\n\nactive=Aktiv\n");
    write(&root_bundle, "OrderPmo_active=Root\n");

    Project {
        _dir: dir,
        source,
        bundle,
        bundle_de,
        root_bundle,
    }
}

fn uri(path: &Path) -> String {
    path_to_uri(path).unwrap()
}

fn resolve(store: &DocumentStore, uri: &str, position: Position) -> Vec<Location> {
    let config = ServerConfig::default();
    DefinitionResolver::new(AnalysisContext::new(store, &config)).find_definition(uri, position)
}

#[test]
fn test_accessor_to_keys() {
    let project = project();
    let store = DocumentStore::new();

    let locations = resolve(&store, &uri(&project.source), Position::new(6, 22));
    let found: Vec<(String, u32)> = locations
        .iter()
        .map(|location| (location.uri.clone(), location.range.start.line))
        .collect();

    assert_eq!(
        found,
        vec![
            (uri(&project.bundle), 0),
            (uri(&project.bundle), 1),
            (uri(&project.bundle_de), 0),
            (uri(&project.root_bundle), 0),
        ]
    );
    assert_eq!(locations[0].range, Range::on_line(0, 0, 15));
}

#[test]
fn test_key_to_accessor() {
    let project = project();
    let store = DocumentStore::new();

    let locations = resolve(&store, &uri(&project.bundle), Position::new(0, 3));
    assert_eq!(
        locations,
        vec![
            Location::new(uri(&project.bundle_de), Range::on_line(2, 0, 6)),
            Location::new(uri(&project.source), Range::on_line(6, 19, 8)),
        ]
    );
}

#[test]
fn test_navigation_is_symmetric() {
    let project = project();
    let store = DocumentStore::new();

    let to_keys = resolve(&store, &uri(&project.source), Position::new(6, 22));
    let key = to_keys.iter().find(|location| location.uri == uri(&project.bundle)).unwrap();

    let back = resolve(&store, &key.uri, key.range.start);
    let method = back.iter().find(|location| location.uri == uri(&project.source)).unwrap();
    assert!(method.range.start <= Position::new(6, 22) && Position::new(6, 22) <= method.range.end);
}

#[test]
fn test_sub_key_resolves_to_property() {
    let project = project();
    let store = DocumentStore::new();

    let locations = resolve(&store, &uri(&project.bundle), Position::new(1, 0));
    assert_eq!(locations, vec![Location::new(uri(&project.source), Range::on_line(6, 19, 8))]);

    let locations = resolve(&store, &uri(&project.bundle), Position::new(2, 5));
    assert_eq!(locations, vec![Location::new(uri(&project.source), Range::on_line(11, 18, 7))]);
}

#[test]
fn test_sibling_bundles_are_searched_by_remainder() {
    let project = project();
    let store = DocumentStore::new();

    let locations = resolve(&store, &uri(&project.bundle), Position::new(0, 0));
    assert!(locations.contains(&Location::new(uri(&project.bundle_de), Range::on_line(2, 0, 6))));
    assert!(locations.iter().all(|location| location.uri != uri(&project.bundle)));
}

#[test]
fn test_open_documents_win_over_disk() {
    let project = project();
    let mut store = DocumentStore::new();
    let edited = ORDER_PMO.replace("    @UICheckBox(position = 10, caption = \"\")\n", "\n");
    store.open(uri(&project.source), edited);
    store.open(uri(&project.bundle_de), "# edited\nOrderPmo_active=Aktiv\n");

    // isActive is no longer bound in the open text
    assert!(resolve(&store, &uri(&project.source), Position::new(6, 22)).is_empty());

    let locations = resolve(&store, &uri(&project.bundle), Position::new(0, 3));
    assert!(locations.is_empty());
}

#[test]
fn test_qualified_class_name() {
    let project = project();
    write(
        &project.bundle.with_file_name("qualified.properties"),
        "org.example.OrderPmo_note=Note\n",
    );
    let store = DocumentStore::new();

    let locations = resolve(
        &store,
        &uri(&project.bundle.with_file_name("qualified.properties")),
        Position::new(0, 1),
    );
    assert_eq!(locations.last(), Some(&Location::new(uri(&project.source), Range::on_line(11, 18, 7))));
}

#[test]
fn test_default_package_searches_resource_root_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src/main/java/Foo.java");
    let bundle = dir.path().join("src/main/resources/messages.properties");
    write(
        &source,
        "@UISection\npublic class Foo {\n\n    @UITextField(position = 10)\n    public String getName() {\n        return \"\";\n    }\n}\n",
    );
    write(&bundle, "Foo_name=Name\n");

    let store = DocumentStore::new();
    let locations = resolve(&store, &uri(&source), Position::new(4, 20));
    assert_eq!(locations, vec![Location::new(uri(&bundle), Range::on_line(0, 0, 8))]);
}
