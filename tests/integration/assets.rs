use ids_render::assets::{AssetBundle, AssetGraph, BundleDeclarations, FileDefinition};
use ids_render::config::ProjectConfig;
use ids_render::constants::MAX_DEPENDENCY_DEPTH;
use ids_render::core::RenderError;
use pretty_assertions::assert_eq;

fn paths(files: &ids_render::assets::FileSet) -> Vec<&str> {
    files.keys().map(String::as_str).collect()
}

#[test]
fn test_dependency_supplies_styles_and_scripts() {
    let config = ProjectConfig::parse(
        r#"
[bundles."core/a"]
depends_on = ["core/b"]
js = { "a.js" = {} }

[bundles."core/b"]
css = { "styles.css" = { attributes = { media = "screen" } } }
js = { "b.js" = {} }
"#,
        ".",
    )
    .unwrap();

    let libraries = AssetGraph::build(config.bundles.clone()).resolve().unwrap();
    let a = libraries.get("core/a").unwrap();
    assert_eq!(paths(&a.css), vec!["styles.css"]);
    assert_eq!(paths(&a.js), vec!["a.js", "b.js"]);
    assert_eq!(a.css["styles.css"].attributes["media"], "screen");
}

#[test]
fn test_bundle_without_dependencies_resolves_to_itself() {
    let bundle = AssetBundle::new()
        .with_css("x.css", FileDefinition::new().with_attribute("media", "print"))
        .with_js("x.js", FileDefinition::new());
    let mut declarations = BundleDeclarations::new();
    declarations.insert("solo".to_string(), bundle.clone());

    let libraries = AssetGraph::build(declarations).resolve().unwrap();
    let solo = libraries.get("solo").unwrap();
    assert_eq!(solo.css, bundle.css);
    assert_eq!(solo.js, bundle.js);
}

#[test]
fn test_own_files_win_over_dependencies() {
    let mut declarations = BundleDeclarations::new();
    declarations.insert(
        "a".to_string(),
        AssetBundle::new()
            .with_dependency("b")
            .with_css("shared.css", FileDefinition::new().with_attribute("from", "a")),
    );
    declarations.insert(
        "b".to_string(),
        AssetBundle::new()
            .with_dependency("c")
            .with_css("shared.css", FileDefinition::new().with_attribute("from", "b"))
            .with_css("b.css", FileDefinition::new()),
    );
    declarations.insert(
        "c".to_string(),
        AssetBundle::new().with_css("c.css", FileDefinition::new()),
    );

    let a = AssetGraph::build(declarations).resolve_bundle("a").unwrap();
    assert_eq!(paths(&a.css), vec!["shared.css", "b.css", "c.css"]);
    assert_eq!(a.css["shared.css"].attributes["from"], "a");
}

/// `b1 -> b2 -> ... -> b{length}`, each with one stylesheet.
fn chain(length: usize) -> BundleDeclarations {
    let mut declarations = BundleDeclarations::new();
    for i in 1..=length {
        let mut bundle = AssetBundle::new().with_css(format!("b{i}.css"), FileDefinition::new());
        if i < length {
            bundle = bundle.with_dependency(format!("b{}", i + 1));
        }
        declarations.insert(format!("b{i}"), bundle);
    }
    declarations
}

#[test]
fn test_dependency_depth_ceiling() {
    let ok = AssetGraph::build(chain(MAX_DEPENDENCY_DEPTH)).resolve_bundle("b1").unwrap();
    assert_eq!(ok.css.len(), MAX_DEPENDENCY_DEPTH);

    let err = AssetGraph::build(chain(MAX_DEPENDENCY_DEPTH + 1)).resolve().unwrap_err();
    match err {
        RenderError::DependencyDepthExceeded {
            bundle,
            deepest,
            limit,
        } => {
            assert_eq!(bundle, "b1");
            assert_eq!(deepest, format!("b{}", MAX_DEPENDENCY_DEPTH + 1));
            assert_eq!(limit, MAX_DEPENDENCY_DEPTH);
        }
        other => panic!("expected DependencyDepthExceeded, got {other:?}"),
    }
}

#[test]
fn test_cycle_is_fatal() {
    let mut declarations = BundleDeclarations::new();
    declarations.insert("x".to_string(), AssetBundle::new().with_dependency("y"));
    declarations.insert("y".to_string(), AssetBundle::new().with_dependency("x"));

    let err = AssetGraph::build(declarations).resolve().unwrap_err();
    assert!(!err.is_recoverable());
    assert!(matches!(err, RenderError::DependencyDepthExceeded { ref bundle, .. } if bundle == "x"));
}

#[test]
fn test_page_collection_skips_undeclared_bundles() {
    let mut declarations = BundleDeclarations::new();
    declarations.insert(
        "core/a".to_string(),
        AssetBundle::new().with_css("/css/a.css", FileDefinition::new()),
    );
    let libraries = AssetGraph::build(declarations).resolve().unwrap();

    let page = libraries.collect(["nowhere", "core/a", "core/a"]);
    assert_eq!(page.css.len(), 1);
    assert_eq!(page.css[0].public_path, "css/1-a.css");
    assert_eq!(page.css[0].source, "/css/a.css");
    assert!(page.js.is_empty());
}
