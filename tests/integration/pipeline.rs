use std::sync::Arc;

use ids_render::build::{
    BuildNode, BuildRegistry, ComponentDefinition, ComponentDefinitions, DeclaredComponent,
    Slots,
};
use ids_render::core::RenderError;
use ids_render::render::{BundleAccumulator, RenderBox, flatten, materialize};
use ids_render::snapshot::to_yaml;
use ids_render::templating::TemplateContext;
use ids_render::test_utils::{fixtures, init_test_logging};
use pretty_assertions::assert_eq;
use serde_json::json;

fn declared(yaml: &str) -> DeclaredComponent {
    serde_yaml::from_str(yaml).unwrap()
}

fn card_registry(bundles: &[&str]) -> BuildRegistry {
    let definitions: ComponentDefinitions = [ComponentDefinition::new("card")
        .with_slots(["title", "body"])
        .with_bundles(bundles.iter().copied())]
    .into_iter()
    .collect();
    BuildRegistry::new(Arc::new(definitions))
}

fn hello_slots() -> Slots {
    let mut slots = Slots::new();
    slots.insert("title".to_string(), "Hello".into());
    slots
}

#[test]
fn test_deferred_token_materializes_to_card_template() {
    init_test_logging(None);
    let mut registry = card_registry(&["core/card", "core/base"]);
    let token = registry.register("card", hello_slots()).unwrap();
    let node =
        BuildNode::from_json(json!({ "#type": "deferred", "#token": token.to_string() })).unwrap();

    let catalog = fixtures::catalog();
    let mut bundles = BundleAccumulator::new();
    let markup = materialize(node, &registry, &catalog, &mut bundles, "card").unwrap();

    let mut context = TemplateContext::new();
    context.insert("title", json!("Hello"));
    context.insert("body", json!(null));
    let expected = catalog.render("card", &context, "card").unwrap();

    assert_eq!(markup, expected);
    assert_eq!(markup.as_str(), r#"<div class="card"><h2>Hello</h2></div>"#);
    assert_eq!(bundles.iter().collect::<Vec<_>>(), vec!["core/card", "core/base"]);
}

#[test]
fn test_expansion_wins_over_sibling_fields() {
    let mut registry = card_registry(&[]);
    let token = registry.register("card", hello_slots()).unwrap();
    let json = json!({
        "#type": "deferred",
        "#token": token.to_string(),
        "#title": "Sibling",
        "#extra": "kept",
    });

    let flat = flatten(BuildNode::from_json(json.clone()).unwrap(), &registry).unwrap();
    let flat = flat.to_json();
    assert_eq!(flat["#title"], json!("Hello"));
    assert_eq!(flat["#extra"], json!("kept"));
    assert_eq!(flat["#theme"], json!("card"));

    let mut bundles = BundleAccumulator::new();
    let markup = materialize(
        BuildNode::from_json(json).unwrap(),
        &registry,
        &fixtures::catalog(),
        &mut bundles,
        "card",
    )
    .unwrap();
    assert_eq!(markup.as_str(), r#"<div class="card"><h2>Hello</h2></div>"#);
}

#[test]
fn test_nested_components_render_bottom_up() {
    let render_box = fixtures::render_box().unwrap();
    let card = declared(
        r"
component: card
slots:
  title: Hello
  body:
    component: paragraph
    slots: { text: '<World>' }
",
    );

    let rendered = render_box.render(&card).unwrap();
    assert_eq!(
        rendered.markup.as_str(),
        r#"<div class="card"><h2>Hello</h2><p>&lt;World&gt;</p></div>"#
    );
    assert_eq!(rendered.bundles.iter().collect::<Vec<_>>(), vec!["core/text", "core/card"]);

    let css: Vec<_> = rendered.assets.css.iter().map(|a| a.public_path.as_str()).collect();
    assert_eq!(css, vec!["css/1-text.css", "css/2-base.css", "css/3-card.css"]);
    let js: Vec<_> = rendered.assets.js.iter().map(|a| a.public_path.as_str()).collect();
    assert_eq!(js, vec!["js/1-base.js"]);
    assert_eq!(rendered.assets.js[0].to_value()["attributes"]["defer"], json!(true));
}

#[test]
fn test_list_slots_render_each_item() {
    let render_box = fixtures::render_box().unwrap();
    let list = declared(
        r"
component: list
slots:
  items:
    - component: paragraph
      slots: { text: a }
    - b
",
    );
    let rendered = render_box.render(&list).unwrap();
    assert_eq!(rendered.markup.as_str(), "<ul><li><p>a</p></li><li>b</li></ul>");
    assert_eq!(rendered.bundles.iter().collect::<Vec<_>>(), vec!["core/text"]);
}

#[test]
fn test_template_failure_is_recoverable_and_names_top_level_component() {
    let render_box = fixtures::render_box().unwrap();
    let card = declared("{ component: card, slots: { body: { component: broken } } }");

    let err = render_box.render(&card).unwrap_err();
    assert!(err.is_recoverable());
    match err {
        RenderError::TemplateRender {
            component,
            template,
            message,
        } => {
            assert_eq!(component, "card");
            assert_eq!(template, "broken");
            assert!(message.contains("missing"), "unexpected message: {message}");
        }
        other => panic!("expected TemplateRender, got {other:?}"),
    }

    // The box is still usable for the next item.
    let ok = render_box.render(&declared("{ component: paragraph, slots: { text: x } }"));
    assert_eq!(ok.unwrap().markup.as_str(), "<p>x</p>");
}

#[test]
fn test_missing_definition_is_fatal() {
    let err = fixtures::render_box()
        .unwrap()
        .render(&declared("{ component: ghost }"))
        .unwrap_err();
    assert!(!err.is_recoverable());
    assert!(matches!(err, RenderError::MissingDefinition { ref resource } if resource == "ghost"));
}

#[test]
fn test_undeclared_slot_is_fatal() {
    let err = fixtures::render_box()
        .unwrap()
        .render(&declared("{ component: paragraph, slots: { colour: red } }"))
        .unwrap_err();
    assert!(matches!(err, RenderError::UnsupportedResource { ref resource, .. } if resource == "paragraph"));
}

#[test]
fn test_unknown_template_is_fatal() {
    let mut definitions = fixtures::definitions();
    definitions.insert(ComponentDefinition::new("ghost"));
    let render_box =
        RenderBox::from_declarations(definitions, fixtures::catalog(), fixtures::bundles()).unwrap();

    let err = render_box.render(&declared("{ component: ghost }")).unwrap_err();
    assert!(!err.is_recoverable());
    assert!(matches!(err, RenderError::UnknownTemplate { ref key, .. } if key == "ghost"));
}

#[test]
fn test_token_from_another_registry_is_rejected() {
    let mut minting = card_registry(&[]);
    let token = minting.register("card", hello_slots()).unwrap();
    let other = card_registry(&[]);

    let node = BuildNode::deferred(token);
    let mut bundles = BundleAccumulator::new();
    let err = materialize(node, &other, &fixtures::catalog(), &mut bundles, "card").unwrap_err();
    assert!(matches!(err, RenderError::StaleToken { .. }));
}

#[test]
fn test_tokens_expire_with_their_pass() {
    let mut registry = card_registry(&[]);
    let token = registry.register("card", hello_slots()).unwrap();
    registry.resolve(token).unwrap();

    registry.begin_pass();
    assert!(registry.is_empty());
    assert!(matches!(registry.resolve(token), Err(RenderError::StaleToken { .. })));
}

#[test]
fn test_flatten_is_idempotent_and_keeps_themes() {
    let render_box = fixtures::render_box().unwrap();
    let card = declared(
        "{ component: card, slots: { title: Hi, body: { component: paragraph, slots: { text: x } } } }",
    );

    let flat = render_box.flatten(&card).unwrap();
    assert!(!flat.contains_deferred());
    let again = flatten(flat.clone(), &render_box.registry()).unwrap();
    assert_eq!(again, flat);

    let json = flat.to_json();
    assert_eq!(json["#theme"], json!("card"));
    assert_eq!(json["#body"]["#theme"], json!("paragraph"));
    assert_eq!(json["#body"]["#text"], json!("x"));
    assert_eq!(json["#attached"]["library"], json!(["core/card"]));
}

#[test]
fn test_snapshot_yaml_is_sorted() {
    let render_box = fixtures::render_box().unwrap();
    let flat = render_box
        .flatten(&declared("{ component: paragraph, slots: { text: Alone } }"))
        .unwrap();
    assert_eq!(
        to_yaml(&flat).unwrap(),
        "'#attached':\n  library:\n  - core/text\n'#text': Alone\n'#theme': paragraph\n"
    );
}
