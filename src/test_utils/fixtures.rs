//! An in-memory component library.
//!
//! | component   | slots                   | bundles     |
//! |-------------|-------------------------|-------------|
//! | `card`      | `title`, `body`         | `core/card` |
//! | `paragraph` | `text`                  | `core/text` |
//! | `list`      | `items`                 |             |
//! | `broken`    | none                    |             |
//!
//! `core/card` and `core/text` both depend on `core/base`; `broken` renders
//! a variable that is never defined, so it always fails at render time.

use crate::assets::{AssetBundle, BundleDeclarations, FileDefinition};
use crate::build::{ComponentDefinition, ComponentDefinitions};
use crate::core::Result;
use crate::render::RenderBox;
use crate::templating::{MemorySource, TemplateCatalog, TemplateRef};

pub const NAMESPACE: &str = "common";

pub const CARD_TEMPLATE: &str = r#"<div class="card"><h2>{{ title }}</h2>{{ body }}</div>"#;
pub const PARAGRAPH_TEMPLATE: &str = "<p>{{ text }}</p>";
pub const LIST_TEMPLATE: &str = "<ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>";
pub const BROKEN_TEMPLATE: &str = "<div>{{ missing.field }}</div>";
pub const PAGE_TEMPLATE: &str = concat!(
    "<html><head><title>{{ scenario }}</title>",
    "{% for c in css %}<link rel=\"stylesheet\" href=\"{{ c.href }}\">{% endfor %}",
    "</head><body>{{ inner }}",
    "{% for j in js %}<script src=\"{{ j.src }}\"></script>{% endfor %}",
    "</body></html>"
);

/// Templates by name, page template included.
pub fn templates() -> Vec<(&'static str, &'static str)> {
    vec![
        ("card", CARD_TEMPLATE),
        ("paragraph", PARAGRAPH_TEMPLATE),
        ("list", LIST_TEMPLATE),
        ("broken", BROKEN_TEMPLATE),
        ("page", PAGE_TEMPLATE),
    ]
}

pub fn definitions() -> ComponentDefinitions {
    [
        ComponentDefinition::new("card")
            .with_slots(["title", "body"])
            .with_bundles(["core/card"]),
        ComponentDefinition::new("paragraph")
            .with_slots(["text"])
            .with_bundles(["core/text"]),
        ComponentDefinition::new("list").with_slots(["items"]),
        ComponentDefinition::new("broken"),
    ]
    .into_iter()
    .collect()
}

pub fn catalog() -> TemplateCatalog {
    let source = templates().into_iter().fold(MemorySource::new(), |source, (name, content)| {
        source.with_template(TemplateRef::new(NAMESPACE, name), content)
    });
    templates().into_iter().fold(TemplateCatalog::new(source), |catalog, (name, _)| {
        catalog.with_template(name, TemplateRef::new(NAMESPACE, name))
    })
}

pub fn bundles() -> BundleDeclarations {
    let mut bundles = BundleDeclarations::new();
    bundles.insert(
        "core/base".to_string(),
        AssetBundle::new()
            .with_css("/css/base.css", FileDefinition::new())
            .with_js("/js/base.js", FileDefinition::new().with_attribute("defer", true)),
    );
    bundles.insert(
        "core/card".to_string(),
        AssetBundle::new()
            .with_dependency("core/base")
            .with_css("/css/card.css", FileDefinition::new().with_attribute("media", "all")),
    );
    bundles.insert(
        "core/text".to_string(),
        AssetBundle::new()
            .with_dependency("core/base")
            .with_css("/css/text.css", FileDefinition::new()),
    );
    bundles
}

/// The whole library as a render box with `page` as the page template.
pub fn render_box() -> Result<RenderBox> {
    Ok(RenderBox::from_declarations(definitions(), catalog(), bundles())?
        .with_page_template("page"))
}
