//! Structural snapshots of flattened build structures.
//!
//! A snapshot is the flattened tree written as YAML with sorted keys and
//! `#`-prefixed directive keys, so it is stable across build order and easy
//! to diff in review.

use std::path::{Path, PathBuf};

use crate::build::BuildNode;
use crate::core::Result;

/// Serialize a flattened tree to snapshot YAML.
pub fn to_yaml(node: &BuildNode) -> Result<String> {
    Ok(serde_yaml::to_string(&node.to_json())?)
}

/// Where the snapshot for `scenario_id` lives under `dir`.
pub fn snapshot_path(dir: &Path, scenario_id: &str) -> PathBuf {
    dir.join(format!("{scenario_id}.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{FieldName, ThemedNode};

    #[test]
    fn test_yaml_keys_sorted() {
        let node = BuildNode::Themed(
            ThemedNode::new("card")
                .with_field(FieldName::directive("title"), "Hello")
                .with_field(FieldName::plain("after"), BuildNode::null()),
        );
        let yaml = to_yaml(&node).unwrap();
        assert_eq!(
            yaml,
            "'#attached':\n  library: []\n'#theme': card\n'#title': Hello\nafter: null\n"
        );
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("out"), "card-basic"),
            PathBuf::from("out/card-basic.yaml")
        );
    }
}
