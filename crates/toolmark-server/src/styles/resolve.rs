// crates/toolmark-server/src/styles/resolve.rs
// Folder path normalization, scope merging and ancestor-walk resolution

use std::path::Path;
use toolmark_types::{FolderStyleMatch, MergedStyleConfig, StyleConfig, StyleScope};

/// Strip trailing separators; a path made only of slashes becomes `/`
pub fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !folder.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ancestors of a normalized path, deepest first, ending at the root
pub fn ancestors(folder: &str) -> impl Iterator<Item = String> + '_ {
    Path::new(folder)
        .ancestors()
        .skip(1)
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
}

/// Overlay `project` on `global`, recording where each key came from
pub fn merge(global: &StyleConfig, project: &StyleConfig) -> MergedStyleConfig {
    let mut merged = MergedStyleConfig::default();

    for (layer, scope) in [(global, StyleScope::Global), (project, StyleScope::Project)] {
        for (name, tags) in &layer.styles {
            merged.styles.insert(name.clone(), tags.clone());
            merged.sources.styles.insert(name.clone(), scope);
        }
        for (folder, style) in &layer.folders {
            merged.folders.insert(folder.clone(), style.clone());
            merged.sources.folders.insert(folder.clone(), scope);
        }
    }

    merged
}

/// Find the style for `folder`: exact match first, then the nearest ancestor.
///
/// An association whose style no longer exists counts as no match.
pub fn resolve(merged: &MergedStyleConfig, folder: &str) -> Option<FolderStyleMatch> {
    let normalized = normalize_folder(folder);

    let matched_path = std::iter::once(normalized.clone())
        .chain(ancestors(&normalized))
        .find(|candidate| merged.folders.contains_key(candidate))?;

    let style_name = merged.folders.get(&matched_path)?;
    let Some(tags) = merged.styles.get(style_name) else {
        tracing::debug!(folder = %matched_path, style = %style_name, "Folder points at missing style");
        return None;
    };

    Some(FolderStyleMatch {
        style_name: style_name.clone(),
        tags: tags.clone(),
        inherited: matched_path != normalized,
        matched_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(styles: &[(&str, &[&str])], folders: &[(&str, &str)]) -> StyleConfig {
        let mut config = StyleConfig::default();
        for (name, tags) in styles {
            config
                .styles
                .insert(name.to_string(), tags.iter().map(|t| t.to_string()).collect());
        }
        for (folder, style) in folders {
            config.folders.insert(folder.to_string(), style.to_string());
        }
        config
    }

    #[test]
    fn test_normalize_folder() {
        assert_eq!(normalize_folder("/a/b/"), "/a/b");
        assert_eq!(normalize_folder("/a/b///"), "/a/b");
        assert_eq!(normalize_folder("/a/b"), "/a/b");
        assert_eq!(normalize_folder("/"), "/");
        assert_eq!(normalize_folder("rel/dir/"), "rel/dir");
        assert_eq!(normalize_folder(""), "");
    }

    #[test]
    fn test_ancestors_deepest_first() {
        let found: Vec<String> = ancestors("/a/b/c").collect();
        assert_eq!(found, vec!["/a/b", "/a", "/"]);
        let found: Vec<String> = ancestors("a/b").collect();
        assert_eq!(found, vec!["a"]);
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let merged = merge(
            &config(&[("S1", &["one"]), ("S2", &["two"])], &[("/a", "S1"), ("/a/b", "S2")]),
            &StyleConfig::default(),
        );

        let hit = resolve(&merged, "/a/b/c").unwrap();
        assert_eq!(hit.style_name, "S2");
        assert_eq!(hit.matched_path, "/a/b");
        assert!(hit.inherited);

        let hit = resolve(&merged, "/a/x").unwrap();
        assert_eq!(hit.style_name, "S1");
        assert_eq!(hit.matched_path, "/a");
    }

    #[test]
    fn test_exact_match_with_trailing_slash() {
        let merged = merge(
            &config(&[("S1", &["one"])], &[("/a/b", "S1")]),
            &StyleConfig::default(),
        );
        let hit = resolve(&merged, "/a/b/").unwrap();
        assert_eq!(hit.matched_path, "/a/b");
        assert!(!hit.inherited);
        assert_eq!(hit.tags, vec!["one"]);
    }

    #[test]
    fn test_root_association_applies_everywhere() {
        let merged = merge(&config(&[("S", &["t"])], &[("/", "S")]), &StyleConfig::default());
        assert_eq!(resolve(&merged, "/deep/nested/dir").unwrap().matched_path, "/");
    }

    #[test]
    fn test_no_association() {
        let merged = merge(&config(&[("S", &["t"])], &[("/a", "S")]), &StyleConfig::default());
        assert!(resolve(&merged, "/b/c").is_none());
    }

    #[test]
    fn test_dangling_association_is_no_match() {
        let merged = merge(&config(&[], &[("/a", "ghost")]), &StyleConfig::default());
        assert!(resolve(&merged, "/a/b").is_none());
    }

    #[test]
    fn test_merge_project_wins() {
        let global = config(&[("x", &["tag1"]), ("g", &["only"])], &[("/p", "x")]);
        let project = config(&[("x", &["tag2"])], &[("/p", "g")]);
        let merged = merge(&global, &project);

        assert_eq!(merged.styles["x"], vec!["tag2"]);
        assert_eq!(merged.sources.styles["x"], StyleScope::Project);
        assert_eq!(merged.sources.styles["g"], StyleScope::Global);
        assert_eq!(merged.folders["/p"], "g");
        assert_eq!(merged.sources.folders["/p"], StyleScope::Project);
    }

    #[test]
    fn test_project_folder_can_use_global_style() {
        let global = config(&[("minimal", &["flat", "outline"])], &[]);
        let project = config(&[], &[("/repo/icons", "minimal")]);
        let hit = resolve(&merge(&global, &project), "/repo/icons/ui").unwrap();
        assert_eq!(hit.tags, vec!["flat", "outline"]);
    }
}
