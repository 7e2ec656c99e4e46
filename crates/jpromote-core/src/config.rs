//! Migration configuration: which packages move where, plus project-level
//! file selection. Rules are loaded from a YAML file whose keys mirror the
//! upstream recipe options (`oldPackageName`, `newPackageName`, `recursive`).

use crate::errors::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single package relocation rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationRule {
    #[serde(rename = "oldPackageName")]
    pub old_package: String,

    /// Destination package. Empty means the package declaration is removed
    /// and types become package-private top-level names.
    #[serde(rename = "newPackageName", default)]
    pub new_package: String,

    /// When set, subpackages of `old_package` are relocated too, keeping
    /// their suffix under `new_package`.
    #[serde(default = "default_true")]
    pub recursive: bool,
}

fn default_true() -> bool {
    true
}

/// Dotted-prefix test on package segment boundaries, so `a.b` is not a
/// prefix of `a.bc`.
fn package_starts_with(package: &str, prefix: &str) -> bool {
    package == prefix
        || (package.starts_with(prefix) && package.as_bytes().get(prefix.len()) == Some(&b'.'))
}

impl MigrationRule {
    pub fn new(old_package: &str, new_package: &str, recursive: bool) -> Self {
        Self {
            old_package: old_package.to_string(),
            new_package: new_package.to_string(),
            recursive,
        }
    }

    /// Destination package for a targeted `package`. A recursive rule
    /// preserves the suffix beyond `old_package`; the suffix is never
    /// stacked twice when the destination already carries it.
    pub fn new_package_name(&self, package: &str) -> String {
        let suffix = package.strip_prefix(&self.old_package).unwrap_or_default();
        if self.recursive && !self.new_package.ends_with(suffix) {
            format!("{}{}", self.new_package, suffix)
        } else {
            self.new_package.clone()
        }
    }

    /// True when `package` is a recursive target: `old_package` itself or
    /// a subpackage of it that is not already sitting under `new_package`.
    pub fn is_target_recursive_package(&self, package: &str) -> bool {
        if !self.recursive || self.new_package.is_empty() {
            return false;
        }
        if !package_starts_with(package, &self.old_package) {
            return false;
        }
        // A package can only sit under the destination before migration
        // when the destination nests inside the source; skip those so a
        // second run does not stack the destination prefix again.
        !(package_starts_with(&self.new_package, &self.old_package)
            && package_starts_with(package, &self.new_package))
    }

    /// True when `package` is rewritten by this rule at all.
    pub fn targets_package(&self, package: &str) -> bool {
        package == self.old_package || self.is_target_recursive_package(package)
    }

    /// True when the fully-qualified `fqn` names a type this rule moves:
    /// either directly inside `old_package`, or inside a recursively
    /// targeted subpackage.
    pub fn targets_class(&self, fqn: &str) -> bool {
        if let Some(name) = fqn.strip_prefix(&self.old_package) {
            if let Some(simple) = name.strip_prefix('.') {
                if !simple.is_empty() && !simple.contains('.') {
                    return true;
                }
            }
        }
        match fqn.rsplit_once('.') {
            Some((package, _)) => self.is_target_recursive_package(package),
            None => false,
        }
    }
}

/// Project-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub recipes: Vec<MigrationRule>,

    /// Glob patterns selecting source files, relative to the project root.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec!["**/*.java".to_string()]
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            recipes: Vec::new(),
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

impl MigrationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| MigrateError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write a starter configuration to `path`.
    pub fn init_file(path: &Path) -> Result<()> {
        let config = Self {
            recipes: vec![MigrationRule::new(
                "com.example.experimental",
                "com.example",
                true,
            )],
            include: default_include(),
            exclude: vec!["**/generated/**".to_string()],
        };
        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| MigrateError::Config(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_package_name_preserves_suffix() {
        let rule = MigrationRule::new("dev.morphia.query.experimental", "dev.morphia.query", true);
        assert_eq!(
            rule.new_package_name("dev.morphia.query.experimental.filters"),
            "dev.morphia.query.filters"
        );
        assert_eq!(
            rule.new_package_name("dev.morphia.query.experimental"),
            "dev.morphia.query"
        );
    }

    #[test]
    fn test_new_package_name_no_suffix_stacking() {
        // The destination already ends with the suffix: use it as-is.
        let rule = MigrationRule::new("a.b", "a.b.c", true);
        assert_eq!(rule.new_package_name("a.b.c"), "a.b.c");
    }

    #[test]
    fn test_recursive_guard_on_nested_destination() {
        let rule = MigrationRule::new("a.b", "a.b.c", true);
        assert!(rule.is_target_recursive_package("a.b.d"));
        // Already under the destination: a second run must not re-target.
        assert!(!rule.is_target_recursive_package("a.b.c.d"));
        assert!(!rule.is_target_recursive_package("a.b.c"));
    }

    #[test]
    fn test_recursive_targets_old_package_subtree() {
        let rule = MigrationRule::new("a.b.experimental", "a.b", true);
        assert!(rule.is_target_recursive_package("a.b.experimental"));
        assert!(rule.is_target_recursive_package("a.b.experimental.sub"));
        assert!(!rule.is_target_recursive_package("a.b.sub"));
        // Segment boundary, not a plain string prefix.
        assert!(!rule.is_target_recursive_package("a.b.experimentalish"));
    }

    #[test]
    fn test_targets_class_direct_and_recursive() {
        let rule = MigrationRule::new("a.experimental", "a", true);
        assert!(rule.targets_class("a.experimental.Foo"));
        assert!(rule.targets_class("a.experimental.deep.Foo"));
        assert!(!rule.targets_class("a.Foo"));
        assert!(!rule.targets_class("a.experimental"));
    }

    #[test]
    fn test_targets_class_non_recursive() {
        let rule = MigrationRule::new("a.experimental", "a", false);
        assert!(rule.targets_class("a.experimental.Foo"));
        assert!(!rule.targets_class("a.experimental.deep.Foo"));
    }

    #[test]
    fn test_recursive_disabled_for_empty_destination() {
        // Every package starts with the empty string; recursion would
        // otherwise target the whole codebase.
        let rule = MigrationRule::new("a.experimental", "", true);
        assert!(!rule.is_target_recursive_package("a.experimental.deep"));
        assert!(rule.targets_package("a.experimental"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = "recipes:\n  - oldPackageName: a.experimental\n    newPackageName: a\n";
        let config: MigrationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.recipes.len(), 1);
        assert!(config.recipes[0].recursive);
        assert_eq!(config.include, vec!["**/*.java".to_string()]);
    }
}
