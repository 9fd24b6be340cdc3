use std::fmt;

use crate::TypeHash;

/// Namespace-qualified name of a published callable.
///
/// Script-bound callables carry one to address a function inside a script
/// session, and registries use one as the first half of their lookup key.
///
/// # Examples
///
/// ```
/// use callkit_core::QualifiedName;
///
/// let spawn = QualifiedName::global("spawn");
/// assert_eq!(spawn.to_string(), "spawn");
///
/// let tick = QualifiedName::new("tick", vec!["Game".into(), "Ai".into()]);
/// assert_eq!(tick.to_string(), "Game::Ai::tick");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Simple name (e.g., "spawn", "tick")
    pub name: String,
    /// Namespace path (e.g., ["Game", "Ai"]), empty for the global namespace
    pub namespace: Vec<String>,
}

impl QualifiedName {
    /// Create a new qualified name with namespace.
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// Create a qualified name in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
        }
    }

    /// Create from a qualified string (e.g., "Game::spawn").
    ///
    /// Splits on "::"; the last segment is the name. A leading "::" is
    /// ignored, so "::Game::spawn" == "Game::spawn".
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split("::")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match parts.pop() {
            Some(name) => Self {
                name,
                namespace: parts,
            },
            None => Self::global(""),
        }
    }

    /// Check if this is in the global namespace.
    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Get the namespace path.
    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    /// Get the namespace as a joined string.
    pub fn namespace_string(&self) -> String {
        self.namespace.join("::")
    }

    /// Function id for this name with the given parameter types.
    pub fn function_hash(&self, param_hashes: &[TypeHash]) -> TypeHash {
        TypeHash::from_function(&self.to_string(), param_hashes)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.namespace.join("::"), self.name)
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::from_qualified_string(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_name() {
        let name = QualifiedName::global("spawn");
        assert_eq!(name.simple_name(), "spawn");
        assert!(name.is_global());
        assert_eq!(name.to_string(), "spawn");
    }

    #[test]
    fn namespaced_name() {
        let name = QualifiedName::new("tick", vec!["Game".into(), "Ai".into()]);
        assert_eq!(name.namespace_path(), ["Game", "Ai"]);
        assert_eq!(name.namespace_string(), "Game::Ai");
        assert!(!name.is_global());
        assert_eq!(name.to_string(), "Game::Ai::tick");
    }

    #[test]
    fn from_qualified_string() {
        let name = QualifiedName::from_qualified_string("Game::Ai::tick");
        assert_eq!(name.name, "tick");
        assert_eq!(name.namespace, vec!["Game", "Ai"]);

        let absolute = QualifiedName::from_qualified_string("::Game::tick");
        assert_eq!(absolute, QualifiedName::from("Game::tick"));

        let empty = QualifiedName::from_qualified_string("::");
        assert_eq!(empty.name, "");
        assert!(empty.is_global());
    }

    #[test]
    fn function_hash_depends_on_namespace() {
        let int_hash = TypeHash::from_name("int");
        let a = QualifiedName::from("Game::tick").function_hash(&[int_hash]);
        let b = QualifiedName::from("tick").function_hash(&[int_hash]);
        assert_ne!(a, b);
    }
}
