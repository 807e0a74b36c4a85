// Compiler resource limits
//
// Guards the front end against pathological input:
// - Memory exhaustion from very large source files
// - Runaway token streams
// - Unbounded AST growth
//
// All limits have defaults and can be overridden via project.toml

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Compiler resource limits with permissive defaults
#[derive(Debug, Clone)]
pub struct CompilerLimits {
    // Lexer limits
    pub max_input_size: usize,    // Maximum source file size in bytes
    pub max_token_count: usize,   // Maximum number of tokens per file
    pub max_lexeme_length: usize, // Longest lexeme before a buffer-size diagnostic

    // AST limits
    pub max_ast_nodes: usize, // Maximum AST nodes per file
}

impl Default for CompilerLimits {
    fn default() -> Self {
        Self {
            max_input_size: 10_000_000, // 10 MB
            max_token_count: 100_000,
            max_lexeme_length: 256,
            max_ast_nodes: 1_000_000,
        }
    }
}

impl CompilerLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load limits from project.toml, falling back to defaults
    ///
    /// Returns error only if TOML is malformed, not if file is missing
    pub fn from_project_toml<P: AsRef<Path>>(path: P) -> Result<Self, LimitError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| LimitError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let config: ProjectConfig = toml::from_str(&content).map_err(|e| LimitError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

        let mut limits = Self::default();
        if let Some(overrides) = config.limits {
            overrides.apply(&mut limits);
        }
        Ok(limits)
    }

    /// Validate that all limits are positive and not absurdly large
    pub fn validate(&self) -> Result<(), LimitError> {
        const MAX_REASONABLE: usize = 100_000_000; // 100 MB

        if self.max_input_size == 0 || self.max_input_size > MAX_REASONABLE {
            return Err(LimitError::invalid("max_input_size", self.max_input_size));
        }

        if self.max_token_count == 0 {
            return Err(LimitError::invalid("max_token_count", self.max_token_count));
        }

        if self.max_lexeme_length == 0 || self.max_lexeme_length > 100_000 {
            return Err(LimitError::invalid(
                "max_lexeme_length",
                self.max_lexeme_length,
            ));
        }

        if self.max_ast_nodes == 0 || self.max_ast_nodes > 10_000_000 {
            return Err(LimitError::invalid("max_ast_nodes", self.max_ast_nodes));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ProjectConfig {
    limits: Option<LimitsConfig>,
}

// `[limits]` table; absent keys keep their defaults
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LimitsConfig {
    max_input_size: Option<usize>,
    max_token_count: Option<usize>,
    max_lexeme_length: Option<usize>,
    max_ast_nodes: Option<usize>,
}

impl LimitsConfig {
    fn apply(self, limits: &mut CompilerLimits) {
        let pairs = [
            (self.max_input_size, &mut limits.max_input_size),
            (self.max_token_count, &mut limits.max_token_count),
            (self.max_lexeme_length, &mut limits.max_lexeme_length),
            (self.max_ast_nodes, &mut limits.max_ast_nodes),
        ];
        for (value, slot) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Error type for limit validation and loading
#[derive(Debug, Clone)]
pub struct LimitError {
    pub message: String,
}

impl LimitError {
    fn invalid(name: &str, value: usize) -> Self {
        Self {
            message: format!(
                "Invalid limit '{}': {} (must be positive and reasonable)",
                name, value
            ),
        }
    }
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Limit error: {}", self.message)
    }
}

impl std::error::Error for LimitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_reasonable() {
        let limits = CompilerLimits::default();
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let limits = CompilerLimits::default();
        assert_eq!(limits.max_input_size, 10_000_000);
        assert_eq!(limits.max_token_count, 100_000);
        assert_eq!(limits.max_lexeme_length, 256);
        assert_eq!(limits.max_ast_nodes, 1_000_000);
    }

    #[test]
    fn test_validation_catches_zero_values() {
        let mut limits = CompilerLimits::default();
        limits.max_token_count = 0;
        assert!(limits.validate().is_err());

        limits = CompilerLimits::default();
        limits.max_lexeme_length = 0;
        assert!(limits.validate().is_err());

        limits = CompilerLimits::default();
        limits.max_ast_nodes = 0;
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_validation_catches_too_large_values() {
        let mut limits = CompilerLimits::default();
        limits.max_input_size = 200_000_000;
        assert!(limits.validate().is_err());

        limits = CompilerLimits::default();
        limits.max_ast_nodes = 20_000_000;
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let limits = CompilerLimits::from_project_toml("nonexistent.toml").unwrap();
        assert_eq!(limits.max_input_size, 10_000_000);
        assert_eq!(limits.max_lexeme_length, 256);
    }

    #[test]
    fn test_partial_override() {
        let toml_content = r#"
[limits]
max_lexeme_length = 32
max_ast_nodes = 5000
"#;
        let temp_path = std::env::temp_dir().join("cpc_test_limits.toml");
        fs::write(&temp_path, toml_content).unwrap();

        let limits = CompilerLimits::from_project_toml(&temp_path).unwrap();
        assert_eq!(limits.max_lexeme_length, 32);
        assert_eq!(limits.max_ast_nodes, 5000);
        assert_eq!(limits.max_token_count, 100_000); // Default

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_malformed_toml_returns_error() {
        let temp_path = std::env::temp_dir().join("cpc_test_malformed.toml");
        fs::write(&temp_path, "this is not valid toml {{{").unwrap();

        let result = CompilerLimits::from_project_toml(&temp_path);
        assert!(result.is_err());

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unknown_limit_is_rejected() {
        let temp_path = std::env::temp_dir().join("cpc_test_unknown_limit.toml");
        fs::write(&temp_path, "[limits]\nmax_expr_depth = 10\n").unwrap();

        let err = CompilerLimits::from_project_toml(&temp_path).unwrap_err();
        assert!(err.message.contains("max_expr_depth"));

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_other_tables_are_ignored() {
        let temp_path = std::env::temp_dir().join("cpc_test_other_tables.toml");
        fs::write(&temp_path, "[package]\nname = \"demo\"\n").unwrap();

        let limits = CompilerLimits::from_project_toml(&temp_path).unwrap();
        assert_eq!(limits.max_ast_nodes, 1_000_000);

        let _ = fs::remove_file(&temp_path);
    }
}
