// Non-fatal diagnostics collected into the error log
//
// Every lexical, syntax and semantic problem becomes one `Diagnostic`. None of
// them stop the run; a non-empty log only blocks TAC generation.

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    // Lexical
    Lexical { lexeme: String },
    NonAscii { code: u32 },
    LexemeTooLong,

    // Syntax
    UnexpectedTerminal { expected: String, received: String },
    NoProduction { nonterminal: String, terminal: String },
    TrailingToken { terminal: String },

    // Semantic
    UndeclaredVariable { name: String },
    UndeclaredFunction { name: String },
    TypeMismatch { name: String },
    ReturnTypeMismatch { function: String },
    ParamTypeMismatch { name: String },
    ExtraParam { lexeme: String },

    // Resource
    AstLimit { max: usize },

    // Generation
    TacFailed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::UnexpectedTerminal { .. }
                | DiagnosticKind::NoProduction { .. }
                | DiagnosticKind::TrailingToken { .. }
        )
    }

    pub fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::Lexical { .. }
                | DiagnosticKind::NonAscii { .. }
                | DiagnosticKind::LexemeTooLong
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let line = self.line;
        match &self.kind {
            DiagnosticKind::Lexical { lexeme } => write!(
                f,
                "Error at line {}: Lexical error for lexeme '{}'",
                line, lexeme
            ),
            DiagnosticKind::NonAscii { code } => write!(
                f,
                "Error at line {}: Non-ASCII character encountered ({})",
                line, code
            ),
            DiagnosticKind::LexemeTooLong => write!(
                f,
                "Error at line {}: Token length exceeded buffer size",
                line
            ),
            DiagnosticKind::UnexpectedTerminal { expected, received } => write!(
                f,
                "Error: expected {}, received {}, at line {}",
                expected, received, line
            ),
            DiagnosticKind::NoProduction {
                nonterminal,
                terminal,
            } => write!(
                f,
                "Syntax Error: no production for {} on '{}', at line {}",
                nonterminal, terminal, line
            ),
            DiagnosticKind::TrailingToken { terminal } => write!(
                f,
                "Syntax Error: unexpected '{}' after end of program, at line {}",
                terminal, line
            ),
            DiagnosticKind::UndeclaredVariable { name } => write!(
                f,
                "Error: Uninitialized variable, Line {}: '{}' has been referenced but not declared",
                line, name
            ),
            DiagnosticKind::UndeclaredFunction { name } => write!(
                f,
                "Error: Undeclared function, Line {}: '{}' has been called but not declared",
                line, name
            ),
            DiagnosticKind::TypeMismatch { name } => write!(
                f,
                "Error: Type mismatch, Line: {}, Variable '{}' doesn't match expression type",
                line, name
            ),
            DiagnosticKind::ReturnTypeMismatch { function } => write!(
                f,
                "Error: Type mismatch, Line: {}, Function '{}' return type doesn't match expression type",
                line, function
            ),
            DiagnosticKind::ParamTypeMismatch { name } => write!(
                f,
                "Error: Parameter type mismatch, Line: {}, Variable '{}' doesn't match parameter type",
                line, name
            ),
            DiagnosticKind::ExtraParam { lexeme } => write!(
                f,
                "Error: Extra param '{}' for function call at line {}",
                lexeme, line
            ),
            DiagnosticKind::AstLimit { max } => write!(
                f,
                "Error at line {}: AST node limit exceeded (max: {} nodes)",
                line, max
            ),
            DiagnosticKind::TacFailed { message } => write!(
                f,
                "Error at line {}: TAC generation failed: {}",
                line, message
            ),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Render a log with one diagnostic per line
pub fn render(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for d in diagnostics {
        out.push_str(&d.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_messages() {
        let d = Diagnostic::new(
            DiagnosticKind::UndeclaredFunction {
                name: "foo".to_string(),
            },
            3,
        );
        assert_eq!(
            d.to_string(),
            "Error: Undeclared function, Line 3: 'foo' has been called but not declared"
        );

        let d = Diagnostic::new(
            DiagnosticKind::TypeMismatch {
                name: "x".to_string(),
            },
            7,
        );
        assert_eq!(
            d.to_string(),
            "Error: Type mismatch, Line: 7, Variable 'x' doesn't match expression type"
        );

        let d = Diagnostic::new(
            DiagnosticKind::ExtraParam {
                lexeme: "3".to_string(),
            },
            2,
        );
        assert_eq!(
            d.to_string(),
            "Error: Extra param '3' for function call at line 2"
        );
    }

    #[test]
    fn test_classification() {
        let syntax = Diagnostic::new(
            DiagnosticKind::NoProduction {
                nonterminal: "Stmt".to_string(),
                terminal: ")".to_string(),
            },
            1,
        );
        assert!(syntax.is_syntax());
        assert!(!syntax.is_lexical());

        let lexical = Diagnostic::new(DiagnosticKind::NonAscii { code: 233 }, 1);
        assert!(lexical.is_lexical());
        assert_eq!(
            lexical.to_string(),
            "Error at line 1: Non-ASCII character encountered (233)"
        );
    }

    #[test]
    fn test_render_one_per_line() {
        let log = vec![
            Diagnostic::new(DiagnosticKind::LexemeTooLong, 1),
            Diagnostic::new(
                DiagnosticKind::Lexical {
                    lexeme: "@".to_string(),
                },
                2,
            ),
        ];
        let text = render(&log);
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("Lexical error for lexeme '@'\n"));
    }

    #[test]
    fn test_generation_failure_message() {
        let d = Diagnostic::new(
            DiagnosticKind::TacFailed {
                message: "node 0 was never expanded".to_string(),
            },
            4,
        );
        assert!(!d.is_syntax());
        assert_eq!(
            d.to_string(),
            "Error at line 4: TAC generation failed: node 0 was never expanded"
        );
    }
}
