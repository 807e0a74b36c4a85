use std::iter::Peekable;
use std::str::CharIndices;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::grammar::Terminal;
use crate::limits::CompilerLimits;

// Token classes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Eq,         // ==
    Gt,         // >
    Ge,         // >=
    Identifier, // names, including the type names int and double
    Keyword,
    Lt,       // <
    Le,       // <=
    Ne,       // <> or !=
    Number,   // integer or real literal
    Operator, // single character punctuation
    End,      // synthetic end of input
}

impl TokenClass {
    /// Numeric class id (alphabetical by class name, end of input is 1000)
    pub fn id(self) -> u16 {
        match self {
            TokenClass::Eq => 1,
            TokenClass::Gt => 2,
            TokenClass::Ge => 3,
            TokenClass::Identifier => 4,
            TokenClass::Keyword => 5,
            TokenClass::Lt => 6,
            TokenClass::Le => 7,
            TokenClass::Ne => 8,
            TokenClass::Number => 9,
            TokenClass::Operator => 10,
            TokenClass::End => 1000,
        }
    }

    /// Name written to the lexical log
    pub fn name(self) -> &'static str {
        match self {
            TokenClass::Eq => "EQ",
            TokenClass::Gt => "GT",
            TokenClass::Ge => "GTE",
            TokenClass::Identifier => "ID",
            TokenClass::Keyword => "KEYWORD",
            TokenClass::Lt => "LT",
            TokenClass::Le => "LTE",
            TokenClass::Ne => "NE",
            TokenClass::Number => "NUMBER",
            TokenClass::Operator => "OP",
            TokenClass::End => "EOF",
        }
    }
}

/// Reserved words, sorted; a keyword's lexeme id is its 1-based index
pub const KEYWORDS: [&str; 14] = [
    "and", "def", "do", "else", "fed", "fi", "if", "not", "od", "or", "print", "return", "then",
    "while",
];

const TYPE_INT: u32 = 1;
const TYPE_DOUBLE: u32 = 2;
const PLAIN_IDENT: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub class: TokenClass,
    pub lexeme_id: u32,
    pub text: String,
    pub is_integer: bool,
    pub line: usize, // 1-indexed
}

impl Token {
    /// The end-of-input token fed after the last real token
    pub fn end(line: usize) -> Self {
        Self {
            class: TokenClass::End,
            lexeme_id: 0,
            text: String::new(),
            is_integer: false,
            line,
        }
    }

    /// Map (class, lexeme id) to the grammar terminal
    ///
    /// Anything unmapped collapses to the epsilon terminal.
    pub fn terminal(&self) -> Terminal {
        match self.class {
            TokenClass::Operator => match char::from_u32(self.lexeme_id) {
                Some('=') => Terminal::Assign,
                Some('[') => Terminal::LBracket,
                Some(']') => Terminal::RBracket,
                Some('(') => Terminal::LParen,
                Some(')') => Terminal::RParen,
                Some(';') => Terminal::Semicolon,
                Some(',') => Terminal::Comma,
                Some('+') => Terminal::Plus,
                Some('-') => Terminal::Minus,
                Some('*') => Terminal::Star,
                Some('/') => Terminal::Slash,
                Some('%') => Terminal::Percent,
                _ => Terminal::Epsilon,
            },
            TokenClass::Keyword => match self.lexeme_id {
                1 => Terminal::And,
                2 => Terminal::Def,
                3 => Terminal::Do,
                4 => Terminal::Else,
                5 => Terminal::Fed,
                6 => Terminal::Fi,
                7 => Terminal::If,
                8 => Terminal::Not,
                9 => Terminal::Od,
                10 => Terminal::Or,
                11 => Terminal::Print,
                12 => Terminal::Return,
                13 => Terminal::Then,
                14 => Terminal::While,
                _ => Terminal::Epsilon,
            },
            TokenClass::Identifier => match self.lexeme_id {
                TYPE_INT => Terminal::Int,
                TYPE_DOUBLE => Terminal::Double,
                _ => Terminal::Id,
            },
            TokenClass::Number => {
                if self.is_integer {
                    Terminal::IntegerLit
                } else {
                    Terminal::RealLit
                }
            }
            TokenClass::Lt => Terminal::Lt,
            TokenClass::Gt => Terminal::Gt,
            TokenClass::Eq => Terminal::Eq,
            TokenClass::Le => Terminal::Le,
            TokenClass::Ge => Terminal::Ge,
            TokenClass::Ne => Terminal::Ne,
            TokenClass::End => Terminal::Epsilon,
        }
    }

    /// `<CLASS, lexeme>` line for the lexical log
    pub fn log_line(&self) -> String {
        format!("<{}, {}>", self.class.name(), self.text)
    }

    // Operands turn a following +/- into a binary operator
    fn is_operand(&self) -> bool {
        match self.class {
            TokenClass::Identifier | TokenClass::Number => true,
            TokenClass::Operator => self.text == ")",
            _ => false,
        }
    }
}

/// Fatal scanner failure; only resource limits end a run
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub line: usize,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Lexical error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LexError {}

// Lexer

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    pos: usize,
    line: usize,
    limits: &'a CompilerLimits,
    token_count: usize,
    after_operand: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, limits: &'a CompilerLimits) -> Result<Self, LexError> {
        if source.len() > limits.max_input_size {
            return Err(LexError {
                message: format!(
                    "Input too large: {} bytes (max: {} bytes)",
                    source.len(),
                    limits.max_input_size
                ),
                line: 1,
            });
        }

        Ok(Self {
            source,
            chars: source.char_indices().peekable(),
            pos: 0,
            line: 1,
            limits,
            token_count: 0,
            after_operand: false,
            diagnostics: Vec::new(),
        })
    }

    /// Lexical diagnostics produced since the last call
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // Character navigation methods

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, c)| c)
    }

    fn consume_char(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn consume_while<F>(&mut self, predicate: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }
            self.consume_char();
        }
    }

    fn report(&mut self, kind: DiagnosticKind, line: usize) {
        log::debug!("lexical diagnostic at line {}: {:?}", line, kind);
        self.diagnostics.push(Diagnostic::new(kind, line));
    }

    // Main tokenization method

    /// Next token, or `None` at end of input
    ///
    /// Malformed input is reported through `take_diagnostics` and skipped.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let source = self.source;
        loop {
            self.consume_while(|c| c.is_ascii_whitespace());

            let start = self.pos;
            let line = self.line;
            let Some(c) = self.peek_char() else {
                return Ok(None);
            };

            if !c.is_ascii() {
                self.consume_char();
                self.report(DiagnosticKind::NonAscii { code: c as u32 }, line);
                continue;
            }

            let scanned = match c {
                c if c.is_ascii_alphabetic() => Some(self.lex_word(start)),
                c if c.is_ascii_digit() => Some(self.lex_number()),
                '+' | '-' => {
                    let signed = !self.after_operand
                        && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit());
                    if signed {
                        self.consume_char();
                        Some(self.lex_number())
                    } else {
                        self.consume_char();
                        Some(self.operator(c))
                    }
                }
                '<' => {
                    self.consume_char();
                    Some(match self.peek_char() {
                        Some('=') => self.relational(TokenClass::Le),
                        Some('>') => self.relational(TokenClass::Ne),
                        _ => (TokenClass::Lt, 0, true),
                    })
                }
                '>' => {
                    self.consume_char();
                    Some(match self.peek_char() {
                        Some('=') => self.relational(TokenClass::Ge),
                        _ => (TokenClass::Gt, 0, true),
                    })
                }
                '=' => {
                    self.consume_char();
                    Some(match self.peek_char() {
                        Some('=') => self.relational(TokenClass::Eq),
                        _ => self.operator('='),
                    })
                }
                '!' => {
                    self.consume_char();
                    match self.peek_char() {
                        Some('=') => Some(self.relational(TokenClass::Ne)),
                        _ => None,
                    }
                }
                '(' | ')' | '[' | ']' | ';' | ',' | '*' | '/' | '%' => {
                    self.consume_char();
                    Some(self.operator(c))
                }
                _ => {
                    self.consume_char();
                    None
                }
            };

            let text = &source[start..self.pos];
            let Some((class, lexeme_id, is_integer)) = scanned else {
                let lexeme = text.to_string();
                self.report(DiagnosticKind::Lexical { lexeme }, line);
                continue;
            };

            if text.len() > self.limits.max_lexeme_length {
                self.report(DiagnosticKind::LexemeTooLong, line);
                continue;
            }

            if self.token_count >= self.limits.max_token_count {
                return Err(LexError {
                    message: format!(
                        "Token limit exceeded: {} tokens (max: {})",
                        self.token_count, self.limits.max_token_count
                    ),
                    line,
                });
            }
            self.token_count += 1;

            let token = Token {
                class,
                lexeme_id,
                text: text.to_string(),
                is_integer,
                line,
            };
            self.after_operand = token.is_operand();
            return Ok(Some(token));
        }
    }

    fn operator(&self, c: char) -> (TokenClass, u32, bool) {
        (TokenClass::Operator, c as u32, false)
    }

    fn relational(&mut self, class: TokenClass) -> (TokenClass, u32, bool) {
        self.consume_char();
        (class, 0, false)
    }

    fn lex_word(&mut self, start: usize) -> (TokenClass, u32, bool) {
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let word = &self.source[start..self.pos];

        if let Ok(idx) = KEYWORDS.binary_search(&word) {
            return (TokenClass::Keyword, idx as u32 + 1, false);
        }

        let lexeme_id = match word {
            "int" => TYPE_INT,
            "double" => TYPE_DOUBLE,
            _ => PLAIN_IDENT,
        };
        (TokenClass::Identifier, lexeme_id, false)
    }

    // Digits, optional fraction, optional exponent; a leading sign is already consumed
    fn lex_number(&mut self) -> (TokenClass, u32, bool) {
        let mut is_integer = true;
        self.consume_while(|c| c.is_ascii_digit());

        if self.peek_char() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            is_integer = false;
            self.consume_char();
            self.consume_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let exponent = match self.peek_nth(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent {
                is_integer = false;
                self.consume_char();
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.consume_char();
                }
                self.consume_while(|c| c.is_ascii_digit());
            }
        }

        (TokenClass::Number, 0, is_integer)
    }
}

/// Complete token stream plus the lexical diagnostics found along the way
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Lexed {
    pub fn log(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.log_line());
            out.push('\n');
        }
        out
    }
}

pub fn lex(source: &str, limits: &CompilerLimits) -> Result<Lexed, LexError> {
    let mut lexer = Lexer::new(source, limits)?;
    let mut lexed = Lexed::default();

    while let Some(token) = lexer.next_token()? {
        lexed.tokens.push(token);
    }
    lexed.diagnostics = lexer.take_diagnostics();

    Ok(lexed)
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    // Helper
    fn lex_all(source: &str) -> Lexed {
        lex(source, &CompilerLimits::default()).unwrap()
    }

    fn lex_single(source: &str) -> Token {
        let lexed = lex_all(source);
        assert_eq!(lexed.tokens.len(), 1, "expected one token for {:?}", source);
        lexed.tokens[0].clone()
    }

    fn terminals(source: &str) -> Vec<Terminal> {
        lex_all(source).tokens.iter().map(Token::terminal).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex_single("def").terminal(), Terminal::Def);
        assert_eq!(lex_single("fed").terminal(), Terminal::Fed);
        assert_eq!(lex_single("if").terminal(), Terminal::If);
        assert_eq!(lex_single("then").terminal(), Terminal::Then);
        assert_eq!(lex_single("else").terminal(), Terminal::Else);
        assert_eq!(lex_single("fi").terminal(), Terminal::Fi);
        assert_eq!(lex_single("while").terminal(), Terminal::While);
        assert_eq!(lex_single("do").terminal(), Terminal::Do);
        assert_eq!(lex_single("od").terminal(), Terminal::Od);
        assert_eq!(lex_single("print").terminal(), Terminal::Print);
        assert_eq!(lex_single("return").terminal(), Terminal::Return);
        assert_eq!(lex_single("and").terminal(), Terminal::And);
        assert_eq!(lex_single("or").terminal(), Terminal::Or);
        assert_eq!(lex_single("not").terminal(), Terminal::Not);

        // Keywords are case sensitive
        assert_eq!(lex_single("Def").terminal(), Terminal::Id);
    }

    #[test]
    fn test_keyword_lexeme_ids_are_alphabetical() {
        let token = lex_single("and");
        assert_eq!(token.class, TokenClass::Keyword);
        assert_eq!(token.lexeme_id, 1);
        assert_eq!(lex_single("while").lexeme_id, 14);
    }

    #[test]
    fn test_type_names_are_identifiers() {
        let int = lex_single("int");
        assert_eq!(int.class, TokenClass::Identifier);
        assert_eq!(int.lexeme_id, 1);
        assert_eq!(int.terminal(), Terminal::Int);

        let double = lex_single("double");
        assert_eq!(double.terminal(), Terminal::Double);

        let name = lex_single("total_2");
        assert_eq!(name.lexeme_id, 3);
        assert_eq!(name.terminal(), Terminal::Id);
    }

    #[test]
    fn test_numbers() {
        let int = lex_single("42");
        assert!(int.is_integer);
        assert_eq!(int.terminal(), Terminal::IntegerLit);

        let real = lex_single("3.14");
        assert!(!real.is_integer);
        assert_eq!(real.terminal(), Terminal::RealLit);

        let exp = lex_single("1e-3");
        assert_eq!(exp.text, "1e-3");
        assert_eq!(exp.terminal(), Terminal::RealLit);
    }

    #[test]
    fn test_signed_literal_after_operator() {
        let lexed = lex_all("x = -5");
        assert_eq!(lexed.tokens.len(), 3);
        assert_eq!(lexed.tokens[2].text, "-5");
        assert_eq!(lexed.tokens[2].terminal(), Terminal::IntegerLit);
    }

    #[test]
    fn test_minus_after_operand_is_operator() {
        assert_eq!(
            terminals("x-5"),
            vec![Terminal::Id, Terminal::Minus, Terminal::IntegerLit]
        );
        assert_eq!(
            terminals("(x)+1"),
            vec![
                Terminal::LParen,
                Terminal::Id,
                Terminal::RParen,
                Terminal::Plus,
                Terminal::IntegerLit
            ]
        );
    }

    #[test]
    fn test_relational_operators() {
        assert_eq!(
            terminals("< > == <= >= <> !="),
            vec![
                Terminal::Lt,
                Terminal::Gt,
                Terminal::Eq,
                Terminal::Le,
                Terminal::Ge,
                Terminal::Ne,
                Terminal::Ne
            ]
        );
        assert_eq!(lex_single("=").terminal(), Terminal::Assign);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            terminals("( ) [ ] ; , * / %"),
            vec![
                Terminal::LParen,
                Terminal::RParen,
                Terminal::LBracket,
                Terminal::RBracket,
                Terminal::Semicolon,
                Terminal::Comma,
                Terminal::Star,
                Terminal::Slash,
                Terminal::Percent
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_reported_and_skipped() {
        let lexed = lex_all("x @ y");
        assert_eq!(lexed.tokens.len(), 2);
        assert_eq!(lexed.diagnostics.len(), 1);
        assert_eq!(
            lexed.diagnostics[0].to_string(),
            "Error at line 1: Lexical error for lexeme '@'"
        );
    }

    #[test]
    fn test_non_ascii_is_reported() {
        let lexed = lex_all("x\n= é");
        assert_eq!(lexed.tokens.len(), 2);
        assert_eq!(lexed.diagnostics.len(), 1);
        assert_eq!(lexed.diagnostics[0].line, 2);
        assert_eq!(
            lexed.diagnostics[0].kind,
            DiagnosticKind::NonAscii { code: 233 }
        );
    }

    #[test]
    fn test_lexeme_too_long() {
        let limits = CompilerLimits {
            max_lexeme_length: 4,
            ..CompilerLimits::default()
        };
        let lexed = lex("abc abcdefgh", &limits).unwrap();
        assert_eq!(lexed.tokens.len(), 1);
        assert_eq!(lexed.diagnostics[0].kind, DiagnosticKind::LexemeTooLong);
    }

    #[test]
    fn test_token_limit_is_fatal() {
        let limits = CompilerLimits {
            max_token_count: 2,
            ..CompilerLimits::default()
        };
        let result = lex("a b c", &limits);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_size_limit() {
        let limits = CompilerLimits {
            max_input_size: 4,
            ..CompilerLimits::default()
        };
        assert!(lex("print 12345", &limits).is_err());
    }

    #[test]
    fn test_line_numbers() {
        let lexed = lex_all("int x;\nx = 1;\n\nprint x");
        let lines: Vec<usize> = lexed.tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 2, 2, 2, 2, 4, 4]);
    }

    #[test]
    fn test_log_lines() {
        let lexed = lex_all("def int f");
        assert_eq!(lexed.log(), "<KEYWORD, def>\n<ID, int>\n<ID, f>\n");
    }

    #[test]
    fn test_end_token_maps_to_epsilon() {
        assert_eq!(Token::end(9).terminal(), Terminal::Epsilon);
        assert_eq!(Token::end(9).class.id(), 1000);
    }
}
