// Compilation session: owns the driver, the semantic context and the error log
//
// Tokens are fed one at a time. `finish` drives the end-of-input terminal to
// completion and generates TAC only when nothing was recorded in the error log.

use log::{debug, info, warn};

use crate::ast::Ast;
use crate::codegen;
use crate::diagnostics::{self, Diagnostic, DiagnosticKind};
use crate::lexer::{LexError, Lexer, Token};
use crate::limits::CompilerLimits;
use crate::parser::{Parser, Step};
use crate::semantic::{Function, SemanticContext};

/// Written in place of TAC when the error log is not empty
pub const TAC_BLOCKED_NOTICE: &str = "Please resolve all errors in error.txt to generate TAC";

pub struct Session {
    parser: Parser,
    semantic: SemanticContext,
    errors: Vec<Diagnostic>,
    tokens_log: Vec<String>,
    last_line: usize,
    aborted: bool,
}

impl Session {
    pub fn new(limits: &CompilerLimits) -> Self {
        Self {
            parser: Parser::new(limits),
            semantic: SemanticContext::new(),
            errors: Vec::new(),
            tokens_log: Vec::new(),
            last_line: 1,
            aborted: false,
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn semantic(&self) -> &SemanticContext {
        &self.semantic
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Record diagnostics found outside the parser, keeping arrival order
    pub fn report(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.errors.extend(diagnostics);
    }

    /// Feed one token from the scanner
    ///
    /// Once the node limit aborts the parse, further tokens are ignored.
    pub fn feed(&mut self, token: &Token) -> Step {
        if self.aborted {
            return Step::Aborted;
        }

        self.tokens_log.push(token.log_line());
        self.last_line = token.line;

        let step = self
            .parser
            .advance(token, &mut self.semantic, &mut self.errors);
        if step == Step::Aborted {
            warn!("parse aborted at line {}", token.line);
            self.aborted = true;
        }
        step
    }

    /// Close the input and produce every artifact
    pub fn finish(mut self) -> Compilation {
        if !self.aborted {
            let end = Token::end(self.last_line);
            loop {
                let step = self
                    .parser
                    .advance(&end, &mut self.semantic, &mut self.errors);
                if matches!(step, Step::Finished | Step::Discarded | Step::Aborted) {
                    debug!("end of input: {:?}", step);
                    break;
                }
            }
        }
        self.parser.push_trace("EOF");
        self.semantic.finish();

        let (ast, trace) = self.parser.into_parts();
        let tac = lower(&ast, &mut self.errors, self.last_line);

        let (functions, _, scopes) = self.semantic.into_parts();
        Compilation {
            tokens_log: self.tokens_log,
            trace,
            scopes,
            errors: self.errors,
            functions: functions.into_vec(),
            tac,
            ast,
        }
    }
}

/// Everything one run produces
#[derive(Debug)]
pub struct Compilation {
    pub tokens_log: Vec<String>,
    pub trace: Vec<String>,
    pub scopes: Vec<String>,
    pub errors: Vec<Diagnostic>,
    pub functions: Vec<Function>,
    pub tac: Option<String>,
    pub ast: Ast,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn tokens_text(&self) -> String {
        join_lines(&self.tokens_log)
    }

    pub fn trace_text(&self) -> String {
        join_lines(&self.trace)
    }

    pub fn scopes_text(&self) -> String {
        join_lines(&self.scopes)
    }

    pub fn errors_text(&self) -> String {
        diagnostics::render(&self.errors)
    }

    /// TAC, or the notice when errors blocked generation
    pub fn tac_text(&self) -> String {
        match &self.tac {
            Some(text) => text.clone(),
            None => format!("{}\n", TAC_BLOCKED_NOTICE),
        }
    }
}

// A generator failure on a clean log is recorded, so error.txt explains the notice
fn lower(ast: &Ast, errors: &mut Vec<Diagnostic>, line: usize) -> Option<String> {
    if !errors.is_empty() {
        info!("{} error(s), TAC not generated", errors.len());
        return None;
    }

    match codegen::generate(ast) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("{}", e);
            errors.push(Diagnostic::new(
                DiagnosticKind::TacFailed { message: e.message },
                line,
            ));
            None
        }
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Scan, parse, check and generate in one pass over `source`
///
/// Only resource limits fail the run; every other problem lands in the
/// returned error log.
pub fn compile(source: &str, limits: &CompilerLimits) -> Result<Compilation, LexError> {
    let mut lexer = Lexer::new(source, limits)?;
    let mut session = Session::new(limits);

    while let Some(token) = lexer.next_token()? {
        session.report(lexer.take_diagnostics());
        session.feed(&token);
    }
    session.report(lexer.take_diagnostics());

    Ok(session.finish())
}
