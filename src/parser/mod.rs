// Table-driven predictive parse driver
//
// The driver is resumable: each call to `advance` consumes one token and leaves
// the tree position where the next token continues. Semantic work is delegated
// to an `Actions` implementation at every descent, match and ascent.

mod recovery;

use log::{debug, error, trace};

use crate::ast::{Ast, NodeId};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::grammar::{ParseTable, ProductionId, Symbol, Terminal};
use crate::lexer::Token;
use crate::limits::CompilerLimits;
use crate::semantic::ValueType;

/// Hooks invoked by the driver while it walks the tree
pub trait Actions {
    /// Called after moving into `node`; `production` is set only when `node`
    /// is the first child of its parent.
    fn on_descend(
        &mut self,
        ast: &mut Ast,
        node: NodeId,
        production: Option<ProductionId>,
        token: &Token,
        errors: &mut Vec<Diagnostic>,
    );

    /// Called when `node` (a terminal) consumed `token`
    fn on_match(&mut self, ast: &mut Ast, node: NodeId, token: &Token, errors: &mut Vec<Diagnostic>);

    /// Called once per level climbed after a node is finished
    fn on_ascend(&mut self);

    /// Called after recovery repositioned the driver at `position`
    fn on_recover(&mut self, ast: &Ast, position: NodeId);
}

/// Actions that do nothing; parses syntax only
#[derive(Debug, Default)]
pub struct NoActions;

impl Actions for NoActions {
    fn on_descend(
        &mut self,
        _ast: &mut Ast,
        _node: NodeId,
        _production: Option<ProductionId>,
        _token: &Token,
        _errors: &mut Vec<Diagnostic>,
    ) {
    }

    fn on_match(&mut self, _ast: &mut Ast, _node: NodeId, _token: &Token, _errors: &mut Vec<Diagnostic>) {}

    fn on_ascend(&mut self) {}

    fn on_recover(&mut self, _ast: &Ast, _position: NodeId) {}
}

/// Result of feeding one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The token matched a terminal in the tree
    Matched,
    /// A different terminal was expected; it was skipped over
    Skipped,
    /// Recovery found the token further along the tree
    Recovered,
    /// Nothing accepts the token; position unchanged
    Discarded,
    /// The end token completed the program
    Finished,
    /// The tree hit its node limit
    Aborted,
}

pub struct Parser {
    table: ParseTable,
    ast: Ast,
    current: NodeId,
    trace: Vec<String>,
}

impl Parser {
    pub fn new(limits: &CompilerLimits) -> Self {
        let ast = Ast::new(limits.max_ast_nodes);
        let current = ast.root;
        Self {
            table: ParseTable::standard(),
            ast,
            current,
            trace: Vec::new(),
        }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// The finished tree and the derivation trace
    pub fn into_parts(self) -> (Ast, Vec<String>) {
        (self.ast, self.trace)
    }

    /// Node the next token continues from
    pub fn position(&self) -> NodeId {
        self.current
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn push_trace(&mut self, line: impl Into<String>) {
        self.trace.push(line.into());
    }

    /// The whole program has been derived
    pub fn is_complete(&self) -> bool {
        self.current == self.ast.root && self.ast.node(self.ast.root).is_exhausted()
    }

    /// Consume one token
    pub fn advance<A: Actions>(
        &mut self,
        token: &Token,
        actions: &mut A,
        errors: &mut Vec<Diagnostic>,
    ) -> Step {
        let terminal = token.terminal();
        self.trace.push(format!("TERMINAL: {}", terminal.name()));

        loop {
            let node = self.current;

            if self.is_complete() {
                if terminal == Terminal::Epsilon {
                    return Step::Finished;
                }
                errors.push(Diagnostic::new(
                    DiagnosticKind::TrailingToken {
                        terminal: terminal.name().to_string(),
                    },
                    token.line,
                ));
                return Step::Discarded;
            }

            let Some(nonterminal) = self.ast.node(node).nonterminal() else {
                error!("parse position {} is a terminal", node);
                return Step::Discarded;
            };
            let lookup = self.table.lookup(terminal, nonterminal);
            let resumable = {
                let n = self.ast.node(node);
                n.is_materialized() && n.cursor < n.children.len()
            };

            if !resumable && lookup.is_none() {
                errors.push(Diagnostic::new(
                    DiagnosticKind::NoProduction {
                        nonterminal: nonterminal.name().to_string(),
                        terminal: terminal.name().to_string(),
                    },
                    token.line,
                ));
                return self.recover(token, actions, errors);
            }

            if !self.ast.node(node).is_materialized() {
                if let Some(prod) = lookup {
                    if let Err(e) = self.ast.materialize(node, prod) {
                        error!("{}", e);
                        errors.push(Diagnostic::new(
                            DiagnosticKind::AstLimit { max: e.max },
                            token.line,
                        ));
                        return Step::Aborted;
                    }
                    self.trace_production(node);
                }
            }

            let Some(child) = self.ast.current_child(node) else {
                error!("node {} has no child at its cursor", node);
                return Step::Discarded;
            };
            let first_child = self.ast.node(node).cursor == 0;
            let production = if first_child {
                self.ast.production(node)
            } else {
                None
            };

            self.current = child;
            actions.on_descend(&mut self.ast, child, production, token, errors);

            match self.ast.node(child).symbol {
                Symbol::Terminal(Terminal::Epsilon) => {
                    self.ascend(actions);
                }
                Symbol::Terminal(expected) if expected == terminal => {
                    self.trace.push(format!("Match terminal: {}", expected.name()));
                    self.record_match(child, token);
                    actions.on_match(&mut self.ast, child, token, errors);
                    self.ascend(actions);
                    return Step::Matched;
                }
                Symbol::Terminal(expected) => {
                    errors.push(Diagnostic::new(
                        DiagnosticKind::UnexpectedTerminal {
                            expected: expected.name().to_string(),
                            received: terminal.name().to_string(),
                        },
                        token.line,
                    ));
                    self.ascend(actions);
                    return Step::Skipped;
                }
                Symbol::NonTerminal(_) => {}
            }
        }
    }

    // Climb past finished nodes; each level advances the parent's cursor
    fn ascend<A: Actions>(&mut self, actions: &mut A) {
        while let Some(parent) = self.ast.parent(self.current) {
            self.ast.node_mut(parent).cursor += 1;
            self.current = parent;
            actions.on_ascend();
            if !self.ast.node(parent).is_exhausted() {
                break;
            }
        }
    }

    fn record_match(&mut self, node: NodeId, token: &Token) {
        let literal_type = match token.terminal() {
            Terminal::IntegerLit => Some(ValueType::Int),
            Terminal::RealLit => Some(ValueType::Real),
            _ => None,
        };
        let n = self.ast.node_mut(node);
        n.lexeme = Some(token.text.clone());
        n.line = token.line;
        if literal_type.is_some() {
            n.value_type = literal_type;
        }
    }

    fn trace_production(&mut self, node: NodeId) {
        let n = self.ast.node(node);
        let children: Vec<&str> = n
            .children
            .iter()
            .map(|&c| self.ast.node(c).symbol.name())
            .collect();
        let line = format!(
            "Production: {} -> {}",
            n.symbol.name(),
            children.join(" ")
        );
        trace!("{}", line);
        self.trace.push(line);
    }

    fn recover<A: Actions>(
        &mut self,
        token: &Token,
        actions: &mut A,
        errors: &mut Vec<Diagnostic>,
    ) -> Step {
        let terminal = token.terminal();
        let Some((anchor, index)) = recovery::find_anchor(&self.ast, self.current, terminal) else {
            debug!(
                "discarding '{}' at line {}: no anchor in the tree",
                token.text, token.line
            );
            return Step::Discarded;
        };

        self.ast.node_mut(anchor).cursor = index;
        self.trace.push("***ERROR RECOVERY***".to_string());
        self.trace.push(format!(
            "Match terminal: {}, Error recovery",
            terminal.name()
        ));

        if let Some(matched) = self.ast.current_child(anchor) {
            self.record_match(matched, token);
            actions.on_match(&mut self.ast, matched, token, errors);
        }

        // Step past the recovered terminal and any finished ancestors
        let mut position = anchor;
        self.ast.node_mut(position).cursor += 1;
        while self.ast.node(position).is_exhausted() {
            let Some(parent) = self.ast.parent(position) else {
                break;
            };
            position = parent;
            self.ast.node_mut(position).cursor += 1;
        }

        debug!(
            "recovered '{}' at line {} under node {}",
            token.text, token.line, position
        );
        self.current = position;
        actions.on_recover(&self.ast, position);
        Step::Recovered
    }
}
