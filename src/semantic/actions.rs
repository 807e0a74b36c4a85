// Semantic actions fired by the parse driver
//
// Production actions run when the driver descends into the first child of a
// production. Terminal actions run when a terminal is matched, including
// terminals matched during recovery.

use log::{debug, trace, warn};

use super::calls::ArgumentSlot;
use super::window::Unify;
use super::{
    CallStack, Function, FunctionTable, ScopeKind, ScopeStack, TypeWindow, ValueType, Variable,
};
use crate::ast::{Ast, NodeId};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::grammar::{ProductionId, Terminal};
use crate::lexer::Token;
use crate::parser::Actions;

/// Where the dispatcher is inside a function header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionPhase {
    Outside,
    ReturnType,
    Name,
    Params,
    Body,
}

// Identifier seen as a factor; a variable or a call depending on what follows
#[derive(Debug, Clone)]
struct DeferredIdent {
    name: String,
    node: NodeId,
    line: usize,
}

#[derive(Debug)]
pub struct SemanticContext {
    scopes: ScopeStack,
    functions: FunctionTable,
    calls: CallStack,
    window: TypeWindow,
    deferred: Option<DeferredIdent>,
    // Call line of an extra argument whose first token has not been seen yet
    extra_argument: Option<usize>,
    phase: FunctionPhase,
    current_function: Option<usize>,
    decl_type: Option<ValueType>,
    scope_log: Vec<String>,
}

impl SemanticContext {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            functions: FunctionTable::new(),
            calls: CallStack::new(),
            window: TypeWindow::new(),
            deferred: None,
            extra_argument: None,
            phase: FunctionPhase::Outside,
            current_function: None,
            decl_type: None,
            scope_log: Vec::new(),
        }
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn calls(&self) -> &CallStack {
        &self.calls
    }

    pub fn window(&self) -> &TypeWindow {
        &self.window
    }

    pub fn scope_log(&self) -> &[String] {
        &self.scope_log
    }

    /// Append the global scope block to the scope log
    pub fn finish(&mut self) {
        self.scope_log.push("## Global Scope ##".to_string());
        let line = self.scopes.global().variables_line();
        self.scope_log.push(line);
    }

    pub fn into_parts(self) -> (FunctionTable, ScopeStack, Vec<String>) {
        (self.functions, self.scopes, self.scope_log)
    }

    fn current_function_mut(&mut self) -> Option<&mut Function> {
        let idx = self.current_function?;
        self.functions.get_mut(idx)
    }

    // ========== Production actions ==========

    fn begin_function(&mut self, line: usize) {
        let scope = self.scopes.enter_scope(ScopeKind::Function, line);
        let idx = self.functions.push(Function::new(line, scope));
        self.current_function = Some(idx);
        self.phase = FunctionPhase::ReturnType;

        self.scope_log.push("## Scope ##".to_string());
        self.scope_log
            .push(format!("Line: {}, Start Lexeme: def", line));
        debug!("entered function scope {} at line {}", scope, line);
    }

    fn declare_variable(&mut self, token: &Token) {
        let Some(value_type) = self.decl_type else {
            warn!("declaration of '{}' without a type", token.text);
            return;
        };
        trace!("declare {} {}", value_type, token.text);
        self.scopes.declare(Variable {
            name: token.text.clone(),
            line: token.line,
            value_type,
        });
    }

    fn check_assignment_target(&mut self, token: &Token, errors: &mut Vec<Diagnostic>) {
        match self.scopes.lookup(&token.text).map(|v| v.value_type) {
            Some(value_type) => {
                self.window.unify(value_type);
            }
            None => errors.push(Diagnostic::new(
                DiagnosticKind::UndeclaredVariable {
                    name: token.text.clone(),
                },
                token.line,
            )),
        }
    }

    fn defer_identifier(&mut self, token: &Token, node: NodeId) {
        if let Some(previous) = &self.deferred {
            warn!(
                "deferred identifier '{}' replaced by '{}' at line {}",
                previous.name, token.text, token.line
            );
        }
        debug_assert!(
            self.deferred.is_none(),
            "identifier deferred before the previous one was resolved"
        );
        self.deferred = Some(DeferredIdent {
            name: token.text.clone(),
            node,
            line: token.line,
        });
    }

    fn resolve_call(&mut self, ast: &mut Ast, args_node: NodeId, errors: &mut Vec<Diagnostic>) {
        let Some(ident) = self.deferred.take() else {
            warn!("call without a pending identifier");
            return;
        };
        let frame_node = ast.parent(args_node).unwrap_or(args_node);

        let Some(idx) = self.functions.lookup(&ident.name) else {
            errors.push(Diagnostic::new(
                DiagnosticKind::UndeclaredFunction { name: ident.name },
                ident.line,
            ));
            self.calls.push(None, ident.line, frame_node);
            return;
        };

        let return_type = self.functions.get(idx).and_then(|f| f.return_type);
        if let Some(return_type) = return_type {
            match self.calls.expected() {
                Some(Some(expected)) if expected != return_type => {
                    errors.push(Diagnostic::new(
                        DiagnosticKind::ParamTypeMismatch {
                            name: ident.name.clone(),
                        },
                        ident.line,
                    ));
                }
                Some(_) => {}
                None => {
                    if self.window.unify(return_type) == Unify::Mismatch {
                        errors.push(Diagnostic::new(
                            DiagnosticKind::ReturnTypeMismatch {
                                function: ident.name.clone(),
                            },
                            ident.line,
                        ));
                    }
                }
            }
        }

        ast.node_mut(ident.node).value_type = return_type;
        self.calls.push(Some(idx), ident.line, frame_node);
        trace!("call to '{}' opened, depth {}", ident.name, self.calls.depth());
    }

    fn resolve_variable(&mut self, ast: &mut Ast, errors: &mut Vec<Diagnostic>) {
        let Some(ident) = self.deferred.take() else {
            warn!("variable reference without a pending identifier");
            return;
        };

        let Some(value_type) = self.scopes.lookup(&ident.name).map(|v| v.value_type) else {
            errors.push(Diagnostic::new(
                DiagnosticKind::UndeclaredVariable { name: ident.name },
                ident.line,
            ));
            return;
        };

        ast.node_mut(ident.node).value_type = Some(value_type);
        self.check_operand(value_type, ident.name, ident.line, errors);
    }

    // `token` starts the argument for the first one; later ones start after a comma
    fn begin_argument(&mut self, token: &Token, first: bool, errors: &mut Vec<Diagnostic>) {
        if let ArgumentSlot::Extra { line } = self.calls.begin_argument(&self.functions) {
            if first {
                self.report_extra_argument(token, line, errors);
            } else {
                self.extra_argument = Some(line);
            }
        }
    }

    fn report_extra_argument(&self, token: &Token, line: usize, errors: &mut Vec<Diagnostic>) {
        errors.push(Diagnostic::new(
            DiagnosticKind::ExtraParam {
                lexeme: token.text.clone(),
            },
            line,
        ));
    }

    fn check_literal(&mut self, token: &Token, errors: &mut Vec<Diagnostic>) {
        let value_type = if token.terminal() == Terminal::RealLit {
            ValueType::Real
        } else {
            ValueType::Int
        };
        self.check_operand(value_type, token.text.clone(), token.line, errors);
    }

    // Against the pending argument when inside a call, else against the window
    fn check_operand(
        &mut self,
        value_type: ValueType,
        name: String,
        line: usize,
        errors: &mut Vec<Diagnostic>,
    ) {
        match self.calls.expected() {
            Some(Some(expected)) if expected != value_type => {
                errors.push(Diagnostic::new(
                    DiagnosticKind::ParamTypeMismatch { name },
                    line,
                ));
            }
            Some(_) => {}
            None => {
                if self.window.unify(value_type) == Unify::Mismatch {
                    errors.push(Diagnostic::new(DiagnosticKind::TypeMismatch { name }, line));
                }
            }
        }
    }

    // ========== Terminal actions ==========

    fn match_type(&mut self, value_type: ValueType) {
        match self.phase {
            FunctionPhase::ReturnType => {
                if let Some(function) = self.current_function_mut() {
                    function.return_type = Some(value_type);
                }
                self.phase = FunctionPhase::Name;
            }
            FunctionPhase::Params => {
                if let Some(function) = self.current_function_mut() {
                    function.params.push(value_type);
                }
            }
            _ => self.decl_type = Some(value_type),
        }
    }

    fn match_identifier(&mut self, ast: &mut Ast, node: NodeId, token: &Token) {
        match self.phase {
            FunctionPhase::Name => {
                if let Some(function) = self.current_function_mut() {
                    function.name = token.text.clone();
                }
                self.phase = FunctionPhase::Params;
            }
            FunctionPhase::Params => {
                let param_type = self
                    .current_function_mut()
                    .and_then(|f| f.params.last().copied());
                if let Some(value_type) = param_type {
                    self.scopes.declare(Variable {
                        name: token.text.clone(),
                        line: token.line,
                        value_type,
                    });
                }
            }
            _ => {
                if ast.node(node).value_type.is_none() {
                    let resolved = self
                        .scopes
                        .lookup(&token.text)
                        .map(|v| v.value_type)
                        .or(self.window.flag());
                    ast.node_mut(node).value_type = resolved;
                }
            }
        }
    }

    fn close_header(&mut self) {
        let Some(function) = self.current_function.and_then(|idx| self.functions.get(idx)) else {
            return;
        };
        let name_line = format!(
            "Function Name: {}, Line Number: {}",
            function.name, function.line
        );
        let params_line = function.params_line();
        self.scope_log.push(name_line);
        self.scope_log.push(params_line);
        self.phase = FunctionPhase::Body;
    }

    fn end_function(&mut self) {
        let current = self.scopes.current_scope_index();
        if self.scopes.exit_scope().is_some() {
            if let Some(scope) = self.scopes.scope(current) {
                let line = scope.variables_line();
                self.scope_log.push(line);
            }
            self.scope_log.push("End Lexeme: fed".to_string());
            debug!("left function scope {}", current);
        } else {
            warn!("'fed' outside of a function scope");
        }
        self.phase = FunctionPhase::Outside;
        self.current_function = None;
        self.decl_type = None;
    }
}

impl Default for SemanticContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Actions for SemanticContext {
    fn on_descend(
        &mut self,
        ast: &mut Ast,
        node: NodeId,
        production: Option<ProductionId>,
        token: &Token,
        errors: &mut Vec<Diagnostic>,
    ) {
        self.window.descend();

        let Some(production) = production else {
            return;
        };

        if let Some(line) = self.extra_argument.take() {
            self.report_extra_argument(token, line, errors);
        }

        match production {
            ProductionId::FUNC_DECL => self.begin_function(token.line),
            ProductionId::VAR_LIST => self.declare_variable(token),
            ProductionId::ASSIGN => {
                if self.window.open() {
                    self.check_assignment_target(token, errors);
                }
            }
            ProductionId::PRINT | ProductionId::RETURN | ProductionId::COND => {
                self.window.open();
            }
            ProductionId::FACTOR_ID => self.defer_identifier(token, node),
            ProductionId::CALL => self.resolve_call(ast, node, errors),
            ProductionId::NO_CALL => self.resolve_variable(ast, errors),
            ProductionId::ARGS => self.begin_argument(token, true, errors),
            ProductionId::MORE_ARGS => self.begin_argument(token, false, errors),
            ProductionId::NO_ARGS | ProductionId::END_ARGS => {
                self.calls.pop();
            }
            ProductionId::FACTOR_INTEGER | ProductionId::FACTOR_REAL => {
                self.check_literal(token, errors)
            }
            _ => {}
        }
    }

    fn on_match(
        &mut self,
        ast: &mut Ast,
        node: NodeId,
        token: &Token,
        _errors: &mut Vec<Diagnostic>,
    ) {
        let Some(terminal) = ast.node(node).terminal() else {
            return;
        };

        match terminal {
            Terminal::Int => self.match_type(ValueType::Int),
            Terminal::Double => self.match_type(ValueType::Real),
            Terminal::Id => self.match_identifier(ast, node, token),
            Terminal::RParen if self.phase == FunctionPhase::Params => self.close_header(),
            Terminal::Fed => self.end_function(),
            _ => {}
        }
    }

    fn on_ascend(&mut self) {
        self.window.ascend();
    }

    fn on_recover(&mut self, ast: &Ast, position: NodeId) {
        self.window.reset();
        self.deferred = None;
        self.extra_argument = None;
        self.calls
            .retain(|frame| ast.is_ancestor_or_self(frame.node, position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenClass;

    fn ident(text: &str, line: usize) -> Token {
        Token {
            class: TokenClass::Identifier,
            lexeme_id: 3,
            text: text.to_string(),
            is_integer: false,
            line,
        }
    }

    fn number(text: &str, is_integer: bool) -> Token {
        Token {
            class: TokenClass::Number,
            lexeme_id: 0,
            text: text.to_string(),
            is_integer,
            line: 1,
        }
    }

    #[test]
    fn test_assignment_window_flags_mismatched_literal() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.decl_type = Some(ValueType::Int);
        ctx.declare_variable(&ident("x", 1));

        ctx.on_descend(&mut ast, 0, Some(ProductionId::ASSIGN), &ident("x", 1), &mut errors);
        assert_eq!(ctx.window().depth(), 2);
        assert_eq!(ctx.window().flag(), Some(ValueType::Int));

        ctx.on_descend(&mut ast, 0, Some(ProductionId::FACTOR_REAL), &number("1.5", false), &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            DiagnosticKind::TypeMismatch {
                name: "1.5".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_assignment_target() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.on_descend(&mut ast, 0, Some(ProductionId::ASSIGN), &ident("y", 4), &mut errors);
        assert_eq!(
            errors,
            vec![Diagnostic::new(
                DiagnosticKind::UndeclaredVariable {
                    name: "y".to_string()
                },
                4
            )]
        );
    }

    #[test]
    fn test_undeclared_call_pushes_stub_frame() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.on_descend(&mut ast, 0, Some(ProductionId::FACTOR_ID), &ident("foo", 2), &mut errors);
        ctx.resolve_call(&mut ast, 0, &mut errors);

        assert_eq!(errors.len(), 1);
        assert_eq!(ctx.calls().depth(), 1);
        assert_eq!(ctx.calls().top().unwrap().function, None);

        // Stub frames never report extra arguments
        ctx.on_descend(&mut ast, 0, Some(ProductionId::ARGS), &number("1", true), &mut errors);
        ctx.on_descend(&mut ast, 0, Some(ProductionId::MORE_ARGS), &number("2", true), &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_deferred_identifier_is_consumed_once() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.on_descend(&mut ast, 0, Some(ProductionId::FACTOR_ID), &ident("a", 1), &mut errors);
        ctx.on_descend(&mut ast, 0, Some(ProductionId::NO_CALL), &ident("a", 1), &mut errors);
        assert_eq!(errors.len(), 1);

        // Nothing pending: no second diagnostic
        ctx.on_descend(&mut ast, 0, Some(ProductionId::NO_CALL), &ident("a", 1), &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "before the previous one was resolved")]
    fn test_second_deferral_without_resolution_fails() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.on_descend(&mut ast, 0, Some(ProductionId::FACTOR_ID), &ident("a", 1), &mut errors);
        ctx.on_descend(&mut ast, 0, Some(ProductionId::FACTOR_ID), &ident("b", 1), &mut errors);
    }

    #[test]
    fn test_non_first_child_fires_no_action() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.on_descend(&mut ast, 0, None, &ident("z", 1), &mut errors);
        assert!(errors.is_empty());
        assert!(ctx.functions().is_empty());
    }

    #[test]
    fn test_recover_resets_window_and_deferred() {
        let mut ast = Ast::new(100);
        let mut ctx = SemanticContext::new();
        let mut errors = Vec::new();
        ctx.on_descend(&mut ast, 0, Some(ProductionId::PRINT), &ident("print", 1), &mut errors);
        ctx.on_descend(&mut ast, 0, Some(ProductionId::FACTOR_ID), &ident("a", 1), &mut errors);
        ctx.on_recover(&ast, 0);
        assert!(!ctx.window().is_open());

        ctx.on_descend(&mut ast, 0, Some(ProductionId::NO_CALL), &ident("a", 1), &mut errors);
        assert!(errors.is_empty());
    }
}
