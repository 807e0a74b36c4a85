// Three-address code generation
//
// Runs once over a finished, error-free tree. Each function becomes a block
// framed by BeginFunc/EndFunc; the top-level declarations and statements become
// the `main` block. Labels are numbered across the whole program.

mod expressions;
mod frame;
mod statements;

pub use frame::Frame;

use log::debug;

use crate::ast::{Ast, NodeId};
use crate::grammar::{ProductionId, Terminal};
use crate::semantic::ValueType;

#[derive(Debug, Clone, PartialEq)]
pub struct TacError {
    pub message: String,
    pub node: NodeId,
}

impl TacError {
    fn new(message: impl Into<String>, node: NodeId) -> Self {
        Self {
            message: message.into(),
            node,
        }
    }
}

impl std::fmt::Display for TacError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "TAC generation failed at node {}: {}", self.node, self.message)
    }
}

impl std::error::Error for TacError {}

/// Value produced by an expression: a variable or temporary name and its type
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Operand {
    pub name: String,
    pub value_type: ValueType,
}

impl Operand {
    fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

// Instructions of the block being generated
#[derive(Debug, Default)]
struct Block {
    frame: Frame,
    lines: Vec<String>,
}

pub struct TacGenerator<'a> {
    ast: &'a Ast,
    labels: usize,
    block: Block,
    out: Vec<String>,
}

impl<'a> TacGenerator<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            labels: 0,
            block: Block::default(),
            out: Vec::new(),
        }
    }

    /// Emit every function block followed by `main`
    pub fn generate(mut self) -> Result<String, TacError> {
        let root = self.ast.root;

        let mut func_decls = self.child(root, 0)?;
        while !self.is_epsilon(func_decls)? {
            let func_decl = self.child(func_decls, 0)?;
            self.function(func_decl)?;
            func_decls = self.child(func_decls, 2)?;
        }

        self.declarations(self.child(root, 1)?)?;
        self.statements(self.child(root, 2)?)?;
        self.finish_block("main");

        let mut text = self.out.join("\n");
        text.push('\n');
        Ok(text)
    }

    // FuncDecl: def Type FuncName ( Params ) Decls StmtSeq fed
    fn function(&mut self, id: NodeId) -> Result<(), TacError> {
        let name_node = self.child(self.child(id, 2)?, 0)?;
        let name = self.lexeme(name_node)?.to_string();

        let mut params = self.child(id, 4)?;
        if !self.is_epsilon(params)? {
            let value_type = self.type_of(self.child(params, 0)?)?;
            self.block.frame.add_param(value_type);
            params = self.child(params, 2)?;
            while !self.is_epsilon(params)? {
                let value_type = self.type_of(self.child(params, 1)?)?;
                self.block.frame.add_param(value_type);
                params = self.child(params, 3)?;
            }
        }

        self.declarations(self.child(id, 6)?)?;
        self.statements(self.child(id, 7)?)?;
        self.finish_block(&name);
        Ok(())
    }

    // Decls: Decl ; Decls, with every identifier of a VarList counted
    fn declarations(&mut self, mut id: NodeId) -> Result<(), TacError> {
        while !self.is_epsilon(id)? {
            let decl = self.child(id, 0)?;
            let value_type = self.type_of(self.child(decl, 0)?)?;

            let mut var_list = self.child(decl, 1)?;
            loop {
                self.block.frame.add_local(value_type);
                let rest = self.child(var_list, 1)?;
                if self.is_epsilon(rest)? {
                    break;
                }
                var_list = self.child(rest, 1)?;
            }

            id = self.child(id, 2)?;
        }
        Ok(())
    }

    fn finish_block(&mut self, name: &str) {
        let block = std::mem::take(&mut self.block);
        debug!(
            "block '{}': {} bytes, {} temporaries",
            name,
            block.frame.size(),
            block.frame.temp_count()
        );

        self.out.push(format!("{}:", name));
        self.out.push(format!("    BeginFunc {}:", block.frame.size()));
        self.out.extend(block.lines);
        self.out.push("    EndFunc:".to_string());
    }

    // ========== Emission ==========

    fn emit(&mut self, instruction: String) {
        self.block.lines.push(format!("    {}", instruction));
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.labels);
        self.labels += 1;
        label
    }

    fn place_label(&mut self, label: &str) {
        self.block.lines.push(format!("{}:", label));
    }

    fn temp(&mut self, value_type: ValueType) -> String {
        self.block.frame.temp(value_type)
    }

    // ========== Tree access ==========

    fn child(&self, id: NodeId, index: usize) -> Result<NodeId, TacError> {
        self.ast
            .child(id, index)
            .ok_or_else(|| TacError::new(format!("missing child {}", index), id))
    }

    fn production(&self, id: NodeId) -> Result<ProductionId, TacError> {
        self.ast
            .production(id)
            .ok_or_else(|| TacError::new("node was never expanded", id))
    }

    fn lexeme(&self, id: NodeId) -> Result<&'a str, TacError> {
        let ast = self.ast;
        ast.lexeme(id)
            .ok_or_else(|| TacError::new("terminal without a lexeme", id))
    }

    fn terminal(&self, id: NodeId) -> Result<Terminal, TacError> {
        self.ast
            .node(id)
            .terminal()
            .ok_or_else(|| TacError::new("expected a terminal", id))
    }

    /// True for a node expanded by an epsilon production
    fn is_epsilon(&self, id: NodeId) -> Result<bool, TacError> {
        self.production(id)?;
        let first = self.child(id, 0)?;
        Ok(self.ast.node(first).terminal() == Some(Terminal::Epsilon))
    }

    // Type: int | double
    fn type_of(&self, id: NodeId) -> Result<ValueType, TacError> {
        match self.terminal(self.child(id, 0)?)? {
            Terminal::Int => Ok(ValueType::Int),
            Terminal::Double => Ok(ValueType::Real),
            other => Err(TacError::new(
                format!("'{}' is not a type", other.name()),
                id,
            )),
        }
    }
}

/// Generate TAC for an error-free tree
pub fn generate(ast: &Ast) -> Result<String, TacError> {
    TacGenerator::new(ast).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::lexer::{Token, lex};
    use crate::limits::CompilerLimits;
    use crate::parser::{Parser, Step};
    use crate::semantic::SemanticContext;

    fn tac(source: &str) -> String {
        let _ = env_logger::builder().is_test(true).try_init();
        let limits = CompilerLimits::default();
        let lexed = lex(source, &limits).unwrap();
        let mut parser = Parser::new(&limits);
        let mut semantic = SemanticContext::new();
        let mut errors: Vec<Diagnostic> = Vec::new();

        for token in &lexed.tokens {
            parser.advance(token, &mut semantic, &mut errors);
        }
        let end = Token::end(1);
        assert_eq!(parser.advance(&end, &mut semantic, &mut errors), Step::Finished);
        assert!(errors.is_empty(), "{:?}", errors);

        generate(parser.ast()).unwrap()
    }

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_empty_program_has_main_only() {
        assert_eq!(tac(""), "main:\n    BeginFunc 0:\n    EndFunc:\n");
    }

    #[test]
    fn test_function_and_call() {
        let text = tac("def int add(int a, int b) return a + b fed; int x; x = add(2, 3); print x");
        assert_eq!(
            lines(&text),
            vec![
                "add:",
                "    BeginFunc 12:",
                "    t0 = a + b",
                "    Return t0",
                "    EndFunc:",
                "main:",
                "    BeginFunc 16:",
                "    t0 = 2",
                "    t1 = 3",
                "    PushParam t1",
                "    PushParam t0",
                "    t2 = LCall add",
                "    PopParams 8",
                "    x = t2",
                "    Print x",
                "    EndFunc:",
            ]
        );
    }

    #[test]
    fn test_frame_counts_every_declared_name() {
        let text = tac("int a, b; double c; a = b");
        assert_eq!(lines(&text)[1], "    BeginFunc 16:");
        assert_eq!(lines(&text)[2], "    a = b");
    }

    #[test]
    fn test_arithmetic_is_left_associative() {
        let text = tac("int a, b, c; a = a - b - c * 2");
        assert_eq!(
            lines(&text)[2..6].to_vec(),
            vec![
                "    t0 = a - b",
                "    t1 = 2",
                "    t2 = c * t1",
                "    t3 = t0 - t2",
            ]
        );
    }

    #[test]
    fn test_parenthesised_factor() {
        let text = tac("int a, b; a = (a + b) * 2; b = b - (a - 1)");
        assert_eq!(
            lines(&text),
            vec![
                "main:",
                "    BeginFunc 32:",
                "    t0 = a + b",
                "    t1 = 2",
                "    t2 = t0 * t1",
                "    a = t2",
                "    t3 = 1",
                "    t4 = a - t3",
                "    t5 = b - t4",
                "    b = t5",
                "    EndFunc:",
            ]
        );
    }

    #[test]
    fn test_real_temporaries_take_eight_bytes() {
        let text = tac("double d; d = 1.5 * d");
        // d (8) + t0 (8) + t1 (8)
        assert_eq!(lines(&text)[1], "    BeginFunc 24:");
    }

    #[test]
    fn test_if_else_labels() {
        let text = tac("int x; if (x < 1) then x = 1 else x = 2 fi");
        assert_eq!(
            lines(&text)[2..].to_vec(),
            vec![
                "    t0 = 1",
                "    t1 = x < t0",
                "    IfZ t1 Goto L0",
                "    t2 = 1",
                "    x = t2",
                "    Goto L1",
                "L0:",
                "    t3 = 2",
                "    x = t3",
                "L1:",
                "    EndFunc:",
            ]
        );
    }

    #[test]
    fn test_if_without_else() {
        let text = tac("int x; if (x == x) then print x fi");
        assert_eq!(
            lines(&text)[2..].to_vec(),
            vec![
                "    t0 = x == x",
                "    IfZ t0 Goto L0",
                "    Print x",
                "L0:",
                "    EndFunc:",
            ]
        );
    }

    #[test]
    fn test_while_loop() {
        let text = tac("int i; while (i > 0) do i = i - 1 od");
        assert_eq!(
            lines(&text)[2..].to_vec(),
            vec![
                "L0:",
                "    t0 = 0",
                "    t1 = i > t0",
                "    IfZ t1 Goto L1",
                "    t2 = 1",
                "    t3 = i - t2",
                "    i = t3",
                "    Goto L0",
                "L1:",
                "    EndFunc:",
            ]
        );
    }

    #[test]
    fn test_compound_comparisons() {
        let text = tac("int a, b; if (a >= b) then print a fi; if (a <> b) then print b fi");
        let text = lines(&text);
        assert!(text.contains(&"    t0 = a > b"));
        assert!(text.contains(&"    t1 = a == b"));
        assert!(text.contains(&"    t2 = t0 || t1"));
        assert!(text.contains(&"    IfZ t2 Goto L0"));
        assert!(text.contains(&"    t3 = a < b"));
        assert!(text.contains(&"    t4 = a > b"));
        assert!(text.contains(&"    t5 = t3 || t4"));
    }

    #[test]
    fn test_logical_operators() {
        let text = tac("int a; if not (a < a) and (a > a) or (a == a) then print a fi");
        assert_eq!(
            lines(&text)[2..8].to_vec(),
            vec![
                "    t0 = a < a",
                "    t1 = !t0",
                "    t2 = a > a",
                "    t3 = t1 && t2",
                "    t4 = a == a",
                "    t5 = t3 || t4",
            ]
        );
    }

    #[test]
    fn test_labels_are_global_and_temps_per_function() {
        let text = tac(
            "def int f(int n) if (n < n) then return n fi fed; int x; if (x < x) then x = f(x) fi",
        );
        let text = lines(&text);
        assert!(text.contains(&"    IfZ t0 Goto L0"));
        assert!(text.contains(&"    IfZ t0 Goto L1"));
        assert!(text.contains(&"    PushParam x"));
        assert!(text.contains(&"    t1 = LCall f"));
        assert!(text.contains(&"    PopParams 4"));
    }

    #[test]
    fn test_call_without_arguments() {
        let text = tac("def double pi() return 3.14 fed; double p; p = pi()");
        let text = lines(&text);
        assert!(text.contains(&"    t0 = LCall pi"));
        assert!(text.contains(&"    PopParams 0"));
        // p (8) + t0 (8)
        assert!(text.contains(&"    BeginFunc 16:"));
    }

    #[test]
    fn test_unexpanded_tree_is_an_error() {
        let ast = Ast::new(10);
        let err = generate(&ast).unwrap_err();
        assert_eq!(err.node, 0);
    }
}
