// Panic-mode recovery: find the offending token further along the tree

use crate::ast::{Ast, NodeId};
use crate::grammar::Terminal;

// A node is skipped over while it has nothing left to offer: either it was
// never expanded or its cursor sits on the last child.
fn is_spent(ast: &Ast, id: NodeId) -> bool {
    let node = ast.node(id);
    !node.is_materialized() || node.cursor + 1 == node.children.len()
}

fn on_last_child(ast: &Ast, id: NodeId) -> bool {
    let node = ast.node(id);
    node.cursor + 1 == node.children.len()
}

/// Locate an unvisited terminal equal to `terminal`
///
/// Returns the owning node and the child index. Only the siblings to the right
/// of each ancestor's cursor are searched; nested nonterminals are not entered.
pub(super) fn find_anchor(ast: &Ast, start: NodeId, terminal: Terminal) -> Option<(NodeId, usize)> {
    let mut node = start;
    while is_spent(ast, node) {
        match ast.parent(node) {
            Some(parent) => node = parent,
            None => break,
        }
    }

    while let Some(parent) = ast.parent(node) {
        let n = ast.node(node);
        let found = n
            .children
            .iter()
            .enumerate()
            .skip(n.cursor)
            .find(|&(_, &child)| ast.node(child).terminal() == Some(terminal))
            .map(|(i, _)| i);
        if let Some(index) = found {
            return Some((node, index));
        }

        node = parent;
        while on_last_child(ast, node) {
            match ast.parent(node) {
                Some(parent) => node = parent,
                None => break,
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ProductionId;

    // Program -> FuncDecls Decls StmtSeq, with FuncDecls -> FuncDecl ; FuncDecls
    fn function_tree() -> (Ast, NodeId) {
        let mut ast = Ast::new(1000);
        ast.materialize(0, ProductionId::PROGRAM).unwrap();
        let func_decls = ast.child(0, 0).unwrap();
        ast.materialize(func_decls, ProductionId(1)).unwrap();
        let func_decl = ast.child(func_decls, 0).unwrap();
        ast.materialize(func_decl, ProductionId::FUNC_DECL).unwrap();
        (ast, func_decl)
    }

    #[test]
    fn test_finds_later_sibling() {
        let (mut ast, func_decl) = function_tree();
        ast.node_mut(func_decl).cursor = 4;
        let params = ast.child(func_decl, 4).unwrap();

        assert_eq!(
            find_anchor(&ast, params, Terminal::Fed),
            Some((func_decl, 8))
        );
        assert_eq!(
            find_anchor(&ast, params, Terminal::RParen),
            Some((func_decl, 5))
        );
    }

    #[test]
    fn test_climbs_to_ancestor_siblings() {
        let (mut ast, func_decl) = function_tree();
        let func_decls = ast.parent(func_decl).unwrap();
        ast.node_mut(func_decl).cursor = 7;
        let stmt_seq = ast.child(func_decl, 7).unwrap();

        // ';' follows the function declaration one level up
        assert_eq!(
            find_anchor(&ast, stmt_seq, Terminal::Semicolon),
            Some((func_decls, 1))
        );
    }

    #[test]
    fn test_terminals_behind_cursor_are_ignored() {
        let (mut ast, func_decl) = function_tree();
        ast.node_mut(func_decl).cursor = 6;
        let decls = ast.child(func_decl, 6).unwrap();
        assert_eq!(find_anchor(&ast, decls, Terminal::LParen), None);
    }

    #[test]
    fn test_no_anchor_at_top_level() {
        let mut ast = Ast::new(1000);
        ast.materialize(0, ProductionId::PROGRAM).unwrap();
        ast.node_mut(0).cursor = 2;
        let stmt_seq = ast.child(0, 2).unwrap();
        assert_eq!(find_anchor(&ast, stmt_seq, Terminal::RParen), None);
    }
}
