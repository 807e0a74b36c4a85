use crate::grammar::{NonTerminal, ProductionId, Symbol, Terminal, production};
use crate::semantic::ValueType;

pub type NodeId = usize;

// AST stored in a single vector; parents and children are indices
#[derive(Debug)]
pub struct Ast {
    pub nodes: Vec<AstNode>,
    pub root: NodeId,
    max_nodes: usize,
}

// One grammar symbol occurrence
#[derive(Debug, Clone)]
pub struct AstNode {
    pub symbol: Symbol,

    // Set when the children are materialized; doubles as the materialized flag
    pub production: Option<ProductionId>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,

    // Next child to visit; only ever increases
    pub cursor: usize,

    // Terminal payload
    pub lexeme: Option<String>,
    pub value_type: Option<ValueType>,
    pub line: usize,
}

impl AstNode {
    pub fn new(symbol: Symbol, parent: Option<NodeId>) -> Self {
        Self {
            symbol,
            production: None,
            children: Vec::new(),
            parent,
            cursor: 0,
            lexeme: None,
            value_type: None,
            line: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.symbol.is_terminal()
    }

    pub fn is_materialized(&self) -> bool {
        self.production.is_some()
    }

    /// Materialized and every child visited
    pub fn is_exhausted(&self) -> bool {
        self.is_materialized() && self.cursor >= self.children.len()
    }

    pub fn terminal(&self) -> Option<Terminal> {
        match self.symbol {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn nonterminal(&self) -> Option<NonTerminal> {
        match self.symbol {
            Symbol::NonTerminal(n) => Some(n),
            Symbol::Terminal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstError {
    pub count: usize,
    pub max: usize,
}

impl std::fmt::Display for AstError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "AST node limit exceeded: {} nodes (max: {})",
            self.count, self.max
        )
    }
}

impl std::error::Error for AstError {}

impl Ast {
    /// A tree holding only the unmaterialized start symbol
    pub fn new(max_nodes: usize) -> Self {
        Self {
            nodes: vec![AstNode::new(Symbol::NonTerminal(NonTerminal::Program), None)],
            root: 0,
            max_nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id]
    }

    // Add node and return its index
    pub fn add_node(&mut self, node: AstNode) -> Result<NodeId, AstError> {
        if self.nodes.len() >= self.max_nodes {
            return Err(AstError {
                count: self.nodes.len(),
                max: self.max_nodes,
            });
        }

        let idx = self.nodes.len();
        self.nodes.push(node);
        Ok(idx)
    }

    /// Create the children of `id` from a production's right-hand side
    ///
    /// Does nothing if the node already has children.
    pub fn materialize(&mut self, id: NodeId, prod: ProductionId) -> Result<(), AstError> {
        if self.nodes[id].is_materialized() {
            return Ok(());
        }
        let Some(rule) = production(prod) else {
            return Ok(());
        };

        let mut children = Vec::with_capacity(rule.len());
        for symbol in rule.symbols() {
            children.push(self.add_node(AstNode::new(symbol, Some(id)))?);
        }

        let node = &mut self.nodes[id];
        node.children = children;
        node.production = Some(prod);
        Ok(())
    }

    /// The child under the node's cursor
    pub fn current_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        node.children.get(node.cursor).copied()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id].children.get(index).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn production(&self, id: NodeId) -> Option<ProductionId> {
        self.nodes[id].production
    }

    pub fn lexeme(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].lexeme.as_deref()
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id].parent;
        }
        false
    }

    /// Render the tree as indented `symbol` / `symbol 'lexeme'` lines
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root, 0, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.symbol.name());
        if let Some(lexeme) = &node.lexeme {
            out.push_str(&format!(" '{}'", lexeme));
        }
        out.push('\n');
        for &child in &node.children {
            self.write_node(child, depth + 1, out);
        }
    }
}
