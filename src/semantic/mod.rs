mod actions;
mod calls;
mod functions;
mod window;

pub use actions::SemanticContext;
pub use calls::{CallFrame, CallStack};
pub use functions::{Function, FunctionTable};
pub use window::TypeWindow;

/// The two value types of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Real,
}

impl ValueType {
    /// Stack-frame size in bytes
    pub fn size(self) -> usize {
        match self {
            ValueType::Int => 4,
            ValueType::Real => 8,
        }
    }

    /// Spelling used in source and in the scope log
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Real => "double",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents the kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,   // Top-level declarations and statements
    Function, // Parameters and locals of one function
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub line: usize,
    pub value_type: ValueType,
}

/// Represents a single scope in the scope hierarchy
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Line of the token that opened the scope
    pub line: usize,
    /// Declared variables in declaration order
    pub variables: Vec<Variable>,
    /// Index of parent scope (None for global scope)
    pub parent: Option<usize>,
}

impl Scope {
    pub fn new(kind: ScopeKind, line: usize, parent: Option<usize>) -> Self {
        Scope {
            kind,
            line,
            variables: Vec::new(),
            parent,
        }
    }

    /// Looks up a variable in this scope only (does not check parent)
    pub fn lookup_local(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// `Variables: int a, double b` line for the scope log
    pub fn variables_line(&self) -> String {
        let vars: Vec<String> = self
            .variables
            .iter()
            .map(|v| format!("{} {}", v.value_type, v.name))
            .collect();
        format!("Variables: {}", vars.join(", "))
    }
}

/// Arena of scopes plus the live chain from the active scope up to global
#[derive(Debug)]
pub struct ScopeStack {
    /// Arena of all scopes (indexed by scope id)
    scopes: Vec<Scope>,
    /// Stack of current scope indices (top = current scope)
    current_stack: Vec<usize>,
}

impl ScopeStack {
    /// Creates a new scope stack with a global scope
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Scope::new(ScopeKind::Global, 1, None)],
            current_stack: vec![0],
        }
    }

    /// Enters a new scope as a child of the current one
    /// Returns the index of the newly created scope
    pub fn enter_scope(&mut self, kind: ScopeKind, line: usize) -> usize {
        let parent_idx = self.current_scope_index();
        let scope_idx = self.scopes.len();
        self.scopes.push(Scope::new(kind, line, Some(parent_idx)));
        self.current_stack.push(scope_idx);
        scope_idx
    }

    /// Exits the current scope, returning its index
    ///
    /// The global scope is never exited; `None` in that case.
    pub fn exit_scope(&mut self) -> Option<usize> {
        if self.current_stack.len() > 1 {
            self.current_stack.pop()
        } else {
            None
        }
    }

    pub fn current_scope_index(&self) -> usize {
        self.current_stack.last().copied().unwrap_or(0)
    }

    pub fn current_scope(&self) -> &Scope {
        &self.scopes[self.current_scope_index()]
    }

    pub fn scope(&self, idx: usize) -> Option<&Scope> {
        self.scopes.get(idx)
    }

    pub fn global(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Declares a variable in the given scope
    pub fn declare_in(&mut self, scope_idx: usize, variable: Variable) {
        if let Some(scope) = self.scopes.get_mut(scope_idx) {
            scope.variables.push(variable);
        }
    }

    /// Declares a variable in the current scope
    pub fn declare(&mut self, variable: Variable) {
        let idx = self.current_scope_index();
        self.declare_in(idx, variable);
    }

    /// Looks up a variable by searching the scope chain from current to global
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        let mut current_idx = self.current_scope_index();
        loop {
            let scope = &self.scopes[current_idx];
            if let Some(variable) = scope.lookup_local(name) {
                return Some(variable);
            }

            match scope.parent {
                Some(parent_idx) => current_idx = parent_idx,
                None => return None,
            }
        }
    }

    /// Returns the current scope depth (0 = global)
    pub fn depth(&self) -> usize {
        self.current_stack.len() - 1
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, value_type: ValueType) -> Variable {
        Variable {
            name: name.to_string(),
            line: 1,
            value_type,
        }
    }

    #[test]
    fn test_value_type_sizes() {
        assert_eq!(ValueType::Int.size(), 4);
        assert_eq!(ValueType::Real.size(), 8);
        assert_eq!(ValueType::Real.to_string(), "double");
    }

    #[test]
    fn test_lookup_walks_parent_chain() {
        let mut scopes = ScopeStack::new();
        scopes.declare(var("g", ValueType::Int));
        scopes.enter_scope(ScopeKind::Function, 2);
        scopes.declare(var("local", ValueType::Real));

        assert_eq!(scopes.lookup("g").unwrap().value_type, ValueType::Int);
        assert_eq!(scopes.lookup("local").unwrap().value_type, ValueType::Real);
        assert!(scopes.lookup("missing").is_none());
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let mut scopes = ScopeStack::new();
        scopes.declare(var("x", ValueType::Int));
        scopes.enter_scope(ScopeKind::Function, 2);
        scopes.declare(var("x", ValueType::Real));
        assert_eq!(scopes.lookup("x").unwrap().value_type, ValueType::Real);

        scopes.exit_scope();
        assert_eq!(scopes.lookup("x").unwrap().value_type, ValueType::Int);
    }

    #[test]
    fn test_sibling_scopes_are_isolated() {
        let mut scopes = ScopeStack::new();
        scopes.enter_scope(ScopeKind::Function, 1);
        scopes.declare(var("a", ValueType::Int));
        scopes.exit_scope();

        scopes.enter_scope(ScopeKind::Function, 5);
        assert!(scopes.lookup("a").is_none());
        assert_eq!(scopes.len(), 3);
    }

    #[test]
    fn test_first_declaration_wins() {
        let mut scopes = ScopeStack::new();
        scopes.declare(var("x", ValueType::Int));
        scopes.declare(var("x", ValueType::Real));
        assert_eq!(scopes.lookup("x").unwrap().value_type, ValueType::Int);
    }

    #[test]
    fn test_cannot_exit_global() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.exit_scope(), None);
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_variables_line() {
        let mut scope = Scope::new(ScopeKind::Global, 1, None);
        assert_eq!(scope.variables_line(), "Variables: ");
        scope.variables.push(var("x", ValueType::Int));
        scope.variables.push(var("y", ValueType::Real));
        assert_eq!(scope.variables_line(), "Variables: int x, double y");
    }
}
