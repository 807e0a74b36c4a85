use super::ValueType;

/// A declared function signature
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Empty until the header's name is matched
    pub name: String,
    pub line: usize,
    pub return_type: Option<ValueType>,
    pub params: Vec<ValueType>,
    pub scope: usize,
}

impl Function {
    pub fn new(line: usize, scope: usize) -> Self {
        Self {
            name: String::new(),
            line,
            return_type: None,
            params: Vec::new(),
            scope,
        }
    }

    /// `Params: int, double` line for the scope log
    pub fn params_line(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.name()).collect();
        format!("Params: {}", params.join(", "))
    }

    /// Total parameter bytes
    pub fn params_size(&self) -> usize {
        self.params.iter().map(|p| p.size()).sum()
    }
}

/// Flat, append-only registry searched by name
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: Vec<Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a function and returns its index
    pub fn push(&mut self, function: Function) -> usize {
        self.functions.push(function);
        self.functions.len() - 1
    }

    /// First function with this name
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }

    pub fn get(&self, idx: usize) -> Option<&Function> {
        self.functions.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Function> {
        self.functions.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn into_vec(self) -> Vec<Function> {
        self.functions
    }
}
