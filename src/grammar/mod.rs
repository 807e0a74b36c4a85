// Fixed grammar data for the LL(1) front end
//
// Terminal and nonterminal numbering is part of the external contract:
// token-to-terminal mapping, the sign-encoded production table and the parse
// table all index by these ids.

mod productions;
mod table;

pub use productions::{Production, ProductionId, PRODUCTIONS, production};
pub use table::ParseTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Terminal {
    Def = 0,
    Fed = 1,
    Id = 2,
    Int = 3,
    Double = 4,
    If = 5,
    Then = 6,
    Else = 7,
    Fi = 8,
    While = 9,
    Do = 10,
    Od = 11,
    Print = 12,
    Return = 13,
    Lt = 14,
    Gt = 15,
    Eq = 16,
    Le = 17,
    Ge = 18,
    Ne = 19,
    Assign = 20,
    LBracket = 21,
    RBracket = 22,
    LParen = 23,
    RParen = 24,
    Semicolon = 25,
    Comma = 26,
    IntegerLit = 27,
    RealLit = 28,
    Plus = 29,
    Minus = 30,
    Star = 31,
    Slash = 32,
    Percent = 33,
    Or = 34,
    And = 35,
    Not = 36,
    // Doubles as the end-of-input marker
    Epsilon = 37,
}

impl Terminal {
    pub const COUNT: usize = 38;

    pub const ALL: [Terminal; Terminal::COUNT] = [
        Terminal::Def,
        Terminal::Fed,
        Terminal::Id,
        Terminal::Int,
        Terminal::Double,
        Terminal::If,
        Terminal::Then,
        Terminal::Else,
        Terminal::Fi,
        Terminal::While,
        Terminal::Do,
        Terminal::Od,
        Terminal::Print,
        Terminal::Return,
        Terminal::Lt,
        Terminal::Gt,
        Terminal::Eq,
        Terminal::Le,
        Terminal::Ge,
        Terminal::Ne,
        Terminal::Assign,
        Terminal::LBracket,
        Terminal::RBracket,
        Terminal::LParen,
        Terminal::RParen,
        Terminal::Semicolon,
        Terminal::Comma,
        Terminal::IntegerLit,
        Terminal::RealLit,
        Terminal::Plus,
        Terminal::Minus,
        Terminal::Star,
        Terminal::Slash,
        Terminal::Percent,
        Terminal::Or,
        Terminal::And,
        Terminal::Not,
        Terminal::Epsilon,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Name used in the trace and in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Terminal::Def => "def",
            Terminal::Fed => "fed",
            Terminal::Id => "id",
            Terminal::Int => "int",
            Terminal::Double => "double",
            Terminal::If => "if",
            Terminal::Then => "then",
            Terminal::Else => "else",
            Terminal::Fi => "fi",
            Terminal::While => "while",
            Terminal::Do => "do",
            Terminal::Od => "od",
            Terminal::Print => "print",
            Terminal::Return => "return",
            Terminal::Lt => "<",
            Terminal::Gt => ">",
            Terminal::Eq => "==",
            Terminal::Le => "<=",
            Terminal::Ge => ">=",
            Terminal::Ne => "<>",
            Terminal::Assign => "=",
            Terminal::LBracket => "[",
            Terminal::RBracket => "]",
            Terminal::LParen => "(",
            Terminal::RParen => ")",
            Terminal::Semicolon => ";",
            Terminal::Comma => ",",
            Terminal::IntegerLit => "integer",
            Terminal::RealLit => "real",
            Terminal::Plus => "+",
            Terminal::Minus => "-",
            Terminal::Star => "*",
            Terminal::Slash => "/",
            Terminal::Percent => "%",
            Terminal::Or => "or",
            Terminal::And => "and",
            Terminal::Not => "not",
            Terminal::Epsilon => "epsilon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NonTerminal {
    Program = 0,
    FuncDecls = 1,
    FuncDecl = 2,
    FuncName = 3,
    Params = 4,
    ParamsRest = 5,
    Decls = 6,
    Decl = 7,
    Type = 8,
    VarList = 9,
    VarListRest = 10,
    StmtSeq = 11,
    StmtSeqRest = 12,
    Stmt = 13,
    ElsePart = 14,
    Var = 15,
    Expr = 16,
    ExprRest = 17,
    Term = 18,
    TermRest = 19,
    Factor = 20,
    FactorRest = 21,
    Args = 22,
    ArgsRest = 23,
    BoolExpr = 24,
    BoolExprRest = 25,
    BoolTerm = 26,
    BoolTermRest = 27,
    BoolFactor = 28,
    Cond = 29,
    CompOp = 30,
}

impl NonTerminal {
    pub const COUNT: usize = 31;

    pub const ALL: [NonTerminal; NonTerminal::COUNT] = [
        NonTerminal::Program,
        NonTerminal::FuncDecls,
        NonTerminal::FuncDecl,
        NonTerminal::FuncName,
        NonTerminal::Params,
        NonTerminal::ParamsRest,
        NonTerminal::Decls,
        NonTerminal::Decl,
        NonTerminal::Type,
        NonTerminal::VarList,
        NonTerminal::VarListRest,
        NonTerminal::StmtSeq,
        NonTerminal::StmtSeqRest,
        NonTerminal::Stmt,
        NonTerminal::ElsePart,
        NonTerminal::Var,
        NonTerminal::Expr,
        NonTerminal::ExprRest,
        NonTerminal::Term,
        NonTerminal::TermRest,
        NonTerminal::Factor,
        NonTerminal::FactorRest,
        NonTerminal::Args,
        NonTerminal::ArgsRest,
        NonTerminal::BoolExpr,
        NonTerminal::BoolExprRest,
        NonTerminal::BoolTerm,
        NonTerminal::BoolTermRest,
        NonTerminal::BoolFactor,
        NonTerminal::Cond,
        NonTerminal::CompOp,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Program => "Program",
            NonTerminal::FuncDecls => "FuncDecls",
            NonTerminal::FuncDecl => "FuncDecl",
            NonTerminal::FuncName => "FuncName",
            NonTerminal::Params => "Params",
            NonTerminal::ParamsRest => "ParamsRest",
            NonTerminal::Decls => "Decls",
            NonTerminal::Decl => "Decl",
            NonTerminal::Type => "Type",
            NonTerminal::VarList => "VarList",
            NonTerminal::VarListRest => "VarListRest",
            NonTerminal::StmtSeq => "StmtSeq",
            NonTerminal::StmtSeqRest => "StmtSeqRest",
            NonTerminal::Stmt => "Stmt",
            NonTerminal::ElsePart => "ElsePart",
            NonTerminal::Var => "Var",
            NonTerminal::Expr => "Expr",
            NonTerminal::ExprRest => "ExprRest",
            NonTerminal::Term => "Term",
            NonTerminal::TermRest => "TermRest",
            NonTerminal::Factor => "Factor",
            NonTerminal::FactorRest => "FactorRest",
            NonTerminal::Args => "Args",
            NonTerminal::ArgsRest => "ArgsRest",
            NonTerminal::BoolExpr => "BoolExpr",
            NonTerminal::BoolExprRest => "BoolExprRest",
            NonTerminal::BoolTerm => "BoolTerm",
            NonTerminal::BoolTermRest => "BoolTermRest",
            NonTerminal::BoolFactor => "BoolFactor",
            NonTerminal::Cond => "Cond",
            NonTerminal::CompOp => "CompOp",
        }
    }
}

/// A grammar symbol as stored on an AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Decode one sign-encoded production entry
    ///
    /// Non-negative entries are terminal ids, negative entries are nonterminal
    /// ids. The start symbol never appears on a right-hand side, so `0` is
    /// always the `def` terminal.
    pub fn decode(entry: i8) -> Option<Self> {
        if entry >= 0 {
            Terminal::from_id(entry as usize).map(Symbol::Terminal)
        } else {
            NonTerminal::from_id(entry.unsigned_abs() as usize).map(Symbol::NonTerminal)
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Terminal(t) => t.name(),
            Symbol::NonTerminal(n) => n.name(),
        }
    }
}
