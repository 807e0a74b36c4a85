use super::{NonTerminal, ProductionId, Terminal};

use super::NonTerminal as N;
use super::Terminal as T;

/// LL(1) lookup keyed by (terminal, nonterminal)
#[derive(Debug, Clone)]
pub struct ParseTable {
    cells: [[Option<ProductionId>; NonTerminal::COUNT]; Terminal::COUNT],
}

/// Two entries claimed the same cell
#[derive(Debug, Clone, PartialEq)]
pub struct TableConflict {
    pub terminal: Terminal,
    pub nonterminal: NonTerminal,
    pub existing: ProductionId,
    pub incoming: ProductionId,
}

impl std::fmt::Display for TableConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Table conflict at ({}, {}): production {} vs {}",
            self.terminal.name(),
            self.nonterminal.name(),
            self.existing,
            self.incoming
        )
    }
}

impl std::error::Error for TableConflict {}

pub type Entry = (NonTerminal, &'static [Terminal], u8);

const STMT_FOLLOW: &[Terminal] = &[T::Semicolon, T::Epsilon, T::Fed, T::Else, T::Fi, T::Od];

const STMT_SEQ_FOLLOW: &[Terminal] = &[T::Epsilon, T::Fed, T::Else, T::Fi, T::Od];

const EXPR_FIRST: &[Terminal] = &[T::Id, T::IntegerLit, T::RealLit, T::LParen];

const EXPR_FOLLOW: &[Terminal] = &[
    T::Semicolon,
    T::Epsilon,
    T::Fed,
    T::Else,
    T::Fi,
    T::Od,
    T::RParen,
    T::Comma,
    T::Lt,
    T::Gt,
    T::Eq,
    T::Le,
    T::Ge,
    T::Ne,
];

const TERM_FOLLOW: &[Terminal] = &[
    T::Plus,
    T::Minus,
    T::Semicolon,
    T::Epsilon,
    T::Fed,
    T::Else,
    T::Fi,
    T::Od,
    T::RParen,
    T::Comma,
    T::Lt,
    T::Gt,
    T::Eq,
    T::Le,
    T::Ge,
    T::Ne,
];

const FACTOR_FOLLOW: &[Terminal] = &[
    T::Star,
    T::Slash,
    T::Percent,
    T::Plus,
    T::Minus,
    T::Semicolon,
    T::Epsilon,
    T::Fed,
    T::Else,
    T::Fi,
    T::Od,
    T::RParen,
    T::Comma,
    T::Lt,
    T::Gt,
    T::Eq,
    T::Le,
    T::Ge,
    T::Ne,
];

pub const STANDARD_ENTRIES: &[Entry] = &[
    (
        N::Program,
        &[
            T::Def,
            T::Int,
            T::Double,
            T::Id,
            T::If,
            T::While,
            T::Print,
            T::Return,
            T::Semicolon,
            T::Epsilon,
        ],
        0,
    ),
    (N::FuncDecls, &[T::Def], 1),
    (
        N::FuncDecls,
        &[
            T::Int,
            T::Double,
            T::Id,
            T::If,
            T::While,
            T::Print,
            T::Return,
            T::Semicolon,
            T::Epsilon,
        ],
        2,
    ),
    (N::FuncDecl, &[T::Def], 3),
    (N::FuncName, &[T::Id], 4),
    (N::Params, &[T::Int, T::Double], 5),
    (N::Params, &[T::RParen], 6),
    (N::ParamsRest, &[T::Comma], 7),
    (N::ParamsRest, &[T::RParen], 8),
    (N::Decls, &[T::Int, T::Double], 9),
    (
        N::Decls,
        &[
            T::Id,
            T::If,
            T::While,
            T::Print,
            T::Return,
            T::Semicolon,
            T::Epsilon,
            T::Fed,
        ],
        10,
    ),
    (N::Decl, &[T::Int, T::Double], 11),
    (N::Type, &[T::Int], 12),
    (N::Type, &[T::Double], 13),
    (N::VarList, &[T::Id], 14),
    (N::VarListRest, &[T::Comma], 15),
    (N::VarListRest, &[T::Semicolon], 16),
    (
        N::StmtSeq,
        &[
            T::Id,
            T::If,
            T::While,
            T::Print,
            T::Return,
            T::Semicolon,
            T::Epsilon,
            T::Fed,
            T::Else,
            T::Fi,
            T::Od,
        ],
        17,
    ),
    (N::StmtSeqRest, &[T::Semicolon], 18),
    (N::StmtSeqRest, STMT_SEQ_FOLLOW, 19),
    (N::Stmt, &[T::Id], 20),
    (N::Stmt, &[T::If], 21),
    (N::Stmt, &[T::While], 22),
    (N::Stmt, &[T::Print], 23),
    (N::Stmt, &[T::Return], 24),
    (N::Stmt, STMT_FOLLOW, 25),
    (N::ElsePart, &[T::Else], 26),
    (N::ElsePart, &[T::Fi], 27),
    (N::Var, &[T::Id], 28),
    (N::Expr, EXPR_FIRST, 29),
    (N::ExprRest, &[T::Plus], 30),
    (N::ExprRest, &[T::Minus], 31),
    (N::ExprRest, EXPR_FOLLOW, 32),
    (N::Term, EXPR_FIRST, 33),
    (N::TermRest, &[T::Star], 34),
    (N::TermRest, &[T::Slash], 35),
    (N::TermRest, &[T::Percent], 36),
    (N::TermRest, TERM_FOLLOW, 37),
    (N::Factor, &[T::Id], 38),
    (N::Factor, &[T::IntegerLit], 39),
    (N::Factor, &[T::RealLit], 40),
    (N::Factor, &[T::LParen], 41),
    (N::FactorRest, &[T::LParen], 42),
    (N::FactorRest, FACTOR_FOLLOW, 43),
    (N::Args, EXPR_FIRST, 44),
    (N::Args, &[T::RParen], 45),
    (N::ArgsRest, &[T::Comma], 46),
    (N::ArgsRest, &[T::RParen], 47),
    (N::BoolExpr, &[T::Not, T::LParen], 48),
    (N::BoolExprRest, &[T::Or], 49),
    (N::BoolExprRest, &[T::Then, T::Do], 50),
    (N::BoolTerm, &[T::Not, T::LParen], 51),
    (N::BoolTermRest, &[T::And], 52),
    (N::BoolTermRest, &[T::Or, T::Then, T::Do], 53),
    (N::BoolFactor, &[T::Not], 54),
    (N::BoolFactor, &[T::LParen], 55),
    (N::Cond, EXPR_FIRST, 56),
    (N::CompOp, &[T::Lt], 57),
    (N::CompOp, &[T::Gt], 58),
    (N::CompOp, &[T::Eq], 59),
    (N::CompOp, &[T::Le], 60),
    (N::CompOp, &[T::Ge], 61),
    (N::CompOp, &[T::Ne], 62),
];

impl ParseTable {
    /// The table for the fixed language grammar
    pub fn standard() -> Self {
        let (table, conflicts) = Self::fill(STANDARD_ENTRIES);
        for conflict in &conflicts {
            log::error!("{}", conflict);
        }
        table
    }

    /// Build from entries, rejecting any cell written twice
    pub fn from_entries(entries: &[Entry]) -> Result<Self, TableConflict> {
        let (table, conflicts) = Self::fill(entries);
        match conflicts.into_iter().next() {
            Some(conflict) => Err(conflict),
            None => Ok(table),
        }
    }

    fn fill(entries: &[Entry]) -> (Self, Vec<TableConflict>) {
        let mut cells = [[None; NonTerminal::COUNT]; Terminal::COUNT];
        let mut conflicts = Vec::new();

        for &(nonterminal, terminals, prod) in entries {
            let incoming = ProductionId(prod);
            for &terminal in terminals {
                let cell = &mut cells[terminal.id()][nonterminal.id()];
                match *cell {
                    Some(existing) if existing != incoming => conflicts.push(TableConflict {
                        terminal,
                        nonterminal,
                        existing,
                        incoming,
                    }),
                    _ => *cell = Some(incoming),
                }
            }
        }

        (Self { cells }, conflicts)
    }

    pub fn lookup(&self, terminal: Terminal, nonterminal: NonTerminal) -> Option<ProductionId> {
        self.cells[terminal.id()][nonterminal.id()]
    }
}

impl Default for ParseTable {
    fn default() -> Self {
        Self::standard()
    }
}
