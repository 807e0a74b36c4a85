use super::{NonTerminal, Symbol};
use super::NonTerminal as N;

/// Index into [`PRODUCTIONS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(pub u8);

impl ProductionId {
    pub const PROGRAM: Self = Self(0);
    pub const FUNC_DECL: Self = Self(3);
    pub const PARAMS_EMPTY: Self = Self(6);
    pub const VAR_LIST: Self = Self(14);
    pub const ASSIGN: Self = Self(20);
    pub const IF: Self = Self(21);
    pub const WHILE: Self = Self(22);
    pub const PRINT: Self = Self(23);
    pub const RETURN: Self = Self(24);
    pub const EMPTY_STMT: Self = Self(25);
    pub const ELSE: Self = Self(26);
    pub const ADD: Self = Self(30);
    pub const SUB: Self = Self(31);
    pub const MUL: Self = Self(34);
    pub const DIV: Self = Self(35);
    pub const MOD: Self = Self(36);
    pub const FACTOR_ID: Self = Self(38);
    pub const FACTOR_INTEGER: Self = Self(39);
    pub const FACTOR_REAL: Self = Self(40);
    pub const FACTOR_PAREN: Self = Self(41);
    pub const CALL: Self = Self(42);
    pub const NO_CALL: Self = Self(43);
    pub const ARGS: Self = Self(44);
    pub const NO_ARGS: Self = Self(45);
    pub const MORE_ARGS: Self = Self(46);
    pub const END_ARGS: Self = Self(47);
    pub const OR: Self = Self(49);
    pub const AND: Self = Self(52);
    pub const NOT: Self = Self(54);
    pub const PAREN_COND: Self = Self(55);
    pub const COND: Self = Self(56);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ProductionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One grammar rule; the right-hand side is sign-encoded
#[derive(Debug)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: &'static [i8],
}

impl Production {
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.rhs.iter().filter_map(|&e| Symbol::decode(e))
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

pub fn production(id: ProductionId) -> Option<&'static Production> {
    PRODUCTIONS.get(id.index())
}

// Terminal entries
const DEF: i8 = 0;
const FED: i8 = 1;
const ID: i8 = 2;
const INT: i8 = 3;
const DOUBLE: i8 = 4;
const IF: i8 = 5;
const THEN: i8 = 6;
const ELSE: i8 = 7;
const FI: i8 = 8;
const WHILE: i8 = 9;
const DO: i8 = 10;
const OD: i8 = 11;
const PRINT: i8 = 12;
const RETURN: i8 = 13;
const LT: i8 = 14;
const GT: i8 = 15;
const EQ: i8 = 16;
const LE: i8 = 17;
const GE: i8 = 18;
const NE: i8 = 19;
const ASSIGN: i8 = 20;
const LPAREN: i8 = 23;
const RPAREN: i8 = 24;
const SEMI: i8 = 25;
const COMMA: i8 = 26;
const INTEGER: i8 = 27;
const REAL: i8 = 28;
const PLUS: i8 = 29;
const MINUS: i8 = 30;
const STAR: i8 = 31;
const SLASH: i8 = 32;
const PERCENT: i8 = 33;
const OR: i8 = 34;
const AND: i8 = 35;
const NOT: i8 = 36;
const EPS: i8 = 37;

// Nonterminal entries
const FUNC_DECLS: i8 = -1;
const FUNC_DECL: i8 = -2;
const FUNC_NAME: i8 = -3;
const PARAMS: i8 = -4;
const PARAMS_REST: i8 = -5;
const DECLS: i8 = -6;
const DECL: i8 = -7;
const TYPE: i8 = -8;
const VAR_LIST: i8 = -9;
const VAR_LIST_REST: i8 = -10;
const STMT_SEQ: i8 = -11;
const STMT_SEQ_REST: i8 = -12;
const STMT: i8 = -13;
const ELSE_PART: i8 = -14;
const VAR: i8 = -15;
const EXPR: i8 = -16;
const EXPR_REST: i8 = -17;
const TERM: i8 = -18;
const TERM_REST: i8 = -19;
const FACTOR: i8 = -20;
const FACTOR_REST: i8 = -21;
const ARGS: i8 = -22;
const ARGS_REST: i8 = -23;
const BOOL_EXPR: i8 = -24;
const BOOL_EXPR_REST: i8 = -25;
const BOOL_TERM: i8 = -26;
const BOOL_TERM_REST: i8 = -27;
const BOOL_FACTOR: i8 = -28;
const COND: i8 = -29;
const COMP_OP: i8 = -30;

const fn p(lhs: NonTerminal, rhs: &'static [i8]) -> Production {
    Production { lhs, rhs }
}

pub static PRODUCTIONS: [Production; 63] = [
    p(N::Program, &[FUNC_DECLS, DECLS, STMT_SEQ]),
    p(N::FuncDecls, &[FUNC_DECL, SEMI, FUNC_DECLS]),
    p(N::FuncDecls, &[EPS]),
    p(
        N::FuncDecl,
        &[DEF, TYPE, FUNC_NAME, LPAREN, PARAMS, RPAREN, DECLS, STMT_SEQ, FED],
    ),
    p(N::FuncName, &[ID]),
    // 5
    p(N::Params, &[TYPE, ID, PARAMS_REST]),
    p(N::Params, &[EPS]),
    p(N::ParamsRest, &[COMMA, TYPE, ID, PARAMS_REST]),
    p(N::ParamsRest, &[EPS]),
    p(N::Decls, &[DECL, SEMI, DECLS]),
    // 10
    p(N::Decls, &[EPS]),
    p(N::Decl, &[TYPE, VAR_LIST]),
    p(N::Type, &[INT]),
    p(N::Type, &[DOUBLE]),
    p(N::VarList, &[ID, VAR_LIST_REST]),
    // 15
    p(N::VarListRest, &[COMMA, VAR_LIST]),
    p(N::VarListRest, &[EPS]),
    p(N::StmtSeq, &[STMT, STMT_SEQ_REST]),
    p(N::StmtSeqRest, &[SEMI, STMT_SEQ]),
    p(N::StmtSeqRest, &[EPS]),
    // 20
    p(N::Stmt, &[VAR, ASSIGN, EXPR]),
    p(N::Stmt, &[IF, BOOL_EXPR, THEN, STMT_SEQ, ELSE_PART, FI]),
    p(N::Stmt, &[WHILE, BOOL_EXPR, DO, STMT_SEQ, OD]),
    p(N::Stmt, &[PRINT, EXPR]),
    p(N::Stmt, &[RETURN, EXPR]),
    // 25
    p(N::Stmt, &[EPS]),
    p(N::ElsePart, &[ELSE, STMT_SEQ]),
    p(N::ElsePart, &[EPS]),
    p(N::Var, &[ID]),
    p(N::Expr, &[TERM, EXPR_REST]),
    // 30
    p(N::ExprRest, &[PLUS, TERM, EXPR_REST]),
    p(N::ExprRest, &[MINUS, TERM, EXPR_REST]),
    p(N::ExprRest, &[EPS]),
    p(N::Term, &[FACTOR, TERM_REST]),
    p(N::TermRest, &[STAR, FACTOR, TERM_REST]),
    // 35
    p(N::TermRest, &[SLASH, FACTOR, TERM_REST]),
    p(N::TermRest, &[PERCENT, FACTOR, TERM_REST]),
    p(N::TermRest, &[EPS]),
    p(N::Factor, &[ID, FACTOR_REST]),
    p(N::Factor, &[INTEGER]),
    // 40
    p(N::Factor, &[REAL]),
    p(N::Factor, &[LPAREN, EXPR, RPAREN]),
    p(N::FactorRest, &[LPAREN, ARGS, RPAREN]),
    p(N::FactorRest, &[EPS]),
    p(N::Args, &[EXPR, ARGS_REST]),
    // 45
    p(N::Args, &[EPS]),
    p(N::ArgsRest, &[COMMA, EXPR, ARGS_REST]),
    p(N::ArgsRest, &[EPS]),
    p(N::BoolExpr, &[BOOL_TERM, BOOL_EXPR_REST]),
    p(N::BoolExprRest, &[OR, BOOL_TERM, BOOL_EXPR_REST]),
    // 50
    p(N::BoolExprRest, &[EPS]),
    p(N::BoolTerm, &[BOOL_FACTOR, BOOL_TERM_REST]),
    p(N::BoolTermRest, &[AND, BOOL_FACTOR, BOOL_TERM_REST]),
    p(N::BoolTermRest, &[EPS]),
    p(N::BoolFactor, &[NOT, BOOL_FACTOR]),
    // 55
    p(N::BoolFactor, &[LPAREN, COND, RPAREN]),
    p(N::Cond, &[EXPR, COMP_OP, EXPR]),
    p(N::CompOp, &[LT]),
    p(N::CompOp, &[GT]),
    p(N::CompOp, &[EQ]),
    // 60
    p(N::CompOp, &[LE]),
    p(N::CompOp, &[GE]),
    p(N::CompOp, &[NE]),
];
