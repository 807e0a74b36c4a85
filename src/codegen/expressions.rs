use super::{Operand, TacError, TacGenerator};
use crate::ast::NodeId;
use crate::grammar::{ProductionId, Terminal};
use crate::semantic::ValueType;

// Expression lowering; every method returns the operand holding the result
impl<'a> TacGenerator<'a> {
    // Expr: Term ExprRest, ExprRest: (+|-) Term ExprRest | epsilon
    pub(super) fn expression(&mut self, id: NodeId) -> Result<Operand, TacError> {
        let mut left = self.term(self.child(id, 0)?)?;
        let mut rest = self.child(id, 1)?;
        while !self.is_epsilon(rest)? {
            let op = self.terminal(self.child(rest, 0)?)?;
            let right = self.term(self.child(rest, 1)?)?;
            left = self.binary(&left, op.name(), &right, left.value_type);
            rest = self.child(rest, 2)?;
        }
        Ok(left)
    }

    // Term: Factor TermRest, TermRest: (*|/|%) Factor TermRest | epsilon
    fn term(&mut self, id: NodeId) -> Result<Operand, TacError> {
        let mut left = self.factor(self.child(id, 0)?)?;
        let mut rest = self.child(id, 1)?;
        while !self.is_epsilon(rest)? {
            let op = self.terminal(self.child(rest, 0)?)?;
            let right = self.factor(self.child(rest, 1)?)?;
            left = self.binary(&left, op.name(), &right, left.value_type);
            rest = self.child(rest, 2)?;
        }
        Ok(left)
    }

    fn factor(&mut self, id: NodeId) -> Result<Operand, TacError> {
        match self.production(id)? {
            ProductionId::FACTOR_ID => {
                let ident = self.child(id, 0)?;
                let name = self.lexeme(ident)?;
                let value_type = self.ast.node(ident).value_type.unwrap_or(ValueType::Int);

                let rest = self.child(id, 1)?;
                if self.production(rest)? == ProductionId::CALL {
                    self.call(name, value_type, self.child(rest, 1)?)
                } else {
                    Ok(Operand::new(name, value_type))
                }
            }
            ProductionId::FACTOR_INTEGER => self.literal(id, ValueType::Int),
            ProductionId::FACTOR_REAL => self.literal(id, ValueType::Real),
            ProductionId::FACTOR_PAREN => self.expression(self.child(id, 1)?),
            other => Err(TacError::new(
                format!("production {} is not a factor", other),
                id,
            )),
        }
    }

    fn literal(&mut self, id: NodeId, value_type: ValueType) -> Result<Operand, TacError> {
        let text = self.lexeme(self.child(id, 0)?)?;
        let temp = self.temp(value_type);
        self.emit(format!("{} = {}", temp, text));
        Ok(Operand::new(temp, value_type))
    }

    // Arguments left to right, pushed right to left
    fn call(
        &mut self,
        name: &str,
        return_type: ValueType,
        args: NodeId,
    ) -> Result<Operand, TacError> {
        let mut values = Vec::new();
        if self.production(args)? == ProductionId::ARGS {
            values.push(self.expression(self.child(args, 0)?)?);
            let mut rest = self.child(args, 1)?;
            while self.production(rest)? == ProductionId::MORE_ARGS {
                values.push(self.expression(self.child(rest, 1)?)?);
                rest = self.child(rest, 2)?;
            }
        }

        let mut bytes = 0;
        for value in values.iter().rev() {
            self.emit(format!("PushParam {}", value.name));
            bytes += value.value_type.size();
        }

        let temp = self.temp(return_type);
        self.emit(format!("{} = LCall {}", temp, name));
        self.emit(format!("PopParams {}", bytes));
        Ok(Operand::new(temp, return_type))
    }

    fn binary(&mut self, left: &Operand, op: &str, right: &Operand, value_type: ValueType) -> Operand {
        let temp = self.temp(value_type);
        self.emit(format!("{} = {} {} {}", temp, left.name, op, right.name));
        Operand::new(temp, value_type)
    }

    // ========== Conditions ==========

    // BoolExpr: BoolTerm BoolExprRest, BoolExprRest: or BoolTerm BoolExprRest | epsilon
    pub(super) fn bool_expression(&mut self, id: NodeId) -> Result<Operand, TacError> {
        let mut left = self.bool_term(self.child(id, 0)?)?;
        let mut rest = self.child(id, 1)?;
        while !self.is_epsilon(rest)? {
            let right = self.bool_term(self.child(rest, 1)?)?;
            left = self.binary(&left, "||", &right, ValueType::Int);
            rest = self.child(rest, 2)?;
        }
        Ok(left)
    }

    // BoolTerm: BoolFactor BoolTermRest, BoolTermRest: and BoolFactor BoolTermRest | epsilon
    fn bool_term(&mut self, id: NodeId) -> Result<Operand, TacError> {
        let mut left = self.bool_factor(self.child(id, 0)?)?;
        let mut rest = self.child(id, 1)?;
        while !self.is_epsilon(rest)? {
            let right = self.bool_factor(self.child(rest, 1)?)?;
            left = self.binary(&left, "&&", &right, ValueType::Int);
            rest = self.child(rest, 2)?;
        }
        Ok(left)
    }

    fn bool_factor(&mut self, id: NodeId) -> Result<Operand, TacError> {
        match self.production(id)? {
            ProductionId::NOT => {
                let operand = self.bool_factor(self.child(id, 1)?)?;
                let temp = self.temp(ValueType::Int);
                self.emit(format!("{} = !{}", temp, operand.name));
                Ok(Operand::new(temp, ValueType::Int))
            }
            ProductionId::PAREN_COND => self.condition(self.child(id, 1)?),
            other => Err(TacError::new(
                format!("production {} is not a condition", other),
                id,
            )),
        }
    }

    // Cond: Expr CompOp Expr; <=, >= and <> take two comparisons and an or
    fn condition(&mut self, id: NodeId) -> Result<Operand, TacError> {
        let left = self.expression(self.child(id, 0)?)?;
        let op = self.terminal(self.child(self.child(id, 1)?, 0)?)?;
        let right = self.expression(self.child(id, 2)?)?;

        let (first, second) = match op {
            Terminal::Lt | Terminal::Gt | Terminal::Eq => {
                return Ok(self.binary(&left, op.name(), &right, ValueType::Int));
            }
            Terminal::Ge => (">", "=="),
            Terminal::Le => ("<", "=="),
            Terminal::Ne => ("<", ">"),
            other => {
                return Err(TacError::new(
                    format!("'{}' is not a comparison", other.name()),
                    id,
                ));
            }
        };

        let a = self.binary(&left, first, &right, ValueType::Int);
        let b = self.binary(&left, second, &right, ValueType::Int);
        Ok(self.binary(&a, "||", &b, ValueType::Int))
    }
}
