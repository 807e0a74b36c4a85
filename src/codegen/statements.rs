use super::{TacError, TacGenerator};
use crate::ast::NodeId;
use crate::grammar::ProductionId;

// Statement lowering
impl<'a> TacGenerator<'a> {
    // StmtSeq: Stmt StmtSeqRest, StmtSeqRest: ; StmtSeq | epsilon
    pub(super) fn statements(&mut self, mut id: NodeId) -> Result<(), TacError> {
        loop {
            self.statement(self.child(id, 0)?)?;
            let rest = self.child(id, 1)?;
            if self.is_epsilon(rest)? {
                return Ok(());
            }
            id = self.child(rest, 1)?;
        }
    }

    fn statement(&mut self, id: NodeId) -> Result<(), TacError> {
        match self.production(id)? {
            ProductionId::ASSIGN => {
                let var = self.child(id, 0)?;
                let target = self.lexeme(self.child(var, 0)?)?;
                let value = self.expression(self.child(id, 2)?)?;
                self.emit(format!("{} = {}", target, value.name));
            }
            ProductionId::IF => {
                let condition = self.bool_expression(self.child(id, 1)?)?;
                let else_label = self.new_label();
                self.emit(format!("IfZ {} Goto {}", condition.name, else_label));
                self.statements(self.child(id, 3)?)?;

                let else_part = self.child(id, 4)?;
                if self.is_epsilon(else_part)? {
                    self.place_label(&else_label);
                } else {
                    let end_label = self.new_label();
                    self.emit(format!("Goto {}", end_label));
                    self.place_label(&else_label);
                    self.statements(self.child(else_part, 1)?)?;
                    self.place_label(&end_label);
                }
            }
            ProductionId::WHILE => {
                let top = self.new_label();
                let exit = self.new_label();
                self.place_label(&top);
                let condition = self.bool_expression(self.child(id, 1)?)?;
                self.emit(format!("IfZ {} Goto {}", condition.name, exit));
                self.statements(self.child(id, 3)?)?;
                self.emit(format!("Goto {}", top));
                self.place_label(&exit);
            }
            ProductionId::PRINT => {
                let value = self.expression(self.child(id, 1)?)?;
                self.emit(format!("Print {}", value.name));
            }
            ProductionId::RETURN => {
                let value = self.expression(self.child(id, 1)?)?;
                self.emit(format!("Return {}", value.name));
            }
            ProductionId::EMPTY_STMT => {}
            other => {
                return Err(TacError::new(
                    format!("production {} is not a statement", other),
                    id,
                ));
            }
        }
        Ok(())
    }
}
