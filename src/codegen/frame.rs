use crate::semantic::ValueType;

/// Stack frame of one function block
///
/// Temporaries are numbered from `t0` in every block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    params: usize,
    locals: usize,
    temps: usize,
    temp_count: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_param(&mut self, value_type: ValueType) {
        self.params += value_type.size();
    }

    pub fn add_local(&mut self, value_type: ValueType) {
        self.locals += value_type.size();
    }

    /// Allocate the next temporary
    pub fn temp(&mut self, value_type: ValueType) -> String {
        let name = format!("t{}", self.temp_count);
        self.temp_count += 1;
        self.temps += value_type.size();
        name
    }

    pub fn temp_count(&self) -> usize {
        self.temp_count
    }

    /// Bytes for parameters, locals and temporaries
    pub fn size(&self) -> usize {
        self.params + self.locals + self.temps
    }
}
