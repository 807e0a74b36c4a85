use super::ValueType;

/// Type-compatibility window scoped to one statement or condition
///
/// `depth` counts tree levels between the parse position and the node that
/// opened the window, plus one. Descending widens it, ascending narrows it, and
/// reaching zero forgets the type seen so far.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TypeWindow {
    depth: usize,
    flag: Option<ValueType>,
}

/// Outcome of checking one operand against the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unify {
    Seeded,
    Matches,
    Mismatch,
}

impl TypeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn flag(&self) -> Option<ValueType> {
        self.flag
    }

    /// Open a window if none is open; true when this call opened it
    ///
    /// The opening production is entered one level below the statement node,
    /// so the window starts two levels deep.
    pub fn open(&mut self) -> bool {
        if self.depth == 0 {
            self.depth = 2;
            true
        } else {
            false
        }
    }

    pub fn descend(&mut self) {
        if self.depth > 0 {
            self.depth += 1;
        }
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.flag = None;
        }
    }

    /// Seed the flag with the first type seen, or compare against it
    pub fn unify(&mut self, value_type: ValueType) -> Unify {
        match self.flag {
            None => {
                self.flag = Some(value_type);
                Unify::Seeded
            }
            Some(flag) if flag == value_type => Unify::Matches,
            Some(_) => Unify::Mismatch,
        }
    }

    pub fn reset(&mut self) {
        self.depth = 0;
        self.flag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_window_ignores_descents() {
        let mut window = TypeWindow::new();
        window.descend();
        assert_eq!(window.depth(), 0);
        assert!(!window.is_open());
    }

    #[test]
    fn test_open_only_once() {
        let mut window = TypeWindow::new();
        assert!(window.open());
        assert!(!window.open());
        assert_eq!(window.depth(), 2);
    }

    #[test]
    fn test_flag_survives_until_depth_zero() {
        let mut window = TypeWindow::new();
        window.open();
        window.descend();
        assert_eq!(window.unify(ValueType::Int), Unify::Seeded);
        window.ascend();
        window.ascend();
        assert_eq!(window.flag(), Some(ValueType::Int));
        assert_eq!(window.unify(ValueType::Real), Unify::Mismatch);
        window.ascend();
        assert_eq!(window.flag(), None);
        assert!(!window.is_open());
    }

    #[test]
    fn test_reset() {
        let mut window = TypeWindow::new();
        window.open();
        window.unify(ValueType::Real);
        window.reset();
        assert_eq!(window, TypeWindow::new());
        assert_eq!(window.unify(ValueType::Int), Unify::Seeded);
    }
}
