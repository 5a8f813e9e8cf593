//! Per-tag scope state
//!
//! A tag opened on some line keeps applying to following lines while its
//! scope is active. Indentation scopes record the indent width of the line
//! that opened them; heading scopes record the heading level.

/// Scope of one tag: closed, or open at a recorded level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Inactive,
    ActiveAt(usize),
}

impl Scope {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::ActiveAt(_))
    }

    /// Indentation transition for a line of width `indent`
    ///
    /// Closes the scope unless the line is strictly deeper than the level it
    /// was opened at. Returns whether the line lies inside the scope.
    pub fn enter_line(&mut self, indent: usize) -> bool {
        match *self {
            Self::ActiveAt(level) if indent > level => true,
            Self::ActiveAt(_) => {
                *self = Self::Inactive;
                false
            }
            Self::Inactive => false,
        }
    }

    /// Heading transition for a heading of level `heading`
    ///
    /// A heading at the same or a more prominent level (smaller number)
    /// than the recorded one closes the scope.
    pub fn enter_heading(&mut self, heading: usize) {
        if let Self::ActiveAt(level) = *self
            && level >= heading
        {
            *self = Self::Inactive;
        }
    }

    /// Open an indentation scope; an already open scope keeps its level
    pub fn open_indent(&mut self, indent: usize) {
        if *self == Self::Inactive {
            *self = Self::ActiveAt(indent);
        }
    }

    /// Open or widen a heading scope; keeps the most prominent level
    pub fn open_heading(&mut self, heading: usize) {
        match *self {
            Self::ActiveAt(level) if level <= heading => {}
            _ => *self = Self::ActiveAt(heading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deeper_line_stays_inside() {
        let mut scope = Scope::ActiveAt(2);
        assert!(scope.enter_line(4));
        assert_eq!(scope, Scope::ActiveAt(2));
    }

    #[test]
    fn test_equal_or_shallower_line_closes() {
        let mut scope = Scope::ActiveAt(2);
        assert!(!scope.enter_line(2));
        assert_eq!(scope, Scope::Inactive);

        let mut scope = Scope::ActiveAt(2);
        assert!(!scope.enter_line(0));
        assert!(!scope.is_active());
    }

    #[test]
    fn test_inactive_never_inside() {
        let mut scope = Scope::Inactive;
        assert!(!scope.enter_line(10));
        assert_eq!(scope, Scope::Inactive);
    }

    #[test]
    fn test_heading_transitions() {
        let mut scope = Scope::ActiveAt(2);
        scope.enter_heading(3);
        assert_eq!(scope, Scope::ActiveAt(2));
        scope.enter_heading(2);
        assert_eq!(scope, Scope::Inactive);

        let mut scope = Scope::ActiveAt(2);
        scope.enter_heading(1);
        assert_eq!(scope, Scope::Inactive);
    }

    #[test]
    fn test_open_indent_keeps_existing_level() {
        let mut scope = Scope::Inactive;
        scope.open_indent(4);
        assert_eq!(scope, Scope::ActiveAt(4));
        scope.open_indent(8);
        assert_eq!(scope, Scope::ActiveAt(4));
    }

    #[test]
    fn test_open_heading_keeps_most_prominent() {
        let mut scope = Scope::Inactive;
        scope.open_heading(3);
        assert_eq!(scope, Scope::ActiveAt(3));
        scope.open_heading(4);
        assert_eq!(scope, Scope::ActiveAt(3));
        scope.open_heading(1);
        assert_eq!(scope, Scope::ActiveAt(1));
    }
}
