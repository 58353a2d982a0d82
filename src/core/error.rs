use std::fmt;

/// Error kinds surfaced by the evaluator. Internal marks a parser/evaluator
/// contract mismatch and should never be reachable from user programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Type,
    Lookup,
    Argument,
    Internal,
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeErrorKind::Type => "type error",
            RuntimeErrorKind::Lookup => "lookup error",
            RuntimeErrorKind::Argument => "argument error",
            RuntimeErrorKind::Internal => "internal error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl RuntimeError {
    fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), line: None, column: None }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Type, message)
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Lookup, message)
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Argument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Internal, message)
    }

    /// Attach a source position if none was recorded closer to the fault.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
            self.column = Some(column);
        }
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{}: {} at {}:{}", self.kind, self.message, line, column)
            }
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_when_present() {
        let err = RuntimeError::lookup("`甲` is not yet declared").at(3, 5);
        assert_eq!(format!("{}", err), "lookup error: `甲` is not yet declared at 3:5");
    }

    #[test]
    fn at_keeps_the_innermost_position() {
        let err = RuntimeError::type_error("x").at(1, 1).at(9, 9);
        assert_eq!(err.line, Some(1));
        assert_eq!(err.column, Some(1));
    }
}
