/// Pipeline stage an error originated from.
///
/// The stage doubles as the user-visible prefix of the message so a failed
/// run always says *where* it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Load,
    Parse,
    EmptyData,
    InsufficientData,
    Render,
    Export,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage | ErrorKind::Load | ErrorKind::Parse | ErrorKind::Export => 2,
            ErrorKind::EmptyData | ErrorKind::InsufficientData => 3,
            ErrorKind::Render => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage",
            ErrorKind::Load => "load",
            ErrorKind::Parse => "parse",
            ErrorKind::EmptyData => "empty data",
            ErrorKind::InsufficientData => "insufficient data",
            ErrorKind::Render => "render",
            ErrorKind::Export => "export",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.exit_code(),
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn empty_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyData, message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Render, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind.label(), self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failed_stage() {
        let err = AppError::parse("row 4: invalid date 'soon'");
        assert_eq!(err.to_string(), "parse error: row 4: invalid date 'soon'");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn data_shortage_errors_share_exit_code() {
        assert_eq!(AppError::empty_data("x").exit_code(), 3);
        assert_eq!(AppError::insufficient_data("x").exit_code(), 3);
        assert_eq!(AppError::insufficient_data("x").kind(), ErrorKind::InsufficientData);
    }
}
