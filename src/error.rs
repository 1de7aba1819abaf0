use super::*;

#[derive(Debug, Clone)]
pub enum HdlError {
    /// A character the lexer does not recognize, or an unterminated comment.
    Lexical(Loc, String),
    Parse(Loc, String),
    /// A chip name that is neither in the workspace nor in the built-in catalog,
    /// or a chip that is (indirectly) made out of itself.
    Resolution(Loc, String),
    Runtime(String),
    Io(std::path::PathBuf, String),
}

impl HdlError {
    pub fn parse<S: Into<String>>(loc: &Loc, message: S) -> HdlError {
        HdlError::Parse(loc.clone(), message.into())
    }

    pub fn runtime<S: Into<String>>(message: S) -> HdlError {
        HdlError::Runtime(message.into())
    }
}

impl std::fmt::Display for HdlError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let HdlError::Lexical(loc, _) | HdlError::Parse(loc, _) | HdlError::Resolution(loc, _) = self {
            if !loc.is_unknown() {
                write!(f, "{loc}: ")?;
            }
        }
        match self {
            HdlError::Lexical(_loc, message) => write!(f, "Lexical error: {message}"),
            HdlError::Parse(_loc, message) => write!(f, "Parse error: {message}"),
            HdlError::Resolution(_loc, message) => write!(f, "{message}"),
            HdlError::Runtime(message) => write!(f, "{message}"),
            HdlError::Io(path, message) => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for HdlError {}

impl HasLoc for HdlError {
    fn loc(&self) -> Loc {
        match self {
            HdlError::Lexical(loc, _message) => loc.clone(),
            HdlError::Parse(loc, _message) => loc.clone(),
            HdlError::Resolution(loc, _message) => loc.clone(),
            HdlError::Runtime(_message) => Loc::unknown(),
            HdlError::Io(_path, _message) => Loc::unknown(),
        }
    }
}
