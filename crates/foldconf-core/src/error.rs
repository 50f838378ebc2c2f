//! Error types for foldconf
//!
//! Errors are structured: a kind, the `section.option` path they arose
//! from, an optional source location and an actionable help message.

use std::fmt;

/// Result type alias for foldconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for foldconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Option path where the error occurred (e.g., "web.url")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Section or option absent, default section included
    NotFound { section: String, option: String },
    /// A `%(name)s` or `${name}` reference has no value
    UnresolvedReference { name: String },
    /// Unfolding did not settle within the configured depth
    DepthExceeded { max_depth: usize },
    /// Numeric or boolean parse failure
    TypeConversion,
    /// Destination field kind the binder cannot fill
    UnsupportedType { kind: String },
    /// Malformed INI input
    Parse,
    /// I/O error (file not found, etc.)
    Io,
}

impl Error {
    fn of(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a not found error for a section/option pair
    pub fn not_found(section: impl Into<String>, option: impl Into<String>) -> Self {
        let section = section.into();
        let option = option.into();
        let path = format!("{}.{}", section, option);
        Self {
            help: Some(format!(
                "Define '{}' in section [{}] or in the default section",
                option, section
            )),
            path: Some(path),
            ..Self::of(ErrorKind::NotFound { section, option })
        }
    }

    /// Create a not found error for a whole section
    pub fn section_not_found(section: impl Into<String>) -> Self {
        let section = section.into();
        Self {
            path: Some(section.clone()),
            ..Self::of(ErrorKind::NotFound {
                section,
                option: String::new(),
            })
        }
    }

    /// Create an unresolved reference error
    pub fn unresolved_reference(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            help: Some(format!(
                "Define '{}' in the same section, the default section or the environment",
                name
            )),
            ..Self::of(ErrorKind::UnresolvedReference { name })
        }
    }

    /// Create a depth exceeded error
    pub fn depth_exceeded(max_depth: usize) -> Self {
        Self {
            help: Some("Break the self-reference in the option value".into()),
            ..Self::of(ErrorKind::DepthExceeded { max_depth })
        }
    }

    /// Create a type conversion error
    pub fn type_conversion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            cause: Some(message.into()),
            ..Self::of(ErrorKind::TypeConversion)
        }
    }

    /// Create an unsupported destination type error
    pub fn unsupported_type(kind: impl Into<String>) -> Self {
        Self {
            help: Some("Bind to an integer, bool, String or Vec of scalars".into()),
            ..Self::of(ErrorKind::UnsupportedType { kind: kind.into() })
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::of(ErrorKind::Parse)
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::of(ErrorKind::Io)
        }
    }

    /// Whether the error means the option simply is not there
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::NotFound { section, option } if option.is_empty() => {
                write!(f, "section not found: {}", section)?
            }
            ErrorKind::NotFound { option, .. } => write!(f, "not found: {}", option)?,
            ErrorKind::UnresolvedReference { name } => write!(f, "Option not found: {}", name)?,
            ErrorKind::DepthExceeded { max_depth } => write!(
                f,
                "Possible cycle while unfolding variables: max depth of {} reached",
                max_depth
            )?,
            ErrorKind::TypeConversion => write!(f, "Type conversion failed")?,
            ErrorKind::UnsupportedType { kind } => write!(f, "unsupported type: {}", kind)?,
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
