use miette::SourceSpan;
use smol_str::SmolStr;

/// Parsing error for atproto string types.
///
/// `spec` refers to the final url path segment on atproto.com/specs,
/// detailing the specification for the type
/// `input` is the source string, or part of it
/// `kind` is the type of parsing error: `[StrParseKind]`
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("error in `{input}`: {kind}")]
#[diagnostic(url("https://atproto.com/specs/{spec}"))]
pub struct AtStrError {
    /// Spec page describing the expected format
    pub spec: SmolStr,
    /// The offending input
    #[source_code]
    pub input: String,
    /// What went wrong
    #[source]
    #[diagnostic_source]
    pub kind: StrParseKind,
}

impl AtStrError {
    /// Input exceeded the maximum length for the type
    pub fn too_long(spec: &'static str, input: &str, max: usize, actual: usize) -> Self {
        Self {
            spec: SmolStr::new_static(spec),
            input: input.to_string(),
            kind: StrParseKind::TooLong { max, actual },
        }
    }

    /// Input had fewer components than the type requires
    pub fn too_short(spec: &'static str, input: &str, min: usize, actual: usize) -> Self {
        Self {
            spec: SmolStr::new_static(spec),
            input: input.to_string(),
            kind: StrParseKind::TooShort { min, actual },
        }
    }

    /// missing component, with the span where it was expected to be found
    pub fn missing_from(
        spec: &'static str,
        input: &str,
        expected: &str,
        span: (usize, usize),
    ) -> Self {
        Self {
            spec: SmolStr::new_static(spec),
            input: input.to_string(),
            kind: StrParseKind::MissingComponent {
                span: Some(span.into()),
                message: SmolStr::new(expected),
            },
        }
    }

    /// Input did not match the validation regex for the type
    pub fn regex(spec: &'static str, input: &str, message: SmolStr) -> Self {
        Self {
            spec: SmolStr::new_static(spec),
            input: input.to_string(),
            kind: StrParseKind::RegexFail {
                span: None,
                message,
            },
        }
    }
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[allow(missing_docs)]
pub enum StrParseKind {
    #[error("regex failure - {message}")]
    #[diagnostic(code(skythread::types::string::regex_fail))]
    RegexFail {
        #[label]
        span: Option<SourceSpan>,
        #[help]
        message: SmolStr,
    },
    #[error("string too long (allowed: {max}, actual: {actual})")]
    #[diagnostic(code(skythread::types::string::wrong_length))]
    TooLong { max: usize, actual: usize },
    #[error("too few components (expected at least {min}, found {actual})")]
    #[diagnostic(code(skythread::types::string::too_short))]
    TooShort { min: usize, actual: usize },
    #[error("missing - {message}")]
    #[diagnostic(code(skythread::types::string::missing_component))]
    MissingComponent {
        #[label]
        span: Option<SourceSpan>,
        #[help]
        message: SmolStr,
    },
}
