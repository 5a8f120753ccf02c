//! Query validation errors
//!
//! Every rejection carries the same external code, `CAMPUS_QUERY_INVALID`.
//! The message holds the internal reason and is meant for logs only;
//! callers surface [`QueryError::public_message`] instead.

use std::fmt;

/// Message shown to callers for any rejected query
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query";

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Structural, grammar, or type violation
    CampusQueryInvalid,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::CampusQueryInvalid => "CAMPUS_QUERY_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with the internal rejection reason
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    clause: Option<&'static str>,
}

impl QueryError {
    /// Create a query invalid error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::CampusQueryInvalid,
            message: reason.into(),
            clause: None,
        }
    }

    /// Attaches the top-level clause (WHERE, OPTIONS, TRANSFORMATIONS) the
    /// rejection came from, unless one is already set
    pub fn in_clause(mut self, clause: &'static str) -> Self {
        self.clause.get_or_insert(clause);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the internal reason
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the clause the rejection came from, if known
    pub fn clause(&self) -> Option<&'static str> {
        self.clause
    }

    /// Returns the uniform message safe to show callers
    pub fn public_message(&self) -> &'static str {
        INVALID_QUERY_MESSAGE
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.code.severity(), self.code.code())?;
        if let Some(clause) = self.clause {
            write!(f, "{}: ", clause)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryError {}

/// Result type for query validation
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = QueryError::invalid("missing WHERE");
        assert_eq!(err.code().code(), "CAMPUS_QUERY_INVALID");
        assert_eq!(err.severity(), Severity::Reject);
        assert_eq!(err.public_message(), "Invalid query");
    }

    #[test]
    fn test_first_clause_wins() {
        let err = QueryError::invalid("bad key")
            .in_clause("WHERE")
            .in_clause("OPTIONS");
        assert_eq!(err.clause(), Some("WHERE"));
        let display = err.to_string();
        assert!(display.contains("WHERE: bad key"));
        assert!(display.contains("REJECT"));
    }
}
