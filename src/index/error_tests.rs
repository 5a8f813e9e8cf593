//! Unit tests for index error types

#[cfg(test)]
mod tests {
    use crate::index::error::IndexError;
    use std::error::Error;

    #[test]
    fn test_document_not_found_error() {
        let error = IndexError::DocumentNotFound("notes/a.md".to_string());
        assert_eq!(error.to_string(), "Document not indexed: notes/a.md");
    }

    #[test]
    fn test_poisoned_error() {
        let error = IndexError::Poisoned;
        assert!(error.to_string().contains("poisoned"));
        assert!(error.source().is_none());
    }

    #[test]
    fn test_error_debug() {
        let error = IndexError::DocumentNotFound("x".to_string());
        let debug = format!("{error:?}");
        assert!(debug.contains("DocumentNotFound"));
    }
}
