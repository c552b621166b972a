use std::path::Path;

use mathquiz_core::catalog::{CatalogDocument, QuestionBank};

use crate::error::CatalogLoadError;

/// Parse a JSON catalog of the shape
/// `{"algebra": {"easy": [{"prompt": "...", "answer": "..."}], ...}, ...}`.
///
/// # Errors
///
/// Returns `CatalogLoadError::Json` for malformed JSON or unknown subject/difficulty
/// keys, and `CatalogLoadError::Catalog` when the content fails bank validation.
pub fn parse_catalog(json: &str) -> Result<QuestionBank, CatalogLoadError> {
    let document: CatalogDocument = serde_json::from_str(json)?;
    Ok(QuestionBank::from_document(document)?)
}

/// Read and validate a catalog file.
///
/// # Errors
///
/// Returns `CatalogLoadError::Io` if the file cannot be read, otherwise the errors of
/// [`parse_catalog`].
pub fn load_catalog(path: &Path) -> Result<QuestionBank, CatalogLoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bank = parse_catalog(&json)?;
    tracing::info!(path = %path.display(), questions = bank.question_count(), "loaded catalog");
    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathquiz_core::catalog::CatalogError;
    use mathquiz_core::model::{Difficulty, Subject};

    fn pool(prompt: &str, answer: &str) -> String {
        format!(r#"{{"easy": [{{"prompt": "{prompt} easy", "answer": "{answer}"}}], "hard": [{{"prompt": "{prompt} hard", "answer": "{answer}"}}]}}"#)
    }

    fn full_catalog() -> String {
        format!(
            r#"{{"algebra": {}, "equations": {}, "calculus": {}}}"#,
            pool("Simplify x+x", "2x"),
            pool("Solve x-1=0", "x=1"),
            pool("d/dx x^2", "2x"),
        )
    }

    #[test]
    fn parses_a_complete_catalog() {
        let bank = parse_catalog(&full_catalog()).unwrap();
        assert_eq!(bank.question_count(), 6);
        let pool = bank.questions_for(Subject::Equations, Difficulty::Hard).unwrap();
        assert_eq!(pool[0].canonical_answer(), "x=1");
    }

    #[test]
    fn missing_pool_is_not_found() {
        let json = format!(r#"{{"algebra": {}}}"#, pool("Simplify", "x"));
        let err = parse_catalog(&json).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::Catalog(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_difficulty_key_is_rejected() {
        let json = r#"{"algebra": {"medium": []}}"#;
        assert!(matches!(
            parse_catalog(json),
            Err(CatalogLoadError::Json(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_catalog(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
