//! Document loading: PDF through `pdf-extract`, anything else as UTF-8 text.

use std::path::Path;

use tracing::info;

use super::RagError;

/// Reads the full text of `path`.
pub fn load_document(path: &Path) -> Result<String, RagError> {
    if !path.exists() {
        return Err(RagError::Load(format!("document not found: {}", path.display())));
    }
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    let text = if is_pdf {
        pdf_extract::extract_text(path)
            .map_err(|e| RagError::Load(format!("{}: {e}", path.display())))?
    } else {
        std::fs::read_to_string(path).map_err(|e| RagError::Load(format!("{}: {e}", path.display())))?
    };
    info!(path = %path.display(), chars = text.chars().count(), pdf = is_pdf, "document loaded");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\nmarkets rose").unwrap();
        assert_eq!(load_document(&path).unwrap(), "# Notes\nmarkets rose");
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = load_document(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, RagError::Load(_)));
    }
}
