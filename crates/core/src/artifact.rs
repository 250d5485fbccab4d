//! Artifact path helpers: URL detection, filename extraction and
//! download-category classification.
//!
//! Building the final download URL needs the configured base address and
//! lives in `jobtrack-client`.

// ---------------------------------------------------------------------------
// Extension constants
// ---------------------------------------------------------------------------

/// Document extensions served by the PDF download route.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Spreadsheet extensions served by the CSV download route.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "csv"];

/// Route segment for document downloads (`/pdf/download/{filename}`).
pub const PDF_DOWNLOAD_CATEGORY: &str = "pdf";

/// Route segment for spreadsheet downloads (`/csv/download/{filename}`).
pub const SPREADSHEET_DOWNLOAD_CATEGORY: &str = "csv";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Kind of file a finished job produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Spreadsheet,
}

impl ArtifactKind {
    /// Classify a filename by its extension (case-insensitive).
    ///
    /// Returns `None` for extensions that match neither family.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(ArtifactKind::Pdf)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(ArtifactKind::Spreadsheet)
        } else {
            None
        }
    }

    /// Like [`from_filename`](Self::from_filename), but unclassifiable
    /// files fall back to [`ArtifactKind::Pdf`], the backend's general
    /// download route.
    pub fn for_download(filename: &str) -> Self {
        Self::from_filename(filename).unwrap_or(ArtifactKind::Pdf)
    }

    /// First path segment of the download route for this kind.
    pub fn download_category(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => PDF_DOWNLOAD_CATEGORY,
            ArtifactKind::Spreadsheet => SPREADSHEET_DOWNLOAD_CATEGORY,
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// True if the backend already returned a fully qualified HTTP(S) URL.
pub fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Last segment of a path, splitting on both `/` and `\`.
///
/// Returns `None` when the path is blank, ends in a separator, or ends in
/// a `.`/`..` directory reference.
pub fn artifact_filename(path: &str) -> Option<&str> {
    let name = path.trim().rsplit(['/', '\\']).next().unwrap_or("");
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
