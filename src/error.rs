use std::path::PathBuf;

/// Failures that stop an analysis before a report can be produced.
///
/// Anything local to one file or one code sample is not an error: it is
/// recorded as a warning or a conflict instead.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("bundle not found: {}", .0.display())]
    BundleNotFound(PathBuf),

    #[error("cannot read bundle {}: {source}", path.display())]
    BundleUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
