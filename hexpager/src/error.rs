use snafu::Snafu;

/// The error surfaced by page loading.
///
/// There is exactly one kind: the underlying storage failed while fetching a
/// row. A failure is scoped to the page load that triggered it — already
/// cached pages stay valid — and is recoverable by re-issuing the load for
/// the same key.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LoadError {
    /// The row source failed while fetching the row at `index`.
    #[snafu(display("row {index} fetch failed"))]
    RowFetch {
        index: usize,
        source: std::io::Error,
    },
}

impl LoadError {
    /// The row index whose fetch triggered the failure.
    pub fn row_index(&self) -> usize {
        match self {
            Self::RowFetch { index, .. } => *index,
        }
    }
}
