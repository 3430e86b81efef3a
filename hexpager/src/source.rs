use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A source of byte rows: the sole boundary to actual byte storage (file,
/// memory buffer, remote blob).
///
/// Implementations map a zero-based row index to the bytes of that row; the
/// absolute byte offset of a row is `index * row_len` for whatever row length
/// the source was built with. The engine never interprets the bytes, it only
/// pages and caches them.
///
/// Contract:
/// - An empty vec means no data exists at or beyond `index` (end of data).
///   Out-of-range indices are expressed by emptiness, never by failure.
/// - `Err` is reserved for genuine I/O errors.
/// - The call may block while performing I/O. It must be safe to invoke
///   concurrently for distinct indices; the `Send + Sync` bound makes that
///   explicit so page loads can fan fetches out across threads.
pub trait RowSource: Send + Sync {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>>;
}

impl<S: RowSource + ?Sized> RowSource for &S {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        (**self).fetch_row(index)
    }
}

impl<S: RowSource + ?Sized> RowSource for Arc<S> {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        (**self).fetch_row(index)
    }
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        (**self).fetch_row(index)
    }
}

/// An in-memory row source that chunks a byte buffer into fixed-length rows.
///
/// The final row may be shorter than `row_len`; rows past the end of the
/// buffer are empty.
#[derive(Clone, Debug)]
pub struct SliceSource {
    bytes: Vec<u8>,
    row_len: usize,
}

impl SliceSource {
    /// Creates a source over `bytes` with `row_len` bytes per row.
    ///
    /// `row_len` must be non-zero.
    pub fn new(bytes: impl Into<Vec<u8>>, row_len: usize) -> Self {
        assert!(row_len > 0, "row_len must be non-zero");
        Self {
            bytes: bytes.into(),
            row_len,
        }
    }

    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Total length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl RowSource for SliceSource {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        let start = index.saturating_mul(self.row_len);
        if start >= self.bytes.len() {
            return Ok(Vec::new());
        }
        let end = start.saturating_add(self.row_len).min(self.bytes.len());
        Ok(self.bytes[start..end].to_vec())
    }
}

/// A file-backed row source reading `row_len` bytes at offset
/// `index * row_len`.
///
/// The handle sits behind a mutex so concurrent fetches stay safe; each fetch
/// seeks before reading. Reads at or past the end of the file yield an empty
/// row.
#[derive(Debug)]
pub struct FileSource {
    file: Mutex<File>,
    row_len: usize,
}

impl FileSource {
    /// Opens `path` for reading with `row_len` bytes per row.
    ///
    /// `row_len` must be non-zero.
    pub fn open(path: impl AsRef<Path>, row_len: usize) -> io::Result<Self> {
        assert!(row_len > 0, "row_len must be non-zero");
        Ok(Self {
            file: Mutex::new(File::open(path)?),
            row_len,
        })
    }

    pub fn row_len(&self) -> usize {
        self.row_len
    }
}

impl RowSource for FileSource {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        let offset = (index as u64).saturating_mul(self.row_len as u64);
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.seek(SeekFrom::Start(offset))?;

        let mut row = vec![0u8; self.row_len];
        let mut filled = 0;
        while filled < row.len() {
            match file.read(&mut row[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        row.truncate(filled);
        Ok(row)
    }
}

/// Wraps a closure as a [`RowSource`].
///
/// Useful when the row producer is a capture-heavy lambda rather than a
/// dedicated type, mirroring how adapters usually hand the engine a fetch
/// function.
pub struct FnSource<F>(F);

impl<F> FnSource<F>
where
    F: Fn(usize) -> io::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(fetch: F) -> Self {
        Self(fetch)
    }
}

impl<F> RowSource for FnSource<F>
where
    F: Fn(usize) -> io::Result<Vec<u8>> + Send + Sync,
{
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        (self.0)(index)
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSource(..)")
    }
}
