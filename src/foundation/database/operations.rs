use sled::Tree;
use std::io;

/// Name of the sled tree holding favourite records.
const FAVOURITES_TREE: &str = "favourites";

/// A string-keyed byte store.
///
/// This is the only persistence surface the favourites adapter needs. It is
/// implemented for `sled::Tree`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
    fn keys(&self) -> io::Result<Vec<String>>;
}

impl KeyValueStore for Tree {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Tree::get(self, key.as_bytes())
            .map(|value| value.map(|ivec| ivec.to_vec()))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> io::Result<()> {
        self.insert(key.as_bytes(), value)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        self.flush()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        Tree::remove(self, key.as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        self.flush()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(())
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        self.iter()
            .keys()
            .map(|key| {
                key.map(|ivec| String::from_utf8_lossy(&ivec).into_owned())
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
            })
            .collect()
    }
}

/// Opens the favourites tree of the database at the specified path.
///
/// The database is created if it does not exist yet. Errors are converted to
/// `io::Error` so callers only deal with one error type.
///
/// # Examples
///
/// ```no_run
/// use albumtree::open_favourites_store;
/// let store = open_favourites_store("/path/to/favourites_db")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn open_favourites_store(path: &str) -> io::Result<Tree> {
    let db = sled::open(path).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    db.open_tree(FAVOURITES_TREE)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
