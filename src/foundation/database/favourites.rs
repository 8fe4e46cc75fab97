use crate::foundation::database::{KeyValueStore, Photo, PhotoId};
use std::io;
use std::rc::Rc;
use tracing::warn;

/// The set of favourited photos, backed by a key-value store.
///
/// A key is present exactly when the photo is favourited; the value is the full
/// photo snapshot, so the favourites page renders without touching the API.
/// Clones share the same underlying store.
#[derive(Clone)]
pub struct Favourites {
    store: Rc<dyn KeyValueStore>,
}

impl Favourites {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn contains(&self, id: PhotoId) -> io::Result<bool> {
        Ok(self.store.get(&id.to_string())?.is_some())
    }

    pub fn get(&self, id: PhotoId) -> io::Result<Option<Photo>> {
        self.store
            .get(&id.to_string())?
            .map(|bytes| {
                serde_json::from_slice(&bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
            })
            .transpose()
    }

    pub fn add(&self, photo: &Photo) -> io::Result<()> {
        let serialized = serde_json::to_vec(photo)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        self.store.set(&photo.id.to_string(), &serialized)
    }

    pub fn remove(&self, id: PhotoId) -> io::Result<()> {
        self.store.remove(&id.to_string())
    }

    /// Removes the photo if it is stored, stores its snapshot otherwise.
    ///
    /// Returns whether the photo is favourited afterwards.
    pub fn toggle(&self, photo: &Photo) -> io::Result<bool> {
        if self.contains(photo.id)? {
            self.remove(photo.id)?;
            Ok(false)
        } else {
            self.add(photo)?;
            Ok(true)
        }
    }

    /// Every readable favourite, ordered by photo id.
    ///
    /// Records that fail to parse are skipped with a warning so one corrupt
    /// entry never hides the rest of the page.
    pub fn list(&self) -> io::Result<Vec<Photo>> {
        let mut photos = Vec::new();

        for key in self.store.keys()? {
            let Some(bytes) = self.store.get(&key)? else {
                continue;
            };
            match serde_json::from_slice::<Photo>(&bytes) {
                Ok(photo) => photos.push(photo),
                Err(e) => warn!(key = %key, error = %e, "skipping malformed favourite record"),
            }
        }

        photos.sort_by_key(|photo| photo.id);
        Ok(photos)
    }
}
