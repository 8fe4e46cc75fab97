use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type AlbumId = u64;
pub type PhotoId = u64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    #[serde(rename = "userId", default)]
    pub owner_user_id: UserId,
}

/// A photo as returned by the API and as stored in the favourites tree.
///
/// The wire names (`url`, `thumbnailUrl`) are kept for the stored snapshot too,
/// so a record written here can be read back by anything speaking the API format.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: PhotoId,
    pub title: String,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: String,
    #[serde(rename = "url")]
    pub full_url: String,
}
