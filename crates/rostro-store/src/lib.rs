//! rostro-store — SQLite persistence for enrolled faces.
//!
//! One table, `faces(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT,
//! face_data BLOB)`, where `face_data` is a lossless PNG encoding of the
//! canonical 128×128 grayscale crop. The schema is the durable contract:
//! database files written by other implementations of the demo stay
//! readable, and files written here stay readable to them.

use image::{GrayImage, ImageFormat};
use rostro_core::{FaceImage, KnownFace};
use rusqlite::{params, Connection};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
    #[error("failed to encode face as PNG: {0}")]
    Encode(#[source] image::ImageError),
    #[error("face row {id} ({name:?}) has an undecodable blob: {source}")]
    Decode {
        id: i64,
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("face row {id} ({name:?}) decoded to {width}×{height}, expected 128×128")]
    BadDimensions {
        id: i64,
        name: String,
        width: u32,
        height: u32,
    },
}

/// Handle to the face database. One connection, synchronous autocommit:
/// every `insert` is durable before it returns.
pub struct FaceStore {
    conn: Connection,
}

impl FaceStore {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.initialize()?;
        tracing::debug!(path = %path.display(), "face store opened");
        Ok(store)
    }

    /// In-memory database, for tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the faces table if missing. Safe to call on every startup.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS faces (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT,
                 face_data BLOB
             )",
        )?;
        Ok(())
    }

    /// Persist a face under `name`, returning the assigned row id.
    ///
    /// Duplicate names are permitted; every row is kept and searched.
    pub fn insert(&self, name: &str, face: &FaceImage) -> Result<i64, StoreError> {
        let blob = encode_png(face)?;
        self.conn.execute(
            "INSERT INTO faces (name, face_data) VALUES (?1, ?2)",
            params![name, blob],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name, "face stored");
        Ok(id)
    }

    /// Load every enrolled face, in insertion order.
    ///
    /// A single undecodable or wrong-sized blob fails the whole load; no
    /// partial gallery is returned.
    pub fn load_all(&self) -> Result<Vec<KnownFace>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, face_data FROM faces ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?;

        let mut known = Vec::new();
        for row in rows {
            let (id, name, blob) = row?;
            let name = name.unwrap_or_default();
            let image = decode_png(id, &name, &blob)?;
            known.push(KnownFace { name, image });
        }
        tracing::debug!(count = known.len(), "loaded known faces");
        Ok(known)
    }

    /// Number of enrolled faces.
    pub fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM faces", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

fn encode_png(face: &FaceImage) -> Result<Vec<u8>, StoreError> {
    let side = FaceImage::SIDE;
    // Cannot fail: FaceImage guarantees side*side pixels.
    let img = GrayImage::from_raw(side, side, face.pixels().to_vec())
        .expect("FaceImage pixel count matches its dimensions");
    let mut blob = Vec::new();
    img.write_to(&mut Cursor::new(&mut blob), ImageFormat::Png)
        .map_err(StoreError::Encode)?;
    Ok(blob)
}

fn decode_png(id: i64, name: &str, blob: &[u8]) -> Result<FaceImage, StoreError> {
    let decoded = image::load_from_memory(blob)
        .map_err(|source| StoreError::Decode {
            id,
            name: name.to_string(),
            source,
        })?
        .to_luma8();

    let (width, height) = decoded.dimensions();
    if width != FaceImage::SIDE || height != FaceImage::SIDE {
        return Err(StoreError::BadDimensions {
            id,
            name: name.to_string(),
            width,
            height,
        });
    }

    // Length checked above via the dimensions.
    Ok(FaceImage::from_pixels(decoded.into_raw())
        .expect("decoded 128×128 image has the canonical pixel count"))
}
