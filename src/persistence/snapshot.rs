//! Snapshot Persistence
//!
//! The two-artifact snapshot pair backing a vector memory store: a binary
//! index artifact (the embedding collection) and a JSON metadata artifact
//! (the parallel metadata documents, in slot order).
//!
//! Both artifacts are written to `.tmp` siblings and renamed into place,
//! metadata first, so a visible index artifact always has metadata at
//! least as new as itself and a failed save never truncates a previous
//! good snapshot. Each artifact carries the record count; load
//! cross-checks them and refuses any half-present or inconsistent pair.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MemoryError, Result};
use crate::vector::{Metadata, Record};

/// Index artifact format:
/// - Magic: 4 bytes "MVEC"
/// - Version: 1 byte
/// - Dimension: 4 bytes (u32 LE)
/// - Record count: 4 bytes (u32 LE)
/// - Payload: count * dimension f32 (LE)

const INDEX_MAGIC: &[u8] = b"MVEC";
const INDEX_VERSION: u8 = 1;

fn corrupt(msg: impl Into<String>) -> MemoryError {
    MemoryError::CorruptSnapshot(msg.into())
}

/// `path` with `.tmp` appended to the full file name, so the index and
/// metadata temporaries never collide.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Read exactly `buf.len()` bytes, reporting a short read as snapshot
/// corruption rather than a bare I/O error.
fn read_field(reader: &mut impl Read, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            corrupt(format!("index artifact truncated while reading {what}"))
        } else {
            MemoryError::Io(e)
        }
    })
}

/// Snapshot writer/reader for one artifact pair.
#[derive(Debug, Clone)]
pub struct Snapshot {
    index_path: PathBuf,
    metadata_path: PathBuf,
}

impl Snapshot {
    pub fn new<P: Into<PathBuf>>(index_path: P, metadata_path: P) -> Self {
        Self {
            index_path: index_path.into(),
            metadata_path: metadata_path.into(),
        }
    }

    /// Write both artifacts atomically.
    pub fn save(&self, dimension: usize, records: &[Record]) -> Result<()> {
        for path in [&self.index_path, &self.metadata_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let metadata_tmp = tmp_sibling(&self.metadata_path);
        let index_tmp = tmp_sibling(&self.index_path);

        self.write_metadata(&metadata_tmp, records)?;
        self.write_index(&index_tmp, dimension, records)?;

        // Metadata lands before the index: an index artifact is only ever
        // visible alongside metadata at least as new as itself.
        fs::rename(&metadata_tmp, &self.metadata_path)?;
        fs::rename(&index_tmp, &self.index_path)?;

        debug!(records = records.len(), "snapshot written");
        Ok(())
    }

    /// Load the artifact pair.
    ///
    /// Returns `None` when neither artifact exists (first run). A
    /// half-present pair, or any header, payload, or count anomaly, is
    /// `CorruptSnapshot`.
    pub fn load(&self, dimension: usize) -> Result<Option<Vec<Record>>> {
        match (self.index_path.exists(), self.metadata_path.exists()) {
            (false, false) => return Ok(None),
            (true, false) => {
                return Err(corrupt("index artifact present without metadata artifact"))
            }
            (false, true) => {
                return Err(corrupt("metadata artifact present without index artifact"))
            }
            (true, true) => {}
        }

        let embeddings = self.read_index(dimension)?;
        let documents = self.read_metadata()?;
        if embeddings.len() != documents.len() {
            return Err(corrupt(format!(
                "index holds {} embeddings but metadata holds {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let records: Vec<Record> = embeddings
            .into_iter()
            .zip(documents)
            .map(|(embedding, metadata)| Record {
                embedding,
                metadata,
            })
            .collect();

        info!(records = records.len(), "snapshot loaded");
        Ok(Some(records))
    }

    fn write_metadata(&self, path: &Path, records: &[Record]) -> Result<()> {
        let documents: Vec<&Metadata> = records.iter().map(|r| &r.metadata).collect();

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &documents)?;
        writer.flush()?;
        Ok(())
    }

    fn write_index(&self, path: &Path, dimension: usize, records: &[Record]) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(INDEX_MAGIC)?;
        writer.write_all(&[INDEX_VERSION])?;
        writer.write_all(&(dimension as u32).to_le_bytes())?;
        writer.write_all(&(records.len() as u32).to_le_bytes())?;

        for record in records {
            for component in &record.embedding {
                writer.write_all(&component.to_le_bytes())?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    fn read_index(&self, dimension: usize) -> Result<Vec<Vec<f32>>> {
        let file = File::open(&self.index_path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        read_field(&mut reader, &mut magic, "magic")?;
        if magic != INDEX_MAGIC {
            return Err(corrupt("bad index artifact magic"));
        }

        let mut version = [0u8; 1];
        read_field(&mut reader, &mut version, "version")?;
        if version[0] != INDEX_VERSION {
            return Err(corrupt(format!(
                "unsupported index artifact version: {}",
                version[0]
            )));
        }

        let mut word = [0u8; 4];
        read_field(&mut reader, &mut word, "dimension")?;
        let stored_dimension = u32::from_le_bytes(word) as usize;
        if stored_dimension != dimension {
            return Err(corrupt(format!(
                "index artifact dimension {stored_dimension} does not match configured dimension {dimension}"
            )));
        }

        read_field(&mut reader, &mut word, "record count")?;
        let count = u32::from_le_bytes(word) as usize;

        let mut embeddings = Vec::with_capacity(count);
        let mut component = [0u8; 4];
        for _ in 0..count {
            let mut embedding = Vec::with_capacity(dimension);
            for _ in 0..dimension {
                read_field(&mut reader, &mut component, "embedding payload")?;
                embedding.push(f32::from_le_bytes(component));
            }
            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn read_metadata(&self) -> Result<Vec<Metadata>> {
        let file = File::open(&self.metadata_path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| corrupt(format!("unreadable metadata artifact: {e}")))
    }
}
