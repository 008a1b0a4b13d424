//! Binary model files
//!
//! Layout (little-endian):
//!
//! ```text
//! magic        b"SKYM"
//! version      u32
//! fingerprint  [u8; 32]   SHA-256 of the item map, "id\tname\n" per item in id order
//! user map     u64 count, then (u64 len, UTF-8 bytes, u32 id) per entry
//! item map     same shape
//! user factors u64 rows, u64 cols, rows * cols f64 row-major
//! item factors same shape
//! ```
//!
//! Factor matrices carry a row for every id slot, retired ones included.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::factors::FactorMatrix;
use super::ratings::Interner;
use crate::error::{Result, SkyError};

pub const MAGIC: &[u8; 4] = b"SKYM";
pub const FORMAT_VERSION: u32 = 1;

/// Longest identity string accepted from a model file
const MAX_NAME_LEN: u64 = 1 << 20;

/// Contents of a model file
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    pub users: Interner,
    pub items: Interner,
    pub user_factors: FactorMatrix,
    pub item_factors: FactorMatrix,
}

/// SHA-256 over the live item id space
pub fn fingerprint(items: &Interner) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for (id, name) in items.live() {
        hasher.update(format!("{id}\t{name}\n").as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Write a model file, replacing any existing file at `path`
pub fn write_model(
    path: &Path,
    users: &Interner,
    items: &Interner,
    user_factors: &FactorMatrix,
    item_factors: &FactorMatrix,
) -> Result<()> {
    let file = File::create(path).map_err(|e| crate::map_model_err!(path, e))?;
    let mut out = BufWriter::new(file);

    let write = |out: &mut BufWriter<File>| -> std::io::Result<()> {
        out.write_all(MAGIC)?;
        out.write_all(&FORMAT_VERSION.to_le_bytes())?;
        out.write_all(&fingerprint(items))?;
        write_interner(out, users)?;
        write_interner(out, items)?;
        write_matrix(out, user_factors)?;
        write_matrix(out, item_factors)?;
        out.flush()
    };
    write(&mut out).map_err(|e| crate::map_model_err!(path, e))?;

    tracing::info!(
        path = %path.display(),
        users = users.live_count(),
        items = items.live_count(),
        "model saved"
    );
    Ok(())
}

fn write_interner(out: &mut impl Write, interner: &Interner) -> std::io::Result<()> {
    out.write_all(&(interner.live_count() as u64).to_le_bytes())?;
    for (id, name) in interner.live() {
        out.write_all(&(name.len() as u64).to_le_bytes())?;
        out.write_all(name.as_bytes())?;
        out.write_all(&id.to_le_bytes())?;
    }
    Ok(())
}

fn write_matrix(out: &mut impl Write, matrix: &FactorMatrix) -> std::io::Result<()> {
    out.write_all(&(matrix.rows() as u64).to_le_bytes())?;
    out.write_all(&(matrix.cols() as u64).to_le_bytes())?;
    for value in matrix.data() {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Read and verify a model file.
///
/// Checks magic, version and the item-map fingerprint. Every stored id must
/// have a factor row. Truncated or malformed files are reported as
/// [`SkyError::Model`].
pub fn read_model(path: &Path) -> Result<ModelSnapshot> {
    let file = File::open(path).map_err(|e| crate::map_model_err!(path, e))?;
    let mut input = ModelReader {
        inner: BufReader::new(file),
        path,
    };

    let magic: [u8; 4] = input.array()?;
    if &magic != MAGIC {
        return Err(SkyError::model(path, "not a skyindex model file"));
    }
    let version = u32::from_le_bytes(input.array()?);
    if version != FORMAT_VERSION {
        return Err(SkyError::model(
            path,
            format!("unsupported model version {version}"),
        ));
    }
    let stored: [u8; 32] = input.array()?;

    let user_entries = input.entries()?;
    let item_entries = input.entries()?;
    let user_factors = input.matrix()?;
    let item_factors = input.matrix()?;
    if user_factors.cols() != item_factors.cols() {
        return Err(SkyError::model(path, "factor matrices disagree on latent dimension"));
    }

    let users = Interner::from_entries(user_entries, user_factors.rows())
        .map_err(|e| SkyError::model(path, format!("user map: {e}")))?;
    let items = Interner::from_entries(item_entries, item_factors.rows())
        .map_err(|e| SkyError::model(path, format!("item map: {e}")))?;

    let computed = fingerprint(&items);
    if computed != stored {
        return Err(SkyError::model(
            path,
            format!(
                "item map fingerprint mismatch (stored {}, computed {})",
                hex::encode(stored),
                hex::encode(computed)
            ),
        ));
    }

    Ok(ModelSnapshot {
        users,
        items,
        user_factors,
        item_factors,
    })
}

/// Check that every live engine identity keeps its id in the snapshot
pub fn verify_consistent(
    path: &Path,
    snapshot: &ModelSnapshot,
    users: &Interner,
    items: &Interner,
) -> Result<()> {
    for (side, live, stored) in [("user", users, &snapshot.users), ("item", items, &snapshot.items)] {
        for (id, name) in live.live() {
            match stored.get(name) {
                Some(stored_id) if stored_id == id => {}
                Some(stored_id) => {
                    return Err(SkyError::model(
                        path,
                        format!("{side} {name} has id {id} but the model maps it to {stored_id}"),
                    ))
                }
                None => {
                    return Err(SkyError::model(
                        path,
                        format!("{side} {name} is missing from the model"),
                    ))
                }
            }
        }
    }
    Ok(())
}

struct ModelReader<'a, R> {
    inner: R,
    path: &'a Path,
}

impl<R: Read> ModelReader<'_, R> {
    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| crate::map_model_err!(self.path, e))?;
        Ok(buf)
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn entries(&mut self) -> Result<Vec<(String, u32)>> {
        let count = self.u64()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let len = self.u64()?;
            if len > MAX_NAME_LEN {
                return Err(SkyError::model(self.path, format!("identity length {len} too large")));
            }
            let mut bytes = vec![0u8; len as usize];
            self.inner
                .read_exact(&mut bytes)
                .map_err(|e| crate::map_model_err!(self.path, e))?;
            let name = String::from_utf8(bytes)
                .map_err(|e| crate::map_model_err!(self.path, e))?;
            let id = u32::from_le_bytes(self.array()?);
            entries.push((name, id));
        }
        Ok(entries)
    }

    fn matrix(&mut self) -> Result<FactorMatrix> {
        let rows = usize::try_from(self.u64()?).map_err(|e| crate::map_model_err!(self.path, e))?;
        let cols = usize::try_from(self.u64()?).map_err(|e| crate::map_model_err!(self.path, e))?;
        if cols == 0 {
            return Err(SkyError::model(self.path, "factor matrix has no columns"));
        }
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| SkyError::model(self.path, "factor matrix too large"))?;

        let mut data = Vec::new();
        for _ in 0..len {
            data.push(f64::from_le_bytes(self.array()?));
        }
        FactorMatrix::from_raw(rows, cols, data)
            .ok_or_else(|| SkyError::model(self.path, "factor matrix shape mismatch"))
    }
}
