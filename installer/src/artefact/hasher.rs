//! Streaming SHA-256 computation for downloaded artefacts.

use super::sha256_digest::Sha256Digest;
use camino::Utf8Path;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};

/// Read buffer size used when hashing.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Hashes everything `reader` yields, [`CHUNK_SIZE`] bytes at a time.
///
/// Interrupted reads are returned to the caller rather than retried.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(Sha256Digest::from_output(&hasher.finalize()))
}

/// Hashes the file at `path` without loading it into memory.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use wizcli_installer::artefact::hasher::digest_file;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = Utf8PathBuf::try_from(dir.path().join("empty")).expect("UTF-8 path");
/// std::fs::write(&path, b"").expect("write file");
///
/// let digest = digest_file(&path).expect("hash file");
/// assert_eq!(
///     digest.as_str(),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn digest_file(path: &Utf8Path) -> io::Result<Sha256Digest> {
    let file = File::open(path)?;
    digest_reader(file)
}

/// Hashes an in-memory buffer.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> Sha256Digest {
    Sha256Digest::from_output(&Sha256::digest(bytes))
}
