//! MD5 hex digest utilities for archive checksums.
//!
//! The game client validates downloads against an MD5 digest, so that is
//! the algorithm stored with each add-on record.

use md5::{Digest, Md5};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read buffer size used when streaming archives through the hasher.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute an MD5 hex digest of the given bytes.
pub fn md5_hex(data: &[u8]) -> String {
    let hash = Md5::digest(data);
    format!("{hash:x}")
}

/// Stream a reader to completion through MD5 and return the hex digest.
pub async fn md5_hex_reader<R>(reader: &mut R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
