//! Beacon frame reading over async streams.

use lightbrush_core::BEACON_LEN;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read up to one beacon frame.
///
/// Returns `None` on a clean end of stream (no bytes of a new frame), the
/// full frame otherwise, or the partial bytes if the stream ended mid-frame.
pub(crate) async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = [0u8; BEACON_LEN];
    let mut filled = 0;
    while filled < BEACON_LEN {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Ok(None);
    }
    Ok(Some(buf[..filled].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_frames() {
        let bytes: &[u8] = &[0, 0, 0, 7, 0, 0, 1, 0, 0, 9];
        let mut reader = bytes;
        assert_eq!(read_frame(&mut reader).await.unwrap(), Some(vec![0, 0, 0, 7]));
        assert_eq!(read_frame(&mut reader).await.unwrap(), Some(vec![0, 0, 1, 0]));
        assert_eq!(read_frame(&mut reader).await.unwrap(), Some(vec![0, 9]));
        assert_eq!(read_frame(&mut reader).await.unwrap(), None);
    }
}
