//! Bounded line reads over buffered streams.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::{ProxyError, Result};

/// Longest request or header line accepted, and the relay chunk size.
pub const MAX_LINE: usize = 8192;

/// Reads bytes into `buf` up to and including the next `\n`, stopping early
/// at EOF or once `max_len` bytes are collected. Returns the byte count; 0
/// means EOF.
pub async fn read_line_chunk<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();

    while buf.len() < max_len {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }

        let room = max_len - buf.len();
        let window = &available[..available.len().min(room)];
        let newline_pos = window.iter().position(|byte| *byte == b'\n');
        let consume = newline_pos.map(|idx| idx + 1).unwrap_or(window.len());

        buf.extend_from_slice(&window[..consume]);
        reader.consume(consume);

        if newline_pos.is_some() {
            break;
        }
    }

    Ok(buf.len())
}

/// Reads one complete line, failing if it does not end within `max_len`
/// bytes. A final line cut short by EOF is returned as-is.
pub async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let n = read_line_chunk(reader, buf, max_len).await?;
    if n == max_len && buf.last() != Some(&b'\n') {
        return Err(ProxyError::LineTooLong { limit: max_len });
    }
    Ok(n)
}
