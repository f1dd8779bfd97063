//! Origin-to-client response relay.

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::proxy::line::{read_line_chunk, MAX_LINE};

// == Response Buffer ==
/// Copy of the relayed response, kept only while it is still cacheable.
///
/// Once the running total reaches `limit` the copy is dropped for good; the
/// total keeps counting so the caller can report what was relayed.
#[derive(Debug)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    total: usize,
    limit: usize,
    overflowed: bool,
}

impl ResponseBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            limit,
            overflowed: false,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.total += chunk.len();
        if self.overflowed {
            return;
        }
        if self.total >= self.limit {
            self.overflowed = true;
            self.data = Vec::new();
        } else {
            self.data.extend_from_slice(chunk);
        }
    }

    /// Bytes relayed so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The full response if it stayed under the limit.
    pub fn into_cacheable(self) -> Option<Vec<u8>> {
        (!self.overflowed).then_some(self.data)
    }
}

// == Relay ==
/// Copies the origin response to the client line by line until the origin
/// closes its side. Nothing about the response is interpreted.
pub async fn relay<U, C>(origin: &mut U, client: &mut C, limit: usize) -> Result<ResponseBuffer>
where
    U: AsyncBufRead + Unpin,
    C: AsyncWrite + Unpin,
{
    let mut response = ResponseBuffer::new(limit);
    let mut line = Vec::with_capacity(MAX_LINE);

    while read_line_chunk(origin, &mut line, MAX_LINE).await? > 0 {
        client.write_all(&line).await?;
        response.push(&line);
    }
    client.flush().await?;

    Ok(response)
}
