use std::io;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Copies `reader` into `forward` and the shared `combined` buffer until EOF.
///
/// Returns the bytes read from this stream alone. A failing forward target
/// is dropped for the rest of the stream so the child never blocks on a full
/// pipe; capture continues regardless.
pub(crate) async fn tee_stream<R, W>(
    mut reader: R,
    mut forward: W,
    combined: Arc<Mutex<Vec<u8>>>,
) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut own = Vec::new();
    let mut forwarding = true;
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let data = &chunk[..n];
        combined.lock().await.extend_from_slice(data);
        own.extend_from_slice(data);
        if forwarding {
            if let Err(err) = write_chunk(&mut forward, data).await {
                tracing::debug!(error = %err, "stopped forwarding child output");
                forwarding = false;
            }
        }
    }
    Ok(own)
}

async fn write_chunk<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    writer.write_all(data).await?;
    writer.flush().await
}
