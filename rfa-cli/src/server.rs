//! TCP transport: one task per connection, one `Session` per task.
//!
//! Requests are newline-terminated lines of at most `MAX_LINE_LEN` bytes.
//! Each reply is sent as a 4-byte big-endian length followed by that many
//! bytes of UTF-8 text, so reply bodies may contain any byte.

use std::io;

use futures::StreamExt;
use rfa_core::{Session, Workspace, EXIT_SENTINEL};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

/// Longest request line accepted, in bytes.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Largest reply frame a client will accept.
pub const MAX_REPLY_LEN: usize = 16 * 1024 * 1024;

/// Reply for lines the session engine does not answer.
const UNKNOWN_COMMAND: &str = "Unknown command. Type `commands` to list the supported commands";

/// Final reply before closing a connection that sent an oversized line.
const LINE_TOO_LONG: &str = "Command line too long, closing connection";

/// Accept connections forever.
pub async fn run(addr: &str, workspace: Workspace) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Serving on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        let workspace = workspace.clone();

        tokio::spawn(async move {
            info!(%peer, "connected");
            if let Err(e) = handle_connection(stream, workspace).await {
                error!(%peer, error = %e, "connection failed");
            }
            info!(%peer, "connection closed");
        });
    }
}

/// Run the command loop for one client until `exit`, EOF or an oversized line.
///
/// Session operations do blocking file I/O, so each one runs on the
/// blocking pool with the session moved in and handed back.
pub async fn handle_connection<S>(stream: S, workspace: Workspace) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LEN));
    let mut session = Session::new(workspace);

    let result = loop {
        let line = match lines.next().await {
            Some(Ok(line)) => line,
            None => break Ok(()),
            Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                warn!(max = MAX_LINE_LEN, "request line too long");
                break write_frame(&mut writer, LINE_TOO_LONG).await;
            }
            Some(Err(LinesCodecError::Io(e))) => break Err(e),
        };
        if line.trim() == EXIT_SENTINEL {
            break Ok(());
        }
        debug!(bytes = line.len(), "received line");

        let (next, reply) = tokio::task::spawn_blocking(move || {
            let reply = session.handle_line(&line);
            (session, reply)
        })
        .await
        .map_err(io::Error::other)?;
        session = next;

        let reply = reply.unwrap_or_else(|| UNKNOWN_COMMAND.to_string());
        if let Err(e) = write_frame(&mut writer, &reply).await {
            break Err(e);
        }
    };

    tokio::task::spawn_blocking(move || session.disconnect())
        .await
        .map_err(io::Error::other)?;
    result
}

/// Write one length-prefixed reply.
pub async fn write_frame<W>(writer: &mut W, reply: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(reply.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "reply too large"))?;
    writer.write_u32(len).await?;
    writer.write_all(reply.as_bytes()).await?;
    writer.flush().await
}
