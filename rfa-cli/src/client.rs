//! Interactive line client.

use std::io::{self, Write};

use rfa_core::EXIT_SENTINEL;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::info;

use crate::server::MAX_REPLY_LEN;

/// Read commands from stdin and print the server's replies.
///
/// Stops after `quit`, `exit`, end of input, or when the server hangs up.
pub async fn run(addr: &str) -> io::Result<()> {
    let stream = TcpStream::connect(addr).await?;
    info!("Connected to {}", addr);

    let (reader, mut writer) = stream.into_split();
    let mut replies = BufReader::new(reader);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("$ ");
        io::stdout().flush()?;

        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == EXIT_SENTINEL {
            break;
        }

        writer.write_all(format!("{}\n", line).as_bytes()).await?;
        match read_frame(&mut replies).await? {
            Some(reply) => println!("{}", reply),
            None => {
                eprintln!("Server closed the connection");
                return Ok(());
            }
        }

        if line == "quit" {
            break;
        }
    }

    writer
        .write_all(format!("{}\n", EXIT_SENTINEL).as_bytes())
        .await?;
    writer.shutdown().await?;
    info!("Closed the connection");
    Ok(())
}

/// Read one length-prefixed reply. `None` when the server has hung up.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };
    if len > MAX_REPLY_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("reply of {} bytes exceeds limit", len),
        ));
    }

    let mut buf = vec![0; len];
    reader.read_exact(&mut buf).await?;
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
