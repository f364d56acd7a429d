use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::engine::events::ChatEvent;
use crate::engine::registry::RoomRegistry;
use crate::engine::session::{Flow, Session};

use super::formatter;

/// Read one line whose text (terminator excluded) is at most `max_len` bytes.
/// Returns Ok(0) on EOF, Ok(n) on success, Err on I/O error or line too long.
/// A final line without a terminator is returned as-is.
async fn read_bounded_line<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    buf: &mut String,
    max_len: usize,
) -> std::io::Result<usize> {
    let mut line: Vec<u8> = Vec::new();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break; // EOF
        }

        if let Some(pos) = available.iter().position(|&b| b == b'\n') {
            line.extend_from_slice(&available[..=pos]);
            reader.consume(pos + 1);
            break;
        }

        let len = available.len();
        line.extend_from_slice(available);
        reader.consume(len);

        if text_len(&line) > max_len {
            return Err(line_too_long());
        }
    }

    if text_len(&line) > max_len {
        return Err(line_too_long());
    }

    buf.push_str(&String::from_utf8_lossy(&line));
    Ok(line.len())
}

/// Length without the trailing `\n` or `\r\n`.
fn text_len(line: &[u8]) -> usize {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line).len()
}

fn line_too_long() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, "line too long")
}

/// Handle a single client connection from accept to close.
/// Accepts any stream implementing AsyncRead + AsyncWrite.
pub async fn handle_connection<S>(
    stream: S,
    peer: String,
    registry: Arc<RoomRegistry>,
    config: Arc<ServerConfig>,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    info!(%peer, "client connected");

    let (reader, writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    // Bounded so a stalled client can only ever back up its own queue.
    let (out_tx, out_rx) = mpsc::channel::<ChatEvent>(config.limits.outbound_queue.max(1));
    let write_handle = tokio::spawn(write_loop(writer, out_rx, peer.clone()));

    let mut session = Session::new(registry, out_tx, config.server.default_room.clone());
    session.greet(&config.server.server_name);

    let mut line_buf = String::new();
    loop {
        line_buf.clear();
        match read_bounded_line(&mut reader, &mut line_buf, config.limits.max_line_length).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(%peer, error = %e, "read failed, closing connection");
                break;
            }
        }

        let line = line_buf.trim_end_matches(['\r', '\n']);
        if session.on_line(line) == Flow::Close {
            break;
        }
    }

    session.disconnect();
    let name = session.name().map(str::to_string);
    // Dropping the session drops the last strong sender; the writer drains and exits.
    drop(session);
    if let Err(e) = write_handle.await {
        warn!(%peer, error = %e, "writer task failed");
    }

    match name {
        Some(name) => info!(%peer, %name, "client disconnected"),
        None => info!(%peer, "client disconnected (no name)"),
    }
}

/// Render queued events and write them out until every sender is gone.
async fn write_loop<W>(mut writer: W, mut events: mpsc::Receiver<ChatEvent>, peer: String)
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = events.recv().await {
        let mut data = String::new();
        for line in formatter::event_lines(&event) {
            data.push_str(&line);
            data.push_str("\r\n");
        }
        if let Err(e) = writer.write_all(data.as_bytes()).await {
            debug!(%peer, error = %e, "write failed");
            return;
        }
    }
    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all_lines(input: &[u8], max_len: usize) -> Vec<std::io::Result<String>> {
        let mut reader = BufReader::with_capacity(8, input);
        let mut out = Vec::new();
        loop {
            let mut buf = String::new();
            match read_bounded_line(&mut reader, &mut buf, max_len).await {
                Ok(0) => break,
                Ok(_) => out.push(Ok(buf)),
                Err(e) => {
                    out.push(Err(e));
                    break;
                }
            }
        }
        out
    }

    #[tokio::test]
    async fn test_reads_lines_across_buffer_refills() {
        let lines = read_all_lines(b"a fairly long first line\r\nsecond\n", 64).await;
        let lines: Vec<String> = lines.into_iter().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["a fairly long first line\r\n", "second\n"]);
    }

    #[tokio::test]
    async fn test_final_line_without_terminator() {
        let lines = read_all_lines(b"hello\nbye", 64).await;
        let lines: Vec<String> = lines.into_iter().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["hello\n", "bye"]);
    }

    #[tokio::test]
    async fn test_line_too_long_is_error() {
        let lines = read_all_lines(b"0123456789abcdef\n", 10).await;
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].as_ref().unwrap_err().kind(),
            std::io::ErrorKind::InvalidData
        );
    }

    #[tokio::test]
    async fn test_limit_excludes_terminator() {
        let lines = read_all_lines(b"0123456789\r\nabcdefghij\n", 10).await;
        let lines: Vec<String> = lines.into_iter().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["0123456789\r\n", "abcdefghij\n"]);

        let lines = read_all_lines(b"0123456789a\r\n", 10).await;
        assert_eq!(
            lines[0].as_ref().unwrap_err().kind(),
            std::io::ErrorKind::InvalidData
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let lines = read_all_lines(b"caf\xff\n", 64).await;
        assert_eq!(lines[0].as_ref().unwrap(), "caf\u{fffd}\n");
    }

    #[tokio::test]
    async fn test_session_over_duplex_stream() {
        let (client, server) = tokio::io::duplex(4096);
        let registry = Arc::new(RoomRegistry::new());
        let config = Arc::new(ServerConfig::default());
        let task = tokio::spawn(handle_connection(
            server,
            "test".into(),
            registry.clone(),
            config,
        ));

        let (read_half, mut write_half) = tokio::io::split(client);
        let mut lines = BufReader::new(read_half).lines();

        assert_eq!(
            lines.next_line().await.unwrap().unwrap(),
            "Welcome to the XYZ chat server"
        );
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "Login Name?");

        write_half.write_all(b"alice\r\n/quit\r\n").await.unwrap();

        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            received.push(line);
        }
        assert_eq!(
            received,
            vec![
                "Welcome, alice!",
                "Entering room: DEFAULT",
                "* alice (this is you)",
                "end of list",
                "BYE",
            ]
        );

        task.await.unwrap();
        assert!(registry.is_name_free("alice"));
        assert_eq!(registry.room_count(), 0);
    }
}
