//! LSP Transport Layer
//!
//! Handles LSP message framing with Content-Length headers.
//! Provides async read/write with proper buffering.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::protocol::{Message, Notification, Request, Response};

/// Reader half of an LSP connection
pub struct Transport<R> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin> Transport<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the next message from the server
    ///
    /// LSP messages are framed with headers:
    /// ```text
    /// Content-Length: 123\r\n
    /// \r\n
    /// {"jsonrpc":"2.0",...}
    /// ```
    pub async fn read_message(&mut self) -> io::Result<Message> {
        let json = self.read_frame().await?;
        Message::parse(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Read the next framed body without interpreting it
    ///
    /// Errors here mean the stream itself is unusable; a body that is not a
    /// valid message is the caller's concern.
    pub async fn read_frame(&mut self) -> io::Result<String> {
        let content_length = self.read_headers().await?;

        let mut body = vec![0u8; content_length];
        self.reader.read_exact(&mut body).await?;

        let json =
            String::from_utf8(body).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        tracing::trace!("LSP <- {}", json);
        Ok(json)
    }

    /// Read headers and return Content-Length
    async fn read_headers(&mut self) -> io::Result<usize> {
        let mut content_length: Option<usize> = None;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = self.reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "Server closed connection",
                ));
            }

            let line = line.trim();

            // Empty line marks end of headers
            if line.is_empty() {
                break;
            }

            if let Some(value) = line.strip_prefix("Content-Length:") {
                content_length = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
                );
            }
            // Ignore other headers (Content-Type, etc.)
        }

        content_length
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "Missing Content-Length"))
    }
}

pub async fn write_request<W: AsyncWrite + Unpin>(writer: &mut W, request: &Request) -> io::Result<()> {
    let json = serde_json::to_string(request)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    write_message(writer, &json).await
}

pub async fn write_notification<W: AsyncWrite + Unpin>(
    writer: &mut W,
    notification: &Notification,
) -> io::Result<()> {
    let json = serde_json::to_string(notification)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    write_message(writer, &json).await
}

/// Answer a server-initiated request
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    write_message(writer, &json).await
}

/// Write a raw JSON message with LSP framing
async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> io::Result<()> {
    tracing::trace!("LSP -> {}", json);

    let message = format!("Content-Length: {}\r\n\r\n{}", json.len(), json);
    writer.write_all(message.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(json: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", json.len(), json).into_bytes()
    }

    #[tokio::test]
    async fn test_read_framed_messages() {
        let first = r#"{"jsonrpc":"2.0","id":1,"result":null}"#;
        let second = r#"{"jsonrpc":"2.0","method":"window/logMessage","params":{"type":3,"message":"ok"}}"#;

        let mock = tokio_test::io::Builder::new()
            .read(&frame(first))
            .read(b"Content-Type: application/vscode-jsonrpc; charset=utf-8\r\n")
            .read(&frame(second))
            .build();

        let mut transport = Transport::new(mock);
        assert!(matches!(
            transport.read_message().await.unwrap(),
            Message::Response(_)
        ));
        assert!(matches!(
            transport.read_message().await.unwrap(),
            Message::Notification(_)
        ));
    }

    #[tokio::test]
    async fn test_eof_is_error() {
        let mock = tokio_test::io::Builder::new().build();
        let mut transport = Transport::new(mock);
        let err = transport.read_message().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_missing_content_length() {
        let mock = tokio_test::io::Builder::new()
            .read(b"Content-Type: x\r\n\r\n")
            .build();
        let mut transport = Transport::new(mock);
        let err = transport.read_message().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_write_round_trip() {
        let (mut client, server) = tokio::io::duplex(1024);
        let request = Request::new(7, "textDocument/documentSymbol", None);
        write_request(&mut client, &request).await.unwrap();

        let mut transport = Transport::new(server);
        match transport.read_message().await.unwrap() {
            Message::Response(_) | Message::Notification(_) => panic!("expected request"),
            Message::Request(req) => {
                assert_eq!(req.method, "textDocument/documentSymbol");
                assert_eq!(req.id, super::super::protocol::RequestId::Number(7));
            }
        }
    }
}
