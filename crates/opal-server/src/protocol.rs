//! PostgreSQL v3 wire protocol framing.
//!
//! Every message after startup is a one-byte tag, a four-byte big-endian
//! length that includes itself, and a body. The builders here produce
//! complete frames as [`Bytes`]; the readers consume frames from an async
//! stream.
//!
//! Only the subset a simple-query client exercises is implemented:
//! inbound startup / SSLRequest / `Q` / `X`, outbound `N`, `R`, `S`, `Z`,
//! `T`, `D`, `C`.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use opal_sql::executor::Value;

/// Magic code carried by an SSLRequest instead of a protocol version.
pub const SSL_REQUEST_CODE: u32 = 80877103;

/// Transaction status reported by ReadyForQuery: always idle.
const STATUS_IDLE: u8 = b'I';

/// Placeholder table OID reported in RowDescription.
const TABLE_OID: u32 = 0x0000_4006;

/// Type OID reported for every column (varchar); values travel as text.
const TYPE_OID_VARCHAR: u32 = 0x0000_0413;

/// Wire marker for a NULL cell in DataRow.
const NULL_CELL: i32 = -1;

/// A message from the client, read after startup.
#[derive(Debug, PartialEq, Eq)]
pub enum FrontendMessage {
    /// `Q`: a simple query carrying SQL text.
    Query(String),
    /// `X`: terminate the connection.
    Terminate,
    /// Any other tag; the body has been consumed and discarded.
    Other(u8),
}

/// `N`: the single-byte SSL denial sent in response to an SSLRequest.
pub fn ssl_denied() -> Bytes {
    Bytes::from_static(b"N")
}

/// `R`: AuthenticationOk (auth type 0).
pub fn authentication_ok() -> Bytes {
    let mut buf = BytesMut::with_capacity(9);
    buf.put_u8(b'R');
    buf.put_u32(8);
    buf.put_u32(0);
    buf.freeze()
}

/// `S`: ParameterStatus with a name/value pair.
pub fn parameter_status(name: &str, value: &str) -> Bytes {
    let body_len = name.len() + 1 + value.len() + 1;
    let mut buf = BytesMut::with_capacity(1 + 4 + body_len);
    buf.put_u8(b'S');
    buf.put_u32((4 + body_len) as u32);
    buf.put_slice(name.as_bytes());
    buf.put_u8(0);
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
    buf.freeze()
}

/// `Z`: ReadyForQuery, status idle.
pub fn ready_for_query() -> Bytes {
    let mut buf = BytesMut::with_capacity(6);
    buf.put_u8(b'Z');
    buf.put_u32(5);
    buf.put_u8(STATUS_IDLE);
    buf.freeze()
}

/// `C`: CommandComplete with the given tag string (`SELECT n`, `OK`, or an
/// error message).
pub fn command_complete(tag: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + 4 + tag.len() + 1);
    buf.put_u8(b'C');
    buf.put_u32((4 + tag.len() + 1) as u32);
    buf.put_slice(tag.as_bytes());
    buf.put_u8(0);
    buf.freeze()
}

/// `T`: RowDescription for the given column labels.
///
/// Per column: NUL-terminated name, table OID, 1-based column number, type
/// OID, type size -1, type modifier -1, text format code.
pub fn row_description(columns: &[String]) -> Bytes {
    let mut body = BytesMut::new();
    body.put_u16(columns.len() as u16);
    for (i, column) in columns.iter().enumerate() {
        body.put_slice(column.as_bytes());
        body.put_u8(0);
        body.put_u32(TABLE_OID);
        body.put_u16((i + 1) as u16);
        body.put_u32(TYPE_OID_VARCHAR);
        body.put_i16(-1);
        body.put_i32(-1);
        body.put_u16(0);
    }

    frame(b'T', &body)
}

/// `D`: DataRow. NULL cells carry the `-1` length marker; every other value
/// is stringified and sent as length-prefixed text.
pub fn data_row(values: &[Value]) -> Bytes {
    let mut body = BytesMut::new();
    body.put_u16(values.len() as u16);
    for value in values {
        if value.is_null() {
            body.put_i32(NULL_CELL);
        } else {
            let text = value.to_string();
            body.put_u32(text.len() as u32);
            body.put_slice(text.as_bytes());
        }
    }

    frame(b'D', &body)
}

/// Wraps a body in a tagged, length-prefixed frame.
fn frame(tag: u8, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + 4 + body.len());
    buf.put_u8(tag);
    buf.put_u32((4 + body.len()) as u32);
    buf.put_slice(body);
    buf.freeze()
}

/// Reads the untagged, length-prefixed startup packet, returning its
/// payload (the bytes after the length field).
pub async fn read_startup_packet<R>(reader: &mut R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len < 4 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "startup packet too short",
        ));
    }
    let mut payload = vec![0u8; len - 4];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Returns true if a startup payload is an SSLRequest.
pub fn is_ssl_request(payload: &[u8]) -> bool {
    payload.len() == 4 && u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) == SSL_REQUEST_CODE
}

/// Reads one tagged message. Returns `None` on a clean end of stream.
pub async fn read_message<R>(reader: &mut R) -> std::io::Result<Option<FrontendMessage>>
where
    R: AsyncRead + Unpin,
{
    let tag = match reader.read_u8().await {
        Ok(tag) => tag,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };

    let len = reader.read_u32().await? as usize;
    if len < 4 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "message length too short",
        ));
    }
    let mut body = vec![0u8; len - 4];
    reader.read_exact(&mut body).await?;

    match tag {
        b'Q' => {
            // The query string is NUL-terminated.
            let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
            let sql = String::from_utf8_lossy(&body[..end]).into_owned();
            Ok(Some(FrontendMessage::Query(sql)))
        }
        b'X' => Ok(Some(FrontendMessage::Terminate)),
        other => Ok(Some(FrontendMessage::Other(other))),
    }
}
