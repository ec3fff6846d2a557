//! Per-connection query handling.
//!
//! Each connection runs the startup handshake, then loops over simple-query
//! messages. Statement errors are reported to the client as a
//! CommandComplete bearing the error text followed by ReadyForQuery; the
//! connection keeps serving. I/O errors end the handler.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::database::{Database, StatementOutcome};
use crate::protocol::{self, FrontendMessage};

/// Serves one client connection to completion.
pub async fn handle_connection(mut stream: TcpStream, db: Arc<Database>) -> std::io::Result<()> {
    startup(&mut stream).await?;

    loop {
        match protocol::read_message(&mut stream).await? {
            None | Some(FrontendMessage::Terminate) => return Ok(()),
            Some(FrontendMessage::Other(tag)) => {
                debug!(tag, "ignoring message");
            }
            Some(FrontendMessage::Query(sql)) => {
                debug!(query = %sql, "executing");
                match db.execute(&sql) {
                    Ok(outcomes) => {
                        for outcome in outcomes {
                            write_outcome(&mut stream, outcome).await?;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, query = %sql, "statement failed");
                        stream
                            .write_all(&protocol::command_complete(&format!("ERROR: {}", e)))
                            .await?;
                    }
                }
                stream.write_all(&protocol::ready_for_query()).await?;
            }
        }
    }
}

/// Runs the startup handshake: deny SSL if requested, accept the startup
/// packet, authenticate unconditionally, and report session parameters.
async fn startup(stream: &mut TcpStream) -> std::io::Result<()> {
    let payload = protocol::read_startup_packet(stream).await?;
    if protocol::is_ssl_request(&payload) {
        stream.write_all(&protocol::ssl_denied()).await?;
        protocol::read_startup_packet(stream).await?;
    }

    stream.write_all(&protocol::authentication_ok()).await?;
    stream
        .write_all(&protocol::parameter_status("client_encoding", "UTF8"))
        .await?;
    stream
        .write_all(&protocol::parameter_status("server_version", "12.6"))
        .await?;
    stream.write_all(&protocol::ready_for_query()).await?;
    Ok(())
}

/// Writes the frames for one statement outcome.
async fn write_outcome(stream: &mut TcpStream, outcome: StatementOutcome) -> std::io::Result<()> {
    match outcome {
        StatementOutcome::Query(result) => {
            stream
                .write_all(&protocol::row_description(&result.columns))
                .await?;
            for row in &result.rows {
                stream.write_all(&protocol::data_row(row)).await?;
            }
            stream
                .write_all(&protocol::command_complete(&format!(
                    "SELECT {}",
                    result.num_rows()
                )))
                .await?;
        }
        StatementOutcome::Command => {
            stream
                .write_all(&protocol::command_complete("OK"))
                .await?;
        }
    }
    Ok(())
}
