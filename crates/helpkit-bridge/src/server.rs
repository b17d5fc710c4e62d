use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error};

use helpkit_core::Catalog;

use crate::handlers;
use crate::protocol::{JsonRpcMessage, JsonRpcResponse, PARSE_ERROR};
use crate::sessions::SessionRegistry;

const SERVER_NAME: &str = "helpkit";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the bridge on stdio. Blocks until stdin is closed.
pub fn run_server(catalog: Arc<Catalog>, max_sessions: usize) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut registry = SessionRegistry::new(catalog, max_sessions);
    serve(stdin.lock(), &mut stdout, &mut registry)
}

/// Request loop over any line source. One request per line, one response
/// line per request that carries an id.
pub fn serve<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    registry: &mut SessionRegistry,
) -> anyhow::Result<()> {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: JsonRpcMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                error!("invalid JSON-RPC: {e}");
                let resp =
                    JsonRpcResponse::err(Value::Null, PARSE_ERROR, format!("parse error: {e}"));
                write_response(writer, &resp)?;
                continue;
            }
        };

        let method = msg.method.as_deref().unwrap_or("");
        debug!("bridge request: {method}");

        // Notifications have no id, no response
        let id = match msg.id {
            Some(id) => id,
            None => continue,
        };

        let response = match method {
            "initialize" => handle_initialize(id),
            "ping" => JsonRpcResponse::ok(id, json!({})),
            "session/open" => handlers::session_open(id, registry),
            "session/message" => handlers::session_message(id, &msg.params, registry),
            "session/chip" => handlers::session_chip(id, &msg.params, registry),
            "session/close" => handlers::session_close(id, &msg.params, registry),
            "catalog/topics" => handlers::catalog_topics(id, registry),
            other => JsonRpcResponse::method_not_found(id, other),
        };

        write_response(writer, &response)?;
    }

    Ok(())
}

fn write_response<W: Write>(writer: &mut W, resp: &JsonRpcResponse) -> anyhow::Result<()> {
    let json = serde_json::to_string(resp)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

fn handle_initialize(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::ok(
        id,
        json!({
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "capabilities": {
                "methods": handlers::METHODS
            },
            "instructions": BRIDGE_INSTRUCTIONS
        }),
    )
}

const BRIDGE_INSTRUCTIONS: &str = "\
Open a session with session/open and render its greeting.\n\
Send typed text with session/message and chip clicks with session/chip.\n\
A null result means the input was blank: keep the current view.\n\
Replies are escaped HTML and safe to insert as-is.";
