use serde_json::{json, Value};

use helpkit_core::{describe_turn, TurnResult};

use crate::protocol::JsonRpcResponse;
use crate::sessions::SessionRegistry;

// ---------------------------------------------------------------------------
// Method table
// ---------------------------------------------------------------------------

pub const METHODS: &[&str] = &[
    "initialize",
    "ping",
    "session/open",
    "session/message",
    "session/chip",
    "session/close",
    "catalog/topics",
];

enum TurnInput<'a> {
    Message(&'a str),
    Chip(&'a str),
}

// ---------------------------------------------------------------------------
// Session methods
// ---------------------------------------------------------------------------

pub fn session_open(id: Value, registry: &mut SessionRegistry) -> JsonRpcResponse {
    let (session_id, slot) = registry.open();
    let greeting = slot.session.greeting();
    JsonRpcResponse::ok(
        id,
        json!({
            "session": session_id,
            "openedAt": slot.opened_at.to_rfc3339(),
            "greeting": greeting,
            "view": describe_turn(None, &greeting),
        }),
    )
}

pub fn session_message(
    id: Value,
    params: &Option<Value>,
    registry: &mut SessionRegistry,
) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(id, "missing params"),
    };
    let text = match get_str(params, "text") {
        Some(t) => t,
        None => return JsonRpcResponse::invalid_params(id, "missing required field: text"),
    };
    run_turn(id, params, registry, TurnInput::Message(text))
}

pub fn session_chip(
    id: Value,
    params: &Option<Value>,
    registry: &mut SessionRegistry,
) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(id, "missing params"),
    };
    let label = match get_str(params, "label") {
        Some(l) => l,
        None => return JsonRpcResponse::invalid_params(id, "missing required field: label"),
    };
    run_turn(id, params, registry, TurnInput::Chip(label))
}

pub fn session_close(
    id: Value,
    params: &Option<Value>,
    registry: &mut SessionRegistry,
) -> JsonRpcResponse {
    let session = match params.as_ref().and_then(|p| get_str(p, "session")) {
        Some(s) => s,
        None => return JsonRpcResponse::invalid_params(id, "missing required field: session"),
    };
    match registry.close(session) {
        Some(slot) => JsonRpcResponse::ok(id, json!({ "closed": true, "turns": slot.turns })),
        None => JsonRpcResponse::ok(id, json!({ "closed": false, "turns": 0 })),
    }
}

fn run_turn(
    id: Value,
    params: &Value,
    registry: &mut SessionRegistry,
    input: TurnInput<'_>,
) -> JsonRpcResponse {
    let session_id = match get_str(params, "session") {
        Some(s) => s,
        None => return JsonRpcResponse::invalid_params(id, "missing required field: session"),
    };
    let slot = match registry.touch(session_id) {
        Some(slot) => slot,
        None => return JsonRpcResponse::unknown_session(id, session_id),
    };

    let (echo, turn) = match input {
        TurnInput::Message(text) => (text, slot.session.handle_user_message(text)),
        TurnInput::Chip(label) => (label, slot.session.handle_chip_click(label)),
    };

    match turn {
        Some(turn) => {
            slot.turns += 1;
            JsonRpcResponse::ok(id, turn_payload(echo, &turn))
        }
        // blank input: no turn, the widget keeps its current view
        None => JsonRpcResponse::ok(id, Value::Null),
    }
}

fn turn_payload(echo: &str, turn: &TurnResult) -> Value {
    json!({
        "turn": turn,
        "view": describe_turn(Some(echo), turn),
    })
}

// ---------------------------------------------------------------------------
// Catalog methods
// ---------------------------------------------------------------------------

pub fn catalog_topics(id: Value, registry: &SessionRegistry) -> JsonRpcResponse {
    let catalog = registry.catalog();
    let topics: Vec<Value> = catalog
        .kb
        .iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "keys": entry.keys,
                "suggestions": catalog.suggestions.suggestions_for(Some(entry.id.as_str())),
            })
        })
        .collect();
    JsonRpcResponse::ok(
        id,
        json!({
            "topics": topics,
            "home": catalog.suggestions.home(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn get_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}
