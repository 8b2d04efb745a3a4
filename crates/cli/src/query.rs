//! `repairdesk query` -- run one operation document without a server.

use std::path::Path;
use std::process;

use repairdesk_core::{dispatch, Envelope};
use repairdesk_storage::{JsonFileStore, MemoryStore};

/// Build the request body the operation endpoint would receive.
///
/// `variables` must be a JSON object when given.
pub(crate) fn build_body(document: &str, variables: Option<&str>) -> Result<Vec<u8>, String> {
    let mut body = serde_json::Map::new();
    body.insert(
        "query".to_string(),
        serde_json::Value::String(document.to_string()),
    );
    if let Some(raw) = variables {
        let parsed: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| format!("--variables is not valid JSON: {}", e))?;
        if !parsed.is_object() {
            return Err("--variables must be a JSON object".to_string());
        }
        body.insert("variables".to_string(), parsed);
    }
    serde_json::to_vec(&serde_json::Value::Object(body)).map_err(|e| e.to_string())
}

async fn run(body: &[u8], data_file: Option<&Path>) -> Result<Envelope, String> {
    match data_file {
        Some(path) => {
            let store = JsonFileStore::open(path).await.map_err(|e| e.to_string())?;
            Ok(dispatch(&store, body).await)
        }
        None => {
            let store = MemoryStore::new();
            Ok(dispatch(&store, body).await)
        }
    }
}

pub(crate) fn cmd_query(
    document: &str,
    variables: Option<&str>,
    data_file: Option<&Path>,
    compact: bool,
) {
    let body = match build_body(document, variables) {
        Ok(b) => b,
        Err(msg) => {
            eprintln!("error: {}", msg);
            process::exit(2);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };
    let envelope = match rt.block_on(run(&body, data_file)) {
        Ok(env) => env,
        Err(msg) => {
            eprintln!("error: {}", msg);
            process::exit(1);
        }
    };

    let json = envelope.to_json();
    let rendered = if compact {
        serde_json::to_string(&json)
    } else {
        serde_json::to_string_pretty(&json)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }

    if !envelope.is_success() {
        process::exit(1);
    }
}
