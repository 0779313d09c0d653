//! Key list command.
//!
//! List stored contexts with where their key comes from and its public key.

use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::{key_manager, output};
use crate::core::domain::Context;
use crate::core::keys::{parse_identity, KeyManager};
use crate::error::Result;

const NOT_SET: &str = "<not set>";

struct Row {
    name: String,
    source: String,
    public_key: Option<String>,
    private_key: Option<Zeroizing<String>>,
}

fn source(ctx: &Context) -> String {
    match (ctx.has_private_key(), ctx.reference()) {
        (true, _) => "local".to_string(),
        (false, Some(reference)) => format!("cluster ({reference})"),
        (false, None) => "none".to_string(),
    }
}

fn row(manager: &KeyManager, name: String, ctx: &Context, show_sensitive: bool) -> Row {
    let material = match manager.private_key_material(Some(&name)) {
        Ok(material) => Some(material),
        Err(e) => {
            debug!(context = %name, error = %e, "no usable key");
            None
        }
    };
    let public_key = material
        .as_ref()
        .and_then(|m| parse_identity(m).ok())
        .map(|identity| identity.to_public().to_string());

    Row {
        source: source(ctx),
        public_key,
        private_key: material.filter(|_| show_sensitive),
        name,
    }
}

/// List contexts.
pub fn execute(show_sensitive: bool, json: bool) -> Result<()> {
    let manager = key_manager()?;
    let rows: Vec<Row> = manager
        .contexts()?
        .into_iter()
        .map(|(name, ctx)| row(&manager, name, &ctx, show_sensitive))
        .collect();

    if json {
        let contexts: Vec<_> = rows
            .iter()
            .map(|r| {
                let mut entry = serde_json::json!({
                    "name": r.name,
                    "source": r.source,
                    "public_key": r.public_key,
                });
                if show_sensitive {
                    let key = r.private_key.as_ref().map(|k| k.as_str());
                    entry["private_key"] = serde_json::json!(key);
                }
                entry
            })
            .collect();

        let result = serde_json::json!({
            "storage_mode": manager.mode().as_str(),
            "contexts": contexts,
            "count": rows.len(),
        });
        output::data(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if rows.is_empty() {
        output::dimmed("no contexts stored");
        output::hint(&format!("run: {}", output::cmd("kage key add")));
        return Ok(());
    }

    let local = manager.contexts_with_keys()?.len();
    output::blank();
    output::header(&format!(
        "{} contexts, {local} with a local key (storage mode: {})",
        rows.len(),
        manager.mode()
    ));
    output::rule();
    for r in &rows {
        output::data(&output::key(&r.name));
        output::kv("source     ", &r.source);
        match &r.public_key {
            Some(key) => output::kv("public key ", key),
            None => output::kv("public key ", output::missing(NOT_SET)),
        }
        if show_sensitive {
            match &r.private_key {
                Some(key) => output::kv("private key", key.as_str()),
                None => output::kv("private key", output::missing(NOT_SET)),
            }
        }
    }

    Ok(())
}
