use std::collections::HashMap;

use dxr::{TryFromValue, TryToParams, TryToValue, Value};
use dxr_client::{Call, Client, Url};

use boar_core::{BoarError, Result};

/// Converts a dynamic `serde_json::Value` into an XML-RPC `Value`.
///
/// `execute_kw` arguments come from call sites that build ERP domains and
/// field lists as plain JSON, so the Gateway needs a JSON↔XML-RPC bridge
/// rather than per-call typed structs. `allow_none` on the Odoo side means
/// `Value::nil()` is a legal argument — `serde_json::Value::Null` maps to it.
pub fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::nil(),
        serde_json::Value::Bool(b) => Value::boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::i8(i)
            } else {
                Value::double(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::string(s.clone()),
        serde_json::Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(json_to_value).collect();
            values.try_to_value().expect("Value-to-Value conversion cannot fail")
        }
        serde_json::Value::Object(map) => {
            let entries: HashMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect();
            entries.try_to_value().expect("Value-to-Value conversion cannot fail")
        }
    }
}

/// Converts an XML-RPC `Value` (ERP response) into `serde_json::Value`.
/// Relations surface here as two-element arrays or `false` — left for
/// `boar_core::Relation::from_raw` to normalize, not this function.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    if let Ok(b) = bool::try_from_value(value) {
        return serde_json::Value::Bool(b);
    }
    if let Ok(i) = i64::try_from_value(value) {
        return serde_json::json!(i);
    }
    if let Ok(d) = f64::try_from_value(value) {
        return serde_json::json!(d);
    }
    if let Ok(s) = String::try_from_value(value) {
        return serde_json::Value::String(s);
    }
    if let Ok(items) = Vec::<Value>::try_from_value(value) {
        return serde_json::Value::Array(items.iter().map(value_to_json).collect());
    }
    if let Ok(entries) = HashMap::<String, Value>::try_from_value(value) {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k, value_to_json(&v)))
            .collect();
        return serde_json::Value::Object(map);
    }
    serde_json::Value::Null
}

/// Thin wrapper around a `dxr_client::Client` pointed at one XML-RPC
/// endpoint (either `/xmlrpc/2/common` or `/xmlrpc/2/object`).
///
/// Keeping the `dxr` types out of `gateway.rs` means a future transport
/// swap only touches this file.
pub struct XmlRpcEndpoint {
    client: Client,
}

impl XmlRpcEndpoint {
    pub fn new(base_url: &str, path: &str, timeout_secs: u64) -> Result<Self> {
        let url: Url = format!("{}{}", base_url.trim_end_matches('/'), path)
            .parse()
            .map_err(|e| BoarError::Config(format!("invalid ERP URL: {e}")))?;
        let reqwest_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BoarError::Config(format!("failed to build ERP HTTP client: {e}")))?;
        let client = Client::with_client(url, reqwest_client);
        Ok(Self { client })
    }

    /// Calls an XML-RPC method, translating transport failures into
    /// `ErpUnreachable` so callers can decide whether a retry makes sense.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: TryToParams + Send,
        R: TryFromValue,
    {
        self.client
            .call(Call::new(method, params))
            .await
            .map_err(|e| BoarError::ErpUnreachable(e.to_string()))
    }
}
