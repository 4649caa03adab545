use std::collections::HashSet;

use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use boar_core::{BoarError, BoarConfig, Relation, Result};

use crate::modules::OPTIONAL_MODULES;
use crate::xmlrpc::{json_to_value, value_to_json, XmlRpcEndpoint};

/// Snapshot of an authenticated ERP connection. Refreshed whenever a call
/// fails with an authentication error; never shared across processes.
#[derive(Debug, Clone, Default)]
struct ErpSession {
    server_version: String,
    user_id: i64,
    available_models: HashSet<String>,
}

/// Typed, reconnecting XML-RPC client in front of one Odoo database.
///
/// A single instance is shared (behind an `Arc`) across the whole service;
/// re-authentication is serialized through `session` so concurrent callers
/// that all hit `ErpUnreachable` at once don't all try to log in at once.
pub struct ErpGateway {
    db: String,
    user: String,
    password: String,
    common: XmlRpcEndpoint,
    object: XmlRpcEndpoint,
    session: Mutex<Option<ErpSession>>,
}

impl ErpGateway {
    pub fn new(config: &BoarConfig) -> Result<Self> {
        let common = XmlRpcEndpoint::new(&config.erp.url, "/xmlrpc/2/common", config.erp.timeout_secs)?;
        let object = XmlRpcEndpoint::new(&config.erp.url, "/xmlrpc/2/object", config.erp.timeout_secs)?;
        Ok(Self {
            db: config.erp.db.clone(),
            user: config.erp.user.clone(),
            password: config.erp.password.clone(),
            common,
            object,
            session: Mutex::new(None),
        })
    }

    /// Authenticates if not already connected, then discovers optional
    /// modules. Idempotent: a second call while already connected is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn ensure_connected(&self) -> Result<()> {
        if self.session.lock().await.is_some() {
            return Ok(());
        }
        self.connect().await
    }

    async fn connect(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let server_version: String = self
            .common
            .call("version", ())
            .await
            .map_err(|_| BoarError::ErpUnreachable(self.db.clone()))?;

        let user_id: i64 = self
            .common
            .call(
                "authenticate",
                (
                    self.db.clone(),
                    self.user.clone(),
                    self.password.clone(),
                    std::collections::HashMap::<String, dxr::Value>::new(),
                ),
            )
            .await
            .map_err(|e| BoarError::ErpUnreachable(e.to_string()))?;

        if user_id == 0 {
            return Err(BoarError::ErpAuthFailed(self.user.clone()));
        }

        let mut session = ErpSession {
            server_version,
            user_id,
            available_models: HashSet::new(),
        };
        drop(guard);
        session.available_models = self.discover_modules(user_id).await?;

        *self.session.lock().await = Some(session);
        Ok(())
    }

    /// Probes the fixed optional-module list against `ir.model`, seeding
    /// `available_models` for `require_model` to consult later.
    async fn discover_modules(&self, user_id: i64) -> Result<HashSet<String>> {
        let mut found = HashSet::new();
        for model in OPTIONAL_MODULES {
            let domain = json!([["model", "=", model]]);
            let count = self
                .raw_execute_kw(user_id, "ir.model", "search_count", json!([domain]), json!({}))
                .await
                .unwrap_or(json!(0));
            if count.as_i64().unwrap_or(0) > 0 {
                found.insert((*model).to_string());
            }
        }
        Ok(found)
    }

    /// Raises `ErpModuleMissing` when `model` was not found installed at
    /// connect time. Callers must check this before using an optional model
    /// so the HTTP layer can degrade to 503 instead of a raw call failure.
    pub async fn require_model(&self, model: &str) -> Result<()> {
        self.ensure_connected().await?;
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(BoarError::ErpAuthFailed(self.user.clone()))?;
        if session.available_models.contains(model) {
            Ok(())
        } else {
            Err(BoarError::ErpModuleMissing {
                model: model.to_string(),
            })
        }
    }

    async fn current_user_id(&self) -> Result<i64> {
        self.ensure_connected().await?;
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .map(|s| s.user_id)
            .ok_or(BoarError::ErpAuthFailed(self.user.clone()))
    }

    /// `execute(model, method, args, kwargs)` — the escape hatch for calls
    /// not covered by the typed helpers below. Transparently re-authenticates
    /// and retries once on `ErpUnreachable`.
    #[instrument(skip(self, args, kwargs))]
    pub async fn execute(&self, model: &str, method: &str, args: Value, kwargs: Value) -> Result<Value> {
        let user_id = self.current_user_id().await?;
        match self.raw_execute_kw(user_id, model, method, args.clone(), kwargs.clone()).await {
            Ok(v) => Ok(v),
            Err(BoarError::ErpUnreachable(reason)) => {
                warn!(model, method, reason, "ERP call failed, re-authenticating once");
                *self.session.lock().await = None;
                self.connect().await?;
                let user_id = self.current_user_id().await?;
                self.raw_execute_kw(user_id, model, method, args, kwargs).await
            }
            Err(e) => Err(e),
        }
    }

    async fn raw_execute_kw(&self, user_id: i64, model: &str, method: &str, args: Value, kwargs: Value) -> Result<Value> {
        let params = (
            self.db.clone(),
            user_id,
            self.password.clone(),
            model.to_string(),
            method.to_string(),
            json_to_value(&args),
            json_to_value(&kwargs),
        );
        let result: dxr::Value = match self.object.call("execute_kw", params).await {
            Ok(v) => v,
            Err(e @ BoarError::ErpUnreachable(_)) => return Err(e),
            Err(e) => {
                return Err(BoarError::ErpCallFailed {
                    model: model.to_string(),
                    method: method.to_string(),
                    cause: e.to_string(),
                })
            }
        };
        Ok(value_to_json(&result))
    }

    pub async fn search(&self, model: &str, domain: Value, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<i64>> {
        let kwargs = json!({ "limit": limit, "offset": offset.unwrap_or(0) });
        let ids = self.execute(model, "search", json!([domain]), kwargs).await?;
        Ok(ids.as_array().into_iter().flatten().filter_map(|v| v.as_i64()).collect())
    }

    pub async fn read(&self, model: &str, ids: Vec<i64>, fields: Vec<&str>) -> Result<Vec<Value>> {
        let kwargs = json!({ "fields": fields });
        let result = self.execute(model, "read", json!([ids]), kwargs).await?;
        Ok(result.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self, domain))]
    pub async fn search_read(
        &self,
        model: &str,
        domain: Value,
        fields: Vec<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
        order: Option<&str>,
    ) -> Result<Vec<Value>> {
        let kwargs = json!({
            "fields": fields,
            "limit": limit,
            "offset": offset.unwrap_or(0),
            "order": order,
        });
        let result = self.execute(model, "search_read", json!([domain]), kwargs).await?;
        Ok(result.as_array().cloned().unwrap_or_default())
    }

    pub async fn search_count(&self, model: &str, domain: Value) -> Result<i64> {
        let result = self.execute(model, "search_count", json!([domain]), json!({})).await?;
        Ok(result.as_i64().unwrap_or(0))
    }

    pub async fn create(&self, model: &str, values: Value) -> Result<i64> {
        let result = self.execute(model, "create", json!([values]), json!({})).await?;
        result.as_i64().ok_or_else(|| BoarError::ErpCallFailed {
            model: model.to_string(),
            method: "create".to_string(),
            cause: "response was not an id".to_string(),
        })
    }

    pub async fn write(&self, model: &str, ids: Vec<i64>, values: Value) -> Result<bool> {
        let result = self.execute(model, "write", json!([ids, values]), json!({})).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    pub async fn unlink(&self, model: &str, ids: Vec<i64>) -> Result<bool> {
        let result = self.execute(model, "unlink", json!([ids]), json!({})).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// Reads and normalizes an `ir.config_parameter` row. Used by the OTP
    /// authenticator to persist `telegram_link_<external_id>` bindings.
    pub async fn get_config_parameter(&self, key: &str) -> Result<Option<String>> {
        self.require_model("ir.config_parameter").await.ok();
        let rows = self
            .search_read(
                "ir.config_parameter",
                json!([["key", "=", key]]),
                vec!["value"],
                Some(1),
                None,
                None,
            )
            .await?;
        Ok(rows.first().and_then(|r| r.get("value")).and_then(|v| v.as_str()).map(str::to_string))
    }

    pub async fn set_config_parameter(&self, key: &str, value: &str) -> Result<()> {
        let existing = self
            .search("ir.config_parameter", json!([["key", "=", key]]), Some(1), None)
            .await?;
        if let Some(&id) = existing.first() {
            self.write("ir.config_parameter", vec![id], json!({ "value": value })).await?;
        } else {
            self.create("ir.config_parameter", json!({ "key": key, "value": value })).await?;
        }
        Ok(())
    }

    pub async fn delete_config_parameter(&self, key: &str) -> Result<()> {
        let existing = self
            .search("ir.config_parameter", json!([["key", "=", key]]), Some(1), None)
            .await?;
        if let Some(&id) = existing.first() {
            self.unlink("ir.config_parameter", vec![id]).await?;
        }
        Ok(())
    }

    /// Normalizes a many2one field already fetched via `read`/`search_read`.
    pub fn relation(value: &Value) -> Relation {
        Relation::from_raw(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_helper_matches_core_parsing() {
        let raw = json!([7, "Accounting"]);
        assert_eq!(ErpGateway::relation(&raw), Relation::Ref { id: 7, name: "Accounting".into() });
        assert_eq!(ErpGateway::relation(&json!(false)), Relation::Empty);
    }
}
