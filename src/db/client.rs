//! Statement execution entry point.
//!
//! [`ClickhouseClient`] is a stateless dispatcher: it formats a statement,
//! hands it to a [`Transport`] and interprets the response. Nothing is cached
//! between calls.

use super::http::HttpTransport;
use super::response::interpret;
use super::schema::{is_view_definition, ColumnDescriptor, TableDescriptor};
use super::statement::{encode_params, normalize_insert, Statement};
use super::types::{Response, TabularResult, Value};
use super::Transport;
use crate::error::{ClientError, Result};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Prefix ClickHouse gives the storage tables behind materialized views.
const INNER_TABLE_PREFIX: &str = ".inner.";

/// ClickHouse client over a transport.
#[derive(Debug, Clone)]
pub struct ClickhouseClient<T: Transport = HttpTransport> {
    transport: T,
}

impl<T: Transport> ClickhouseClient<T> {
    /// Creates a client over an already connected transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one statement and interprets the response.
    ///
    /// Every other operation goes through here.
    pub async fn execute(&self, statement: Statement) -> Result<Response> {
        let formatted = statement.formatted_sql();
        let query = encode_params(self.transport.database(), &formatted);

        if self.transport.debug() {
            info!("Executing: {}", formatted);
        } else {
            debug!("Executing: {}", formatted);
        }

        let start = Instant::now();
        let raw = self.transport.send(&query, statement.body).await?;
        let elapsed = start.elapsed();

        let response = interpret(raw, statement.format.as_ref());
        match &response {
            Ok(_) => debug!("Statement finished in {:?}", elapsed),
            Err(e) => warn!("Statement failed after {:?}: {}", elapsed, e),
        }
        response
    }

    /// Runs a read statement and returns the full result.
    ///
    /// A body without a JSON document (e.g. after DDL) yields an empty result.
    pub async fn query(&self, sql: &str) -> Result<TabularResult> {
        self.execute(Statement::query(sql)).await?.into_table()
    }

    /// Runs an INSERT.
    ///
    /// ` DEFAULT VALUES` is rewritten to ` VALUES` before sending, and no
    /// output format is requested.
    pub async fn insert(&self, sql: &str) -> Result<()> {
        self.execute(Statement::raw(normalize_insert(sql))).await?;
        Ok(())
    }

    /// Runs an INSERT whose rows travel in the request body.
    pub async fn insert_with_body(&self, sql: &str, body: impl Into<String>) -> Result<()> {
        self.execute(Statement::raw(normalize_insert(sql)).with_body(body))
            .await?;
        Ok(())
    }

    /// Row-level updates are not supported by the store; nothing is sent.
    pub async fn update(&self, _sql: &str) -> Result<()> {
        Err(ClientError::unsupported("ClickHouse update is not supported"))
    }

    /// Row-level deletes are not supported by the store; nothing is sent.
    pub async fn delete(&self, _sql: &str) -> Result<()> {
        Err(ClientError::unsupported("ClickHouse delete is not supported"))
    }

    /// Lists table names in the configured database.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let table = self.query("SHOW TABLES").await?;
        Ok(table.into_flat_values().iter().map(value_text).collect())
    }

    /// Lists every relation that can be queried; same as [`Self::list_tables`].
    pub async fn data_sources(&self) -> Result<Vec<String>> {
        self.list_tables().await
    }

    /// Describes the columns of a table.
    ///
    /// Fails with [`ClientError::TableNotFound`] when the server returns no
    /// columns.
    pub async fn describe_table(&self, name: &str) -> Result<Vec<ColumnDescriptor>> {
        let result = self.query(&format!("DESCRIBE TABLE {name}")).await?;
        if result.is_empty() {
            return Err(ClientError::table_not_found(name));
        }
        ColumnDescriptor::from_describe(&result)
    }

    /// Secondary indexes of a table. The store has none, so this is always empty.
    pub fn indexes(&self, _table: &str) -> Vec<String> {
        Vec::new()
    }

    /// Returns `Some("id")` when the table's first column is `id`.
    pub async fn primary_key(&self, table: &str) -> Result<Option<String>> {
        let columns = self.describe_table(table).await?;
        Ok(columns
            .into_iter()
            .next()
            .filter(|c| c.name == "id")
            .map(|c| c.name))
    }

    /// Returns the `CREATE` statement of a table.
    ///
    /// A leading `.inner.` is stripped from the name first.
    pub async fn show_create_table(&self, name: &str) -> Result<String> {
        let name = name.strip_prefix(INNER_TABLE_PREFIX).unwrap_or(name);
        let result = self.query(&format!("SHOW CREATE TABLE {name}")).await?;
        result
            .first_value()
            .map(value_text)
            .ok_or_else(|| ClientError::table_not_found(name))
    }

    /// Describes a table and whether it is a view.
    pub async fn table_descriptor(&self, name: &str) -> Result<TableDescriptor> {
        let columns = self.describe_table(name).await?;
        let create_sql = self.show_create_table(name).await?;

        Ok(TableDescriptor {
            name: name.to_string(),
            columns,
            is_view: is_view_definition(&create_sql),
        })
    }

    /// Writes a commented dump of every table's `CREATE` statement.
    pub async fn dump_schema(&self) -> Result<String> {
        let mut dump = String::new();
        for table in self.list_tables().await? {
            let create_sql = self.show_create_table(&table).await?;
            dump.push_str(&format!("# TABLE: {table}\n# SQL: {create_sql}\n\n"));
        }
        Ok(dump)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_display_string(),
    }
}
