use crate::error::ApiLogError;
use crate::host::HostInfo;
use crate::record::ApiLogRecord;
use crate::sink::ApiLogSink;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::sea_query::{
    Alias, Asterisk, ColumnDef, Expr, Func, Order, Query, SelectStatement, Table,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DeriveIden, FromQueryResult};

/// Default table name for vendor call records
pub const DEFAULT_TABLE: &str = "meituan";

#[derive(DeriveIden, Clone, Copy)]
enum ApiLog {
    Id,
    TraceId,
    RequestTime,
    RequestUri,
    RequestUrl,
    RequestApi,
    RequestMethod,
    RequestParams,
    RequestHeader,
    RequestIp,
    ResponseHeader,
    ResponseStatusCode,
    ResponseBody,
    ResponseContentLength,
    ResponseTime,
    SystemHostName,
    SystemInsideIp,
    SystemOs,
    SystemArch,
    RuntimeVersion,
    SdkVersion,
}

const RECORD_COLUMNS: [ApiLog; 20] = [
    ApiLog::TraceId,
    ApiLog::RequestTime,
    ApiLog::RequestUri,
    ApiLog::RequestUrl,
    ApiLog::RequestApi,
    ApiLog::RequestMethod,
    ApiLog::RequestParams,
    ApiLog::RequestHeader,
    ApiLog::RequestIp,
    ApiLog::ResponseHeader,
    ApiLog::ResponseStatusCode,
    ApiLog::ResponseBody,
    ApiLog::ResponseContentLength,
    ApiLog::ResponseTime,
    ApiLog::SystemHostName,
    ApiLog::SystemInsideIp,
    ApiLog::SystemOs,
    ApiLog::SystemArch,
    ApiLog::RuntimeVersion,
    ApiLog::SdkVersion,
];

/// Column-for-column image of a stored record
#[derive(Debug, FromQueryResult)]
struct ApiLogRow {
    trace_id: String,
    request_time: DateTime<Utc>,
    request_uri: String,
    request_url: String,
    request_api: String,
    request_method: String,
    request_params: String,
    request_header: String,
    request_ip: String,
    response_header: String,
    response_status_code: i32,
    response_body: String,
    response_content_length: i64,
    response_time: DateTime<Utc>,
    system_host_name: String,
    system_inside_ip: String,
    system_os: String,
    system_arch: String,
    runtime_version: String,
    sdk_version: String,
}

impl TryFrom<ApiLogRow> for ApiLogRecord {
    type Error = ApiLogError;

    fn try_from(row: ApiLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            trace_id: row.trace_id,
            request_time: row.request_time,
            request_uri: row.request_uri,
            request_url: row.request_url,
            request_api: row.request_api,
            request_method: row.request_method,
            request_params: serde_json::from_str(&row.request_params)?,
            request_header: serde_json::from_str(&row.request_header)?,
            request_ip: row.request_ip,
            response_header: serde_json::from_str(&row.response_header)?,
            response_status_code: u16::try_from(row.response_status_code).unwrap_or_default(),
            response_body: row.response_body,
            response_content_length: u64::try_from(row.response_content_length)
                .unwrap_or_default(),
            response_time: row.response_time,
            host: HostInfo {
                host_name: row.system_host_name,
                inside_ip: row.system_inside_ip,
                os: row.system_os,
                arch: row.system_arch,
                runtime_version: row.runtime_version,
            },
            sdk_version: row.sdk_version,
        })
    }
}

fn validate_table_name(name: &str) -> Result<(), ApiLogError> {
    let mut chars = name.chars();
    let valid = name.len() <= 63
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ApiLogError::InvalidTableName(name.to_owned()))
    }
}

/// Relational sink: one row per vendor call in a single table
///
/// Works with any backend sea-orm is built for (`db-sqlite`, `db-pg`, `db-mysql`).
#[derive(Debug, Clone)]
pub struct SeaOrmApiLogSink {
    db: DatabaseConnection,
    table: String,
}

impl SeaOrmApiLogSink {
    /// Sink on the default `meituan` table, created if missing.
    ///
    /// # Errors
    /// Returns `ApiLogError::Db` if the table cannot be created.
    pub async fn new(db: DatabaseConnection) -> Result<Self, ApiLogError> {
        Self::with_table(db, DEFAULT_TABLE).await
    }

    /// Connect to `database_url` and use (or create) `table`.
    ///
    /// # Errors
    /// Returns `ApiLogError::Db` on connection or DDL failure and
    /// `ApiLogError::InvalidTableName` for an unusable name.
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, ApiLogError> {
        validate_table_name(table)?;
        let db = Database::connect(database_url).await?;
        Self::with_table(db, table).await
    }

    /// Sink on `table`, created if missing.
    ///
    /// # Errors
    /// Returns `ApiLogError::InvalidTableName` for an unusable name and
    /// `ApiLogError::Db` if the table cannot be created.
    pub async fn with_table(
        db: DatabaseConnection,
        table: impl Into<String>,
    ) -> Result<Self, ApiLogError> {
        let table = table.into();
        validate_table_name(&table)?;
        let sink = Self { db, table };
        sink.ensure_table().await?;
        tracing::debug!(table = %sink.table, "api log table ready");
        Ok(sink)
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_iden(&self) -> Alias {
        Alias::new(self.table.as_str())
    }

    async fn ensure_table(&self) -> Result<(), ApiLogError> {
        let stmt = Table::create()
            .table(self.table_iden())
            .if_not_exists()
            .col(
                ColumnDef::new(ApiLog::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ApiLog::TraceId).string_len(64).not_null())
            .col(
                ColumnDef::new(ApiLog::RequestTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(ApiLog::RequestUri).text().not_null())
            .col(ColumnDef::new(ApiLog::RequestUrl).text().not_null())
            .col(ColumnDef::new(ApiLog::RequestApi).string().not_null())
            .col(ColumnDef::new(ApiLog::RequestMethod).string_len(16).not_null())
            .col(ColumnDef::new(ApiLog::RequestParams).text().not_null())
            .col(ColumnDef::new(ApiLog::RequestHeader).text().not_null())
            .col(ColumnDef::new(ApiLog::RequestIp).string_len(64).not_null())
            .col(ColumnDef::new(ApiLog::ResponseHeader).text().not_null())
            .col(ColumnDef::new(ApiLog::ResponseStatusCode).integer().not_null())
            .col(ColumnDef::new(ApiLog::ResponseBody).text().not_null())
            .col(
                ColumnDef::new(ApiLog::ResponseContentLength)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(ApiLog::ResponseTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(ApiLog::SystemHostName).string().not_null())
            .col(ColumnDef::new(ApiLog::SystemInsideIp).string_len(64).not_null())
            .col(ColumnDef::new(ApiLog::SystemOs).string_len(32).not_null())
            .col(ColumnDef::new(ApiLog::SystemArch).string_len(32).not_null())
            .col(ColumnDef::new(ApiLog::RuntimeVersion).string_len(32).not_null())
            .col(ColumnDef::new(ApiLog::SdkVersion).string_len(32).not_null())
            .to_owned();

        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }

    /// Delete records whose request time is more than `hours` hours old.
    ///
    /// Returns the number of deleted rows.
    ///
    /// # Errors
    /// Returns `ApiLogError::Db` if the delete fails.
    pub async fn prune_older_than(&self, hours: u32) -> Result<u64, ApiLogError> {
        let cutoff = Utc::now()
            .checked_sub_signed(TimeDelta::hours(i64::from(hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let stmt = Query::delete()
            .from_table(self.table_iden())
            .and_where(Expr::col(ApiLog::RequestTime).lt(cutoff))
            .to_owned();

        let backend = self.db.get_database_backend();
        let result = self.db.execute(backend.build(&stmt)).await?;
        let deleted = result.rows_affected();
        tracing::info!(table = %self.table, hours, deleted, "pruned api log records");
        Ok(deleted)
    }

    /// All records written under `trace_id`, oldest first.
    ///
    /// # Errors
    /// Returns `ApiLogError::Db` on query failure and `ApiLogError::Serialize`
    /// if a stored JSON column cannot be parsed.
    pub async fn find_by_trace_id(&self, trace_id: &str) -> Result<Vec<ApiLogRecord>, ApiLogError> {
        let stmt = self
            .select_records()
            .and_where(Expr::col(ApiLog::TraceId).eq(trace_id))
            .order_by(ApiLog::Id, Order::Asc)
            .to_owned();

        let backend = self.db.get_database_backend();
        ApiLogRow::find_by_statement(backend.build(&stmt))
            .all(&self.db)
            .await?
            .into_iter()
            .map(ApiLogRecord::try_from)
            .collect()
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// Returns `ApiLogError::Db` on query failure.
    pub async fn count(&self) -> Result<u64, ApiLogError> {
        let stmt = Query::select()
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("total"))
            .from(self.table_iden())
            .to_owned();

        let backend = self.db.get_database_backend();
        let total = match self.db.query_one(backend.build(&stmt)).await? {
            Some(row) => row.try_get::<i64>("", "total")?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or_default())
    }

    fn select_records(&self) -> SelectStatement {
        Query::select()
            .columns(RECORD_COLUMNS)
            .from(self.table_iden())
            .to_owned()
    }
}

#[async_trait]
impl ApiLogSink for SeaOrmApiLogSink {
    async fn record(&self, record: &ApiLogRecord) -> Result<(), ApiLogError> {
        let stmt = Query::insert()
            .into_table(self.table_iden())
            .columns(RECORD_COLUMNS)
            .values([
                record.trace_id.as_str().into(),
                record.request_time.into(),
                record.request_uri.as_str().into(),
                record.request_url.as_str().into(),
                record.request_api.as_str().into(),
                record.request_method.as_str().into(),
                serde_json::to_string(&record.request_params)?.into(),
                serde_json::to_string(&record.request_header)?.into(),
                record.request_ip.as_str().into(),
                serde_json::to_string(&record.response_header)?.into(),
                i32::from(record.response_status_code).into(),
                record.response_body.as_str().into(),
                i64::try_from(record.response_content_length)
                    .unwrap_or(i64::MAX)
                    .into(),
                record.response_time.into(),
                record.host.host_name.as_str().into(),
                record.host.inside_ip.as_str().into(),
                record.host.os.as_str().into(),
                record.host.arch.as_str().into(),
                record.host.runtime_version.as_str().into(),
                record.sdk_version.as_str().into(),
            ])?
            .to_owned();

        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("meituan").is_ok());
        assert!(validate_table_name("_api_log_2024").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1meituan").is_err());
        assert!(validate_table_name("meituan; drop table x").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }
}
