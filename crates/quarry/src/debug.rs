//! An executor wrapper that logs every statement through `tracing`.

use crate::context::Context;
use crate::error::QuarryResult;
use crate::exec::{ExecResult, Executor};
use crate::row::Rows;
use crate::value::Value;
use async_trait::async_trait;
use tracing::Level;

/// What [`DebugExecutor`] logs and how loudly.
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Include the bound args.
    pub print_args: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: None,
            print_args: true,
        }
    }
}

impl DebugConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn print_args(mut self, print: bool) -> Self {
        self.print_args = print;
        self
    }

    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }
}

/// Cut `sql` to at most `max_bytes` without splitting a character.
fn truncate_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Render args as `0: int: 7` lines.
fn format_args(args: &[Value]) -> String {
    args.iter()
        .enumerate()
        .map(|(i, v)| format!("{i}: {}: {v}", v.kind()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps an executor and logs each statement before it runs.
#[derive(Debug, Clone)]
pub struct DebugExecutor<E> {
    inner: E,
    config: DebugConfig,
}

/// Log statements run on `exec` with the default [`DebugConfig`].
pub fn debug<E: Executor>(exec: E) -> DebugExecutor<E> {
    DebugExecutor::new(exec, DebugConfig::default())
}

impl<E> DebugExecutor<E> {
    pub fn new(inner: E, config: DebugConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn emit(&self, kind: &'static str, sql: &str, args: &[Value]) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.config.truncate_sql(sql);
        let param_count = args.len();
        if self.config.print_args {
            let args = format_args(args);
            emit_at_level!(
                self.config.level,
                target: "quarry.sql",
                kind,
                param_count,
                sql = %sql,
                args = %args,
            );
        } else {
            emit_at_level!(
                self.config.level,
                target: "quarry.sql",
                kind,
                param_count,
                sql = %sql,
            );
        }
    }
}

#[async_trait]
impl<E: Executor> Executor for DebugExecutor<E> {
    async fn execute(&self, ctx: &Context, sql: &str, args: &[Value]) -> QuarryResult<ExecResult> {
        self.emit("exec", sql, args);
        self.inner.execute(ctx, sql, args).await
    }

    async fn query(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[Value],
    ) -> QuarryResult<Box<dyn Rows>> {
        self.emit("query", sql, args);
        self.inner.query(ctx, sql, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::test_support::RecordingExecutor;

    #[test]
    fn truncation_respects_char_boundaries() {
        let cfg = DebugConfig::new().max_sql_length(4);
        assert_eq!(cfg.truncate_sql("SELECT 1"), "SELE...");
        assert_eq!(truncate_bytes("héllo", 2), "h");
        assert_eq!(DebugConfig::new().truncate_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn args_are_listed_with_their_kind() {
        let out = format_args(&[Value::Int(7), Value::Text("a".into()), Value::Null]);
        assert_eq!(out, "0: int: 7\n1: text: \"a\"\n2: null: NULL");
    }

    #[tokio::test]
    async fn forwards_to_inner_executor() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .try_init();

        let exec = DebugExecutor::new(
            RecordingExecutor::default(),
            DebugConfig::new().level(Level::INFO).print_args(false),
        );
        exec.execute(&Context::new(), "DELETE FROM t WHERE id = ?1", &[Value::Int(1)])
            .await
            .unwrap();
        exec.query(&Context::new(), "SELECT 1", &[]).await.unwrap();

        let calls = exec.inner().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "DELETE FROM t WHERE id = ?1");
        assert_eq!(calls[1].1, Vec::<Value>::new());
    }
}
