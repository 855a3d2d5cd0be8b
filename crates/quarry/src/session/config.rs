use tracing::Level;

/// Configuration for statement logging on a [`Db`](super::Db).
///
/// Every statement emits one event before it is dispatched (target
/// `quarry.sql`) and one `TRACE` event when it finishes.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Level of the per-statement event.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Whether bound parameter values are logged. Off by default.
    pub log_params: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
            log_params: false,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level of the per-statement event.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Include bound parameter values in the log event.
    pub fn log_params(mut self, enabled: bool) -> Self {
        self.log_params = enabled;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let config = DbConfig::new().max_sql_length(5);
        assert_eq!(config.truncate_sql("SELECT 1"), "SELEC...");
        assert_eq!(config.truncate_sql("abc"), "abc");
        // 'é' is two bytes; cutting inside it backs off
        assert_eq!(config.truncate_sql("abcdé!"), "abcd...");
        assert_eq!(DbConfig::new().no_truncate().truncate_sql("SELECT 1"), "SELECT 1");
    }
}
