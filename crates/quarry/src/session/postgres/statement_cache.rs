use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use tokio_postgres::Statement;

/// LRU of server-side statements keyed by prepared-query name.
///
/// Each entry remembers the SQL it was prepared from; a name reused for
/// different SQL misses and is re-prepared.
#[derive(Debug)]
pub(super) struct StatementCache {
    inner: Mutex<StatementCacheInner>,
}

#[derive(Debug)]
struct StatementCacheInner {
    capacity: usize,
    map: HashMap<String, (String, Statement)>,
    order: VecDeque<String>,
}

impl StatementCache {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StatementCacheInner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub(super) fn is_enabled(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity
            > 0
    }

    pub(super) fn get(&self, name: &str, sql: &str) -> Option<Statement> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let stmt = match inner.map.get(name) {
            Some((cached_sql, stmt)) if cached_sql == sql => stmt.clone(),
            _ => return None,
        };
        inner.touch(name);
        Some(stmt)
    }

    pub(super) fn insert(&self, name: String, sql: String, stmt: Statement) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.map.insert(name.clone(), (sql, stmt)).is_some() {
            inner.touch(&name);
        } else {
            inner.order.push_back(name);
        }
        inner.evict_if_needed();
    }

    pub(super) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }
}

impl StatementCacheInner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        if self.capacity == 0 {
            self.map.clear();
            self.order.clear();
            return;
        }

        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            let _ = self.map.remove(&oldest);
        }
    }
}
