use crate::db::{DbPool, OrmConn};
use crate::storage::StorageConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub storage: StorageConfig,
}
