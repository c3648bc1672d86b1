use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

/// Wires the friendship service to the configured store backend.
pub struct Server {
    pub friendship_service: Arc<dyn FriendshipService>,
    mysql: Option<(MySqlPool, Arc<MySqlFriendshipRepo>)>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        match settings.store.backend.as_str() {
            "memory" => Ok(Self::in_memory()),
            "mysql" => {
                let dsn = settings
                    .store
                    .dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.dsn is required for the mysql backend"))?;
                let pool = MySqlPoolOptions::new()
                    .max_connections(settings.store.max_connections)
                    .connect(dsn)
                    .await?;
                info!(max_connections = settings.store.max_connections, "connected to mysql");
                Ok(Self::with_mysql(pool))
            }
            other => Err(anyhow!("Unknown store backend: {}", other)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        let friendship_repo: Arc<dyn FriendshipRepo> =
            Arc::new(MemoryFriendshipRepo::new(store.clone()));
        let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(store));

        Server {
            friendship_service: Arc::new(RealFriendshipService::new(friendship_repo, tx_manager)),
            mysql: None,
        }
    }

    pub fn with_mysql(pool: MySqlPool) -> Self {
        let repo = Arc::new(MySqlFriendshipRepo::new(pool.clone()));
        let friendship_repo: Arc<dyn FriendshipRepo> = repo.clone();
        let tx_manager: Arc<dyn TxManager> = Arc::new(MySqlTxManager::new(pool.clone()));

        Server {
            friendship_service: Arc::new(RealFriendshipService::new(friendship_repo, tx_manager)),
            mysql: Some((pool, repo)),
        }
    }

    /// Creates the schema. The memory store needs none.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        match &self.mysql {
            Some((_, repo)) => {
                repo.migrate().await?;
                info!("friendships table ready");
            }
            None => debug!("memory store, nothing to migrate"),
        }
        Ok(())
    }

    pub async fn shutdown(&self) {
        if let Some((pool, _)) = &self.mysql {
            pool.close().await;
        }
    }
}
