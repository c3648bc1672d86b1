use crate::domain_model::*;
use crate::domain_port::{StorageTx, TxBackend, TxManager};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub(super) struct MemoryTable {
    pub(super) rows: BTreeMap<FriendshipId, Friendship>,
    pub(super) pair_index: HashMap<String, FriendshipId>,
    pub(super) next_id: u64,
}

/// In-process friendship table shared by the memory repo and tx manager.
///
/// Transactions are serialised on one lock and write back on commit only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, MemoryTable> {
        self.table.lock().await
    }
}

pub struct MemoryTxManager {
    store: Arc<MemoryStore>,
}

impl MemoryTxManager {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryTxManager { store }
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        let guard = self.store.lock().await;
        Ok(Box::new(MemoryTx::new(guard)))
    }
}

pub struct MemoryTx<'t> {
    guard: MutexGuard<'t, MemoryTable>,
    working: MemoryTable,
}

impl<'t> MemoryTx<'t> {
    fn new(guard: MutexGuard<'t, MemoryTable>) -> Self {
        let working = guard.clone();
        MemoryTx { guard, working }
    }

    pub(super) fn table(&mut self) -> &mut MemoryTable {
        &mut self.working
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx<'t> {
    fn backend(&self) -> TxBackend {
        TxBackend::Memory
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
