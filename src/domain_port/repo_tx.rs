/// Which adapter opened a transaction. Repos check it before downcasting.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TxBackend {
    MySql,
    Memory,
}

#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// An open transaction. Dropping it without `commit` discards its writes.
#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    fn backend(&self) -> TxBackend;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
