use super::repo_tx_memory::MemoryTx;
use crate::application_port::FriendshipError;
use crate::domain_port::*;

pub fn downcast<'a, 't>(
    tx: &'a mut dyn StorageTx<'t>,
) -> Result<&'a mut MemoryTx<'t>, FriendshipError> {
    if tx.backend() != TxBackend::Memory {
        return Err(FriendshipError::Store(format!(
            "memory repo got a {:?} transaction",
            tx.backend()
        )));
    }

    // SAFETY: MemoryTx is the only StorageTx reporting TxBackend::Memory.
    unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MemoryTx<'t>;
        Ok(&mut *p)
    }
}
