use super::repo_tx_mysql::MySqlTx;
use crate::application_port::FriendshipError;
use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

pub fn downcast<'a, 't>(
    tx: &'a mut dyn StorageTx<'t>,
) -> Result<&'a mut MySqlTx<'t>, FriendshipError> {
    if tx.backend() != TxBackend::MySql {
        return Err(FriendshipError::Store(format!(
            "mysql repo got a {:?} transaction",
            tx.backend()
        )));
    }

    // SAFETY: MySqlTx is the only StorageTx reporting TxBackend::MySql.
    unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MySqlTx<'t>;
        Ok(&mut *p)
    }
}

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}
