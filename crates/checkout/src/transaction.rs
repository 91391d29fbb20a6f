use store::StoreTransaction;

use crate::error::{CheckoutError, Result};

/// Commits `tx` if `result` is Ok, otherwise rolls it back and returns the
/// original error.
pub(crate) async fn complete<T, R>(tx: T, result: Result<R>) -> Result<R>
where
    T: StoreTransaction,
{
    match result {
        Ok(value) => {
            tx.commit().await.map_err(CheckoutError::Transaction)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
