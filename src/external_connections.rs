use sqlx::PgConnection;

/// Exposes a live database connection from whatever owns it (a pool checkout or an open transaction)
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Provides access to external systems. Driven adapters receive an implementation of this trait
/// so business logic never has to know where its data actually comes from.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// External connectivity which can open a transaction whose work is only kept on [TransactionHandle::commit]
pub trait Transactable {
    type Handle: ExternalConnectivity + TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// Connectivity with an open transaction. Dropping it without committing rolls the work back.
pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}
