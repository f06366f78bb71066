pub mod store;
pub use store::{DocumentStore, Filter};
pub mod memory_store;
pub use memory_store::MemoryDocumentStore;
pub mod pg_store;
pub use pg_store::PgDocumentStore;
pub mod transaction;

pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod operations_repo;
pub use operations_repo::OperationsRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
