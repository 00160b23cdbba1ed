pub mod gateway;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

pub use gateway::{Gateway, Transaction};
pub use manager::{connect_gateway, ConnectionSupervisor, DatabaseError};
pub use memory::{FaultPoint, MemoryGateway};
pub use postgres::PgGateway;
