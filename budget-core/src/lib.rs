pub mod advisor;
pub mod calculations;
pub mod db;
pub mod models;
pub mod services;

pub use db::repository::{FinanceRepository, RepositoryError};
pub use models::*;
