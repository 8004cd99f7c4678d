pub mod db;
pub mod factory;
pub mod store;
