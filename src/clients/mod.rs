pub mod gateway;
pub mod tenants;
