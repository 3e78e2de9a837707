//! Persistent stores for roles and user credentials

pub mod roles;
pub mod users;

pub use roles::RoleStore;
pub use users::UserStore;
