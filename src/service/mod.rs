//! TableService: generic CRUD using the safe SQL builder.

mod crud;
pub use crud::TableService;
