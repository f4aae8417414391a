pub mod controls;
pub mod datatable;

pub use controls::Controls;
pub use datatable::{DataTable, DataTableState};
