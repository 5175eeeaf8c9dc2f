pub mod carousel;
pub mod entry;
pub mod list_model;
pub mod paginated;
pub mod pipeline;

pub use entry::AppEntry;
pub use list_model::{ListChange, ListModel};
pub use paginated::{ItemsChanged, PageError, PaginatedView};
