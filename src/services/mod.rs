pub mod conflicts;
pub mod dispatch;
pub mod list_page;
pub mod search;

pub use conflicts::{CheckAllReport, check_all};
pub use list_page::{ListPage, LoadState};
pub use search::{Debouncer, RemoteSearch, Settled, local_filter};
