// Library root: the results view model and the render-sink types it
// publishes, re-exported for the binary and integration tests.

pub mod protocol;
pub mod view_model;

pub use view_model::ResultsViewModel;
