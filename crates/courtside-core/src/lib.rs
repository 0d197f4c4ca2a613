// Library root for the data model, normalization, favorites and persistence
// layers shared by the API client and the view model.

pub mod config;
pub mod db;
pub mod error;
pub mod favorites;
pub mod model;
pub mod normalize;
pub mod source;
pub mod store;
