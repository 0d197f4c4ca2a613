// HTTP adapter for the balldontlie API, implementing `GameSource`.

pub mod client;

pub use client::BallDontLieClient;
