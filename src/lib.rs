pub mod capability;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod extract;
pub mod kmeans;
pub mod pca;
pub mod pipeline;
pub mod relocate;
pub mod report;
pub mod signature;
pub mod utils;
#[cfg(feature = "opencv")]
pub mod video;

pub use capability::{Capabilities, Clustering, Decoding};
pub use config::Opts;
pub use pipeline::organize;
