pub mod clean;
pub mod direct;
pub mod error;
mod inline;
mod io;
pub mod path;
mod setup;

pub use clean::*;
pub use error::{Error, Result};
pub use io::{read_config_or_new, write_config};
pub use setup::{delete_kube_config_context, setup_kube_config, KubeConfigSetup};
