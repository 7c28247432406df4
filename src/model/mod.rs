mod record;
mod service_watch;

pub use record::*;
pub use service_watch::*;
