//! Configuration module

mod site;

pub use site::BlocksConfig;
pub use site::IndexSourceKind;
pub use site::PostsConfig;
pub use site::SiteConfig;
