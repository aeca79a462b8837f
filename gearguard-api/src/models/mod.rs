pub mod equipment;
pub mod maintenance_request;
pub mod profile;
pub mod team;
pub mod work_center;

// Re-export models for easier access
pub use equipment::*;
pub use maintenance_request::*;
pub use profile::*;
pub use team::*;
pub use work_center::*;
