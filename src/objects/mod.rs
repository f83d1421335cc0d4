pub mod contribution_folder;
pub use contribution_folder::*;

pub mod report;
pub use report::*;

pub mod verification_result;
pub use verification_result::*;
