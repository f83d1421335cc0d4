pub mod ceremony;
pub mod fakes;
pub mod prelude;
