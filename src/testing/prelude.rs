pub use super::{ceremony::*, fakes::*};

pub use serial_test::serial;
