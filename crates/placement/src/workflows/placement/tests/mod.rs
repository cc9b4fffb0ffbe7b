pub(crate) mod common;

mod applications;
