pub mod feature;
pub mod init;
pub mod linear;
pub mod spec;
