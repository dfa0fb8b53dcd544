pub mod cat;
pub mod exists;
pub mod mkdir;
pub mod propfind;
pub mod proppatch;
pub mod rm;
pub mod rmdir;
pub mod write;
