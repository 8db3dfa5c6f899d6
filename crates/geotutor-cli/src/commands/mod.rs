pub mod example;
pub mod generate;
pub mod init;
pub mod practice;
pub mod stats;
pub mod validate;
