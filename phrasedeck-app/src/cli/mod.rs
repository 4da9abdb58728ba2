pub mod commands;
pub mod inputs;
pub mod notices;
pub mod opts;
