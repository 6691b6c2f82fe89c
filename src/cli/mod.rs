mod console;
mod root;

pub use root::Cli;
