mod actions;
mod clean;
mod command;
mod error;
mod exec;

pub use actions::{build, generate, generate_vs_solution, open_solution, rebuild, run};
pub use clean::{clean, clean_all, clean_build_folder};
pub use command::{CommandLine, compile_command, generate_command};
pub use error::ActionError;
pub use exec::run_command;
