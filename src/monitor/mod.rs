pub mod parser;
pub mod runner;
pub mod stream;

pub use parser::{Detection, LineParser};
pub use runner::run;
