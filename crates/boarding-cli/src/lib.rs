use clap::ValueEnum;

pub mod commands;
pub mod flow;
pub mod report;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

