pub mod cli;
pub mod commands;
pub mod error;

pub mod core {
    pub mod chromosome;
    pub mod document;
    pub mod merger;
    pub mod table;
}

pub mod io {
    pub mod readers;
    pub mod vcf_reader;
    pub mod vcf_writer;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;
