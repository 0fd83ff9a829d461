//! Command implementations.

mod info;
mod query;

pub use info::run_info;
pub use query::run_query;

use crate::cli::SequenceArgs;
use eyre::{Result, WrapErr};
use shuttum_core::{LoadOptions, Sequence};

fn open_sequence(args: &SequenceArgs) -> Result<Sequence> {
    let options = LoadOptions {
        calibration: args.calibration,
        stereosync: !args.no_stereosync,
    };
    Sequence::open_with(&args.sequence, options)
        .wrap_err_with(|| format!("Failed to open sequence {}", args.sequence.display()))
}
