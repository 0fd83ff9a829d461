//! `query` command implementation.

use super::open_sequence;
use crate::cli::QueryArgs;
use eyre::{Result, WrapErr};
use shuttum_core::{MatchPolicy, Record, Sequence};
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

/// Execute the `query` command
pub fn run_query(args: &QueryArgs) -> Result<()> {
    let sequence = open_sequence(&args.input)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(stamp) = args.at {
        let record = sequence.lookup(stamp, args.policy)?;
        write_record(&mut out, &record, args.json)?;
        out.flush()?;
        return Ok(());
    }

    let limit = args.limit.unwrap_or(usize::MAX);
    let written = query_range(&sequence, args, limit, &mut out)?;
    out.flush()?;

    info!(records = written, "query finished");
    Ok(())
}

fn query_range(
    sequence: &Sequence,
    args: &QueryArgs,
    limit: usize,
    out: &mut impl Write,
) -> Result<usize> {
    let range = sequence.range(args.from, args.to);
    debug!(
        from = ?args.from,
        to = ?args.to,
        stamps = range.len(),
        policy = ?args.policy,
        "querying range"
    );

    let mut written = 0;
    if args.policy == MatchPolicy::Exact {
        for record in range.take(limit) {
            write_record(out, &record, args.json)?;
            written += 1;
        }
    } else {
        for &stamp in range.stamps().iter().take(limit) {
            let record = sequence.lookup(stamp, args.policy)?;
            write_record(out, &record, args.json)?;
            written += 1;
        }
    }

    Ok(written)
}

fn write_record(out: &mut impl Write, record: &Record<'_>, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(record).wrap_err("Failed to serialize record")?;
        writeln!(out, "{line}")?;
        return Ok(());
    }

    write!(out, "{}", record.stamp)?;
    if let Some(frame) = record.global {
        write!(out, "\tglobal #{}", frame.id)?;
    }
    if let Some(frame) = record.rolling {
        write!(out, "\trolling #{}", frame.id)?;
    }
    if let Some(imu) = &record.imu {
        let [ax, ay, az] = imu.acceleration;
        let [gx, gy, gz] = imu.angular_velocity;
        write!(out, "\timu a=({ax}, {ay}, {az}) w=({gx}, {gy}, {gz})")?;
    }
    if let Some(pose) = &record.groundtruth {
        let [px, py, pz] = pose.position;
        let [qw, qx, qy, qz] = pose.orientation;
        write!(
            out,
            "\tgroundtruth p=({px}, {py}, {pz}) q=({qw}, {qx}, {qy}, {qz})"
        )?;
    }
    writeln!(out)?;

    Ok(())
}
