use clap::Parser;
use quill_join::storage::{load_relation, read_pairs, DiskManager, Record};
use quill_join::utils::util::{pretty_format_buckets, pretty_format_join_stats, pretty_format_pairs};
use quill_join::{GraceHashJoin, JoinConfig, OverflowPolicy, QuillJoinError, QuillJoinResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Parser, PartialEq)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short = 'f', long, help = "Path to the page file (temporary file if omitted)")]
    file: Option<PathBuf>,
    #[clap(short = 'm', long, default_value_t = 8, help = "Memory budget in frames")]
    mem_pages: usize,
    #[clap(long, default_value_t = 16, help = "Records per page")]
    records_per_page: usize,
    #[clap(long, default_value_t = 1000, help = "Rows of the left relation")]
    left_rows: usize,
    #[clap(long, default_value_t = 200, help = "Rows of the right relation")]
    right_rows: usize,
    #[clap(long, default_value_t = 500, help = "Join keys are drawn from 0..key_range")]
    key_range: i64,
    #[clap(long, default_value_t = 42, help = "Seed of the data generator")]
    seed: u64,
    #[clap(
        long,
        help = "Re-partition oversized buckets up to this depth instead of failing",
        value_name = "DEPTH"
    )]
    repartition_depth: Option<usize>,
    #[clap(long, default_value_t = 10, help = "Joined pairs to print")]
    show: usize,
}

fn random_relation(rng: &mut StdRng, rows: usize, key_range: i64) -> Vec<Record> {
    (0..rows)
        .map(|row| Record::new(rng.random_range(0..key_range), row as u64))
        .collect()
}

fn main() -> QuillJoinResult<()> {
    env_logger::init();
    let args = Args::parse();
    if args.key_range <= 0 {
        return Err(QuillJoinError::Config(format!(
            "key_range must be positive, got {}",
            args.key_range
        )));
    }

    let overflow = match args.repartition_depth {
        Some(max_depth) => OverflowPolicy::Repartition { max_depth },
        None => OverflowPolicy::Fail,
    };
    let config = JoinConfig::default()
        .with_mem_size_in_page(args.mem_pages)
        .with_records_per_page(args.records_per_page)
        .with_overflow(overflow);
    let join = GraceHashJoin::try_new(config)?;

    let (_temp_dir, path) = match args.file {
        Some(path) => (None, path),
        None => {
            let temp_dir = TempDir::new()?;
            let path = temp_dir.path().join("join.db");
            (Some(temp_dir), path)
        }
    };
    let disk_manager = DiskManager::try_new(&path)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let left = random_relation(&mut rng, args.left_rows, args.key_range);
    let right = random_relation(&mut rng, args.right_rows, args.key_range);
    let left = load_relation(&disk_manager, left, args.records_per_page)?;
    let right = load_relation(&disk_manager, right, args.records_per_page)?;

    let outcome = join.execute(&disk_manager, left, right)?;

    println!("{}", pretty_format_buckets(&outcome.buckets));
    println!("{}", pretty_format_join_stats(&outcome.stats));
    let pairs = read_pairs(&disk_manager, outcome.output_pages)?;
    let shown = &pairs[..pairs.len().min(args.show)];
    if !shown.is_empty() {
        println!("{}", pretty_format_pairs(shown));
    }
    println!(
        "{} joined pairs written to {}",
        pairs.len(),
        path.display()
    );
    Ok(())
}
