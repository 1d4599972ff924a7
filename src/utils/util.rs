use comfy_table::Cell;

use crate::execution::{Bucket, JoinStats};
use crate::storage::record::Record;

pub fn pretty_format_pairs(pairs: &[(Record, Record)]) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset("||--+-++|    ++++++");

    if pairs.is_empty() {
        return table;
    }

    table.set_header(vec![
        Cell::new("left.key"),
        Cell::new("left.payload"),
        Cell::new("right.key"),
        Cell::new("right.payload"),
    ]);
    for (left, right) in pairs {
        table.add_row(vec![
            Cell::new(left.key),
            Cell::new(left.payload),
            Cell::new(right.key),
            Cell::new(right.payload),
        ]);
    }
    table
}

pub fn pretty_format_buckets(buckets: &[Bucket]) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset("||--+-++|    ++++++");
    table.set_header(vec![
        Cell::new("bucket"),
        Cell::new("left pages"),
        Cell::new("left records"),
        Cell::new("right pages"),
        Cell::new("right records"),
        Cell::new("build side"),
    ]);
    for bucket in buckets {
        let build_side = if bucket.is_unjoinable() {
            "-".to_string()
        } else {
            bucket.build_side().to_string()
        };
        table.add_row(vec![
            Cell::new(bucket.index()),
            Cell::new(bucket.left_pages().len()),
            Cell::new(bucket.left_count()),
            Cell::new(bucket.right_pages().len()),
            Cell::new(bucket.right_count()),
            Cell::new(build_side),
        ]);
    }
    table
}

pub fn pretty_format_join_stats(stats: &JoinStats) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset("||--+-++|    ++++++");
    table.set_header(vec![Cell::new("metric"), Cell::new("value")]);

    let rows: [(&str, String); 11] = [
        ("left records", stats.left_records.to_string()),
        ("right records", stats.right_records.to_string()),
        ("buckets", stats.num_buckets.to_string()),
        ("partition page reads", stats.partition_io.reads.to_string()),
        ("partition page writes", stats.partition_io.writes.to_string()),
        ("probe page reads", stats.probe_io.reads.to_string()),
        ("probe page writes", stats.probe_io.writes.to_string()),
        ("buckets probed", stats.probe.buckets_probed.to_string()),
        ("buckets skipped", stats.probe.buckets_skipped.to_string()),
        ("re-partitions", stats.probe.repartitions.to_string()),
        ("pairs emitted", stats.probe.pairs_emitted.to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }
    table
}
