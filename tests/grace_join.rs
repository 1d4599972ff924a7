use quill_join::buffer::BufferPool;
use quill_join::execution::Side;
use quill_join::storage::{
    load_relation, read_pairs, read_records, DiskManager, InMemoryPageStore, PageRange, PageStore,
    Record,
};
use quill_join::{GraceHashJoin, JoinConfig, OverflowPolicy, Partitioner, Prober};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn relation(keys: &[i64], tag: u64) -> Vec<Record> {
    keys.iter()
        .enumerate()
        .map(|(row, key)| Record::new(*key, tag * 1_000_000 + row as u64))
        .collect()
}

fn nested_loop_join(left: &[Record], right: &[Record]) -> Vec<(Record, Record)> {
    let mut pairs = Vec::new();
    for l in left {
        for r in right {
            if l.joins_with(r) {
                pairs.push((*l, *r));
            }
        }
    }
    sorted(pairs)
}

fn sorted(mut pairs: Vec<(Record, Record)>) -> Vec<(Record, Record)> {
    pairs.sort_by_key(|(l, r)| (l.key, l.payload, r.payload));
    pairs
}

#[test]
fn joins_the_reference_scenario_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let disk_manager = DiskManager::try_new(temp_dir.path().join("join.db")).unwrap();

    let left = relation(&[1, 2, 3, 4, 5, 6], 1);
    let right = relation(&[3, 5, 7], 2);
    let left_range = load_relation(&disk_manager, left.clone(), 3).unwrap();
    let right_range = load_relation(&disk_manager, right.clone(), 3).unwrap();
    assert_eq!(left_range.num_pages(), 2);
    assert_eq!(right_range.num_pages(), 1);

    let config = JoinConfig::default()
        .with_mem_size_in_page(4usize)
        .with_records_per_page(3usize);
    let outcome = GraceHashJoin::try_new(config)
        .unwrap()
        .execute(&disk_manager, left_range, right_range)
        .unwrap();

    assert_eq!(outcome.buckets.len(), 3);
    assert_eq!(outcome.output_pages.len(), 1);
    let pairs = sorted(read_pairs(&disk_manager, outcome.output_pages).unwrap());
    assert_eq!(pairs, vec![(left[2], right[0]), (left[4], right[1])]);
    let keys = pairs
        .iter()
        .map(|(l, r)| (l.key, r.key))
        .collect::<Vec<_>>();
    assert_eq!(keys, vec![(3, 3), (5, 5)]);
}

#[test]
fn matches_nested_loop_join_on_random_relations() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..8 {
        let store = InMemoryPageStore::new();
        let left_keys = (0..rng.random_range(0..400))
            .map(|_| rng.random_range(0..120))
            .collect::<Vec<i64>>();
        let right_keys = (0..rng.random_range(0..150))
            .map(|_| rng.random_range(0..120))
            .collect::<Vec<i64>>();
        let left = relation(&left_keys, 1);
        let right = relation(&right_keys, 2);
        let left_range = load_relation(&store, left.clone(), 8).unwrap();
        let right_range = load_relation(&store, right.clone(), 8).unwrap();

        let config = JoinConfig::default()
            .with_mem_size_in_page(8usize)
            .with_records_per_page(8usize)
            .with_overflow(OverflowPolicy::Repartition { max_depth: 4 });
        let outcome = GraceHashJoin::try_new(config)
            .unwrap()
            .execute(&store, left_range, right_range)
            .unwrap();

        let pairs = sorted(read_pairs(&store, outcome.output_pages).unwrap());
        assert_eq!(pairs, nested_loop_join(&left, &right), "round {}", round);
        assert_eq!(outcome.stats.probe.pairs_emitted, pairs.len());
    }
}

#[test]
fn bucket_counts_match_their_page_runs() {
    let store = InMemoryPageStore::new();
    let mut rng = StdRng::seed_from_u64(11);
    let left_keys = (0..257).map(|_| rng.random_range(0..1000)).collect::<Vec<i64>>();
    let right_keys = (0..64).map(|_| rng.random_range(0..1000)).collect::<Vec<i64>>();
    let left_range = load_relation(&store, relation(&left_keys, 1), 5).unwrap();
    let right_range = load_relation(&store, relation(&right_keys, 2), 5).unwrap();

    let mut pool = BufferPool::new(6, 5);
    let buckets = Partitioner::new()
        .partition(&store, &mut pool, left_range, right_range)
        .unwrap();

    assert_eq!(buckets.len(), 5);
    for bucket in buckets.iter() {
        for side in [Side::Left, Side::Right] {
            let records = read_records(&store, bucket.pages(side).iter().copied()).unwrap();
            assert_eq!(records.len(), bucket.count(side));
        }
    }
    let total_left = buckets.iter().map(|b| b.left_count()).sum::<usize>();
    let total_right = buckets.iter().map(|b| b.right_count()).sum::<usize>();
    assert_eq!((total_left, total_right), (257, 64));
}

#[test]
fn reprobe_is_deterministic() {
    let store = InMemoryPageStore::new();
    let keys = (0..90).map(|key| key % 30).collect::<Vec<i64>>();
    let left_range = load_relation(&store, relation(&keys, 1), 4).unwrap();
    let right_range = load_relation(&store, relation(&keys[..45], 2), 4).unwrap();

    let mut pool = BufferPool::new(8, 4);
    let buckets = Partitioner::new()
        .partition(&store, &mut pool, left_range, right_range)
        .unwrap();
    let prober = Prober::default();
    let first = prober.probe(&store, &mut pool, &buckets).unwrap();
    let second = prober.probe(&store, &mut pool, &buckets).unwrap();

    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(store.read_page(*a).unwrap(), store.read_page(*b).unwrap());
    }
}

#[test]
fn empty_relation_joins_to_nothing() {
    let store = InMemoryPageStore::new();
    let right_range = load_relation(&store, relation(&[1, 2, 3], 2), 4).unwrap();
    let config = JoinConfig::default()
        .with_mem_size_in_page(4usize)
        .with_records_per_page(4usize);
    let join = GraceHashJoin::try_new(config).unwrap();

    let outcome = join
        .execute(&store, PageRange::empty(), right_range)
        .unwrap();
    assert!(outcome.output_pages.is_empty());
    assert_eq!(outcome.stats.probe.buckets_probed, 0);
    // probing skipped every bucket without reading a page
    assert_eq!(outcome.stats.probe_io.reads, 0);

    let outcome = join
        .execute(&store, right_range, PageRange::empty())
        .unwrap();
    assert!(outcome.output_pages.is_empty());
}

#[test]
fn output_spans_pages_when_matches_exceed_capacity() {
    let store = InMemoryPageStore::new();
    let keys = (0..10).collect::<Vec<i64>>();
    let left_range = load_relation(&store, relation(&keys, 1), 3).unwrap();
    let right_range = load_relation(&store, relation(&keys, 2), 3).unwrap();

    let config = JoinConfig::default()
        .with_mem_size_in_page(6usize)
        .with_records_per_page(3usize);
    let outcome = GraceHashJoin::try_new(config)
        .unwrap()
        .execute(&store, left_range, right_range)
        .unwrap();

    // 10 pairs at 3 per page: three full pages and a final partial one
    assert_eq!(outcome.output_pages.len(), 4);
    let sizes = outcome
        .output_pages
        .iter()
        .map(|id| store.read_page(*id).unwrap().len())
        .collect::<Vec<_>>();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
}

#[test]
fn output_ending_on_a_full_page_leaves_no_empty_page() {
    let store = InMemoryPageStore::new();
    let keys = (0..9).collect::<Vec<i64>>();
    let left_range = load_relation(&store, relation(&keys, 1), 3).unwrap();
    let right_range = load_relation(&store, relation(&keys, 2), 3).unwrap();

    let config = JoinConfig::default()
        .with_mem_size_in_page(6usize)
        .with_records_per_page(3usize);
    let outcome = GraceHashJoin::try_new(config)
        .unwrap()
        .execute(&store, left_range, right_range)
        .unwrap();

    let sizes = outcome
        .output_pages
        .iter()
        .map(|id| store.read_page(*id).unwrap().len())
        .collect::<Vec<_>>();
    assert_eq!(sizes, vec![3, 3, 3]);
    assert_eq!(outcome.stats.probe_io.writes, 3);
}

#[test]
fn storage_fault_aborts_the_join() {
    let store = InMemoryPageStore::new();
    load_relation(&store, relation(&[1, 2], 1), 2).unwrap();
    let config = JoinConfig::default()
        .with_mem_size_in_page(4usize)
        .with_records_per_page(2usize);
    let dangling = PageRange::try_new(1, 5).unwrap();
    let result = GraceHashJoin::try_new(config)
        .unwrap()
        .execute(&store, dangling, PageRange::empty());
    assert!(matches!(
        result,
        Err(quill_join::QuillJoinError::StorageFault(_))
    ));
}
