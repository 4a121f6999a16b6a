use std::cell::Cell;
use std::io::{self, Cursor, Read, Write};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use chunkstat::{aggregate, aggregate_file, baseline, render, AggError, EngineConfig, Summary};

const KEYS: &[&str] = &[
    "Abha", "Accra", "Berlin", "Bouaké", "Hamburg", "Kunming", "Las Palmas de Gran Canaria",
    "Nuuk", "Petropavlovsk-Kamchatsky", "San José", "San Jose", "Zürich", "x",
];

/// Random well-formed measurements, reproducible from `seed`.
fn generate(rows: usize, seed: u64) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(rows * 16);
    for _ in 0..rows {
        let key = KEYS[rng.gen_range(0..KEYS.len())];
        let tenths: i64 = rng.gen_range(-999..=999);
        let sign = if tenths < 0 { "-" } else { "" };
        let abs = tenths.abs();
        writeln!(out, "{key};{sign}{}.{}", abs / 10, abs % 10).unwrap();
    }
    out
}

fn run_engine(input: &[u8], workers: usize, chunk_size: usize) -> Summary {
    let config = EngineConfig::default()
        .with_workers(workers)
        .with_chunk_size(chunk_size);
    aggregate(Cursor::new(input), Some(input.len() as u64), &config).unwrap()
}

#[test]
fn end_to_end_example() {
    let input = b"Hamburg;12.0\nHamburg;-3.5\nBerlin;5.2\n";
    assert_eq!(
        render(&run_engine(input, 4, 1024)),
        "{Berlin=5.2/5.2/5.2, Hamburg=-3.5/4.2/12.0}\n"
    );
}

#[test]
fn engine_agrees_with_baseline() {
    let input = generate(20_000, 7);
    let expected = baseline::aggregate(&input[..]).unwrap();

    for (workers, chunk_size) in [(1, 4096), (3, 1000), (8, 64 * 1024)] {
        let summary = run_engine(&input, workers, chunk_size);
        assert_eq!(summary, expected, "{workers} workers, chunk {chunk_size}");
    }
}

#[test]
fn output_is_identical_across_worker_counts() {
    let input = generate(10_000, 42);
    let outputs: Vec<String> = [1, 2, 8]
        .into_iter()
        .map(|workers| render(&run_engine(&input, workers, 2048)))
        .collect();

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test]
fn refill_smaller_than_a_line_does_not_split_records() {
    let input = generate(500, 3);
    let whole = run_engine(&input, 1, 1 << 20);

    // Shorter than any line in the input.
    for chunk_size in [1, 2, 3, 5] {
        assert_eq!(run_engine(&input, 4, chunk_size), whole, "chunk {chunk_size}");
    }
}

#[test]
fn keys_outlive_recycled_buffers() {
    // Keys seen only in the first chunk must survive every later chunk
    // being written into the same recycled buffers.
    let mut input = b"early-key;1.5\n".to_vec();
    input.extend(generate(5_000, 11));

    let config = EngineConfig::default()
        .with_workers(1)
        .with_chunk_size(32)
        .with_queue_capacity(1);
    let summary = aggregate(Cursor::new(&input), None, &config).unwrap();

    let stat = summary.get(b"early-key").unwrap();
    assert_eq!((stat.min, stat.max, stat.count), (15, 15, 1));
    assert_eq!(summary, baseline::aggregate(&input[..]).unwrap());
}

#[test]
fn small_table_capacity_only_lengthens_chains() {
    let input = generate(5_000, 99);
    let config = EngineConfig::default()
        .with_workers(2)
        .with_chunk_size(512)
        .with_table_capacity(2);
    let summary = aggregate(Cursor::new(&input), None, &config).unwrap();
    assert_eq!(summary, baseline::aggregate(&input[..]).unwrap());
}

#[test]
fn aggregates_file_on_disk() {
    let input = generate(2_000, 5);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&input).unwrap();
    file.flush().unwrap();

    let config = EngineConfig::default().with_workers(2).with_progress(true);
    let summary = aggregate_file(file.path(), &config).unwrap();
    assert_eq!(summary, baseline::aggregate(&input[..]).unwrap());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = aggregate_file(dir.path().join("absent.txt"), &EngineConfig::default());
    assert!(matches!(result, Err(AggError::Io(_))));
}

#[test]
fn malformed_value_aborts_run() {
    let mut input = generate(1_000, 8);
    input.extend_from_slice(b"Berlin;100.0\n");
    input.extend(generate(1_000, 9));

    let config = EngineConfig::default().with_workers(4).with_chunk_size(256);
    let err = aggregate(Cursor::new(&input), None, &config).unwrap_err();
    match err {
        AggError::Format { line, .. } => assert_eq!(line, "Berlin;100.0"),
        other => panic!("unexpected error {other:?}"),
    }
}

/// Counts the bytes handed to the engine.
struct CountingReader<'a> {
    inner: Cursor<&'a [u8]>,
    read: &'a Cell<u64>,
}

impl Read for CountingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read.set(self.read.get() + n as u64);
        Ok(n)
    }
}

#[test]
fn bad_first_record_stops_reading_early() {
    let mut input = b"bad;oops\n".to_vec();
    input.extend(generate(200_000, 21));

    for workers in [1, 2, 4, 8] {
        let read = Cell::new(0);
        let reader = CountingReader {
            inner: Cursor::new(&input[..]),
            read: &read,
        };
        let config = EngineConfig::default()
            .with_workers(workers)
            .with_chunk_size(4096)
            .with_queue_capacity(4);

        let err = aggregate(reader, None, &config).unwrap_err();
        assert!(matches!(err, AggError::Format { .. }), "{workers} workers");
        assert!(
            read.get() < input.len() as u64 / 2,
            "{workers} workers read {} of {} bytes",
            read.get(),
            input.len()
        );
    }
}
