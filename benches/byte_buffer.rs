use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use onebrc_arena::byte_buffer::ByteBuffer;
use onebrc_arena::parser::{LineParser, parse_temperature};
use onebrc_arena::partition::partition;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn measurements(lines: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let names: Vec<String> = (0..400)
        .map(|i| format!("{}-{i}", "Station".repeat(rng.random_range(1..5))))
        .collect();

    let mut buf = Vec::new();
    for _ in 0..lines {
        let name = &names[rng.random_range(0..names.len())];
        let tenths: i32 = rng.random_range(-999..=999);
        let sign = if tenths < 0 { "-" } else { "" };
        buf.extend_from_slice(
            format!("{name};{sign}{}.{}\n", tenths.abs() / 10, tenths.abs() % 10).as_bytes(),
        );
    }
    buf
}

fn bench_byte_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_position");

    let test_cases: Vec<(&str, Vec<u8>)> = vec![
        ("len_4_pos_2", b"Xi;3.4".to_vec()),
        ("len_8_pos_4", b"Lima;5.6".to_vec()),
        ("len_12_pos_6", b"Berlin;12.3".to_vec()),
        ("len_16_pos_9", b"Melbourne;23.4".to_vec()),
        ("len_24_pos_13", b"San Francisco;-5.2".to_vec()),
        ("len_32_pos_18", b"Thiruvananthapuram;31.2".to_vec()),
        (
            "len_64_pos_45",
            b"Some Very Long Station Name That Goes On Forever;99.9".to_vec(),
        ),
    ];

    for (name, line) in &test_cases {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::new("semicolon", name), line, |b, line| {
            b.iter(|| black_box(line.as_slice()).byte_position(b';'))
        });
    }

    group.finish();
}

fn bench_byte_position_worst_case(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_position_worst");

    let late: Vec<u8> = "A"
        .repeat(63)
        .into_bytes()
        .into_iter()
        .chain([b';'])
        .collect();

    let missing: Vec<u8> = "A".repeat(64).into_bytes();

    group.throughput(Throughput::Bytes(64));

    group.bench_function("needle_at_end_64", |b| {
        b.iter(|| black_box(late.as_slice()).byte_position(b';'))
    });

    group.bench_function("needle_missing_64", |b| {
        b.iter(|| black_box(missing.as_slice()).byte_position(b';'))
    });

    group.finish();
}

fn bench_line_start(c: &mut Criterion) {
    let buf = measurements(10_000);

    c.bench_function("line_start_from_cycle", |b| {
        let mut i = 0;
        b.iter(|| {
            let start = black_box(buf.as_slice()).line_start_from(i % buf.len());
            i += 4093;
            start
        })
    });
}

fn bench_parse_temperature(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_temperature");

    for input in ["1.2\n", "-1.2\n", "12.3\n", "-12.3\n"] {
        group.bench_with_input(BenchmarkId::new("tenths", input.trim()), input, |b, input| {
            b.iter(|| parse_temperature(black_box(input.as_bytes()), 0))
        });
    }

    group.finish();
}

fn bench_line_parser(c: &mut Criterion) {
    let buf = measurements(100_000);

    let mut group = c.benchmark_group("line_parser");
    group.throughput(Throughput::Bytes(buf.len() as u64));
    group.bench_function("records", |b| {
        b.iter(|| {
            LineParser::new(black_box(&buf), 0)
                .map(|r| r.map(|r| r.tenths as i64).unwrap_or(0))
                .sum::<i64>()
        })
    });
    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let buf = measurements(100_000);

    let mut group = c.benchmark_group("partition");
    for parts in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| partition(black_box(&buf), parts))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_byte_position,
    bench_byte_position_worst_case,
    bench_line_start,
    bench_parse_temperature,
    bench_line_parser,
    bench_partition
);
criterion_main!(benches);
