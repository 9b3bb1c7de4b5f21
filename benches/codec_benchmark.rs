use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use criterion::Throughput;

use cyfs_fountain::{Decoder, DenseOctetMatrix, Encoder, Octet, RaptorDecoder, RaptorEncoder};
use rand::Rng;

fn random_data(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    for byte in data.iter_mut() {
        *byte = rand::thread_rng().gen();
    }
    data
}

fn row_ops_benchmark(c: &mut Criterion) {
    let octet = Octet::new(rand::thread_rng().gen_range(1, 255));
    let symbol_size = 512;
    let mut rows = vec![vec![0u8; symbol_size]; 2];
    for row in rows.iter_mut() {
        for byte in row.iter_mut() {
            *byte = rand::thread_rng().gen_range(1, 255);
        }
    }
    let matrix = DenseOctetMatrix::from_rows(rows, symbol_size);

    let mut group = c.benchmark_group("row ops");
    group.throughput(Throughput::Bytes(symbol_size as u64));
    group.bench_function("mul_assign_row", |b| {
        b.iter(|| {
            let mut temp = matrix.clone();
            temp.mul_assign_row(0, &octet);
            temp
        })
    });
    group.bench_function("add_assign_rows", |b| {
        b.iter(|| {
            let mut temp = matrix.clone();
            temp.add_assign_rows(0, 1);
            temp
        })
    });
    group.bench_function("fma_rows", |b| {
        b.iter(|| {
            let mut temp = matrix.clone();
            temp.fma_rows(0, 1, &octet);
            temp
        })
    });
    group.finish();
}

fn codec_benchmark(c: &mut Criterion) {
    let elements = 10 * 1024;
    let symbol_size = 512u16;
    let data = random_data(elements);
    let source_symbols = (elements / symbol_size as usize) as u32;

    let mut group = c.benchmark_group("codec 10KB");
    group.throughput(Throughput::Bytes(elements as u64));

    group.bench_function("encode", |b| {
        b.iter(|| {
            let encoder = Encoder::new(&data, symbol_size).unwrap();
            return encoder.intermediate_symbols().unwrap().height();
        })
    });

    group.bench_function("roundtrip", |b| {
        b.iter(|| {
            let encoder = Encoder::new(&data, symbol_size).unwrap();
            let mut decoder = Decoder::new(elements as u64, symbol_size).unwrap();
            for id in 0..source_symbols {
                decoder.add_symbol(id, &encoder.encode(id).unwrap()).unwrap();
            }
            return decoder.decode().unwrap();
        })
    });

    group.bench_function("roundtrip repair", |b| {
        b.iter(|| {
            let encoder = Encoder::new(&data, symbol_size).unwrap();
            let mut decoder = Decoder::new(elements as u64, symbol_size).unwrap();
            for id in source_symbols..(source_symbols * 2 + 2) {
                decoder.add_symbol(id, &encoder.encode(id).unwrap()).unwrap();
            }
            return decoder.decode().unwrap();
        })
    });

    group.bench_function("pieces half lost", |b| {
        b.iter(|| {
            let mut encoder = RaptorEncoder::new(source_symbols, symbol_size).unwrap();
            encoder.precode(&data).unwrap();
            let mut decoder = RaptorDecoder::new(source_symbols, symbol_size).unwrap();
            let mut piece = vec![0u8; encoder.encode_piece_size()];
            for seq in (0..source_symbols).step_by(2).chain(source_symbols..(source_symbols * 2)) {
                encoder.encode_raw(seq, &mut piece).unwrap();
                decoder.decode_raw(seq, &piece).unwrap();
            }
            return decoder.is_done();
        })
    });
    group.finish();
}

criterion_group!(benches, row_ops_benchmark, codec_benchmark);
criterion_main!(benches);
