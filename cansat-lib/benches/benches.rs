use cansat::framing::{encode, payload_crc32, tokenize, validate_frame, FrameFormat};
use cansat::{PacketDecoder, Reading, Vector3};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

fn sample_frame(format: &FrameFormat) -> Vec<u8> {
    let reading = Reading {
        header: format.header_code.clone(),
        team_id: 1,
        packet_count: 318,
        mission_time: 1_234_567,
        altitude: 712.375,
        battery_voltage: 8.12,
        atmospheric_pressure: 93_512.25,
        gps_time: 1_530_101_010,
        gps_latitude: 19.432_608,
        gps_longitude: -99.133_209,
        gps_satellite_count: "11".into(),
        accelerometer: Vector3::new(0.012, -0.98, 9.806_65),
        gyroscope: Vector3::new(1.5e-3, -270.25, 0.1),
        ..Default::default()
    };
    encode(&reading, format)
}

fn bench_decode(c: &mut Criterion) {
    let format = FrameFormat::default();
    let frame = sample_frame(&format);
    let mut decoder = PacketDecoder::new(format);

    let mut group = c.benchmark_group("decoder");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            let _ = decoder.decode(&frame).unwrap();
        });
    });
    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let format = FrameFormat::default();
    let frame = sample_frame(&format);
    let body = validate_frame(&frame, &format).unwrap();
    let tokens = tokenize(body, format.separator).unwrap();

    let mut group = c.benchmark_group("integrity");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("payload_crc32", |b| {
        b.iter(|| payload_crc32(&tokens, format.separator));
    });
    group.finish();
}

criterion_group!(benches, bench_decode, bench_checksum);
criterion_main!(benches);
