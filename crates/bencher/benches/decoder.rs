use bencher::{TestCase, TestFile};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use inkwell_http::codec::RequestDecoder;
use std::hint::black_box;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

static GET_SMALL: TestFile = TestFile::new("get_small.txt", include_str!("../resources/request/get_small.txt"));
static POST_ARTICLE: TestFile = TestFile::new("post_article.txt", include_str!("../resources/request/post_article.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::new("get_without_body", GET_SMALL), TestCase::new("post_with_json_body", POST_ARTICLE)]
}

fn benchmark_request_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("request_decoder");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.len()));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched_ref(
                || (RequestDecoder::new(), BytesMut::from(case.file().content())),
                |(request_decoder, bytes_mut)| {
                    // header first, then the body chunk or nothing
                    let header = request_decoder.decode(bytes_mut).expect("input should be a valid request header");
                    let body = request_decoder.decode(bytes_mut).expect("input should be a valid request body");
                    black_box((header, body));
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_request_decoder);
criterion_main!(decoder);
