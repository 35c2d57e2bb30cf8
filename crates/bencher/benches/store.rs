use bencher::{TestCase, TestFile};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use inkwell_store::codec::DataUrl;
use inkwell_store::{json, Article};
use std::hint::black_box;

static ARTICLES: TestFile = TestFile::new("articles.json", include_str!("../resources/store/articles.json"));
static THUMB: TestFile = TestFile::new("thumb_data_url.txt", include_str!("../resources/store/thumb_data_url.txt"));

fn benchmark_collection(criterion: &mut Criterion) {
    let case = TestCase::new("200_articles", ARTICLES);
    let mut group = criterion.benchmark_group("collection");
    group.throughput(Throughput::Bytes(case.len()));

    group.bench_with_input(BenchmarkId::new("enumerate_array", case.name()), &case, |b, case| {
        b.iter(|| black_box(json::enumerate_array(case.file().content())));
    });

    let records = json::enumerate_array(ARTICLES.content()).unwrap_or_default();
    group.bench_with_input(BenchmarkId::new("read_records", case.name()), &records, |b, records| {
        b.iter(|| records.iter().map(|raw| Article::from_json(raw)).collect::<Vec<_>>());
    });

    let articles: Vec<Article> = records.iter().map(|raw| Article::from_json(raw)).collect();
    group.bench_with_input(BenchmarkId::new("write_records", case.name()), &articles, |b, articles| {
        b.iter(|| json::join_array(articles.iter().map(Article::to_json)));
    });

    group.finish();
}

fn benchmark_data_url(criterion: &mut Criterion) {
    let case = TestCase::new("16k_png_thumb", THUMB);
    let mut group = criterion.benchmark_group("data_url");
    group.throughput(Throughput::Bytes(case.len()));

    group.bench_with_input(BenchmarkId::new("decode", case.name()), &case, |b, case| {
        b.iter(|| DataUrl::parse(case.file().content()).ok().and_then(|url| url.decode()));
    });

    group.finish();
}

criterion_group!(store, benchmark_collection, benchmark_data_url);
criterion_main!(store);
