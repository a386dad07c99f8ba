use complaint_loss::text::normalize::TextNormalizer;
use complaint_loss::text::vectorize::TfidfVectorizer;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_narratives(n: usize) -> Vec<String> {
    let openers = [
        "On XX/XX/2019 I noticed",
        "My bank, Wells Fargo, charged",
        "I called customer service because",
        "The company never explained why",
        "After I disputed the charge",
    ];
    let middles = [
        "an overdraft fee of $35.00 was charged twice",
        "my account was closed without notice",
        "the late payment was reported to the credit bureau",
        "they refused to refund the annual fee",
        "the mortgage servicer lost my paperwork",
    ];
    let endings = [
        "and John Smith never called back.",
        "and I am still waiting on a refund.",
        "so I filed this complaint on Monday.",
        "even though I paid on time every month!",
        "and nobody could tell me what happened.",
    ];

    (0..n)
        .map(|i| {
            format!(
                "{} {} {}",
                openers[i % openers.len()],
                middles[(i / 5) % middles.len()],
                endings[(i / 25) % endings.len()]
            )
        })
        .collect()
}

fn bench_normalize_one(c: &mut Criterion) {
    let normalizer = TextNormalizer::with_workers(Some(1)).expect("normalizer starts");
    let text = "XXXX charged me twice, John Smith never called back about the $35.00 fee.";

    c.bench_function("normalize_one", |b| {
        b.iter(|| normalizer.normalize(black_box(text)));
    });
}

fn bench_normalize_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_many");

    for workers in [1, 4] {
        let normalizer = TextNormalizer::with_workers(Some(workers)).expect("normalizer starts");
        for size in [100, 1_000] {
            let docs = generate_narratives(size);
            group.bench_with_input(
                BenchmarkId::new(format!("workers_{workers}"), size),
                &docs,
                |b, docs| {
                    b.iter(|| normalizer.normalize_many(black_box(docs)));
                },
            );
        }
    }

    group.finish();
}

fn bench_tfidf_fit(c: &mut Criterion) {
    let normalizer = TextNormalizer::new().expect("normalizer starts");
    let mut group = c.benchmark_group("tfidf_fit");

    for size in [500, 2_000] {
        let cleaned = normalizer.normalize_many(&generate_narratives(size));
        let vectorizer = TfidfVectorizer::new().with_min_df(2).with_max_df(0.9);
        group.bench_with_input(BenchmarkId::from_parameter(size), &cleaned, |b, cleaned| {
            b.iter(|| vectorizer.fit(black_box(cleaned)).expect("vocabulary"));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize_one,
    bench_normalize_many,
    bench_tfidf_fit
);
criterion_main!(benches);
