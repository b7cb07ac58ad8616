use criterion::{Criterion, criterion_group, criterion_main};
use abbrex_engine::{ExpandRequest, Expander, Syntax, markup};
mod common;

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let abbr = common::generate_abbreviation(20);

    group.bench_function("markup_parse", |b| {
        b.iter(|| markup::parse(std::hint::black_box(&abbr), 100_000))
    });

    group.finish();
}

fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");
    group.sample_size(10);

    let html = Expander::new(Syntax::Html);
    let css = Expander::new(Syntax::Css);
    let abbr = common::generate_abbreviation(5);
    let text = common::generate_lines(200);

    group.bench_function("html_nested", |b| {
        b.iter(|| html.expand(std::hint::black_box(&abbr)))
    });

    group.bench_function("html5_document", |b| {
        b.iter(|| html.expand(std::hint::black_box("!")))
    });

    group.bench_function("wrap_lines", |b| {
        let request = ExpandRequest::new("ul>li*>a").with_text(&text);
        b.iter(|| html.expand_with(std::hint::black_box(&request)))
    });

    group.bench_function("css_fuzzy", |b| {
        b.iter(|| css.expand(std::hint::black_box("posa+bdrs5+trf+p10-20!+c#fc0")))
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_expansion);
criterion_main!(benches);
