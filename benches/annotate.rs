//! Benchmarks for the annotation pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use hatch::{Annotator, Configure, parse_html};

/// A page with a bit of every feature, repeated `sections` times.
fn sample_page(sections: usize) -> String {
    let mut html = String::from("<html lang='en'><body><nav><a href='/' accesskey='h'>Home</a></nav><main><h1>Report</h1>");
    for i in 0..sections {
        html.push_str(&format!(
            "<h2>Section {i}</h2>\
             <table><tr><th id='n{i}'>Name</th><th id='v{i}'>Value</th></tr>\
             <tr><td headers='n{i} v{i}'>Item</td><td aria-sort='ascending'>{i}</td></tr></table>\
             <img src='{i}.png' alt='Figure {i}' longdesc='fig{i}.html'>\
             <label for='f{i}'>Field</label><input id='f{i}' type='number' min='0' max='9' required>\
             <div role='checkbox' aria-checked='mixed' lang='pt'>Option</div>"
        ));
    }
    html.push_str("</main><footer>End</footer></body></html>");
    html
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let html = sample_page(50);
    c.bench_function("parse_html", |b| {
        b.iter(|| parse_html(&html));
    });
}

// ============================================================================
// Annotation
// ============================================================================

fn bench_annotate_all(c: &mut Criterion) {
    let config = Configure::english().unwrap();
    let html = sample_page(50);
    c.bench_function("annotate_all", |b| {
        b.iter(|| {
            let mut annotator = Annotator::from_html(&html, &config).unwrap();
            annotator.run_all().unwrap();
            annotator.to_html()
        });
    });
}

fn bench_reannotate(c: &mut Criterion) {
    let config = Configure::english().unwrap();
    let mut annotator = Annotator::from_html(&sample_page(50), &config).unwrap();
    annotator.run_all().unwrap();
    let annotated = annotator.to_html();

    c.bench_function("reannotate_annotated_page", |b| {
        b.iter(|| {
            let mut annotator = Annotator::from_html(&annotated, &config).unwrap();
            annotator.run_all().unwrap();
        });
    });
}

criterion_group!(benches, bench_parse, bench_annotate_all, bench_reannotate);
criterion_main!(benches);
