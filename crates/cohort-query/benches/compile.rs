//! Parse and compile benchmarks using divan

use cohort_query::{compile_to_filter_document, lower_expression, parse_query};

fn main() {
    divan::main();
}

fn chain(len: usize) -> String {
    (0..len)
        .map(|i| format!("has d{}", 1_000_000 + i))
        .collect::<Vec<_>>()
        .join(" and ")
}

mod parse {
    use super::*;

    #[divan::bench]
    fn single_has(bencher: divan::Bencher) {
        bencher.bench_local(|| parse_query(divan::black_box("has d1125315")));
    }

    #[divan::bench]
    fn val_clause(bencher: divan::Bencher) {
        bencher.bench_local(|| {
            parse_query(divan::black_box("val(c123) < 2020-01-01T00:00:00Z"))
        });
    }

    #[divan::bench(args = [10, 100, 200])]
    fn long_chain(bencher: divan::Bencher, len: usize) {
        let query = chain(len);
        bencher.bench_local(|| parse_query(divan::black_box(&query)));
    }
}

mod compile {
    use super::*;

    #[divan::bench]
    fn compound(bencher: divan::Bencher) {
        bencher.bench_local(|| {
            compile_to_filter_document(divan::black_box(
                "(has c123 and not has d345 or val(m7) > 2019-06-30)",
            ))
        });
    }

    #[divan::bench(args = [10, 100, 200])]
    fn lower_chain(bencher: divan::Bencher, len: usize) {
        let expr = parse_query(&chain(len)).expect("valid query");
        bencher.bench_local(|| lower_expression(divan::black_box(&expr)));
    }
}
