use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use kopi_parse::{ParseOptions, parse_with};

static SIMPLE: &str = r#"
class Simple {
    int answer() {
        return 42;
    }
}
"#;

static MEDIUM: &str = r#"
package bench;

import java.util.*;

public sealed interface Shape permits Circle, Square {}

record Circle(double r) implements Shape {}

record Square(double side) implements Shape {}

final class Areas {
    static double area(Shape shape) {
        return switch (shape) {
            case Circle(double r) when r > 0 -> Math.PI * r * r;
            case Circle c -> 0;
            case Square s -> s.side() * s.side();
        };
    }

    static <T extends Comparable<T>> List<T> sorted(Collection<? extends T> items) {
        List<T> out = new ArrayList<>(items);
        out.sort((a, b) -> a.compareTo(b));
        for (int i = 0; i < out.size() >>> 1; i++) {
            if (out.get(i) instanceof String s && !s.isEmpty()) {
                continue;
            }
        }
        return out;
    }
}
"#;

static RECOVERY: &str = r#"
class Broken {
    int x
    void f( { int y = ; }
    void g() { h(1, ); }
    int z = 1 +;
}
class Fine { void ok() {} }
"#;

fn benchmark_parser(c: &mut Criterion) {
    let files = [("Simple", SIMPLE), ("Medium", MEDIUM), ("Recovery", RECOVERY)];
    let options = ParseOptions::default();

    let mut group = c.benchmark_group("Parser Benchmark");

    for (name, text) in files {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_code", name), &text, |b, &text| {
            b.iter(|| {
                let parse = parse_with(text, &options);
                black_box(parse);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
