use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gominus_parser::{tokenize, Parser};

const PROGRAM: &str = r#"
package main

import "fmt"

class Shape {
    var name string
    virtual func area() float { return 0.0 }
}

class Square extends Shape {
    var side float
    override func area() float { return this.side * this.side }
}

template<T> func max(a T, b T) T {
    if a > b { return a }
    return b
}

func main() {
    var total = 0
    for var i = 0; i < 100; i++ {
        total += max<int>(i, total)
    }
    try {
        throw "boom"
    } catch (e string) {
        fmt.Println(e)
    }
}
"#;

fn bench_keywords(c: &mut Criterion) {
    let source = "func var const if else for while class template try catch throw return";

    c.bench_function("lex_keywords", |b| {
        b.iter(|| tokenize(black_box(source)));
    });
}

fn bench_literals(c: &mut Criterion) {
    let mut group = c.benchmark_group("literals");

    let numbers = "42 123 0 999 3.14 2.718 0.5";
    group.bench_with_input(BenchmarkId::new("numbers", "mixed"), &numbers, |b, source| {
        b.iter(|| tokenize(black_box(source)));
    });

    let strings = r#""hello" "tab\there" 'c' `raw \n`"#;
    group.bench_with_input(BenchmarkId::new("strings", "escapes"), &strings, |b, source| {
        b.iter(|| tokenize(black_box(source)));
    });

    group.finish();
}

fn bench_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("program");
    group.throughput(Throughput::Bytes(PROGRAM.len() as u64));

    group.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(PROGRAM)));
    });

    group.bench_function("parse", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(PROGRAM));
            parser.parse_program()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_keywords, bench_literals, bench_program);
criterion_main!(benches);
