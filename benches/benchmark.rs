use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use tesorera::api::Engine;
use tesorera::core::finance::Money;
use tesorera::core::model::{Expense, Income, Priority};

fn money(v: i64) -> Money {
    Money::new(Decimal::new(v, 0))
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() + chrono::Duration::days(i64::from(d % 28))
}

fn records() -> (Vec<Income>, Vec<Expense>) {
    let incomes = (0..100u32)
        .map(|n| Income::new(format!("i{n}"), money(500 + i64::from(n)), date(n)))
        .collect();
    let expenses = (0..200u32)
        .map(|n| {
            let priority = match n % 3 {
                0 => Priority::High,
                1 => Priority::Medium,
                _ => Priority::Low,
            };
            Expense::new(format!("e{n}"), money(100 + i64::from(n) * 3), date(n + 2))
                .with_priority(priority)
                .with_category("servicios")
        })
        .collect();
    (incomes, expenses)
}

fn full_pipeline(c: &mut Criterion) {
    let engine = Engine::default();
    let (incomes, expenses) = records();
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    c.bench_function("prioritize_100x200", |b| {
        b.iter(|| engine.prioritize(&incomes, &expenses, today));
    });
}

criterion_group!(benches, full_pipeline);
criterion_main!(benches);
