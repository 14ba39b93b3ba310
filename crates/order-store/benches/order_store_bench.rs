use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Money, OrderRecord, OrderStatus, PricedLine, ProductId, UserId};
use order_store::{InMemoryOrderRepository, ListQuery, OrderRepository};

fn make_record(user: &str) -> OrderRecord {
    let lines = (0..5)
        .map(|i| PricedLine::new(ProductId::new(format!("P{i}")), 2, Money::from_cents(1500)))
        .collect();
    OrderRecord::pending(UserId::from(user), lines, Utc::now()).unwrap()
}

fn bench_create(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/create", |b| {
        b.iter(|| {
            rt.block_on(async {
                let repo = InMemoryOrderRepository::new();
                repo.create(&make_record("U1")).await.unwrap();
            });
        });
    });
}

fn bench_list_by_user(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let repo = InMemoryOrderRepository::new();
    rt.block_on(async {
        for i in 0..500 {
            let user = if i % 2 == 0 { "U1" } else { "U2" };
            repo.create(&make_record(user)).await.unwrap();
        }
    });
    let user = UserId::from("U1");

    c.bench_function("order_store/list_by_user_500", |b| {
        b.iter(|| {
            rt.block_on(async {
                repo.list_by_user(&user, ListQuery::new(20, 40)).await.unwrap();
            });
        });
    });
}

fn bench_update_status(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let repo = InMemoryOrderRepository::new();
    let record = make_record("U1");
    rt.block_on(async { repo.create(&record).await.unwrap() });

    c.bench_function("order_store/update_status", |b| {
        b.iter(|| {
            rt.block_on(async {
                repo.update_status(record.id(), OrderStatus::Paid)
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_create, bench_list_by_user, bench_update_status);
criterion_main!(benches);
