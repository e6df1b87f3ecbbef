use std::hint::black_box;

use chrono::Utc;
use common::{OrderId, SellerRef, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AggregateTotals, BuyerSnapshot, CartItem, NewOrder, Order, OrderStatus, PaymentInfo,
    PaymentStatus, SellerAllocation, ShippingAddress, partition_by_seller, plan_checkout,
};

fn make_cart(items: usize, sellers: usize) -> Vec<CartItem> {
    (0..items)
        .map(|i| {
            CartItem::new(
                format!("SKU-{i:04}"),
                format!("Product {i}"),
                1 + (i % 4) as u32,
                10.0 + i as f64,
                format!("shop-{}", i % sellers).as_str(),
            )
        })
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    let cart = make_cart(100, 10);

    c.bench_function("domain/partition_100_items_10_sellers", |b| {
        b.iter(|| partition_by_seller(black_box(cart.clone())));
    });
}

fn bench_plan_checkout(c: &mut Criterion) {
    let cart = make_cart(100, 10);
    let totals = AggregateTotals::new(45.0, 12.5, 30.0);

    c.bench_function("domain/plan_checkout_100_items", |b| {
        b.iter(|| plan_checkout(black_box(cart.clone()), black_box(&totals)).unwrap());
    });
}

fn bench_full_lifecycle(c: &mut Criterion) {
    let cart = make_cart(5, 1);

    c.bench_function("domain/place_and_deliver", |b| {
        b.iter(|| {
            let mut order = Order::place(NewOrder {
                id: OrderId::new(),
                order_number: "wanttar-00001".to_string(),
                seller: SellerRef::from("shop-0"),
                shop_name: "Shop 0".to_string(),
                cart: cart.clone(),
                shipping_address: ShippingAddress::default(),
                user: BuyerSnapshot {
                    id: UserId::new("bench-user"),
                    name: "Bench".to_string(),
                    email: "bench@example.com".to_string(),
                    phone: None,
                },
                payment_info: PaymentInfo::new(None, PaymentStatus::Pending, "COD"),
                pricing: SellerAllocation::default(),
                placed_at: Utc::now(),
            })
            .unwrap();

            for status in [
                OrderStatus::TransferredToDeliveryPartner,
                OrderStatus::Shipping,
                OrderStatus::Delivered,
            ] {
                let event = order.change_status(status, None, None, Utc::now()).unwrap();
                order.apply(event);
            }
            order
        });
    });
}

criterion_group!(
    benches,
    bench_partition,
    bench_plan_checkout,
    bench_full_lifecycle,
);
criterion_main!(benches);
