//! Contention tests: concurrent buyers hammering one shelf must never
//! drive stock negative or sell the same unit twice.

use platter_node_integration::harness::MarketHarness;
use platter_node_integration::make_dummy_purchase;
use serde_json::Value;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_buyers_never_oversell() {
    let market = MarketHarness::setup().await;

    // Eight buyers race for Feta's four units.
    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let client = market.node.client.clone();
        let url = market.node.url("/purchases");
        let buyer = format!("Buyer{i}");
        tasks.spawn(async move {
            client
                .post(&url)
                .json(&make_dummy_purchase("Feta", &buyer, 1, 8.0))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            201 => created += 1,
            409 => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 4);
    assert_eq!(conflicts, 4);

    let feta = market.food_by_name("Feta").await;
    assert_eq!(feta["quantity"], 0);
    assert_eq!(feta["purchaseCount"], 4);
    assert_eq!(market.purchases().await.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contended_large_orders_have_one_winner() {
    let market = MarketHarness::setup().await;

    // Two orders of 3 against 4 units: exactly one can fit.
    let mut tasks = JoinSet::new();
    for buyer in ["Alice", "Bob"] {
        let client = market.node.client.clone();
        let url = market.node.url("/purchases");
        tasks.spawn(async move {
            let resp = client
                .post(&url)
                .json(&make_dummy_purchase("Feta", buyer, 3, 8.0))
                .send()
                .await
                .unwrap();
            let status = resp.status().as_u16();
            let body: Value = resp.json().await.unwrap();
            (status, body)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(result) = tasks.join_next().await {
        outcomes.push(result.unwrap());
    }
    outcomes.sort_by_key(|(status, _)| *status);

    let (winner_status, winner_body) = &outcomes[0];
    assert_eq!(*winner_status, 201);
    assert_eq!(winner_body["updatedQuantity"], 1);

    let (loser_status, loser_body) = &outcomes[1];
    assert_eq!(*loser_status, 409);
    assert_eq!(loser_body["available"], 1);
    assert_eq!(loser_body["requested"], 3);

    let feta = market.food_by_name("Feta").await;
    assert_eq!(feta["quantity"], 1);
    assert_eq!(feta["purchaseCount"], 3);
    assert_eq!(market.purchases().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_unit_sold_exactly_once() {
    let market = MarketHarness::setup().await;

    // Twenty buyers chase Haloumi's ten units.
    let mut tasks = JoinSet::new();
    for i in 0..20 {
        let client = market.node.client.clone();
        let url = market.node.url("/purchases");
        let buyer = format!("Buyer{i}");
        tasks.spawn(async move {
            client
                .post(&url)
                .json(&make_dummy_purchase("Haloumi", &buyer, 1, 12.5))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        });
    }

    let mut created = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap() == 201 {
            created += 1;
        }
    }
    assert_eq!(created, 10);

    let haloumi = market.food_by_name("Haloumi").await;
    assert_eq!(haloumi["quantity"], 0);
    assert_eq!(haloumi["purchaseCount"], 10);
    assert_eq!(market.purchases().await.len(), 10);
}
