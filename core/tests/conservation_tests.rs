// tests/conservation_tests.rs
mod common;

use common::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
  Add(usize),
  Update(usize, i32),
  Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
  prop_oneof![
    (0..3usize).prop_map(Op::Add),
    (0..3usize, -2..8i32).prop_map(|(s, q)| Op::Update(s, q)),
    (0..3usize).prop_map(Op::Remove),
  ]
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn stock_is_conserved_and_never_negative(
    initial in 0..6i32,
    ops in proptest::collection::vec(op_strategy(), 1..40),
  ) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
      let shop = Shop::new();
      let merch = shop.stocked("Print", initial).await;
      let shoppers = [Shopper::verified(), Shopper::verified(), Shopper::verified()];

      for op in ops {
        // NotFound on update/remove of an absent line is an expected answer here.
        match op {
          Op::Add(s) => {
            let shopper = &shoppers[s];
            shop.service.add_item(&shopper.viewer, &shopper.session, merch.id).await.unwrap();
          }
          Op::Update(s, quantity) => {
            let shopper = &shoppers[s];
            let _ = shop.service.update_quantity(&shopper.viewer, &shopper.session, merch.id, quantity).await;
          }
          Op::Remove(s) => {
            let shopper = &shoppers[s];
            let _ = shop.service.remove_item(&shopper.viewer, &shopper.session, merch.id).await;
          }
        }

        let stock = shop.stock(&merch).await;
        assert!(stock >= 0, "stock went negative: {}", stock);
        assert_eq!(shop.accounted_units(&merch).await, initial);
      }
    });
  }
}
