use fixturegen_macros::{fixture, fixture_adapter};

pub struct Money {
    pub cents: i64,
}

#[fixture]
pub struct Order {
    pub id: u64,
    pub total: Money,
}

#[fixture_adapter]
pub fn supply_money() -> Money {
    Money { cents: 100 }
}

fn main() {
    let order = Order {
        id: 1,
        total: supply_money(),
    };
    assert_eq!(order.total.cents, 100);
    assert_eq!(order.id, 1);
}
