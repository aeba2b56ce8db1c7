mod model {
    pub mod inner {
        #[fixturegen_macros::fixture]
        #[derive(Debug, Clone, PartialEq)]
        pub struct Address {
            pub city: String,
        }
    }

    #[fixturegen_macros::fixture_adapter]
    pub fn supply_city() -> Option<String> {
        None
    }
}

fn main() {
    let address = model::inner::Address {
        city: model::supply_city().unwrap_or_default(),
    };
    assert_eq!(address.clone(), address);
}
