use dosfronteras::cart::{Cart, CartError, CartItem, format_price};
use dosfronteras::state::{AppState, StateError};

#[test]
fn adding_same_product_and_size_twice_gives_one_line() {
    let mut state = AppState::new();
    state.add_to_cart("tee-classic", Some("M")).expect("first add");
    let line = state.add_to_cart("tee-classic", Some("M")).expect("second add");
    assert_eq!(line.quantity, 2);
    assert_eq!(state.cart.items().len(), 1);
    assert_eq!(state.cart.count(), 2);
    assert_eq!(state.cart.total_cents(), 2 * 2999);
}

#[test]
fn different_sizes_are_separate_lines() {
    let mut state = AppState::new();
    state.add_to_cart("tee-classic", Some("M")).expect("add M");
    state.add_to_cart("tee-classic", Some("L")).expect("add L");
    assert_eq!(state.cart.items().len(), 2);
}

#[test]
fn decrementing_to_zero_removes_the_line() {
    let mut state = AppState::new();
    state.add_to_cart("cap-snapback", None).expect("add");
    state.add_to_cart("cap-snapback", None).expect("add again");

    assert_eq!(state.change_quantity("cap-snapback", None, -1), Ok(Some(1)));
    assert_eq!(state.change_quantity("cap-snapback", None, -1), Ok(None));
    assert!(state.cart.is_empty());
    assert_eq!(state.cart.count(), 0);

    assert_eq!(
        state.change_quantity("cap-snapback", None, -1),
        Err(StateError::Cart(CartError::MissingLine("cap-snapback".to_string())))
    );
}

#[test]
fn sized_products_need_a_valid_size() {
    let mut state = AppState::new();
    assert!(matches!(
        state.add_to_cart("hoodie-walkout", None),
        Err(StateError::Cart(CartError::SizeRequired(_)))
    ));
    assert!(matches!(
        state.add_to_cart("hoodie-walkout", Some("XXXL")),
        Err(StateError::Cart(CartError::UnknownSize { .. }))
    ));
    assert!(matches!(
        state.add_to_cart("no-such-thing", None),
        Err(StateError::UnknownProduct(_))
    ));
    assert!(state.cart.is_empty());
    assert!(!state.dirty);
}

#[test]
fn one_size_products_ignore_a_size() {
    let mut state = AppState::new();
    let line = state
        .add_to_cart("bottle-steel", Some("L"))
        .expect("one-size add");
    assert_eq!(line.size, None);
}

#[test]
fn restored_items_merge_and_drop_empty_rows() {
    let line = |qty: u32| CartItem {
        id: "cap-snapback".to_string(),
        name: "Snapback Cap".to_string(),
        price_cents: 2499,
        size: None,
        quantity: qty,
    };
    let cart = Cart::from_items(vec![line(1), line(0), line(2)]);
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.count(), 3);
}

#[test]
fn remove_and_clear() {
    let mut state = AppState::new();
    state.add_to_cart("gloves-training", Some("L/XL")).expect("add");
    state.add_to_cart("cap-snapback", None).expect("add");
    let removed = state
        .remove_from_cart("gloves-training", Some("L/XL"))
        .expect("remove");
    assert_eq!(removed.quantity, 1);
    assert_eq!(state.cart.items().len(), 1);
    state.clear_cart();
    assert!(state.cart.is_empty());
}

#[test]
fn prices_format_as_dollars() {
    assert_eq!(format_price(0), "$0.00");
    assert_eq!(format_price(2999), "$29.99");
    assert_eq!(format_price(120_005), "$1200.05");
}
