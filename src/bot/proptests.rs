//! Свойства калькулятора и диалога заказа на произвольных входных данных.

use super::calculator::{calculate_total, drawing_price, Order};
use super::common::DONE;
use super::order::{OrderSession, OrderStep};
use crate::prices::PriceTable;
use proptest::prelude::*;

fn table() -> PriceTable {
    PriceTable::default()
}

fn arb_known_size() -> impl Strategy<Value = String> {
    prop::sample::select(table().size_names().map(String::from).collect::<Vec<_>>())
}

fn arb_drawn_style() -> impl Strategy<Value = String> {
    let table = table();
    let styles: Vec<String> = table
        .style_names()
        .filter(|style| table.requires_face_count(style))
        .map(String::from)
        .collect();
    prop::sample::select(styles)
}

fn arb_known_add_on() -> impl Strategy<Value = String> {
    prop::sample::select(table().add_on_names().map(String::from).collect::<Vec<_>>())
}

fn arb_known_add_ons() -> impl Strategy<Value = Vec<String>> {
    let names: Vec<String> = table().add_on_names().map(String::from).collect();
    let len = names.len();
    prop::sample::subsequence(names, 0..=len).prop_shuffle()
}

fn arb_any_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Zа-яА-Я0-9×x ]{0,20}",
        arb_known_size(),
        arb_drawn_style(),
        arb_known_add_on(),
        Just(DONE.to_string()),
    ]
}

fn arb_order() -> impl Strategy<Value = Order> {
    (
        prop::option::of(prop_oneof![arb_known_size(), "[0-9]{2,3}×[0-9]{2,3}"]),
        prop::option::of(prop_oneof![arb_drawn_style(), "[a-zA-Z ]{1,15}"]),
        0u32..20,
        prop::collection::vec(prop_oneof![arb_known_add_on(), "[a-z]{1,8}"], 0..4),
    )
        .prop_map(|(size, style, face_count, add_ons)| Order {
            size,
            style,
            face_count,
            add_ons,
        })
}

proptest! {
    #[test]
    fn total_is_deterministic(order in arb_order()) {
        let table = table();
        prop_assert_eq!(calculate_total(&table, &order), calculate_total(&table, &order));
    }

    #[test]
    fn total_equals_sum_of_parts(order in arb_order()) {
        let table = table();
        let size = order.size.as_deref().unwrap_or_default();
        let style = order.style.as_deref().unwrap_or_default();

        let mut expected = u64::from(table.size_price(size).unwrap_or(0));
        if table.requires_face_count(style) {
            expected += drawing_price(order.face_count);
        }
        for add_on in &order.add_ons {
            expected += u64::from(table.add_on_price(add_on).unwrap_or(0));
        }

        prop_assert_eq!(calculate_total(&table, &order).total, expected);
    }

    #[test]
    fn drawing_price_follows_face_formula(
        size in arb_known_size(),
        style in arb_drawn_style(),
        faces in 1u32..=10,
    ) {
        let table = table();
        let base = calculate_total(&table, &Order { size: Some(size.clone()), ..Order::default() }).total;
        let order = Order {
            size: Some(size),
            style: Some(style),
            face_count: faces,
            add_ons: Vec::new(),
        };

        let quote = calculate_total(&table, &order);

        prop_assert_eq!(quote.total - base, 1200 + 600 * u64::from(faces - 1));
        prop_assert_eq!(quote.lines.len(), 3);
    }

    #[test]
    fn flat_style_never_charges_for_faces(size in arb_known_size(), faces in 0u32..100) {
        let table = table();
        let order = Order {
            size: Some(size.clone()),
            style: Some("Просто фото на холсте".to_string()),
            face_count: faces,
            add_ons: Vec::new(),
        };

        let quote = calculate_total(&table, &order);

        prop_assert_eq!(quote.total, u64::from(table.size_price(&size).unwrap()));
        prop_assert_eq!(quote.lines.len(), 2);
    }

    #[test]
    fn total_grows_with_each_known_add_on(
        size in arb_known_size(),
        style in arb_drawn_style(),
        add_ons in arb_known_add_ons(),
    ) {
        let table = table();
        let mut order = Order {
            size: Some(size),
            style: Some(style),
            face_count: 1,
            add_ons: Vec::new(),
        };

        let mut previous = calculate_total(&table, &order).total;
        for add_on in add_ons {
            order.add_ons.push(add_on);
            let current = calculate_total(&table, &order).total;
            prop_assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn invalid_size_leaves_session_untouched(text in "[^×]{0,20}") {
        let table = table();
        let (mut session, _) = OrderSession::start(&table);
        let before = session.clone();

        let first = session.handle(&table, &text);
        let second = session.handle(&table, &text);

        prop_assert_eq!(&session, &before);
        prop_assert_eq!(first.len(), 1);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_event_gets_a_reply_until_terminal(inputs in prop::collection::vec(arb_any_text(), 0..30)) {
        let table = table();
        let (mut session, _) = OrderSession::start(&table);

        for text in inputs {
            let was_options = session.step == OrderStep::AwaitingOptions;
            let was_terminal = session.is_finished();
            let replies = session.handle(&table, &text);

            let expected = match (was_terminal, was_options && text == DONE) {
                (true, _) => 0,
                (false, true) => 2,
                (false, false) => 1,
            };
            prop_assert_eq!(replies.len(), expected);
        }
    }

    #[test]
    fn add_ons_never_repeat(choices in prop::collection::vec(arb_known_add_ons(), 0..5)) {
        let table = table();
        let mut session = OrderSession {
            step: OrderStep::AwaitingOptions,
            order: Order::default(),
        };

        for name in choices.into_iter().flatten() {
            session.handle(&table, &name);
        }

        let mut seen = std::collections::HashSet::new();
        prop_assert!(session.order.add_ons.iter().all(|name| seen.insert(name)));
        prop_assert!(session.order.add_ons.iter().all(|name| table.is_add_on(name)));
    }
}
