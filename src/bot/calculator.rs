use crate::prices::PriceTable;

const FIRST_FACE_PRICE: u64 = 1200;
const EXTRA_FACE_PRICE: u64 = 600;

/// Заказ, который собирается по ходу диалога.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    pub size: Option<String>,
    pub style: Option<String>,
    pub face_count: u32,
    pub add_ons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub total: u64,
    pub lines: Vec<String>,
}

/// Стоимость отрисовки по числу лиц.
pub fn drawing_price(faces: u32) -> u64 {
    if faces == 0 {
        return 0;
    }
    FIRST_FACE_PRICE + u64::from(faces - 1) * EXTRA_FACE_PRICE
}

/// Считает итог и строки чека. Всё, чего нет в прайсе, стоит 0.
pub fn calculate_total(table: &PriceTable, order: &Order) -> Quote {
    let size = order.size.as_deref().unwrap_or_default();
    let style = order.style.as_deref().unwrap_or_default();

    let mut total = 0;
    let mut lines = Vec::with_capacity(order.add_ons.len() + 3);

    let base_price = u64::from(table.size_price(size).unwrap_or(0));
    total += base_price;
    lines.push(format!("• Размер: {size} — {base_price} ₽"));

    lines.push(format!("• Стиль: {style}"));
    if table.requires_face_count(style) {
        let price = drawing_price(order.face_count);
        total += price;
        lines.push(format!("• Лиц: {} — {price} ₽", order.face_count));
    }

    for add_on in &order.add_ons {
        let price = u64::from(table.add_on_price(add_on).unwrap_or(0));
        total += price;
        lines.push(format!("• {add_on} — {price} ₽"));
    }

    Quote { total, lines }
}

pub fn format_summary(table: &PriceTable, order: &Order) -> String {
    let Quote { total, lines } = calculate_total(table, order);
    format!(
        "🧾 Ваш заказ:\n{}\n\n💰 Итого: {total} ₽",
        lines.join("\n")
    )
}
