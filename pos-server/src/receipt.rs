//! Plain-text receipts (48 columns, thermal printer width)

use chrono_tz::Tz;
use shared::models::OrderDetail;

use crate::orders::money::{line_total, to_f64};
use crate::utils::time::format_millis;

pub const RECEIPT_WIDTH: usize = 48;

const STORE_TITLE: &str = "SALES RECEIPT";

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn rule(out: &mut String, ch: char) {
    out.extend(std::iter::repeat_n(ch, RECEIPT_WIDTH));
    out.push('\n');
}

fn centered(out: &mut String, text: &str) {
    let text = truncate(text, RECEIPT_WIDTH);
    let pad = (RECEIPT_WIDTH - text.chars().count()) / 2;
    out.push_str(&" ".repeat(pad));
    out.push_str(&text);
    out.push('\n');
}

/// `left` and `right` on one line; `left` is cut to make room.
fn two_columns(out: &mut String, left: &str, right: &str) {
    let right_len = right.chars().count();
    let room = RECEIPT_WIDTH.saturating_sub(right_len + 1);
    let left = truncate(left, room);
    let gap = RECEIPT_WIDTH.saturating_sub(left.chars().count() + right_len);
    out.push_str(&left);
    out.push_str(&" ".repeat(gap.max(1)));
    out.push_str(right);
    out.push('\n');
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

/// Render an order as a receipt. Times are shown in `tz`.
pub fn render(detail: &OrderDetail, tz: Tz) -> String {
    let order = &detail.order;
    let mut out = String::new();

    centered(&mut out, STORE_TITLE);
    rule(&mut out, '=');
    two_columns(&mut out, "Order", &order.id);
    two_columns(&mut out, "Date", &format_millis(order.created_at, tz));
    let staff = detail
        .staff
        .as_ref()
        .map(|s| s.full_name.as_str())
        .unwrap_or("-");
    two_columns(&mut out, "Staff", staff);
    let customer = match &detail.customer {
        Some(c) => format!("{} ({})", c.full_name, c.phone),
        None => order.customer_id.clone(),
    };
    two_columns(&mut out, "Customer", &customer);
    rule(&mut out, '-');

    for line in &detail.items {
        let item = &line.item;
        let name = line
            .product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(item.product_id.as_str());
        let total = to_f64(line_total(item.price, item.quantity));
        two_columns(&mut out, name, &money(total));
        out.push_str(&format!("  {} x {}\n", item.quantity, money(item.price)));
    }

    rule(&mut out, '-');
    two_columns(&mut out, "TOTAL", &money(order.total_amount));
    two_columns(&mut out, "Payment", order.payment_method.as_str());
    two_columns(&mut out, "Sale type", order.sale_type.as_str());
    rule(&mut out, '=');
    centered(&mut out, "Thank you!");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{
        Customer, Order, OrderItem, OrderItemDetail, PaymentMethod, Product, SaleType, UserPublic,
        UserRole,
    };

    fn detail() -> OrderDetail {
        let product = Product {
            id: "p1".into(),
            name: "Coke".into(),
            price: 150.0,
            category_id: "c1".into(),
            barcode: Some("COKE001".into()),
            description: None,
            image_url: None,
            created_at: 0,
        };
        OrderDetail {
            order: Order {
                id: "order-1".into(),
                staff_id: "u1".into(),
                customer_id: "cust-seed-1".into(),
                payment_method: PaymentMethod::Card,
                sale_type: SaleType::Takeaway,
                total_amount: 300.0,
                status: "PAID".into(),
                version: 1,
                idempotency_key: None,
                created_at: 0,
                updated_at: 0,
            },
            items: vec![OrderItemDetail {
                item: OrderItem {
                    id: "i1".into(),
                    order_id: "order-1".into(),
                    product_id: "p1".into(),
                    quantity: 2,
                    price: 150.0,
                },
                product: Some(product),
            }],
            customer: Some(Customer {
                id: "cust-seed-1".into(),
                full_name: "Walk-in Customer".into(),
                phone: "0771234567".into(),
                email: None,
                created_at: 0,
            }),
            staff: Some(UserPublic {
                id: "u1".into(),
                username: "staff1".into(),
                full_name: "Demo Staff".into(),
                role: UserRole::Staff,
            }),
        }
    }

    #[test]
    fn lines_fit_the_paper() {
        let text = render(&detail(), Tz::UTC);
        for line in text.lines() {
            assert!(line.chars().count() <= RECEIPT_WIDTH, "too wide: {line:?}");
        }
    }

    #[test]
    fn shows_items_and_totals() {
        let text = render(&detail(), Tz::UTC);
        assert!(text.contains("Coke"));
        assert!(text.contains("2 x 150.00"));
        assert!(text.contains("300.00"));
        assert!(text.contains("CARD"));
        assert!(text.contains("TAKEAWAY"));
        assert!(text.contains("Walk-in Customer (0771234567)"));
    }

    #[test]
    fn long_names_are_cut() {
        let mut d = detail();
        if let Some(p) = d.items[0].product.as_mut() {
            p.name = "X".repeat(80);
        }
        let text = render(&d, Tz::UTC);
        assert!(text.lines().all(|l| l.chars().count() <= RECEIPT_WIDTH));
    }
}
