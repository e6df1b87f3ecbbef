//! Transactional email templates.

use domain::{BuyerSnapshot, Order};

use crate::services::Email;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn order_table(order: &Order) -> String {
    let rows: String = order
        .cart()
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
                escape(&item.name),
                item.quantity,
                item.line_total()
            )
        })
        .collect();

    format!(
        "<h3>Order {number} from {shop}</h3>\
         <table><tr><th>Item</th><th>Qty</th><th>Amount</th></tr>{rows}</table>\
         <p>Subtotal: {sub:.2}<br>Shipping: {ship:.2}<br>Tax: {tax:.2}<br>\
         Discount: -{disc:.2}<br><strong>Total: {total:.2}</strong></p>",
        number = escape(order.order_number()),
        shop = escape(order.shop_name()),
        sub = order.sub_total_price(),
        ship = order.shipping_price(),
        tax = order.tax(),
        disc = order.discount_price(),
        total = order.total_price(),
    )
}

/// Confirmation for a checkout, covering every seller order it produced.
pub fn order_confirmation(buyer: &BuyerSnapshot, orders: &[Order]) -> Email {
    let sections: String = orders.iter().map(order_table).collect();
    let grand_total: f64 = orders.iter().map(Order::total_price).sum();

    Email {
        to: buyer.email.clone(),
        subject: "Your order has been placed".to_string(),
        html: format!(
            "<p>Hi {name},</p><p>Thank you for your order. \
             It was split into {count} shipment(s).</p>{sections}\
             <p><strong>Grand total: {grand_total:.2}</strong></p>",
            name = escape(&buyer.name),
            count = orders.len(),
        ),
    }
}

/// Cancellation notice for one order.
pub fn cancellation_notice(order: &Order) -> Email {
    let reason = order.cancellation_reason().unwrap_or_default();

    Email {
        to: order.user().email.clone(),
        subject: format!("Order {} has been cancelled", order.order_number()),
        html: format!(
            "<p>Hi {name},</p><p>Your order {number} was cancelled.</p>\
             <p>Reason: {reason}</p>{table}",
            name = escape(&order.user().name),
            number = escape(order.order_number()),
            reason = escape(reason),
            table = order_table(order),
        ),
    }
}

/// Refund confirmation for one order.
pub fn refund_confirmation(order: &Order) -> Email {
    Email {
        to: order.user().email.clone(),
        subject: format!("Refund for order {} completed", order.order_number()),
        html: format!(
            "<p>Hi {name},</p><p>Your refund of {total:.2} for order {number} \
             has been processed.</p>{table}",
            name = escape(&order.user().name),
            total = order.total_price(),
            number = escape(order.order_number()),
            table = order_table(order),
        ),
    }
}
