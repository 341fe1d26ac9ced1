// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in templates seeded into a fresh registry.
//!
//! These cover the common transactional flows so a new deployment can send
//! something useful before any custom templates are authored.

use chrono::Utc;
use herald_core::types::{
    Channel, NotificationTemplate, TemplateKind, TemplateVariable,
};

fn template(
    id: &str,
    name: &str,
    kind: TemplateKind,
    channel: Channel,
    subject: Option<&str>,
    body: &str,
    variables: Vec<TemplateVariable>,
) -> NotificationTemplate {
    let now = Utc::now();
    NotificationTemplate {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        channel,
        subject: subject.map(str::to_string),
        body: body.to_string(),
        variables,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

/// The built-in template set.
pub fn builtin_templates() -> Vec<NotificationTemplate> {
    vec![
        template(
            "order-confirm-email",
            "Order Confirmation Email",
            TemplateKind::OrderConfirmation,
            Channel::Email,
            Some("Order Confirmation - {{orderId}}"),
            "Hi {{customerName}},\n\n\
             Thank you for your order! Your order {{orderId}} from {{orderDate}} \
             is confirmed.\n\nTotal: {{totalAmount}}\nTrack it here: {{trackingUrl}}\n\n\
             Thanks for shopping with us!",
            vec![
                TemplateVariable::required("customerName", "Customer full name"),
                TemplateVariable::required("orderId", "Order ID"),
                TemplateVariable::required("orderDate", "Order date"),
                TemplateVariable::required("totalAmount", "Total order amount"),
                TemplateVariable::required("trackingUrl", "Order tracking URL"),
            ],
        ),
        template(
            "order-confirm-sms",
            "Order Confirmation SMS",
            TemplateKind::OrderConfirmation,
            Channel::Sms,
            None,
            "Hi {{customerName}}! Your order {{orderId}} is confirmed. \
             Total: {{totalAmount}}. Track it: {{trackingUrl}}",
            vec![
                TemplateVariable::required("customerName", "Customer full name"),
                TemplateVariable::required("orderId", "Order ID"),
                TemplateVariable::required("totalAmount", "Total order amount"),
                TemplateVariable::required("trackingUrl", "Order tracking URL"),
            ],
        ),
        template(
            "order-confirm-whatsapp",
            "Order Confirmation WhatsApp",
            TemplateKind::OrderConfirmation,
            Channel::Whatsapp,
            None,
            "*Order Confirmed!*\n\nHi {{customerName}},\n\n\
             Order ID: {{orderId}}\nDate: {{orderDate}}\nTotal: {{totalAmount}}\n\n\
             Track your order: {{trackingUrl}}",
            vec![
                TemplateVariable::required("customerName", "Customer full name"),
                TemplateVariable::required("orderId", "Order ID"),
                TemplateVariable::required("orderDate", "Order date"),
                TemplateVariable::required("totalAmount", "Total order amount"),
                TemplateVariable::required("trackingUrl", "Order tracking URL"),
            ],
        ),
        template(
            "delivery-update-email",
            "Delivery Update Email",
            TemplateKind::DeliveryUpdate,
            Channel::Email,
            Some("Your Order {{orderId}} is {{deliveryStatus}}"),
            "Hi {{customerName}},\n\n\
             Your order {{orderId}} is currently: {{deliveryStatus}}\n\
             {{deliveryMessage}}\n\
             Estimated delivery: {{estimatedDelivery}}\n\
             Track your package: {{trackingUrl}}",
            vec![
                TemplateVariable::required("customerName", "Customer full name"),
                TemplateVariable::required("orderId", "Order ID"),
                TemplateVariable::required("deliveryStatus", "Current delivery status"),
                TemplateVariable::optional("deliveryMessage", "Additional delivery message", Some("")),
                TemplateVariable::required("estimatedDelivery", "Estimated delivery date"),
                TemplateVariable::required("trackingUrl", "Tracking URL"),
            ],
        ),
        template(
            "promo-sms",
            "Promo SMS",
            TemplateKind::Promo,
            Channel::Sms,
            None,
            "{{promoTitle}}! Use {{discountCode}} to save {{discountAmount}}. \
             Shop: {{shopUrl}} Expires: {{expiryDate}}",
            vec![
                TemplateVariable::required("promoTitle", "Promotion title"),
                TemplateVariable::required("discountCode", "Discount code"),
                TemplateVariable::required("discountAmount", "Discount amount or percentage"),
                TemplateVariable::required("shopUrl", "Shop URL"),
                TemplateVariable::required("expiryDate", "Offer expiry date"),
            ],
        ),
        template(
            "password-reset-email",
            "Password Reset Email",
            TemplateKind::PasswordReset,
            Channel::Email,
            Some("Reset Your Password"),
            "Hi {{customerName}},\n\n\
             We received a request to reset your password. Use the link below \
             to choose a new one:\n\n{{resetUrl}}\n\n\
             This link expires in {{expiryMinutes}} minutes. If you didn't \
             request this, you can ignore this email.",
            vec![
                TemplateVariable::required("customerName", "Customer full name"),
                TemplateVariable::required("resetUrl", "Password reset URL"),
                TemplateVariable::required("expiryMinutes", "Link expiry time in minutes"),
            ],
        ),
    ]
}
