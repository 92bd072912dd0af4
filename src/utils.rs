use crate::models::job::NotificationJob;

/// Renders the customer-facing text for a job. Used as the body of the
/// `text` strategy and for manual-contact fallback links.
pub fn compose_message(job: &NotificationJob) -> String {
    let payload = &job.payload;
    let mut lines: Vec<String> = Vec::new();

    match job.kind.as_str() {
        "order_created" => {
            lines.push(format!(
                "Hi {}! We received your order #{} at {}.",
                payload.customer_name, job.order_id, payload.store_name
            ));
        }
        "status_changed" => {
            let status = payload.new_status.as_deref().unwrap_or("updated");
            lines.push(match status {
                "confirmed" => format!(
                    "Hi {}! Your order #{} at {} has been confirmed.",
                    payload.customer_name, job.order_id, payload.store_name
                ),
                "preparing" => format!(
                    "Hi {}! Your order #{} is being prepared.",
                    payload.customer_name, job.order_id
                ),
                "ready" => format!(
                    "Hi {}! Your order #{} is ready.",
                    payload.customer_name, job.order_id
                ),
                "out_for_delivery" => format!(
                    "Hi {}! Your order #{} is on its way.",
                    payload.customer_name, job.order_id
                ),
                "delivered" => format!(
                    "Hi {}! Your order #{} has been delivered. Enjoy!",
                    payload.customer_name, job.order_id
                ),
                "cancelled" => format!(
                    "Hi {}, your order #{} at {} has been cancelled.",
                    payload.customer_name, job.order_id, payload.store_name
                ),
                other => format!(
                    "Hi {}! Your order #{} is now {}.",
                    payload.customer_name, job.order_id, other
                ),
            });
        }
        _ => {
            lines.push(format!(
                "Hi {}! There is an update on your order #{} at {}.",
                payload.customer_name, job.order_id, payload.store_name
            ));
        }
    }

    if let Some(eta) = payload.eta_minutes {
        lines.push(format!("Estimated time: {} minutes.", eta));
    }

    match payload.delivery_type.as_deref() {
        Some("delivery") => {
            if let Some(address) = payload.delivery_address.as_deref() {
                lines.push(format!("Delivery address: {}.", address));
            }
        }
        Some("pickup") => {
            lines.push(format!("Pickup at {}.", payload.store_name));
        }
        _ => {}
    }

    lines.join(" ")
}
