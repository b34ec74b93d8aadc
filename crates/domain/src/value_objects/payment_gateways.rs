use anyhow::{Result, bail};

use crate::entities::payment_gateways::PaymentGatewayEntity;

/// Resolves the single active gateway from the enabled rows. Zero or more
/// than one active gateway is a configuration error; the resolved gateway is
/// passed onward by parameter, never cached.
pub fn resolve_active_gateway(
    gateways: Vec<PaymentGatewayEntity>,
) -> Result<PaymentGatewayEntity> {
    let mut active = gateways.into_iter().filter(|g| g.is_active);

    let Some(gateway) = active.next() else {
        bail!("no active payment gateway is configured");
    };

    if let Some(extra) = active.next() {
        bail!(
            "multiple payment gateways are active: {} and {}",
            gateway.slug,
            extra.slug
        );
    }

    Ok(gateway)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn gateway(slug: &str, is_active: bool) -> PaymentGatewayEntity {
        PaymentGatewayEntity {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: slug.to_string(),
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn resolves_the_single_active_gateway() {
        let resolved = resolve_active_gateway(vec![
            gateway("stripe", false),
            gateway("paypal", true),
        ])
        .unwrap();
        assert_eq!(resolved.slug, "paypal");
    }

    #[test]
    fn fails_when_no_gateway_is_active() {
        assert!(resolve_active_gateway(vec![gateway("stripe", false)]).is_err());
        assert!(resolve_active_gateway(Vec::new()).is_err());
    }

    #[test]
    fn fails_when_multiple_gateways_are_active() {
        let result =
            resolve_active_gateway(vec![gateway("stripe", true), gateway("paypal", true)]);
        assert!(result.is_err());
    }
}
