use crate::{
    entities::{
        local_id_of, CustomerSnapshot, LocalId, RemoteId, RemoteLink, Subscription, Transaction,
        TransactionDiscount, TransactionInstrument, TransactionStatusEntry,
    },
    helpers::name,
    mappers::address,
    remote::RemoteTransaction,
};

/// Maps the snake_case instrument discriminator onto a transaction instrument. A missing detail sub-object yields a
/// variant with empty fields; an unrecognised discriminator degrades to `Unknown`.
fn instrument_from_remote(remote: &RemoteTransaction) -> TransactionInstrument {
    match remote.payment_instrument_type.as_deref() {
        Some("credit_card") => {
            let card = remote.credit_card.clone().unwrap_or_default();
            // some processor responses carry only bin and last4
            let masked_number = card.masked_number.or(match (&card.bin, &card.last4) {
                (Some(bin), Some(last4)) => Some(format!("{bin}******{last4}")),
                _ => None,
            });
            TransactionInstrument::CreditCard {
                masked_number,
                country_of_issuance: card.country_of_issuance,
                issuing_bank: card.issuing_bank,
                card_type: card.card_type,
                cardholder_name: card.cardholder_name,
                expiration_month: card.expiration_month,
                expiration_year: card.expiration_year,
            }
        },
        Some("paypal_account") => {
            let paypal = remote.paypal_account.clone().unwrap_or_default();
            let full = name::full(
                paypal.payer_first_name.as_deref().unwrap_or(""),
                paypal.payer_last_name.as_deref().unwrap_or(""),
            );
            TransactionInstrument::PayPalAccount {
                name: if full.is_empty() { None } else { Some(full) },
                payer_id: paypal.payer_id,
                email: paypal.payer_email,
            }
        },
        Some("apple_pay_card") => {
            let card = remote.apple_pay_card.clone().unwrap_or_default();
            TransactionInstrument::ApplePayCard {
                card_type: card.card_type,
                payment_instrument_name: card.payment_instrument_name,
                expiration_month: card.expiration_month,
                expiration_year: card.expiration_year,
            }
        },
        Some("android_pay_card") => {
            let card = remote.android_pay_card.clone().unwrap_or_default();
            TransactionInstrument::AndroidPayCard {
                source_card_last4: card.source_card_last4,
                virtual_card_last4: card.virtual_card_last4,
                source_card_type: card.source_card_type,
                virtual_card_type: card.virtual_card_type,
                expiration_month: card.expiration_month,
                expiration_year: card.expiration_year,
            }
        },
        _ => TransactionInstrument::Unknown,
    }
}

/// Builds a local transaction from a remote one. Transactions only ever travel inbound, so there is no payload
/// counterpart; the local id is the remote transaction id, which makes load merges idempotent.
pub fn from_remote(subscriptions: &[Subscription], remote: &RemoteTransaction) -> Transaction {
    let mut tx = Transaction::new(LocalId::from(remote.id.clone()), remote.amount.unwrap_or_default());
    tx.remote = RemoteLink::saved(remote.id.clone());
    tx.instrument = instrument_from_remote(remote);
    tx.currency = remote.currency_iso_code.clone();
    tx.status = remote.status.clone();
    tx.refunded_transaction_id = remote.refunded_transaction_id.clone().map(RemoteId::from);
    tx.subscription_id = local_id_of(subscriptions, remote.subscription_id.as_deref());
    tx.plan_remote_id = remote.plan_id.clone().map(RemoteId::from);
    tx.billing = remote.billing.as_ref().map(address::from_remote);
    tx.customer = remote.customer.as_ref().map(|c| CustomerSnapshot {
        name: name::full(c.first_name.as_deref().unwrap_or(""), c.last_name.as_deref().unwrap_or("")),
        phone: c.phone.clone(),
        company: c.company.clone(),
        email: c.email.clone(),
    });
    tx.descriptor = remote.descriptor.clone();
    tx.status_history = remote
        .status_history
        .iter()
        .map(|e| TransactionStatusEntry { timestamp: e.timestamp, status: e.status.clone() })
        .collect();
    tx.discounts = remote
        .discounts
        .iter()
        .map(|d| TransactionDiscount { name: d.name.clone(), amount: d.amount })
        .collect();
    tx.created_at = remote.created_at;
    tx.updated_at = remote.updated_at;
    tx
}

#[cfg(test)]
mod test {
    use bsync_common::Money;

    use super::*;
    use crate::remote::{RemoteCardDetails, RemoteCustomerSnapshot, RemotePayPalDetails};

    #[test]
    fn masked_number_falls_back_to_bin_and_last4() {
        let remote = RemoteTransaction {
            id: "tx-1".to_string(),
            amount: Some(Money::from_cents(1341)),
            payment_instrument_type: Some("credit_card".to_string()),
            credit_card: Some(RemoteCardDetails {
                bin: Some("401288".to_string()),
                last4: Some("1881".to_string()),
                ..RemoteCardDetails::default()
            }),
            ..RemoteTransaction::default()
        };
        let tx = from_remote(&[], &remote);
        match tx.instrument {
            TransactionInstrument::CreditCard { masked_number, .. } => {
                assert_eq!(masked_number.as_deref(), Some("401288******1881"));
            },
            other => panic!("expected a credit card, got {}", other.kind()),
        }
    }

    #[test]
    fn explicit_masked_number_wins_over_fallback() {
        let remote = RemoteTransaction {
            id: "tx-1".to_string(),
            payment_instrument_type: Some("credit_card".to_string()),
            credit_card: Some(RemoteCardDetails {
                masked_number: Some("4111********1111".to_string()),
                bin: Some("401288".to_string()),
                last4: Some("1881".to_string()),
                ..RemoteCardDetails::default()
            }),
            ..RemoteTransaction::default()
        };
        let tx = from_remote(&[], &remote);
        match tx.instrument {
            TransactionInstrument::CreditCard { masked_number, .. } => {
                assert_eq!(masked_number.as_deref(), Some("4111********1111"));
            },
            other => panic!("expected a credit card, got {}", other.kind()),
        }
    }

    #[test]
    fn paypal_payer_name_is_joined() {
        let remote = RemoteTransaction {
            id: "tx-2".to_string(),
            payment_instrument_type: Some("paypal_account".to_string()),
            paypal_account: Some(RemotePayPalDetails {
                payer_first_name: Some("Pesho".to_string()),
                payer_last_name: Some("Peshev".to_string()),
                payer_id: Some("payer-1".to_string()),
                payer_email: Some("pesho@example.com".to_string()),
            }),
            ..RemoteTransaction::default()
        };
        let tx = from_remote(&[], &remote);
        match tx.instrument {
            TransactionInstrument::PayPalAccount { name, payer_id, email } => {
                assert_eq!(name.as_deref(), Some("Pesho Peshev"));
                assert_eq!(payer_id.as_deref(), Some("payer-1"));
                assert_eq!(email.as_deref(), Some("pesho@example.com"));
            },
            other => panic!("expected a paypal account, got {}", other.kind()),
        }
    }

    #[test]
    fn unknown_instrument_keeps_base_fields() {
        let remote = RemoteTransaction {
            id: "tx-3".to_string(),
            amount: Some(Money::from_cents(350)),
            status: Some("settled".to_string()),
            payment_instrument_type: Some("venmo_account".to_string()),
            customer: Some(RemoteCustomerSnapshot {
                first_name: Some("Pesho".to_string()),
                last_name: Some("Peshev".to_string()),
                ..RemoteCustomerSnapshot::default()
            }),
            ..RemoteTransaction::default()
        };
        let tx = from_remote(&[], &remote);
        assert_eq!(tx.instrument, TransactionInstrument::Unknown);
        assert_eq!(tx.amount, Money::from_cents(350));
        assert_eq!(tx.status.as_deref(), Some("settled"));
        assert_eq!(tx.customer.unwrap().name, "Pesho Peshev");
    }

    #[test]
    fn subscription_reference_resolves_locally() {
        let mut subscription = Subscription::empty();
        subscription.remote = RemoteLink::saved("sub-1");
        let remote = RemoteTransaction {
            id: "tx-4".to_string(),
            subscription_id: Some("sub-1".to_string()),
            ..RemoteTransaction::default()
        };
        let tx = from_remote(&[subscription.clone()], &remote);
        assert_eq!(tx.subscription_id, Some(subscription.local_id));
        assert_eq!(tx.local_id.as_str(), "tx-4");
        assert!(tx.remote.is_saved());
    }
}
