use crate::{
    entities::{
        local_id_of, remote_id_of, Customer, Discount, PaymentMethod, RemoteLink, StatusEntry, Subscription,
        SubscriptionStatus,
    },
    mappers::nonempty_opt,
    remote::{
        DiscountAddEntry, DiscountUpdateEntry, DiscountsPayload, RemoteDiscount, RemoteSubscription,
        SubscriptionPayload,
    },
    traits::SyncError,
};

/// Diffs the local discounts against their pre-modification state into the three remote-bound buckets.
///
/// A discount that has already been saved remotely goes into `update`; one without a remote id is `add`ed; and any
/// previously saved discount whose kind no longer appears locally is `remove`d. The remote matches discounts by the
/// kind discriminator, which doubles as the inherited-from discount id on its side.
pub fn discounts_payload(original: &[Discount], current: &[Discount]) -> DiscountsPayload {
    let update = current
        .iter()
        .filter(|d| d.remote.id.is_some())
        .map(|d| DiscountUpdateEntry {
            existing_id: d.kind.as_str().to_string(),
            amount: d.amount,
            number_of_billing_cycles: d.number_of_billing_cycles,
        })
        .collect();
    let add = current
        .iter()
        .filter(|d| d.remote.id.is_none())
        .map(|d| DiscountAddEntry {
            inherited_from_id: d.kind.as_str().to_string(),
            amount: d.amount,
            number_of_billing_cycles: d.number_of_billing_cycles,
        })
        .collect();
    let remove = original
        .iter()
        .filter(|o| o.remote.id.is_some() && !current.iter().any(|d| d.kind == o.kind))
        .filter_map(|o| o.remote.id.as_ref().map(|id| id.0.clone()))
        .collect();
    DiscountsPayload { update, add, remove }
}

/// Builds the outbound subscription payload. Fails when the subscription has no plan attached, since the remote
/// cannot create a subscription without one.
pub fn payload(
    customer: &Customer,
    original_discounts: &[Discount],
    subscription: &Subscription,
) -> Result<SubscriptionPayload, SyncError> {
    let plan =
        subscription.plan.as_ref().ok_or_else(|| SyncError::MissingPlan(subscription.local_id.clone()))?;
    let discounts = discounts_payload(original_discounts, &subscription.discounts);
    Ok(SubscriptionPayload {
        plan_id: Some(plan.remote_id.0.clone()),
        payment_method_token: remote_id_of(&customer.payment_methods, subscription.payment_method_id.as_ref())
            .map(|id| id.0),
        trial_period: subscription.is_trial.then_some(true),
        trial_duration: subscription.trial_duration,
        trial_duration_unit: nonempty_opt(&subscription.trial_duration_unit),
        descriptor: subscription.descriptor.clone(),
        discounts: if discounts.is_empty() { None } else { Some(discounts) },
        first_billing_date: subscription.first_billing_date,
    })
}

/// Reconciles the remote discount list against the local one. A remote discount matching a local one (by remote id,
/// or by kind when the local one was never saved) keeps the local entry with its metadata; anything unmatched becomes
/// a fresh fixed-amount discount. Either way the entry comes back `Saved` with the remote's current cycle counter.
pub fn fold_discounts(original: &[Discount], remote: &[RemoteDiscount]) -> Vec<Discount> {
    remote
        .iter()
        .map(|rd| {
            let matched = original.iter().find(|o| {
                o.remote.id.as_ref().map(|id| id.as_str() == rd.id).unwrap_or(false) || o.kind.as_str() == rd.id
            });
            let mut discount = match matched {
                Some(original) => original.clone(),
                None => {
                    let mut fresh =
                        Discount::amount(rd.amount.unwrap_or_default(), rd.number_of_billing_cycles);
                    fresh.name = rd.name.clone();
                    fresh
                },
            };
            discount.remote = RemoteLink::saved(rd.id.clone());
            discount.current_billing_cycle = rd.current_billing_cycle;
            discount
        })
        .collect()
}

/// Folds a remote subscription into the local entity. The plan is left alone: the caller owns plan resolution. The
/// status history is rebuilt from the remote log, deduplicated on (timestamp, status).
pub fn apply_remote(
    payment_methods: &[PaymentMethod],
    original_discounts: &[Discount],
    subscription: &mut Subscription,
    remote: &RemoteSubscription,
) {
    subscription.remote = RemoteLink::saved(remote.id.clone());
    if let Some(status) = &remote.status {
        subscription.status = SubscriptionStatus::from(status.clone());
    }
    let mut history: Vec<StatusEntry> = Vec::new();
    for entry in &remote.status_history {
        if let Some(status) = &entry.status {
            let entry = StatusEntry { timestamp: entry.timestamp, status: SubscriptionStatus::from(status.clone()) };
            if !history.contains(&entry) {
                history.push(entry);
            }
        }
    }
    subscription.status_history = history;
    subscription.discounts = fold_discounts(original_discounts, &remote.discounts);
    subscription.is_trial = remote.trial_period;
    if remote.price.is_some() {
        subscription.price = remote.price;
    }
    if remote.descriptor.is_some() {
        subscription.descriptor = remote.descriptor.clone();
    }
    if remote.trial_duration.is_some() {
        subscription.trial_duration = remote.trial_duration;
    }
    if remote.trial_duration_unit.is_some() {
        subscription.trial_duration_unit = remote.trial_duration_unit.clone();
    }
    if let Some(local) = local_id_of(payment_methods, remote.payment_method_token.as_deref()) {
        subscription.payment_method_id = Some(local);
    }
    if remote.first_billing_date.is_some() {
        subscription.first_billing_date = remote.first_billing_date;
    }
    if remote.next_billing_date.is_some() {
        subscription.next_billing_date = remote.next_billing_date;
    }
    if remote.paid_through_date.is_some() {
        subscription.paid_through_date = remote.paid_through_date;
    }
    if remote.billing_period_start_date.is_some() {
        subscription.billing_period_start_date = remote.billing_period_start_date;
    }
    if remote.billing_period_end_date.is_some() {
        subscription.billing_period_end_date = remote.billing_period_end_date;
    }
    if remote.billing_day_of_month.is_some() {
        subscription.billing_day_of_month = remote.billing_day_of_month;
    }
    if remote.current_billing_cycle.is_some() {
        subscription.current_billing_cycle = remote.current_billing_cycle;
    }
    if remote.failure_count.is_some() {
        subscription.failure_count = remote.failure_count;
    }
    if remote.days_past_due.is_some() {
        subscription.days_past_due = remote.days_past_due;
    }
    if remote.created_at.is_some() {
        subscription.created_at = remote.created_at;
    }
    if remote.updated_at.is_some() {
        subscription.updated_at = remote.updated_at;
    }
}

/// Builds a brand-new local subscription, already `Saved`, from a remote one. The caller attaches the plan.
pub fn from_remote(payment_methods: &[PaymentMethod], remote: &RemoteSubscription) -> Subscription {
    let mut subscription = Subscription::empty();
    apply_remote(payment_methods, &[], &mut subscription, remote);
    subscription
}

#[cfg(test)]
mod test {
    use bsync_common::Money;

    use super::*;
    use crate::entities::{DiscountKind, Plan, RemoteId, SyncStatus};

    fn plan() -> Plan {
        Plan { remote_id: RemoteId::from("monthly"), price: Money::from_cents(1498), ..Plan::default() }
    }

    #[test]
    fn new_discounts_go_into_the_add_bucket() {
        let coupon = Discount::coupon(20, plan().price, Some(3));
        let out = discounts_payload(&[], &[coupon]);
        assert!(out.update.is_empty());
        assert!(out.remove.is_empty());
        assert_eq!(out.add.len(), 1);
        assert_eq!(out.add[0].inherited_from_id, "DiscountCoupon");
        assert_eq!(out.add[0].amount, Money::from_cents(299));
        assert_eq!(out.add[0].number_of_billing_cycles, Some(3));
    }

    #[test]
    fn saved_discounts_are_updated_and_dropped_kinds_removed() {
        let mut saved_coupon = Discount::coupon(20, plan().price, None);
        saved_coupon.remote = RemoteLink::saved("DiscountCoupon");
        let mut saved_amount = Discount::amount(Money::from_cents(100), None);
        saved_amount.remote = RemoteLink::saved("DiscountAmount");

        let original = vec![saved_coupon.clone(), saved_amount];
        let current = vec![saved_coupon];
        let out = discounts_payload(&original, &current);
        assert_eq!(out.update.len(), 1);
        assert_eq!(out.update[0].existing_id, "DiscountCoupon");
        assert!(out.add.is_empty());
        assert_eq!(out.remove, vec!["DiscountAmount".to_string()]);
    }

    #[test]
    fn payload_requires_a_plan() {
        let customer = Customer::new("Pesho Peshev");
        let subscription = Subscription::empty();
        let err = payload(&customer, &[], &subscription).unwrap_err();
        assert!(matches!(err, SyncError::MissingPlan(_)));
    }

    #[test]
    fn payload_resolves_payment_method_token() {
        let mut customer = Customer::new("Pesho Peshev");
        let mut pm = PaymentMethod::new(crate::entities::Instrument::Unknown);
        pm.remote = RemoteLink::saved("tok-1");
        let subscription = Subscription::new(plan(), pm.local_id.clone());
        customer.payment_methods.push(pm);

        let out = payload(&customer, &[], &subscription).unwrap();
        assert_eq!(out.plan_id.as_deref(), Some("monthly"));
        assert_eq!(out.payment_method_token.as_deref(), Some("tok-1"));
        // not a trial, so the flag stays off the wire
        assert_eq!(out.trial_period, None);
        assert_eq!(out.discounts, None);
    }

    #[test]
    fn fold_keeps_matched_local_discount_metadata() {
        let mut coupon = Discount::coupon(20, plan().price, Some(3));
        coupon.name = Some("LAUNCH20".to_string());
        let remote = vec![RemoteDiscount {
            id: "DiscountCoupon".to_string(),
            amount: Some(Money::from_cents(299)),
            current_billing_cycle: Some(2),
            ..RemoteDiscount::default()
        }];
        let folded = fold_discounts(&[coupon.clone()], &remote);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].local_id, coupon.local_id);
        assert_eq!(folded[0].name.as_deref(), Some("LAUNCH20"));
        assert_eq!(folded[0].current_billing_cycle, Some(2));
        assert!(folded[0].remote.is_saved());
    }

    #[test]
    fn fold_creates_amount_discounts_for_unmatched_remotes() {
        let remote = vec![RemoteDiscount {
            id: "promo-xyz".to_string(),
            name: Some("Winback".to_string()),
            amount: Some(Money::from_cents(500)),
            number_of_billing_cycles: Some(1),
            ..RemoteDiscount::default()
        }];
        let folded = fold_discounts(&[], &remote);
        assert_eq!(folded[0].kind, DiscountKind::Amount);
        assert_eq!(folded[0].amount, Money::from_cents(500));
        assert_eq!(folded[0].name.as_deref(), Some("Winback"));
    }

    #[test]
    fn status_history_is_deduplicated() {
        use crate::remote::RemoteStatusEntry;
        let remote = RemoteSubscription {
            id: "sub-1".to_string(),
            status: Some("Active".to_string()),
            status_history: vec![
                RemoteStatusEntry { timestamp: None, status: Some("Active".to_string()) },
                RemoteStatusEntry { timestamp: None, status: Some("Active".to_string()) },
                RemoteStatusEntry { timestamp: None, status: Some("Past Due".to_string()) },
            ],
            ..RemoteSubscription::default()
        };
        let subscription = from_remote(&[], &remote);
        assert_eq!(subscription.remote.status, SyncStatus::Saved);
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(subscription.status_history.len(), 2);
    }
}
