//! Pure ranking and distribution aggregation.
//!
//! Every function here is a stateless projection of the rows it is handed:
//! nothing is cached, so a count produced here always equals a direct count
//! over the same filtered rows at the store.
//!
//! Ordering is deterministic regardless of row fetch order: accumulators are
//! collected through a `BTreeMap` (key ascending) and then stably sorted by
//! total descending, so equal totals keep the smaller key first.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::event::{Business, InteractionKind, PaymentMethod};

/// Per-business interaction counters, one per [`InteractionKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractionTally {
    pub views: i64,
    pub calls: i64,
    pub whatsapps: i64,
    pub shares: i64,
}

impl InteractionTally {
    pub fn record(&mut self, kind: InteractionKind) {
        match kind {
            InteractionKind::View => self.views += 1,
            InteractionKind::Call => self.calls += 1,
            InteractionKind::Whatsapp => self.whatsapps += 1,
            InteractionKind::Share => self.shares += 1,
        }
    }

    pub fn total(&self) -> i64 {
        self.views + self.calls + self.whatsapps + self.shares
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BusinessRank {
    pub business_id: String,
    pub name: String,
    #[serde(flatten)]
    pub tally: InteractionTally,
    pub total: i64,
}

/// Top-K businesses by total interactions, ties broken by business id
/// ascending. `names` is the id → display-name map fetched once from the
/// listings table, so the whole pass is O(events + listings); ids without a
/// listing fall back to the raw id.
pub fn rank_businesses(
    rows: &[(String, InteractionKind)],
    names: &HashMap<String, String>,
    k: usize,
) -> Vec<BusinessRank> {
    let mut tallies: BTreeMap<&str, InteractionTally> = BTreeMap::new();
    for (business_id, kind) in rows {
        tallies.entry(business_id.as_str()).or_default().record(*kind);
    }

    let mut ranked: Vec<BusinessRank> = tallies
        .into_iter()
        .map(|(business_id, tally)| BusinessRank {
            business_id: business_id.to_string(),
            name: names
                .get(business_id)
                .cloned()
                .unwrap_or_else(|| business_id.to_string()),
            tally,
            total: tally.total(),
        })
        .collect();

    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked.truncate(k);
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRank {
    pub query: String,
    pub count: i64,
}

fn top_counts<'a>(keys: impl Iterator<Item = &'a str>, k: usize) -> Vec<QueryRank> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut ranked: Vec<QueryRank> = counts
        .into_iter()
        .map(|(query, count)| QueryRank {
            query: query.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(k);
    ranked
}

/// Most frequent search queries, exact case-sensitive keys as stored.
pub fn rank_queries(rows: &[(String, bool)], k: usize) -> Vec<QueryRank> {
    top_counts(rows.iter().map(|(q, _)| q.as_str()), k)
}

/// Most frequent *failed* search queries (`succeeded = false` rows only).
pub fn rank_failed_queries(rows: &[(String, bool)], k: usize) -> Vec<QueryRank> {
    top_counts(
        rows.iter()
            .filter(|(_, succeeded)| !succeeded)
            .map(|(q, _)| q.as_str()),
        k,
    )
}

/// Rounded success percentage; exactly 0 for zero total, never a
/// division-by-zero fault.
pub fn success_rate(successful: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((successful as f64 / total as f64) * 100.0).round() as i64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub key: String,
    pub label: String,
    pub count: i64,
    pub pct: f64,
}

fn pct_of(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Listings per category, resolved to category names, ordered count
/// descending then key ascending. Listings without a category land in the
/// "uncategorized" slice.
pub fn category_distribution(
    businesses: &[Business],
    categories: &HashMap<String, String>,
) -> Vec<DistributionSlice> {
    let total = businesses.len() as i64;
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for business in businesses {
        let key = business.category_id.as_deref().unwrap_or("uncategorized");
        *counts.entry(key).or_default() += 1;
    }

    let mut slices: Vec<DistributionSlice> = counts
        .into_iter()
        .map(|(key, count)| DistributionSlice {
            key: key.to_string(),
            label: categories.get(key).cloned().unwrap_or_else(|| key.to_string()),
            count,
            pct: pct_of(count, total),
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count));
    slices
}

/// Listings per payment method. Fan-out semantics: a listing advertising
/// both Cash and UPI increments both counters, so slice counts may sum to
/// more than the listing total. Every enumerated method is present, zero or
/// not, in fixed enum order.
pub fn payment_distribution(businesses: &[Business]) -> Vec<DistributionSlice> {
    let total = businesses.len() as i64;
    let mut counts: HashMap<PaymentMethod, i64> = HashMap::new();
    for business in businesses {
        for method in &business.payment_methods {
            *counts.entry(*method).or_default() += 1;
        }
    }

    PaymentMethod::ALL
        .iter()
        .map(|method| {
            let count = counts.get(method).copied().unwrap_or(0);
            DistributionSlice {
                key: method.as_str().to_string(),
                label: method.label().to_string(),
                count,
                pct: pct_of(count, total),
            }
        })
        .collect()
}

/// Binary delivery partition. `available + unavailable == total` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliverySplit {
    pub available: i64,
    pub unavailable: i64,
    pub total: i64,
}

impl DeliverySplit {
    pub fn empty() -> Self {
        Self {
            available: 0,
            unavailable: 0,
            total: 0,
        }
    }
}

pub fn delivery_split(businesses: &[Business]) -> DeliverySplit {
    let available = businesses.iter().filter(|b| b.delivery_available).count() as i64;
    DeliverySplit {
        available,
        unavailable: businesses.len() as i64 - available,
        total: businesses.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biz(id: &str, category: Option<&str>, methods: &[PaymentMethod], delivery: bool) -> Business {
        Business {
            id: id.to_string(),
            name: format!("Shop {id}"),
            category_id: category.map(str::to_string),
            payment_methods: methods.to_vec(),
            delivery_available: delivery,
        }
    }

    #[test]
    fn rank_businesses_breaks_ties_by_id_ascending() {
        // b1 and b2 tie at 10 interactions each; b3 trails with 5.
        let mut rows = Vec::new();
        for _ in 0..10 {
            rows.push(("b2".to_string(), InteractionKind::View));
        }
        for _ in 0..10 {
            rows.push(("b1".to_string(), InteractionKind::Call));
        }
        for _ in 0..5 {
            rows.push(("b3".to_string(), InteractionKind::Share));
        }

        let ranked = rank_businesses(&rows, &HashMap::new(), 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].business_id, "b1");
        assert_eq!(ranked[1].business_id, "b2");
        assert_eq!(ranked[0].total, 10);
    }

    #[test]
    fn rank_businesses_counts_per_kind_and_resolves_names() {
        let rows = vec![
            ("b1".to_string(), InteractionKind::View),
            ("b1".to_string(), InteractionKind::View),
            ("b1".to_string(), InteractionKind::Whatsapp),
        ];
        let names = HashMap::from([("b1".to_string(), "Corner Cafe".to_string())]);
        let ranked = rank_businesses(&rows, &names, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Corner Cafe");
        assert_eq!(ranked[0].tally.views, 2);
        assert_eq!(ranked[0].tally.whatsapps, 1);
        assert_eq!(ranked[0].tally.calls, 0);
        assert_eq!(ranked[0].total, 3);
    }

    #[test]
    fn rank_businesses_is_independent_of_row_order() {
        let mut rows = vec![
            ("b2".to_string(), InteractionKind::View),
            ("b1".to_string(), InteractionKind::View),
        ];
        let forward = rank_businesses(&rows, &HashMap::new(), 10);
        rows.reverse();
        let backward = rank_businesses(&rows, &HashMap::new(), 10);
        let ids = |r: &[BusinessRank]| r.iter().map(|b| b.business_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&forward), ids(&backward));
    }

    #[test]
    fn query_ranking_is_case_sensitive_and_truncated() {
        let rows = vec![
            ("pizza".to_string(), true),
            ("Pizza".to_string(), true),
            ("pizza".to_string(), false),
            ("chai".to_string(), true),
        ];
        let popular = rank_queries(&rows, 2);
        assert_eq!(popular[0], QueryRank { query: "pizza".into(), count: 2 });
        assert_eq!(popular.len(), 2);

        let failed = rank_failed_queries(&rows, 10);
        assert_eq!(failed, vec![QueryRank { query: "pizza".into(), count: 1 }]);
    }

    #[test]
    fn success_rate_is_bounded_and_zero_safe() {
        assert_eq!(success_rate(0, 0), 0);
        assert_eq!(success_rate(1, 3), 33);
        assert_eq!(success_rate(2, 3), 67);
        assert_eq!(success_rate(5, 5), 100);
        for (s, t) in [(0, 0), (0, 7), (7, 7), (3, 9)] {
            let rate = success_rate(s, t);
            assert!((0..=100).contains(&rate));
        }
    }

    #[test]
    fn payment_distribution_fans_out_multi_method_listings() {
        let businesses = vec![
            biz("b1", None, &[PaymentMethod::Cash, PaymentMethod::Upi], false),
            biz("b2", None, &[PaymentMethod::Cash], true),
        ];
        let slices = payment_distribution(&businesses);
        assert_eq!(slices.len(), PaymentMethod::ALL.len());
        let by_key = |k: &str| slices.iter().find(|s| s.key == k).map(|s| s.count);
        assert_eq!(by_key("cash"), Some(2));
        assert_eq!(by_key("upi"), Some(1));
        assert_eq!(by_key("card"), Some(0));
        // Fan-out: counts sum past the listing total.
        assert_eq!(slices.iter().map(|s| s.count).sum::<i64>(), 3);
    }

    #[test]
    fn delivery_split_partitions_exactly() {
        let businesses = vec![
            biz("b1", None, &[], true),
            biz("b2", None, &[], false),
            biz("b3", None, &[], false),
        ];
        let split = delivery_split(&businesses);
        assert_eq!(split.available + split.unavailable, split.total);
        assert_eq!(split.available, 1);
        assert_eq!(split.total, 3);

        let empty = delivery_split(&[]);
        assert_eq!(empty.available + empty.unavailable, empty.total);
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn category_distribution_resolves_names_and_sums_to_total() {
        let businesses = vec![
            biz("b1", Some("cat_food"), &[], false),
            biz("b2", Some("cat_food"), &[], false),
            biz("b3", None, &[], false),
        ];
        let categories = HashMap::from([("cat_food".to_string(), "Food".to_string())]);
        let slices = category_distribution(&businesses, &categories);
        assert_eq!(slices[0].label, "Food");
        assert_eq!(slices[0].count, 2);
        assert_eq!(slices.iter().map(|s| s.count).sum::<i64>(), 3);
    }
}
