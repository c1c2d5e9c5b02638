//! Aggregator service for monthly usage and subscription cost statistics

use crate::types::{
    CostSummary, Plan, PlanAssignment, PlanCatalog, ServiceRegistry, ServiceStat, UsageRecord,
};
use chrono::{DateTime, Utc};

/// Options for monthly stat computation
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsOptions {
    /// Drop services resolved to the free plan from the output entirely.
    pub paid_only: bool,
}

/// Aggregator for computing usage and cost statistics
pub struct Aggregator;

impl Aggregator {
    /// Compute per-service statistics for the calendar month containing
    /// `now`, one stat per usage record, in input order.
    ///
    /// The plan is resolved through `assignments` (missing assignment means
    /// free). With `paid_only`, free services are filtered out rather than
    /// emitted as placeholders. `cost_per_use` is the monthly price divided
    /// by the month's use count, rounded half away from zero to cents; a
    /// service with zero uses reports the flat monthly price instead.
    pub fn monthly_stats(
        usage: &[UsageRecord],
        assignments: &[PlanAssignment],
        catalog: &PlanCatalog,
        now: DateTime<Utc>,
        options: StatsOptions,
    ) -> Vec<ServiceStat> {
        usage
            .iter()
            .filter_map(|record| {
                let plan = resolve_plan(assignments, &record.service_name);
                if options.paid_only && !plan.is_paid() {
                    return None;
                }

                let monthly_count = record.count_in_month(now);
                let monthly_price = catalog.monthly_price(plan);
                let cost_per_use = if monthly_count > 0 {
                    round_to_cents(f64::from(monthly_price) / f64::from(monthly_count))
                } else {
                    // Zero uses: "cost per use" is defined as the flat price.
                    f64::from(monthly_price)
                };

                Some(ServiceStat {
                    service_name: record.service_name.clone(),
                    plan,
                    monthly_count,
                    monthly_price,
                    cost_per_use,
                })
            })
            .collect()
    }

    /// Compute total monthly spend and the paid subscription count.
    ///
    /// `total_monthly_cost` iterates the registry: every registered service
    /// contributes its resolved plan price exactly once, whether or not it
    /// has usage. `paid_service_count` iterates the assignments: a paid
    /// assignment counts even if its service is absent from the registry.
    pub fn cost_summary(
        registry: &ServiceRegistry,
        assignments: &[PlanAssignment],
        catalog: &PlanCatalog,
    ) -> CostSummary {
        let total_monthly_cost = registry
            .services()
            .iter()
            .map(|service| catalog.monthly_price(resolve_plan(assignments, &service.name)))
            .sum();

        let paid_service_count = assignments.iter().filter(|a| a.plan.is_paid()).count() as u32;

        CostSummary {
            total_monthly_cost,
            paid_service_count,
        }
    }
}

/// Resolve a service's plan from the assignment set (missing means free).
fn resolve_plan(assignments: &[PlanAssignment], service_name: &str) -> Plan {
    assignments
        .iter()
        .find(|a| a.service_name == service_name)
        .map(|a| a.plan)
        .unwrap_or_default()
}

/// Round half away from zero to two decimal places.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceDescriptor;
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
    }

    fn make_record(service: &str, dates: &[DateTime<Utc>]) -> UsageRecord {
        UsageRecord {
            service_name: service.to_string(),
            usage_dates: dates.to_vec(),
        }
    }

    fn assign(service: &str, plan: Plan) -> PlanAssignment {
        PlanAssignment {
            service_name: service.to_string(),
            plan,
        }
    }

    fn make_registry(names: &[&str]) -> ServiceRegistry {
        ServiceRegistry::new(
            names
                .iter()
                .map(|n| ServiceDescriptor::new(n, "https://example.com", "Test"))
                .collect(),
        )
    }

    // ========== monthly_stats() tests ==========

    #[test]
    fn test_monthly_stats_empty_usage() {
        let stats = Aggregator::monthly_stats(
            &[],
            &[],
            &PlanCatalog::default(),
            ts(2024, 3, 15, 12, 0, 0),
            StatsOptions::default(),
        );
        assert!(stats.is_empty());
    }

    #[test]
    fn test_monthly_stats_basic_scenario() {
        // 3 uses in the current month on basic ($9) => cost per use 3.00
        let now = ts(2024, 3, 20, 12, 0, 0);
        let usage = vec![make_record(
            "Claude",
            &[
                ts(2024, 3, 3, 10, 0, 0),
                ts(2024, 3, 15, 10, 0, 0),
                ts(2024, 3, 28, 10, 0, 0),
            ],
        )];
        let assignments = vec![assign("Claude", Plan::Basic)];

        let stats = Aggregator::monthly_stats(
            &usage,
            &assignments,
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].service_name, "Claude");
        assert_eq!(stats[0].plan, Plan::Basic);
        assert_eq!(stats[0].monthly_count, 3);
        assert_eq!(stats[0].monthly_price, 9);
        assert!((stats[0].cost_per_use - 3.00).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monthly_stats_zero_uses_reports_flat_price() {
        // No uses on pro ($19) => cost per use equals the monthly price
        let now = ts(2024, 3, 20, 12, 0, 0);
        let usage = vec![make_record("v0", &[])];
        let assignments = vec![assign("v0", Plan::Pro)];

        let stats = Aggregator::monthly_stats(
            &usage,
            &assignments,
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        assert_eq!(stats[0].monthly_count, 0);
        assert!((stats[0].cost_per_use - 19.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monthly_stats_zero_uses_free_plan() {
        let stats = Aggregator::monthly_stats(
            &[make_record("Felo", &[])],
            &[],
            &PlanCatalog::default(),
            ts(2024, 3, 20, 12, 0, 0),
            StatsOptions::default(),
        );

        assert_eq!(stats[0].plan, Plan::Free);
        assert_eq!(stats[0].monthly_price, 0);
        assert!((stats[0].cost_per_use - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monthly_stats_missing_assignment_defaults_free() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        let usage = vec![make_record("GenSpark", &[ts(2024, 3, 5, 9, 0, 0)])];

        let stats = Aggregator::monthly_stats(
            &usage,
            &[],
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        assert_eq!(stats[0].plan, Plan::Free);
        assert_eq!(stats[0].monthly_count, 1);
        assert_eq!(stats[0].monthly_price, 0);
    }

    #[test]
    fn test_monthly_stats_counts_only_current_month() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        let usage = vec![make_record(
            "Claude",
            &[
                ts(2024, 2, 29, 23, 59, 59), // previous month
                ts(2024, 3, 1, 0, 0, 0),     // first instant counts
                ts(2024, 3, 31, 23, 59, 59), // last second counts
                ts(2024, 4, 1, 0, 0, 0),     // next month
            ],
        )];

        let stats = Aggregator::monthly_stats(
            &usage,
            &[],
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        assert_eq!(stats[0].monthly_count, 2);
    }

    #[test]
    fn test_monthly_stats_paid_only_filters_free_out() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        let usage = vec![
            make_record("Claude", &[ts(2024, 3, 5, 9, 0, 0)]),
            make_record("Felo", &[ts(2024, 3, 6, 9, 0, 0)]), // free, no assignment
            make_record("v0", &[ts(2024, 3, 7, 9, 0, 0)]),
        ];
        let assignments = vec![assign("Claude", Plan::Pro), assign("v0", Plan::Basic)];

        let all = Aggregator::monthly_stats(
            &usage,
            &assignments,
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );
        let paid = Aggregator::monthly_stats(
            &usage,
            &assignments,
            &PlanCatalog::default(),
            now,
            StatsOptions { paid_only: true },
        );

        // The free service is absent entirely, not a placeholder
        assert_eq!(all.len(), 3);
        assert_eq!(paid.len(), 2);
        assert_eq!(paid[0].service_name, "Claude");
        assert_eq!(paid[1].service_name, "v0");
    }

    #[test]
    fn test_monthly_stats_preserves_input_order() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        let usage = vec![
            make_record("Perplexity", &[]),
            make_record("ChatGPT", &[]),
            make_record("Dify", &[]),
        ];

        let stats = Aggregator::monthly_stats(
            &usage,
            &[],
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        let names: Vec<&str> = stats.iter().map(|s| s.service_name.as_str()).collect();
        assert_eq!(names, ["Perplexity", "ChatGPT", "Dify"]);
    }

    #[test]
    fn test_cost_per_use_rounds_half_up() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        // 8 uses on basic ($9): 9/8 = 1.125 => 1.13
        let dates: Vec<DateTime<Utc>> = (1..=8).map(|d| ts(2024, 3, d, 12, 0, 0)).collect();
        let usage = vec![make_record("Claude", &dates)];
        let assignments = vec![assign("Claude", Plan::Basic)];

        let stats = Aggregator::monthly_stats(
            &usage,
            &assignments,
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        assert!((stats[0].cost_per_use - 1.13).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_per_use_rounds_repeating_fraction() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        // 3 uses on pro ($19): 19/3 = 6.333... => 6.33
        let dates = [
            ts(2024, 3, 1, 12, 0, 0),
            ts(2024, 3, 2, 12, 0, 0),
            ts(2024, 3, 3, 12, 0, 0),
        ];
        let usage = vec![make_record("ChatGPT", &dates)];
        let assignments = vec![assign("ChatGPT", Plan::Pro)];

        let stats = Aggregator::monthly_stats(
            &usage,
            &assignments,
            &PlanCatalog::default(),
            now,
            StatsOptions::default(),
        );

        assert!((stats[0].cost_per_use - 6.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monthly_stats_custom_catalog() {
        let now = ts(2024, 3, 20, 12, 0, 0);
        let catalog = PlanCatalog::new(12, 60);
        let usage = vec![make_record("Claude", &[ts(2024, 3, 1, 12, 0, 0)])];
        let assignments = vec![assign("Claude", Plan::Pro)];

        let stats =
            Aggregator::monthly_stats(&usage, &assignments, &catalog, now, StatsOptions::default());

        assert_eq!(stats[0].monthly_price, 60);
        assert!((stats[0].cost_per_use - 60.0).abs() < f64::EPSILON);
    }

    // ========== cost_summary() tests ==========

    #[test]
    fn test_cost_summary_empty_registry() {
        let summary =
            Aggregator::cost_summary(&ServiceRegistry::default(), &[], &PlanCatalog::default());
        assert_eq!(summary.total_monthly_cost, 0);
        assert_eq!(summary.paid_service_count, 0);
    }

    #[test]
    fn test_cost_summary_unassigned_services_cost_nothing() {
        let registry = make_registry(&["a", "b", "c"]);
        let summary = Aggregator::cost_summary(&registry, &[], &PlanCatalog::default());
        assert_eq!(summary.total_monthly_cost, 0);
        assert_eq!(summary.paid_service_count, 0);
    }

    #[test]
    fn test_cost_summary_totals_resolved_prices() {
        let registry = make_registry(&["a", "b", "c"]);
        let assignments = vec![assign("a", Plan::Basic), assign("c", Plan::Pro)];

        let summary = Aggregator::cost_summary(&registry, &assignments, &PlanCatalog::default());

        assert_eq!(summary.total_monthly_cost, 9 + 19);
        assert_eq!(summary.paid_service_count, 2);
    }

    #[test]
    fn test_cost_summary_independent_of_assignment_order() {
        let registry = make_registry(&["a", "b", "c"]);
        let forward = vec![assign("a", Plan::Basic), assign("c", Plan::Pro)];
        let reversed = vec![assign("c", Plan::Pro), assign("a", Plan::Basic)];

        let first = Aggregator::cost_summary(&registry, &forward, &PlanCatalog::default());
        let second = Aggregator::cost_summary(&registry, &reversed, &PlanCatalog::default());

        assert_eq!(first, second);
    }

    #[test]
    fn test_cost_summary_free_assignments_not_counted_paid() {
        let registry = make_registry(&["a", "b"]);
        let assignments = vec![assign("a", Plan::Free), assign("b", Plan::Basic)];

        let summary = Aggregator::cost_summary(&registry, &assignments, &PlanCatalog::default());

        assert_eq!(summary.total_monthly_cost, 9);
        assert_eq!(summary.paid_service_count, 1);
    }

    #[test]
    fn test_paid_count_includes_assignment_outside_registry() {
        // An assignment whose service was removed from the registry still
        // counts toward paid_service_count, but not toward the total.
        let registry = make_registry(&["a"]);
        let assignments = vec![assign("a", Plan::Basic), assign("retired", Plan::Pro)];

        let summary = Aggregator::cost_summary(&registry, &assignments, &PlanCatalog::default());

        assert_eq!(summary.total_monthly_cost, 9);
        assert_eq!(summary.paid_service_count, 2);
    }

    #[test]
    fn test_cost_summary_registry_entry_contributes_once() {
        let registry = make_registry(&["a", "b", "c", "d"]);
        let assignments = vec![assign("b", Plan::Pro)];

        let summary = Aggregator::cost_summary(&registry, &assignments, &PlanCatalog::default());

        assert_eq!(summary.total_monthly_cost, 19);
    }
}
