//! Lead funnel summaries

use serde::{Deserialize, Serialize};

use crate::core::group::group_by;
use crate::core::period::MonthKey;
use crate::core::rank::sort_desc_by;
use crate::core::ratio::{pct, safe_div};
use crate::core::types::LeadRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadDimension {
    #[default]
    Source,
    Stage,
    Center,
    Associate,
    Month,
}

impl LeadDimension {
    pub fn label(self) -> &'static str {
        match self {
            LeadDimension::Source => "Source",
            LeadDimension::Stage => "Stage",
            LeadDimension::Center => "Center",
            LeadDimension::Associate => "Associate",
            LeadDimension::Month => "Month",
        }
    }

    pub fn key(self, lead: &LeadRecord) -> String {
        match self {
            LeadDimension::Source => lead.source.clone(),
            LeadDimension::Stage => lead.stage.clone(),
            LeadDimension::Center => lead.center.clone(),
            LeadDimension::Associate => lead.associate.clone(),
            LeadDimension::Month => lead
                .created_at
                .map(|d| MonthKey::from_date(d).label())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadSummary {
    pub key: String,
    pub leads: usize,
    pub trials: usize,
    pub conversions: usize,
    pub retained: usize,
    pub conversion_rate: f64,
    pub trial_to_member_rate: f64,
    pub retention_rate: f64,
    pub total_ltv: f64,
    pub avg_ltv: f64,
    pub avg_visits: f64,
    /// Mean days from creation to conversion, over converted leads with both dates
    pub avg_days_to_convert: f64,
}

/// Funnel summaries per group, most leads first
pub fn summarize_leads(leads: &[LeadRecord], dimension: LeadDimension) -> Vec<LeadSummary> {
    let mut rows: Vec<LeadSummary> = group_by(leads, |l| dimension.key(l))
        .into_iter()
        .map(|group| {
            let mut trials = 0usize;
            let mut conversions = 0usize;
            let mut converted_after_trial = 0usize;
            let mut retained = 0usize;
            let mut total_ltv = 0.0;
            let mut visits = 0u64;
            let mut convert_days = 0i64;
            let mut timed_conversions = 0usize;

            for lead in &group.records {
                total_ltv += lead.ltv;
                visits += u64::from(lead.visits);
                if lead.has_trial() {
                    trials += 1;
                }
                if !lead.is_converted() {
                    continue;
                }
                conversions += 1;
                if lead.has_trial() {
                    converted_after_trial += 1;
                }
                if lead.is_retained() {
                    retained += 1;
                }
                if let (Some(created), Some(converted)) = (lead.created_at, lead.converted_at)
                    && converted >= created
                {
                    convert_days += (converted - created).num_days();
                    timed_conversions += 1;
                }
            }

            let count = group.len();
            LeadSummary {
                key: group.key,
                leads: count,
                trials,
                conversions,
                retained,
                conversion_rate: pct(conversions as f64, count as f64),
                trial_to_member_rate: pct(converted_after_trial as f64, trials as f64),
                retention_rate: pct(retained as f64, conversions as f64),
                total_ltv,
                avg_ltv: safe_div(total_ltv, count as f64),
                avg_visits: safe_div(visits as f64, count as f64),
                avg_days_to_convert: safe_div(convert_days as f64, timed_conversions as f64),
            }
        })
        .collect();

    sort_desc_by(&mut rows, |r| r.leads as f64);
    rows
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lead(source: &str, trial: &str, conversion: &str, retention: &str) -> LeadRecord {
        LeadRecord {
            source: source.into(),
            trial_status: trial.into(),
            conversion_status: conversion.into(),
            retention_status: retention.into(),
            ..Default::default()
        }
    }

    #[test]
    fn funnel_rates_per_source() {
        let mut first = lead("Instagram", "Trial Completed", "Converted", "Retained");
        first.ltv = 400.0;
        first.visits = 6;
        first.created_at = NaiveDate::from_ymd_opt(2025, 1, 1);
        first.converted_at = NaiveDate::from_ymd_opt(2025, 1, 11);
        let leads = vec![
            first,
            lead("Instagram", "Trial Completed", "Not Converted", ""),
            lead("Walk-in", "", "Converted", ""),
            lead("Instagram", "", "Not Converted", ""),
        ];
        let rows = summarize_leads(&leads, LeadDimension::Source);
        assert_eq!(rows[0].key, "Instagram");
        let ig = &rows[0];
        assert_eq!(ig.leads, 3);
        assert_eq!(ig.trials, 2);
        assert_eq!(ig.conversions, 1);
        assert_eq!(ig.trial_to_member_rate, 50.0);
        assert_eq!(ig.retention_rate, 100.0);
        assert_eq!(ig.total_ltv, 400.0);
        assert_eq!(ig.avg_visits, 2.0);
        assert_eq!(ig.avg_days_to_convert, 10.0);

        let walk_in = &rows[1];
        assert_eq!(walk_in.conversion_rate, 100.0);
        assert_eq!(walk_in.trial_to_member_rate, 0.0);
        assert_eq!(walk_in.avg_days_to_convert, 0.0);
    }

    #[test]
    fn blank_source_is_unknown() {
        let rows = summarize_leads(&[lead("", "", "", "")], LeadDimension::Source);
        assert_eq!(rows[0].key, "Unknown");
        assert_eq!(rows[0].conversion_rate, 0.0);
        assert_eq!(rows[0].retention_rate, 0.0);
    }
}
