//! Incident analytics
//!
//! Aggregates used by the dashboard: totals, status breakdown, counts per
//! hazard type and monthly trend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{HazardType, Incident, IncidentStatus};

/// Number of incidents in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Pending incidents
    pub pending: usize,
    /// Incidents under investigation
    pub investigating: usize,
    /// Resolved incidents
    pub resolved: usize,
}

/// Number of incidents of one hazard type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardCount {
    /// Hazard type
    pub hazard_type: HazardType,
    /// Display label
    pub label: String,
    /// Incident count
    pub count: usize,
}

/// Number of incidents created in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Month as `YYYY-MM`
    pub month: String,
    /// Incident count
    pub incidents: usize,
}

/// Dashboard summary of all incidents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    /// Total number of incidents
    pub total: usize,
    /// Breakdown by status
    pub by_status: StatusCounts,
    /// Hazard types with at least one incident, most frequent first
    pub by_hazard_type: Vec<HazardCount>,
    /// Incidents per month, oldest first
    pub monthly: Vec<MonthlyCount>,
}

/// Summarize a set of incidents
pub fn summarize(incidents: &[Incident]) -> IncidentSummary {
    let mut by_status = StatusCounts::default();
    let mut by_hazard: BTreeMap<HazardType, usize> = BTreeMap::new();
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();

    for incident in incidents {
        match incident.status {
            IncidentStatus::Pending => by_status.pending += 1,
            IncidentStatus::Investigating => by_status.investigating += 1,
            IncidentStatus::Resolved => by_status.resolved += 1,
        }
        *by_hazard.entry(incident.hazard_type).or_default() += 1;
        *by_month
            .entry(incident.created_at.format("%Y-%m").to_string())
            .or_default() += 1;
    }

    // BTreeMap iterates in declaration order; the stable sort keeps it for ties
    let mut by_hazard_type: Vec<HazardCount> = by_hazard
        .into_iter()
        .map(|(hazard_type, count)| HazardCount {
            hazard_type,
            label: hazard_type.label().to_string(),
            count,
        })
        .collect();
    by_hazard_type.sort_by(|a, b| b.count.cmp(&a.count));

    IncidentSummary {
        total: incidents.len(),
        by_status,
        by_hazard_type,
        monthly: by_month
            .into_iter()
            .map(|(month, incidents)| MonthlyCount { month, incidents })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn incident(hazard_type: HazardType, status: IncidentStatus, month: u32) -> Incident {
        Incident {
            id: format!("{}-{}", hazard_type, month),
            hazard_type,
            description: "d".to_string(),
            location: "l".to_string(),
            known_place: None,
            contact_info: None,
            image_data: None,
            image_name: None,
            status,
            created_at: Utc.with_ymd_and_hms(2026, month, 15, 12, 0, 0).unwrap(),
            email_sent: None,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, IncidentSummary::default());
    }

    #[test]
    fn test_summary_counts() {
        let incidents = vec![
            incident(HazardType::SewageSpill, IncidentStatus::Pending, 3),
            incident(HazardType::IllegalDumping, IncidentStatus::Resolved, 1),
            incident(HazardType::SewageSpill, IncidentStatus::Investigating, 3),
            incident(HazardType::AirPollution, IncidentStatus::Pending, 2),
            incident(HazardType::IllegalDumping, IncidentStatus::Pending, 3),
            incident(HazardType::SewageSpill, IncidentStatus::Pending, 1),
        ];

        let summary = summarize(&incidents);

        assert_eq!(summary.total, 6);
        assert_eq!(
            summary.by_status,
            StatusCounts {
                pending: 4,
                investigating: 1,
                resolved: 1,
            }
        );

        let hazards: Vec<(HazardType, usize)> = summary
            .by_hazard_type
            .iter()
            .map(|h| (h.hazard_type, h.count))
            .collect();
        assert_eq!(
            hazards,
            vec![
                (HazardType::SewageSpill, 3),
                (HazardType::IllegalDumping, 2),
                (HazardType::AirPollution, 1),
            ]
        );
        assert_eq!(summary.by_hazard_type[0].label, "Sewage Spill");

        let months: Vec<(&str, usize)> = summary
            .monthly
            .iter()
            .map(|m| (m.month.as_str(), m.incidents))
            .collect();
        assert_eq!(months, vec![("2026-01", 2), ("2026-02", 1), ("2026-03", 3)]);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = summarize(&[incident(HazardType::Other, IncidentStatus::Pending, 5)]);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["byStatus"]["pending"], 1);
        assert_eq!(json["byHazardType"][0]["hazardType"], "other");
        assert_eq!(json["monthly"][0]["month"], "2026-05");
    }
}
