use serde::{Deserialize, Serialize};

/// A stored repair ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub id: u64,
    pub customer_name: String,
    pub phone_model: String,
    pub issue: String,
    pub status: String,
    pub estimated_cost: Option<f64>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}

/// The fields a caller supplies to open a new ticket.
///
/// The four text fields are required; a body missing any of them fails to
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepair {
    pub customer_name: String,
    pub phone_model: String,
    pub issue: String,
    pub status: String,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

/// A partial update. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

impl Repair {
    /// Build a stored record from a creation request.
    pub fn from_new(id: u64, new: NewRepair, now: &str) -> Self {
        Repair {
            id,
            customer_name: new.customer_name,
            phone_model: new.phone_model,
            issue: new.issue,
            status: new.status,
            estimated_cost: new.estimated_cost,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Overwrite the fields present in `patch` and stamp `updated_at`.
    pub fn apply_patch(&mut self, patch: RepairPatch, now: &str) {
        if let Some(v) = patch.customer_name {
            self.customer_name = v;
        }
        if let Some(v) = patch.phone_model {
            self.phone_model = v;
        }
        if let Some(v) = patch.issue {
            self.issue = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.estimated_cost {
            self.estimated_cost = Some(v);
        }
        self.updated_at = now.to_string();
    }
}

/// Current time as an RFC 3339 string.
pub(crate) fn timestamp_now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Repair {
        Repair::from_new(
            7,
            NewRepair {
                customer_name: "John".to_string(),
                phone_model: "iPhone 15".to_string(),
                issue: "Screen broken".to_string(),
                status: "PENDING".to_string(),
                estimated_cost: None,
            },
            "2025-01-01T00:00:00Z",
        )
    }

    #[test]
    fn new_repair_requires_all_text_fields() {
        let err = serde_json::from_value::<NewRepair>(serde_json::json!({
            "customerName": "John",
            "phoneModel": "iPhone 15",
            "issue": "Screen broken"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("status"), "{}", err);
    }

    #[test]
    fn new_repair_estimate_is_optional() {
        let new: NewRepair = serde_json::from_value(serde_json::json!({
            "customerName": "John",
            "phoneModel": "iPhone 15",
            "issue": "Screen broken",
            "status": "PENDING"
        }))
        .unwrap();
        assert_eq!(new.estimated_cost, None);
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut repair = sample();
        let patch = RepairPatch {
            status: Some("DONE".to_string()),
            estimated_cost: Some(129.5),
            ..RepairPatch::default()
        };
        repair.apply_patch(patch, "2025-01-02T00:00:00Z");
        assert_eq!(repair.status, "DONE");
        assert_eq!(repair.estimated_cost, Some(129.5));
        assert_eq!(repair.customer_name, "John");
        assert_eq!(repair.created_at, "2025-01-01T00:00:00Z");
        assert_eq!(repair.updated_at, "2025-01-02T00:00:00Z");
    }

    #[test]
    fn repair_serializes_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["customerName"], "John");
        assert_eq!(value["phoneModel"], "iPhone 15");
        assert!(value["estimatedCost"].is_null());
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = timestamp_now();
        assert!(time::OffsetDateTime::parse(
            &ts,
            &time::format_description::well_known::Rfc3339
        )
        .is_ok());
    }
}
