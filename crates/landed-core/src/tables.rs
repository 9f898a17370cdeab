//! Read-only lookup tables shared by every evaluation in a batch
//!
//! Lookups walk an explicit, ordered list of strategies and stop at the
//! first one that yields a record. The last resort is always a named
//! constant, never an implicit coalesce.

use crate::model::{CategoryFeeSchedule, Condition, CountryCode, HsCodeRecord, MarginSetting};
use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Margin-table country used when a destination has no setting of its own
pub const DEFAULT_MARGIN_COUNTRY: &str = "DEFAULT";

/// Length of an HS subheading (chapter + heading + subheading)
pub const HS_SUBHEADING_DIGITS: usize = 6;

// ============================================================================
// FEE SCHEDULES
// ============================================================================

/// Fee schedules keyed by marketplace category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeScheduleTable {
    schedules: BTreeMap<String, CategoryFeeSchedule>,
}

impl FeeScheduleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: impl Into<String>, schedule: CategoryFeeSchedule) -> Self {
        self.schedules.insert(category.into(), schedule);
        self
    }

    pub fn insert(&mut self, category: impl Into<String>, schedule: CategoryFeeSchedule) {
        self.schedules.insert(category.into(), schedule);
    }

    /// Exact category first, then the configured default entry.
    /// Returns the key that matched alongside the schedule.
    pub fn resolve<'a>(
        &'a self,
        category: &str,
        default_category: &str,
    ) -> Option<(&'a str, &'a CategoryFeeSchedule)> {
        [category, default_category]
            .into_iter()
            .find_map(|key| self.schedules.get_key_value(key))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        self.schedules.values().try_for_each(|s| s.validate())
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

// ============================================================================
// HS CODES
// ============================================================================

/// How an HS code was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HsLookup {
    /// Code as written
    Exact,
    /// Dots and spaces stripped on both sides
    DigitsOnly,
    /// First six digits only
    Subheading,
}

pub const HS_LOOKUP_ORDER: [HsLookup; 3] = [HsLookup::Exact, HsLookup::DigitsOnly, HsLookup::Subheading];

/// Strip everything but digits
pub fn hs_digits(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Tariff records indexed by code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<HsCodeRecord>", into = "Vec<HsCodeRecord>")]
pub struct HsCodeTable {
    records: BTreeMap<String, HsCodeRecord>,
    by_digits: BTreeMap<String, String>,
}

impl From<Vec<HsCodeRecord>> for HsCodeTable {
    fn from(records: Vec<HsCodeRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.insert(record);
        }
        table
    }
}

impl From<HsCodeTable> for Vec<HsCodeRecord> {
    fn from(table: HsCodeTable) -> Self {
        table.records.into_values().collect()
    }
}

impl HsCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: HsCodeRecord) {
        let digits = hs_digits(&record.code);
        // First record wins the normalized slot.
        self.by_digits.entry(digits).or_insert_with(|| record.code.clone());
        self.records.insert(record.code.clone(), record);
    }

    pub fn lookup(&self, code: &str) -> Option<(&HsCodeRecord, HsLookup)> {
        HS_LOOKUP_ORDER
            .iter()
            .find_map(|strategy| self.lookup_with(code, *strategy).map(|r| (r, *strategy)))
    }

    fn lookup_with(&self, code: &str, strategy: HsLookup) -> Option<&HsCodeRecord> {
        match strategy {
            HsLookup::Exact => self.records.get(code.trim()),
            HsLookup::DigitsOnly => self
                .by_digits
                .get(&hs_digits(code))
                .and_then(|key| self.records.get(key)),
            HsLookup::Subheading => {
                let digits = hs_digits(code);
                if digits.len() <= HS_SUBHEADING_DIGITS {
                    return None;
                }
                self.by_digits
                    .get(&digits[..HS_SUBHEADING_DIGITS])
                    .and_then(|key| self.records.get(key))
            }
        }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        self.records.values().try_for_each(|r| r.validate())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// MARGIN SETTINGS
// ============================================================================

/// Margin settings keyed by destination country and condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MarginSetting>", into = "Vec<MarginSetting>")]
pub struct MarginTable {
    settings: BTreeMap<(CountryCode, Condition), MarginSetting>,
}

impl From<Vec<MarginSetting>> for MarginTable {
    fn from(settings: Vec<MarginSetting>) -> Self {
        Self {
            settings: settings
                .into_iter()
                .map(|s| ((s.country_code.clone(), s.condition), s))
                .collect(),
        }
    }
}

impl From<MarginTable> for Vec<MarginSetting> {
    fn from(table: MarginTable) -> Self {
        table.settings.into_values().collect()
    }
}

impl MarginTable {
    /// Destination-specific setting, then the `DEFAULT` country row
    pub fn resolve(&self, country: &CountryCode, condition: Condition) -> Option<&MarginSetting> {
        self.settings
            .get(&(country.clone(), condition))
            .or_else(|| {
                self.settings
                    .get(&(CountryCode::new(DEFAULT_MARGIN_COUNTRY), condition))
            })
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        self.settings.values().try_for_each(|s| s.validate())
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Jpy, Usd};

    fn hs(code: &str, rate: f64) -> HsCodeRecord {
        HsCodeRecord {
            code: code.to_string(),
            general_rate: rate,
            special_rate: None,
            additional_duties: None,
            description: None,
        }
    }

    #[test]
    fn test_fee_table_falls_back_to_default() {
        let table = FeeScheduleTable::new()
            .with("Toys", CategoryFeeSchedule { fvf: 0.13, cap: None, insertion_fee: Usd(0.35) })
            .with("Default", CategoryFeeSchedule { fvf: 0.15, cap: None, insertion_fee: Usd::ZERO });

        let (key, schedule) = table.resolve("Toys", "Default").unwrap();
        assert_eq!(key, "Toys");
        assert_eq!(schedule.fvf, 0.13);

        let (key, _) = table.resolve("Cameras", "Default").unwrap();
        assert_eq!(key, "Default");
    }

    #[test]
    fn test_fee_table_without_default() {
        let table = FeeScheduleTable::new()
            .with("Toys", CategoryFeeSchedule { fvf: 0.13, cap: None, insertion_fee: Usd::ZERO });
        assert!(table.resolve("Cameras", "Default").is_none());
    }

    #[test]
    fn test_hs_lookup_strategies() {
        let table = HsCodeTable::from(vec![hs("9504.40", 0.0), hs("8525.89", 0.021)]);

        let (record, how) = table.lookup("9504.40").unwrap();
        assert_eq!(record.code, "9504.40");
        assert_eq!(how, HsLookup::Exact);

        let (_, how) = table.lookup("950440").unwrap();
        assert_eq!(how, HsLookup::DigitsOnly);

        let (record, how) = table.lookup("8525.89.5050").unwrap();
        assert_eq!(record.code, "8525.89");
        assert_eq!(how, HsLookup::Subheading);

        assert!(table.lookup("1234.56").is_none());
    }

    #[test]
    fn test_margin_table_default_country() {
        let table = MarginTable::from(vec![
            MarginSetting {
                country_code: "US".into(),
                condition: Condition::New,
                default_margin: 0.15,
                min_margin: 0.10,
                min_amount: Jpy(3000.0),
            },
            MarginSetting {
                country_code: DEFAULT_MARGIN_COUNTRY.into(),
                condition: Condition::New,
                default_margin: 0.2,
                min_margin: 0.12,
                min_amount: Jpy(2000.0),
            },
        ]);

        let us = table.resolve(&"US".into(), Condition::New).unwrap();
        assert_eq!(us.min_margin, 0.10);

        let gb = table.resolve(&"GB".into(), Condition::New).unwrap();
        assert_eq!(gb.min_margin, 0.12);

        assert!(table.resolve(&"US".into(), Condition::Used).is_none());
    }
}
