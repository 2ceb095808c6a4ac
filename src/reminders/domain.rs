use chrono::NaiveDate;

/// One insurance policy line item as imported from the agency spreadsheet.
///
/// Records are value objects: once constructed they are never mutated.
/// A re-import produces fresh candidate records that are screened against
/// stored ones via [`NaturalKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    /// Surrogate key assigned by storage on insert; `None` before persistence.
    pub id: Option<i64>,
    pub nickname: String,
    pub full_name: String,
    pub cell_phone: String,
    pub car_type: String,
    pub license_plate: String,
    /// Informational month marker from the source sheet.
    pub due_month: Option<NaiveDate>,
    /// Date at which an advance reminder should begin.
    pub notice: Option<NaiveDate>,
    /// Date the payment is owed.
    pub due_day: Option<NaiveDate>,
    /// Policy issuance date.
    pub made_on: Option<NaiveDate>,
    pub amount: u32,
    pub installments: u32,
    pub policy_number: String,
}

impl PolicyRecord {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            full_name: self.full_name.clone(),
            due_day: self.due_day,
            policy_number: self.policy_number.clone(),
        }
    }
}

/// Identity of a real-world policy obligation across duplicate source rows.
///
/// Two records sharing this key describe the same obligation; an absent
/// `due_day` compares equal only to another absent one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub full_name: String,
    pub due_day: Option<NaiveDate>,
    pub policy_number: String,
}
