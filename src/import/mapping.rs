/// Canonical columns of the agency policy sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Nickname,
    FullName,
    CellPhone,
    CarType,
    LicensePlate,
    DueMonth,
    Notice,
    DueDay,
    MadeOn,
    Amount,
    Installments,
    PolicyNumber,
}

impl Column {
    pub(crate) const fn canonical_name(self) -> &'static str {
        match self {
            Self::Nickname => "nickname",
            Self::FullName => "full_name",
            Self::CellPhone => "cell_phone",
            Self::CarType => "car_type",
            Self::LicensePlate => "license_plate",
            Self::DueMonth => "due_month",
            Self::Notice => "notice",
            Self::DueDay => "due_day",
            Self::MadeOn => "made_on",
            Self::Amount => "amount",
            Self::Installments => "installments",
            Self::PolicyNumber => "policy_number",
        }
    }
}

/// Strip BOM/zero-width characters, collapse runs of whitespace (the source
/// sheet embeds newlines inside header cells), and lowercase.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Map a normalized header to its canonical column.
///
/// Accepts both the Bulgarian labels of the source spreadsheet and the
/// canonical English names, so re-exports of already-translated sheets
/// import unchanged.
pub(crate) fn column_for_header(normalized: &str) -> Option<Column> {
    let column = match normalized {
        "контрагент" | "nickname" => Column::Nickname,
        "име на собственик" | "full_name" => Column::FullName,
        "телефон" | "cell_phone" => Column::CellPhone,
        "авт-ил" | "car_type" => Column::CarType,
        "рег №" | "license_plate" => Column::LicensePlate,
        "месец" | "due_month" => Column::DueMonth,
        "предупреди на" | "notice" => Column::Notice,
        "падеж" | "due_day" => Column::DueDay,
        "сключена на" | "made_on" => Column::MadeOn,
        "сума" | "amount" => Column::Amount,
        "вн" | "installments" => Column::Installments,
        "№ на полица" | "policy_number" => Column::PolicyNumber,
        _ => return None,
    };

    Some(column)
}
