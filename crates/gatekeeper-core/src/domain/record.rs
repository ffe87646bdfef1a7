use crate::domain::name::normalize_name;
use crate::domain::phone::parse_phones;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator between a base customer id and an order suffix (`12_01`).
pub const SUB_RECORD_SEPARATOR: char = '_';

/// One raw row as read from the record source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub customer: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    pub id: String,
    pub full_name: String,
    pub norm_name: String,
    pub norm_first: String,
    pub norm_last: String,
    pub phones: Vec<String>,
    pub raw_phone: String,
}

impl CustomerRecord {
    /// Builds a record from a raw row, or `None` when the row carries no id,
    /// no name and no phone.
    pub fn from_row(row: &PipelineRow) -> Option<Self> {
        let id = row.id.trim().to_string();
        let first = row.first_name.trim();
        let last = row.last_name.trim();
        let customer = row.customer.trim();

        let full_name = if !customer.is_empty() {
            customer.to_string()
        } else {
            format!("{first} {last}").trim().to_string()
        };
        let phones = parse_phones(&row.phone);

        if id.is_empty() && full_name.is_empty() && phones.is_empty() {
            return None;
        }

        // Rows that only fill the combined column still get name parts.
        let (first, last) = if first.is_empty() && last.is_empty() {
            match customer.split_once(char::is_whitespace) {
                Some((head, tail)) => (head, tail.trim()),
                None => (customer, ""),
            }
        } else {
            (first, last)
        };

        Some(Self {
            id,
            norm_name: normalize_name(&full_name),
            norm_first: normalize_name(first),
            norm_last: normalize_name(last),
            full_name,
            phones,
            raw_phone: row.phone.trim().to_string(),
        })
    }

    /// Base customers have no order suffix in their id.
    pub fn is_base_customer(&self) -> bool {
        !self.id.contains(SUB_RECORD_SEPARATOR)
    }

    pub fn base_id(&self) -> &str {
        match self.id.split_once(SUB_RECORD_SEPARATOR) {
            Some((base, _)) => base,
            None => &self.id,
        }
    }

    /// First parsed phone, falling back to the raw cell text.
    pub fn primary_phone(&self) -> &str {
        self.phones
            .first()
            .map(String::as_str)
            .unwrap_or(&self.raw_phone)
    }
}

/// Record source tables are plain identifiers, so they can be quoted into SQL.
pub fn is_valid_table_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Immutable snapshot of the record source for a single request.
///
/// Records keep the order of the source rows; that order breaks every tie in
/// the classifier and resolver.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    records: Vec<CustomerRecord>,
    order_counts: HashMap<String, usize>,
}

impl RecordIndex {
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a PipelineRow>,
    {
        Self::from_records(rows.into_iter().filter_map(CustomerRecord::from_row).collect())
    }

    fn from_records(records: Vec<CustomerRecord>) -> Self {
        let mut order_counts: HashMap<String, usize> = HashMap::new();
        for record in records.iter().filter(|record| !record.is_base_customer()) {
            let base = record.base_id();
            if !base.is_empty() {
                *order_counts.entry(base.to_string()).or_default() += 1;
            }
        }
        Self {
            records,
            order_counts,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomerRecord> {
        self.records.iter()
    }

    pub fn base_customers(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records.iter().filter(|record| record.is_base_customer())
    }

    /// The base customer stored under `id`, if any.
    pub fn customer(&self, id: &str) -> Option<&CustomerRecord> {
        if id.is_empty() {
            return None;
        }
        self.base_customers().find(|record| record.id == id)
    }

    /// Order sub-records (`<base>_NN`) of a base customer, in source order.
    pub fn orders_of<'a>(
        &'a self,
        base_id: &'a str,
    ) -> impl Iterator<Item = &'a CustomerRecord> {
        self.records.iter().filter(move |record| {
            !base_id.is_empty() && !record.is_base_customer() && record.base_id() == base_id
        })
    }

    /// Number of order sub-records filed under `base_id`; zero for sub-record ids.
    pub fn order_count(&self, base_id: &str) -> usize {
        self.order_counts.get(base_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<PipelineRow> for RecordIndex {
    fn from_iter<T: IntoIterator<Item = PipelineRow>>(iter: T) -> Self {
        Self::from_records(
            iter.into_iter()
                .filter_map(|row| CustomerRecord::from_row(&row))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_table_name, CustomerRecord, PipelineRow, RecordIndex};

    fn row(id: &str, first: &str, last: &str, customer: &str, phone: &str) -> PipelineRow {
        PipelineRow {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            customer: customer.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn from_row_prefers_combined_name() {
        let record =
            CustomerRecord::from_row(&row("7", "Maria", "Rossi", "Maria Rossi Bianchi", ""))
                .expect("record");
        assert_eq!(record.full_name, "Maria Rossi Bianchi");
        assert_eq!(record.norm_name, "mariarossibianchi");
        assert_eq!(record.norm_first, "maria");
        assert_eq!(record.norm_last, "rossi");
    }

    #[test]
    fn from_row_joins_name_parts() {
        let record = CustomerRecord::from_row(&row("7", " Maria ", "", "", "+39 3331234567"))
            .expect("record");
        assert_eq!(record.full_name, "Maria");
        assert_eq!(record.phones, vec!["3331234567".to_string()]);
        assert_eq!(record.raw_phone, "+39 3331234567");
    }

    #[test]
    fn from_row_splits_combined_name_when_parts_missing() {
        let record =
            CustomerRecord::from_row(&row("7", "", "", "Anna De Luca", "")).expect("record");
        assert_eq!(record.norm_first, "anna");
        assert_eq!(record.norm_last, "deluca");
    }

    #[test]
    fn from_row_drops_rows_without_identity() {
        assert!(CustomerRecord::from_row(&row(" ", "", "", "", "123")).is_none());
        assert!(CustomerRecord::from_row(&row("", "", "", "", "3331234567")).is_some());
    }

    #[test]
    fn sub_records_are_not_base_customers() {
        let base = CustomerRecord::from_row(&row("12", "Gio", "Verdi", "", "")).expect("base");
        let order =
            CustomerRecord::from_row(&row("12_01", "Gio", "Verdi", "", "")).expect("order");
        assert!(base.is_base_customer());
        assert!(!order.is_base_customer());
        assert_eq!(order.base_id(), "12");
    }

    #[test]
    fn primary_phone_falls_back_to_raw_cell() {
        let record = CustomerRecord::from_row(&row("1", "A", "B", "", "int. 12")).expect("record");
        assert_eq!(record.primary_phone(), "int. 12");
    }

    #[test]
    fn index_keeps_source_order() {
        let rows = vec![
            row("2", "B", "B", "", ""),
            row("", "", "", "", ""),
            row("1", "A", "A", "", ""),
        ];
        let index = RecordIndex::from_rows(&rows);
        let ids: Vec<&str> = index.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn orders_are_grouped_under_their_base_customer() {
        let rows = vec![
            row("2", "Marco", "Bianchi", "", "3471112222"),
            row("2_01", "Marco", "Bianchi", "", "3471112222"),
            row("20", "Luca", "Neri", "", ""),
            row("20_01", "Luca", "Neri", "", ""),
            row("2_02", "Marco", "Bianchi", "", ""),
            row("_03", "", "", "Nessuno", ""),
        ];
        let index = RecordIndex::from_rows(&rows);
        let orders: Vec<&str> = index.orders_of("2").map(|r| r.id.as_str()).collect();
        assert_eq!(orders, vec!["2_01", "2_02"]);
        assert_eq!(index.order_count("2"), 2);
        assert_eq!(index.order_count("20"), 1);
        assert_eq!(index.order_count("2_01"), 0);
        assert_eq!(index.order_count(""), 0);
        assert_eq!(index.orders_of("").count(), 0);
    }

    #[test]
    fn customer_lookup_skips_sub_records_and_blank_ids() {
        let rows = vec![
            row("", "Maria", "Rossi", "", "3331234567"),
            row("2_01", "Marco", "Bianchi", "", ""),
            row("2", "Marco", "Bianchi", "", ""),
        ];
        let index = RecordIndex::from_rows(&rows);
        assert_eq!(index.customer("2").map(|r| r.full_name.as_str()), Some("Marco Bianchi"));
        assert!(index.customer("2_01").is_none());
        assert!(index.customer("").is_none());
    }

    #[test]
    fn table_names_are_plain_identifiers() {
        assert!(is_valid_table_name("pipeline"));
        assert!(is_valid_table_name("_02_pipeline"));
        assert!(is_valid_table_name("02_pipeline"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("pipe line"));
        assert!(!is_valid_table_name("pipeline\"; DROP"));
    }
}
