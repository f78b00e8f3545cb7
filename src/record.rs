use serde::{Deserialize, Serialize};

/// CSV column order. The header is written once per store file, never per run.
pub const CSV_HEADER: [&str; 6] = [
    "Bid No",
    "Items",
    "Quantity",
    "Department Name And Address",
    "Start Date",
    "End Date",
];

/// One bid listing entry as rendered on the all-bids page.
///
/// `bid_no` is the business key and is never empty for a valid record; every
/// other field is free text as rendered and may be empty when the source
/// omits it. Rows are immutable once persisted — there is no update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRecord {
    #[serde(rename = "Bid No")]
    pub bid_no: String,
    #[serde(rename = "Items")]
    pub items: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Department Name And Address")]
    pub department: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
}
