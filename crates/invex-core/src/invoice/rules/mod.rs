//! Field-level helpers shared by all vendor parsers.

pub mod amounts;
pub mod dates;
pub mod labels;
pub mod patterns;

pub use amounts::{format_german_decimal, is_german_number, parse_german_decimal, unit_price};
pub use dates::{
    add_payment_term, due_date, extract_date, iso_week_end_date, iso_week_end_date_from,
    parse_delivery_week, resolve_year,
};
pub use labels::{find_labeled, first_token_after, strip_label, LabeledValue};
pub use patterns::*;
