mod fields;

pub use fields::{nullable_bool, required_str, SETTINGS_FIELD, SIGNAL_FIELDS};
