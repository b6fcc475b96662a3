// ── Package pricing ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Service class a package price applies to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PackageClass {
    Internet,
    Voice,
    Sms,
}
