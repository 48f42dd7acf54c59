//! The canonical settings record: defaults, normalization, the secret split
//! and the store that owns the current record.

pub mod defaults;
pub mod kwargs;
pub mod normalize;
pub mod record;
pub mod secrets;
pub mod store;

pub use defaults::{default_settings, kind_of};
pub use kwargs::{decode_kwargs, encode_kwargs};
pub use normalize::{coerce, normalize, normalize_with_report, Coercion, NormalizeReport};
pub use record::{Candidate, SettingValue, SettingsRecord, ValueKind};
pub use secrets::{hydrate, redact, sensitive_entries};
pub use store::{SettingsObserver, SettingsStore};
