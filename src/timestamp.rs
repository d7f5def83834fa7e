use chrono::NaiveDateTime;
use serde::{Deserializer, Serializer, de::Visitor};
use serde_with::{DeserializeAs, SerializeAs};

/// Local wall-clock timestamps as the meter reports them: `2025-01-31 23:00:00`.
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Same as [`FORMAT`], but with the ISO 8601 separator.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// [`serde_with`] adapter for [`NaiveDateTime`] in the metering format.
///
/// Deserialization also accepts the ISO 8601 `T` separator.
pub struct MeterTimestamp;

impl SerializeAs<NaiveDateTime> for MeterTimestamp {
    fn serialize_as<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&timestamp.format(FORMAT))
    }
}

impl<'de> DeserializeAs<'de, NaiveDateTime> for MeterTimestamp {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        struct TimestampVisitor;

        impl Visitor<'_> for TimestampVisitor {
            type Value = NaiveDateTime;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a timestamp formatted as `{FORMAT}`")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                let value = value.trim();
                NaiveDateTime::parse_from_str(value, FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(value, ISO_FORMAT))
                    .map_err(|error| E::custom(format!("invalid timestamp `{value}`: {error}")))
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}
