//! Decoding helpers for loosely typed backend payloads.

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing key. Pair with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	use serde::Deserialize;
	use serde_json::json;

	use super::*;

	#[derive(Debug, Default, Deserialize)]
	struct Record {
		#[serde(default, deserialize_with = "null_as_default")]
		name: String,
		#[serde(default, deserialize_with = "null_as_default")]
		tags: Vec<String>,
	}

	#[test]
	fn null_and_missing_fields_take_defaults() {
		let record: Record = serde_json::from_value(json!({"name": null})).unwrap();
		assert_eq!(record.name, "");
		assert!(record.tags.is_empty());

		let record: Record = serde_json::from_value(json!({"name": "a", "tags": ["x"]})).unwrap();
		assert_eq!(record.name, "a");
		assert_eq!(record.tags, vec!["x".to_string()]);
	}

	#[test]
	fn wrong_types_still_fail() {
		assert!(serde_json::from_value::<Record>(json!({"name": 3})).is_err());
	}
}
