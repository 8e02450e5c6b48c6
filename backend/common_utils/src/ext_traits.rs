//! Extension traits for parsing untyped payloads at the service boundary.

use error_stack::ResultExt;

use crate::errors::{CustomResult, ParsingError};

pub trait BytesExt {
    /// Parse bytes into type `<T>` using `serde::Deserialize`, keeping the
    /// path to the offending field when deserialization fails
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::Deserialize<'de>;
}

impl BytesExt for [u8] {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::Deserialize<'de>,
    {
        let mut deserializer = serde_json::Deserializer::from_slice(self);
        serde_path_to_error::deserialize(&mut deserializer)
            .change_context(ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| format!("Unable to parse {type_name} from bytes"))
    }
}

pub trait ValueExt {
    /// Convert `serde_json::Value` into type `<T>` using `serde::Deserialize`
    fn parse_value<T>(self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::de::DeserializeOwned;
}

impl ValueExt for serde_json::Value {
    fn parse_value<T>(self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::de::DeserializeOwned,
    {
        let debug = format!(
            "Unable to parse {type_name} from serde_json::Value: {:?}",
            &self
        );
        serde_json::from_value::<T>(self)
            .change_context(ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| debug)
    }
}
