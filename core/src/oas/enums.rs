//! # Closed Vocabularies
//!
//! String-valued enumerations of the OpenAPI vocabulary. Unknown spellings are kept
//! in an `Other` variant so that decoding stays lossless and validation can name
//! the offending value.

use crate::errpath::PathError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A spelling outside the vocabulary.
            Other(String),
        }

        impl $name {
            /// Every valid spelling, in canonical order.
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            /// The wire spelling.
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $text, )+
                    $name::Other(s) => s,
                }
            }

            /// Fails for values outside the vocabulary.
            pub fn validate(&self) -> Result<(), PathError> {
                match self {
                    $name::Other(s) => Err(PathError::invalid_str(s).with_allowed(Self::NAMES)),
                    _ => Ok(()),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $text => $name::$variant, )+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from(s.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

string_enum! {
    /// Primitive schema type.
    DataType {
        /// `integer`
        Integer => "integer",
        /// `number`
        Number => "number",
        /// `string`
        String => "string",
        /// `array`
        Array => "array",
        /// `boolean`
        Boolean => "boolean",
        /// `object`
        Object => "object",
    }
}

string_enum! {
    /// Schema `format` modifier.
    Format {
        /// Signed 32 bits.
        Int32 => "int32",
        /// Signed 64 bits.
        Int64 => "int64",
        /// Single precision.
        Float => "float",
        /// Double precision.
        Double => "double",
        /// Base64 encoded characters.
        Byte => "byte",
        /// Any sequence of octets.
        Binary => "binary",
        /// RFC 3339 full-date.
        Date => "date",
        /// RFC 3339 date-time.
        DateTime => "date-time",
        /// Duration, as seconds or ISO 8601 text.
        Duration => "duration",
        /// Email address.
        Email => "email",
        /// Obscured input.
        Password => "password",
        /// RFC 4122 UUID.
        Uuid => "uuid",
        /// Absolute URI.
        Uri => "uri",
        /// URI reference.
        UriRef => "uriref",
        /// Postal code.
        ZipCode => "zip-code",
    }
}

string_enum! {
    /// Where a parameter is carried.
    ParameterLocation {
        /// Templated path segment.
        Path => "path",
        /// Query string.
        Query => "query",
        /// Request header.
        Header => "header",
        /// Cookie.
        Cookie => "cookie",
    }
}

string_enum! {
    /// Serialization style of parameters, headers and encodings.
    ParameterStyle {
        /// RFC 6570 path-style.
        Matrix => "matrix",
        /// RFC 6570 label.
        Label => "label",
        /// RFC 6570 form.
        Form => "form",
        /// RFC 6570 simple.
        Simple => "simple",
        /// Space separated arrays.
        SpaceDelimited => "spaceDelimited",
        /// Pipe separated arrays.
        PipeDelimited => "pipeDelimited",
        /// Nested objects in form parameters.
        DeepObject => "deepObject",
    }
}

string_enum! {
    /// Kind of security scheme.
    SecuritySchemeType {
        /// API key in a header, query or cookie.
        ApiKey => "apiKey",
        /// HTTP authentication scheme.
        Http => "http",
        /// Mutual TLS.
        MutualTls => "mutualTLS",
        /// OAuth 2 flows.
        OAuth2 => "oauth2",
        /// OpenID Connect discovery.
        OpenIdConnect => "openIdConnect",
    }
}

string_enum! {
    /// Where an API key is carried.
    SecuritySchemeIn {
        /// Query string.
        Query => "query",
        /// Request header.
        Header => "header",
        /// Cookie.
        Cookie => "cookie",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_known_and_unknown() {
        let ty: DataType = serde_json::from_str(r#""integer""#).unwrap();
        assert_eq!(ty, DataType::Integer);
        let ty: DataType = serde_json::from_str(r#""foo""#).unwrap();
        assert_eq!(ty, DataType::Other("foo".into()));
        assert_eq!(serde_json::to_string(&ty).unwrap(), r#""foo""#);
    }

    #[test]
    fn test_validate_lists_vocabulary() {
        let err = DataType::from("foo").validate().unwrap_err().field("type");
        assert_eq!(
            err.to_string(),
            r#"type ("foo") is invalid, must be one of: "integer", "number", "string", "array", "boolean", "object""#
        );
        let err = Format::from("foo").validate().unwrap_err().field("format");
        assert_eq!(
            err.to_string(),
            r#"format ("foo") is invalid, must be one of: "int32", "int64", "float", "double", "byte", "binary", "date", "date-time", "duration", "email", "password", "uuid", "uri", "uriref", "zip-code""#
        );
        assert!(SecuritySchemeType::from("mutualTLS").validate().is_ok());
    }
}
